use super::ui;
use crate::core::error::CoreError;
use crate::core::model::BASE_DATE_PARAM;
use crate::core::relative_change_series;
use crate::store::ReferenceStore;
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Prints the relative-change series for the selected currencies as a
/// date-by-currency table.
pub fn run(
    store: &ReferenceStore,
    start: NaiveDate,
    end: NaiveDate,
    currencies: &[String],
) -> Result<()> {
    super::validate_range(start, end)?;

    let codes: BTreeSet<String> = currencies
        .iter()
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty())
        .collect();
    if codes.is_empty() {
        return Err(CoreError::Validation("no currencies selected".to_string()).into());
    }

    let series = relative_change_series(store, start, end, &codes)?;

    // Pivot to one row per date, one column per currency.
    let mut by_date: BTreeMap<NaiveDate, BTreeMap<&str, Decimal>> = BTreeMap::new();
    for (code, points) in &series {
        for point in points {
            by_date
                .entry(point.date)
                .or_default()
                .insert(code.as_str(), point.relative_change);
        }
    }

    if by_date.is_empty() {
        println!(
            "{}",
            ui::style_text(
                &format!("No relative change records between {start} and {end}."),
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    if let Some(base_date) = store.parameter(BASE_DATE_PARAM)? {
        println!(
            "{}",
            ui::style_text(
                &format!("Relative change (%) against {base_date}"),
                ui::StyleType::Title
            )
        );
    }

    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Date")];
    for code in &codes {
        header.push(ui::header_cell(code));
    }
    table.set_header(header);

    for (date, values) in &by_date {
        let mut row = vec![comfy_table::Cell::new(date.to_string())];
        for code in &codes {
            let cell = match values.get(code.as_str()) {
                Some(change) => ui::change_cell(*change),
                None => ui::na_cell(),
            };
            row.push(cell);
        }
        table.add_row(row);
    }

    println!("{table}");
    Ok(())
}
