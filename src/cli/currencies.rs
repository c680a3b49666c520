use super::ui;
use crate::core::available_currencies;
use crate::store::ReferenceStore;
use anyhow::Result;

/// Lists the currencies that have both reference data and stored rate
/// observations, so the user knows what `report` can plot.
pub fn run(store: &ReferenceStore) -> Result<()> {
    let choices = available_currencies(store)?;

    if choices.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "No synchronized currencies yet. Run `fxtrend sync` first.",
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Code"), ui::header_cell("Currency")]);
    for choice in &choices {
        table.add_row(vec![choice.code.clone(), choice.label.clone()]);
    }
    println!("{table}");

    Ok(())
}
