//! Reference data provider backed by the ISO 4217 "list one" XML
//! (country name, currency name, alphabetic and numeric codes).

use crate::core::fetch::{RawCurrency, ReferenceFetcher};
use crate::providers::util::with_retry;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

pub struct Iso4217Provider {
    base_url: String,
}

impl Iso4217Provider {
    pub fn new(base_url: &str) -> Self {
        Iso4217Provider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Iso4217Document {
    #[serde(rename = "CcyTbl")]
    table: CurrencyTable,
}

#[derive(Debug, Deserialize)]
struct CurrencyTable {
    #[serde(rename = "CcyNtry", default)]
    entries: Vec<CurrencyEntry>,
}

#[derive(Debug, Deserialize)]
struct CurrencyEntry {
    #[serde(rename = "CtryNm")]
    country: String,
    // CcyNm can carry an IsFund attribute, so it needs a text wrapper.
    #[serde(rename = "CcyNm")]
    currency_name: CurrencyName,
    #[serde(rename = "Ccy")]
    currency_code: Option<String>,
    #[serde(rename = "CcyNbr")]
    currency_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrencyName {
    #[serde(rename = "$text", default)]
    value: String,
}

#[async_trait]
impl ReferenceFetcher for Iso4217Provider {
    async fn fetch_reference_data(&self) -> Result<Vec<RawCurrency>> {
        let url = format!("{}/lists/list-one.xml", self.base_url);
        debug!("Requesting currency reference table from {}", url);

        let client = reqwest::Client::builder().user_agent("fxtrend/0.2").build()?;
        let response = with_retry(|| async { client.get(&url).send().await }, 3, 500)
            .await
            .context("Failed to request the currency reference table")?;
        if !response.status().is_success() {
            bail!("Reference source returned {}", response.status());
        }

        let body = response
            .text()
            .await
            .context("Failed to read the currency reference response")?;
        let document: Iso4217Document = quick_xml::de::from_str(&body)
            .context("Failed to parse the currency reference table")?;

        let rows: Vec<RawCurrency> = document
            .table
            .entries
            .into_iter()
            // Territories without a universal currency have no code.
            .filter_map(|entry| {
                entry.currency_code.map(|code| RawCurrency {
                    country: entry.country,
                    currency_name: entry.currency_name.value,
                    currency_code: code,
                    currency_number: entry.currency_number.unwrap_or_default(),
                })
            })
            .collect();

        debug!("Fetched {} currency reference rows", rows.len());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LIST_ONE: &str = r#"<ISO_4217 Pblshd="2023-01-01">
  <CcyTbl>
    <CcyNtry>
      <CtryNm>GERMANY</CtryNm>
      <CcyNm>Euro</CcyNm>
      <Ccy>EUR</Ccy>
      <CcyNbr>978</CcyNbr>
      <CcyMnrUnts>2</CcyMnrUnts>
    </CcyNtry>
    <CcyNtry>
      <CtryNm>UNITED STATES OF AMERICA (THE)</CtryNm>
      <CcyNm>US Dollar</CcyNm>
      <Ccy>USD</Ccy>
      <CcyNbr>840</CcyNbr>
      <CcyMnrUnts>2</CcyMnrUnts>
    </CcyNtry>
    <CcyNtry>
      <CtryNm>UNITED STATES OF AMERICA (THE)</CtryNm>
      <CcyNm IsFund="true">US Dollar (Next day)</CcyNm>
      <Ccy>USN</Ccy>
      <CcyNbr>997</CcyNbr>
      <CcyMnrUnts>2</CcyMnrUnts>
    </CcyNtry>
    <CcyNtry>
      <CtryNm>ANTARCTICA</CtryNm>
      <CcyNm>No universal currency</CcyNm>
    </CcyNtry>
  </CcyTbl>
</ISO_4217>"#;

    async fn mount_list(server: &MockServer, body: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path("/lists/list-one.xml"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn parses_entries_and_skips_territories_without_a_code() {
        let server = MockServer::start().await;
        mount_list(&server, LIST_ONE, 200).await;

        let provider = Iso4217Provider::new(&server.uri());
        let rows = provider.fetch_reference_data().await.unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            RawCurrency {
                country: "GERMANY".to_string(),
                currency_name: "Euro".to_string(),
                currency_code: "EUR".to_string(),
                currency_number: "978".to_string(),
            }
        );
        assert_eq!(rows[2].currency_name, "US Dollar (Next day)");
        assert!(!rows.iter().any(|r| r.country == "ANTARCTICA"));
    }

    #[tokio::test]
    async fn server_error_fails_the_fetch() {
        let server = MockServer::start().await;
        mount_list(&server, "", 503).await;

        let provider = Iso4217Provider::new(&server.uri());
        let result = provider.fetch_reference_data().await;

        assert!(result.unwrap_err().to_string().contains("returned 503"));
    }

    #[tokio::test]
    async fn malformed_document_fails_the_fetch() {
        let server = MockServer::start().await;
        mount_list(&server, "<ISO_4217><Nothing/></ISO_4217>", 200).await;

        let provider = Iso4217Provider::new(&server.uri());
        let result = provider.fetch_reference_data().await;

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Failed to parse the currency reference table"));
    }
}
