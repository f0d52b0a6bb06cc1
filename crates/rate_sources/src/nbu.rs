//! Official daily rate from the National Bank of Ukraine statistics service.
//!
//! One JSON payload per date listing every tracked currency; the record
//! matching the requested currency becomes a single "NBU" rate. Non-trading
//! days and untracked currencies simply have no record.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{RateSource, RawRate, SourceConfig, SourceError};

#[derive(Debug)]
pub struct NbuSource {
    http: Client,
    base_url: String,
}

impl NbuSource {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self {
            http,
            base_url: config.nbu_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct NbuQuote {
    cc: String,
    rate: f64,
}

impl RateSource for NbuSource {
    fn name(&self) -> &'static str {
        "nbu"
    }

    fn fetch(&self, cc: &str, date: NaiveDate) -> Result<Vec<RawRate>, SourceError> {
        let url = format!(
            "{}/NBUStatService/v1/statdirectory/exchange?date={}&json",
            self.base_url,
            date.format("%Y%m%d")
        );
        let unavailable = |cause: reqwest::Error| SourceError::Unavailable {
            src: "nbu",
            cc: cc.to_string(),
            date,
            cause,
        };

        let quotes: Vec<NbuQuote> = self
            .http
            .get(&url)
            .send()
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .map_err(unavailable)?;

        let quote = select_quote(&quotes, cc).ok_or_else(|| SourceError::NotFound {
            src: "nbu",
            cc: cc.to_string(),
            date,
        })?;

        Ok(vec![RawRate {
            bank: "NBU".to_string(),
            rate: quote.rate,
        }])
    }
}

fn select_quote<'a>(quotes: &'a [NbuQuote], cc: &str) -> Option<&'a NbuQuote> {
    quotes.iter().find(|q| q.cc.eq_ignore_ascii_case(cc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<NbuQuote> {
        serde_json::from_str(
            r#"[
                {"r030":840,"txt":"Долар США","rate":27.19,"cc":"USD","exchangedate":"03.04.2021"},
                {"r030":978,"txt":"Євро","rate":32.61,"cc":"EUR","exchangedate":"03.04.2021"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn selects_the_matching_record() {
        let quotes = fixture();
        let quote = select_quote(&quotes, "EUR").unwrap();
        assert_eq!(quote.rate, 32.61);
    }

    #[test]
    fn match_is_case_insensitive() {
        let quotes = fixture();
        assert!(select_quote(&quotes, "usd").is_some());
    }

    #[test]
    fn missing_currency_selects_nothing() {
        let quotes = fixture();
        assert!(select_quote(&quotes, "GBP").is_none());
    }
}
