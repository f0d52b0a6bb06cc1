//! Remote exchange-rate sources.
//!
//! Each source turns `(currency, date)` into raw `(bank, rate)` pairs with
//! exactly one remote call. Normalization into full records happens
//! downstream; sources only know how to talk to their endpoint and what shape
//! the response has.

pub mod minfin;
pub mod nbu;

pub use minfin::MinfinSource;
pub use nbu::NbuSource;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unsupported source: {0}")]
    UnknownSource(String),
    #[error("{src} request for {cc} on {date} failed: {cause}")]
    Unavailable {
        src: &'static str,
        cc: String,
        date: NaiveDate,
        #[source]
        cause: reqwest::Error,
    },
    #[error("{src} has no rates for {cc} on {date}")]
    NoData {
        src: &'static str,
        cc: String,
        date: NaiveDate,
    },
    #[error("{src} has no {cc} record on {date}")]
    NotFound {
        src: &'static str,
        cc: String,
        date: NaiveDate,
    },
    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// One bank's rate before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRate {
    pub bank: String,
    pub rate: f64,
}

/// A remote rate source for one currency on one date.
pub trait RateSource: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Bank names come back in the source language and need translation.
    fn localized_names(&self) -> bool {
        false
    }

    fn fetch(&self, cc: &str, date: NaiveDate) -> Result<Vec<RawRate>, SourceError>;
}

/// Shared configuration for the built-in sources.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub minfin_base_url: String,
    pub nbu_base_url: String,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            minfin_base_url: "https://minfin.com.ua".to_string(),
            nbu_base_url: "https://bank.gov.ua".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Picks a source by key.
pub fn get_source(key: &str, config: &SourceConfig) -> Result<Box<dyn RateSource>, SourceError> {
    match key.to_lowercase().as_str() {
        "minfin" => Ok(Box::new(MinfinSource::new(config)?)),
        "nbu" => Ok(Box::new(NbuSource::new(config)?)),
        _ => Err(SourceError::UnknownSource(key.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_knows_both_sources() {
        let config = SourceConfig::default();
        assert_eq!(get_source("minfin", &config).unwrap().name(), "minfin");
        assert_eq!(get_source("NBU", &config).unwrap().name(), "nbu");
    }

    #[test]
    fn registry_rejects_unknown_keys() {
        let err = get_source("privat", &SourceConfig::default()).unwrap_err();
        assert!(matches!(err, SourceError::UnknownSource(k) if k == "privat"));
    }
}
