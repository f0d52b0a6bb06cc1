use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Date format used in every record: `day.month.year`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// One bank's exchange rate for one currency on one date.
///
/// Field order is fixed; the CSV exporter derives its header row from it
/// (`bank,r030,cc,rate,date`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExchangeRateRecord {
    pub bank: String,
    pub r030: u32,
    pub cc: String,
    pub rate: f64,
    pub date: String,
}

/// All records for one currency on one date from one source.
pub type Snapshot = Vec<ExchangeRateRecord>;

/// Chronologically ordered snapshots spanning a date range.
pub type Period = Vec<Snapshot>;

/// Step unit used to generate the dates of a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unsupported granularity {0:?}, expected day, month or year")]
pub struct ParseGranularityError(String);

impl FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(Granularity::Day),
            "month" => Ok(Granularity::Month),
            "year" => Ok(Granularity::Year),
            other => Err(ParseGranularityError(other.to_string())),
        }
    }
}
