//! Alphabetic/numeric currency code resolution.
//!
//! The table is the ISO 4217 `{AlphabeticCode, NumericCode}` list, loaded once
//! at startup either from a JSON file or from the copy bundled into the
//! binary. Lookups are pure and case-insensitive.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const BUNDLED_TABLE: &str = include_str!("../data/iso4217.json");

#[derive(Debug, Error)]
pub enum CodeError {
    #[error("no currency with alphabetic code {0:?}")]
    UnknownAlphabetic(String),
    #[error("no currency with numeric code {0}")]
    UnknownNumeric(u32),
    #[error("reading code table {path}: {cause}")]
    Read {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },
    #[error("parsing code table {path}: {cause}")]
    Parse {
        path: PathBuf,
        #[source]
        cause: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeEntry {
    #[serde(rename = "AlphabeticCode")]
    pub alphabetic: String,
    #[serde(rename = "NumericCode")]
    pub numeric: u32,
}

/// Immutable alphabetic<->numeric lookup table.
#[derive(Debug, Clone)]
pub struct CodeTable {
    entries: Vec<CodeEntry>,
}

impl CodeTable {
    /// Loads the table from a `numeric.json`-style file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CodeError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|cause| CodeError::Read {
            path: path.to_path_buf(),
            cause,
        })?;
        let entries: Vec<CodeEntry> =
            serde_json::from_str(&raw).map_err(|cause| CodeError::Parse {
                path: path.to_path_buf(),
                cause,
            })?;
        Ok(Self { entries })
    }

    /// The table compiled into the binary, for use when no file is configured.
    pub fn bundled() -> Self {
        let entries =
            serde_json::from_str(BUNDLED_TABLE).expect("bundled code table is valid JSON");
        Self { entries }
    }

    /// Numeric (r030) code for an alphabetic code, any case accepted.
    pub fn numeric(&self, alphabetic: &str) -> Result<u32, CodeError> {
        let wanted = alphabetic.to_uppercase();
        self.entries
            .iter()
            .find(|e| e.alphabetic == wanted)
            .map(|e| e.numeric)
            .ok_or_else(|| CodeError::UnknownAlphabetic(alphabetic.to_string()))
    }

    /// Alphabetic code for a numeric (r030) code.
    pub fn alphabetic(&self, numeric: u32) -> Result<&str, CodeError> {
        self.entries
            .iter()
            .find(|e| e.numeric == numeric)
            .map(|e| e.alphabetic.as_str())
            .ok_or(CodeError::UnknownNumeric(numeric))
    }

    /// Resolves user input given as either code form ("usd", "USD" or "840")
    /// to the canonical uppercase alphabetic code.
    pub fn canonical_cc(&self, input: &str) -> Result<String, CodeError> {
        if let Ok(numeric) = input.trim().parse::<u32>() {
            return self.alphabetic(numeric).map(str::to_string);
        }
        let upper = input.trim().to_uppercase();
        self.numeric(&upper)?;
        Ok(upper)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
