//! JSON and CSV export of normalized rate records.

use models::{ExchangeRateRecord, Snapshot};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{path:?} must have a .{expected} extension")]
    BadExtension {
        path: PathBuf,
        expected: &'static str,
    },
    #[error("{path:?} would overwrite the translation cache")]
    CacheCollision { path: PathBuf },
    #[error("nothing to export, the header row would be undefined")]
    EmptyInput,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

fn check_extension(path: &Path, expected: &'static str) -> Result<(), ExportError> {
    let ok = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(expected))
        .unwrap_or(false);
    if ok {
        Ok(())
    } else {
        Err(ExportError::BadExtension {
            path: path.to_path_buf(),
            expected,
        })
    }
}

fn ensure_parent(path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Writes a snapshot or a whole period verbatim as a pretty JSON array.
///
/// Refuses a target named like the translation cache file.
pub fn write_json<T: Serialize>(
    path: &Path,
    data: &T,
    cache_path: &Path,
) -> Result<(), ExportError> {
    check_extension(path, "json")?;
    if path.file_name() == cache_path.file_name() {
        return Err(ExportError::CacheCollision {
            path: path.to_path_buf(),
        });
    }
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Writes records as CSV: one header row from the record field names
/// (`bank,r030,cc,rate,date`), then one row per record in order.
pub fn write_csv(path: &Path, records: &[ExchangeRateRecord]) -> Result<(), ExportError> {
    check_extension(path, "csv")?;
    if records.is_empty() {
        return Err(ExportError::EmptyInput);
    }
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// CSV for a whole period: flattens the per-date lists first.
pub fn write_csv_period(path: &Path, period: &[Snapshot]) -> Result<(), ExportError> {
    let records: Vec<ExchangeRateRecord> = period.iter().flatten().cloned().collect();
    write_csv(path, &records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(bank: &str, rate: f64, date: &str) -> ExchangeRateRecord {
        ExchangeRateRecord {
            bank: bank.to_string(),
            r030: 840,
            cc: "USD".to_string(),
            rate,
            date: date.to_string(),
        }
    }

    #[test]
    fn csv_header_matches_record_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        let records = vec![
            record("PrivatBank", 27.55, "01.01.2021"),
            record("Oschadbank", 27.60, "01.01.2021"),
        ];

        write_csv(&path, &records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "bank,r030,cc,rate,date");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "PrivatBank,840,USD,27.55,01.01.2021");
    }

    #[test]
    fn csv_flattens_a_period() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        let period = vec![
            vec![record("A", 27.5, "01.01.2021")],
            vec![record("A", 28.0, "01.02.2021")],
        ];

        write_csv_period(&path, &period).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn csv_rejects_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_csv(&dir.path().join("rates.csv"), &[]).unwrap_err();
        assert!(matches!(err, ExportError::EmptyInput));
    }

    #[test]
    fn csv_rejects_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_csv(&dir.path().join("rates.txt"), &[record("A", 1.0, "x")]).unwrap_err();
        assert!(matches!(err, ExportError::BadExtension { expected: "csv", .. }));
    }

    #[test]
    fn json_writes_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.json");
        let records = vec![record("PrivatBank", 27.55, "01.01.2021")];

        write_json(&path, &records, Path::new("CACHE.json")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<ExchangeRateRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn json_rejects_the_cache_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_json(
            &dir.path().join("CACHE.json"),
            &vec![record("A", 1.0, "x")],
            Path::new("CACHE.json"),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::CacheCollision { .. }));
    }

    #[test]
    fn json_rejects_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_json(
            &dir.path().join("rates.csv"),
            &vec![record("A", 1.0, "x")],
            Path::new("CACHE.json"),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::BadExtension { expected: "json", .. }));
    }
}
