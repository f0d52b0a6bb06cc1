//! Optional process configuration, `settings.json` by convention.
//!
//! Everything has a default; the file only overrides what it names. CLI
//! flags take precedence over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub cache_file: Option<PathBuf>,
    #[serde(default)]
    pub codes_file: Option<PathBuf>,
    #[serde(default)]
    pub minfin_base_url: Option<String>,
    #[serde(default)]
    pub nbu_base_url: Option<String>,
    #[serde(default)]
    pub translation_base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    Ok(settings)
}

pub fn load_optional_settings(path: Option<&PathBuf>) -> Result<Option<Settings>> {
    match path {
        Some(settings_path) => Ok(Some(load_settings(settings_path)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_path_means_no_settings() {
        assert!(load_optional_settings(None).unwrap().is_none());
    }

    #[test]
    fn partial_files_parse() {
        let dir = std::env::temp_dir().join("rates_settings_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        std::fs::write(&path, r#"{"cache_file": "names.json", "timeout_secs": 5}"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.cache_file, Some(PathBuf::from("names.json")));
        assert_eq!(settings.timeout_secs, Some(5));
        assert!(settings.minfin_base_url.is_none());
        std::fs::remove_dir_all(&dir).ok();
    }
}
