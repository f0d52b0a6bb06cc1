//! Persistent bank-name translation cache.
//!
//! Bank names scraped from Ukrainian sources are translated to English once
//! and remembered across runs in a flat JSON file (`CACHE.json` by default,
//! `{"ПриватБанк": "PrivatBank", ...}`). The cache is loaded wholesale at
//! startup and rewritten wholesale after every new entry, so a run that dies
//! mid-collection loses at most the entries of the current batch.

mod mymemory;

pub use mymemory::{MyMemoryConfig, MyMemoryTranslator};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name used for the cache when nothing else is configured.
pub const DEFAULT_CACHE_FILE: &str = "CACHE.json";

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation service unavailable: {0}")]
    Unavailable(String),
    #[error("bad translation endpoint: {0}")]
    Endpoint(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache file is not a flat JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

/// External translation collaborator, source language fixed per instance.
pub trait Translate {
    fn translate(&self, text: &str) -> Result<String, TranslationError>;
}

/// Source-name -> display-name map backed by a JSON file.
#[derive(Debug)]
pub struct TranslationCache {
    entries: BTreeMap<String, String>,
    path: PathBuf,
}

impl TranslationCache {
    /// Loads the cache file, treating a missing file as an empty cache.
    pub fn load<P: Into<PathBuf>>(path: P) -> Result<Self, TranslationError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { entries, path })
    }

    /// Returns the display name for `source_name`, translating on a miss.
    ///
    /// A hit makes no external call. A miss calls the translator once, stores
    /// the result and flushes the whole cache to disk before returning. If the
    /// translator fails, neither the map nor the file is touched.
    pub fn lookup_or_translate(
        &mut self,
        source_name: &str,
        translator: &dyn Translate,
    ) -> Result<String, TranslationError> {
        if let Some(known) = self.entries.get(source_name) {
            return Ok(known.clone());
        }
        let translated = translator.translate(source_name)?;
        log::debug!("translated {source_name:?} -> {translated:?}");
        self.entries
            .insert(source_name.to_string(), translated.clone());
        self.flush()?;
        Ok(translated)
    }

    fn flush(&self) -> Result<(), TranslationError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn contains(&self, source_name: &str) -> bool {
        self.entries.contains_key(source_name)
    }

    /// All cached display names, in key order.
    pub fn display_names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeTranslator {
        calls: Cell<usize>,
        fail: bool,
    }

    impl FakeTranslator {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: Cell::new(0),
                fail: true,
            }
        }
    }

    impl Translate for FakeTranslator {
        fn translate(&self, text: &str) -> Result<String, TranslationError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(TranslationError::Unavailable("down".into()));
            }
            Ok(format!("{text}-en"))
        }
    }

    #[test]
    fn missing_file_is_an_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TranslationCache::load(dir.path().join("CACHE.json")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn miss_translates_and_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CACHE.json");
        let mut cache = TranslationCache::load(&path).unwrap();
        let translator = FakeTranslator::new();

        let name = cache.lookup_or_translate("Банк", &translator).unwrap();
        assert_eq!(name, "Банк-en");
        assert_eq!(translator.calls.get(), 1);

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("Банк-en"));
    }

    #[test]
    fn hit_makes_no_external_call() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = TranslationCache::load(dir.path().join("CACHE.json")).unwrap();
        let translator = FakeTranslator::new();

        let first = cache.lookup_or_translate("Банк", &translator).unwrap();
        let second = cache.lookup_or_translate("Банк", &translator).unwrap();
        assert_eq!(first, second);
        assert_eq!(translator.calls.get(), 1);
    }

    #[test]
    fn translator_failure_leaves_cache_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CACHE.json");
        let mut cache = TranslationCache::load(&path).unwrap();
        let translator = FakeTranslator::failing();

        let err = cache.lookup_or_translate("Банк", &translator).unwrap_err();
        assert!(matches!(err, TranslationError::Unavailable(_)));
        assert!(cache.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn survives_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CACHE.json");
        let translator = FakeTranslator::new();

        {
            let mut cache = TranslationCache::load(&path).unwrap();
            cache.lookup_or_translate("Банк", &translator).unwrap();
        }

        let reloaded = TranslationCache::load(&path).unwrap();
        assert!(reloaded.contains("Банк"));
        assert_eq!(reloaded.display_names().collect::<Vec<_>>(), ["Банк-en"]);
    }
}
