//! Blocking client for the public MyMemory translation endpoint.

use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use crate::{Translate, TranslationError};

/// Configuration for the MyMemory REST endpoint.
#[derive(Debug, Clone)]
pub struct MyMemoryConfig {
    pub base_url: String,
    pub source_lang: String,
    pub target_lang: String,
    pub timeout_secs: u64,
}

impl Default for MyMemoryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mymemory.translated.net".to_string(),
            source_lang: "uk".to_string(),
            target_lang: "en".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Minimal MyMemory client (blocking HTTP, one GET per translation).
#[derive(Debug, Clone)]
pub struct MyMemoryTranslator {
    http: Client,
    endpoint: Url,
    langpair: String,
}

impl MyMemoryTranslator {
    pub fn new(config: MyMemoryConfig) -> Result<Self, TranslationError> {
        let base: Url = config
            .base_url
            .parse()
            .map_err(|e| TranslationError::Endpoint(format!("{}: {e}", config.base_url)))?;
        let endpoint = base
            .join("get")
            .map_err(|e| TranslationError::Endpoint(format!("{}: {e}", config.base_url)))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TranslationError::Unavailable(format!("building HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            langpair: format!("{}|{}", config.source_lang, config.target_lang),
        })
    }
}

#[derive(Debug, Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    response_data: MyMemoryData,
}

#[derive(Debug, Deserialize)]
struct MyMemoryData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

impl Translate for MyMemoryTranslator {
    fn translate(&self, text: &str) -> Result<String, TranslationError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[("q", text), ("langpair", &self.langpair)])
            .send()
            .map_err(|e| TranslationError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| TranslationError::Unavailable(e.to_string()))?;

        let payload: MyMemoryResponse = response
            .json()
            .map_err(|e| TranslationError::Unavailable(format!("decoding response: {e}")))?;

        payload
            .response_data
            .translated_text
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| TranslationError::Unavailable(format!("empty translation for {text:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builds_a_client() {
        let translator = MyMemoryTranslator::new(MyMemoryConfig::default()).unwrap();
        assert_eq!(translator.langpair, "uk|en");
        assert_eq!(
            translator.endpoint.as_str(),
            "https://api.mymemory.translated.net/get"
        );
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let config = MyMemoryConfig {
            base_url: "not a url".to_string(),
            ..MyMemoryConfig::default()
        };
        assert!(matches!(
            MyMemoryTranslator::new(config),
            Err(TranslationError::Endpoint(_))
        ));
    }
}
