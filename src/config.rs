use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::{Error, Result};

const API_KEY_PLACEHOLDER: &str = "your_api_key_here";

pub struct Config {
    pub api_key: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub llm_max_tokens: u64,
    pub database_path: PathBuf,
    pub tesseract_cmd: String,
    pub ocr_language: String,
}

pub fn load_config() -> Result<Config> {
    info!("Loading configuration");

    // Load environment variables
    dotenv().ok();

    from_lookup(|key| env::var(key).ok())
}

/// Builds the configuration from an arbitrary variable source.
fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let api_key = lookup("ANTHROPIC_API_KEY")
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| Error::Config("Missing ANTHROPIC_API_KEY".to_string()))?;

    if api_key == API_KEY_PLACEHOLDER {
        return Err(Error::Config(
            "ANTHROPIC_API_KEY still holds the placeholder value".to_string(),
        ));
    }

    let llm_model =
        lookup("LLM_MODEL").unwrap_or_else(|| "claude-3-5-sonnet-latest".to_string());

    let llm_timeout_secs = lookup("LLM_TIMEOUT_SECS")
        .unwrap_or_else(|| "20".to_string())
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or_else(|| Error::Config("Invalid LLM_TIMEOUT_SECS".to_string()))?;

    let llm_max_tokens = lookup("LLM_MAX_TOKENS")
        .unwrap_or_else(|| "1024".to_string())
        .parse::<u64>()
        .map_err(|_| Error::Config("Invalid LLM_MAX_TOKENS".to_string()))?;

    let database_path = lookup("VOCAB_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./data/vocab.db"));

    let tesseract_cmd = lookup("TESSERACT_CMD").unwrap_or_else(|| "tesseract".to_string());

    let ocr_language = lookup("OCR_LANGUAGE").unwrap_or_else(|| "eng".to_string());

    Ok(Config {
        api_key,
        llm_model,
        llm_timeout: Duration::from_secs(llm_timeout_secs),
        llm_max_tokens,
        database_path,
        tesseract_cmd,
        ocr_language,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let config = from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.llm_model, "claude-3-5-sonnet-latest");
        assert_eq!(config.llm_timeout, Duration::from_secs(20));
        assert_eq!(config.llm_max_tokens, 1024);
        assert_eq!(config.database_path, PathBuf::from("./data/vocab.db"));
        assert_eq!(config.tesseract_cmd, "tesseract");
        assert_eq!(config.ocr_language, "eng");
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let result = from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("ANTHROPIC_API_KEY")));

        let result = from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "   ")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_placeholder_api_key_is_rejected() {
        let result = from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "your_api_key_here")]));
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("placeholder")));
    }

    #[test]
    fn test_invalid_timeout() {
        for value in ["0", "soon", "-3"] {
            let result = from_lookup(lookup_from(&[
                ("ANTHROPIC_API_KEY", "sk-test"),
                ("LLM_TIMEOUT_SECS", value),
            ]));
            assert!(matches!(result, Err(Error::Config(_))), "accepted {value}");
        }
    }

    #[test]
    fn test_overrides() {
        let config = from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("LLM_MODEL", "claude-3-haiku-20240307"),
            ("LLM_TIMEOUT_SECS", "12"),
            ("VOCAB_DB_PATH", "/tmp/words.db"),
            ("OCR_LANGUAGE", "eng+fra"),
        ]))
        .unwrap();

        assert_eq!(config.llm_model, "claude-3-haiku-20240307");
        assert_eq!(config.llm_timeout, Duration::from_secs(12));
        assert_eq!(config.database_path, PathBuf::from("/tmp/words.db"));
        assert_eq!(config.ocr_language, "eng+fra");
    }
}
