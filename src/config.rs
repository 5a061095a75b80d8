use anyhow::{Context, Result};
use std::env;

const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";
const DEFAULT_MODEL: &str = "google/gemini-flash-1.5";
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_output_tokens: u32,
    pub server_addr: String,
}

impl AiConfig {
    /// Load from the process environment (after `.env` has been applied).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |primary: &str, fallback: Option<&str>| -> Option<String> {
            clean(lookup(primary)).or_else(|| fallback.and_then(|f| clean(lookup(f))))
        };

        let api_key = read("OPENROUTER_API_KEY", Some("AI_API_KEY"))
            .filter(|key| key != PLACEHOLDER_API_KEY)
            .context(
                "AI features are not configured: no valid API key. \
                 Set OPENROUTER_API_KEY (or AI_API_KEY) in your .env file and try again.",
            )?;

        let max_output_tokens = match read("MAX_OUTPUT_TOKENS", None) {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("MAX_OUTPUT_TOKENS must be a positive integer, got '{}'", raw))?,
            None => DEFAULT_MAX_OUTPUT_TOKENS,
        };

        Ok(Self {
            api_key,
            model: read("OPENROUTER_MODEL", Some("AI_MODEL")).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: read("OPENROUTER_BASE_URL", None).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_output_tokens,
            server_addr: read("SERVER_ADDR", None).unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
        })
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AiConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AiConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("OPENROUTER_API_KEY", " sk-or-123 ")]).unwrap();

        assert_eq!(config.api_key, "sk-or-123");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_output_tokens, 2048);
        assert_eq!(config.server_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_fallback_variables() {
        let config = load(&[("AI_API_KEY", "k"), ("OPENROUTER_API_KEY", "  "), ("AI_MODEL", "m")]).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.model, "m");
    }

    #[test]
    fn test_placeholder_key_rejected() {
        let err = load(&[("OPENROUTER_API_KEY", "YOUR_API_KEY_HERE")]).unwrap_err();
        assert!(err.to_string().contains("API key"));

        assert!(load(&[]).is_err());
    }

    #[test]
    fn test_bad_max_tokens() {
        let err = load(&[("OPENROUTER_API_KEY", "k"), ("MAX_OUTPUT_TOKENS", "lots")]).unwrap_err();
        assert!(err.to_string().contains("MAX_OUTPUT_TOKENS"));
    }
}
