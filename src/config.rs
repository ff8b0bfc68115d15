//! Process configuration from environment variables

use crate::llm::LlmConfig;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;

/// System prompt used when no prompt file is configured or readable
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a careful assistant helping a person work through \
their own dream using the Jungian method. Follow the instructions in each message exactly. \
When asked for a list, answer with the list only.";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub llm: LlmConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = LlmConfig::default();

        let port = parse_or(var("DREAM_PORT"), "DREAM_PORT", DEFAULT_PORT)?;
        let memory_window = parse_or(
            var("DREAM_MEMORY_WINDOW"),
            "DREAM_MEMORY_WINDOW",
            defaults.memory_window,
        )?;
        let timeout_secs = parse_or(
            var("DREAM_LLM_TIMEOUT_SECS"),
            "DREAM_LLM_TIMEOUT_SECS",
            defaults.timeout.as_secs(),
        )?;

        let llm = LlmConfig {
            openai_api_key: var("OPENAI_API_KEY"),
            base_url: var("LLM_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            default_model: var("DEFAULT_MODEL").unwrap_or(defaults.default_model),
            system_prompt: Some(load_system_prompt(var("DREAM_SYSTEM_PROMPT_FILE"))),
            memory_window,
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self { port, llm })
    }
}

fn parse_or<T: FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

fn load_system_prompt(path: Option<String>) -> String {
    let Some(path) = path else {
        return DEFAULT_SYSTEM_PROMPT.to_string();
    };
    match std::fs::read_to_string(&path) {
        Ok(content) if !content.trim().is_empty() => {
            tracing::info!(path = %path, "Loaded system prompt");
            content.trim().to_string()
        }
        Ok(_) => {
            tracing::warn!(path = %path, "System prompt file is empty, using default");
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
        Err(e) => {
            tracing::warn!(
                path = %path,
                error = %e,
                "Cannot read system prompt file, using default"
            );
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.llm.openai_api_key, None);
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.default_model, "gpt-4o-mini");
        assert_eq!(config.llm.memory_window, 100);
        assert_eq!(config.llm.timeout, Duration::from_secs(300));
        assert_eq!(config.llm.system_prompt.as_deref(), Some(DEFAULT_SYSTEM_PROMPT));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DREAM_PORT", "9100"),
            ("OPENAI_API_KEY", "sk-test"),
            ("LLM_BASE_URL", "http://localhost:11434/v1/"),
            ("DEFAULT_MODEL", "llama3"),
            ("DREAM_MEMORY_WINDOW", "0"),
            ("DREAM_LLM_TIMEOUT_SECS", " 30 "),
        ]))
        .unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.llm.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
        assert_eq!(config.llm.default_model, "llama3");
        assert_eq!(config.llm.memory_window, 0);
        assert_eq!(config.llm.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config =
            Config::from_lookup(lookup(&[("OPENAI_API_KEY", ""), ("DREAM_PORT", "  ")])).unwrap();
        assert_eq!(config.llm.openai_api_key, None);
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_invalid_number() {
        let err = Config::from_lookup(lookup(&[("DREAM_PORT", "eighty")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "DREAM_PORT",
                value: "eighty".to_string()
            }
        );
        assert!(Config::from_lookup(lookup(&[("DREAM_MEMORY_WINDOW", "-1")])).is_err());
    }

    #[test]
    fn test_system_prompt_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "You interpret dreams.").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config =
            Config::from_lookup(lookup(&[("DREAM_SYSTEM_PROMPT_FILE", path.as_str())])).unwrap();
        assert_eq!(config.llm.system_prompt.as_deref(), Some("You interpret dreams."));
    }

    #[test]
    fn test_unreadable_prompt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let missing = missing.to_str().unwrap();

        let config =
            Config::from_lookup(lookup(&[("DREAM_SYSTEM_PROMPT_FILE", missing)])).unwrap();
        assert_eq!(config.llm.system_prompt.as_deref(), Some(DEFAULT_SYSTEM_PROMPT));
    }
}
