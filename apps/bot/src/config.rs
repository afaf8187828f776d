use anyhow::{bail, Context, Result};

const DEFAULT_RESUMES_FILE: &str = "resumes.json";

/// Bot configuration loaded from environment variables.
/// Startup aborts if any required variable is missing or blank.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_api_url: String,
    pub llm_model: String,
    pub telegram_bot_token: String,
    pub resumes_file: String,
    /// Liveness listener port. No HTTP server is started when unset.
    pub port: Option<u16>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT").filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u16>()
                    .context("PORT must be a valid port number")?,
            ),
            None => None,
        };

        Ok(Config {
            llm_api_key: require(&lookup, "LLM_API_KEY")?,
            llm_api_url: require(&lookup, "LLM_API_URL")?,
            llm_model: require(&lookup, "LLM_MODEL")?,
            telegram_bot_token: require(&lookup, "TELEGRAM_BOT_TOKEN")?,
            resumes_file: lookup("RESUMES_FILE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_RESUMES_FILE.to_string()),
            port,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("Required environment variable '{key}' is not set"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn required() -> HashMap<String, String> {
        vars(&[
            ("LLM_API_KEY", "sk-test"),
            ("LLM_API_URL", "https://llm.example.com/v1"),
            ("LLM_MODEL", "gpt-4o-mini"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
        ])
    }

    #[test]
    fn test_loads_required_values_and_defaults() {
        let env = required();
        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.llm_api_key, "sk-test");
        assert_eq!(config.llm_api_url, "https://llm.example.com/v1");
        assert_eq!(config.llm_model, "gpt-4o-mini");
        assert_eq!(config.telegram_bot_token, "123:abc");
        assert_eq!(config.resumes_file, "resumes.json");
        assert_eq!(config.port, None);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_missing_required_variable_fails() {
        for key in ["LLM_API_KEY", "LLM_API_URL", "LLM_MODEL", "TELEGRAM_BOT_TOKEN"] {
            let mut env = required();
            env.remove(key);
            let err = Config::from_lookup(|k| env.get(k).cloned()).unwrap_err();
            assert!(err.to_string().contains(key), "error should name {key}");
        }
    }

    #[test]
    fn test_blank_required_variable_fails() {
        let mut env = required();
        env.insert("LLM_MODEL".to_string(), "   ".to_string());
        assert!(Config::from_lookup(|k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn test_optional_overrides() {
        let mut env = required();
        env.insert("RESUMES_FILE".to_string(), "/data/resumes.json".to_string());
        env.insert("PORT".to_string(), "8000".to_string());
        env.insert("RUST_LOG".to_string(), "debug".to_string());

        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.resumes_file, "/data/resumes.json");
        assert_eq!(config.port, Some(8000));
        assert_eq!(config.rust_log, "debug");
    }

    #[test]
    fn test_invalid_port_fails() {
        let mut env = required();
        env.insert("PORT".to_string(), "eighty".to_string());
        assert!(Config::from_lookup(|k| env.get(k).cloned()).is_err());
    }
}
