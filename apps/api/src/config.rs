use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// JSON certificate used instead of the built-in seed for new sessions.
    pub seed_path: Option<PathBuf>,
    pub max_sessions: usize,
    /// Pagination flag applied to every new session.
    pub pagination_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            seed_path: std::env::var_os("CERTIFICATE_SEED_PATH").map(PathBuf::from),
            max_sessions: parse_env("MAX_SESSIONS", 64)?,
            pagination_enabled: parse_env("PAGINATION_ENABLED", true)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            seed_path: None,
            max_sessions: 64,
            pagination_enabled: true,
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let port: u16 = parse_env("CERTIFICATE_API_TEST_UNSET_PORT", 9000).unwrap();
        assert_eq!(port, 9000);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("CERTIFICATE_API_TEST_BAD_FLAG", "sometimes");
        let res: Result<bool> = parse_env("CERTIFICATE_API_TEST_BAD_FLAG", true);
        let err = res.unwrap_err();
        assert!(err.to_string().contains("CERTIFICATE_API_TEST_BAD_FLAG"));
    }

    #[test]
    fn test_parse_env_reads_value() {
        std::env::set_var("CERTIFICATE_API_TEST_MAX", " 3 ");
        let max: usize = parse_env("CERTIFICATE_API_TEST_MAX", 64).unwrap();
        assert_eq!(max, 3);
    }
}
