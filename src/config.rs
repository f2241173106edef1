/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可, pool 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_name: String,
    pub app_env: AppEnv,

    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_seconds: u64,

    pub cors_allowed_origins: Vec<String>,
    pub request_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = lookup("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_name = lookup("APP_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let database_url = lookup("DATABASE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid("DB_MAX_CONNECTIONS"))?,
            None => 5,
        };

        let db_acquire_timeout_seconds = lookup("DB_ACQUIRE_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout_seconds = lookup("REQUEST_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        Ok(Self {
            addr,
            app_name,
            app_env,
            database_url,
            db_max_connections,
            db_acquire_timeout_seconds,
            cors_allowed_origins,
            request_timeout_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/app")]).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_name, "hello-session");
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.db_acquire_timeout_seconds, 5);
        assert_eq!(config.request_timeout_seconds, 30);
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn missing_database_url_fails() {
        let err = config_from(&[("PORT", "8080")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let err = config_from(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("DB_MAX_CONNECTIONS", "0"),
        ])
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid configuration: DB_MAX_CONNECTIONS");
    }

    #[test]
    fn production_settings_are_read() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://db/app"),
            ("APP_NAME", "  health-api "),
            ("APP_ENV", "PROD"),
            ("PORT", "8080"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
        ])
        .unwrap();

        assert_eq!(config.app_name, "health-api");
        assert!(config.app_env.is_production());
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }
}
