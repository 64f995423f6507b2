//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Account configuration.
    #[serde(default)]
    pub accounts: AccountsConfig,
    /// Feed pagination configuration.
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Account configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountsConfig {
    /// Emails that are granted the admin role when they register.
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

impl AccountsConfig {
    /// Whether the given email should be bootstrapped as an admin.
    #[must_use]
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|e| e.eq_ignore_ascii_case(email.trim()))
    }
}

/// Feed pagination configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Page size used when the client does not send one.
    #[serde(default = "default_feed_limit")]
    pub default_limit: u64,
    /// Upper bound for client-supplied page sizes.
    #[serde(default = "default_feed_max_limit")]
    pub max_limit: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_limit: default_feed_limit(),
            max_limit: default_feed_max_limit(),
        }
    }
}

impl FeedConfig {
    /// Clamp a requested page size into `1..=max_limit`.
    #[must_use]
    pub fn clamp(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_feed_limit() -> u64 {
    20
}

const fn default_feed_max_limit() -> u64 {
    100
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `PAWPOST_ENV`)
    /// 3. Environment variables with `PAWPOST__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("PAWPOST_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PAWPOST")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("accounts.admin_emails")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PAWPOST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_clamp() {
        let feed = FeedConfig::default();
        assert_eq!(feed.clamp(None), 20);
        assert_eq!(feed.clamp(Some(0)), 1);
        assert_eq!(feed.clamp(Some(5)), 5);
        assert_eq!(feed.clamp(Some(10_000)), 100);
    }

    #[test]
    fn test_admin_email_match_is_case_insensitive() {
        let accounts = AccountsConfig {
            admin_emails: vec!["Root@Example.com".to_string()],
        };
        assert!(accounts.is_admin_email("root@example.com"));
        assert!(accounts.is_admin_email(" ROOT@example.com "));
        assert!(!accounts.is_admin_email("someone@example.com"));
    }

    #[test]
    fn test_deserialize_minimal_config() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "server": {},
            "database": { "url": "postgres://localhost/pawpost" },
        }))
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.accounts.admin_emails.is_empty());
        assert_eq!(config.feed.max_limit, 100);
    }
}
