//! Configuration loader and validator for the scraper service.
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub database: Database,
    pub server: Server,
    #[serde(default)]
    pub scrape: Scrape,
}

/// Storage connection settings. `DATABASE_URL` in the environment takes
/// precedence over the file value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Database {
    pub url: String,
}

/// HTTP trigger surface settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Server {
    pub bind: String,
    /// Optional bearer secret. When unset the /scrape endpoint is open.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Include error detail chains in 500 responses. Keep off in production.
    #[serde(default)]
    pub expose_errors: bool,
}

/// Tunables for the page fetch. The target URL, container selector and
/// content-source identity are fixed constants in `pipeline`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Scrape {
    pub navigation_timeout_secs: u64,
    pub selector_timeout_secs: u64,
    /// Fixed UTC offset the listing's civil dates are interpreted in.
    /// IPIndia publishes in IST.
    pub timezone_offset: String,
}

impl Default for Scrape {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: 60,
            selector_timeout_secs: 10,
            timezone_offset: "+05:30".to_string(),
        }
    }
}

impl Config {
    /// The offset civil publication dates are interpreted in.
    /// Guaranteed to parse after `validate`.
    pub fn publication_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.scrape
            .timezone_offset
            .parse::<FixedOffset>()
            .map_err(|_| ConfigError::Invalid("scrape.timezone_offset must be like \"+05:30\""))
    }

    /// Database URL with the `DATABASE_URL` environment override applied.
    pub fn database_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| self.database.url.clone())
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.database.url.trim().is_empty() {
        return Err(ConfigError::Invalid("database.url must be non-empty"));
    }
    if cfg.server.bind.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::Invalid(
            "server.bind must be a host:port address",
        ));
    }
    if let Some(key) = &cfg.server.api_key {
        if key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "server.api_key must be non-empty when set",
            ));
        }
    }
    if cfg.scrape.navigation_timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "scrape.navigation_timeout_secs must be > 0",
        ));
    }
    if cfg.scrape.selector_timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "scrape.selector_timeout_secs must be > 0",
        ));
    }
    cfg.publication_offset()?;
    Ok(())
}

/// Example configuration document, kept in sync with the schema.
pub fn example() -> &'static str {
    r#"database:
  url: "sqlite://data/scraper.db"

server:
  bind: "127.0.0.1:8080"
  api_key: null
  expose_errors: false

scrape:
  navigation_timeout_secs: 60
  selector_timeout_secs: 10
  timezone_offset: "+05:30"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.scrape.navigation_timeout_secs, 60);
        assert!(cfg.server.api_key.is_none());
    }

    #[test]
    fn scrape_section_is_optional() {
        let cfg: Config = serde_yaml::from_str(
            "database:\n  url: \"sqlite::memory:\"\nserver:\n  bind: \"127.0.0.1:0\"\n",
        )
        .unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.scrape, Scrape::default());
    }

    #[test]
    fn invalid_database_url() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.database.url = "".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("database.url")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn invalid_bind_address() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.server.bind = "not-an-addr".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn invalid_timezone_offset() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.scrape.timezone_offset = "IST".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn empty_api_key_rejected() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.server.api_key = Some("  ".into());
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.scrape.selector_timeout_secs = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn publication_offset_parses() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        let offset = cfg.publication_offset().unwrap();
        assert_eq!(offset.local_minus_utc(), 5 * 3600 + 30 * 60);
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        let mut f = fs::File::create(&p).unwrap();
        f.write_all(example().as_bytes()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:8080");
    }
}
