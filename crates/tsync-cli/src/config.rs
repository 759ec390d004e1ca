//! Configuration management for the tsync CLI
//!
//! Values come from defaults, then an optional TOML file, then environment
//! variables, each layer overriding the one before.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tsync_engine::derive::TicketZone;

// ============================================================================
// CLI Configuration Constants
// ============================================================================

/// Default Graph API base URL
pub const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com/v1.0";

/// Default number of unread messages fetched per listing
pub const DEFAULT_MESSAGE_LIMIT: u32 = 20;

/// Default timeout for Graph requests in seconds
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Name of the directory under the platform config dir
const APP_DIR: &str = "tsync";

/// Environment variable naming an explicit config file
pub const CONFIG_FILE_ENV: &str = "TSYNC_CONFIG";

/// Config keys understood by `tsync config get`
pub const CONFIG_KEYS: [&str; 7] = [
    "graph_url",
    "mail_token",
    "sites_token",
    "state_dir",
    "message_limit",
    "time_zone",
    "api_timeout_secs",
];

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Graph API base URL
    pub graph_url: String,

    /// Bearer token for mailbox calls
    pub mail_token: Option<String>,

    /// Bearer token for site and list calls
    pub sites_token: Option<String>,

    /// Directory holding saved mappings and selections
    pub state_dir: PathBuf,

    pub message_limit: u32,

    /// IANA zone for ticket numbers; local time when unset
    pub time_zone: Option<String>,

    pub api_timeout_secs: u64,
}

impl Config {
    /// Create a new config with default values
    pub fn new() -> Result<Self> {
        let state_dir = default_app_dir()
            .ok_or_else(|| CliError::config("Could not determine config directory"))?;

        Ok(Self {
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            mail_token: None,
            sites_token: None,
            state_dir,
            message_limit: DEFAULT_MESSAGE_LIMIT,
            time_zone: None,
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        })
    }

    /// Defaults, then the config file if present, then the environment
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_FILE_ENV)
            .ok()
            .map(PathBuf::from)
            .or_else(|| default_app_dir().map(|dir| dir.join("config.toml")));

        let config = match file {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        config.merge_env()
    }

    /// Read a TOML config file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        if config.message_limit == 0 {
            return Err(CliError::config(format!(
                "message_limit in {} must be a positive number",
                path.display()
            )));
        }
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Override with `TSYNC_*` environment variables
    pub fn merge_env(self) -> Result<Self> {
        self.merge_vars(|name| std::env::var(name).ok())
    }

    /// Override with variables resolved through `lookup`
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup("TSYNC_GRAPH_URL") {
            self.graph_url = url;
        }

        if let Some(token) = lookup("TSYNC_MAIL_TOKEN") {
            self.mail_token = Some(token);
        }

        if let Some(token) = lookup("TSYNC_SITES_TOKEN") {
            self.sites_token = Some(token);
        }

        if let Some(dir) = lookup("TSYNC_STATE_DIR") {
            self.state_dir = PathBuf::from(dir);
        }

        if let Some(limit) = lookup("TSYNC_MESSAGE_LIMIT") {
            self.message_limit = limit.trim().parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
                CliError::config(format!("TSYNC_MESSAGE_LIMIT must be a positive number, got '{}'", limit))
            })?;
        }

        if let Some(zone) = lookup("TSYNC_TIME_ZONE") {
            self.time_zone = Some(zone);
        }

        if let Some(secs) = lookup("TSYNC_API_TIMEOUT_SECS") {
            self.api_timeout_secs = secs.parse().map_err(|_| {
                CliError::config(format!("TSYNC_API_TIMEOUT_SECS must be a number of seconds, got '{}'", secs))
            })?;
        }

        Ok(self)
    }

    /// Mail token, if one is configured and non-empty
    pub fn mail_token(&self) -> Option<&str> {
        non_empty(self.mail_token.as_deref())
    }

    /// Sites token, if one is configured and non-empty
    pub fn sites_token(&self) -> Option<&str> {
        non_empty(self.sites_token.as_deref())
    }

    /// Zone used for ticket numbers
    pub fn ticket_zone(&self) -> Result<TicketZone> {
        match non_empty(self.time_zone.as_deref()) {
            None => Ok(TicketZone::Local),
            Some(name) => TicketZone::named(name).ok_or_else(|| {
                CliError::config(format!("Unknown time zone '{}'. Use an IANA name such as 'Europe/Berlin'", name))
            }),
        }
    }

    /// Printable value of `key`, with tokens redacted
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "graph_url" => self.graph_url.clone(),
            "mail_token" => redact(self.mail_token()),
            "sites_token" => redact(self.sites_token()),
            "state_dir" => self.state_dir.display().to_string(),
            "message_limit" => self.message_limit.to_string(),
            "time_zone" => self
                .time_zone
                .clone()
                .unwrap_or_else(|| "local".to_string()),
            "api_timeout_secs" => self.api_timeout_secs.to_string(),
            _ => {
                return Err(CliError::config(format!(
                    "Unknown config key: {}. Expected one of: {}",
                    key,
                    CONFIG_KEYS.join(", ")
                )));
            },
        };
        Ok(value)
    }
}

impl Default for Config {
    fn default() -> Self {
        // Fall back to a local directory when there is no platform config dir
        Self::new().unwrap_or_else(|_| Self {
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            mail_token: None,
            sites_token: None,
            state_dir: PathBuf::from(".tsync"),
            message_limit: DEFAULT_MESSAGE_LIMIT,
            time_zone: None,
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        })
    }
}

fn default_app_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn redact(token: Option<&str>) -> String {
    match token {
        Some(token) if token.chars().count() > 8 => {
            format!("{}…", token.chars().take(4).collect::<String>())
        },
        Some(_) => "(set)".to_string(),
        None => "(not set)".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.graph_url, DEFAULT_GRAPH_URL);
        assert_eq!(config.message_limit, 20);
        assert!(config.mail_token().is_none());
        assert!(matches!(config.ticket_zone().unwrap(), TicketZone::Local));
    }

    #[test]
    fn test_merge_vars_overrides() {
        let config = Config::default()
            .merge_vars(vars(&[
                ("TSYNC_GRAPH_URL", "http://localhost:9000"),
                ("TSYNC_MAIL_TOKEN", "mail-secret-token"),
                ("TSYNC_STATE_DIR", "/tmp/tsync-state"),
                ("TSYNC_MESSAGE_LIMIT", "5"),
                ("TSYNC_TIME_ZONE", "Europe/Berlin"),
            ]))
            .unwrap();

        assert_eq!(config.graph_url, "http://localhost:9000");
        assert_eq!(config.mail_token(), Some("mail-secret-token"));
        assert_eq!(config.state_dir, PathBuf::from("/tmp/tsync-state"));
        assert_eq!(config.message_limit, 5);
        assert_eq!(config.ticket_zone().unwrap().to_string(), "Europe/Berlin");
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let result = Config::default().merge_vars(vars(&[("TSYNC_MESSAGE_LIMIT", "many")]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_zero_message_limit_is_rejected() {
        let result = Config::default().merge_vars(vars(&[("TSYNC_MESSAGE_LIMIT", "0")]));
        assert!(matches!(result, Err(CliError::Config(_))));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "message_limit = 0\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(CliError::Config(_))));
    }

    #[test]
    fn test_blank_token_is_no_session() {
        let config = Config::default()
            .merge_vars(vars(&[("TSYNC_SITES_TOKEN", "   ")]))
            .unwrap();
        assert!(config.sites_token().is_none());
    }

    #[test]
    fn test_unknown_time_zone() {
        let config = Config {
            time_zone: Some("Mars/Olympus".to_string()),
            ..Config::default()
        };
        assert!(matches!(config.ticket_zone(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_get_redacts_tokens() {
        let config = Config {
            mail_token: Some("eyJ0eXAiOiJKV1QiLCJhbGciOi".to_string()),
            ..Config::default()
        };
        assert_eq!(config.get("mail_token").unwrap(), "eyJ0…");
        assert_eq!(config.get("sites_token").unwrap(), "(not set)");
        assert!(config.get("server_url").is_err());
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "graph_url = \"http://graph.test\"\nmessage_limit = 50\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.graph_url, "http://graph.test");
        assert_eq!(config.message_limit, 50);
        assert_eq!(config.api_timeout_secs, DEFAULT_API_TIMEOUT_SECS);
    }

    #[test]
    #[serial]
    fn test_load_reads_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "graph_url = \"http://from-file\"\nmessage_limit = 7\n").unwrap();

        std::env::set_var(CONFIG_FILE_ENV, &path);
        std::env::set_var("TSYNC_GRAPH_URL", "http://from-env");

        let config = Config::load().unwrap();
        assert_eq!(config.graph_url, "http://from-env");
        assert_eq!(config.message_limit, 7);

        std::env::remove_var(CONFIG_FILE_ENV);
        std::env::remove_var("TSYNC_GRAPH_URL");
    }
}
