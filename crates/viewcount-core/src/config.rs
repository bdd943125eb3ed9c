//! Configuration loading and typed config structures for the viewcount service.
//!
//! The canonical configuration lives in `viewcount-config.yaml`. Every key
//! is optional; a missing file or section falls back to the defaults below,
//! which reproduce the legacy deployment (port 4000, `count.txt`, channel
//! `counter`, event `new_user`).
//!
//! Connection details are never baked into code. Deployments set them in
//! the YAML file or through environment variables:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `VIEWCOUNT_PORT` | `server.port` |
//! | `COUNTER_FILE` | `storage.file_path` |
//! | `DRAGONFLY_URL` | `storage.dragonfly_url` |
//! | `NATS_URL` | `pubsub.nats_url` |

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override had an unusable value.
    #[error("invalid value for {name}: {reason}")]
    Env {
        /// The variable name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `viewcount-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Where the counter is persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Channel naming and the optional NATS relay.
    #[serde(default)]
    pub pubsub: PubSubConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables are applied on top of the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Env`] if an override is invalid.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_file_with(path, |name| std::env::var(name).ok())
    }

    /// Like [`from_file`](Self::from_file) with `lookup` as the variable
    /// source instead of the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file).
    pub fn from_file_with<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string without consulting the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override values with process environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if `VIEWCOUNT_PORT` is not a port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Override values using `lookup` as the variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if `VIEWCOUNT_PORT` is not a port number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("VIEWCOUNT_PORT") {
            self.server.port = val.parse().map_err(|e| ConfigError::Env {
                name: "VIEWCOUNT_PORT",
                reason: format!("{e}"),
            })?;
        }
        if let Some(val) = lookup("COUNTER_FILE") {
            self.storage.file_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("DRAGONFLY_URL") {
            self.storage.dragonfly_url = val;
        }
        if let Some(val) = lookup("NATS_URL") {
            self.pubsub.nats_url = Some(val);
        }
        Ok(())
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which store holds the counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Decimal text in a local file.
    #[default]
    File,
    /// Decimal text under a `Dragonfly`/Redis key.
    Dragonfly,
}

/// What to do when the persisted value is not a non-negative integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Log a warning and treat the counter as 0. The next increment
    /// overwrites the bad value with 1.
    #[default]
    Reset,
    /// Refuse to start, and fail increments, until the value is repaired.
    Fail,
}

/// Persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Selected backend.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Counter file for the `file` backend.
    #[serde(default = "default_file_path")]
    pub file_path: PathBuf,

    /// Connection URL for the `dragonfly` backend.
    #[serde(default = "default_dragonfly_url")]
    pub dragonfly_url: String,

    /// Key for the `dragonfly` backend.
    #[serde(default = "default_key")]
    pub key: String,

    /// Handling of a malformed persisted value.
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            file_path: default_file_path(),
            dragonfly_url: default_dragonfly_url(),
            key: default_key(),
            on_malformed: MalformedPolicy::default(),
        }
    }
}

/// Publish/subscribe configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PubSubConfig {
    /// Channel name observers subscribe to.
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Event name carried by count updates.
    #[serde(default = "default_event")]
    pub event: String,

    /// Events buffered per subscriber before it is considered lagging.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,

    /// NATS server URL. When set, count updates are relayed to
    /// `{channel}.{event}`.
    #[serde(default)]
    pub nats_url: Option<String>,
}

impl Default for PubSubConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            event: default_event(),
            broadcast_capacity: default_broadcast_capacity(),
            nats_url: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set (e.g. `info`, `viewcount=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    4000
}

fn default_file_path() -> PathBuf {
    PathBuf::from("count.txt")
}

fn default_dragonfly_url() -> String {
    "redis://localhost:6379".to_owned()
}

fn default_key() -> String {
    viewcount_store::dragonfly::DEFAULT_KEY.to_owned()
}

fn default_channel() -> String {
    viewcount_types::DEFAULT_CHANNEL.to_owned()
}

fn default_event() -> String {
    viewcount_types::DEFAULT_EVENT.to_owned()
}

const fn default_broadcast_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn default_config_matches_legacy_deployment() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.file_path, PathBuf::from("count.txt"));
        assert_eq!(config.storage.on_malformed, MalformedPolicy::Reset);
        assert_eq!(config.pubsub.channel, "counter");
        assert_eq!(config.pubsub.event, "new_user");
        assert_eq!(config.pubsub.nats_url, None);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn example_file_documents_defaults() {
        let yaml = include_str!("../../../viewcount-config.example.yaml");
        assert_eq!(ServiceConfig::parse(yaml).unwrap(), ServiceConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9000

storage:
  backend: dragonfly
  file_path: "/var/lib/viewcount/count.txt"
  dragonfly_url: "redis://cache:6379/2"
  key: "views"
  on_malformed: fail

pubsub:
  channel: "lobby"
  event: "viewer"
  broadcast_capacity: 16
  nats_url: "nats://bus:4222"

logging:
  level: "debug"
  format: json
"#;
        let config = ServiceConfig::parse(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.backend, StorageBackend::Dragonfly);
        assert_eq!(config.storage.key, "views");
        assert_eq!(config.storage.on_malformed, MalformedPolicy::Fail);
        assert_eq!(config.pubsub.channel, "lobby");
        assert_eq!(config.pubsub.broadcast_capacity, 16);
        assert_eq!(config.pubsub.nats_url.as_deref(), Some("nats://bus:4222"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = ServiceConfig::parse("server:\n  port: 8081\n").unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage, StorageConfig::default());
        assert_eq!(config.pubsub, PubSubConfig::default());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let result = ServiceConfig::parse("storage:\n  backend: postgres\n");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn overrides_replace_values() {
        let vars: BTreeMap<&str, &str> = [
            ("VIEWCOUNT_PORT", "5000"),
            ("COUNTER_FILE", "/data/count.txt"),
            ("DRAGONFLY_URL", "redis://other:6379"),
            ("NATS_URL", "nats://other:4222"),
        ]
        .into_iter()
        .collect();

        let mut config = ServiceConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| (*v).to_owned()))
            .unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.file_path, PathBuf::from("/data/count.txt"));
        assert_eq!(config.storage.dragonfly_url, "redis://other:6379");
        assert_eq!(config.pubsub.nats_url.as_deref(), Some("nats://other:4222"));
    }

    #[test]
    fn bad_port_override_is_an_error() {
        let mut config = ServiceConfig::default();
        let result = config.apply_overrides(|name| {
            (name == "VIEWCOUNT_PORT").then(|| "eighty".to_owned())
        });
        assert!(matches!(
            result,
            Err(ConfigError::Env {
                name: "VIEWCOUNT_PORT",
                ..
            })
        ));
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn from_file_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewcount-config.yaml");
        std::fs::write(
            &path,
            "server:\n  port: 5000\npubsub:\n  broadcast_capacity: 8\n",
        )
        .unwrap();

        let config = ServiceConfig::from_file_with(&path, |_| None).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.pubsub.broadcast_capacity, 8);
        assert_eq!(config.pubsub.nats_url, None);
    }

    #[test]
    fn from_file_applies_overrides_on_top_of_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewcount-config.yaml");
        std::fs::write(&path, "server:\n  port: 5000\n").unwrap();

        let config = ServiceConfig::from_file_with(&path, |name| match name {
            "VIEWCOUNT_PORT" => Some("6000".to_owned()),
            "NATS_URL" => Some("nats://relay:4222".to_owned()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.server.port, 6000);
        assert_eq!(config.pubsub.nats_url.as_deref(), Some("nats://relay:4222"));
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let result = ServiceConfig::from_file(Path::new("/nonexistent/viewcount-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
