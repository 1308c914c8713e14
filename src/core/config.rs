//! Configuration management for the gateway.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file
//! named by `GATEWAY_CONFIG`, then individual environment variables. The
//! resulting [`Config`] is passed explicitly into registry construction;
//! there is no process-wide configuration state.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Main configuration structure for the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Upstreams and catalog construction.
    pub gateway: GatewayConfig,

    /// The TOML file this configuration was loaded from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// What to do when two upstreams advertise the same tool name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// The upstream discovered later replaces the earlier entry.
    #[default]
    LastWins,
    /// Abort startup.
    Error,
}

impl std::str::FromStr for CollisionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "last-wins" | "last_wins" | "last" => Ok(Self::LastWins),
            "error" => Ok(Self::Error),
            other => Err(Error::config(format!(
                "unknown collision policy '{other}', expected 'last-wins' or 'error'"
            ))),
        }
    }
}

/// Gateway configuration: which upstreams to aggregate and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Upstreams, discovered in this order.
    pub upstreams: Vec<UpstreamConfig>,

    /// Bound on connecting to and listing each upstream at startup.
    pub discovery_timeout_ms: u64,

    /// Tool name collision handling.
    pub collision_policy: CollisionPolicy,
}

/// One upstream endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Identifier used in logs and errors.
    #[serde(alias = "identifier")]
    pub id: String,

    /// Streamable HTTP endpoint of the upstream MCP server.
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "tool-gateway".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_timestamps: true,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            upstreams: Vec::new(),
            discovery_timeout_ms: 30_000,
            collision_policy: CollisionPolicy::default(),
        }
    }
}

impl GatewayConfig {
    /// The discovery timeout as a [`Duration`].
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }
}

impl UpstreamConfig {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
        }
    }
}

/// Parse `id=url,id=url` into upstream descriptors.
pub fn parse_upstreams(raw: &str) -> Result<Vec<UpstreamConfig>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (id, address) = entry.split_once('=').ok_or_else(|| {
                Error::config(format!("upstream '{entry}' must look like id=url"))
            })?;
            Ok(UpstreamConfig::new(id.trim(), address.trim()))
        })
        .collect()
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration file in TOML format.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&raw)
            .map_err(|e| Error::config(format!("invalid config file {}: {e}", path.display())))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load configuration from the environment.
    ///
    /// Environment variables are prefixed with `GATEWAY_`. When
    /// `GATEWAY_CONFIG` names a TOML file it is loaded first and the other
    /// variables override it.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match std::env::var("GATEWAY_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        if let Ok(name) = std::env::var("GATEWAY_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("GATEWAY_LOG_LEVEL") {
            config.logging.level = level;
        }

        if std::env::var("GATEWAY_TRANSPORT").is_ok() {
            config.transport = TransportConfig::from_env();
        }

        if let Ok(raw) = std::env::var("GATEWAY_UPSTREAMS") {
            config.gateway.upstreams = parse_upstreams(&raw)?;
        }

        if let Ok(raw) = std::env::var("GATEWAY_DISCOVERY_TIMEOUT_MS") {
            config.gateway.discovery_timeout_ms = raw
                .parse()
                .map_err(|_| Error::config(format!("invalid discovery timeout '{raw}'")))?;
        }

        if let Ok(raw) = std::env::var("GATEWAY_COLLISION_POLICY") {
            config.gateway.collision_policy = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Report where the configuration came from and what it will discover.
    ///
    /// Loading runs before the subscriber exists, so this is called once
    /// logging is initialized.
    pub fn log_summary(&self) {
        if let Some(path) = &self.source {
            info!("Loaded configuration file {}", path.display());
        }

        if self.gateway.upstreams.is_empty() {
            warn!("No upstreams configured - the gateway will advertise an empty catalog");
        } else {
            info!(
                "{} upstreams configured, discovery timeout {}ms",
                self.gateway.upstreams.len(),
                self.gateway.discovery_timeout_ms
            );
        }
    }

    /// Reject configurations the registry cannot build from.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for upstream in &self.gateway.upstreams {
            if upstream.id.is_empty() {
                return Err(Error::config("upstream id must not be empty"));
            }
            if upstream.address.is_empty() {
                return Err(Error::config(format!(
                    "upstream '{}' has an empty address",
                    upstream.id
                )));
            }
            if !seen.insert(upstream.id.as_str()) {
                return Err(Error::config(format!(
                    "upstream '{}' is configured more than once",
                    upstream.id
                )));
            }
        }
        if self.gateway.discovery_timeout_ms == 0 {
            return Err(Error::config("discovery timeout must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_parse_upstreams() {
        let upstreams =
            parse_upstreams(" joke=http://127.0.0.1:8081/mcp, name-age=http://127.0.0.1:8082/mcp ,")
                .unwrap();
        assert_eq!(
            upstreams,
            vec![
                UpstreamConfig::new("joke", "http://127.0.0.1:8081/mcp"),
                UpstreamConfig::new("name-age", "http://127.0.0.1:8082/mcp"),
            ]
        );
        assert!(parse_upstreams("missing-separator").is_err());
    }

    #[test]
    fn test_collision_policy_from_str() {
        assert_eq!("last-wins".parse::<CollisionPolicy>().unwrap(), CollisionPolicy::LastWins);
        assert_eq!("ERROR".parse::<CollisionPolicy>().unwrap(), CollisionPolicy::Error);
        assert!("first-wins".parse::<CollisionPolicy>().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut config = Config::default();
        config.gateway.upstreams = vec![
            UpstreamConfig::new("a", "http://one/mcp"),
            UpstreamConfig::new("a", "http://two/mcp"),
        ];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_address() {
        let mut config = Config::default();
        config.gateway.upstreams = vec![UpstreamConfig::new("a", "")];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
name = "edge"

[gateway]
discovery_timeout_ms = 500
collision_policy = "error"

[[gateway.upstreams]]
identifier = "joke"
address = "http://127.0.0.1:8081/mcp"

[[gateway.upstreams]]
id = "name-age"
address = "http://127.0.0.1:8082/mcp"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.name, "edge");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.gateway.discovery_timeout(), Duration::from_millis(500));
        assert_eq!(config.gateway.collision_policy, CollisionPolicy::Error);
        assert_eq!(config.gateway.upstreams.len(), 2);
        assert_eq!(config.gateway.upstreams[0].id, "joke");
        assert_eq!(config.source.as_deref(), Some(file.path()));
    }

    /// Log sink for asserting on emitted records.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn summary_of(config: &Config) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || config.log_summary());
        logs.contents()
    }

    #[test]
    fn test_log_summary_reports_source_and_upstreams() {
        let mut config = Config::default();
        config.source = Some(PathBuf::from("/etc/gateway.toml"));
        config.gateway.upstreams = vec![UpstreamConfig::new("a", "http://a/mcp")];

        let logs = summary_of(&config);
        assert!(logs.contains("Loaded configuration file /etc/gateway.toml"));
        assert!(logs.contains("1 upstreams configured"));
        assert!(!logs.contains("WARN"));
    }

    #[test]
    fn test_log_summary_warns_on_empty_catalog() {
        let logs = summary_of(&Config::default());
        assert!(logs.contains("WARN"));
        assert!(logs.contains("No upstreams configured"));
        assert!(!logs.contains("Loaded configuration file"));
    }

    #[test]
    fn test_upstreams_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("GATEWAY_UPSTREAMS", "a=http://a/mcp,b=http://b/mcp");
            std::env::set_var("GATEWAY_COLLISION_POLICY", "error");
        }
        let config = Config::from_env().unwrap();
        assert_eq!(config.gateway.upstreams.len(), 2);
        assert_eq!(config.gateway.upstreams[1].id, "b");
        assert_eq!(config.gateway.collision_policy, CollisionPolicy::Error);
        unsafe {
            std::env::remove_var("GATEWAY_UPSTREAMS");
            std::env::remove_var("GATEWAY_COLLISION_POLICY");
        }
    }

    #[test]
    fn test_invalid_policy_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("GATEWAY_COLLISION_POLICY", "sometimes");
        }
        assert!(Config::from_env().is_err());
        unsafe {
            std::env::remove_var("GATEWAY_COLLISION_POLICY");
        }
    }
}
