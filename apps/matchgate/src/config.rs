//! # Server Configuration
//!
//! Settings are resolved in three layers, later layers winning:
//! 1. Built-in defaults
//! 2. The `[server]` table of an optional TOML file (`--config`)
//! 3. Environment variables
//!
//! CLI flags (`--host`, `--port`) are applied on top by the caller.
//!
//! ## Environment Variables
//!
//! - `MATCHGATE_API_KEY`: If set and non-empty, requires Bearer token authentication
//! - `MATCHGATE_RATE_LIMIT`: Requests per second (0 disables rate limiting)
//! - `MATCHGATE_RATE_BURST`: Requests allowed at once (0 means one second's worth)
//! - `MATCHGATE_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all
//!
//! ## Example File
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 9090
//! rate_limit = 250
//! rate_limit_burst = 50
//! cors_origins = ["https://app.example.com"]
//! body_limit_bytes = 65536
//! ```

use governor::Quota;
use matchgate_core::MatchgateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::path::Path;

/// Default requests per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Default maximum request body size (1 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Maximum size of a configuration file (64 KiB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

// =============================================================================
// SERVER CONFIG
// =============================================================================

/// Resolved HTTP server settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    /// Requests allowed in one burst; 0 means `rate_limit`.
    pub rate_limit_burst: u32,
    /// Allowed CORS origins. `None` means localhost only, `["*"]` means any.
    pub cors_origins: Option<Vec<String>>,
    /// API key required on every endpoint except `/health`.
    pub api_key: Option<String>,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_limit_burst: 0,
            cors_origins: None,
            api_key: None,
            body_limit_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("rate_limit", &self.rate_limit)
            .field("rate_limit_burst", &self.rate_limit_burst)
            .field("cors_origins", &self.cors_origins)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("body_limit_bytes", &self.body_limit_bytes)
            .finish()
    }
}

/// On-disk layout: settings live under `[server]`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    server: ServerConfig,
}

impl ServerConfig {
    /// Parse settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, MatchgateError> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| MatchgateError::ConfigError(e.to_string()))?;
        file.server.validated()
    }

    /// Read settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, MatchgateError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            MatchgateError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(MatchgateError::ConfigError(format!(
                "Config file size {} bytes exceeds maximum {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            MatchgateError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, MatchgateError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply environment-style overrides from `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup("MATCHGATE_API_KEY") {
            self.api_key = Some(key);
        }

        for (var, slot) in [
            ("MATCHGATE_RATE_LIMIT", &mut self.rate_limit),
            ("MATCHGATE_RATE_BURST", &mut self.rate_limit_burst),
        ] {
            if let Some(raw) = lookup(var) {
                match raw.trim().parse::<u32>() {
                    Ok(value) => *slot = value,
                    Err(e) => tracing::warn!(var, value = %raw, error = %e, "Ignoring override"),
                }
            }
        }

        if let Some(raw) = lookup("MATCHGATE_CORS_ORIGINS") {
            let origins: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            self.cors_origins = Some(origins);
        }

        // An empty key never enables authentication.
        self.api_key = self.api_key.filter(|k| !k.is_empty());
        self
    }

    /// Rate-limit quota, or `None` when limiting is disabled.
    #[must_use]
    pub fn rate_quota(&self) -> Option<Quota> {
        let rps = NonZeroU32::new(self.rate_limit)?;
        let burst = NonZeroU32::new(self.rate_limit_burst).unwrap_or(rps);
        Some(Quota::per_second(rps).allow_burst(burst))
    }

    /// Socket address string for binding.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validated(self) -> Result<Self, MatchgateError> {
        if self.host.trim().is_empty() {
            return Err(MatchgateError::ConfigError("host must not be empty".into()));
        }
        if self.body_limit_bytes == 0 {
            return Err(MatchgateError::ConfigError(
                "body_limit_bytes must be greater than zero".into(),
            ));
        }
        Ok(Self {
            api_key: self.api_key.filter(|k| !k.is_empty()),
            ..self
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.rate_limit, DEFAULT_RATE_LIMIT);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ServerConfig::from_toml_str("[server]\nport = 9090\n").expect("parse");
        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.body_limit_bytes, DEFAULT_BODY_LIMIT);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(
            ServerConfig::from_toml_str("").expect("parse"),
            ServerConfig::default()
        );
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(ServerConfig::from_toml_str("[server]\nport = \"high\"\n").is_err());
        assert!(ServerConfig::from_toml_str("[server]\nbody_limit_bytes = 0\n").is_err());
        assert!(ServerConfig::from_toml_str("[server]\nhost = \" \"\n").is_err());
    }

    #[test]
    fn env_overrides_file() {
        let config = ServerConfig::from_toml_str("[server]\nrate_limit = 5\napi_key = \"file\"\n")
            .expect("parse")
            .with_overrides(env(&[
                ("MATCHGATE_RATE_LIMIT", "0"),
                ("MATCHGATE_API_KEY", "from-env"),
                ("MATCHGATE_CORS_ORIGINS", "https://a.example, ,https://b.example"),
            ]));
        assert_eq!(config.rate_limit, 0);
        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(
            config.cors_origins,
            Some(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
    }

    #[test]
    fn bad_env_rate_limit_ignored() {
        let config = ServerConfig::default().with_overrides(env(&[("MATCHGATE_RATE_LIMIT", "lots")]));
        assert_eq!(config.rate_limit, DEFAULT_RATE_LIMIT);
    }

    #[test]
    fn rate_quota_follows_limit_and_burst() {
        let off = ServerConfig {
            rate_limit: 0,
            rate_limit_burst: 10,
            ..ServerConfig::default()
        };
        assert!(off.rate_quota().is_none());

        let quota = ServerConfig::default().rate_quota().expect("quota");
        assert_eq!(quota.burst_size().get(), DEFAULT_RATE_LIMIT);

        let config = ServerConfig::default().with_overrides(env(&[
            ("MATCHGATE_RATE_LIMIT", "20"),
            ("MATCHGATE_RATE_BURST", "3"),
        ]));
        let quota = config.rate_quota().expect("quota");
        assert_eq!(quota.burst_size().get(), 3);
        assert_eq!(quota.replenish_interval(), std::time::Duration::from_millis(50));
    }

    #[test]
    fn empty_api_key_disables_auth() {
        let config = ServerConfig::default().with_overrides(env(&[("MATCHGATE_API_KEY", "")]));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ServerConfig {
            api_key: Some("super-secret".into()),
            ..ServerConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("matchgate.toml");
        std::fs::write(&path, "[server]\nhost = \"0.0.0.0\"\nport = 7000\n").expect("write");

        let config = ServerConfig::from_file(&path).expect("load");
        assert_eq!(config.addr(), "0.0.0.0:7000");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ServerConfig::from_file(Path::new("/nonexistent/matchgate.toml"))
            .expect_err("missing file");
        assert!(matches!(err, MatchgateError::IoError(_)));
    }
}
