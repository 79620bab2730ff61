//! Server configuration.
//!
//! Loaded from a TOML file, with every field optional; environment
//! variables override the file for deployment-sensitive values.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Placeholder secret used when none is configured. Fine for local
/// development, logged loudly at startup otherwise.
pub const DEFAULT_SESSION_SECRET: &str = "doorman-dev-secret-change-me";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub session: SessionSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Listen address.
    #[serde(default = "default_listen")]
    pub listen: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    /// Directory holding the SQLite database.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSection {
    /// Secret for signing session cookies.
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Session lifetime in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: i64,
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_data_dir() -> String {
    "/var/lib/doorman".to_string()
}

fn default_secret() -> String {
    DEFAULT_SESSION_SECRET.to_string()
}

fn default_ttl_secs() -> i64 {
    7 * 24 * 3600
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl Default for StorageSection {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            storage: StorageSection::default(),
            session: SessionSection::default(),
        }
    }
}

impl ServerConfig {
    /// Resolve a config name or path. A bare name maps to
    /// `/etc/doorman/<name>.toml`; anything containing `/` or `.` is
    /// used as a path directly.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/doorman/{}.toml", name_or_path))
        }
    }

    /// Load config from disk, then apply environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: ServerConfig = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Self {
        let mut config = ServerConfig::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("DOORMAN_LISTEN") {
            self.server.listen = v;
        }
        if let Ok(v) = std::env::var("DOORMAN_DATA_DIR") {
            self.storage.data_dir = v;
        }
        if let Ok(v) = std::env::var("DOORMAN_SESSION_SECRET") {
            self.session.secret = v;
        }
    }

    /// Whether the session secret was left at its development default.
    pub fn uses_default_secret(&self) -> bool {
        self.session.secret == DEFAULT_SESSION_SECRET
    }
}
