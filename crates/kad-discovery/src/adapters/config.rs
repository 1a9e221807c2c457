use std::net::SocketAddr;

use crate::domain::KademliaConfig;
use crate::ports::ConfigProvider;

// ============================================================================
// StaticConfigProvider - Hardcoded config for testing/development
// ============================================================================

/// Static configuration provider with hardcoded values.
///
/// Useful for testing and development. For production, use `TomlConfigProvider`.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    bootstrap_nodes: Vec<SocketAddr>,
    config: KademliaConfig,
}

impl StaticConfigProvider {
    /// Create with default config and no bootstrap nodes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bootstrap_nodes(mut self, nodes: Vec<SocketAddr>) -> Self {
        self.bootstrap_nodes = nodes;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: KademliaConfig) -> Self {
        self.config = config;
        self
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn get_bootstrap_nodes(&self) -> Vec<SocketAddr> {
        self.bootstrap_nodes.clone()
    }

    fn get_kademlia_config(&self) -> KademliaConfig {
        self.config.clone()
    }
}

// ============================================================================
// TomlConfigProvider - Config file loading (requires "network" feature)
// ============================================================================

#[cfg(feature = "network")]
mod toml_config {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use std::path::Path;
    use thiserror::Error;
    use tracing::warn;

    #[derive(Debug, Deserialize)]
    struct ConfigFile {
        #[serde(default)]
        bootstrap: BootstrapConfig,
        #[serde(default)]
        kademlia: KademliaConfigFile,
    }

    #[derive(Debug, Deserialize, Default)]
    struct BootstrapConfig {
        #[serde(default)]
        nodes: Vec<String>,
    }

    #[derive(Debug, Deserialize, Default)]
    struct KademliaConfigFile {
        id_width: Option<usize>,
        k: Option<usize>,
        alpha: Option<usize>,
        request_timeout_ms: Option<u64>,
        refresh_interval_secs: Option<u64>,
        max_lookup_rounds: Option<usize>,
    }

    /// TOML-based configuration provider.
    ///
    /// # Config File Format
    ///
    /// ```toml
    /// [bootstrap]
    /// nodes = [
    ///     "192.168.1.100:30303",
    ///     "10.0.0.1:30303"
    /// ]
    ///
    /// [kademlia]
    /// id_width = 32
    /// k = 20
    /// alpha = 3
    /// request_timeout_ms = 2000
    /// refresh_interval_secs = 600
    /// max_lookup_rounds = 20
    /// ```
    ///
    /// Omitted keys take their defaults. Unparseable bootstrap entries are
    /// skipped with a warning.
    #[derive(Debug, Clone)]
    pub struct TomlConfigProvider {
        bootstrap_nodes: Vec<SocketAddr>,
        config: KademliaConfig,
    }

    impl TomlConfigProvider {
        /// Load configuration from a TOML file.
        ///
        /// # Errors
        ///
        /// Returns error if the file cannot be read, parsed, or validated.
        pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
            let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
                path: path.as_ref().display().to_string(),
                error: e.to_string(),
            })?;

            Self::parse(&content)
        }

        /// Parse configuration from a TOML string.
        pub fn parse(content: &str) -> Result<Self, ConfigError> {
            let file: ConfigFile =
                toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

            let bootstrap_nodes = file
                .bootstrap
                .nodes
                .iter()
                .filter_map(|node| match node.parse::<SocketAddr>() {
                    Ok(addr) => Some(addr),
                    Err(e) => {
                        warn!(node = %node, error = %e, "skipping bootstrap entry");
                        None
                    }
                })
                .collect();

            let defaults = KademliaConfig::default();
            let kc = file.kademlia;
            let config = KademliaConfig {
                id_width: kc.id_width.unwrap_or(defaults.id_width),
                k: kc.k.unwrap_or(defaults.k),
                alpha: kc.alpha.unwrap_or(defaults.alpha),
                request_timeout_ms: kc.request_timeout_ms.unwrap_or(defaults.request_timeout_ms),
                refresh_interval_secs: kc
                    .refresh_interval_secs
                    .unwrap_or(defaults.refresh_interval_secs),
                max_lookup_rounds: kc.max_lookup_rounds.unwrap_or(defaults.max_lookup_rounds),
            };
            config
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;

            Ok(Self {
                bootstrap_nodes,
                config,
            })
        }
    }

    impl ConfigProvider for TomlConfigProvider {
        fn get_bootstrap_nodes(&self) -> Vec<SocketAddr> {
            self.bootstrap_nodes.clone()
        }

        fn get_kademlia_config(&self) -> KademliaConfig {
            self.config.clone()
        }
    }

    /// Errors that can occur during config loading.
    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum ConfigError {
        #[error("failed to read {path}: {error}")]
        Io { path: String, error: String },
        #[error("failed to parse config: {0}")]
        Parse(String),
        #[error("invalid config: {0}")]
        Invalid(String),
    }
}

#[cfg(feature = "network")]
pub use toml_config::{ConfigError, TomlConfigProvider};
