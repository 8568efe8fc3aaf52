use config::{Config, Environment, File, Map};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::error::RegistryError;

/// Looked up (without extension) when no `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/leader";
pub const ENV_PREFIX: &str = "LEADER";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub liveness_window_secs: u64,
    pub sweep_interval_secs: u64,
    /// Readiness requirements, e.g. `storage`, `type:database`, `key:orb-1`.
    pub required_nodes: Vec<String>,
    pub environment: EnvironmentConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            liveness_window_secs: 30,
            sweep_interval_secs: 5,
            required_nodes: Vec::new(),
            environment: EnvironmentConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Cluster wiring file reported verbatim by `/v1/getenv`.
    pub cluster_config_path: Option<PathBuf>,
    pub required_vars: Vec<String>,
    pub optional_vars: Vec<String>,
}

impl ServerConfig {
    pub fn liveness_window(&self) -> Duration {
        Duration::from_secs(self.liveness_window_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.liveness_window_secs == 0 {
            return Err(RegistryError::configuration(
                "liveness_window_secs must be greater than zero",
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(RegistryError::configuration(
                "sweep_interval_secs must be greater than zero",
            ));
        }
        if self.sweep_interval_secs >= self.liveness_window_secs {
            return Err(RegistryError::configuration(format!(
                "sweep_interval_secs ({}) must be shorter than liveness_window_secs ({})",
                self.sweep_interval_secs, self.liveness_window_secs
            )));
        }
        Ok(())
    }
}

/// Layers defaults, the config file and `LEADER__*` environment variables.
///
/// An explicitly given path must exist; the default path is optional.
pub fn load_server_config(path: Option<&str>) -> anyhow::Result<ServerConfig> {
    load_server_config_with_env(path, None)
}

/// Same layering, reading `LEADER__*` variables from `env` instead of the
/// process environment when given.
pub fn load_server_config_with_env(
    path: Option<&str>,
    env: Option<Map<String, String>>,
) -> anyhow::Result<ServerConfig> {
    let file = match path {
        Some(p) => File::with_name(p).required(true),
        None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("required_nodes")
                .with_list_parse_key("environment.required_vars")
                .with_list_parse_key("environment.optional_vars")
                .source(env),
        )
        .build()?;

    let server_config: ServerConfig = settings.try_deserialize()?;
    log::debug!("Loaded server config: {:?}", server_config);
    Ok(server_config)
}
