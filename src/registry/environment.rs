use chrono::{DateTime, Utc};
use config::{Config, File};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::Path;

use crate::common::config::EnvironmentConfig;
use crate::common::error::RegistryError;

const SECRET_MARKERS: [&str; 5] = ["PASSWORD", "SECRET", "TOKEN", "CREDENTIAL", "PRIVATE"];

fn looks_secret(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    SECRET_MARKERS.iter().any(|m| upper.contains(m))
}

/// Read-only cluster wiring, captured once at boot.
#[derive(Debug, Clone)]
pub struct EnvironmentReporter {
    cfg: Value,
    env: BTreeMap<String, String>,
}

impl EnvironmentReporter {
    pub fn new(cfg: Value, env: BTreeMap<String, String>) -> Self {
        Self { cfg, env }
    }

    /// Loads from the process environment.
    pub fn load(config: &EnvironmentConfig) -> Result<Self, RegistryError> {
        Self::load_with(config, |name| std::env::var(name).ok())
    }

    /// Fails if the cluster config file is unreadable or any required
    /// variable is absent; all missing variables are named.
    pub fn load_with<F>(config: &EnvironmentConfig, lookup: F) -> Result<Self, RegistryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cfg = match &config.cluster_config_path {
            Some(path) => load_cluster_config(path)?,
            None => Value::Object(Default::default()),
        };

        let missing = config
            .required_vars
            .iter()
            .filter(|name| lookup(name.as_str()).is_none())
            .map(String::as_str)
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(RegistryError::configuration(format!(
                "missing required environment variable(s): {}",
                missing.join(", ")
            )));
        }

        let mut env = BTreeMap::new();
        for name in config.required_vars.iter().chain(&config.optional_vars) {
            if looks_secret(name) {
                log::warn!("Not reporting environment variable {}: looks like a secret", name);
                continue;
            }
            if let Some(value) = lookup(name.as_str()) {
                env.insert(name.clone(), value);
            }
        }

        log::info!(
            "Environment loaded: {} variable(s), cluster config {}",
            env.len(),
            config
                .cluster_config_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "not set".to_string())
        );
        Ok(Self { cfg, env })
    }

    pub fn get_environment(&self, now: DateTime<Utc>) -> Value {
        json!({
            "cfg": self.cfg,
            "env": self.env,
            "core": env!("CARGO_PKG_VERSION"),
            "timestamp": now.to_rfc3339(),
        })
    }
}

fn load_cluster_config(path: &Path) -> Result<Value, RegistryError> {
    Config::builder()
        .add_source(File::from(path).required(true))
        .build()
        .and_then(|c| c.try_deserialize::<Value>())
        .map_err(|e| {
            RegistryError::configuration(format!(
                "cannot load cluster config {}: {e}",
                path.display()
            ))
        })
}
