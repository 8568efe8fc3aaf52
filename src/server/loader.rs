use std::sync::Arc;

use crate::common::config::ServerConfig;
use crate::common::error::RegistryError;
use crate::registry::Registry;
use crate::registry::discovery::parse_requirements;
use crate::registry::environment::EnvironmentReporter;
use crate::registry::liveness::LivenessWindow;
use crate::storage::memory::memory_node_store::MemoryNodeStore;
use crate::traits::clock::{Clock, SystemClock};
use crate::traits::node_store::NodeStore;

pub fn load_node_store() -> Arc<dyn NodeStore> {
    log::debug!("Using in-memory node store");
    Arc::new(MemoryNodeStore::new())
}

pub fn load_registry(
    server_config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> Result<Registry, RegistryError> {
    server_config.validate()?;
    let window = LivenessWindow::new(server_config.liveness_window())?;
    let requirements = parse_requirements(&server_config.required_nodes)?;
    log::info!(
        "Liveness window {}s, required nodes: {:?}",
        server_config.liveness_window_secs,
        server_config.required_nodes
    );
    Ok(Registry::new(load_node_store(), clock, window).with_requirements(requirements))
}

pub fn load_system_registry(server_config: &ServerConfig) -> Result<Registry, RegistryError> {
    load_registry(server_config, Arc::new(SystemClock))
}

pub fn load_environment(server_config: &ServerConfig) -> Result<EnvironmentReporter, RegistryError> {
    EnvironmentReporter::load(&server_config.environment)
}
