use cluster_leader::common::config::{
    ServerConfig, load_server_config, load_server_config_with_env,
};
use cluster_leader::common::error::RegistryError;
use cluster_leader::registry::discovery::Requirement;
use cluster_leader::server::loader::load_system_registry;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
    Some(
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

fn yaml_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_file_over_defaults() {
    let file = yaml_file(
        "port: 9100\nliveness_window_secs: 20\nrequired_nodes:\n  - orb\n  - type:web\nenvironment:\n  cluster_config_path: config/cluster.yaml\n  optional_vars: [PORTAL_URL]\n",
    );

    let config = load_server_config(file.path().to_str()).unwrap();
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 9100);
    assert_eq!(config.liveness_window_secs, 20);
    assert_eq!(config.sweep_interval_secs, 5);
    assert_eq!(config.required_nodes, vec!["orb", "type:web"]);
    assert_eq!(
        config.environment.cluster_config_path,
        Some(PathBuf::from("config/cluster.yaml"))
    );
    assert_eq!(config.environment.optional_vars, vec!["PORTAL_URL"]);
    assert!(config.environment.required_vars.is_empty());
}

#[test]
fn env_overrides_defaults_and_splits_lists() {
    let vars = env(&[
        ("LEADER__LIVENESS_WINDOW_SECS", "15"),
        ("LEADER__REQUIRED_NODES", "orb,type:web"),
        ("LEADER__ENVIRONMENT__OPTIONAL_VARS", "A,B"),
        ("OTHER__PORT", "1"),
    ]);
    let file = yaml_file("host: 127.0.0.1\n");

    let config = load_server_config_with_env(file.path().to_str(), vars).unwrap();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8000);
    assert_eq!(config.liveness_window_secs, 15);
    assert_eq!(config.required_nodes, vec!["orb", "type:web"]);
    assert_eq!(config.environment.optional_vars, vec!["A", "B"]);
    assert!(config.environment.required_vars.is_empty());
}

#[test]
fn env_overrides_file_values() {
    let file = yaml_file(
        "port: 9100\nliveness_window_secs: 20\nsweep_interval_secs: 4\nrequired_nodes: [portal]\n",
    );
    let vars = env(&[
        ("LEADER__PORT", "9200"),
        ("LEADER__REQUIRED_NODES", "orb,key:signaling-1"),
    ]);

    let config = load_server_config_with_env(file.path().to_str(), vars).unwrap();
    assert_eq!(config.port, 9200);
    assert_eq!(config.required_nodes, vec!["orb", "key:signaling-1"]);
    assert_eq!(config.liveness_window_secs, 20);
    assert_eq!(config.sweep_interval_secs, 4);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    assert!(load_server_config(missing.to_str()).is_err());
}

#[test]
fn defaults_are_valid() {
    let config = ServerConfig::default();
    config.validate().unwrap();
    assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    assert_eq!(config.liveness_window().as_secs(), 30);
}

#[test]
fn validate_rejects_bad_timings() {
    let cases = [(0, 5), (30, 0), (10, 10), (10, 20)];
    for (window, sweep) in cases {
        let config = ServerConfig {
            liveness_window_secs: window,
            sweep_interval_secs: sweep,
            ..Default::default()
        };
        assert!(
            matches!(config.validate(), Err(RegistryError::Configuration(_))),
            "window {window}, sweep {sweep}"
        );
    }
}

#[test]
fn registry_loader_parses_requirements() {
    let config = ServerConfig {
        required_nodes: vec!["orb".into(), "key:portal-1".into()],
        ..Default::default()
    };

    let registry = load_system_registry(&config).unwrap();
    assert_eq!(
        registry.requirements(),
        &[
            Requirement::Name("orb".into()),
            Requirement::InstanceKey("portal-1".into())
        ]
    );
    assert_eq!(registry.record_count(), 0);
}

#[test]
fn registry_loader_rejects_bad_requirement() {
    let config = ServerConfig {
        required_nodes: vec!["orb".into(), "zone:eu".into()],
        ..Default::default()
    };

    assert!(matches!(
        load_system_registry(&config),
        Err(RegistryError::Configuration(_))
    ));
}
