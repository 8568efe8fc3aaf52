use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::common::error::RegistryError;
use crate::common::node::{NodeRecord, NodeStatus, NodeView};
use crate::common::utils::fold_case;
use crate::registry::Registry;

/// One entry of the configured "required" set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Requirement {
    Name(String),
    Type(String),
    InstanceKey(String),
}

impl Requirement {
    fn matches(&self, record: &NodeRecord) -> bool {
        match self {
            Requirement::Name(name) => fold_case(&record.node_name) == fold_case(name),
            Requirement::Type(node_type) => fold_case(&record.node_type) == fold_case(node_type),
            Requirement::InstanceKey(key) => record.instance_key == *key,
        }
    }
}

impl FromStr for Requirement {
    type Err = RegistryError;

    /// `type:<t>`, `key:<k>`, `name:<n>`, or a bare node name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = match s.split_once(':') {
            Some((kind, value)) => (Some(kind.trim()), value.trim()),
            None => (None, s.trim()),
        };
        if value.is_empty() {
            return Err(RegistryError::configuration(format!(
                "empty required node entry: {s:?}"
            )));
        }
        match kind {
            None | Some("name") => Ok(Requirement::Name(value.to_string())),
            Some("type") => Ok(Requirement::Type(value.to_string())),
            Some("key") => Ok(Requirement::InstanceKey(value.to_string())),
            Some(other) => Err(RegistryError::configuration(format!(
                "unknown required node selector {other:?} in {s:?}"
            ))),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Name(name) => write!(f, "{name}"),
            Requirement::Type(node_type) => write!(f, "type:{node_type}"),
            Requirement::InstanceKey(key) => write!(f, "key:{key}"),
        }
    }
}

/// Repeated entries are kept once, at their first position.
pub fn parse_requirements(entries: &[String]) -> Result<Vec<Requirement>, RegistryError> {
    let mut requirements = IndexSet::with_capacity(entries.len());
    for entry in entries {
        let requirement = entry.parse::<Requirement>()?;
        if !requirements.insert(requirement) {
            log::warn!("Ignoring repeated required node entry {:?}", entry);
        }
    }
    Ok(requirements.into_iter().collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    On,
    Off,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub nodes_summary: IndexMap<String, Presence>,
    pub required_nodes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryStats {
    pub total_records: usize,
    pub online: usize,
    pub offline: usize,
    pub records_by_type: BTreeMap<String, usize>,
    pub oldest_last_seen: Option<DateTime<Utc>>,
    pub newest_last_seen: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

impl Registry {
    /// Every known node, most recently seen first.
    pub fn list(&self) -> Vec<NodeView> {
        let mut nodes = self.views(self.store.get_all());
        nodes.sort_by(|a, b| {
            b.record
                .last_seen
                .cmp(&a.record.last_seen)
                .then_with(|| a.record.instance_key.cmp(&b.record.instance_key))
        });
        nodes
    }

    /// Case-insensitive substring match against name and type. An empty
    /// query matches everything; no match is an empty result.
    pub fn discover(&self, query: &str) -> Vec<NodeView> {
        let needle = fold_case(query.trim());
        let found = self
            .list()
            .into_iter()
            .filter(|n| {
                fold_case(&n.record.node_name).contains(&needle)
                    || fold_case(&n.record.node_type).contains(&needle)
            })
            .collect::<Vec<_>>();
        log::debug!("Discovery query {:?} matched {} node(s)", query, found.len());
        found
    }

    pub fn lookup(&self, instance_keys: &[String]) -> Vec<NodeView> {
        self.views(self.store.get_by_keys(instance_keys))
    }

    /// Readiness against the configured requirements.
    pub fn cluster_ready(&self) -> Readiness {
        self.readiness_for(&self.requirements)
    }

    pub fn readiness_for(&self, requirements: &[Requirement]) -> Readiness {
        let keys = requirements
            .iter()
            .filter_map(|r| match r {
                Requirement::InstanceKey(k) => Some(k.clone()),
                _ => None,
            })
            .collect::<Vec<_>>();
        let records = if keys.len() == requirements.len() {
            self.store.get_by_keys(&keys)
        } else {
            self.store.get_all()
        };

        let now = self.now();
        let online = records
            .iter()
            .filter(|r| self.window.status_at(r.last_seen, now) == NodeStatus::Online)
            .collect::<Vec<_>>();

        let mut nodes_summary = IndexMap::with_capacity(requirements.len());
        for requirement in requirements {
            let presence = if online.iter().any(|r| requirement.matches(r)) {
                Presence::On
            } else {
                Presence::Off
            };
            nodes_summary.insert(requirement.to_string(), presence);
        }

        let ready = nodes_summary.values().all(|p| *p == Presence::On);
        if !ready {
            let missing = nodes_summary
                .iter()
                .filter(|(_, p)| **p == Presence::Off)
                .map(|(k, _)| k.as_str())
                .collect::<Vec<_>>();
            log::debug!("Cluster not ready, missing: {:?}", missing);
        }

        Readiness {
            ready,
            nodes_summary,
            required_nodes: requirements.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn statistics(&self) -> RegistryStats {
        let now = self.now();
        let records = self.store.get_all();

        let mut records_by_type = BTreeMap::new();
        let mut online = 0;
        for r in &records {
            *records_by_type.entry(r.node_type.clone()).or_insert(0) += 1;
            if self.window.status_at(r.last_seen, now).is_online() {
                online += 1;
            }
        }

        RegistryStats {
            total_records: records.len(),
            online,
            offline: records.len() - online,
            records_by_type,
            oldest_last_seen: records.iter().map(|r| r.last_seen).min(),
            newest_last_seen: records.iter().map(|r| r.last_seen).max(),
            timestamp: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selectors() {
        assert_eq!(
            "storage".parse::<Requirement>().unwrap(),
            Requirement::Name("storage".into())
        );
        assert_eq!(
            "type: database".parse::<Requirement>().unwrap(),
            Requirement::Type("database".into())
        );
        assert_eq!(
            "key:orb-1".parse::<Requirement>().unwrap(),
            Requirement::InstanceKey("orb-1".into())
        );
        assert_eq!(
            "name:portal".parse::<Requirement>().unwrap(),
            Requirement::Name("portal".into())
        );
    }

    #[test]
    fn rejects_unknown_selector_and_blank_entries() {
        assert!("zone:eu".parse::<Requirement>().is_err());
        assert!("type:".parse::<Requirement>().is_err());
        assert!("  ".parse::<Requirement>().is_err());
    }

    #[test]
    fn repeated_entries_are_kept_once() {
        let entries = ["orb", "type:web", "name:orb", "orb ", "key:orb-1"]
            .map(String::from)
            .to_vec();
        assert_eq!(
            parse_requirements(&entries).unwrap(),
            vec![
                Requirement::Name("orb".into()),
                Requirement::Type("web".into()),
                Requirement::InstanceKey("orb-1".into()),
            ]
        );
    }

    #[test]
    fn display_round_trips_the_selector() {
        for entry in ["storage", "type:database", "key:orb-1"] {
            assert_eq!(entry.parse::<Requirement>().unwrap().to_string(), entry);
        }
    }
}
