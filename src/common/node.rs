use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque per-node metadata, stored and returned verbatim.
pub type Additional = Map<String, Value>;

/// Everything the registry knows about one node instance.
///
/// `instance_key` is the identity; `status` is not stored here, it is derived
/// from `last_seen` whenever the record is read (see [`NodeView`]).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NodeRecord {
    pub node_name: String,
    pub node_type: String,
    pub instance_key: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub additional: Option<Additional>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub heartbeats: u64,
}

impl NodeRecord {
    /// Folds a newer heartbeat for the same instance into this record.
    ///
    /// Descriptive fields follow the incoming heartbeat, `last_seen` never
    /// moves backwards and `first_seen` is kept.
    pub fn merge(&mut self, incoming: NodeRecord) {
        debug_assert_eq!(self.instance_key, incoming.instance_key);
        self.node_name = incoming.node_name;
        self.node_type = incoming.node_type;
        self.host = incoming.host;
        self.port = incoming.port;
        self.additional = incoming.additional;
        self.last_seen = self.last_seen.max(incoming.last_seen);
        self.first_seen = self.first_seen.min(incoming.first_seen);
        self.heartbeats = self.heartbeats.saturating_add(incoming.heartbeats.max(1));
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Online,
    Offline,
}

impl NodeStatus {
    pub fn is_online(self) -> bool {
        self == NodeStatus::Online
    }
}

/// A record as answered to queries: the stored fields plus derived liveness.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NodeView {
    #[serde(flatten)]
    pub record: NodeRecord,
    pub status: NodeStatus,
    pub age_seconds: i64,
}

impl NodeView {
    pub fn instance_key(&self) -> &str {
        &self.record.instance_key
    }
}
