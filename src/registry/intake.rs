use serde_json::Value;

use crate::common::error::{RegistryError, ValidationError};
use crate::common::node::{Additional, NodeRecord, NodeView};
use crate::common::utils::non_blank;
use crate::registry::Registry;

/// A heartbeat that passed validation. Strings are already trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    pub node_name: String,
    pub node_type: String,
    pub instance_key: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub additional: Option<Additional>,
}

impl Announcement {
    pub fn new(
        node_name: impl Into<String>,
        node_type: impl Into<String>,
        instance_key: impl Into<String>,
    ) -> Self {
        Self {
            node_name: node_name.into(),
            node_type: node_type.into(),
            instance_key: instance_key.into(),
            host: None,
            port: None,
            additional: None,
        }
    }

    pub fn with_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = Some(host.into());
        self.port = Some(port);
        self
    }

    pub fn with_additional(mut self, additional: Additional) -> Self {
        self.additional = Some(additional);
        self
    }

    /// Validates a raw heartbeat body, reporting every bad field at once.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let Some(obj) = body.as_object() else {
            return Err(ValidationError::single("body", "expected a JSON object"));
        };

        let mut errors = ValidationError::default();
        let node_name = required_string(obj, "node_name", &mut errors);
        let node_type = required_string(obj, "node_type", &mut errors);
        let instance_key = required_string(obj, "instance_key", &mut errors);

        let host = match obj.get("host") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => non_blank(s),
            Some(_) => {
                errors.push("host", "expected a string");
                None
            }
        };

        let port = match obj.get("port") {
            None | Some(Value::Null) => None,
            Some(v) => match v.as_u64().and_then(|p| u16::try_from(p).ok()) {
                Some(p) => Some(p),
                None => {
                    errors.push("port", "expected an integer between 0 and 65535");
                    None
                }
            },
        };

        let additional = match obj.get("additional") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map.clone()),
            Some(_) => {
                errors.push("additional", "expected a JSON object");
                None
            }
        };

        match (node_name, node_type, instance_key) {
            (Some(node_name), Some(node_type), Some(instance_key)) if errors.is_empty() => {
                Ok(Self {
                    node_name,
                    node_type,
                    instance_key,
                    host,
                    port,
                    additional,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Blank strings count as missing.
fn required_string(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    errors: &mut ValidationError,
) -> Option<String> {
    match obj.get(field) {
        None | Some(Value::Null) => {
            errors.push(field, "missing");
            None
        }
        Some(Value::String(s)) => {
            let value = non_blank(s);
            if value.is_none() {
                errors.push(field, "missing");
            }
            value
        }
        Some(_) => {
            errors.push(field, "expected a string");
            None
        }
    }
}

impl Registry {
    /// Records a heartbeat, stamped with the registry clock's current time.
    pub fn announce(&self, announcement: Announcement) -> NodeView {
        let now = self.now();
        let record = NodeRecord {
            node_name: announcement.node_name,
            node_type: announcement.node_type,
            instance_key: announcement.instance_key,
            host: announcement.host,
            port: announcement.port,
            additional: announcement.additional,
            first_seen: now,
            last_seen: now,
            heartbeats: 1,
        };

        let stored = self.store.upsert(record);
        if stored.heartbeats == 1 {
            log::info!(
                "New node registered: {} (type: {}, key: {})",
                stored.node_name,
                stored.node_type,
                stored.instance_key
            );
        } else {
            log::debug!(
                "Heartbeat from {} (type: {}, key: {})",
                stored.node_name,
                stored.node_type,
                stored.instance_key
            );
        }
        self.window.view(stored, now)
    }

    /// Validates then records a raw heartbeat body. Nothing is written when
    /// validation fails.
    pub fn announce_json(&self, body: &Value) -> Result<NodeView, RegistryError> {
        let announcement = Announcement::from_json(body).inspect_err(|e| {
            log::warn!("Rejected heartbeat: {}", e);
        })?;
        Ok(self.announce(announcement))
    }
}
