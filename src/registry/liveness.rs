use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

use crate::common::error::RegistryError;
use crate::common::node::{NodeRecord, NodeStatus, NodeView};
use crate::common::utils::elapsed_secs;

/// How long a node stays `online` after its last accepted heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessWindow(TimeDelta);

impl LivenessWindow {
    pub fn new(window: Duration) -> Result<Self, RegistryError> {
        let delta = TimeDelta::from_std(window)
            .map_err(|e| RegistryError::configuration(format!("liveness window: {e}")))?;
        if delta <= TimeDelta::zero() {
            return Err(RegistryError::configuration(
                "liveness window must be greater than zero",
            ));
        }
        Ok(Self(delta))
    }

    pub fn from_secs(secs: u64) -> Result<Self, RegistryError> {
        Self::new(Duration::from_secs(secs))
    }

    pub fn as_delta(&self) -> TimeDelta {
        self.0
    }

    /// `online` iff `now - last_seen < window`. A `last_seen` ahead of `now`
    /// counts as fresh.
    pub fn status_at(&self, last_seen: DateTime<Utc>, now: DateTime<Utc>) -> NodeStatus {
        if now.signed_duration_since(last_seen) < self.0 {
            NodeStatus::Online
        } else {
            NodeStatus::Offline
        }
    }

    pub fn view(&self, record: NodeRecord, now: DateTime<Utc>) -> NodeView {
        NodeView {
            status: self.status_at(record.last_seen, now),
            age_seconds: elapsed_secs(record.last_seen, now),
            record,
        }
    }
}
