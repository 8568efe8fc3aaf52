//! The membership registry: one shared handle over the node store, the
//! clock and the liveness policy. Heartbeat intake and discovery are
//! implemented on [`Registry`] in their own modules; the sweeper and the
//! environment reporter are independent components reading through it.

pub mod discovery;
pub mod environment;
pub mod intake;
pub mod liveness;
pub mod sweeper;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::common::node::{NodeRecord, NodeView};
use crate::registry::discovery::Requirement;
use crate::registry::liveness::LivenessWindow;
use crate::traits::clock::Clock;
use crate::traits::node_store::NodeStore;

pub struct Registry {
    store: Arc<dyn NodeStore>,
    clock: Arc<dyn Clock>,
    window: LivenessWindow,
    requirements: Vec<Requirement>,
}

impl Registry {
    pub fn new(store: Arc<dyn NodeStore>, clock: Arc<dyn Clock>, window: LivenessWindow) -> Self {
        Self {
            store,
            clock,
            window,
            requirements: Vec::new(),
        }
    }

    pub fn with_requirements(mut self, requirements: Vec<Requirement>) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn liveness_window(&self) -> LivenessWindow {
        self.window
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn record_count(&self) -> usize {
        self.store.len()
    }

    /// Copy of every stored record, without derived status.
    pub fn snapshot(&self) -> Vec<NodeRecord> {
        self.store.get_all()
    }

    fn views(&self, records: Vec<NodeRecord>) -> Vec<NodeView> {
        let now = self.now();
        records
            .into_iter()
            .map(|r| self.window.view(r, now))
            .collect()
    }
}
