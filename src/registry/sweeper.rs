use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::common::node::NodeStatus;
use crate::registry::Registry;

/// Counters shared between the sweeper task and readers.
#[derive(Debug, Default)]
pub struct SweepStats {
    sweeps: AtomicU64,
    offline_transitions: AtomicU64,
    recoveries: AtomicU64,
    skipped: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepCounters {
    pub sweeps: u64,
    pub offline_transitions: u64,
    pub recoveries: u64,
    pub skipped: u64,
}

impl SweepStats {
    pub fn counters(&self) -> SweepCounters {
        SweepCounters {
            sweeps: self.sweeps.load(Ordering::Relaxed),
            offline_transitions: self.offline_transitions.load(Ordering::Relaxed),
            recoveries: self.recoveries.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// Outcome of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub checked: usize,
    pub went_offline: Vec<String>,
    pub recovered: Vec<String>,
    pub skipped: Vec<String>,
}

/// Watches the registry for nodes crossing the liveness window.
///
/// It never writes to the store: status is derived on read, so the sweeper
/// only remembers what it last observed in order to report transitions.
pub struct ExpirySweeper {
    registry: Arc<Registry>,
    observed: HashMap<String, NodeStatus>,
    stats: Arc<SweepStats>,
}

impl ExpirySweeper {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            observed: HashMap::new(),
            stats: Arc::new(SweepStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<SweepStats> {
        Arc::clone(&self.stats)
    }

    pub fn sweep(&mut self) -> SweepReport {
        let now = self.registry.now();
        let window = self.registry.liveness_window();
        let mut report = SweepReport::default();

        for record in self.registry.snapshot() {
            report.checked += 1;
            if record.last_seen > now {
                log::warn!(
                    "Skipping node {} ({}): last_seen {} is ahead of the clock",
                    record.node_name,
                    record.instance_key,
                    record.last_seen
                );
                report.skipped.push(record.instance_key);
                continue;
            }

            let status = window.status_at(record.last_seen, now);
            let previous = self.observed.insert(record.instance_key.clone(), status);
            match (previous, status) {
                (Some(NodeStatus::Offline), NodeStatus::Offline) => {}
                (_, NodeStatus::Offline) => {
                    log::info!(
                        "Node went offline: {} (type: {}, key: {}), last seen {}",
                        record.node_name,
                        record.node_type,
                        record.instance_key,
                        record.last_seen
                    );
                    report.went_offline.push(record.instance_key);
                }
                (Some(NodeStatus::Offline), NodeStatus::Online) => {
                    log::info!(
                        "Node back online: {} (type: {}, key: {})",
                        record.node_name,
                        record.node_type,
                        record.instance_key
                    );
                    report.recovered.push(record.instance_key);
                }
                (_, NodeStatus::Online) => {}
            }
        }

        self.stats.sweeps.fetch_add(1, Ordering::Relaxed);
        self.stats
            .offline_transitions
            .fetch_add(report.went_offline.len() as u64, Ordering::Relaxed);
        self.stats
            .recoveries
            .fetch_add(report.recovered.len() as u64, Ordering::Relaxed);
        self.stats
            .skipped
            .fetch_add(report.skipped.len() as u64, Ordering::Relaxed);
        log::debug!(
            "Sweep checked {} node(s): {} went offline, {} recovered, {} skipped",
            report.checked,
            report.went_offline.len(),
            report.recovered.len(),
            report.skipped.len()
        );
        report
    }

    /// Runs [`sweep`](Self::sweep) every `interval` until the handle is aborted.
    pub fn spawn(mut self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.sweep();
            }
        })
    }
}
