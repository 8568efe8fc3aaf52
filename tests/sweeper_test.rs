use chrono::{DateTime, TimeDelta, Utc};
use cluster_leader::common::node::NodeRecord;
use cluster_leader::registry::Registry;
use cluster_leader::registry::intake::Announcement;
use cluster_leader::registry::liveness::LivenessWindow;
use cluster_leader::registry::sweeper::{ExpirySweeper, SweepCounters};
use cluster_leader::storage::memory::memory_node_store::MemoryNodeStore;
use cluster_leader::traits::clock::ManualClock;
use cluster_leader::traits::node_store::NodeStore;
use std::sync::Arc;
use std::time::Duration;

struct Fixture {
    registry: Arc<Registry>,
    store: Arc<MemoryNodeStore>,
    clock: Arc<ManualClock>,
}

impl Fixture {
    fn clock_now(&self) -> DateTime<Utc> {
        self.registry.now()
    }
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryNodeStore::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let registry = Arc::new(Registry::new(
        store.clone(),
        clock.clone(),
        LivenessWindow::from_secs(10).unwrap(),
    ));
    Fixture {
        registry,
        store,
        clock,
    }
}

#[test]
fn reports_each_offline_transition_once() {
    let f = fixture();
    let mut sweeper = ExpirySweeper::new(f.registry.clone());
    f.registry.announce(Announcement::new("svc-a", "web", "k1"));
    f.registry.announce(Announcement::new("svc-b", "web", "k2"));

    let report = sweeper.sweep();
    assert_eq!(report.checked, 2);
    assert!(report.went_offline.is_empty());

    f.clock.advance(TimeDelta::seconds(5));
    f.registry.announce(Announcement::new("svc-b", "web", "k2"));
    f.clock.advance(TimeDelta::seconds(6));

    let report = sweeper.sweep();
    assert_eq!(report.went_offline, vec!["k1".to_string()]);

    let report = sweeper.sweep();
    assert!(report.went_offline.is_empty());
    assert_eq!(f.registry.record_count(), 2);
}

#[test]
fn reports_recovery_after_new_heartbeat() {
    let f = fixture();
    let mut sweeper = ExpirySweeper::new(f.registry.clone());
    f.registry.announce(Announcement::new("svc-a", "web", "k1"));
    sweeper.sweep();

    f.clock.advance(TimeDelta::seconds(10));
    assert_eq!(sweeper.sweep().went_offline, vec!["k1".to_string()]);

    f.registry.announce(Announcement::new("svc-a", "web", "k1"));
    let report = sweeper.sweep();
    assert_eq!(report.recovered, vec!["k1".to_string()]);
    assert!(report.went_offline.is_empty());

    assert_eq!(
        sweeper.stats().counters(),
        SweepCounters {
            sweeps: 3,
            offline_transitions: 1,
            recoveries: 1,
            skipped: 0,
        }
    );
}

#[test]
fn node_expiring_between_sweeps_is_still_reported() {
    let f = fixture();
    let mut sweeper = ExpirySweeper::new(f.registry.clone());
    f.registry.announce(Announcement::new("svc-a", "web", "k1"));
    f.clock.advance(TimeDelta::seconds(30));

    assert_eq!(sweeper.sweep().went_offline, vec!["k1".to_string()]);
}

#[test]
fn record_ahead_of_clock_is_skipped() {
    let f = fixture();
    let mut sweeper = ExpirySweeper::new(f.registry.clone());
    let ahead = f.clock_now() + TimeDelta::minutes(5);
    f.store.upsert(NodeRecord {
        node_name: "skewed".into(),
        node_type: "web".into(),
        instance_key: "k-skew".into(),
        host: None,
        port: None,
        additional: None,
        first_seen: ahead,
        last_seen: ahead,
        heartbeats: 1,
    });
    f.registry.announce(Announcement::new("svc-a", "web", "k1"));
    f.clock.advance(TimeDelta::seconds(10));

    let report = sweeper.sweep();
    assert_eq!(report.checked, 2);
    assert_eq!(report.skipped, vec!["k-skew".to_string()]);
    assert_eq!(report.went_offline, vec!["k1".to_string()]);
    assert_eq!(sweeper.stats().counters().skipped, 1);
}

#[tokio::test(start_paused = true)]
async fn spawned_sweeper_runs_on_its_interval() {
    let f = fixture();
    let sweeper = ExpirySweeper::new(f.registry.clone());
    let stats = sweeper.stats();
    f.registry.announce(Announcement::new("svc-a", "web", "k1"));

    let handle = sweeper.spawn(Duration::from_secs(2));
    tokio::time::sleep(Duration::from_millis(4_500)).await;
    assert_eq!(stats.counters().sweeps, 3);

    f.clock.advance(TimeDelta::seconds(10));
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(stats.counters().offline_transitions, 1);

    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());
}
