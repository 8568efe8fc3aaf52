use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use indexmap::IndexSet;

use crate::common::node::NodeRecord;
use crate::traits::node_store::NodeStore;

/// In-memory node store.
///
/// Entries are spread over the map's shards; an upsert holds only the write
/// lock of its key's shard, and snapshots copy one shard at a time.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    nodes: DashMap<String, NodeRecord>,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self {
            nodes: DashMap::new(),
        }
    }
}

impl NodeStore for MemoryNodeStore {
    fn upsert(&self, record: NodeRecord) -> NodeRecord {
        match self.nodes.entry(record.instance_key.clone()) {
            Entry::Occupied(mut entry) => {
                let stored = entry.get_mut();
                stored.merge(record);
                log::debug!(
                    "Updated node {} ({}), heartbeats: {}",
                    stored.node_name,
                    stored.instance_key,
                    stored.heartbeats
                );
                stored.clone()
            }
            Entry::Vacant(entry) => {
                log::debug!("Added node {} ({})", record.node_name, record.instance_key);
                entry.insert(record).value().clone()
            }
        }
    }

    fn get_all(&self) -> Vec<NodeRecord> {
        self.nodes.iter().map(|r| r.value().clone()).collect()
    }

    fn get_by_keys(&self, keys: &[String]) -> Vec<NodeRecord> {
        keys.iter()
            .collect::<IndexSet<_>>()
            .into_iter()
            .filter_map(|k| self.nodes.get(k).map(|r| r.value().clone()))
            .collect()
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}
