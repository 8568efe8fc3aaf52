use crate::common::node::NodeRecord;

/// Concurrency-safe mapping from `instance_key` to [`NodeRecord`].
///
/// Implementations serialize updates to one key and never hand out
/// references into their storage: every read returns owned copies. There is
/// intentionally no removal operation.
pub trait NodeStore: Send + Sync {
    /// Inserts `record`, or merges it into the record already stored under
    /// the same key. Returns the record as stored afterwards.
    fn upsert(&self, record: NodeRecord) -> NodeRecord;
    fn get_all(&self) -> Vec<NodeRecord>;
    /// At most one record per key, in first-requested order. Unknown keys
    /// are skipped.
    fn get_by_keys(&self, keys: &[String]) -> Vec<NodeRecord>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
