pub mod memory {
    pub mod memory_node_store;
}
