pub mod cluster;
pub mod error;
pub mod nodes;
pub mod service;
