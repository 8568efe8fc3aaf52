pub mod config;
pub mod error;
pub mod node;
pub mod utils;
