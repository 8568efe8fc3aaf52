pub mod common;
pub mod registry;
pub mod rest;
pub mod server;
pub mod storage;
pub mod traits;

pub use server::server::server_start;
