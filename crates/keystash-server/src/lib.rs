//! keystash - filesystem-backed key-value store over HTTP
//!
//! Uploaded files and JSON strings are stored under client-chosen keys in two
//! sibling directories. String reads go through an in-process TTL cache.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod storage;
pub mod types;

pub use config::ServerConfig;
pub use error::{AppError, KeystashError, Result};
pub use server::{create_router, start_server, ServerState, SharedState};
pub use storage::Storage;
