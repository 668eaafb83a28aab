use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub storage_dir: PathBuf,
    pub cache_ttl: Duration,
    pub cache_max_entries: u64,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8282,
            storage_dir: PathBuf::from("./storage"),
            cache_ttl: Duration::from_secs(10 * 60),
            cache_max_entries: 10_000,
            max_upload_bytes: 64 * 1024 * 1024, // 64MB
        }
    }
}

impl ServerConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Parse configuration from an arbitrary variable source.
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let storage_dir = lookup("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_dir);

        let cache_ttl = lookup("CACHE_TTL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);

        let cache_max_entries = lookup("CACHE_MAX_ENTRIES")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.cache_max_entries);

        let max_upload_bytes = lookup("MAX_UPLOAD_BYTES")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            port,
            storage_dir,
            cache_ttl,
            cache_max_entries,
            max_upload_bytes,
        }
    }
}
