//! Cache types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage partition a cached value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Files,
    Strings,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Files => "files",
            Namespace::Strings => "strings",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_names() {
        assert_eq!(Namespace::Files.as_str(), "files");
        assert_eq!(Namespace::Strings.to_string(), "strings");
    }

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_cache_stats_serialization() {
        let stats = CacheStats {
            entries: 3,
            hits: 10,
            misses: 2,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["entries"], 3);
        assert_eq!(json["hits"], 10);
        assert_eq!(json["misses"], 2);
    }
}
