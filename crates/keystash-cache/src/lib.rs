//! Namespaced in-memory TTL cache
//!
//! Values are stamped with the time they were inserted and treated as expired
//! once they reach the configured TTL. Expiration is lazy: a stale entry is
//! only dropped when a read finds it. Time comes from a [`Clock`] so callers
//! can drive expiry deterministically in tests.

mod cache;
mod clock;
mod types;

pub use cache::TtlCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use types::{CacheStats, Namespace};
