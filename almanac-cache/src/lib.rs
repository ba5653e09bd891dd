//! Time-to-live cache for Almanac fetch-group results.
//!
//! [`CacheStore`] wraps each payload in a JSON envelope stamped by an injected
//! [`almanac_core::Clock`] and stores it through a [`almanac_core::PersistenceBackend`].
//! Entries older than the TTL read as absent.
#![warn(missing_docs)]

mod backend;
mod key;
mod store;

pub use backend::{FileBackend, MemoryBackend};
pub use key::CacheKey;
pub use store::{CacheEntry, CacheStats, CacheStore};
