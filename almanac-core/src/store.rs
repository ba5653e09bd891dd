use async_trait::async_trait;

use crate::AlmanacError;

/// Byte-level key/value storage underneath the cache.
///
/// Implementations only move bytes; expiry and decoding live in the cache layer.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Read the bytes stored under `key`, or `None` when absent.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, AlmanacError>;

    /// Store `bytes` under `key`, replacing any previous value.
    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), AlmanacError>;

    /// Remove every stored key.
    async fn clear(&self) -> Result<(), AlmanacError>;
}
