//! Persistence backends: an in-process map and a directory of JSON files.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use almanac_core::{AlmanacError, PersistenceBackend};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Process-local backend; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[async_trait]
impl PersistenceBackend for MemoryBackend {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, AlmanacError> {
        Ok(self.inner.lock().await.get(key).cloned())
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), AlmanacError> {
        self.inner.lock().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn clear(&self) -> Result<(), AlmanacError> {
        self.inner.lock().await.clear();
        Ok(())
    }
}

/// Durable backend storing one `<encoded key>.json` file per key in a directory.
///
/// The directory is created on first write.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileBackend {
    /// Backend rooted at `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

// Injective file-name encoding: bytes outside [A-Za-z0-9.-] become `_xx`.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'.' {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "_{b:02x}");
        }
    }
    out
}

fn storage_err(what: &str, path: &Path, e: &std::io::Error) -> AlmanacError {
    AlmanacError::Storage(format!("{what} {}: {e}", path.display()))
}

#[async_trait]
impl PersistenceBackend for FileBackend {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, AlmanacError> {
        let path = self.path_for(key);
        let _guard = self.lock.lock().await;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_err("read", &path, &e)),
        }
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), AlmanacError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let _guard = self.lock.lock().await;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| storage_err("create", &self.dir, &e))?;
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| storage_err("write", &tmp, &e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| storage_err("rename", &path, &e))
    }

    async fn clear(&self) -> Result<(), AlmanacError> {
        let _guard = self.lock.lock().await;
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(storage_err("list", &self.dir, &e)),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| storage_err("list", &self.dir, &e))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|e| storage_err("remove", &path, &e))?;
            }
        }
        Ok(())
    }
}
