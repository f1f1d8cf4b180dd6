//! File-backed persistent store
//!
//! One JSON document per key under `<root>/<name>/v<version>/`. File names are
//! the hex encoding of the key, so any key maps to a portable file name.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use super::{PersistentStore, StoredEntry};
use crate::error::PersistenceError;

const RECORD_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

/// Distinguishes concurrent writes within one process.
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

// == File Store ==
/// Durable `PersistentStore` on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) the store directory for `name`/`version`.
    pub async fn open(
        root: impl AsRef<Path>,
        name: &str,
        version: u32,
    ) -> Result<Self, PersistenceError> {
        let dir = root.as_ref().join(name).join(format!("v{}", version));
        fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    /// Directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", encode_key(key), RECORD_EXTENSION))
    }

    /// A scratch path no other write uses, in the same directory as the record.
    fn temp_path(&self, key: &str) -> PathBuf {
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            "{}.{}-{}.{}",
            encode_key(key),
            std::process::id(),
            seq,
            TEMP_EXTENSION
        ))
    }
}

#[async_trait]
impl PersistentStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<StoredEntry>, PersistenceError> {
        let bytes = match fs::read(self.record_path(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| PersistenceError::Corrupt {
                key: key.to_string(),
                source,
            })
    }

    async fn set(&self, key: &str, entry: &StoredEntry) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec(entry).map_err(|source| PersistenceError::Corrupt {
            key: key.to_string(),
            source,
        })?;

        // Write aside then rename so readers never see a partial record
        let tmp = self.temp_path(key);
        let written = match fs::write(&tmp, &bytes).await {
            Ok(()) => fs::rename(&tmp, self.record_path(key)).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.record_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, PersistenceError> {
        let mut keys = Vec::new();
        let mut dir = fs::read_dir(&self.dir).await?;

        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let decoded = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(decode_key);
            match decoded {
                Some(key) => keys.push(key),
                None => warn!(path = %path.display(), "Skipping unrecognised file in store"),
            }
        }

        Ok(keys)
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        for key in self.keys().await? {
            self.remove(&key).await?;
        }
        Ok(())
    }
}

// == Key Encoding ==
fn encode_key(key: &str) -> String {
    key.bytes().map(|b| format!("{:02x}", b)).collect()
}

fn decode_key(stem: &str) -> Option<String> {
    if stem.len() % 2 != 0 {
        return None;
    }
    let bytes = (0..stem.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(stem.get(i..i + 2)?, 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}
