//! # pb-cache-json
//!
//! `CacheStore` implementations: one JSON document per collection on the
//! local filesystem, plus an in-memory store for tests.
//!
//! Writes go through a temp file followed by a rename, so a reader never
//! observes a half-written collection.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use pb_core::{CacheStore, Collection, Error, Result};

/// Filesystem-backed cache. Each collection lives at
/// `<root>/<key>.json` and is read and replaced as a whole.
pub struct JsonFileCacheStore {
    root: PathBuf,
}

impl JsonFileCacheStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn path_for(&self, collection: Collection) -> PathBuf {
        self.root.join(format!("{}.json", collection.key()))
    }
}

#[async_trait]
impl CacheStore for JsonFileCacheStore {
    async fn read(&self, collection: Collection) -> Result<Option<serde_json::Value>> {
        let path = self.path_for(collection);
        let raw = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Cache(format!("reading {}: {e}", path.display()))),
        };

        let doc = serde_json::from_slice(&raw)
            .map_err(|e| Error::Cache(format!("parsing {}: {e}", path.display())))?;
        Ok(Some(doc))
    }

    async fn write(&self, collection: Collection, data: serde_json::Value) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Error::Cache(format!("creating {}: {e}", self.root.display())))?;

        let path = self.path_for(collection);
        let tmp = path.with_extension("json.tmp");
        let raw = serde_json::to_vec(&data)
            .map_err(|e| Error::Cache(format!("encoding {}: {e}", collection.key())))?;

        fs::write(&tmp, &raw)
            .await
            .map_err(|e| Error::Cache(format!("writing {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| Error::Cache(format!("replacing {}: {e}", path.display())))?;

        debug!(key = collection.key(), bytes = raw.len(), "cache document replaced");
        Ok(())
    }
}

/// In-memory cache for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryCacheStore {
    documents: Mutex<HashMap<&'static str, serde_json::Value>>,
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn read(&self, collection: Collection) -> Result<Option<serde_json::Value>> {
        Ok(self
            .documents
            .lock()
            .expect("cache lock poisoned")
            .get(collection.key())
            .cloned())
    }

    async fn write(&self, collection: Collection, data: serde_json::Value) -> Result<()> {
        self.documents
            .lock()
            .expect("cache lock poisoned")
            .insert(collection.key(), data);
        Ok(())
    }
}
