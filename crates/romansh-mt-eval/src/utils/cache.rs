use async_trait::async_trait;
use foyer::{
    BlockEngineBuilder, DeviceBuilder, FsDeviceBuilder, HybridCache, HybridCacheBuilder,
    RecoverMode,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

use crate::core::EvalError;

const MEMORY_ENTRIES: usize = 1 << 20;
/// Far beyond what the corpus can produce; entries are never evicted.
const DISK_CAPACITY: usize = 32 * 1024 * 1024 * 1024;
/// Large blocks keep the number of files in the cache directory small.
const DISK_BLOCK_SIZE: usize = 256 * 1024 * 1024;

/// Identity of one quality-estimation request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreKey {
    pub model_name: String,
    pub source: Option<String>,
    pub hypothesis: String,
    pub reference: Option<String>,
}

impl ScoreKey {
    pub fn new(
        model_name: &str,
        source: Option<&str>,
        hypothesis: &str,
        reference: Option<&str>,
    ) -> Self {
        Self {
            model_name: model_name.to_string(),
            source: source.map(str::to_string),
            hypothesis: hypothesis.to_string(),
            reference: reference.map(str::to_string),
        }
    }
}

/// Memo of segment scores keyed by the exact request tuple.
///
/// Injected into the quality-estimation adapter. Implementations are opened
/// once per process and closed explicitly with [`ScoreCache::close`].
#[async_trait]
pub trait ScoreCache: Send + Sync {
    async fn get(&self, key: &ScoreKey) -> Result<Option<f64>, EvalError>;
    async fn insert(&self, key: ScoreKey, score: f64) -> Result<(), EvalError>;
    async fn close(&self) -> Result<(), EvalError>;
}

/// Persistent memory + disk score cache backed by [foyer](https://docs.rs/foyer).
///
/// Data lives in a fixed directory and is recovered on the next open, so
/// repeated runs reuse every score computed before. Multiple processes must
/// not share one directory.
#[derive(Clone)]
pub struct DiskScoreCache {
    handler: HybridCache<ScoreKey, f64>,
}

impl DiskScoreCache {
    #[tracing::instrument(name = "rmeval.cache.open", level = "debug", skip(dir), fields(dir = %dir.as_ref().display()))]
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, EvalError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(EvalError::cache)?;

        let device = FsDeviceBuilder::new(dir)
            .with_capacity(DISK_CAPACITY)
            .build()
            .map_err(EvalError::cache)?;

        let handler: HybridCache<ScoreKey, f64> = HybridCacheBuilder::new()
            .memory(MEMORY_ENTRIES)
            .storage()
            .with_engine_config(BlockEngineBuilder::new(device).with_block_size(DISK_BLOCK_SIZE))
            .with_recover_mode(RecoverMode::Quiet)
            .build()
            .await
            .map_err(EvalError::cache)?;

        debug!("score cache opened");
        Ok(Self { handler })
    }
}

#[async_trait]
impl ScoreCache for DiskScoreCache {
    #[tracing::instrument(name = "rmeval.cache.get", level = "trace", skip_all)]
    async fn get(&self, key: &ScoreKey) -> Result<Option<f64>, EvalError> {
        let value = self
            .handler
            .get(key)
            .await
            .map_err(EvalError::cache)?
            .map(|entry| *entry.value());
        trace!(hit = value.is_some(), "cache lookup complete");
        Ok(value)
    }

    #[tracing::instrument(name = "rmeval.cache.insert", level = "trace", skip_all)]
    async fn insert(&self, key: ScoreKey, score: f64) -> Result<(), EvalError> {
        self.handler.insert(key, score);
        Ok(())
    }

    async fn close(&self) -> Result<(), EvalError> {
        self.handler.close().await.map_err(EvalError::cache)?;
        debug!("score cache closed");
        Ok(())
    }
}

/// In-process score cache for tests and offline runs.
#[derive(Debug, Default)]
pub struct MemoryScoreCache {
    entries: Mutex<HashMap<ScoreKey, f64>>,
    hits: AtomicUsize,
}

impl MemoryScoreCache {
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ScoreKey, f64>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ScoreCache for MemoryScoreCache {
    async fn get(&self, key: &ScoreKey) -> Result<Option<f64>, EvalError> {
        let value = self.lock().get(key).copied();
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        Ok(value)
    }

    async fn insert(&self, key: ScoreKey, score: f64) -> Result<(), EvalError> {
        self.lock().insert(key, score);
        Ok(())
    }

    async fn close(&self) -> Result<(), EvalError> {
        Ok(())
    }
}
