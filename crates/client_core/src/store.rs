use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::Dataset;
use storage::Storage;
use tokio::sync::Mutex;

/// Snapshot persistence for the dataset. Whole snapshots only.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    async fn load(&self) -> Result<Option<Dataset>>;
    async fn save(&self, dataset: &Dataset) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

#[async_trait]
impl<T: DatasetStore + ?Sized> DatasetStore for Box<T> {
    async fn load(&self) -> Result<Option<Dataset>> {
        (**self).load().await
    }

    async fn save(&self, dataset: &Dataset) -> Result<()> {
        (**self).save(dataset).await
    }

    async fn clear(&self) -> Result<()> {
        (**self).clear().await
    }
}

#[async_trait]
impl<T: DatasetStore + ?Sized> DatasetStore for Arc<T> {
    async fn load(&self) -> Result<Option<Dataset>> {
        (**self).load().await
    }

    async fn save(&self, dataset: &Dataset) -> Result<()> {
        (**self).save(dataset).await
    }

    async fn clear(&self) -> Result<()> {
        (**self).clear().await
    }
}

#[async_trait]
impl DatasetStore for Storage {
    async fn load(&self) -> Result<Option<Dataset>> {
        self.load_dataset().await
    }

    async fn save(&self, dataset: &Dataset) -> Result<()> {
        self.save_dataset(dataset).await
    }

    async fn clear(&self) -> Result<()> {
        self.clear_dataset().await.map(|_| ())
    }
}

#[derive(Default)]
pub struct MemoryDatasetStore {
    snapshot: Mutex<Option<Dataset>>,
    saves: AtomicUsize,
}

impl MemoryDatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(dataset: Dataset) -> Self {
        Self {
            snapshot: Mutex::new(Some(dataset)),
            saves: AtomicUsize::new(0),
        }
    }

    pub async fn snapshot(&self) -> Option<Dataset> {
        self.snapshot.lock().await.clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetStore for MemoryDatasetStore {
    async fn load(&self) -> Result<Option<Dataset>> {
        Ok(self.snapshot.lock().await.clone())
    }

    async fn save(&self, dataset: &Dataset) -> Result<()> {
        *self.snapshot.lock().await = Some(dataset.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.snapshot.lock().await = None;
        Ok(())
    }
}

/// Store whose every operation fails, e.g. when the database cannot be opened.
pub struct UnavailableDatasetStore {
    reason: String,
}

impl UnavailableDatasetStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl DatasetStore for UnavailableDatasetStore {
    async fn load(&self) -> Result<Option<Dataset>> {
        Err(anyhow!("dataset store unavailable: {}", self.reason))
    }

    async fn save(&self, _dataset: &Dataset) -> Result<()> {
        Err(anyhow!("dataset store unavailable: {}", self.reason))
    }

    async fn clear(&self) -> Result<()> {
        Err(anyhow!("dataset store unavailable: {}", self.reason))
    }
}
