use crate::error::Result;
use crate::metrics::metrics;
use crate::topology::PositionMap;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persistence seam for manual node positions, scoped to one client profile.
///
/// Saves overwrite the whole snapshot (last write wins); loads never fail the
/// caller — absent or corrupt state degrades to an empty mapping and the next
/// build falls back to computed grid positions.
#[async_trait]
pub trait LayoutStore: Send + Sync {
    async fn save(&self, positions: &PositionMap) -> Result<()>;
    async fn load(&self) -> PositionMap;
    async fn clear(&self) -> Result<()>;
}

/// Layout store backed by a single JSON snapshot file.
pub struct FileLayoutStore {
    path: PathBuf,
}

impl FileLayoutStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LayoutStore for FileLayoutStore {
    async fn save(&self, positions: &PositionMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let encoded = serde_json::to_vec_pretty(positions)?;
        tokio::fs::write(&self.path, encoded).await?;
        Ok(())
    }

    async fn load(&self) -> PositionMap {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return PositionMap::new(),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "layout snapshot unreadable; treating as empty"
                );
                return PositionMap::new();
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(positions) => positions,
            Err(err) => {
                metrics().inc_layout_corrupt_load();
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "layout snapshot corrupt; treating as empty"
                );
                PositionMap::new()
            }
        }
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory store for tests and ephemeral deployments.
#[derive(Default)]
pub struct MemoryLayoutStore {
    inner: Mutex<PositionMap>,
}

impl MemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LayoutStore for MemoryLayoutStore {
    async fn save(&self, positions: &PositionMap) -> Result<()> {
        let mut guard = self.inner.lock().expect("layout store lock poisoned");
        *guard = positions.clone();
        Ok(())
    }

    async fn load(&self) -> PositionMap {
        self.inner
            .lock()
            .expect("layout store lock poisoned")
            .clone()
    }

    async fn clear(&self) -> Result<()> {
        self.inner
            .lock()
            .expect("layout store lock poisoned")
            .clear();
        Ok(())
    }
}
