/// Region persistence primitive.
///
/// Each region lives in its own record keyed by id, so one broken record
/// never blocks the others.
use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::StoreError;

use super::RegionRecord;

pub trait RegionStore: Send + Sync {
    /// Ids of every stored record. Entries whose key is not an id are skipped.
    fn list_ids(&self) -> Result<Vec<Uuid>, StoreError>;

    fn read(&self, id: Uuid) -> Result<RegionRecord, StoreError>;

    fn write(&self, id: Uuid, record: &RegionRecord) -> Result<(), StoreError>;

    fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Stores every region as `<id>.json` inside one folder.
pub struct JsonRegionStore {
    folder: PathBuf,
}

impl JsonRegionStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.folder.join(format!("{}.json", id))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl RegionStore for JsonRegionStore {
    fn list_ids(&self) -> Result<Vec<Uuid>, StoreError> {
        if !self.folder.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.folder).map_err(|e| Self::io_error(&self.folder, e))?;
        let mut ids = Vec::new();

        for entry in entries {
            let path = entry.map_err(|e| Self::io_error(&self.folder, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            match Uuid::parse_str(stem) {
                Ok(id) => ids.push(id),
                Err(_) => tracing::warn!("Ignoring region file with non-id name: {}", path.display()),
            }
        }

        ids.sort();
        Ok(ids)
    }

    fn read(&self, id: Uuid) -> Result<RegionRecord, StoreError> {
        let path = self.path_for(id);
        let content = fs::read_to_string(&path).map_err(|e| Self::io_error(&path, e))?;

        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn write(&self, id: Uuid, record: &RegionRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.folder).map_err(|e| Self::io_error(&self.folder, e))?;

        let json = serde_json::to_string_pretty(record)
            .map_err(|source| StoreError::Serialize { id, source })?;
        let path = self.path_for(id);
        fs::write(&path, json).map_err(|e| Self::io_error(&path, e))?;

        tracing::debug!("Saved region {} to {}", id, path.display());
        Ok(())
    }

    fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let path = self.path_for(id);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| Self::io_error(&path, e))?;
            tracing::debug!("Deleted region file: {}", path.display());
        }
        Ok(())
    }
}
