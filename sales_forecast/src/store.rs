//! Persistence slots for fitted models
//!
//! A slot holds exactly one model. Saving replaces the whole model; a reader
//! sees either the previous model or the new one, never a mix.

use crate::encoder::EncodedDataset;
use crate::error::{ForecastError, Result};
use crate::model::SalesModel;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Named slot a fitted model is saved to and loaded from
pub trait ModelStore {
    /// Replace the stored model
    fn save(&self, model: &SalesModel) -> Result<()>;

    /// Load the stored model, or `ForecastError::ModelNotFound` if none was saved
    fn load(&self) -> Result<SalesModel>;

    /// Short human-readable description used in logs
    fn describe(&self) -> String;
}

/// Availability of a usable model
#[derive(Debug, Clone, PartialEq)]
pub enum ModelState {
    /// Nothing has been saved yet; a model must be trained first
    Missing,
    /// A model exists but was trained on different data
    Stale(SalesModel),
    /// A model trained on the current data
    Ready(SalesModel),
}

impl ModelState {
    /// Load from `store` and compare against the current dataset
    pub fn resolve(store: &dyn ModelStore, current: &EncodedDataset) -> Result<Self> {
        match store.load() {
            Ok(model) if model.is_stale_for(current) => Ok(ModelState::Stale(model)),
            Ok(model) => Ok(ModelState::Ready(model)),
            Err(ForecastError::ModelNotFound(slot)) => {
                debug!(%slot, "no saved model");
                Ok(ModelState::Missing)
            }
            Err(e) => Err(e),
        }
    }
}

/// Model slot backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl ModelStore for FileModelStore {
    fn save(&self, model: &SalesModel) -> Result<()> {
        let dir = self.directory();
        fs::create_dir_all(dir)?;

        // The temporary file is deleted on drop unless it is persisted.
        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(&mut tmp);
            serde_json::to_writer(&mut writer, model)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| ForecastError::IoError(e.error))?;

        info!(path = %self.path.display(), samples = model.summary().samples, "saved model");
        Ok(())
    }

    fn load(&self) -> Result<SalesModel> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ForecastError::ModelNotFound(
                    self.path.display().to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
        };

        let model: SalesModel = serde_json::from_reader(BufReader::new(file))?;
        debug!(path = %self.path.display(), "loaded model");
        Ok(model)
    }

    fn describe(&self) -> String {
        format!("model file {}", self.path.display())
    }
}

/// In-process model slot guarded by a readers-writer lock
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    slot: RwLock<Option<SalesModel>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelStore for MemoryModelStore {
    fn save(&self, model: &SalesModel) -> Result<()> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(model.clone());
        Ok(())
    }

    fn load(&self) -> Result<SalesModel> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.clone()
            .ok_or_else(|| ForecastError::ModelNotFound("in-memory slot".to_string()))
    }

    fn describe(&self) -> String {
        "in-memory model slot".to_string()
    }
}
