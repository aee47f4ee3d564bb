//! Design storage keyed by design id.
//!
//! `save` upserts: saving an existing id overwrites it. `load` of an
//! unknown id is [`LayoutError::DesignNotFound`].

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{LayoutError, Result};
use crate::types::DesignDocument;

/// Acknowledgement returned by a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveAck {
    pub id: String,
}

pub trait DesignStore {
    fn load(&self, design_id: &str) -> Result<DesignDocument>;
    fn save(&mut self, design_id: &str, design: &DesignDocument) -> Result<SaveAck>;
    /// Stored design ids, sorted.
    fn list(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    designs: HashMap<String, DesignDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DesignStore for MemoryStore {
    fn load(&self, design_id: &str) -> Result<DesignDocument> {
        self.designs
            .get(design_id)
            .cloned()
            .ok_or_else(|| LayoutError::DesignNotFound(design_id.to_string()))
    }

    fn save(&mut self, design_id: &str, design: &DesignDocument) -> Result<SaveAck> {
        self.designs.insert(design_id.to_string(), design.clone());
        Ok(SaveAck {
            id: design_id.to_string(),
        })
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.designs.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// One pretty-printed `<design_id>.json` per design in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Use `dir`, creating it if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, design_id: &str) -> Result<PathBuf> {
        let valid = !design_id.is_empty()
            && design_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(LayoutError::InvalidDesignId(design_id.to_string()));
        }
        Ok(self.dir.join(format!("{design_id}.json")))
    }
}

impl DesignStore for JsonFileStore {
    fn load(&self, design_id: &str) -> Result<DesignDocument> {
        let path = self.path_for(design_id)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LayoutError::DesignNotFound(design_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        debug!(design_id, path = %path.display(), "design loaded");
        DesignDocument::from_json(&text)
    }

    fn save(&mut self, design_id: &str, design: &DesignDocument) -> Result<SaveAck> {
        let path = self.path_for(design_id)?;
        fs::write(&path, design.to_json()?)?;
        debug!(design_id, path = %path.display(), "design saved");
        Ok(SaveAck {
            id: design_id.to_string(),
        })
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
