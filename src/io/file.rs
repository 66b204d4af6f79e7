use std::path::{Path, PathBuf};

use crate::error::SourceError;
use crate::model::TaskRecord;

use super::{TaskFilter, TaskSource};

/// Snapshot source backed by a JSON file holding an array of task
/// records.
#[derive(Debug, Clone)]
pub struct JsonTaskSource {
    path: PathBuf,
}

impl JsonTaskSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskSource for JsonTaskSource {
    fn fetch_tasks(&self, filter: Option<&TaskFilter>) -> Result<Vec<TaskRecord>, SourceError> {
        let json = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let records: Vec<TaskRecord> = serde_json::from_str(&json)?;
        Ok(super::apply_filter(records, filter))
    }
}

/// Serialize a working snapshot back to pretty-printed JSON.
pub fn save_snapshot(records: &[TaskRecord], path: &Path) -> Result<(), SourceError> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}
