pub mod csv_import;
pub mod file;

use crate::error::SourceError;
use crate::model::TaskRecord;

pub use csv_import::CsvTaskSource;
pub use file::{save_snapshot, JsonTaskSource};

/// Filter passed through to the data-access layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub project_id: Option<String>,
}

/// A data-access collaborator that produces task snapshots.
///
/// Each successful call is one complete snapshot; the engine swaps it in
/// wholesale. Retry policy, paging, and remote query construction all
/// live behind this trait, not in the engine.
pub trait TaskSource {
    /// Fetch a full snapshot, possibly served from the collaborator's own
    /// cache.
    fn fetch_tasks(&self, filter: Option<&TaskFilter>) -> Result<Vec<TaskRecord>, SourceError>;

    /// Fetch a fresh snapshot, bypassing any collaborator-side caching.
    /// Sources without a cache can rely on the default delegation.
    fn refresh(&self, filter: Option<&TaskFilter>) -> Result<Vec<TaskRecord>, SourceError> {
        self.fetch_tasks(filter)
    }
}

/// Keep only records matching the filter; records without a project id
/// pass any filter.
pub(crate) fn apply_filter(
    records: Vec<TaskRecord>,
    filter: Option<&TaskFilter>,
) -> Vec<TaskRecord> {
    let Some(project_id) = filter.and_then(|f| f.project_id.as_deref()) else {
        return records;
    };
    records
        .into_iter()
        .filter(|r| r.project_id.as_deref().map_or(true, |p| p == project_id))
        .collect()
}
