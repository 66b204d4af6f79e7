use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Project phase a task belongs to. Display/coloring only; the engine
/// never makes structural decisions from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Initiation,
    Planning,
    Selection,
    Execution,
    Closure,
}

/// Represents the type of dependency between two tasks.
///
/// Stored and surfaced for display; no scheduling logic evaluates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyKind {
    FinishToStart,
    StartToStart,
    FinishToFinish,
    StartToFinish,
}

/// Where a task in the working set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskOrigin {
    /// Present in the source snapshot.
    #[default]
    Source,
    /// Placeholder parent synthesized for a dangling reference.
    SynthesizedParent,
    /// Category row produced by name-pattern grouping.
    HeuristicGroup,
}

/// One raw WBS row as delivered by the data-access collaborator.
///
/// Every field the upstream system is known to mangle is optional here;
/// `HierarchyBuilder::build` turns a batch of records into a consistent
/// working set of [`Task`]s and never rejects a record outright.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskRecord {
    pub id: String,
    pub wbs_code: Option<String>,
    pub number: Option<String>,
    pub name: String,
    pub phase: Option<Phase>,
    pub start: Option<NaiveDate>,
    pub finish: Option<NaiveDate>,
    /// Duration in days, when the source supplies one.
    pub duration: Option<i64>,
    pub progress: Option<f32>,
    pub is_summary: bool,
    pub parent_id: Option<String>,
    pub sort_key: Option<i64>,
    pub successor_id: Option<String>,
    pub dependency_kind: Option<DependencyKind>,
    pub is_milestone: bool,
    /// Lets file-backed sources apply a project filter locally.
    pub project_id: Option<String>,
    /// Preserved across snapshot round-trips so synthesized and heuristic
    /// rows stay flagged as such.
    pub origin: TaskOrigin,
}

/// A single normalized task in the working set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub wbs_code: Option<String>,
    pub number: Option<String>,
    pub name: String,
    pub phase: Option<Phase>,
    pub start: NaiveDate,
    pub finish: NaiveDate,
    /// Duration in days, always >= 1 after normalization.
    pub duration: i64,
    /// Progress from 0.0 (not started) to 1.0 (complete).
    pub progress: f32,
    /// True iff at least one other task names this one as its parent.
    /// Recomputed by the builder; input values are overwritten.
    pub is_summary: bool,
    pub parent_id: Option<String>,
    pub sort_key: Option<i64>,
    pub successor_id: Option<String>,
    pub dependency_kind: Option<DependencyKind>,
    /// If true, rendered as a point-in-time marker; duration is ignored.
    pub is_milestone: bool,
    pub origin: TaskOrigin,
}

/// Start of the deterministic placeholder window for records that arrive
/// with no dates at all.
pub(crate) fn placeholder_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 6).unwrap_or(NaiveDate::MIN)
}

/// Fallback window length for dateless or single-dated records.
const DEFAULT_WINDOW_DAYS: i64 = 7;

impl Task {
    /// Create a new task with sensible defaults.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
        finish: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            wbs_code: None,
            number: None,
            name: name.into(),
            phase: None,
            start,
            finish,
            duration: (finish - start).num_days().max(1),
            progress: 0.0,
            is_summary: false,
            parent_id: None,
            sort_key: None,
            successor_id: None,
            dependency_kind: None,
            is_milestone: false,
            origin: TaskOrigin::Source,
        }
    }

    /// Create a new milestone.
    pub fn new_milestone(id: impl Into<String>, name: impl Into<String>, date: NaiveDate) -> Self {
        let mut task = Self::new(id, name, date, date);
        task.is_milestone = true;
        task
    }
}

impl TaskRecord {
    /// Normalize this record into a working [`Task`].
    ///
    /// `placeholder_start` anchors the window used when the record carries
    /// no dates; the builder spaces these evenly from a fixed epoch so the
    /// result is deterministic across loads.
    ///
    /// Inverted date ranges are kept as-is. The geometry layer clamps them
    /// to the minimum bar width.
    pub(crate) fn normalize(&self, placeholder_start: NaiveDate) -> Task {
        let window = self.duration.map(|d| d.max(1)).unwrap_or(DEFAULT_WINDOW_DAYS);
        let (start, finish) = match (self.start, self.finish) {
            (Some(s), Some(f)) => (s, f),
            (Some(s), None) => (s, s + Duration::days(window)),
            (None, Some(f)) => (f - Duration::days(window), f),
            (None, None) => (
                placeholder_start,
                placeholder_start + Duration::days(DEFAULT_WINDOW_DAYS),
            ),
        };
        let duration = self
            .duration
            .unwrap_or_else(|| (finish - start).num_days())
            .max(1);

        Task {
            id: self.id.clone(),
            wbs_code: self.wbs_code.clone(),
            number: self.number.clone(),
            name: self.name.clone(),
            phase: self.phase,
            start,
            finish,
            duration,
            progress: self.progress.unwrap_or(0.0).clamp(0.0, 1.0),
            // Recomputed by the builder once all parent edges are settled.
            is_summary: self.is_summary,
            parent_id: self.parent_id.clone().filter(|p| !p.is_empty()),
            sort_key: self.sort_key,
            successor_id: self.successor_id.clone(),
            dependency_kind: self.dependency_kind,
            is_milestone: self.is_milestone,
            origin: self.origin,
        }
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            wbs_code: task.wbs_code.clone(),
            number: task.number.clone(),
            name: task.name.clone(),
            phase: task.phase,
            start: Some(task.start),
            finish: Some(task.finish),
            duration: Some(task.duration),
            progress: Some(task.progress),
            is_summary: task.is_summary,
            parent_id: task.parent_id.clone(),
            sort_key: task.sort_key,
            successor_id: task.successor_id.clone(),
            dependency_kind: task.dependency_kind,
            is_milestone: task.is_milestone,
            project_id: None,
            origin: task.origin,
        }
    }
}
