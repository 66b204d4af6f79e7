use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::SourceError;
use crate::hierarchy::{ExpansionState, FlatRow, HierarchyBuilder, TaskTree};
use crate::io::{TaskFilter, TaskSource};
use crate::layout::{
    focus_target, header_cells, total_width_px, BarShape, HeaderCell, PositionCache, ScrollTarget,
    Viewport, ROW_HEIGHT,
};
use crate::model::{Task, TaskRecord, TimeBounds, ZoomLevel};

/// One render-ready row handed to the render surface.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    pub task: &'a Task,
    pub depth: usize,
    pub has_children: bool,
    pub is_expanded: bool,
}

/// Everything the render surface needs to draw the timeline pane.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    pub total_width_px: f32,
    pub bounds: TimeBounds,
    pub header_cells: Vec<HeaderCell>,
    /// Geometry per visible task, keyed by task id.
    pub bars: HashMap<String, BarShape>,
}

impl TimelineLayout {
    /// Safe default before any snapshot has loaded.
    fn empty() -> Self {
        Self {
            total_width_px: 0.0,
            bounds: TimeBounds::from_tasks(&[]),
            header_cells: Vec::new(),
            bars: HashMap::new(),
        }
    }
}

/// Notifications handed outward to the embedding surface, drained with
/// [`GanttEngine::take_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    TaskClicked(String),
    ExpansionChanged { id: String, expanded: bool },
    SnapshotReplaced { task_count: usize },
    LoadFailed { message: String },
}

/// Facade over the hierarchy, flatten, and geometry layers.
///
/// Owns the working snapshot and every derived cache. All operations are
/// synchronous in-memory computation; the only asynchronous boundary is
/// the [`TaskSource`] collaborator, whose results arrive here as whole
/// snapshots. A failed fetch keeps the last good snapshot on screen and
/// records the error state instead of clearing the display.
pub struct GanttEngine {
    builder: HierarchyBuilder,
    zoom: ZoomLevel,
    expansion: ExpansionState,
    selected: Option<String>,
    tree: Option<TaskTree>,
    last_error: Option<String>,
    flat_cache: Option<(u64, Vec<FlatRow>)>,
    positions: PositionCache,
    events: Vec<EngineEvent>,
}

impl Default for GanttEngine {
    fn default() -> Self {
        Self::with_builder(HierarchyBuilder::new())
    }
}

impl GanttEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: HierarchyBuilder) -> Self {
        Self {
            builder,
            zoom: ZoomLevel::Week,
            expansion: ExpansionState::new(),
            selected: None,
            tree: None,
            last_error: None,
            flat_cache: None,
            positions: PositionCache::default(),
            events: Vec::new(),
        }
    }

    // --- Snapshot lifecycle ---

    /// Fetch a snapshot and swap it in. On failure the previous snapshot
    /// stays rendered and the error is recorded for the caller's retry
    /// affordance.
    pub fn load_from(
        &mut self,
        source: &dyn TaskSource,
        filter: Option<&TaskFilter>,
    ) -> Result<usize, SourceError> {
        self.ingest(source.fetch_tasks(filter))
    }

    /// Like [`load_from`] but bypasses any collaborator-side cache.
    ///
    /// [`load_from`]: GanttEngine::load_from
    pub fn refresh_from(
        &mut self,
        source: &dyn TaskSource,
        filter: Option<&TaskFilter>,
    ) -> Result<usize, SourceError> {
        self.ingest(source.refresh(filter))
    }

    fn ingest(&mut self, fetched: Result<Vec<TaskRecord>, SourceError>) -> Result<usize, SourceError> {
        match fetched {
            Ok(records) => {
                self.apply_snapshot(&records);
                Ok(records.len())
            }
            Err(err) => {
                warn!(error = %err, "snapshot fetch failed, keeping previous working set");
                self.last_error = Some(err.to_string());
                self.events.push(EngineEvent::LoadFailed {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Replace the working set wholesale and drop every derived cache.
    pub fn apply_snapshot(&mut self, records: &[TaskRecord]) {
        let tasks = self.builder.build(records);
        let tree = TaskTree::build(tasks);

        self.expansion.retain_known(&tree);
        if let Some(selected) = &self.selected {
            if !tree.contains(selected) {
                self.selected = None;
            }
        }
        self.flat_cache = None;
        self.positions.clear();
        self.last_error = None;

        debug!(task_count = tree.len(), "snapshot replaced, caches invalidated");
        self.events.push(EngineEvent::SnapshotReplaced {
            task_count: tree.len(),
        });
        self.tree = Some(tree);
    }

    /// Error from the most recent failed fetch, cleared by the next
    /// successful load.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.tree.is_some()
    }

    pub fn task_count(&self) -> usize {
        self.tree.as_ref().map_or(0, |t| t.len())
    }

    // --- Render surface contract ---

    /// The flattened, render-ready row sequence for the current expansion
    /// state. Served from cache until the snapshot or expansion changes.
    pub fn get_visible_rows(&mut self) -> Vec<RowView<'_>> {
        self.ensure_flat_cache();
        let (Some(tree), Some((_, rows))) = (&self.tree, &self.flat_cache) else {
            return Vec::new();
        };
        rows.iter()
            .map(|row| {
                let task = tree.task(row.index);
                RowView {
                    task,
                    depth: row.depth,
                    has_children: tree.has_children(row.index),
                    is_expanded: self.expansion.is_expanded(&task.id),
                }
            })
            .collect()
    }

    /// Axis bounds, header strip, and bar geometry for every visible row
    /// at the current zoom. Safe to call before any snapshot: yields a
    /// zero-width layout.
    pub fn get_timeline_layout(&mut self) -> TimelineLayout {
        self.ensure_flat_cache();
        let (Some(tree), Some((_, rows))) = (&self.tree, &self.flat_cache) else {
            return TimelineLayout::empty();
        };

        let bounds = TimeBounds::from_tasks(tree.tasks());
        let total = total_width_px(self.zoom, &bounds);
        let mut bars = HashMap::with_capacity(rows.len());
        for row in rows {
            let task = tree.task(row.index);
            bars.insert(task.id.clone(), self.positions.position(task, &bounds, total));
        }

        TimelineLayout {
            total_width_px: total,
            bounds,
            header_cells: header_cells(self.zoom, &bounds, total),
            bars,
        }
    }

    // --- Interaction ---

    /// Expand or collapse a row. Collapsing recursively forgets the
    /// expansion of every descendant.
    pub fn toggle_expand(&mut self, id: &str) {
        let Some(tree) = &self.tree else { return };
        if !tree.contains(id) {
            warn!(task_id = %id, "toggle ignored for unknown task");
            return;
        }
        let expanded = self.expansion.toggle(id, tree);
        self.flat_cache = None;
        self.events.push(EngineEvent::ExpansionChanged {
            id: id.to_string(),
            expanded,
        });
    }

    pub fn select_task(&mut self, id: &str) {
        let Some(tree) = &self.tree else { return };
        if !tree.contains(id) {
            warn!(task_id = %id, "selection ignored for unknown task");
            return;
        }
        self.selected = Some(id.to_string());
        self.events.push(EngineEvent::TaskClicked(id.to_string()));
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let tree = self.tree.as_ref()?;
        self.selected.as_deref().and_then(|id| tree.get(id))
    }

    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    /// Changing zoom needs no explicit geometry invalidation: the total
    /// width is part of every position cache key.
    pub fn set_zoom(&mut self, zoom: ZoomLevel) {
        self.zoom = zoom;
    }

    /// Scroll offsets that bring the task's bar and row into view, or
    /// `None` when the task is not currently visible.
    pub fn focus_task(&mut self, id: &str, viewport: &Viewport) -> Option<ScrollTarget> {
        self.ensure_flat_cache();
        let (Some(tree), Some((_, rows))) = (&self.tree, &self.flat_cache) else {
            return None;
        };
        let row_index = rows
            .iter()
            .position(|row| tree.task(row.index).id == id)?;
        let task = tree.task(rows[row_index].index);

        let bounds = TimeBounds::from_tasks(tree.tasks());
        let total = total_width_px(self.zoom, &bounds);
        let shape = self.positions.position(task, &bounds, total);
        Some(focus_target(&shape, row_index, viewport, ROW_HEIGHT))
    }

    /// Drain pending outbound events, oldest first.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn ensure_flat_cache(&mut self) {
        let Some(tree) = &self.tree else { return };
        let key = tree.fingerprint().rotate_left(1) ^ self.expansion.fingerprint();
        let stale = self.flat_cache.as_ref().map(|(k, _)| *k) != Some(key);
        if stale {
            self.flat_cache = Some((key, tree.flatten(&self.expansion)));
        }
    }
}
