//! Hierarchy reconstruction and timeline layout engine for Gantt charts.
//!
//! Takes a flat, possibly inconsistent list of WBS task records, repairs
//! it into a validated tree, flattens it according to expand/collapse
//! state, and computes pixel-accurate bar and header geometry per zoom
//! level. Rendering, styling, and remote data access are the embedding
//! application's concern; see [`GanttEngine`] for the surface contract
//! and [`io::TaskSource`] for the data-access contract.

pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod io;
pub mod layout;
pub mod model;

pub use engine::{EngineEvent, GanttEngine, RowView, TimelineLayout};
pub use error::SourceError;
pub use hierarchy::{
    ExpansionState, GroupingStrategy, HierarchyBuilder, NamePatternGrouping, RepairMode, TaskTree,
};
pub use io::{CsvTaskSource, JsonTaskSource, TaskFilter, TaskSource};
pub use layout::{BarShape, HeaderCell, ScrollTarget, Viewport};
pub use model::{DependencyKind, Phase, Task, TaskOrigin, TaskRecord, TimeBounds, ZoomLevel};
