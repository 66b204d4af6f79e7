pub mod task;
pub mod timeline;

pub use task::{DependencyKind, Phase, Task, TaskOrigin, TaskRecord};
pub use timeline::{TimeBounds, ZoomLevel, BOUNDS_PADDING_DAYS};
