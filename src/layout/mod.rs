pub mod focus;
pub mod geometry;
pub mod header;

pub use focus::{focus_target, ScrollTarget, Viewport, ROW_HEIGHT};
pub use geometry::{
    position, total_width_px, BarShape, PositionCache, MARKER_SIZE, MIN_BAR_WIDTH,
    POSITION_CACHE_CAPACITY,
};
pub use header::{header_cells, HeaderCell};
