use std::collections::{HashMap, VecDeque};

use chrono::NaiveDate;

use crate::model::{Task, TimeBounds, ZoomLevel};

/// Narrowest bar the chart will draw; keeps zero and near-zero duration
/// tasks visible.
pub const MIN_BAR_WIDTH: f32 = 20.0;

/// Edge length of the milestone marker, centered on its date.
pub const MARKER_SIZE: f32 = 14.0;

/// Pixel geometry for one task row on the timeline canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarShape {
    Bar { left: f32, width: f32 },
    /// Milestones render as a fixed-size marker; duration is ignored.
    Marker { center: f32 },
}

impl BarShape {
    /// Leftmost pixel the shape occupies.
    pub fn left_edge(&self) -> f32 {
        match *self {
            BarShape::Bar { left, .. } => left,
            BarShape::Marker { center } => center - MARKER_SIZE / 2.0,
        }
    }

    /// Horizontal extent of the shape.
    pub fn extent(&self) -> f32 {
        match *self {
            BarShape::Bar { width, .. } => width,
            BarShape::Marker { .. } => MARKER_SIZE,
        }
    }
}

/// Total canvas width for the given zoom level: whole units across the
/// bounds times the zoom's pixels-per-unit.
pub fn total_width_px(zoom: ZoomLevel, bounds: &TimeBounds) -> f32 {
    let units = bounds.span_days() as f32 / zoom.days_per_unit();
    units.ceil() * zoom.pixels_per_unit()
}

/// Compute the bar geometry for one task.
///
/// Pure in (task dates, bounds, total width): `left` is the elapsed
/// fraction of the bounds clamped to >= 0, `width` the duration fraction
/// floored at [`MIN_BAR_WIDTH`]. Inverted date ranges therefore collapse
/// to the minimum width rather than failing.
pub fn position(task: &Task, bounds: &TimeBounds, total_width_px: f32) -> BarShape {
    let span = bounds.span_days() as f32;
    let left =
        ((task.start - bounds.start).num_days() as f32 / span * total_width_px).max(0.0);
    if task.is_milestone {
        BarShape::Marker { center: left }
    } else {
        let width =
            ((task.finish - task.start).num_days() as f32 / span * total_width_px).max(MIN_BAR_WIDTH);
        BarShape::Bar { left, width }
    }
}

/// Default number of memoized positions kept per engine instance.
pub const POSITION_CACHE_CAPACITY: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PositionKey {
    task_id: String,
    start: NaiveDate,
    finish: NaiveDate,
    milestone: bool,
    // f32 is not Eq/Hash; the bit pattern is, and it is exact for keys.
    total_width_bits: u32,
    bounds_start: NaiveDate,
    bounds_end: NaiveDate,
}

/// Memoized [`position`] results.
///
/// Keys carry every input the result depends on, so any change to a
/// task's dates, the zoom-derived width, or the bounds misses naturally.
/// Capacity is bounded; the oldest entry is evicted first so a long
/// session cannot grow the map without limit. `clear` on snapshot
/// replacement.
#[derive(Debug)]
pub struct PositionCache {
    entries: HashMap<PositionKey, BarShape>,
    order: VecDeque<PositionKey>,
    capacity: usize,
}

impl Default for PositionCache {
    fn default() -> Self {
        Self::new(POSITION_CACHE_CAPACITY)
    }
}

impl PositionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Memoizing wrapper around [`position`].
    pub fn position(&mut self, task: &Task, bounds: &TimeBounds, total_width_px: f32) -> BarShape {
        let key = PositionKey {
            task_id: task.id.clone(),
            start: task.start,
            finish: task.finish,
            milestone: task.is_milestone,
            total_width_bits: total_width_px.to_bits(),
            bounds_start: bounds.start,
            bounds_end: bounds.end,
        };
        if let Some(shape) = self.entries.get(&key) {
            return *shape;
        }
        let shape = position(task, bounds, total_width_px);
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.entries.insert(key.clone(), shape);
        self.order.push_back(key);
        shape
    }
}
