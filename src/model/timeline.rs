use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::task::Task;

/// Controls what temporal granularity the timeline displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoomLevel {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl ZoomLevel {
    /// Pixels allotted to one unit at this granularity.
    pub fn pixels_per_unit(self) -> f32 {
        match self {
            ZoomLevel::Day => 30.0,
            ZoomLevel::Week => 100.0,
            ZoomLevel::Month => 120.0,
            ZoomLevel::Quarter => 150.0,
            ZoomLevel::Year => 200.0,
        }
    }

    /// Average days in one unit, used to size the total canvas.
    pub fn days_per_unit(self) -> f32 {
        match self {
            ZoomLevel::Day => 1.0,
            ZoomLevel::Week => 7.0,
            ZoomLevel::Month => 30.44,
            ZoomLevel::Quarter => 91.31,
            ZoomLevel::Year => 365.25,
        }
    }
}

/// Days of breathing room added on each side of the task range.
pub const BOUNDS_PADDING_DAYS: i64 = 7;

/// Window shown when there are no tasks to derive bounds from.
const EMPTY_BOUNDS_SPAN_DAYS: i64 = 30;

/// The date window the timeline covers, padded around the task set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBounds {
    /// The leftmost date on the axis.
    pub start: NaiveDate,
    /// The rightmost date on the axis.
    pub end: NaiveDate,
}

impl TimeBounds {
    /// Derive bounds from a task set: min start − 7d to max finish + 7d.
    ///
    /// An empty set yields a 30-day window starting today so the render
    /// surface always has a drawable axis.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let min = tasks.iter().map(|t| t.start).min();
        let max = tasks.iter().map(|t| t.finish.max(t.start)).max();
        match (min, max) {
            (Some(min), Some(max)) => Self {
                start: min - chrono::Duration::days(BOUNDS_PADDING_DAYS),
                end: max + chrono::Duration::days(BOUNDS_PADDING_DAYS),
            },
            _ => {
                let today = chrono::Local::now().date_naive();
                Self {
                    start: today,
                    end: today + chrono::Duration::days(EMPTY_BOUNDS_SPAN_DAYS),
                }
            }
        }
    }

    /// Number of days the bounds span, never less than one.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days().max(1)
    }

    /// Convert a date to an x-pixel offset on an axis of the given width.
    pub fn date_to_x(&self, date: NaiveDate, total_width_px: f32) -> f32 {
        let elapsed = (date - self.start).num_days() as f32;
        elapsed / self.span_days() as f32 * total_width_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bounds_pad_seven_days_each_side() {
        let tasks = vec![
            Task::new("a", "A", date(2025, 1, 8), date(2025, 1, 20)),
            Task::new("b", "B", date(2025, 1, 10), date(2025, 1, 24)),
        ];
        let bounds = TimeBounds::from_tasks(&tasks);
        assert_eq!(bounds.start, date(2025, 1, 1));
        assert_eq!(bounds.end, date(2025, 1, 31));
        assert_eq!(bounds.span_days(), 30);
    }

    #[test]
    fn empty_bounds_span_thirty_days() {
        let bounds = TimeBounds::from_tasks(&[]);
        assert_eq!(bounds.span_days(), 30);
    }

    #[test]
    fn inverted_task_range_still_yields_ordered_bounds() {
        let tasks = vec![Task::new("a", "A", date(2025, 1, 20), date(2025, 1, 8))];
        let bounds = TimeBounds::from_tasks(&tasks);
        assert!(bounds.start < bounds.end);
    }

    #[test]
    fn date_to_x_is_proportional() {
        let tasks = vec![Task::new("a", "A", date(2025, 1, 8), date(2025, 1, 24))];
        let bounds = TimeBounds::from_tasks(&tasks);
        assert_eq!(bounds.date_to_x(bounds.start, 900.0), 0.0);
        assert_eq!(bounds.date_to_x(bounds.end, 900.0), 900.0);
    }
}
