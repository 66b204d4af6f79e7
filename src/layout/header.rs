use chrono::{Datelike, Duration, NaiveDate};

use crate::model::{TimeBounds, ZoomLevel};

/// One labeled cell in the timeline header strip.
///
/// Offsets and widths come from the same proportional scale as the task
/// bars, so header and bars always line up.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub label: String,
    /// First date the cell covers.
    pub start: NaiveDate,
    pub offset: f32,
    pub width: f32,
}

/// Produce one cell per calendar unit across the bounds. Cells at the
/// edges are clipped to the bounds, so the strip always tiles the full
/// canvas width exactly.
pub fn header_cells(zoom: ZoomLevel, bounds: &TimeBounds, total_width_px: f32) -> Vec<HeaderCell> {
    let mut cells = Vec::new();
    let mut cursor = bounds.start;
    while cursor < bounds.end {
        let next = unit_end(cursor, zoom).min(bounds.end);
        let offset = bounds.date_to_x(cursor, total_width_px);
        let width = bounds.date_to_x(next, total_width_px) - offset;
        cells.push(HeaderCell {
            label: unit_label(cursor, zoom),
            start: cursor,
            offset,
            width,
        });
        cursor = next;
    }
    cells
}

/// Start of the calendar unit immediately after `date`.
fn unit_end(date: NaiveDate, zoom: ZoomLevel) -> NaiveDate {
    match zoom {
        ZoomLevel::Day => date + Duration::days(1),
        ZoomLevel::Week => {
            let into_week = date.weekday().num_days_from_monday() as i64;
            date + Duration::days(7 - into_week)
        }
        ZoomLevel::Month => {
            let (year, month) = if date.month() == 12 {
                (date.year() + 1, 1)
            } else {
                (date.year(), date.month() + 1)
            };
            ymd(year, month, date)
        }
        ZoomLevel::Quarter => {
            let quarter_start = (date.month0() / 3) * 3 + 1;
            if quarter_start + 3 > 12 {
                ymd(date.year() + 1, 1, date)
            } else {
                ymd(date.year(), quarter_start + 3, date)
            }
        }
        ZoomLevel::Year => ymd(date.year() + 1, 1, date),
    }
}

fn unit_label(date: NaiveDate, zoom: ZoomLevel) -> String {
    match zoom {
        ZoomLevel::Day => date.format("%d %b").to_string(),
        ZoomLevel::Week => format!("W{}", date.iso_week().week()),
        ZoomLevel::Month => date.format("%b %Y").to_string(),
        ZoomLevel::Quarter => format!("Q{} {}", date.month0() / 3 + 1, date.year()),
        ZoomLevel::Year => date.format("%Y").to_string(),
    }
}

/// First of the given month; the input date doubles as an (unreachable)
/// fallback to keep date construction non-panicking.
fn ymd(year: i32, month: u32, fallback: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_cells_tile_the_canvas_evenly() {
        let bounds = TimeBounds {
            start: date(2025, 1, 1),
            end: date(2025, 1, 31),
        };
        let cells = header_cells(ZoomLevel::Day, &bounds, 900.0);
        assert_eq!(cells.len(), 30);
        assert!(cells.iter().all(|c| (c.width - 30.0).abs() < 1e-3));
        assert_eq!(cells[0].label, "01 Jan");
        assert_eq!(cells[0].offset, 0.0);
        assert_eq!(cells[29].offset, 870.0);
    }

    #[test]
    fn week_cells_break_on_mondays() {
        // 2025-01-01 is a Wednesday; the first cell is clipped.
        let bounds = TimeBounds {
            start: date(2025, 1, 1),
            end: date(2025, 1, 15),
        };
        let cells = header_cells(ZoomLevel::Week, &bounds, 200.0);
        assert_eq!(cells[0].start, date(2025, 1, 1));
        assert_eq!(cells[1].start, date(2025, 1, 6));
        assert_eq!(cells[2].start, date(2025, 1, 13));
        assert_eq!(cells[1].label, "W2");
        assert!(cells[0].width < cells[1].width);
    }

    #[test]
    fn month_cells_span_calendar_months() {
        let bounds = TimeBounds {
            start: date(2024, 12, 15),
            end: date(2025, 2, 10),
        };
        let cells = header_cells(ZoomLevel::Month, &bounds, 500.0);
        let labels: Vec<&str> = cells.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Dec 2024", "Jan 2025", "Feb 2025"]);
        assert_eq!(cells[1].start, date(2025, 1, 1));
    }

    #[test]
    fn quarter_and_year_labels() {
        let bounds = TimeBounds {
            start: date(2024, 11, 20),
            end: date(2025, 5, 1),
        };
        let quarters = header_cells(ZoomLevel::Quarter, &bounds, 400.0);
        let labels: Vec<&str> = quarters.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Q4 2024", "Q1 2025", "Q2 2025"]);

        let years = header_cells(ZoomLevel::Year, &bounds, 400.0);
        let labels: Vec<&str> = years.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["2024", "2025"]);
    }

    #[test]
    fn cells_cover_the_full_width() {
        let bounds = TimeBounds {
            start: date(2025, 1, 3),
            end: date(2025, 4, 20),
        };
        for zoom in [
            ZoomLevel::Day,
            ZoomLevel::Week,
            ZoomLevel::Month,
            ZoomLevel::Quarter,
            ZoomLevel::Year,
        ] {
            let cells = header_cells(zoom, &bounds, 1200.0);
            let covered: f32 = cells.iter().map(|c| c.width).sum();
            assert!((covered - 1200.0).abs() < 0.1, "{:?} tiles the canvas", zoom);
            let last = cells.last().unwrap();
            assert!((last.offset + last.width - 1200.0).abs() < 0.1);
        }
    }
}
