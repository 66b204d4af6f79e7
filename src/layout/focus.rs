use super::geometry::BarShape;

/// Row pitch used for vertical centering, matching the render surface's
/// default row height.
pub const ROW_HEIGHT: f32 = 32.0;

/// Bars wider than this fraction of the viewport are anchored at their
/// start edge instead of centered.
const WIDE_BAR_FRACTION: f32 = 0.8;

/// Margin left of a wide bar's start edge so the edge is not flush with
/// the viewport border.
const WIDE_BAR_LEAD_FRACTION: f32 = 0.1;

/// Dimensions of the scrollable chart viewport, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Scroll offsets that bring a task into view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTarget {
    pub scroll_left: f32,
    pub scroll_top: f32,
}

/// Compute the scroll offsets that center a task's bar horizontally and
/// its row vertically, clamped to >= 0.
///
/// Wide bars (over 80% of the viewport width) bias toward showing the
/// bar's start rather than its center. Pure coordinate math; highlighting
/// or animation is the render surface's concern.
pub fn focus_target(
    shape: &BarShape,
    row_index: usize,
    viewport: &Viewport,
    row_height: f32,
) -> ScrollTarget {
    let left_edge = shape.left_edge();
    let extent = shape.extent();

    let scroll_left = if extent > viewport.width * WIDE_BAR_FRACTION {
        left_edge - viewport.width * WIDE_BAR_LEAD_FRACTION
    } else {
        left_edge + extent / 2.0 - viewport.width / 2.0
    };

    let row_center = row_index as f32 * row_height + row_height / 2.0;
    let scroll_top = row_center - viewport.height / 2.0;

    ScrollTarget {
        scroll_left: scroll_left.max(0.0),
        scroll_top: scroll_top.max(0.0),
    }
}
