use serde::{Deserialize, Serialize};

use crate::layout::Bar;

/// Horizontal gap left on each side of a drawn bar.
const BAR_INSET: f32 = 2.0;
/// Bars never shrink below this width, so single-day tasks stay clickable.
const MIN_BAR_WIDTH: f32 = 10.0;

/// Pixel rectangle of a bar along the time axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub left: f32,
    pub width: f32,
}

/// Maps day units from the layout engine to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellGeometry {
    /// Pixels per day cell.
    pub cell_width: f32,
    /// Pixels per task row; matches the list view so rows line up.
    pub row_height: f32,
}

impl Default for CellGeometry {
    fn default() -> Self {
        Self {
            cell_width: 48.0,
            row_height: 58.0,
        }
    }
}

impl CellGeometry {
    /// Convert a day offset from the window start to an x-pixel offset.
    pub fn day_to_x(&self, offset_days: i64) -> f32 {
        offset_days as f32 * self.cell_width
    }

    /// Raw geometry: `left = offset × cell`, `width = duration × cell`.
    pub fn bar_rect(&self, bar: &Bar) -> BarRect {
        BarRect {
            left: self.day_to_x(bar.offset_days),
            width: bar.duration_days as f32 * self.cell_width,
        }
    }

    /// Geometry as painted: inset on both sides, with a minimum width.
    pub fn drawn_bar_rect(&self, bar: &Bar) -> BarRect {
        let raw = self.bar_rect(bar);
        BarRect {
            left: raw.left + BAR_INSET,
            width: (raw.width - 2.0 * BAR_INSET).max(MIN_BAR_WIDTH),
        }
    }

    /// The today marker sits in the middle of its day cell.
    pub fn today_marker_x(&self, today_offset: usize) -> f32 {
        today_offset as f32 * self.cell_width + self.cell_width / 2.0
    }

    /// Width of a header segment spanning `day_count` days.
    pub fn span_width(&self, day_count: usize) -> f32 {
        day_count as f32 * self.cell_width
    }

    /// Top edge of the given row.
    pub fn row_top(&self, row: usize) -> f32 {
        row as f32 * self.row_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_rect_scales_by_cell_width() {
        let geometry = CellGeometry::default();
        let bar = Bar {
            offset_days: 5,
            duration_days: 11,
        };
        assert_eq!(
            geometry.bar_rect(&bar),
            BarRect {
                left: 240.0,
                width: 528.0
            }
        );
        assert_eq!(
            geometry.drawn_bar_rect(&bar),
            BarRect {
                left: 242.0,
                width: 524.0
            }
        );
    }

    #[test]
    fn narrow_bars_keep_minimum_width() {
        let geometry = CellGeometry {
            cell_width: 4.0,
            row_height: 20.0,
        };
        let bar = Bar {
            offset_days: 0,
            duration_days: 1,
        };
        assert_eq!(geometry.drawn_bar_rect(&bar).width, MIN_BAR_WIDTH);
    }

    #[test]
    fn today_marker_is_centred() {
        let geometry = CellGeometry::default();
        assert_eq!(geometry.today_marker_x(3), 3.0 * 48.0 + 24.0);
        assert_eq!(geometry.span_width(31), 31.0 * 48.0);
        assert_eq!(geometry.row_top(2), 116.0);
    }
}
