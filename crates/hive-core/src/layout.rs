//! Pixel geometry of the offset hex layout.
//!
//! Odd rows are shifted right by `ODD_ROW_SHIFT · hex_size`, which is why the
//! diagonal neighbours of an even row sit at `{col-1, col}` and those of an
//! odd row at `{col, col+1}`.

use crate::config::SimConfig;
use serde::{Deserialize, Serialize};

/// Horizontal centre spacing in units of `hex_size`.
pub const COLUMN_SPACING: f64 = 1.75;
/// Vertical centre spacing in units of `hex_size`.
pub const ROW_SPACING: f64 = 1.51;
/// Right shift of odd rows in units of `hex_size`.
pub const ODD_ROW_SHIFT: f64 = 0.87;

const COUNT_EPSILON: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HexLayout {
    pub width: f64,
    pub height: f64,
    pub hex_size: f64,
}

impl HexLayout {
    pub fn new(width: f64, height: f64, hex_size: f64) -> Self {
        Self {
            width,
            height,
            hex_size,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.world_width, config.world_height, config.hex_size)
    }

    /// Smallest layout holding `columns` cells in every row and `rows` rows.
    pub fn with_dimensions(columns: usize, rows: usize, hex_size: f64) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            width: 2.0 * hex_size
                + (columns - 1) as f64 * COLUMN_SPACING * hex_size
                + ODD_ROW_SHIFT * hex_size,
            height: 2.0 * hex_size + (rows - 1) as f64 * ROW_SPACING * hex_size,
            hex_size,
        }
    }

    pub fn row_count(&self) -> usize {
        let span = self.height - 2.0 * self.hex_size;
        if span < 0.0 || self.hex_size <= 0.0 {
            return 0;
        }
        (span / (ROW_SPACING * self.hex_size) + COUNT_EPSILON).floor() as usize + 1
    }

    pub fn columns_in_row(&self, row_index: usize) -> usize {
        let span = self.width - 2.0 * self.hex_size - self.row_shift(row_index);
        if span < 0.0 || self.hex_size <= 0.0 {
            return 0;
        }
        (span / (COLUMN_SPACING * self.hex_size) + COUNT_EPSILON).floor() as usize + 1
    }

    fn row_shift(&self, row_index: usize) -> f64 {
        if row_index % 2 == 1 {
            ODD_ROW_SHIFT * self.hex_size
        } else {
            0.0
        }
    }

    pub fn center_y(&self, row_index: usize) -> f64 {
        self.hex_size + row_index as f64 * ROW_SPACING * self.hex_size
    }

    pub fn center(&self, column: usize, row_index: usize) -> [f64; 2] {
        [
            self.hex_size + column as f64 * COLUMN_SPACING * self.hex_size + self.row_shift(row_index),
            self.center_y(row_index),
        ]
    }

    /// `(column, row_index)` of the cell whose centre is nearest to the point,
    /// if that centre lies within `hex_size`.
    pub fn locate(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let rows = self.row_count();
        if rows == 0 {
            return None;
        }
        let approx_row = ((y - self.hex_size) / (ROW_SPACING * self.hex_size)).round() as i64;
        let mut best: Option<((usize, usize), f64)> = None;
        for row in (approx_row - 1)..=(approx_row + 1) {
            if row < 0 || row as usize >= rows {
                continue;
            }
            let row = row as usize;
            let cols = self.columns_in_row(row);
            let approx_col = ((x - self.hex_size - self.row_shift(row))
                / (COLUMN_SPACING * self.hex_size))
                .round() as i64;
            for col in (approx_col - 1)..=(approx_col + 1) {
                if col < 0 || col as usize >= cols {
                    continue;
                }
                let [cx, cy] = self.center(col as usize, row);
                let d = ((cx - x).powi(2) + (cy - y).powi(2)).sqrt();
                if best.is_none_or(|(_, bd)| d < bd) {
                    best = Some(((col as usize, row), d));
                }
            }
        }
        best.filter(|&(_, d)| d <= self.hex_size).map(|(cell, _)| cell)
    }
}

/// Polygon corners of a pointy-top hex, at `60°·i + 30°`.
pub fn hex_corners(center: [f64; 2], size: f64) -> [[f64; 2]; 6] {
    let mut pts = [[0.0; 2]; 6];
    for (i, p) in pts.iter_mut().enumerate() {
        let angle = (60.0 * i as f64 + 30.0).to_radians();
        *p = [center[0] + size * angle.cos(), center[1] + size * angle.sin()];
    }
    pts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_world_dimensions() {
        let layout = HexLayout::new(1800.0, 900.0, 10.0);
        assert_eq!(layout.row_count(), 59);
        assert_eq!(layout.columns_in_row(0), 102);
        assert_eq!(layout.columns_in_row(1), 102);
    }

    #[test]
    fn with_dimensions_is_exact() {
        for (cols, rows) in [(1, 1), (5, 4), (7, 9), (30, 12)] {
            let layout = HexLayout::with_dimensions(cols, rows, 10.0);
            assert_eq!(layout.row_count(), rows);
            for r in 0..rows {
                assert_eq!(layout.columns_in_row(r), cols, "row {r} of {cols}x{rows}");
            }
        }
    }

    #[test]
    fn locate_finds_every_centre() {
        let layout = HexLayout::with_dimensions(6, 5, 10.0);
        for row in 0..5 {
            for col in 0..6 {
                let [x, y] = layout.center(col, row);
                assert_eq!(layout.locate(x, y), Some((col, row)));
                assert_eq!(layout.locate(x + 3.0, y - 2.0), Some((col, row)));
            }
        }
        assert_eq!(layout.locate(-50.0, -50.0), None);
    }

    #[test]
    fn corners_surround_centre_at_radius() {
        let pts = hex_corners([100.0, 50.0], 10.0);
        for p in pts {
            let d = ((p[0] - 100.0).powi(2) + (p[1] - 50.0).powi(2)).sqrt();
            assert!((d - 10.0).abs() < 1e-9);
        }
        assert!((pts[0][0] - (100.0 + 10.0 * 30f64.to_radians().cos())).abs() < 1e-9);
    }
}
