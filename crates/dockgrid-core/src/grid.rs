#![forbid(unsafe_code)]

//! Grid configuration and the pixel/cell coordinate mapper.
//!
//! Pointer input arrives in continuous pixel space; layout happens in
//! discrete cell space. One cell step along an axis covers the cell size
//! plus the gutter, so the pitch is `cell + gutter`.
//!
//! # Invariants
//!
//! 1. `pixel_to_grid(grid_to_pixel(x, y)) == (x, y)` for every cell.
//! 2. Mapped coordinates are never negative; non-finite input maps to 0.
//! 3. A [`Grid`] always has `cols >= 1` and non-zero cell dimensions.

use std::ops::Range;

use crate::geometry::{GridItem, ItemId};
use crate::pointer::PointerPosition;

/// Default column count.
pub const DEFAULT_COLS: u32 = 8;

/// Default cell width in pixels.
pub const DEFAULT_CELL_WIDTH: u32 = 100;

/// Default cell height in pixels.
pub const DEFAULT_CELL_HEIGHT: u32 = 100;

/// Default gutter between cells in pixels.
pub const DEFAULT_GUTTER: u32 = 16;

/// Layout context: column count, cell pixel size, and gutter.
///
/// Rows are not configured; they emerge from the tallest placed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grid {
    cols: u32,
    cell_width: u32,
    cell_height: u32,
    gutter: u32,
}

impl Grid {
    /// Construct a validated grid.
    pub fn new(cols: u32, cell_width: u32, cell_height: u32, gutter: u32) -> Result<Self, GridError> {
        if cols == 0 {
            return Err(GridError::ZeroColumns);
        }
        if cell_width == 0 || cell_height == 0 {
            return Err(GridError::InvalidCellSize {
                width: cell_width,
                height: cell_height,
            });
        }
        Ok(Self {
            cols,
            cell_width,
            cell_height,
            gutter,
        })
    }

    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    #[must_use]
    pub const fn cell_width(&self) -> u32 {
        self.cell_width
    }

    #[must_use]
    pub const fn cell_height(&self) -> u32 {
        self.cell_height
    }

    #[must_use]
    pub const fn gutter(&self) -> u32 {
        self.gutter
    }

    /// Same cell geometry with a different column count.
    pub fn with_cols(self, cols: u32) -> Result<Self, GridError> {
        Self::new(cols, self.cell_width, self.cell_height, self.gutter)
    }

    /// Map a pixel position to the nearest cell.
    #[must_use]
    pub fn pixel_to_cell(&self, position: PointerPosition) -> (u32, u32) {
        pixel_to_grid(
            position.x,
            position.y,
            self.cell_width,
            self.cell_height,
            self.gutter,
        )
    }

    /// Top-left pixel of a cell.
    #[must_use]
    pub fn cell_to_pixel(&self, x: u32, y: u32) -> PointerPosition {
        let (px, py) = grid_to_pixel(x, y, self.cell_width, self.cell_height, self.gutter);
        PointerPosition::new(px, py)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            cell_width: DEFAULT_CELL_WIDTH,
            cell_height: DEFAULT_CELL_HEIGHT,
            gutter: DEFAULT_GUTTER,
        }
    }
}

/// Grid configuration failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid must have at least one column")]
    ZeroColumns,
    #[error("invalid cell dimensions width={width} height={height} (must be > 0)")]
    InvalidCellSize { width: u32, height: u32 },
}

/// Round a pixel coordinate to the nearest cell.
///
/// Uses `round(coord / (cell + gutter))` per axis and clamps at zero.
#[must_use]
pub fn pixel_to_grid(px: f64, py: f64, cell_w: u32, cell_h: u32, gutter: u32) -> (u32, u32) {
    (
        axis_to_cell(px, cell_w, gutter),
        axis_to_cell(py, cell_h, gutter),
    )
}

/// Top-left pixel of cell `(x, y)`: `x * (cell_w + gutter)`, same for `y`.
#[must_use]
pub fn grid_to_pixel(x: u32, y: u32, cell_w: u32, cell_h: u32, gutter: u32) -> (f64, f64) {
    (
        f64::from(x) * pitch(cell_w, gutter),
        f64::from(y) * pitch(cell_h, gutter),
    )
}

/// Magnet rule: dock flush beneath the column's last item when close.
///
/// Returns `column_bottom_y` when `|column_bottom_y - candidate_y| <=
/// threshold_rows`, otherwise `candidate_y` unchanged.
#[must_use]
pub fn snap_to_neighbor(candidate_y: u32, column_bottom_y: u32, threshold_rows: u32) -> u32 {
    if candidate_y.abs_diff(column_bottom_y) <= threshold_rows {
        column_bottom_y
    } else {
        candidate_y
    }
}

/// Bottom edge of the lowest item occupying any of `columns`.
///
/// `exclude` skips one item (the one being dragged). Empty columns yield 0.
#[must_use]
pub fn column_bottom<T>(items: &[GridItem<T>], columns: Range<u32>, exclude: Option<&ItemId>) -> u32 {
    items
        .iter()
        .filter(|item| exclude != Some(&item.id))
        .filter(|item| item.x < columns.end && columns.start < item.right())
        .map(GridItem::bottom)
        .max()
        .unwrap_or(0)
}

fn pitch(cell: u32, gutter: u32) -> f64 {
    f64::from(cell) + f64::from(gutter)
}

fn axis_to_cell(coordinate: f64, cell: u32, gutter: u32) -> u32 {
    let pitch = pitch(cell, gutter);
    if pitch <= 0.0 || !coordinate.is_finite() {
        return 0;
    }
    let cells = (coordinate / pitch).round();
    if cells <= 0.0 {
        0
    } else if cells >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        cells as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Construction ----

    #[test]
    fn new_rejects_zero_columns() {
        assert_eq!(Grid::new(0, 10, 10, 0), Err(GridError::ZeroColumns));
    }

    #[test]
    fn new_rejects_zero_cell_size() {
        let err = Grid::new(4, 0, 10, 0).unwrap_err();
        assert!(matches!(err, GridError::InvalidCellSize { width: 0, .. }));
    }

    #[test]
    fn zero_gutter_is_allowed() {
        assert!(Grid::new(4, 10, 10, 0).is_ok());
    }

    #[test]
    fn default_grid_has_eight_columns() {
        let grid = Grid::default();
        assert_eq!(grid.cols(), 8);
        assert_eq!(grid.gutter(), DEFAULT_GUTTER);
    }

    #[test]
    fn with_cols_keeps_cell_geometry() {
        let grid = Grid::new(8, 50, 40, 4).unwrap().with_cols(4).unwrap();
        assert_eq!(
            (grid.cols(), grid.cell_width(), grid.cell_height(), grid.gutter()),
            (4, 50, 40, 4)
        );
    }

    // ---- Mapping ----

    #[test]
    fn pixel_to_grid_rounds_to_nearest_cell() {
        // pitch = 110
        assert_eq!(pixel_to_grid(0.0, 0.0, 100, 100, 10), (0, 0));
        assert_eq!(pixel_to_grid(54.0, 54.0, 100, 100, 10), (0, 0));
        assert_eq!(pixel_to_grid(56.0, 166.0, 100, 100, 10), (1, 2));
        assert_eq!(pixel_to_grid(330.0, 220.0, 100, 100, 10), (3, 2));
    }

    #[test]
    fn pixel_to_grid_clamps_negative_input() {
        assert_eq!(pixel_to_grid(-500.0, -1.0, 100, 100, 10), (0, 0));
    }

    #[test]
    fn pixel_to_grid_handles_non_finite_input() {
        assert_eq!(pixel_to_grid(f64::NAN, f64::INFINITY, 10, 10, 0), (0, 0));
    }

    #[test]
    fn grid_to_pixel_is_top_left_of_cell() {
        assert_eq!(grid_to_pixel(3, 2, 100, 80, 10), (330.0, 180.0));
    }

    #[test]
    fn cell_round_trip_is_identity() {
        let grid = Grid::new(8, 100, 60, 12).unwrap();
        for x in 0..8 {
            for y in 0..20 {
                let px = grid.cell_to_pixel(x, y);
                assert_eq!(grid.pixel_to_cell(px), (x, y));
            }
        }
    }

    // ---- Snapping ----

    #[test]
    fn snap_within_threshold_docks_to_bottom() {
        assert_eq!(snap_to_neighbor(4, 3, 1), 3);
        assert_eq!(snap_to_neighbor(2, 3, 1), 3);
    }

    #[test]
    fn snap_outside_threshold_keeps_candidate() {
        assert_eq!(snap_to_neighbor(6, 3, 1), 6);
        assert_eq!(snap_to_neighbor(0, 3, 2), 0);
    }

    #[test]
    fn zero_threshold_snaps_only_on_exact_match() {
        assert_eq!(snap_to_neighbor(3, 3, 0), 3);
        assert_eq!(snap_to_neighbor(4, 3, 0), 4);
    }

    #[test]
    fn column_bottom_considers_spanned_columns_only() {
        let items = vec![
            GridItem::new("a", 0, 0, 1, 2),
            GridItem::new("b", 1, 0, 2, 5),
            GridItem::new("c", 4, 0, 1, 9),
        ];
        assert_eq!(column_bottom(&items, 0..1, None), 2);
        assert_eq!(column_bottom(&items, 0..2, None), 5);
        assert_eq!(column_bottom(&items, 3..4, None), 0);
    }

    #[test]
    fn column_bottom_skips_excluded_item() {
        let items = vec![GridItem::new("a", 0, 0, 1, 2), GridItem::new("b", 0, 2, 1, 3)];
        let b = ItemId::new("b");
        assert_eq!(column_bottom(&items, 0..1, Some(&b)), 2);
    }
}
