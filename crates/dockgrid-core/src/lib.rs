#![forbid(unsafe_code)]

//! Core primitives for DockGrid.
//!
//! - [`geometry`]: grid items, cell rectangles, overlap and clamping.
//! - [`grid`]: grid configuration and pixel/cell coordinate mapping.
//! - [`pointer`]: pointer positions and pointer-move coalescing.

pub mod geometry;
pub mod grid;
pub mod pointer;

pub use geometry::{CellRect, GridItem, ItemId, clamp_to_grid, layout_order, overlaps};
pub use grid::{
    DEFAULT_CELL_HEIGHT, DEFAULT_CELL_WIDTH, DEFAULT_COLS, DEFAULT_GUTTER, Grid, GridError,
    column_bottom, grid_to_pixel, pixel_to_grid, snap_to_neighbor,
};
pub use pointer::{PointerCoalescer, PointerPosition};
