#![forbid(unsafe_code)]

//! DockGrid public facade crate.
//!
//! Re-exports the types most hosts need from the internal crates and offers
//! a prelude plus a single [`Error`] covering every fallible operation.
//!
//! ```ignore
//! use dockgrid::prelude::*;
//!
//! let grid = Grid::new(8, 100, 100, 16)?;
//! let mut engine = LayoutEngine::new(grid, vec![GridItem::new("clock", 0, 0, 2, 2)])
//!     .with_edit_mode(true);
//! engine.on_pointer_down("clock", PointerPosition::new(10.0, 10.0))?;
//! engine.on_pointer_up(PointerPosition::new(350.0, 10.0))?;
//! ```

// --- Core re-exports -------------------------------------------------------

pub use dockgrid_core::{
    CellRect, Grid, GridError, GridItem, ItemId, PointerCoalescer, PointerPosition,
    clamp_to_grid, column_bottom, grid_to_pixel, layout_order, overlaps, pixel_to_grid,
    snap_to_neighbor,
};

// --- Layout re-exports -----------------------------------------------------

pub use dockgrid_layout::{
    Breakpoint, Breakpoints, CollisionStrategy, ColumnPlan, LayoutError, LayoutSnapshot,
    MigrationError, Resolution, ResolveOptions, SnapshotError, compact, find_conflicts,
    find_overlaps, normalize_layout, remap, resolve, would_collide,
};

// --- Runtime re-exports ----------------------------------------------------

pub use dockgrid_runtime::{
    CancelReason, ConfigError, DragEffect, DragMachineError, DragPhase, DragTransition,
    EngineConfig, FileStorage, LayoutEngine, LayoutEvent, LayoutStore, ListenerId, MemoryStorage,
    StorageBackend, StorageError, StorageKey,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for DockGrid hosts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error(transparent)]
    Drag(#[from] DragMachineError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Standard result type for DockGrid APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Breakpoint, CellRect, CollisionStrategy, EngineConfig, Error, FileStorage, Grid, GridItem,
        ItemId, LayoutEngine, LayoutEvent, LayoutSnapshot, LayoutStore, MemoryStorage,
        PointerPosition, Result,
    };

    pub use crate::{core, layout, runtime};
}

pub use dockgrid_core as core;
pub use dockgrid_layout as layout;
pub use dockgrid_runtime as runtime;
