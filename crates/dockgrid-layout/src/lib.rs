#![forbid(unsafe_code)]

//! Layout algorithms for DockGrid.
//!
//! Everything here is a pure function over item slices: no hidden state,
//! safe to call in any order.
//!
//! - [`collision`]: Prevent / Push / Swap resolution of a proposed move.
//! - [`compact`]: gravity compaction and `normalize_layout`.
//! - [`responsive`]: breakpoints, per-tier column counts, `remap`.
//! - [`snapshot`]: the versioned persisted layout schema.

pub mod collision;
pub mod compact;
pub mod error;
pub mod responsive;
pub mod snapshot;

pub use collision::{
    CollisionStrategy, DEFAULT_PUSH_ITERATION_CAP, Resolution, ResolveOptions, find_conflicts,
    resolve, would_collide,
};
pub use compact::{
    compact, compact_with_pinned, find_overlaps, has_overlaps, layout_height, normalize_layout,
};
pub use error::LayoutError;
pub use responsive::{Breakpoint, Breakpoints, ColumnPlan, remap};
pub use snapshot::{
    LAYOUT_SCHEMA_VERSION, LayoutSnapshot, MigrationError, MigrationResult, SnapshotError,
    SnapshotItem, migrate_snapshot, needs_migration,
};
