#![forbid(unsafe_code)]

//! Versioned layout snapshot schema.
//!
//! A [`LayoutSnapshot`] is the persisted form of one committed layout. The
//! wire shape uses camelCase field names:
//!
//! ```json
//! { "version": 1, "cols": 8, "cellWidth": 100, "gutter": 16,
//!   "items": [{ "id": "clock", "x": 0, "y": 0, "w": 2, "h": 1 }] }
//! ```
//!
//! Payloads are not persisted; callers re-attach them by id when restoring.
//!
//! # Invariants
//!
//! 1. `version` is always present and checked; a mismatch is never migrated
//!    silently.
//! 2. [`LayoutSnapshot::canonicalize`] sorts items by `(y, x, id)` so equal
//!    layouts serialize identically.
//! 3. [`LayoutSnapshot::state_hash`] is independent of item order.

use std::hash::{Hash, Hasher};

use dockgrid_core::{CellRect, Grid, GridItem, ItemId};
use rustc_hash::{FxHashSet, FxHasher};
use serde::{Deserialize, Serialize};

/// Current snapshot format version.
pub const LAYOUT_SCHEMA_VERSION: u32 = 1;

/// One persisted item: geometry only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub id: ItemId,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl SnapshotItem {
    #[must_use]
    pub const fn rect(&self) -> CellRect {
        CellRect::new(self.x, self.y, self.w, self.h)
    }
}

impl<T> From<&GridItem<T>> for SnapshotItem {
    fn from(item: &GridItem<T>) -> Self {
        Self {
            id: item.id.clone(),
            x: item.x,
            y: item.y,
            w: item.w,
            h: item.h,
        }
    }
}

/// Persisted, versioned layout for one (owner, breakpoint) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    pub version: u32,
    pub cols: u32,
    pub cell_width: u32,
    pub gutter: u32,
    pub items: Vec<SnapshotItem>,
}

impl LayoutSnapshot {
    /// Capture the geometry of a committed layout.
    #[must_use]
    pub fn capture<T>(grid: &Grid, items: &[GridItem<T>]) -> Self {
        Self {
            version: LAYOUT_SCHEMA_VERSION,
            cols: grid.cols(),
            cell_width: grid.cell_width(),
            gutter: grid.gutter(),
            items: items.iter().map(SnapshotItem::from).collect(),
        }
    }

    /// Rebuild items with a default payload.
    #[must_use]
    pub fn to_items<T: Default>(&self) -> Vec<GridItem<T>> {
        self.to_items_with(|_| T::default())
    }

    /// Rebuild items, looking up each payload by id.
    #[must_use]
    pub fn to_items_with<T>(&self, mut payload: impl FnMut(&ItemId) -> T) -> Vec<GridItem<T>> {
        self.items
            .iter()
            .map(|item| GridItem::with_payload(item.id.clone(), item.rect(), payload(&item.id)))
            .collect()
    }

    /// Structural checks. Geometry problems other than these are repaired
    /// by normalization on restore rather than rejected here.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != LAYOUT_SCHEMA_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                expected: LAYOUT_SCHEMA_VERSION,
            });
        }
        if self.cols == 0 {
            return Err(SnapshotError::ZeroColumns);
        }
        let mut seen = FxHashSet::default();
        for item in &self.items {
            if item.id.as_str().is_empty() {
                return Err(SnapshotError::EmptyItemId);
            }
            if !seen.insert(&item.id) {
                return Err(SnapshotError::DuplicateItem {
                    id: item.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Sort items by `(y, x, id)` for deterministic serialization.
    pub fn canonicalize(&mut self) {
        self.items
            .sort_by(|a, b| (a.y, a.x, &a.id).cmp(&(b.y, b.x, &b.id)));
    }

    /// Deterministic, order-insensitive hash for diagnostics.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut sorted: Vec<&SnapshotItem> = self.items.iter().collect();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        let mut hasher = FxHasher::default();
        self.version.hash(&mut hasher);
        self.cols.hash(&mut hasher);
        self.cell_width.hash(&mut hasher);
        self.gutter.hash(&mut hasher);
        sorted.len().hash(&mut hasher);
        for item in sorted {
            item.hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Structural snapshot problems.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("unsupported layout schema version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("snapshot grid has zero columns")]
    ZeroColumns,
    #[error("snapshot contains an item with an empty id")]
    EmptyItemId,
    #[error("snapshot contains item {id} more than once")]
    DuplicateItem { id: ItemId },
}

/// Result of migrating a snapshot to the current version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    pub snapshot: LayoutSnapshot,
    pub from_version: u32,
    pub to_version: u32,
    pub warnings: Vec<String>,
}

/// Migration failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    #[error("unsupported layout schema version {version} for migration")]
    UnsupportedVersion { version: u32 },
    #[error("no migration path from v{from} to v{to}")]
    NoMigrationPath { from: u32, to: u32 },
}

/// Bring a snapshot to [`LAYOUT_SCHEMA_VERSION`].
///
/// Only the current version is accepted today. Loading never calls this
/// implicitly: an explicit migration step is required for older data.
pub fn migrate_snapshot(snapshot: LayoutSnapshot) -> Result<MigrationResult, MigrationError> {
    match snapshot.version {
        LAYOUT_SCHEMA_VERSION => Ok(MigrationResult {
            from_version: LAYOUT_SCHEMA_VERSION,
            to_version: LAYOUT_SCHEMA_VERSION,
            warnings: Vec::new(),
            snapshot,
        }),
        v if v > LAYOUT_SCHEMA_VERSION => Err(MigrationError::UnsupportedVersion { version: v }),
        v => Err(MigrationError::NoMigrationPath {
            from: v,
            to: LAYOUT_SCHEMA_VERSION,
        }),
    }
}

/// Whether a snapshot is at a version other than the current one.
#[must_use]
pub fn needs_migration(snapshot: &LayoutSnapshot) -> bool {
    snapshot.version != LAYOUT_SCHEMA_VERSION
}
