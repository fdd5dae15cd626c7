#![forbid(unsafe_code)]

//! Layout operation errors.

use dockgrid_core::ItemId;

/// Failures surfaced by collision resolution.
///
/// Geometry, compaction, and remapping are total over well-formed input
/// and never produce these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The item being moved is not part of the layout.
    #[error("item {id} is not part of the layout")]
    UnknownItem { id: ItemId },
    /// Push resolution hit its iteration cap before the layout settled.
    #[error("push resolution did not settle after {iterations} iterations (cap {cap})")]
    ResolutionFault { iterations: usize, cap: usize },
}
