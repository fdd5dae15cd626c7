#![forbid(unsafe_code)]

//! Collision resolution strategies.
//!
//! [`resolve`] takes the committed layout, the id of the item being moved and
//! its proposed placement, and applies one [`CollisionStrategy`]:
//!
//! - **Prevent** rejects any overlapping placement and mutates nothing.
//! - **Push** accepts the placement, shoves conflicting items downward until
//!   nothing overlaps, then compacts with the moved item pinned.
//! - **Swap** exchanges places with a single occupant; with several
//!   occupants it behaves like Push.
//!
//! The proposal is clamped to the grid before any test. Resolution is pure:
//! the input slice is never modified.
//!
//! # Failure Modes
//!
//! | Condition | Result |
//! |---|---|
//! | Moved id not in layout | [`LayoutError::UnknownItem`] |
//! | Push exceeds its iteration cap | [`LayoutError::ResolutionFault`] |
//! | Prevent hits another item | `Ok(Resolution::Rejected { .. })` |

use std::fmt;
use std::str::FromStr;

use dockgrid_core::{CellRect, GridItem, ItemId, clamp_to_grid, layout_order};
use serde::{Deserialize, Serialize};

use crate::compact::{compact_with_pinned, has_overlaps};
use crate::error::LayoutError;

/// Default ceiling on push iterations before reporting a fault.
pub const DEFAULT_PUSH_ITERATION_CAP: usize = 10_000;

/// How a drop onto occupied cells is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionStrategy {
    /// Reject the move.
    Prevent,
    /// Displace conflicting items downward.
    #[default]
    Push,
    /// Exchange positions with the single occupant.
    Swap,
}

impl CollisionStrategy {
    pub const ALL: [CollisionStrategy; 3] = [Self::Prevent, Self::Push, Self::Swap];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prevent => "prevent",
            Self::Push => "push",
            Self::Swap => "swap",
        }
    }
}

impl fmt::Display for CollisionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollisionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown collision strategy {s:?}"))
    }
}

/// Tunables for [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Maximum pairwise push steps before [`LayoutError::ResolutionFault`].
    pub iteration_cap: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            iteration_cap: DEFAULT_PUSH_ITERATION_CAP,
        }
    }
}

/// Outcome of a successful resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// The new committed layout, in input order.
    Applied(Vec<GridItem<T>>),
    /// Prevent refused the move; `conflicts` lists the occupants hit.
    Rejected { conflicts: Vec<ItemId> },
}

impl<T> Resolution<T> {
    /// The applied layout, or `None` on rejection.
    #[must_use]
    pub fn into_applied(self) -> Option<Vec<GridItem<T>>> {
        match self {
            Self::Applied(items) => Some(items),
            Self::Rejected { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Ids of every item (other than `moving`) that `proposal` would overlap.
///
/// Results follow layout order so callers get a stable list.
#[must_use]
pub fn find_conflicts<T>(items: &[GridItem<T>], moving: &ItemId, proposal: CellRect) -> Vec<ItemId> {
    let mut hits: Vec<&GridItem<T>> = items
        .iter()
        .filter(|item| &item.id != moving && item.rect().overlaps(&proposal))
        .collect();
    hits.sort_by(|a, b| layout_order(*a, *b));
    hits.into_iter().map(|item| item.id.clone()).collect()
}

/// Non-mutating Prevent check used for drag preview feedback.
#[must_use]
pub fn would_collide<T>(items: &[GridItem<T>], moving: &ItemId, proposal: CellRect) -> bool {
    items
        .iter()
        .any(|item| &item.id != moving && item.rect().overlaps(&proposal))
}

/// Resolve a proposed placement for `moving` under `strategy`.
pub fn resolve<T: Clone>(
    items: &[GridItem<T>],
    moving: &ItemId,
    proposal: CellRect,
    cols: u32,
    strategy: CollisionStrategy,
    options: ResolveOptions,
) -> Result<Resolution<T>, LayoutError> {
    let _span = tracing::debug_span!(
        target: "dockgrid.resolve",
        "layout.resolve",
        strategy = strategy.as_str(),
        items = items.len(),
        moving = %moving,
    )
    .entered();

    let Some(index) = items.iter().position(|item| &item.id == moving) else {
        tracing::debug!(target: "dockgrid.resolve", id = %moving, "moved item not in layout");
        return Err(LayoutError::UnknownItem { id: moving.clone() });
    };

    let previous = items[index].rect();
    let mut next: Vec<GridItem<T>> = items.to_vec();
    next[index].set_rect(proposal);
    next[index] = clamp_to_grid(next[index].clone(), cols, 1, 1);
    let target = next[index].rect();
    let conflicts = find_conflicts(items, moving, target);

    let resolution = match strategy {
        CollisionStrategy::Prevent => {
            if conflicts.is_empty() {
                Resolution::Applied(next)
            } else {
                tracing::debug!(
                    target: "dockgrid.resolve",
                    conflicts = conflicts.len(),
                    "placement rejected"
                );
                Resolution::Rejected { conflicts }
            }
        }
        CollisionStrategy::Push => Resolution::Applied(push(next, index, cols, options)?),
        CollisionStrategy::Swap => match conflicts.as_slice() {
            [] => Resolution::Applied(next),
            [occupant] => {
                swap_into(&mut next, occupant, previous, cols);
                if has_overlaps(&next) {
                    tracing::debug!(
                        target: "dockgrid.resolve",
                        occupant = %occupant,
                        "swapped item does not fit vacated slot; pushing"
                    );
                    Resolution::Applied(push(next, index, cols, options)?)
                } else {
                    Resolution::Applied(next)
                }
            }
            _ => Resolution::Applied(push(next, index, cols, options)?),
        },
    };

    tracing::debug!(
        target: "dockgrid.resolve",
        outcome = if resolution.is_rejected() { "rejected" } else { "applied" },
        "resolution finished"
    );
    Ok(resolution)
}

/// Move `occupant` to the vacated origin of the dragged item.
fn swap_into<T: Clone>(items: &mut [GridItem<T>], occupant: &ItemId, vacated: CellRect, cols: u32) {
    if let Some(other) = items.iter_mut().find(|item| &item.id == occupant) {
        other.x = vacated.x;
        other.y = vacated.y;
        *other = clamp_to_grid(other.clone(), cols, 1, 1);
    }
}

/// Push conflicting items down with `items[fixed]` held in place.
fn push<T: Clone>(
    mut items: Vec<GridItem<T>>,
    fixed: usize,
    cols: u32,
    options: ResolveOptions,
) -> Result<Vec<GridItem<T>>, LayoutError> {
    for (i, item) in items.iter_mut().enumerate() {
        if i != fixed {
            *item = clamp_to_grid(item.clone(), cols, 1, 1);
        }
    }

    let mut iterations = 0usize;
    while let Some((victim, blocker)) = first_overlap(&items, fixed) {
        iterations += 1;
        if iterations > options.iteration_cap {
            tracing::warn!(
                target: "dockgrid.resolve",
                iterations,
                cap = options.iteration_cap,
                "push resolution did not settle"
            );
            return Err(LayoutError::ResolutionFault {
                iterations,
                cap: options.iteration_cap,
            });
        }
        items[victim].y = items[blocker].bottom();
    }

    tracing::trace!(target: "dockgrid.resolve", iterations, "push settled");
    let pinned = [items[fixed].id.clone()];
    Ok(compact_with_pinned(&items, cols, &pinned))
}

/// First overlapping pair in layout order as `(victim, blocker)` indices.
///
/// The fixed item is never the victim; otherwise the later item in layout
/// order (greater `y`, then greater `x`) is pushed.
fn first_overlap<T>(items: &[GridItem<T>], fixed: usize) -> Option<(usize, usize)> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| layout_order(&items[a], &items[b]));

    for (pos, &a) in order.iter().enumerate() {
        for &b in &order[pos + 1..] {
            if items[a].rect().overlaps(&items[b].rect()) {
                return Some(if b == fixed { (a, b) } else { (b, a) });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact::has_overlaps;

    fn id(raw: &str) -> ItemId {
        ItemId::new(raw)
    }

    fn at<'a>(items: &'a [GridItem], raw: &str) -> &'a GridItem {
        items.iter().find(|i| i.id.as_str() == raw).unwrap()
    }

    fn run(
        items: &[GridItem],
        moving: &str,
        proposal: CellRect,
        cols: u32,
        strategy: CollisionStrategy,
    ) -> Resolution<()> {
        resolve(items, &id(moving), proposal, cols, strategy, ResolveOptions::default()).unwrap()
    }

    fn pair() -> Vec<GridItem> {
        vec![GridItem::new("a", 0, 0, 2, 2), GridItem::new("b", 2, 0, 2, 2)]
    }

    // ---- Strategy parsing ----

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("SWAP".parse::<CollisionStrategy>(), Ok(CollisionStrategy::Swap));
        assert!("shove".parse::<CollisionStrategy>().is_err());
        assert_eq!(CollisionStrategy::default(), CollisionStrategy::Push);
    }

    // ---- Prevent ----

    #[test]
    fn prevent_rejects_overlapping_move() {
        let items = pair();
        let out = run(&items, "a", CellRect::new(1, 0, 2, 2), 4, CollisionStrategy::Prevent);
        assert_eq!(out, Resolution::Rejected { conflicts: vec![id("b")] });
        assert_eq!(items, pair());
    }

    #[test]
    fn prevent_applies_free_move() {
        let out = run(&pair(), "a", CellRect::new(0, 2, 2, 2), 4, CollisionStrategy::Prevent)
            .into_applied()
            .unwrap();
        assert_eq!(at(&out, "a").rect(), CellRect::new(0, 2, 2, 2));
        assert_eq!(at(&out, "b").rect(), CellRect::new(2, 0, 2, 2));
    }

    #[test]
    fn prevent_clamps_proposal_into_grid() {
        let out = run(&pair(), "b", CellRect::new(9, 4, 2, 2), 4, CollisionStrategy::Prevent)
            .into_applied()
            .unwrap();
        assert_eq!(at(&out, "b").rect(), CellRect::new(2, 4, 2, 2));
    }

    // ---- Push ----

    #[test]
    fn push_separates_identical_items() {
        let items = vec![GridItem::new("a", 0, 0, 2, 2), GridItem::new("b", 0, 0, 2, 2)];
        let out = run(&items, "a", CellRect::new(0, 0, 2, 2), 4, CollisionStrategy::Push)
            .into_applied()
            .unwrap();
        assert_eq!(out.len(), 2);
        assert!(!has_overlaps(&out));
        assert!(out.iter().all(|i| i.fits(4)));
        assert_eq!(at(&out, "a").rect(), CellRect::new(0, 0, 2, 2));
        assert_eq!(at(&out, "b").y, 2);
    }

    #[test]
    fn push_displaces_item_above_drop_target() {
        // Dropping "a" on row 1 overlaps "b" which starts higher; "b" still moves.
        let items = vec![GridItem::new("a", 3, 0, 1, 2), GridItem::new("b", 0, 0, 2, 2)];
        let out = run(&items, "a", CellRect::new(0, 1, 1, 2), 4, CollisionStrategy::Push)
            .into_applied()
            .unwrap();
        assert_eq!(at(&out, "a").rect(), CellRect::new(0, 1, 1, 2));
        assert_eq!(at(&out, "b").y, 3);
        assert!(!has_overlaps(&out));
    }

    #[test]
    fn push_cascades_down_a_column() {
        let items = vec![
            GridItem::new("m", 1, 5, 1, 1),
            GridItem::new("a", 0, 0, 1, 1),
            GridItem::new("b", 0, 1, 1, 1),
            GridItem::new("c", 0, 2, 1, 1),
        ];
        let out = run(&items, "m", CellRect::new(0, 0, 1, 1), 4, CollisionStrategy::Push)
            .into_applied()
            .unwrap();
        let ys: Vec<u32> = ["m", "a", "b", "c"].iter().map(|r| at(&out, r).y).collect();
        assert_eq!(ys, [0, 1, 2, 3]);
    }

    #[test]
    fn push_reports_fault_when_cap_exhausted() {
        let items = vec![
            GridItem::new("m", 1, 5, 1, 1),
            GridItem::new("a", 0, 0, 1, 1),
            GridItem::new("b", 0, 1, 1, 1),
            GridItem::new("c", 0, 2, 1, 1),
        ];
        let err = resolve(
            &items,
            &id("m"),
            CellRect::new(0, 0, 1, 1),
            4,
            CollisionStrategy::Push,
            ResolveOptions { iteration_cap: 2 },
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::ResolutionFault { iterations: 3, cap: 2 });
    }

    #[test]
    fn push_keeps_dropped_item_pinned_after_compaction() {
        let items = vec![GridItem::new("a", 0, 0, 1, 1), GridItem::new("b", 1, 0, 1, 1)];
        let out = run(&items, "a", CellRect::new(0, 4, 1, 1), 8, CollisionStrategy::Push)
            .into_applied()
            .unwrap();
        assert_eq!(at(&out, "a").rect(), CellRect::new(0, 4, 1, 1));
    }

    #[test]
    fn push_scenario_release_on_occupied_cell() {
        let items = vec![
            GridItem::new("A", 0, 0, 1, 1),
            GridItem::new("B", 1, 0, 1, 1),
            GridItem::new("C", 0, 1, 1, 1),
        ];
        let out = run(&items, "A", CellRect::new(0, 1, 1, 1), 8, CollisionStrategy::Push)
            .into_applied()
            .unwrap();
        assert_eq!(at(&out, "A").rect(), CellRect::new(0, 1, 1, 1));
        assert_eq!(at(&out, "C").rect(), CellRect::new(0, 2, 1, 1));
        assert_eq!(at(&out, "B").rect(), CellRect::new(1, 0, 1, 1));
    }

    // ---- Swap ----

    #[test]
    fn swap_exchanges_with_single_occupant() {
        let items = pair();
        let out = run(&items, "a", CellRect::new(2, 0, 2, 2), 4, CollisionStrategy::Swap)
            .into_applied()
            .unwrap();
        assert_eq!(at(&out, "a").rect(), CellRect::new(2, 0, 2, 2));
        assert_eq!(at(&out, "b").rect(), CellRect::new(0, 0, 2, 2));
    }

    #[test]
    fn swap_into_free_space_is_a_plain_move() {
        let out = run(&pair(), "b", CellRect::new(0, 3, 2, 1), 4, CollisionStrategy::Swap)
            .into_applied()
            .unwrap();
        assert_eq!(at(&out, "b").rect(), CellRect::new(0, 3, 2, 1));
        assert_eq!(at(&out, "a").rect(), CellRect::new(0, 0, 2, 2));
    }

    #[test]
    fn swap_with_oversized_occupant_falls_back_to_push() {
        let items = vec![
            GridItem::new("small", 0, 0, 1, 1),
            GridItem::new("big", 2, 0, 2, 3),
            GridItem::new("n", 1, 0, 1, 1),
        ];
        let out = run(&items, "small", CellRect::new(2, 0, 1, 1), 4, CollisionStrategy::Swap)
            .into_applied()
            .unwrap();
        assert!(!has_overlaps(&out));
        assert_eq!(at(&out, "small").rect(), CellRect::new(2, 0, 1, 1));
    }

    #[test]
    fn swap_with_many_occupants_behaves_like_push() {
        let items = vec![
            GridItem::new("wide", 0, 3, 4, 1),
            GridItem::new("a", 0, 0, 1, 1),
            GridItem::new("b", 2, 0, 1, 1),
        ];
        let proposal = CellRect::new(0, 0, 4, 1);
        let swapped = run(&items, "wide", proposal, 4, CollisionStrategy::Swap);
        let pushed = run(&items, "wide", proposal, 4, CollisionStrategy::Push);
        assert_eq!(swapped, pushed);
    }

    // ---- Shared ----

    #[test]
    fn unknown_item_is_an_error() {
        let err = resolve(
            &pair(),
            &id("ghost"),
            CellRect::new(0, 0, 1, 1),
            4,
            CollisionStrategy::Push,
            ResolveOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::UnknownItem { .. }));
    }

    #[test]
    fn would_collide_ignores_moving_item() {
        let items = pair();
        assert!(!would_collide(&items, &id("a"), CellRect::new(0, 0, 2, 2)));
        assert!(would_collide(&items, &id("a"), CellRect::new(1, 1, 2, 2)));
    }

    #[test]
    fn find_conflicts_is_in_layout_order() {
        let items = vec![
            GridItem::new("m", 0, 5, 1, 1),
            GridItem::new("z", 0, 0, 1, 1),
            GridItem::new("y", 1, 0, 1, 1),
            GridItem::new("x", 0, 1, 1, 1),
        ];
        let hits = find_conflicts(&items, &id("m"), CellRect::new(0, 0, 2, 2));
        assert_eq!(hits, vec![id("z"), id("y"), id("x")]);
    }

    #[test]
    fn payload_survives_resolution() {
        let items = vec![
            GridItem::with_payload("a", CellRect::new(0, 0, 1, 1), "clock"),
            GridItem::with_payload("b", CellRect::new(0, 1, 1, 1), "notes"),
        ];
        let out = resolve(
            &items,
            &id("a"),
            CellRect::new(0, 1, 1, 1),
            4,
            CollisionStrategy::Push,
            ResolveOptions::default(),
        )
        .unwrap()
        .into_applied()
        .unwrap();
        assert_eq!(out[0].payload, "clock");
        assert_eq!(out[1].payload, "notes");
    }
}
