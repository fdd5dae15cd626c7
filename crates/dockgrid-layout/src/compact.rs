#![forbid(unsafe_code)]

//! Gravity compaction and layout normalization.
//!
//! Items are settled one at a time in [`layout_order`]. Each item is first
//! moved below anything already settled that it overlaps, then takes the
//! lowest row at or above its current one where it overlaps nothing already
//! settled. An item may rise past a settled neighbour into a gap above it.
//! Pinned items are the exception: nothing that starts below a pinned item
//! in shared columns rises above it.
//!
//! # Invariants
//!
//! 1. Output has the same ids, in the same order, as the input.
//! 2. Output has no overlapping pair and every item fits the grid.
//! 3. `compact(compact(items)) == compact(items)`.
//! 4. Pinned items keep their position; others settle around them.

use dockgrid_core::{CellRect, GridItem, ItemId, clamp_to_grid, layout_order};
use rustc_hash::FxHashSet;

/// Remove vertical gaps from a layout.
///
/// Every item is clamped to `cols` first, so the result also satisfies the
/// bounds invariant.
#[must_use]
pub fn compact<T: Clone>(items: &[GridItem<T>], cols: u32) -> Vec<GridItem<T>> {
    compact_with_pinned(items, cols, &[])
}

/// Compact while holding `pinned` items fixed.
///
/// Push resolution pins the dragged item so gravity never undoes a drop.
#[must_use]
pub fn compact_with_pinned<T: Clone>(
    items: &[GridItem<T>],
    cols: u32,
    pinned: &[ItemId],
) -> Vec<GridItem<T>> {
    let _span = tracing::trace_span!(
        target: "dockgrid.compact",
        "layout.compact",
        items = items.len(),
        pinned = pinned.len()
    )
    .entered();

    let mut out: Vec<GridItem<T>> = items
        .iter()
        .cloned()
        .map(|item| clamp_to_grid(item, cols, 1, 1))
        .collect();

    let mut order: Vec<usize> = (0..out.len()).collect();
    order.sort_by(|&a, &b| layout_order(&out[a], &out[b]));

    let pinned_rects: Vec<CellRect> = order
        .iter()
        .filter(|&&idx| pinned.contains(&out[idx].id))
        .map(|&idx| out[idx].rect())
        .collect();
    let mut placed = pinned_rects.clone();
    placed.reserve(out.len());

    let mut moved = 0usize;
    for &idx in &order {
        if pinned.contains(&out[idx].id) {
            continue;
        }
        let before = out[idx].rect();
        let settled = settle(before, &placed, &pinned_rects);
        if settled != before {
            moved += 1;
        }
        out[idx].set_rect(settled);
        placed.push(settled);
    }

    tracing::trace!(target: "dockgrid.compact", moved, "compaction finished");
    out
}

/// De-duplicate by id, clamp every item, then compact.
///
/// This is the repair entry point for externally supplied or persisted
/// layouts: it never rejects input. The first occurrence of a duplicated id
/// wins.
#[must_use]
pub fn normalize_layout<T: Clone>(items: &[GridItem<T>], cols: u32) -> Vec<GridItem<T>> {
    let mut seen: FxHashSet<&ItemId> = FxHashSet::default();
    let unique: Vec<GridItem<T>> = items
        .iter()
        .filter(|item| seen.insert(&item.id))
        .cloned()
        .collect();

    let dropped = items.len() - unique.len();
    if dropped > 0 {
        tracing::debug!(
            target: "dockgrid.compact",
            dropped,
            kept = unique.len(),
            "dropped duplicate item ids during normalization"
        );
    }

    compact(&unique, cols)
}

/// Every overlapping pair, in layout order.
#[must_use]
pub fn find_overlaps<T>(items: &[GridItem<T>]) -> Vec<(ItemId, ItemId)> {
    let mut order: Vec<&GridItem<T>> = items.iter().collect();
    order.sort_by(|a, b| layout_order(*a, *b));

    let mut pairs = Vec::new();
    for (i, a) in order.iter().enumerate() {
        for b in &order[i + 1..] {
            if a.rect().overlaps(&b.rect()) {
                pairs.push((a.id.clone(), b.id.clone()));
            }
        }
    }
    pairs
}

/// Whether any two items overlap.
#[must_use]
pub fn has_overlaps<T>(items: &[GridItem<T>]) -> bool {
    items.iter().enumerate().any(|(i, a)| {
        items[i + 1..]
            .iter()
            .any(|b| a.rect().overlaps(&b.rect()))
    })
}

/// Number of occupied rows (bottom edge of the lowest item).
#[must_use]
pub fn layout_height<T>(items: &[GridItem<T>]) -> u32 {
    items.iter().map(GridItem::bottom).max().unwrap_or(0)
}

fn settle(mut rect: CellRect, placed: &[CellRect], pinned: &[CellRect]) -> CellRect {
    while let Some(collider) = placed.iter().find(|p| p.overlaps(&rect)) {
        rect.y = collider.bottom();
    }

    let floor = pinned
        .iter()
        .filter(|p| p.shares_columns(&rect) && p.bottom() <= rect.y)
        .map(CellRect::bottom)
        .max()
        .unwrap_or(0);
    let free = |y: u32| !placed.iter().any(|p| p.overlaps(&rect.at(rect.x, y)));
    if let Some(y) = (floor..rect.y).find(|&y| free(y)) {
        rect.y = y;
    }
    rect
}
