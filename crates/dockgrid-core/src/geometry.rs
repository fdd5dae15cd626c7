#![forbid(unsafe_code)]

//! Geometric primitives on the discrete grid.
//!
//! The grid is column-bounded and vertically unbounded. Cells are addressed
//! by `(x, y)` with the origin at the top-left; `x` grows to the right and
//! `y` grows downward without limit.
//!
//! # Invariants
//!
//! 1. A committed [`GridItem`] satisfies `x + w <= cols`, `w >= 1`, `h >= 1`.
//! 2. Edge-touching rectangles do not overlap (`a.x + a.w == b.x` is free).
//! 3. [`layout_order`] is a total order: `(y, x)` ascending, ties broken by id.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of an item, unique within one layout.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// An axis-aligned rectangle measured in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellRect {
    /// Left column (inclusive).
    pub x: u32,
    /// Top row (inclusive).
    pub y: u32,
    /// Width in columns.
    pub w: u32,
    /// Height in rows.
    pub h: u32,
}

impl CellRect {
    /// Create a new cell rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    /// Whether the two rectangles share at least one column.
    #[inline]
    #[must_use]
    pub const fn shares_columns(&self, other: &CellRect) -> bool {
        self.x < other.right() && other.x < self.right()
    }

    /// Whether the two rectangles intersect on both axes.
    ///
    /// Touching edges do not count.
    #[inline]
    #[must_use]
    pub const fn overlaps(&self, other: &CellRect) -> bool {
        self.shares_columns(other) && self.y < other.bottom() && other.y < self.bottom()
    }

    /// Same rectangle moved to a new origin.
    #[inline]
    #[must_use]
    pub const fn at(self, x: u32, y: u32) -> Self {
        Self { x, y, ..self }
    }
}

/// The unit of placement: a uniquely identified rectangle plus an opaque
/// payload that the layout engine never inspects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridItem<T = ()> {
    pub id: ItemId,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub payload: T,
}

impl GridItem<()> {
    /// Create a geometry-only item.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w,
            h,
            payload: (),
        }
    }
}

impl<T> GridItem<T> {
    /// Create an item carrying `payload`.
    #[must_use]
    pub fn with_payload(id: impl Into<ItemId>, rect: CellRect, payload: T) -> Self {
        Self {
            id: id.into(),
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            payload,
        }
    }

    /// Replace the payload, keeping id and geometry.
    #[must_use]
    pub fn map_payload<U>(self, f: impl FnOnce(T) -> U) -> GridItem<U> {
        GridItem {
            id: self.id,
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
            payload: f(self.payload),
        }
    }

    /// The item's cell rectangle.
    #[inline]
    #[must_use]
    pub const fn rect(&self) -> CellRect {
        CellRect::new(self.x, self.y, self.w, self.h)
    }

    /// Overwrite position and size from `rect`.
    #[inline]
    pub fn set_rect(&mut self, rect: CellRect) {
        self.x = rect.x;
        self.y = rect.y;
        self.w = rect.w;
        self.h = rect.h;
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    /// Whether the item lies fully inside a grid of `cols` columns.
    #[must_use]
    pub const fn fits(&self, cols: u32) -> bool {
        self.w >= 1 && self.h >= 1 && self.right() <= cols
    }
}

/// True iff the two items' cell rectangles intersect on both axes.
#[inline]
#[must_use]
pub fn overlaps<A, B>(a: &GridItem<A>, b: &GridItem<B>) -> bool {
    a.rect().overlaps(&b.rect())
}

/// Force an item inside a grid of `cols` columns.
///
/// `w` is clamped into `[min_w, cols]`, `h` into `[min_h, ∞)`, then `x` into
/// `[0, cols - w]`. `y` is already non-negative. A zero column count or a
/// zero minimum is repaired to 1.
#[must_use]
pub fn clamp_to_grid<T>(mut item: GridItem<T>, cols: u32, min_w: u32, min_h: u32) -> GridItem<T> {
    let cols = cols.max(1);
    let min_w = min_w.clamp(1, cols);
    let min_h = min_h.max(1);

    item.w = item.w.clamp(min_w, cols);
    item.h = item.h.max(min_h);
    item.x = item.x.min(cols - item.w);
    item
}

/// Canonical layout ordering: `(y, x)` ascending, equal positions by id.
///
/// When two items share a row the one with the smaller `x` is "earlier".
#[must_use]
pub fn layout_order<A, B>(a: &GridItem<A>, b: &GridItem<B>) -> Ordering {
    (a.y, a.x)
        .cmp(&(b.y, b.x))
        .then_with(|| a.id.cmp(&b.id))
}
