#![forbid(unsafe_code)]

//! Responsive tiers and column remapping.
//!
//! A layout is persisted per [`Breakpoint`]. When the viewport crosses a
//! tier boundary the committed layout is rescaled with [`remap`] to the new
//! tier's column count, which [`ColumnPlan`] supplies.
//!
//! # Invariants
//!
//! 1. `Xs` always has a column count in a [`ColumnPlan`]; larger tiers
//!    inherit from the nearest smaller tier that sets one.
//! 2. [`remap`] preserves the item count and the ids.
//! 3. Every remapped item fits the target grid and no two overlap.
//!
//! # Failure Modes
//!
//! None. Zero column counts are repaired to 1.

use std::fmt;
use std::str::FromStr;

use dockgrid_core::GridItem;
use serde::{Deserialize, Serialize};

use crate::compact::compact;

/// A named responsive tier, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Xs = 0,
    Sm = 1,
    Md = 2,
    Lg = 3,
    Xl = 4,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 5] = [Self::Xs, Self::Sm, Self::Md, Self::Lg, Self::Xl];

    /// Key fragment used for persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Xs => "xs",
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Xl => "xl",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Breakpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|bp| bp.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown breakpoint {s:?}"))
    }
}

/// Minimum viewport widths (pixels) at which each tier above `Xs` begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    pub sm: u32,
    pub md: u32,
    pub lg: u32,
    pub xl: u32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Breakpoints {
    pub const DEFAULT: Self = Self {
        sm: 600,
        md: 900,
        lg: 1200,
        xl: 1600,
    };

    /// Tier for a viewport `width` in pixels.
    #[must_use]
    pub const fn classify(&self, width: u32) -> Breakpoint {
        if width >= self.xl {
            Breakpoint::Xl
        } else if width >= self.lg {
            Breakpoint::Lg
        } else if width >= self.md {
            Breakpoint::Md
        } else if width >= self.sm {
            Breakpoint::Sm
        } else {
            Breakpoint::Xs
        }
    }

    /// Whether thresholds strictly increase from `sm` to `xl`.
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        self.sm < self.md && self.md < self.lg && self.lg < self.xl
    }
}

/// Column count per tier with inheritance from smaller tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnPlan {
    xs: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    sm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    md: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lg: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    xl: Option<u32>,
}

impl Default for ColumnPlan {
    fn default() -> Self {
        Self::uniform(dockgrid_core::DEFAULT_COLS)
    }
}

impl ColumnPlan {
    /// Same column count at every tier.
    #[must_use]
    pub const fn uniform(cols: u32) -> Self {
        Self {
            xs: cols,
            sm: None,
            md: None,
            lg: None,
            xl: None,
        }
    }

    /// Override one tier (builder).
    #[must_use]
    pub fn at(mut self, bp: Breakpoint, cols: u32) -> Self {
        self.set(bp, cols);
        self
    }

    pub fn set(&mut self, bp: Breakpoint, cols: u32) {
        match bp {
            Breakpoint::Xs => self.xs = cols,
            Breakpoint::Sm => self.sm = Some(cols),
            Breakpoint::Md => self.md = Some(cols),
            Breakpoint::Lg => self.lg = Some(cols),
            Breakpoint::Xl => self.xl = Some(cols),
        }
    }

    /// Column count for `bp`, walking down to `Xs` until one is set.
    #[must_use]
    pub fn columns(&self, bp: Breakpoint) -> u32 {
        let slots = [Some(self.xs), self.sm, self.md, self.lg, self.xl];
        slots[..=bp as usize]
            .iter()
            .rev()
            .find_map(|slot| *slot)
            .unwrap_or(self.xs)
    }

    /// Tiers whose resolved column count is zero.
    #[must_use]
    pub fn zero_tiers(&self) -> Vec<Breakpoint> {
        Breakpoint::ALL
            .into_iter()
            .filter(|&bp| self.columns(bp) == 0)
            .collect()
    }
}

/// Rescale a layout captured at `from_cols` columns to `to_cols` columns.
///
/// `x' = floor(x * to / from)`, `w' = max(1, floor(w * to / from))`, then
/// every item is clamped to the new grid and the result compacted.
#[must_use]
pub fn remap<T: Clone>(items: &[GridItem<T>], from_cols: u32, to_cols: u32) -> Vec<GridItem<T>> {
    let from = u64::from(from_cols.max(1));
    let to = u64::from(to_cols.max(1));

    let scale = |v: u32| -> u32 {
        let scaled = u64::from(v) * to / from;
        u32::try_from(scaled).unwrap_or(u32::MAX)
    };

    let scaled: Vec<GridItem<T>> = items
        .iter()
        .cloned()
        .map(|mut item| {
            item.x = scale(item.x);
            item.w = scale(item.w).max(1);
            item
        })
        .collect();

    tracing::debug!(
        target: "dockgrid.compact",
        items = items.len(),
        from_cols,
        to_cols,
        "remapping layout"
    );
    compact(&scaled, to_cols.max(1))
}
