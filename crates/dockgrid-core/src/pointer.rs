#![forbid(unsafe_code)]

//! Pointer positions and pointer-move coalescing.
//!
//! Pointer moves arrive far more often than a host renders frames. The
//! [`PointerCoalescer`] keeps only the latest pending move ("latest wins")
//! so the drag machine runs at most once per frame. Processing every move
//! is still correct, merely wasteful.
//!
//! ```
//! use dockgrid_core::pointer::{PointerCoalescer, PointerPosition};
//!
//! let mut coalescer = PointerCoalescer::new();
//! coalescer.push(PointerPosition::new(10.0, 10.0));
//! coalescer.push(PointerPosition::new(20.0, 25.0));
//!
//! assert_eq!(coalescer.flush(), Some(PointerPosition::new(20.0, 25.0)));
//! assert_eq!(coalescer.flush(), None);
//! ```

use serde::{Deserialize, Serialize};

/// A pointer position in grid pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `origin` to `self`.
    #[must_use]
    pub fn offset_from(self, origin: PointerPosition) -> PointerPosition {
        PointerPosition::new(self.x - origin.x, self.y - origin.y)
    }

    /// `self` translated back by `offset`.
    #[must_use]
    pub fn minus(self, offset: PointerPosition) -> PointerPosition {
        PointerPosition::new(self.x - offset.x, self.y - offset.y)
    }
}

/// Latest-wins buffer for high-frequency pointer moves.
///
/// Not thread-safe; use it from the single input-processing thread.
#[derive(Debug, Clone, Default)]
pub struct PointerCoalescer {
    pending: Option<PointerPosition>,
    coalesced: u64,
}

impl PointerCoalescer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a move, replacing any pending one.
    pub fn push(&mut self, position: PointerPosition) {
        if self.pending.replace(position).is_some() {
            self.coalesced = self.coalesced.saturating_add(1);
        }
    }

    /// Take the pending move, if any.
    pub fn flush(&mut self) -> Option<PointerPosition> {
        self.pending.take()
    }

    /// Drop the pending move without delivering it.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of moves that were superseded before being flushed.
    #[must_use]
    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_move_wins() {
        let mut c = PointerCoalescer::new();
        for i in 0..5 {
            c.push(PointerPosition::new(f64::from(i), 0.0));
        }
        assert_eq!(c.flush(), Some(PointerPosition::new(4.0, 0.0)));
        assert_eq!(c.coalesced_count(), 4);
    }

    #[test]
    fn flush_empties_buffer() {
        let mut c = PointerCoalescer::new();
        c.push(PointerPosition::new(1.0, 1.0));
        assert!(c.has_pending());
        let _ = c.flush();
        assert!(!c.has_pending());
        assert_eq!(c.flush(), None);
    }

    #[test]
    fn clear_discards_pending_move() {
        let mut c = PointerCoalescer::new();
        c.push(PointerPosition::new(1.0, 1.0));
        c.clear();
        assert_eq!(c.flush(), None);
        assert_eq!(c.coalesced_count(), 0);
    }

    #[test]
    fn offsets_are_inverse() {
        let origin = PointerPosition::new(110.0, 220.0);
        let pointer = PointerPosition::new(150.0, 260.5);
        let offset = pointer.offset_from(origin);
        assert_eq!(offset, PointerPosition::new(40.0, 40.5));
        assert_eq!(pointer.minus(offset), origin);
    }
}
