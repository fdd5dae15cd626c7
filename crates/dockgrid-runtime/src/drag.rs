#![forbid(unsafe_code)]

//! Interactive drag lifecycle.
//!
//! ```text
//! Idle -> Dragging -> Previewing <-> Previewing -> Idle (commit / reject / fault)
//!            \______________\______________________-> Idle (cancel)
//! ```
//!
//! [`DragMachine`] owns only the ephemeral [`DragSession`]. The committed
//! layout is passed in through a [`DragContext`] on every input, so the
//! machine never mutates it: a commit hands the resolved layout back inside
//! [`DragEffect::Committed`] for the owner to install.
//!
//! Every input yields a [`DragTransition`] with a monotonic id. Ignored
//! inputs are explicit [`DragEffect::Noop`]s carrying a reason.

use dockgrid_core::{
    CellRect, Grid, GridItem, ItemId, PointerPosition, column_bottom, snap_to_neighbor,
};
use dockgrid_layout::{
    CollisionStrategy, LayoutError, Resolution, ResolveOptions, find_conflicts, resolve,
};
use serde::{Deserialize, Serialize};

/// Live state of one drag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragSession {
    /// Item being moved.
    pub item_id: ItemId,
    /// Pointer position relative to the item's top-left pixel at pointer-down.
    pub pointer_offset: PointerPosition,
    /// Item placement when the drag began.
    pub origin: CellRect,
    /// Last computed placement.
    pub preview: CellRect,
    /// Whether `preview` overlaps another item.
    pub collides: bool,
    /// Strategy captured at pointer-down; fixed for the session.
    pub strategy: CollisionStrategy,
}

/// Lifecycle state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
    Previewing(DragSession),
}

impl DragState {
    #[must_use]
    pub fn phase(&self) -> DragPhase {
        match self {
            Self::Idle => DragPhase::Idle,
            Self::Dragging(_) => DragPhase::Dragging,
            Self::Previewing(_) => DragPhase::Previewing,
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        match self {
            Self::Idle => None,
            Self::Dragging(session) | Self::Previewing(session) => Some(session),
        }
    }
}

/// Data-free view of [`DragState`] used in transition telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    Idle,
    Dragging,
    Previewing,
}

/// Why an active session was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The dragged item disappeared from the layout.
    ItemMissing,
    /// Edit mode was switched off mid-drag.
    EditModeExited,
    /// The host aborted the drag (escape key, idle timeout, teardown).
    Programmatic,
    /// The grid changed under the drag (breakpoint switch, restore).
    LayoutReplaced,
}

/// Explicit diagnostics for inputs that are safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragNoopReason {
    EditModeDisabled,
    UnknownItem,
    SessionAlreadyActive,
    NoActiveSession,
}

/// One pointer-level input.
#[derive(Debug, Clone, PartialEq)]
pub enum DragInput {
    PointerDown {
        item_id: ItemId,
        position: PointerPosition,
    },
    PointerMove {
        position: PointerPosition,
    },
    PointerUp {
        position: PointerPosition,
    },
    Cancel {
        reason: CancelReason,
    },
}

impl DragInput {
    fn position(&self) -> Option<PointerPosition> {
        match self {
            Self::PointerDown { position, .. }
            | Self::PointerMove { position }
            | Self::PointerUp { position } => Some(*position),
            Self::Cancel { .. } => None,
        }
    }
}

/// What one transition did.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEffect<T> {
    Started {
        item_id: ItemId,
        origin: CellRect,
        pointer_offset: PointerPosition,
    },
    Previewed {
        item_id: ItemId,
        placement: CellRect,
        collides: bool,
    },
    /// The resolved layout; the owner installs it.
    Committed {
        item_id: ItemId,
        placement: CellRect,
        items: Vec<GridItem<T>>,
    },
    Rejected {
        item_id: ItemId,
        placement: CellRect,
        conflicts: Vec<ItemId>,
    },
    Faulted {
        item_id: ItemId,
        error: LayoutError,
    },
    Cancelled {
        item_id: ItemId,
        reason: CancelReason,
    },
    Noop {
        reason: DragNoopReason,
    },
}

/// One state-machine step with telemetry fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DragTransition<T> {
    pub transition_id: u64,
    pub from: DragPhase,
    pub to: DragPhase,
    pub effect: DragEffect<T>,
}

/// Read-only layout inputs for one step.
#[derive(Debug)]
pub struct DragContext<'a, T> {
    pub items: &'a [GridItem<T>],
    pub grid: &'a Grid,
    pub strategy: CollisionStrategy,
    pub snap_threshold_rows: u32,
    pub options: ResolveOptions,
    pub edit_mode: bool,
}

impl<T> Clone for DragContext<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DragContext<'_, T> {}

/// Input rejected before reaching the machine.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum DragMachineError {
    #[error("pointer coordinates must be finite (got x={x}, y={y})")]
    NonFinitePointer { x: f64, y: f64 },
}

/// Drag lifecycle machine. At most one session exists at a time.
#[derive(Debug, Clone, Default)]
pub struct DragMachine {
    state: DragState,
    transition_counter: u64,
}

impl DragMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.state.phase()
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.state.session()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Number of transitions emitted so far.
    #[must_use]
    pub const fn transition_count(&self) -> u64 {
        self.transition_counter
    }

    /// Reset to Idle, returning a `Cancelled` transition if a session was live.
    pub fn force_cancel<T>(&mut self, reason: CancelReason) -> Option<DragTransition<T>> {
        let from = self.phase();
        let session = self.take_session()?;
        tracing::debug!(
            target: "dockgrid.drag",
            item = %session.item_id,
            reason = ?reason,
            "drag cancelled"
        );
        Some(self.emit(
            from,
            DragEffect::Cancelled {
                item_id: session.item_id,
                reason,
            },
        ))
    }

    /// Apply one input.
    pub fn apply<T: Clone>(
        &mut self,
        ctx: DragContext<'_, T>,
        input: DragInput,
    ) -> Result<DragTransition<T>, DragMachineError> {
        if let Some(position) = input.position() {
            if !(position.x.is_finite() && position.y.is_finite()) {
                return Err(DragMachineError::NonFinitePointer {
                    x: position.x,
                    y: position.y,
                });
            }
        }

        let from = self.phase();
        let effect = match (from, input) {
            (DragPhase::Idle, DragInput::PointerDown { item_id, position }) => {
                self.start(ctx, item_id, position)
            }
            (DragPhase::Idle, _) => DragEffect::Noop {
                reason: DragNoopReason::NoActiveSession,
            },
            (_, DragInput::PointerDown { .. }) => DragEffect::Noop {
                reason: DragNoopReason::SessionAlreadyActive,
            },
            (_, DragInput::Cancel { reason }) => match self.force_cancel(reason) {
                Some(transition) => return Ok(transition),
                None => DragEffect::Noop {
                    reason: DragNoopReason::NoActiveSession,
                },
            },
            (_, DragInput::PointerMove { position }) => self.preview(ctx, position),
            (_, DragInput::PointerUp { position }) => self.commit(ctx, position),
        };

        Ok(self.emit(from, effect))
    }

    fn start<T>(
        &mut self,
        ctx: DragContext<'_, T>,
        item_id: ItemId,
        position: PointerPosition,
    ) -> DragEffect<T> {
        if !ctx.edit_mode {
            return DragEffect::Noop {
                reason: DragNoopReason::EditModeDisabled,
            };
        }
        let Some(item) = ctx.items.iter().find(|item| item.id == item_id) else {
            return DragEffect::Noop {
                reason: DragNoopReason::UnknownItem,
            };
        };

        let origin = item.rect();
        let pointer_offset = position.offset_from(ctx.grid.cell_to_pixel(origin.x, origin.y));
        tracing::debug!(
            target: "dockgrid.drag",
            item = %item_id,
            x = origin.x,
            y = origin.y,
            strategy = ctx.strategy.as_str(),
            "drag started"
        );
        self.state = DragState::Dragging(DragSession {
            item_id: item_id.clone(),
            pointer_offset,
            origin,
            preview: origin,
            collides: false,
            strategy: ctx.strategy,
        });
        DragEffect::Started {
            item_id,
            origin,
            pointer_offset,
        }
    }

    fn preview<T>(&mut self, ctx: DragContext<'_, T>, position: PointerPosition) -> DragEffect<T> {
        let Some(mut session) = self.take_session() else {
            return DragEffect::Noop {
                reason: DragNoopReason::NoActiveSession,
            };
        };
        if !ctx.items.iter().any(|item| item.id == session.item_id) {
            return missing(session);
        }

        let placement = placement_for(ctx, &session, position);
        let collides = !find_conflicts(ctx.items, &session.item_id, placement).is_empty();
        tracing::trace!(
            target: "dockgrid.drag",
            item = %session.item_id,
            x = placement.x,
            y = placement.y,
            collides,
            "preview updated"
        );

        session.preview = placement;
        session.collides = collides;
        let item_id = session.item_id.clone();
        self.state = DragState::Previewing(session);
        DragEffect::Previewed {
            item_id,
            placement,
            collides,
        }
    }

    fn commit<T: Clone>(
        &mut self,
        ctx: DragContext<'_, T>,
        position: PointerPosition,
    ) -> DragEffect<T> {
        let Some(session) = self.take_session() else {
            return DragEffect::Noop {
                reason: DragNoopReason::NoActiveSession,
            };
        };
        if !ctx.items.iter().any(|item| item.id == session.item_id) {
            return missing(session);
        }

        let placement = placement_for(ctx, &session, position);
        let item_id = session.item_id;
        match resolve(
            ctx.items,
            &item_id,
            placement,
            ctx.grid.cols(),
            session.strategy,
            ctx.options,
        ) {
            Ok(Resolution::Applied(items)) => {
                tracing::debug!(
                    target: "dockgrid.drag",
                    item = %item_id,
                    x = placement.x,
                    y = placement.y,
                    "drag committed"
                );
                DragEffect::Committed {
                    item_id,
                    placement,
                    items,
                }
            }
            Ok(Resolution::Rejected { conflicts }) => {
                tracing::debug!(
                    target: "dockgrid.drag",
                    item = %item_id,
                    conflicts = conflicts.len(),
                    "drop rejected; item returns to origin"
                );
                DragEffect::Rejected {
                    item_id,
                    placement,
                    conflicts,
                }
            }
            Err(LayoutError::UnknownItem { .. }) => DragEffect::Cancelled {
                item_id,
                reason: CancelReason::ItemMissing,
            },
            Err(error) => {
                tracing::warn!(target: "dockgrid.drag", item = %item_id, %error, "drop faulted");
                DragEffect::Faulted { item_id, error }
            }
        }
    }

    fn take_session(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Dragging(session) | DragState::Previewing(session) => Some(session),
        }
    }

    fn emit<T>(&mut self, from: DragPhase, effect: DragEffect<T>) -> DragTransition<T> {
        self.transition_counter = self.transition_counter.saturating_add(1);
        DragTransition {
            transition_id: self.transition_counter,
            from,
            to: self.phase(),
            effect,
        }
    }
}

fn missing<T>(session: DragSession) -> DragEffect<T> {
    tracing::debug!(
        target: "dockgrid.drag",
        item = %session.item_id,
        "dragged item left the layout"
    );
    DragEffect::Cancelled {
        item_id: session.item_id,
        reason: CancelReason::ItemMissing,
    }
}

/// Pointer -> cell, clamp x to the grid, then apply the magnet rule.
///
/// The magnet only docks into free space: a candidate cell that already
/// overlaps another item is kept as is, so the strategy sees the drop on
/// the occupant.
fn placement_for<T>(
    ctx: DragContext<'_, T>,
    session: &DragSession,
    pointer: PointerPosition,
) -> CellRect {
    let cols = ctx.grid.cols();
    let w = session.origin.w.clamp(1, cols);
    let h = session.origin.h.max(1);

    let (cell_x, cell_y) = ctx.grid.pixel_to_cell(pointer.minus(session.pointer_offset));
    let candidate = CellRect::new(cell_x.min(cols - w), cell_y, w, h);
    if !find_conflicts(ctx.items, &session.item_id, candidate).is_empty() {
        return candidate;
    }
    let bottom = column_bottom(
        ctx.items,
        candidate.x..candidate.right(),
        Some(&session.item_id),
    );
    candidate.at(candidate.x, snap_to_neighbor(cell_y, bottom, ctx.snap_threshold_rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        items: Vec<GridItem>,
        grid: Grid,
        strategy: CollisionStrategy,
        snap: u32,
        edit_mode: bool,
    }

    impl Fixture {
        fn new(items: Vec<GridItem>) -> Self {
            Self {
                items,
                grid: Grid::new(8, 100, 100, 10).unwrap(),
                strategy: CollisionStrategy::Push,
                snap: 0,
                edit_mode: true,
            }
        }

        fn ctx(&self) -> DragContext<'_, ()> {
            DragContext {
                items: &self.items,
                grid: &self.grid,
                strategy: self.strategy,
                snap_threshold_rows: self.snap,
                options: ResolveOptions::default(),
                edit_mode: self.edit_mode,
            }
        }
    }

    // pitch = 110
    fn px(cell: u32) -> f64 {
        f64::from(cell) * 110.0
    }

    fn down(id: &str, x: f64, y: f64) -> DragInput {
        DragInput::PointerDown {
            item_id: ItemId::new(id),
            position: PointerPosition::new(x, y),
        }
    }

    fn mv(x: f64, y: f64) -> DragInput {
        DragInput::PointerMove {
            position: PointerPosition::new(x, y),
        }
    }

    fn up(x: f64, y: f64) -> DragInput {
        DragInput::PointerUp {
            position: PointerPosition::new(x, y),
        }
    }

    fn two_items() -> Vec<GridItem> {
        vec![GridItem::new("a", 0, 0, 2, 2), GridItem::new("b", 2, 0, 2, 2)]
    }

    // ---- Start ----

    #[test]
    fn pointer_down_starts_session_with_offset() {
        let fx = Fixture::new(two_items());
        let mut machine = DragMachine::new();
        let t = machine.apply(fx.ctx(), down("b", px(2) + 15.0, 40.0)).unwrap();
        assert_eq!((t.from, t.to), (DragPhase::Idle, DragPhase::Dragging));
        assert_eq!(
            t.effect,
            DragEffect::Started {
                item_id: ItemId::new("b"),
                origin: CellRect::new(2, 0, 2, 2),
                pointer_offset: PointerPosition::new(15.0, 40.0),
            }
        );
    }

    #[test]
    fn pointer_down_outside_edit_mode_is_noop() {
        let mut fx = Fixture::new(two_items());
        fx.edit_mode = false;
        let mut machine = DragMachine::new();
        let t = machine.apply(fx.ctx(), down("a", 5.0, 5.0)).unwrap();
        assert_eq!(
            t.effect,
            DragEffect::Noop {
                reason: DragNoopReason::EditModeDisabled
            }
        );
        assert!(!machine.is_active());
    }

    #[test]
    fn pointer_down_on_unknown_item_is_noop() {
        let fx = Fixture::new(two_items());
        let mut machine = DragMachine::new();
        let t = machine.apply(fx.ctx(), down("ghost", 5.0, 5.0)).unwrap();
        assert!(matches!(
            t.effect,
            DragEffect::Noop {
                reason: DragNoopReason::UnknownItem
            }
        ));
    }

    #[test]
    fn second_pointer_down_is_rejected_while_active() {
        let fx = Fixture::new(two_items());
        let mut machine = DragMachine::new();
        machine.apply(fx.ctx(), down("a", 5.0, 5.0)).unwrap();
        let t = machine.apply(fx.ctx(), down("b", px(2), 5.0)).unwrap();
        assert!(matches!(
            t.effect,
            DragEffect::Noop {
                reason: DragNoopReason::SessionAlreadyActive
            }
        ));
        assert_eq!(machine.session().unwrap().item_id.as_str(), "a");
    }

    // ---- Preview ----

    #[test]
    fn pointer_move_previews_without_mutation() {
        let fx = Fixture::new(two_items());
        let mut machine = DragMachine::new();
        machine.apply(fx.ctx(), down("a", 10.0, 10.0)).unwrap();
        let t = machine.apply(fx.ctx(), mv(px(1) + 10.0, 10.0)).unwrap();
        assert_eq!(t.to, DragPhase::Previewing);
        assert_eq!(
            t.effect,
            DragEffect::Previewed {
                item_id: ItemId::new("a"),
                placement: CellRect::new(1, 0, 2, 2),
                collides: true,
            }
        );
        assert_eq!(fx.items, two_items());
    }

    #[test]
    fn preview_clamps_to_right_edge() {
        let fx = Fixture::new(two_items());
        let mut machine = DragMachine::new();
        machine.apply(fx.ctx(), down("a", 0.0, 0.0)).unwrap();
        machine.apply(fx.ctx(), mv(px(40), px(6))).unwrap();
        let session = machine.session().unwrap();
        assert_eq!(session.preview, CellRect::new(6, 6, 2, 2));
        assert!(!session.collides);
    }

    #[test]
    fn preview_snaps_to_column_bottom() {
        let mut fx = Fixture::new(vec![
            GridItem::new("a", 0, 0, 1, 3),
            GridItem::new("m", 4, 0, 1, 1),
        ]);
        fx.snap = 1;
        let mut machine = DragMachine::new();
        machine.apply(fx.ctx(), down("m", px(4), 0.0)).unwrap();
        let t = machine.apply(fx.ctx(), mv(0.0, px(4))).unwrap();
        assert!(matches!(
            t.effect,
            DragEffect::Previewed { placement, .. } if placement == CellRect::new(0, 3, 1, 1)
        ));
    }

    #[test]
    fn preview_snaps_up_from_below_the_column() {
        let mut fx = Fixture::new(vec![
            GridItem::new("a", 0, 0, 1, 2),
            GridItem::new("m", 4, 0, 1, 1),
        ]);
        fx.snap = 2;
        let mut machine = DragMachine::new();
        machine.apply(fx.ctx(), down("m", px(4), 0.0)).unwrap();
        machine.apply(fx.ctx(), mv(0.0, px(4))).unwrap();
        assert_eq!(machine.session().unwrap().preview.y, 2);
    }

    #[test]
    fn magnet_leaves_occupied_cell_alone() {
        let mut fx = Fixture::new(vec![
            GridItem::new("a", 0, 0, 1, 1),
            GridItem::new("b", 1, 0, 1, 1),
            GridItem::new("c", 0, 1, 1, 1),
        ]);
        fx.snap = 1;
        let mut machine = DragMachine::new();
        machine.apply(fx.ctx(), down("a", 10.0, 10.0)).unwrap();
        let t = machine.apply(fx.ctx(), mv(10.0, px(1) + 10.0)).unwrap();
        assert_eq!(
            t.effect,
            DragEffect::Previewed {
                item_id: ItemId::new("a"),
                placement: CellRect::new(0, 1, 1, 1),
                collides: true,
            }
        );
    }

    // ---- Commit ----

    #[test]
    fn pointer_up_commits_resolved_layout() {
        let fx = Fixture::new(two_items());
        let mut machine = DragMachine::new();
        machine.apply(fx.ctx(), down("a", 10.0, 10.0)).unwrap();
        let t = machine.apply(fx.ctx(), up(10.0, px(3) + 10.0)).unwrap();
        assert_eq!(t.to, DragPhase::Idle);
        let DragEffect::Committed { items, placement, .. } = t.effect else {
            panic!("expected commit, got {:?}", t.effect);
        };
        assert_eq!(placement, CellRect::new(0, 3, 2, 2));
        assert_eq!(items[0].rect(), CellRect::new(0, 3, 2, 2));
        assert_eq!(items[1].rect(), CellRect::new(2, 0, 2, 2));
    }

    #[test]
    fn prevent_rejection_returns_to_idle() {
        let mut fx = Fixture::new(two_items());
        fx.strategy = CollisionStrategy::Prevent;
        let mut machine = DragMachine::new();
        machine.apply(fx.ctx(), down("a", 0.0, 0.0)).unwrap();
        machine.apply(fx.ctx(), mv(px(1), 0.0)).unwrap();
        let t = machine.apply(fx.ctx(), up(px(1), 0.0)).unwrap();
        assert_eq!((t.from, t.to), (DragPhase::Previewing, DragPhase::Idle));
        assert!(matches!(
            t.effect,
            DragEffect::Rejected { ref conflicts, .. } if conflicts == &vec![ItemId::new("b")]
        ));
    }

    #[test]
    fn session_keeps_strategy_from_pointer_down() {
        let mut fx = Fixture::new(two_items());
        fx.strategy = CollisionStrategy::Prevent;
        let mut machine = DragMachine::new();
        machine.apply(fx.ctx(), down("a", 0.0, 0.0)).unwrap();
        fx.strategy = CollisionStrategy::Push;
        let t = machine.apply(fx.ctx(), up(px(1), 0.0)).unwrap();
        assert!(matches!(t.effect, DragEffect::Rejected { .. }));
    }

    #[test]
    fn push_fault_is_reported() {
        let items = vec![
            GridItem::new("m", 4, 0, 1, 1),
            GridItem::new("a", 0, 0, 1, 1),
            GridItem::new("b", 0, 1, 1, 1),
            GridItem::new("c", 0, 2, 1, 1),
        ];
        let fx = Fixture::new(items);
        let ctx = DragContext {
            options: ResolveOptions { iteration_cap: 1 },
            ..fx.ctx()
        };
        let mut machine = DragMachine::new();
        machine.apply(ctx, down("m", px(4), 0.0)).unwrap();
        let t = machine.apply(ctx, up(0.0, 0.0)).unwrap();
        assert!(matches!(
            t.effect,
            DragEffect::Faulted {
                error: LayoutError::ResolutionFault { .. },
                ..
            }
        ));
        assert!(!machine.is_active());
    }

    // ---- Cancel ----

    #[test]
    fn missing_item_cancels_session() {
        let mut fx = Fixture::new(two_items());
        let mut machine = DragMachine::new();
        machine.apply(fx.ctx(), down("a", 0.0, 0.0)).unwrap();
        fx.items.retain(|item| item.id.as_str() != "a");
        let t = machine.apply(fx.ctx(), mv(px(3), 0.0)).unwrap();
        assert_eq!(t.to, DragPhase::Idle);
        assert!(matches!(
            t.effect,
            DragEffect::Cancelled {
                reason: CancelReason::ItemMissing,
                ..
            }
        ));
    }

    #[test]
    fn explicit_cancel_discards_preview() {
        let fx = Fixture::new(two_items());
        let mut machine = DragMachine::new();
        machine.apply(fx.ctx(), down("a", 0.0, 0.0)).unwrap();
        machine.apply(fx.ctx(), mv(px(5), 0.0)).unwrap();
        let t = machine
            .apply(fx.ctx(), DragInput::Cancel { reason: CancelReason::Programmatic })
            .unwrap();
        assert_eq!((t.from, t.to), (DragPhase::Previewing, DragPhase::Idle));
        assert!(machine.session().is_none());
    }

    #[test]
    fn input_without_session_is_noop() {
        let fx = Fixture::new(two_items());
        let mut machine = DragMachine::new();
        for input in [
            mv(1.0, 1.0),
            up(1.0, 1.0),
            DragInput::Cancel {
                reason: CancelReason::Programmatic,
            },
        ] {
            let t = machine.apply(fx.ctx(), input).unwrap();
            assert!(matches!(
                t.effect,
                DragEffect::Noop {
                    reason: DragNoopReason::NoActiveSession
                }
            ));
        }
    }

    #[test]
    fn force_cancel_when_idle_returns_none() {
        let mut machine = DragMachine::new();
        assert!(machine.force_cancel::<()>(CancelReason::Programmatic).is_none());
        assert_eq!(machine.transition_count(), 0);
    }

    // ---- Telemetry ----

    #[test]
    fn transition_ids_are_monotonic() {
        let fx = Fixture::new(two_items());
        let mut machine = DragMachine::new();
        let ids: Vec<u64> = [down("a", 0.0, 0.0), mv(5.0, 5.0), mv(6.0, 6.0), up(6.0, 6.0)]
            .into_iter()
            .map(|input| machine.apply(fx.ctx(), input).unwrap().transition_id)
            .collect();
        assert_eq!(ids, [1, 2, 3, 4]);
    }

    #[test]
    fn non_finite_pointer_is_an_error() {
        let fx = Fixture::new(two_items());
        let mut machine = DragMachine::new();
        let err = machine.apply(fx.ctx(), mv(f64::NAN, 0.0)).unwrap_err();
        assert!(matches!(err, DragMachineError::NonFinitePointer { .. }));
        assert_eq!(machine.transition_count(), 0);
    }

    #[test]
    fn drag_state_serializes_with_phase_tag() {
        let json = serde_json::to_value(DragState::Idle).unwrap();
        assert_eq!(json["state"], "idle");
    }
}
