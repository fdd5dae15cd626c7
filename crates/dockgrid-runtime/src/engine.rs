#![forbid(unsafe_code)]

//! The owning layout value.
//!
//! [`LayoutEngine`] holds the committed item list and mutates it only
//! through `&mut self` methods. Pointer input goes through the
//! [`DragMachine`]; whatever the machine resolves is installed here,
//! persisted when a [`LayoutStore`] is attached, and announced to
//! subscribers as a [`LayoutEvent`].
//!
//! # Frame pacing
//!
//! Hosts that receive many pointer moves per frame call
//! [`LayoutEngine::queue_pointer_move`] for each one and
//! [`LayoutEngine::on_frame`] once per frame; only the latest queued
//! position is processed. Calling [`LayoutEngine::on_pointer_move`] directly
//! is equally correct, just more work.

use std::fmt;

use dockgrid_core::{
    CellRect, Grid, GridError, GridItem, ItemId, PointerCoalescer, PointerPosition, clamp_to_grid,
    overlaps,
};
use dockgrid_layout::{
    Breakpoint, CollisionStrategy, ColumnPlan, LayoutError, LayoutSnapshot, ResolveOptions,
    compact, has_overlaps, layout_height, normalize_layout, remap,
};

use rustc_hash::FxHashMap;

use crate::config::{ConfigError, DEFAULT_SNAP_THRESHOLD_ROWS, EngineConfig};
use crate::drag::{
    CancelReason, DragContext, DragEffect, DragInput, DragMachine, DragMachineError, DragPhase,
    DragState, DragTransition,
};
use crate::storage::StorageError;
use crate::store::LayoutStore;

/// Notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent<T> {
    /// A new committed layout was installed.
    Committed {
        items: Vec<GridItem<T>>,
        /// The dragged or added item, if one caused the change.
        moved: Option<ItemId>,
    },
    /// A drop was refused; the layout is unchanged.
    Rejected {
        item_id: ItemId,
        placement: CellRect,
        conflicts: Vec<ItemId>,
    },
    Cancelled {
        item_id: ItemId,
        reason: CancelReason,
    },
    /// Resolution gave up; the layout is unchanged.
    Faulted {
        item_id: ItemId,
        error: LayoutError,
    },
    /// The layout was installed but could not be persisted.
    SaveFailed { owner: String, breakpoint: Breakpoint, message: String },
    /// A stored snapshot replaced the current layout.
    Restored { breakpoint: Breakpoint, items: usize },
}

/// Handle returned by [`LayoutEngine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Box<dyn FnMut(&LayoutEvent<T>)>;

struct Persistence {
    store: LayoutStore,
    owner: String,
}

/// Committed layout plus the drag session that edits it.
pub struct LayoutEngine<T = ()> {
    grid: Grid,
    strategy: CollisionStrategy,
    snap_threshold_rows: u32,
    options: ResolveOptions,
    items: Vec<GridItem<T>>,
    edit_mode: bool,
    drag: DragMachine,
    coalescer: PointerCoalescer,
    columns: ColumnPlan,
    breakpoint: Breakpoint,
    persistence: Option<Persistence>,
    listeners: Vec<(ListenerId, Listener<T>)>,
    next_listener: u64,
}

impl<T: fmt::Debug> fmt::Debug for LayoutEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("grid", &self.grid)
            .field("strategy", &self.strategy)
            .field("breakpoint", &self.breakpoint)
            .field("edit_mode", &self.edit_mode)
            .field("items", &self.items)
            .field("drag", &self.drag.phase())
            .field("persistent", &self.persistence.is_some())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T: Clone> LayoutEngine<T> {
    /// Engine over `grid` with default settings. `items` are normalized.
    ///
    /// The column plan is uniform, so every breakpoint keeps `grid.cols()`.
    /// The starting breakpoint is [`Breakpoint::Lg`].
    #[must_use]
    pub fn new(grid: Grid, items: Vec<GridItem<T>>) -> Self {
        Self {
            items: normalize_layout(&items, grid.cols()),
            columns: ColumnPlan::uniform(grid.cols()),
            grid,
            strategy: CollisionStrategy::default(),
            snap_threshold_rows: DEFAULT_SNAP_THRESHOLD_ROWS,
            options: ResolveOptions::default(),
            edit_mode: false,
            drag: DragMachine::new(),
            coalescer: PointerCoalescer::new(),
            breakpoint: Breakpoint::Lg,
            persistence: None,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Engine configured from `config`, starting at breakpoint `bp`.
    pub fn from_config(
        config: &EngineConfig,
        bp: Breakpoint,
        items: Vec<GridItem<T>>,
    ) -> Result<Self, ConfigError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }
        let grid = config.grid_for(bp)?;
        let mut engine = Self::new(grid, items);
        engine.strategy = config.strategy;
        engine.snap_threshold_rows = config.snap_threshold_rows;
        engine.options = config.resolve_options();
        engine.columns = config.column_plan();
        engine.breakpoint = bp;
        Ok(engine)
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: CollisionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_snap_threshold(mut self, rows: u32) -> Self {
        self.snap_threshold_rows = rows;
        self
    }

    #[must_use]
    pub fn with_resolve_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_edit_mode(mut self, enabled: bool) -> Self {
        self.edit_mode = enabled;
        self
    }

    /// Persist committed layouts under `owner` and the current breakpoint.
    #[must_use]
    pub fn with_store(mut self, store: LayoutStore, owner: impl Into<String>) -> Self {
        self.persistence = Some(Persistence {
            store,
            owner: owner.into(),
        });
        self
    }

    /// Replace the column plan and move to breakpoint `bp`, remapping items.
    pub fn with_column_plan(mut self, plan: ColumnPlan, bp: Breakpoint) -> Result<Self, GridError> {
        let grid = self.grid.with_cols(plan.columns(bp))?;
        self.items = remap(&self.items, self.grid.cols(), grid.cols());
        self.grid = grid;
        self.columns = plan;
        self.breakpoint = bp;
        Ok(self)
    }

    // ---- Accessors ----

    #[must_use]
    pub fn items(&self) -> &[GridItem<T>] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&GridItem<T>> {
        self.items.iter().find(|item| &item.id == id)
    }

    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub const fn strategy(&self) -> CollisionStrategy {
        self.strategy
    }

    /// Takes effect from the next pointer-down.
    pub fn set_strategy(&mut self, strategy: CollisionStrategy) {
        self.strategy = strategy;
    }

    #[must_use]
    pub const fn breakpoint(&self) -> Breakpoint {
        self.breakpoint
    }

    #[must_use]
    pub const fn column_plan(&self) -> &ColumnPlan {
        &self.columns
    }

    #[must_use]
    pub const fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    #[must_use]
    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    /// Current preview placement and whether it collides.
    #[must_use]
    pub fn preview(&self) -> Option<(CellRect, bool)> {
        match self.drag.state() {
            DragState::Previewing(session) => Some((session.preview, session.collides)),
            _ => None,
        }
    }

    #[must_use]
    pub fn transition_count(&self) -> u64 {
        self.drag.transition_count()
    }

    /// Pointer moves dropped because a newer one arrived in the same frame.
    #[must_use]
    pub fn coalesced_moves(&self) -> u64 {
        self.coalescer.coalesced_count()
    }

    /// Rows spanned by the committed layout.
    #[must_use]
    pub fn height(&self) -> u32 {
        layout_height(&self.items)
    }

    /// Geometry of the committed layout in persisted form.
    #[must_use]
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot::capture(&self.grid, &self.items)
    }

    // ---- Subscribers ----

    pub fn subscribe(&mut self, listener: impl FnMut(&LayoutEvent<T>) + 'static) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the listener was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    // ---- Pointer input ----

    /// Begin dragging `item_id`. Ignored unless edit mode is on.
    pub fn on_pointer_down(
        &mut self,
        item_id: impl Into<ItemId>,
        position: PointerPosition,
    ) -> Result<DragTransition<T>, DragMachineError> {
        self.coalescer.clear();
        self.dispatch(DragInput::PointerDown {
            item_id: item_id.into(),
            position,
        })
    }

    /// Recompute the preview immediately.
    pub fn on_pointer_move(
        &mut self,
        position: PointerPosition,
    ) -> Result<DragTransition<T>, DragMachineError> {
        self.coalescer.clear();
        self.dispatch(DragInput::PointerMove { position })
    }

    /// Drop the item; commits, rejects, or faults.
    pub fn on_pointer_up(
        &mut self,
        position: PointerPosition,
    ) -> Result<DragTransition<T>, DragMachineError> {
        self.coalescer.clear();
        self.dispatch(DragInput::PointerUp { position })
    }

    /// Buffer a move for the next [`Self::on_frame`]. Only the latest counts.
    pub fn queue_pointer_move(&mut self, position: PointerPosition) {
        if self.drag.is_active() {
            self.coalescer.push(position);
        }
    }

    /// Process the latest queued move, if any.
    pub fn on_frame(&mut self) -> Result<Option<DragTransition<T>>, DragMachineError> {
        match self.coalescer.flush() {
            Some(position) => self.dispatch(DragInput::PointerMove { position }).map(Some),
            None => Ok(None),
        }
    }

    /// Abandon the active drag, if any.
    pub fn cancel(&mut self) -> Option<DragTransition<T>> {
        self.abort(CancelReason::Programmatic)
    }

    /// Leaving edit mode cancels an active drag.
    pub fn set_edit_mode(&mut self, enabled: bool) -> Option<DragTransition<T>> {
        self.edit_mode = enabled;
        if enabled {
            None
        } else {
            self.abort(CancelReason::EditModeExited)
        }
    }

    fn dispatch(&mut self, input: DragInput) -> Result<DragTransition<T>, DragMachineError> {
        let ctx = DragContext {
            items: &self.items,
            grid: &self.grid,
            strategy: self.strategy,
            snap_threshold_rows: self.snap_threshold_rows,
            options: self.options,
            edit_mode: self.edit_mode,
        };
        let transition = self.drag.apply(ctx, input)?;
        self.absorb(&transition);
        Ok(transition)
    }

    fn abort(&mut self, reason: CancelReason) -> Option<DragTransition<T>> {
        self.coalescer.clear();
        let transition = self.drag.force_cancel(reason)?;
        self.absorb(&transition);
        Some(transition)
    }

    fn absorb(&mut self, transition: &DragTransition<T>) {
        match &transition.effect {
            DragEffect::Committed { item_id, items, .. } => {
                self.install(items.clone(), Some(item_id.clone()));
            }
            DragEffect::Rejected {
                item_id,
                placement,
                conflicts,
            } => self.emit(&LayoutEvent::Rejected {
                item_id: item_id.clone(),
                placement: *placement,
                conflicts: conflicts.clone(),
            }),
            DragEffect::Cancelled { item_id, reason } => self.emit(&LayoutEvent::Cancelled {
                item_id: item_id.clone(),
                reason: *reason,
            }),
            DragEffect::Faulted { item_id, error } => self.emit(&LayoutEvent::Faulted {
                item_id: item_id.clone(),
                error: error.clone(),
            }),
            DragEffect::Started { .. } | DragEffect::Previewed { .. } | DragEffect::Noop { .. } => {}
        }
        if transition.from != transition.to && transition.to == DragPhase::Idle {
            self.coalescer.clear();
        }
    }

    // ---- Layout operations ----

    /// Compact the committed layout upward.
    pub fn tidy(&mut self) {
        self.abort(CancelReason::LayoutReplaced);
        let items = compact(&self.items, self.grid.cols());
        self.install(items, None);
    }

    /// Replace the committed layout wholesale. `items` are normalized.
    pub fn replace_items(&mut self, items: Vec<GridItem<T>>) {
        self.abort(CancelReason::LayoutReplaced);
        let items = normalize_layout(&items, self.grid.cols());
        self.install(items, None);
    }

    /// Add an item, clamped to the grid and moved below the layout if it
    /// would overlap. Returns `false` when the id is already present.
    pub fn add_item(&mut self, item: GridItem<T>) -> bool {
        if self.item(&item.id).is_some() {
            return false;
        }
        let mut item = clamp_to_grid(item, self.grid.cols(), 1, 1);
        if self.items.iter().any(|other| overlaps(other, &item)) {
            item.y = layout_height(&self.items);
        }
        let id = item.id.clone();
        let mut items = self.items.clone();
        items.push(item);
        self.install(items, Some(id));
        true
    }

    /// Remove an item. Gaps are left in place; call [`Self::tidy`] to close them.
    pub fn remove_item(&mut self, id: &ItemId) -> Option<GridItem<T>> {
        let index = self.items.iter().position(|item| &item.id == id)?;
        if self.drag.state().session().is_some_and(|s| &s.item_id == id) {
            self.abort(CancelReason::ItemMissing);
        }
        let mut items = self.items.clone();
        let removed = items.remove(index);
        self.install(items, None);
        Some(removed)
    }

    /// Switch to breakpoint `bp`: remap to its column count, then restore
    /// the snapshot stored for it, if any.
    pub fn apply_breakpoint(&mut self, bp: Breakpoint) -> Result<(), GridError> {
        let grid = self.grid.with_cols(self.columns.columns(bp))?;
        self.abort(CancelReason::LayoutReplaced);

        let from_cols = self.grid.cols();
        tracing::info!(
            target: "dockgrid.engine",
            from = %self.breakpoint,
            to = %bp,
            from_cols,
            to_cols = grid.cols(),
            "breakpoint changed"
        );
        self.items = remap(&self.items, from_cols, grid.cols());
        self.grid = grid;
        self.breakpoint = bp;
        self.restore();
        Ok(())
    }

    /// Load the snapshot stored for the current key and install it.
    ///
    /// Payloads are re-attached by id. Stored ids with no current item are
    /// dropped; current items absent from the snapshot are kept. The result
    /// is normalized only if it overlaps or leaves the grid. Returns
    /// `false` and leaves the layout alone when nothing usable is stored.
    pub fn restore(&mut self) -> bool {
        let Some(persistence) = &self.persistence else {
            return false;
        };
        let Some(snapshot) = persistence
            .store
            .load(&persistence.owner, self.breakpoint.as_str())
        else {
            return false;
        };
        if let Err(error) = snapshot.validate() {
            tracing::warn!(target: "dockgrid.engine", %error, "stored snapshot rejected");
            return false;
        }

        self.abort(CancelReason::LayoutReplaced);
        let payloads: FxHashMap<&ItemId, &T> =
            self.items.iter().map(|item| (&item.id, &item.payload)).collect();
        let stored: Vec<GridItem<T>> = snapshot
            .items
            .iter()
            .filter_map(|entry| {
                payloads.get(&entry.id).map(|payload| {
                    GridItem::with_payload(entry.id.clone(), entry.rect(), (*payload).clone())
                })
            })
            .collect();
        let dropped = snapshot.items.len() - stored.len();

        let cols = self.grid.cols();
        let mut restored = if snapshot.cols == cols {
            stored
        } else {
            remap(&stored, snapshot.cols, cols)
        };
        restored.extend(
            self.items
                .iter()
                .filter(|item| !snapshot.items.iter().any(|entry| entry.id == item.id))
                .cloned(),
        );
        let repaired = !restored.iter().all(|item| item.fits(cols)) || has_overlaps(&restored);
        self.items = if repaired {
            normalize_layout(&restored, cols)
        } else {
            restored
        };

        tracing::info!(
            target: "dockgrid.engine",
            breakpoint = %self.breakpoint,
            items = self.items.len(),
            dropped,
            repaired,
            "layout restored"
        );
        self.emit(&LayoutEvent::Restored {
            breakpoint: self.breakpoint,
            items: self.items.len(),
        });
        true
    }

    /// Persist the committed layout now. `Ok(false)` when no store is attached.
    pub fn save(&self) -> Result<bool, StorageError> {
        let Some(persistence) = &self.persistence else {
            return Ok(false);
        };
        persistence
            .store
            .save(&persistence.owner, self.breakpoint.as_str(), &self.snapshot())?;
        Ok(true)
    }

    fn install(&mut self, items: Vec<GridItem<T>>, moved: Option<ItemId>) {
        self.items = items;
        let save_error = self.save().err();
        tracing::debug!(
            target: "dockgrid.engine",
            items = self.items.len(),
            moved = moved.as_ref().map(ItemId::as_str),
            "layout committed"
        );
        self.emit(&LayoutEvent::Committed {
            items: self.items.clone(),
            moved,
        });
        if let (Some(error), Some(persistence)) = (save_error, &self.persistence) {
            let event = LayoutEvent::SaveFailed {
                owner: persistence.owner.clone(),
                breakpoint: self.breakpoint,
                message: error.to_string(),
            };
            self.emit(&event);
        }
    }

    fn emit(&mut self, event: &LayoutEvent<T>) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}
