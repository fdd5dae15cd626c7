#![forbid(unsafe_code)]

//! Interactive layer of DockGrid.
//!
//! - [`drag`]: the pointer-driven drag state machine.
//! - [`engine`]: [`LayoutEngine`], the owner of a committed layout.
//! - [`storage`] and [`store`]: pluggable key-value backends and the
//!   snapshot codec on top of them.
//! - [`config`]: engine settings loaded from TOML or JSON.
//! - [`logging`]: optional `tracing-subscriber` bootstrap.

pub mod config;
pub mod drag;
pub mod engine;
pub mod logging;
pub mod storage;
pub mod store;

pub use config::{ConfigError, DEFAULT_SNAP_THRESHOLD_ROWS, EngineConfig, GridConfig};
pub use drag::{
    CancelReason, DragContext, DragEffect, DragInput, DragMachine, DragMachineError,
    DragNoopReason, DragPhase, DragSession, DragState, DragTransition,
};
pub use engine::{LayoutEngine, LayoutEvent, ListenerId};
pub use storage::{
    FileStorage, MemoryStorage, StorageBackend, StorageError, StorageKey, StorageResult,
};
pub use store::LayoutStore;
