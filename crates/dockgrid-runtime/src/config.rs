#![forbid(unsafe_code)]

//! Engine configuration as data.
//!
//! [`EngineConfig`] gathers every tunable of a [`crate::LayoutEngine`] so a
//! host can load it from TOML or JSON at startup.
//!
//! ```toml
//! strategy = "swap"
//! snap_threshold_rows = 2
//!
//! [grid]
//! cols = 12
//! cell_width = 80
//! cell_height = 60
//! gutter = 8
//!
//! [columns]
//! xs = 4
//! md = 8
//! xl = 12
//! ```
//!
//! Every field has a default, so an empty document is a valid config.

use std::path::Path;

use dockgrid_core::{
    DEFAULT_CELL_HEIGHT, DEFAULT_CELL_WIDTH, DEFAULT_COLS, DEFAULT_GUTTER, Grid, GridError,
};
use dockgrid_layout::{
    Breakpoint, Breakpoints, CollisionStrategy, ColumnPlan, DEFAULT_PUSH_ITERATION_CAP,
    ResolveOptions,
};
use serde::{Deserialize, Serialize};

/// Default snap ("magnet") threshold in rows.
pub const DEFAULT_SNAP_THRESHOLD_ROWS: u32 = 1;

/// Grid geometry section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cols: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub gutter: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            cell_width: DEFAULT_CELL_WIDTH,
            cell_height: DEFAULT_CELL_HEIGHT,
            gutter: DEFAULT_GUTTER,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub strategy: CollisionStrategy,
    pub snap_threshold_rows: u32,
    pub push_iteration_cap: usize,
    pub grid: GridConfig,
    pub breakpoints: Breakpoints,
    /// Per-tier column counts. Absent means `grid.cols` everywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<ColumnPlan>,
}

impl EngineConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check every parameter. An empty list means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.grid.cols == 0 {
            errors.push("grid.cols must be > 0".into());
        }
        if self.grid.cell_width == 0 {
            errors.push("grid.cell_width must be > 0".into());
        }
        if self.grid.cell_height == 0 {
            errors.push("grid.cell_height must be > 0".into());
        }
        if self.push_iteration_cap == 0 {
            errors.push("push_iteration_cap must be > 0".into());
        }
        if !self.breakpoints.is_ascending() {
            errors.push(format!(
                "breakpoints must strictly increase (sm={}, md={}, lg={}, xl={})",
                self.breakpoints.sm, self.breakpoints.md, self.breakpoints.lg, self.breakpoints.xl
            ));
        }
        for bp in self.column_plan().zero_tiers() {
            errors.push(format!("columns.{bp} resolves to 0 columns"));
        }

        errors
    }

    /// Column counts per tier, falling back to `grid.cols`.
    #[must_use]
    pub fn column_plan(&self) -> ColumnPlan {
        self.columns
            .clone()
            .unwrap_or_else(|| ColumnPlan::uniform(self.grid.cols))
    }

    /// Validated grid from the `grid` section.
    pub fn to_grid(&self) -> Result<Grid, GridError> {
        Grid::new(
            self.grid.cols,
            self.grid.cell_width,
            self.grid.cell_height,
            self.grid.gutter,
        )
    }

    /// Validated grid with the column count of tier `bp`.
    pub fn grid_for(&self, bp: Breakpoint) -> Result<Grid, GridError> {
        self.to_grid()?.with_cols(self.column_plan().columns(bp))
    }

    #[must_use]
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            iteration_cap: self.push_iteration_cap,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: CollisionStrategy::Push,
            snap_threshold_rows: DEFAULT_SNAP_THRESHOLD_ROWS,
            push_iteration_cap: DEFAULT_PUSH_ITERATION_CAP,
            grid: GridConfig::default(),
            breakpoints: Breakpoints::DEFAULT,
            columns: None,
        }
    }
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error(transparent)]
    Grid(#[from] GridError),
}
