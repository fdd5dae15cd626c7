#![forbid(unsafe_code)]

//! Persistence codec: [`LayoutSnapshot`] <-> JSON under (owner, breakpoint).
//!
//! `save` propagates every failure. `load` never fails: a missing value,
//! a backend error, undecodable JSON, or a snapshot at another schema
//! version all come back as `None` (logged at `warn` except absence), and
//! the caller falls back to its current or default layout.

use dockgrid_layout::{LAYOUT_SCHEMA_VERSION, LayoutSnapshot};

use crate::storage::{StorageBackend, StorageKey, StorageResult};

/// Snapshot codec over an injected [`StorageBackend`].
pub struct LayoutStore {
    backend: Box<dyn StorageBackend>,
}

impl std::fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl LayoutStore {
    #[must_use]
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    #[must_use]
    pub fn from_boxed(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Serialize and store `snapshot`, replacing any prior value for the key.
    pub fn save(&self, owner: &str, breakpoint: &str, snapshot: &LayoutSnapshot) -> StorageResult<()> {
        let key = StorageKey::new(owner, breakpoint);
        let _span = tracing::debug_span!(
            target: "dockgrid.store",
            "store.save",
            key = %key,
            items = snapshot.items.len()
        )
        .entered();

        let json = serde_json::to_string(snapshot)?;
        self.backend.write(&key, &json).inspect_err(|error| {
            tracing::warn!(
                target: "dockgrid.store",
                backend = self.backend.name(),
                %error,
                "snapshot save failed"
            );
        })?;
        tracing::debug!(target: "dockgrid.store", bytes = json.len(), "snapshot saved");
        Ok(())
    }

    /// Stored snapshot for the key, or `None` when absent or unusable.
    #[must_use]
    pub fn load(&self, owner: &str, breakpoint: &str) -> Option<LayoutSnapshot> {
        let key = StorageKey::new(owner, breakpoint);
        let raw = match self.backend.read(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(target: "dockgrid.store", key = %key, "no stored snapshot");
                return None;
            }
            Err(error) => {
                tracing::warn!(
                    target: "dockgrid.store",
                    key = %key,
                    backend = self.backend.name(),
                    %error,
                    "snapshot read failed"
                );
                return None;
            }
        };

        let snapshot: LayoutSnapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(target: "dockgrid.store", key = %key, %error, "stored snapshot is corrupt");
                return None;
            }
        };

        if snapshot.version != LAYOUT_SCHEMA_VERSION {
            tracing::warn!(
                target: "dockgrid.store",
                key = %key,
                found = snapshot.version,
                expected = LAYOUT_SCHEMA_VERSION,
                "stored snapshot has unsupported version"
            );
            return None;
        }

        tracing::debug!(
            target: "dockgrid.store",
            key = %key,
            items = snapshot.items.len(),
            "snapshot loaded"
        );
        Some(snapshot)
    }

    /// Delete the stored snapshot. Returns whether one existed.
    pub fn remove(&self, owner: &str, breakpoint: &str) -> StorageResult<bool> {
        self.backend.remove(&StorageKey::new(owner, breakpoint))
    }
}
