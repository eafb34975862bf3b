//! Snapshot holder for the "current dataset" reference.
//!
//! Rather than a process-wide mutable table, the presentation adapter owns
//! a [`Session`]. A session holds at most one immutable
//! [`Dataset`] snapshot behind an `Arc`. Installing a new snapshot is an
//! atomic swap performed only after a successful load, so readers observe
//! either the previous snapshot or the fully-loaded new one, never a
//! half-updated state. A failed reload simply never calls [`Session::install`]
//! and the previous snapshot stays in place.
//!
//! Sessions are not shared: a server hosting several users gives each one
//! its own `Session`.

use std::sync::Arc;

use crate::Dataset;

/// Owns the current dataset snapshot for one adapter session
#[derive(Clone, Debug, Default)]
pub struct Session {
    current: Option<Arc<Dataset>>,
}

impl Session {
    /// A session with no dataset loaded yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session from an already-loaded snapshot
    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            current: Some(Arc::new(dataset)),
        }
    }

    /// Swap in a freshly loaded snapshot, returning the handle now current.
    ///
    /// Call this only after a load fully succeeded; on load failure the
    /// previous snapshot must remain in place.
    pub fn install(&mut self, dataset: Dataset) -> Arc<Dataset> {
        let snapshot = Arc::new(dataset);
        self.current = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Handle to the current snapshot, if any load has succeeded
    pub fn current(&self) -> Option<Arc<Dataset>> {
        self.current.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }
}
