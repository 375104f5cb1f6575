//! The working set of article IDs shared between the session and its
//! background operations.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct SelectionState {
    /// Every ID produced by the last fetch, refresh, or load, in store order.
    known: Vec<String>,
    selected: HashSet<String>,
}

/// Cheaply clonable handle to the current selection.
///
/// Clones share state. The lock is held only for the duration of each
/// method call, never across an await.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    inner: Arc<Mutex<SelectionState>>,
}

impl Selection {
    fn state(&self) -> MutexGuard<'_, SelectionState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace both the known articles and the selection with `ids`.
    pub fn reset(&self, ids: Vec<String>) {
        let mut state = self.state();
        state.selected = ids.iter().cloned().collect();
        state.known = ids;
    }

    /// Narrow the selection; known articles are left alone.
    pub fn select(&self, ids: HashSet<String>) {
        self.state().selected = ids;
    }

    pub fn selected(&self) -> HashSet<String> {
        self.state().selected.clone()
    }

    pub fn known(&self) -> Vec<String> {
        self.state().known.clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state().selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.state().selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
