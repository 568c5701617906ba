//! Checklist state and its persisted record.
//!
//! The checklist is a positional array of booleans, one per entry in
//! document order. It is persisted as a JSON array under a fixed key and
//! rewritten in full after every change.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::storage::RecordStore;

/// Key of the persisted checklist record.
pub const CHECKLIST_KEY: &str = "handbook-checklist";

/// Key of the record holding the checklist layout fingerprint.
pub const LAYOUT_KEY: &str = "handbook-checklist-layout";

/// In-memory checklist state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checklist {
    states: Vec<bool>,
}

impl Checklist {
    /// Create a checklist of `len` unchecked entries.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            states: vec![false; len],
        }
    }

    /// Create a checklist of `len` entries from saved states.
    ///
    /// Saved values beyond `len` are ignored; missing ones are unchecked.
    #[must_use]
    pub fn with_saved(len: usize, saved: &[bool]) -> Self {
        let mut states = vec![false; len];
        for (slot, checked) in states.iter_mut().zip(saved) {
            *slot = *checked;
        }
        Self { states }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the checklist has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Whether entry `index` is checked. Out-of-range entries are unchecked.
    #[must_use]
    pub fn is_checked(&self, index: usize) -> bool {
        self.states.get(index).copied().unwrap_or(false)
    }

    /// All entry states in order.
    #[must_use]
    pub fn states(&self) -> &[bool] {
        &self.states
    }

    /// Number of checked entries.
    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.states.iter().filter(|checked| **checked).count()
    }

    /// Set entry `index`.
    ///
    /// Returns `None` if the index is out of range, otherwise whether the
    /// state actually changed.
    pub fn set(&mut self, index: usize, checked: bool) -> Option<bool> {
        let slot = self.states.get_mut(index)?;
        let changed = *slot != checked;
        *slot = checked;
        Some(changed)
    }

    /// Flip entry `index`, returning its new state.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let slot = self.states.get_mut(index)?;
        *slot = !*slot;
        Some(*slot)
    }
}

/// Serialize checklist states as the persisted record value.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_record(states: &[bool]) -> Result<String> {
    Ok(serde_json::to_string(states)?)
}

/// Parse a persisted record value.
///
/// Anything other than a JSON array of booleans yields `None`.
#[must_use]
pub fn decode_record(raw: &str) -> Option<Vec<bool>> {
    serde_json::from_str(raw).ok()
}

/// The storage scope of a handbook file: its canonical path.
///
/// # Errors
///
/// Returns an error if the path cannot be resolved.
pub fn scope_for_path(path: &Path) -> Result<String> {
    let canonical = path
        .canonicalize()
        .map_err(|source| Error::DocumentRead {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(canonical.to_string_lossy().into_owned())
}

/// Reads and writes one handbook's checklist record.
///
/// Failures while loading or saving are logged and swallowed: the
/// in-memory checklist stays authoritative for the session.
#[derive(Debug)]
pub struct ChecklistStore<S> {
    store: S,
    scope: String,
}

impl<S: RecordStore> ChecklistStore<S> {
    /// Create a checklist store for `scope`.
    pub fn new(store: S, scope: impl Into<String>) -> Self {
        Self {
            store,
            scope: scope.into(),
        }
    }

    /// The storage scope (the handbook's canonical path).
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The underlying record store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the saved states, if a well-formed record exists.
    #[must_use]
    pub fn load(&self) -> Option<Vec<bool>> {
        let raw = match self.store.read_record(&self.scope, CHECKLIST_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(scope = %self.scope, "No saved checklist");
                return None;
            }
            Err(e) => {
                warn!(error = %e, scope = %self.scope, "Failed to read saved checklist");
                return None;
            }
        };

        let states = decode_record(&raw);
        if states.is_none() {
            warn!(scope = %self.scope, "Ignoring malformed saved checklist");
        }
        states
    }

    /// Overwrite the saved record with `states`.
    pub fn save(&self, states: &[bool]) {
        let result = encode_record(states)
            .and_then(|value| self.store.write_record(&self.scope, CHECKLIST_KEY, &value));
        match result {
            Ok(()) => debug!(scope = %self.scope, entries = states.len(), "Saved checklist"),
            Err(e) => warn!(error = %e, scope = %self.scope, "Failed to save checklist"),
        }
    }

    /// The layout fingerprint stored alongside the checklist, if any.
    #[must_use]
    pub fn saved_layout(&self) -> Option<String> {
        match self.store.read_record(&self.scope, LAYOUT_KEY) {
            Ok(layout) => layout,
            Err(e) => {
                warn!(error = %e, scope = %self.scope, "Failed to read checklist layout");
                None
            }
        }
    }

    /// Record the layout fingerprint of the current document.
    pub fn save_layout(&self, fingerprint: &str) {
        if let Err(e) = self.store.write_record(&self.scope, LAYOUT_KEY, fingerprint) {
            warn!(error = %e, scope = %self.scope, "Failed to save checklist layout");
        }
    }

    /// Delete the saved checklist and layout.
    ///
    /// Returns `true` if a checklist record existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn reset(&self) -> Result<bool> {
        let existed = self.store.delete_record(&self.scope, CHECKLIST_KEY)?;
        self.store.delete_record(&self.scope, LAYOUT_KEY)?;
        Ok(existed)
    }
}
