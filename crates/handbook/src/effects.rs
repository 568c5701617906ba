//! Timed cosmetic effects.
//!
//! Transient presentation (the settle tag on a page just left, a "copied"
//! label, a checkmark glyph) is undone at a deadline. The queue holds one
//! deadline per [`EffectKey`]; scheduling a key that is already pending
//! replaces its deadline, so a superseded cleanup never runs early.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::trace;

/// Identity of a pending cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EffectKey {
    /// Clear every page's "previous" tag.
    ClearPreviousTags,
    /// Restore the original text of a copy field.
    RestoreCopyLabel(usize),
    /// Remove the checkmark glyph beside a checklist entry.
    RemoveCheckmark(usize),
    /// Clear the status line.
    ClearStatus,
}

/// Pending cleanups ordered by deadline.
#[derive(Debug, Clone, Default)]
pub struct EffectQueue {
    deadlines: BTreeMap<EffectKey, Instant>,
}

impl EffectQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `key` to fire at `at`.
    ///
    /// Returns `true` if this replaced a pending deadline for the same key.
    pub fn schedule(&mut self, key: EffectKey, at: Instant) -> bool {
        let superseded = self.deadlines.insert(key, at).is_some();
        if superseded {
            trace!(?key, "Superseded pending effect");
        }
        superseded
    }

    /// Drop a pending deadline. Returns `true` if one existed.
    pub fn cancel(&mut self, key: EffectKey) -> bool {
        self.deadlines.remove(&key).is_some()
    }

    /// Whether `key` has a pending deadline.
    #[must_use]
    pub fn is_pending(&self, key: EffectKey) -> bool {
        self.deadlines.contains_key(&key)
    }

    /// Number of pending deadlines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// The earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Remove and return every key whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<EffectKey> {
        let mut due: Vec<(Instant, EffectKey)> = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(key, at)| (*at, *key))
            .collect();
        due.sort();

        for (_, key) in &due {
            self.deadlines.remove(key);
        }
        due.into_iter().map(|(_, key)| key).collect()
    }
}
