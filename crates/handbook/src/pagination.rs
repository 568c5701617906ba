//! Page navigation state machine.
//!
//! [`Pager`] holds nothing but the current index and the page count. Every
//! successful move returns a [`Transition`]; presentation (the outgoing
//! page's settle tag, the page-turn cue) is the controller's business.

use tracing::{debug, trace};

/// A successful move between two distinct pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Page that was active before the move.
    pub from: usize,
    /// Page that is active after the move.
    pub to: usize,
}

/// Derived navigation controls for the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    /// The previous control is disabled (first page).
    pub prev_disabled: bool,
    /// The next control is disabled (last page).
    pub next_disabled: bool,
    /// 1-based number of the current page.
    pub current_number: usize,
    /// Total number of pages.
    pub total: usize,
}

/// Current position in a fixed sequence of pages.
///
/// Invariant: `current < total`, and `total >= 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    current: usize,
    total: usize,
}

impl Pager {
    /// Create a pager on the first of `total` pages.
    ///
    /// Returns `None` if `total` is zero.
    #[must_use]
    pub fn new(total: usize) -> Option<Self> {
        (total > 0).then_some(Self { current: 0, total })
    }

    /// Index of the active page.
    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Number of pages.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether the active page is the first one.
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    /// Whether the active page is the last one.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current == self.total - 1
    }

    /// Move back one page. No-op on the first page.
    pub fn go_to_previous(&mut self) -> Option<Transition> {
        if self.is_first() {
            trace!("Already on the first page");
            return None;
        }
        self.go_to_page(self.current - 1)
    }

    /// Move forward one page. No-op on the last page.
    pub fn go_to_next(&mut self) -> Option<Transition> {
        if self.is_last() {
            trace!("Already on the last page");
            return None;
        }
        self.go_to_page(self.current + 1)
    }

    /// Jump to page `index`.
    ///
    /// Out-of-range targets and the current page leave the state unchanged.
    pub fn go_to_page(&mut self, index: usize) -> Option<Transition> {
        if index >= self.total {
            debug!(index, total = self.total, "Ignoring out-of-range page");
            return None;
        }
        if index == self.current {
            return None;
        }

        let transition = Transition {
            from: self.current,
            to: index,
        };
        self.current = index;
        debug!(from = transition.from, to = transition.to, "Page turned");
        Some(transition)
    }

    /// Navigation controls derived from the current position.
    #[must_use]
    pub fn nav_state(&self) -> NavState {
        NavState {
            prev_disabled: self.is_first(),
            next_disabled: self.is_last(),
            current_number: self.current + 1,
            total: self.total,
        }
    }
}
