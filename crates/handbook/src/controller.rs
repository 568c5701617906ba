//! The handbook controller.
//!
//! [`HandbookController`] owns one open handbook: the page state machine,
//! the checklist and its persisted record, transient presentation state and
//! the platform capabilities. Every operation takes the current instant so
//! timed effects are deterministic under test; the terminal loop passes
//! `Instant::now()`.

use std::collections::BTreeSet;
use std::ops::{ControlFlow, Range};
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::checklist::{Checklist, ChecklistStore};
use crate::config::Config;
use crate::document::{Block, Handbook, Inline};
use crate::effects::{EffectKey, EffectQueue};
use crate::error::{Error, Result};
use crate::input::Action;
use crate::pagination::{NavState, Pager, Transition};
use crate::platform::{Capabilities, PrintJob, Tone};
use crate::storage::RecordStore;

/// How long a status message stays on screen.
const STATUS_DURATION: Duration = Duration::from_secs(3);

/// Viewport height assumed until the first draw reports the real one.
const DEFAULT_VIEWPORT_ROWS: usize = 10;

/// Presentation timings and labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// How long the outgoing page keeps its "previous" tag.
    pub settle: Duration,
    /// Text shown in place of a copy field after a successful copy.
    pub copied_label: String,
    /// How long the copied label stays.
    pub copied_label_duration: Duration,
    /// How long a checkmark glyph stays beside a newly checked entry.
    pub checkmark_duration: Duration,
}

impl Settings {
    /// Settings taken from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            settle: config.settle_duration(),
            copied_label: config.feedback.copied_label.clone(),
            copied_label_duration: config.copied_label_duration(),
            checkmark_duration: config.checkmark_duration(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// An interactive element on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focusable {
    /// A checklist entry, by document-wide index.
    Entry(usize),
    /// A copy field, by document-wide id.
    CopyField(usize),
}

/// Owns the state of one open handbook.
#[derive(Debug)]
pub struct HandbookController<S> {
    handbook: Handbook,
    layout: String,
    pager: Pager,
    checklist: Checklist,
    store: ChecklistStore<S>,
    capabilities: Capabilities,
    settings: Settings,
    effects: EffectQueue,
    previous_tags: BTreeSet<usize>,
    copied: BTreeSet<usize>,
    checkmarks: BTreeSet<usize>,
    focus: Option<Focusable>,
    reveal_focus: bool,
    scroll: Vec<usize>,
    viewport_rows: usize,
    status: Option<String>,
}

impl<S: RecordStore> HandbookController<S> {
    /// Open `handbook` and replay its saved checklist.
    ///
    /// Each saved checked entry goes through the same path as a live check,
    /// so it gets its checkmark glyph and the record is rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDocument`] if the handbook has no pages.
    pub fn new(
        handbook: Handbook,
        store: ChecklistStore<S>,
        capabilities: Capabilities,
        settings: Settings,
        now: Instant,
    ) -> Result<Self> {
        let pager = Pager::new(handbook.page_count()).ok_or(Error::EmptyDocument)?;
        let checklist = Checklist::new(handbook.entries().len());
        let layout = handbook.layout_fingerprint();
        let scroll = vec![0; handbook.page_count()];

        let mut controller = Self {
            handbook,
            layout,
            pager,
            checklist,
            store,
            capabilities,
            settings,
            effects: EffectQueue::new(),
            previous_tags: BTreeSet::new(),
            copied: BTreeSet::new(),
            checkmarks: BTreeSet::new(),
            focus: None,
            reveal_focus: false,
            scroll,
            viewport_rows: DEFAULT_VIEWPORT_ROWS,
            status: None,
        };
        controller.restore(now);
        Ok(controller)
    }

    fn restore(&mut self, now: Instant) {
        let Some(saved) = self.store.load() else {
            return;
        };

        if let Some(previous) = self.store.saved_layout() {
            if previous != self.layout {
                warn!(
                    scope = %self.store.scope(),
                    "Checklist entries changed since the state was saved; applying it by position"
                );
            }
        }
        if saved.len() != self.checklist.len() {
            debug!(
                saved = saved.len(),
                entries = self.checklist.len(),
                "Saved checklist length differs from document"
            );
        }

        let checked: Vec<usize> = saved
            .iter()
            .take(self.checklist.len())
            .enumerate()
            .filter_map(|(index, checked)| checked.then_some(index))
            .collect();
        for &index in &checked {
            self.set_entry(index, true, now);
        }
        info!(
            scope = %self.store.scope(),
            restored = checked.len(),
            "Restored checklist"
        );
    }

    // === Navigation ===

    /// Turn back one page, with the page-turn cue.
    pub fn go_to_previous(&mut self, now: Instant) -> Option<Transition> {
        let transition = self.pager.go_to_previous()?;
        self.after_transition(transition, true, now);
        Some(transition)
    }

    /// Turn forward one page, with the page-turn cue.
    pub fn go_to_next(&mut self, now: Instant) -> Option<Transition> {
        let transition = self.pager.go_to_next()?;
        self.after_transition(transition, true, now);
        Some(transition)
    }

    /// Jump to page `index` without the cue. Out-of-range targets are ignored.
    pub fn go_to_page(&mut self, index: usize, now: Instant) -> Option<Transition> {
        let transition = self.pager.go_to_page(index)?;
        self.after_transition(transition, false, now);
        Some(transition)
    }

    fn after_transition(&mut self, transition: Transition, cue: bool, now: Instant) {
        self.previous_tags.insert(transition.from);
        self.effects
            .schedule(EffectKey::ClearPreviousTags, now + self.settings.settle);
        self.focus = None;

        if cue {
            if let Err(e) = self.capabilities.tone.play(&Tone::page_turn()) {
                debug!(error = %e, "Page-turn cue failed");
            }
        }
        debug!(from = transition.from, to = transition.to, "Turned page");
    }

    // === Checklist ===

    /// Set entry `index`.
    ///
    /// Returns `None` for an unknown entry, otherwise whether the state
    /// changed. Side effects run only on a change.
    pub fn set_entry(&mut self, index: usize, checked: bool, now: Instant) -> Option<bool> {
        let changed = self.checklist.set(index, checked)?;
        if changed {
            self.after_entry_change(index, checked, now);
        }
        Some(changed)
    }

    /// Flip entry `index`, returning its new state.
    pub fn toggle_entry(&mut self, index: usize, now: Instant) -> Option<bool> {
        let checked = self.checklist.toggle(index)?;
        self.after_entry_change(index, checked, now);
        Some(checked)
    }

    fn after_entry_change(&mut self, index: usize, checked: bool, now: Instant) {
        if checked {
            self.checkmarks.insert(index);
            self.effects.schedule(
                EffectKey::RemoveCheckmark(index),
                now + self.settings.checkmark_duration,
            );
        }
        debug!(index, checked, "Checklist entry changed");
        self.persist();
    }

    fn persist(&self) {
        self.store.save(self.checklist.states());
        self.store.save_layout(&self.layout);
    }

    // === Copy fields ===

    /// Copy field `id` to the clipboard.
    ///
    /// On success the field shows the copied label until its window ends;
    /// copying again restarts the window. Failures are logged and return
    /// `false`.
    pub fn copy_field(&mut self, id: usize, now: Instant) -> bool {
        let Some(field) = self.handbook.copy_field(id) else {
            return false;
        };
        match self.capabilities.clipboard.set_text(&field.text) {
            Ok(()) => {
                self.copied.insert(id);
                self.effects.schedule(
                    EffectKey::RestoreCopyLabel(id),
                    now + self.settings.copied_label_duration,
                );
                debug!(id, "Copied field");
                true
            }
            Err(e) => {
                debug!(error = %e, id, "Copy failed");
                false
            }
        }
    }

    // === Printing ===

    /// Print the whole handbook with the current checklist marks.
    ///
    /// The outcome is reported in the status line; failures are not errors.
    /// A spooler that takes a while reports back through [`tick`](Self::tick).
    pub fn print(&mut self, now: Instant) -> bool {
        let document = self.handbook.render_plain(self.checklist.states());
        match self.capabilities.printer.print(&document) {
            Ok(PrintJob::Done) => self.report_print(Ok(()), now),
            Ok(PrintJob::Pending) => {
                debug!("Print job started");
                self.set_status("Printing...", now);
                true
            }
            Err(e) => self.report_print(Err(e), now),
        }
    }

    fn report_print(&mut self, result: Result<()>, now: Instant) -> bool {
        match result {
            Ok(()) => {
                self.set_status("Sent to printer", now);
                true
            }
            Err(e) => {
                warn!(error = %e, "Print failed");
                self.set_status(format!("Print failed: {e}"), now);
                false
            }
        }
    }

    fn set_status(&mut self, message: impl Into<String>, now: Instant) {
        self.status = Some(message.into());
        self.effects
            .schedule(EffectKey::ClearStatus, now + STATUS_DURATION);
    }

    // === Focus ===

    /// Interactive elements of the current page, in reading order.
    #[must_use]
    pub fn focusables(&self) -> Vec<Focusable> {
        let mut items = Vec::new();
        let Some(page) = self.handbook.page(self.pager.current()) else {
            return items;
        };
        for block in &page.blocks {
            let inlines = match block {
                Block::Blank => continue,
                Block::Text(inlines) => inlines,
                Block::Entry { index, label } => {
                    items.push(Focusable::Entry(*index));
                    label
                }
            };
            items.extend(inlines.iter().filter_map(|inline| match inline {
                Inline::Copy { id, .. } => Some(Focusable::CopyField(*id)),
                Inline::Plain(_) => None,
            }));
        }
        items
    }

    /// Move focus forward or backward, wrapping around the page.
    pub fn move_focus(&mut self, forward: bool) {
        let items = self.focusables();
        if items.is_empty() {
            self.focus = None;
            return;
        }
        let len = items.len();
        let position = self
            .focus
            .and_then(|focus| items.iter().position(|item| *item == focus));
        let next = match (position, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(p), true) => (p + 1) % len,
            (Some(p), false) => (p + len - 1) % len,
        };
        self.focus = Some(items[next]);
        self.reveal_focus = true;
    }

    /// Activate the focused element. Returns `false` if nothing happened.
    pub fn activate(&mut self, now: Instant) -> bool {
        match self.focus {
            Some(target) => self.activate_element(target, now),
            None => false,
        }
    }

    /// Focus and activate `target`, as a click does.
    pub fn activate_element(&mut self, target: Focusable, now: Instant) -> bool {
        self.focus = Some(target);
        self.reveal_focus = true;
        match target {
            Focusable::Entry(index) => self.toggle_entry(index, now).is_some(),
            Focusable::CopyField(id) => self.copy_field(id, now),
        }
    }

    // === Scrolling ===

    /// Scroll offset of the active page, in screen rows.
    #[must_use]
    pub fn scroll_offset(&self) -> usize {
        self.scroll.get(self.pager.current()).copied().unwrap_or(0)
    }

    /// Scroll the active page by `rows`; negative scrolls up.
    ///
    /// The bottom limit depends on the screen, so it is applied by
    /// [`fit_scroll`](Self::fit_scroll) at the next draw.
    pub fn scroll_lines(&mut self, rows: isize) {
        if let Some(offset) = self.scroll.get_mut(self.pager.current()) {
            *offset = offset.saturating_add_signed(rows);
            trace!(offset = *offset, "Scrolled");
        }
    }

    /// Scroll the active page by whole screens, keeping one row of context.
    pub fn scroll_pages(&mut self, pages: isize) {
        let step = isize::try_from(self.viewport_rows.saturating_sub(1).max(1)).unwrap_or(1);
        self.scroll_lines(pages.saturating_mul(step));
    }

    /// Fit the active page's scroll offset to a viewport of `height` rows
    /// over `total` rows of content and return it.
    ///
    /// `focused` is the row range of the focused element. Right after focus
    /// moves, the offset shifts just enough to show it.
    pub fn fit_scroll(
        &mut self,
        total: usize,
        height: usize,
        focused: Option<Range<usize>>,
    ) -> usize {
        self.viewport_rows = height.max(1);
        let reveal = std::mem::take(&mut self.reveal_focus);
        let Some(offset) = self.scroll.get_mut(self.pager.current()) else {
            return 0;
        };

        if let (true, Some(rows)) = (reveal, focused) {
            if rows.start < *offset {
                *offset = rows.start;
            } else if rows.end > *offset + height {
                *offset = rows.end.saturating_sub(height).min(rows.start);
            }
        }
        *offset = (*offset).min(total.saturating_sub(height));
        *offset
    }

    // === Input and time ===

    /// Apply an input action.
    pub fn handle(&mut self, action: Action, now: Instant) -> ControlFlow<()> {
        match action {
            Action::PreviousPage => {
                self.go_to_previous(now);
            }
            Action::NextPage => {
                self.go_to_next(now);
            }
            Action::GoToPage(index) => {
                self.go_to_page(index, now);
            }
            Action::LastPage => {
                self.go_to_page(self.pager.total() - 1, now);
            }
            Action::FocusNext => self.move_focus(true),
            Action::FocusPrevious => self.move_focus(false),
            Action::Activate => {
                self.activate(now);
            }
            Action::ScrollLines(rows) => self.scroll_lines(rows),
            Action::ScrollPages(pages) => self.scroll_pages(pages),
            Action::Print => {
                self.print(now);
            }
            Action::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Run every cleanup that is due and collect finished print jobs.
    /// Returns `true` if anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        while let Some(result) = self.capabilities.printer.finished() {
            self.report_print(result, now);
            changed = true;
        }

        let due = self.effects.take_due(now);
        for key in &due {
            match *key {
                EffectKey::ClearPreviousTags => self.previous_tags.clear(),
                EffectKey::RestoreCopyLabel(id) => {
                    self.copied.remove(&id);
                }
                EffectKey::RemoveCheckmark(index) => {
                    self.checkmarks.remove(&index);
                }
                EffectKey::ClearStatus => self.status = None,
            }
        }
        changed || !due.is_empty()
    }

    /// When the next cleanup is due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.effects.next_deadline()
    }

    // === Accessors ===

    /// The open handbook.
    #[must_use]
    pub fn handbook(&self) -> &Handbook {
        &self.handbook
    }

    /// Index of the active page.
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.pager.current()
    }

    /// Navigation controls for the active page.
    #[must_use]
    pub fn nav_state(&self) -> NavState {
        self.pager.nav_state()
    }

    /// The in-memory checklist.
    #[must_use]
    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    /// The checklist record store.
    #[must_use]
    pub fn store(&self) -> &ChecklistStore<S> {
        &self.store
    }

    /// Presentation settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether `page` carries the transient "previous" tag.
    #[must_use]
    pub fn is_previous_tagged(&self, page: usize) -> bool {
        self.previous_tags.contains(&page)
    }

    /// Whether a page turn is still settling.
    #[must_use]
    pub fn is_settling(&self) -> bool {
        !self.previous_tags.is_empty()
    }

    /// Whether copy field `id` is showing the copied label.
    #[must_use]
    pub fn is_showing_copied(&self, id: usize) -> bool {
        self.copied.contains(&id)
    }

    /// Whether entry `index` shows its transient checkmark glyph.
    #[must_use]
    pub fn has_checkmark(&self, index: usize) -> bool {
        self.checkmarks.contains(&index)
    }

    /// The focused element, if any.
    #[must_use]
    pub fn focus(&self) -> Option<Focusable> {
        self.focus
    }

    /// The current status message, if any.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}
