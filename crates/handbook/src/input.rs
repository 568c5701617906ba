//! Input adapters: key bindings and swipe gestures.
//!
//! Both map raw terminal input onto [`Action`]s for the controller. Neither
//! touches handbook state.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::trace;

/// Something the reader asked the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Turn back one page.
    PreviousPage,
    /// Turn forward one page.
    NextPage,
    /// Jump to a page index.
    GoToPage(usize),
    /// Jump to the last page.
    LastPage,
    /// Move focus to the next interactive element on the page.
    FocusNext,
    /// Move focus to the previous interactive element on the page.
    FocusPrevious,
    /// Activate the focused element.
    Activate,
    /// Scroll the page body by lines; negative scrolls up.
    ScrollLines(isize),
    /// Scroll the page body by screens; negative scrolls up.
    ScrollPages(isize),
    /// Send the handbook to the printer.
    Print,
    /// Leave the reader.
    Quit,
}

/// Map a key press to an action.
///
/// Key releases are ignored.
#[must_use]
pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let command = key.modifiers.intersects(
        KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META,
    );
    if command {
        return match key.code {
            KeyCode::Char('p' | 'P') => Some(Action::Print),
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    let action = match key.code {
        KeyCode::Left => Action::PreviousPage,
        KeyCode::Right => Action::NextPage,
        KeyCode::Up => Action::ScrollLines(-1),
        KeyCode::Down => Action::ScrollLines(1),
        KeyCode::PageUp => Action::ScrollPages(-1),
        KeyCode::PageDown => Action::ScrollPages(1),
        KeyCode::Home => Action::GoToPage(0),
        KeyCode::End => Action::LastPage,
        KeyCode::Char(c @ '1'..='9') => {
            Action::GoToPage(c.to_digit(10).map_or(0, |d| d as usize - 1))
        }
        KeyCode::Tab => Action::FocusNext,
        KeyCode::BackTab => Action::FocusPrevious,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Activate,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    trace!(?action, "Mapped key");
    Some(action)
}

/// Direction of a recognised swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Pointer moved left: show the next page.
    Left,
    /// Pointer moved right: show the previous page.
    Right,
}

impl Swipe {
    /// The navigation this swipe stands for.
    #[must_use]
    pub fn action(self) -> Action {
        match self {
            Self::Left => Action::NextPage,
            Self::Right => Action::PreviousPage,
        }
    }
}

/// Classify a gesture from its displacement.
///
/// `dx` and `dy` are start minus end, so a positive `dx` means the pointer
/// travelled left. Only a dominantly horizontal move longer than
/// `threshold` counts.
#[must_use]
pub fn classify_swipe(dx: i32, dy: i32, threshold: u16) -> Option<Swipe> {
    let horizontal = dx.unsigned_abs();
    if horizontal <= dy.unsigned_abs() || horizontal <= u32::from(threshold) {
        return None;
    }
    if dx > 0 {
        Some(Swipe::Left)
    } else {
        Some(Swipe::Right)
    }
}

/// How a finished pointer gesture should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// A horizontal swipe.
    Swipe(Swipe),
    /// Press and release on the same cell.
    Click {
        /// Column of the click.
        column: u16,
        /// Row of the click.
        row: u16,
    },
    /// Anything else.
    Ignored,
}

/// Tracks one pointer gesture from press to release.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: u16,
    start: Option<(u16, u16)>,
}

impl SwipeTracker {
    /// Create a tracker with the given swipe threshold.
    #[must_use]
    pub fn new(threshold: u16) -> Self {
        Self {
            threshold,
            start: None,
        }
    }

    /// Record where a gesture began.
    pub fn begin(&mut self, column: u16, row: u16) {
        self.start = Some((column, row));
    }

    /// Finish the gesture at the given position.
    ///
    /// A release with no recorded press is ignored.
    pub fn end(&mut self, column: u16, row: u16) -> Gesture {
        let Some((start_column, start_row)) = self.start.take() else {
            return Gesture::Ignored;
        };
        if (start_column, start_row) == (column, row) {
            return Gesture::Click { column, row };
        }

        let dx = i32::from(start_column) - i32::from(column);
        let dy = i32::from(start_row) - i32::from(row);
        match classify_swipe(dx, dy, self.threshold) {
            Some(swipe) => {
                trace!(dx, dy, ?swipe, "Swipe recognised");
                Gesture::Swipe(swipe)
            }
            None => {
                trace!(dx, dy, "Gesture ignored");
                Gesture::Ignored
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(map_key(press(KeyCode::Left)), Some(Action::PreviousPage));
        assert_eq!(map_key(press(KeyCode::Right)), Some(Action::NextPage));
    }

    #[test]
    fn test_scroll_keys() {
        assert_eq!(map_key(press(KeyCode::Up)), Some(Action::ScrollLines(-1)));
        assert_eq!(map_key(press(KeyCode::Down)), Some(Action::ScrollLines(1)));
        assert_eq!(map_key(press(KeyCode::PageUp)), Some(Action::ScrollPages(-1)));
        assert_eq!(map_key(press(KeyCode::PageDown)), Some(Action::ScrollPages(1)));
    }

    #[test]
    fn test_page_jumps() {
        assert_eq!(map_key(press(KeyCode::Home)), Some(Action::GoToPage(0)));
        assert_eq!(map_key(press(KeyCode::End)), Some(Action::LastPage));
        assert_eq!(map_key(press(KeyCode::Char('1'))), Some(Action::GoToPage(0)));
        assert_eq!(map_key(press(KeyCode::Char('9'))), Some(Action::GoToPage(8)));
        assert_eq!(map_key(press(KeyCode::Char('0'))), None);
    }

    #[test]
    fn test_print_shortcut() {
        let ctrl_p = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL);
        let super_p = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::SUPER);

        assert_eq!(map_key(ctrl_p), Some(Action::Print));
        assert_eq!(map_key(super_p), Some(Action::Print));
        assert_eq!(map_key(press(KeyCode::Char('p'))), None);
    }

    #[test]
    fn test_quit_keys() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

        assert_eq!(map_key(ctrl_c), Some(Action::Quit));
        assert_eq!(map_key(press(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(map_key(press(KeyCode::Esc)), Some(Action::Quit));
    }

    #[test]
    fn test_focus_and_activate() {
        assert_eq!(map_key(press(KeyCode::Tab)), Some(Action::FocusNext));
        assert_eq!(map_key(press(KeyCode::BackTab)), Some(Action::FocusPrevious));
        assert_eq!(map_key(press(KeyCode::Enter)), Some(Action::Activate));
        assert_eq!(map_key(press(KeyCode::Char(' '))), Some(Action::Activate));
    }

    #[test]
    fn test_release_is_ignored() {
        let mut key = press(KeyCode::Right);
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(key), None);
    }

    #[test]
    fn test_classify_swipe() {
        assert_eq!(classify_swipe(60, 10, 50), Some(Swipe::Left));
        assert_eq!(classify_swipe(-60, 10, 50), Some(Swipe::Right));
        assert_eq!(classify_swipe(40, 10, 50), None);
        assert_eq!(classify_swipe(60, 70, 50), None);
        assert_eq!(classify_swipe(50, 0, 50), None);
        assert_eq!(classify_swipe(60, -60, 50), None);
    }

    #[test]
    fn test_swipe_maps_to_navigation() {
        assert_eq!(Swipe::Left.action(), Action::NextPage);
        assert_eq!(Swipe::Right.action(), Action::PreviousPage);
    }

    #[test]
    fn test_tracker_swipe_left() {
        let mut tracker = SwipeTracker::new(50);
        tracker.begin(70, 10);

        assert_eq!(tracker.end(10, 5), Gesture::Swipe(Swipe::Left));
    }

    #[test]
    fn test_tracker_click() {
        let mut tracker = SwipeTracker::new(50);
        tracker.begin(4, 7);

        assert_eq!(tracker.end(4, 7), Gesture::Click { column: 4, row: 7 });
    }

    #[test]
    fn test_tracker_release_without_press() {
        let mut tracker = SwipeTracker::new(50);

        assert_eq!(tracker.end(4, 7), Gesture::Ignored);
        tracker.begin(0, 0);
        tracker.end(3, 0);
        assert_eq!(tracker.end(80, 0), Gesture::Ignored);
    }
}
