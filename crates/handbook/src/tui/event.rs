//! Event handling for the reader.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, MouseButton, MouseEventKind};
use tracing::trace;

use super::ui::{HitMap, Target};
use crate::controller::HandbookController;
use crate::input::{map_key, Action, Gesture, SwipeTracker};
use crate::storage::RecordStore;

/// Rows scrolled per mouse wheel notch.
const WHEEL_ROWS: isize = 3;

/// Poll for events with timeout
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Route one terminal event to the controller.
pub fn handle_event<S: RecordStore>(
    controller: &mut HandbookController<S>,
    tracker: &mut SwipeTracker,
    hits: &HitMap,
    event: Event,
    now: Instant,
) -> ControlFlow<()> {
    match event {
        Event::Key(key) => {
            if let Some(action) = map_key(key) {
                return controller.handle(action, now);
            }
        }
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => tracker.begin(mouse.column, mouse.row),
            MouseEventKind::Up(MouseButton::Left) => {
                match tracker.end(mouse.column, mouse.row) {
                    Gesture::Swipe(swipe) => return controller.handle(swipe.action(), now),
                    Gesture::Click { column, row } => {
                        if let Some(target) = hits.hit(column, row) {
                            click(controller, target, now);
                        }
                    }
                    Gesture::Ignored => {}
                }
            }
            MouseEventKind::ScrollUp => {
                return controller.handle(Action::ScrollLines(-WHEEL_ROWS), now);
            }
            MouseEventKind::ScrollDown => {
                return controller.handle(Action::ScrollLines(WHEEL_ROWS), now);
            }
            _ => {}
        },
        Event::Resize(width, height) => trace!(width, height, "Terminal resized"),
        _ => {}
    }
    ControlFlow::Continue(())
}

fn click<S: RecordStore>(controller: &mut HandbookController<S>, target: Target, now: Instant) {
    match target {
        Target::Element(element) => {
            controller.activate_element(element, now);
        }
        Target::Previous => {
            controller.go_to_previous(now);
        }
        Target::Next => {
            controller.go_to_next(now);
        }
    }
}
