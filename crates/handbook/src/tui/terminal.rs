//! Terminal management and main run loop

use std::io::{self, Stdout};
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use super::event::{handle_event, poll_event};
use super::ui::{self, HitMap};
use crate::controller::HandbookController;
use crate::input::SwipeTracker;
use crate::storage::RecordStore;

/// Longest time the loop waits for input before redrawing.
const MAX_POLL: Duration = Duration::from_millis(100);

/// Initialize the terminal for TUI mode
///
/// A failure part way through undoes what was already switched on.
fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
        reset_terminal();
        return Err(e).context("Failed to enter alternate screen");
    }
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| {
        reset_terminal();
        anyhow::Error::new(e).context("Failed to create terminal")
    })
}

/// Best-effort return to a normal terminal, for error and panic paths.
fn reset_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

/// Leave raw mode and the alternate screen before a panic message prints.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        reset_terminal();
        original_hook(panic_info);
    }));
}

/// Restore the terminal to normal mode
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Run the reader until the user quits.
pub fn run<S: RecordStore>(
    controller: &mut HandbookController<S>,
    swipe_threshold: u16,
) -> Result<()> {
    install_panic_hook();
    let mut terminal = init_terminal()?;
    info!(pages = controller.handbook().page_count(), "Reader started");

    let result = run_loop(&mut terminal, controller, swipe_threshold);

    // Restore terminal (even if loop failed)
    restore_terminal(&mut terminal)?;
    info!("Reader closed");

    result
}

fn run_loop<S: RecordStore>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    controller: &mut HandbookController<S>,
    swipe_threshold: u16,
) -> Result<()> {
    let mut tracker = SwipeTracker::new(swipe_threshold);

    loop {
        let mut hits = HitMap::default();
        terminal.draw(|frame| hits = ui::render(frame, controller))?;

        let timeout = poll_timeout(controller.next_deadline(), Instant::now());
        if let Some(event) = poll_event(timeout)? {
            let flow = handle_event(controller, &mut tracker, &hits, event, Instant::now());
            if let ControlFlow::Break(()) = flow {
                break;
            }
        }

        controller.tick(Instant::now());
    }

    Ok(())
}

/// How long to wait for input: until the next effect is due, at most
/// [`MAX_POLL`].
fn poll_timeout(deadline: Option<Instant>, now: Instant) -> Duration {
    deadline.map_or(MAX_POLL, |at| at.saturating_duration_since(now).min(MAX_POLL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_hook_chains_to_previous() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let called = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&called);
        std::panic::set_hook(Box::new(move |_| seen.store(true, Ordering::SeqCst)));
        install_panic_hook();

        let result = std::panic::catch_unwind(|| panic!("reader crashed"));
        let _ = std::panic::take_hook();

        assert!(result.is_err());
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_poll_timeout() {
        let now = Instant::now();

        assert_eq!(poll_timeout(None, now), MAX_POLL);
        assert_eq!(
            poll_timeout(Some(now + Duration::from_millis(30)), now),
            Duration::from_millis(30)
        );
        assert_eq!(poll_timeout(Some(now + Duration::from_secs(2)), now), MAX_POLL);
        assert_eq!(poll_timeout(Some(now), now + Duration::from_millis(5)), Duration::ZERO);
    }
}
