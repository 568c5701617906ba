//! Platform capabilities: clipboard, printer and page-turn tone.
//!
//! Each capability is a small trait so the controller can run against the
//! real system or against recording doubles. A failing capability is never
//! fatal; callers log and carry on.

mod clipboard;
mod print;
mod tone;

use std::fmt;

pub use clipboard::SystemClipboard;
pub use print::SystemPrinter;
pub use tone::{Silent, TerminalBell, Tone};

use crate::config::Config;
use crate::error::Result;

/// Write-only access to a clipboard.
pub trait ClipboardSink {
    /// Replace the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the clipboard is unavailable or rejects the write.
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// How far a print request got when [`PrintSink::print`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintJob {
    /// The document was printed.
    Done,
    /// The job is running; its result arrives through [`PrintSink::finished`].
    Pending,
}

/// Something that can print a plain-text document.
pub trait PrintSink {
    /// Start printing `document`. Must not wait for a slow spooler.
    ///
    /// # Errors
    ///
    /// Returns an error if printing could not be started or failed.
    fn print(&mut self, document: &str) -> Result<PrintJob>;

    /// The result of a pending job that has completed since the last call.
    fn finished(&mut self) -> Option<Result<()>> {
        None
    }
}

/// Plays the page-turn cue.
pub trait ToneSink {
    /// Play `tone` without blocking for its duration.
    ///
    /// # Errors
    ///
    /// Returns an error if audio output is unavailable.
    fn play(&mut self, tone: &Tone) -> Result<()>;
}

/// The capabilities a controller may use.
pub struct Capabilities {
    /// Clipboard used by copy fields.
    pub clipboard: Box<dyn ClipboardSink>,
    /// Printer used by the print shortcut.
    pub printer: Box<dyn PrintSink>,
    /// Sink for the page-turn cue.
    pub tone: Box<dyn ToneSink>,
}

impl Capabilities {
    /// The real system capabilities, as configured.
    #[must_use]
    pub fn system(config: &Config) -> Self {
        let tone: Box<dyn ToneSink> = if config.feedback.sound_enabled {
            Box::new(TerminalBell::new())
        } else {
            Box::new(Silent)
        };
        Self {
            clipboard: Box::new(SystemClipboard),
            printer: Box::new(SystemPrinter::new(
                config.print.command.clone(),
                config.print.args.clone(),
            )),
            tone,
        }
    }

    /// Capabilities that report themselves unavailable, with a silent tone.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            clipboard: Box::new(Unavailable),
            printer: Box::new(Unavailable),
            tone: Box::new(Silent),
        }
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

/// A clipboard and printer that always fail as unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl ClipboardSink for Unavailable {
    fn set_text(&mut self, _text: &str) -> Result<()> {
        Err(crate::Error::unsupported("clipboard", "disabled"))
    }
}

impl PrintSink for Unavailable {
    fn print(&mut self, _document: &str) -> Result<PrintJob> {
        Err(crate::Error::unsupported("printing", "disabled"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_is_unsupported() {
        let mut caps = Capabilities::unavailable();

        assert!(caps.clipboard.set_text("JL 123").unwrap_err().is_unsupported());
        assert!(caps.printer.print("page").unwrap_err().is_unsupported());
        assert!(caps.tone.play(&Tone::page_turn()).is_ok());
    }

    #[test]
    fn test_capabilities_debug() {
        let caps = Capabilities::unavailable();
        assert!(format!("{caps:?}").starts_with("Capabilities"));
    }
}
