//! System clipboard through `clipboard-rs`.

use clipboard_rs::{Clipboard, ClipboardContext};
use tracing::trace;

use super::ClipboardSink;
use crate::error::{Error, Result};

/// The platform clipboard.
///
/// A context is opened per write, so a clipboard that appears or vanishes
/// during a session (an X server restart, a detached SSH session) is picked
/// up on the next copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let ctx = ClipboardContext::new()
            .map_err(|e| Error::unsupported("clipboard", e.to_string()))?;
        ctx.set_text(text.to_string())
            .map_err(|e| Error::unsupported("clipboard", e.to_string()))?;
        trace!(len = text.len(), "Wrote clipboard");
        Ok(())
    }
}
