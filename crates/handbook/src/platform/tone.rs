//! The page-turn cue.

use std::io::Write;
use std::time::Duration;

use tracing::trace;

use super::ToneSink;
use crate::error::Result;

/// A short tone with exponential frequency and gain ramps.
///
/// Frequency and gain at time `t` are `start * (end / start)^(t / duration)`.
/// Sinks that synthesise audio follow that curve; the terminal bell only
/// marks that a cue happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Frequency at the start, in hertz.
    pub start_hz: f64,
    /// Frequency at the end, in hertz.
    pub end_hz: f64,
    /// Gain at the start.
    pub start_gain: f64,
    /// Gain at the end.
    pub end_gain: f64,
    /// Length of the tone.
    pub duration: Duration,
}

impl Tone {
    /// The cue played on every previous/next page turn.
    #[must_use]
    pub fn page_turn() -> Self {
        Self {
            start_hz: 800.0,
            end_hz: 400.0,
            start_gain: 0.1,
            end_gain: 0.01,
            duration: Duration::from_millis(100),
        }
    }
}

/// Rings the terminal bell in place of synthesised audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl TerminalBell {
    /// Create a terminal bell sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ToneSink for TerminalBell {
    fn play(&mut self, tone: &Tone) -> Result<()> {
        trace!(start_hz = tone.start_hz, end_hz = tone.end_hz, "Ringing bell");
        let mut out = std::io::stdout();
        out.write_all(b"\x07")?;
        out.flush()?;
        Ok(())
    }
}

/// A tone sink that plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ToneSink for Silent {
    fn play(&mut self, _tone: &Tone) -> Result<()> {
        Ok(())
    }
}
