//! Printing by piping text to a spooler command such as `lp`.
//!
//! The command is spawned on the caller's thread so a missing spooler is
//! reported at once. Feeding stdin and waiting for the exit status happen on
//! a worker thread; results come back through a channel drained by
//! [`PrintSink::finished`].

use std::io::{ErrorKind, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use tracing::{debug, info, warn};

use super::{PrintJob, PrintSink};
use crate::error::{Error, Result};

/// Sends documents to an external print command on its stdin.
#[derive(Debug)]
pub struct SystemPrinter {
    command: String,
    args: Vec<String>,
    results_tx: Sender<Result<()>>,
    results_rx: Receiver<Result<()>>,
}

impl SystemPrinter {
    /// Create a printer that runs `command` with `args`.
    #[must_use]
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        let (results_tx, results_rx) = mpsc::channel();
        Self {
            command: command.into(),
            args,
            results_tx,
            results_rx,
        }
    }

    /// The command this printer runs.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    fn spawn(&self) -> Result<Child> {
        debug!(command = %self.command, args = ?self.args, "Spawning print command");
        Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    Error::unsupported("printing", format!("'{}' not found", self.command))
                } else {
                    Error::print(&self.command, e.to_string())
                }
            })
    }
}

/// Feed `document` to the child and wait for it.
///
/// Stdin is written from its own thread while this one drains stderr, so a
/// command that reports errors before reading its input cannot stall us.
fn finish_job(command: &str, mut child: Child, document: String) -> Result<()> {
    let writer = child.stdin.take().map(|mut stdin| {
        thread::spawn(move || stdin.write_all(document.as_bytes()))
    });

    let output = child
        .wait_with_output()
        .map_err(|e| Error::print(command, e.to_string()))?;

    if let Some(writer) = writer {
        match writer.join() {
            Ok(Ok(())) => {}
            // The command exited without reading everything; its status says why.
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(Error::print(command, e.to_string())),
            Err(_) => return Err(Error::print(command, "stdin writer panicked")),
        }
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::print(
            command,
            format!("{}: {}", output.status, stderr.trim()),
        ));
    }
    Ok(())
}

impl PrintSink for SystemPrinter {
    fn print(&mut self, document: &str) -> Result<PrintJob> {
        let child = self.spawn()?;
        let command = self.command.clone();
        let document = document.to_string();
        let results = self.results_tx.clone();

        thread::spawn(move || {
            let bytes = document.len();
            let result = finish_job(&command, child, document);
            match &result {
                Ok(()) => info!(command = %command, bytes, "Sent handbook to printer"),
                Err(e) => warn!(error = %e, "Print command failed"),
            }
            // The printer may be gone if the reader quit first.
            let _ = results.send(result);
        });
        Ok(PrintJob::Pending)
    }

    fn finished(&mut self) -> Option<Result<()>> {
        match self.results_rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    /// Poll until the printer reports a result.
    fn wait_for(printer: &mut SystemPrinter) -> Result<()> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = printer.finished() {
                return result;
            }
            assert!(Instant::now() < deadline, "print job never finished");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_missing_command_is_unsupported() {
        let mut printer = SystemPrinter::new("handbook-no-such-spooler", Vec::new());

        let err = printer.print("page").unwrap_err();
        assert!(err.is_unsupported());
        assert!(printer.finished().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_pipes_document_to_command() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("printed.txt");
        let mut printer = SystemPrinter::new(
            "sh",
            vec!["-c".to_string(), format!("cat > '{}'", out.display())],
        );

        assert_eq!(printer.print("[1/1] Flights\n").unwrap(), PrintJob::Pending);
        wait_for(&mut printer).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "[1/1] Flights\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_is_print_error() {
        let mut printer = SystemPrinter::new("false", Vec::new());

        printer.print("page").unwrap();
        let err = wait_for(&mut printer).unwrap_err();
        assert!(matches!(err, Error::Print { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_slow_command_does_not_block_caller() {
        let mut printer = SystemPrinter::new(
            "sh",
            vec!["-c".to_string(), "cat >/dev/null; sleep 2".to_string()],
        );

        let started = Instant::now();
        printer.print("page").unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(printer.finished().is_none());
        wait_for(&mut printer).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_chatty_stderr_before_reading_input() {
        // Writes well past a pipe buffer to stderr before touching stdin.
        let mut printer = SystemPrinter::new(
            "sh",
            vec![
                "-c".to_string(),
                "head -c 200000 /dev/zero >&2; cat >/dev/null".to_string(),
            ],
        );

        let document = "x".repeat(200_000);
        printer.print(&document).unwrap();
        wait_for(&mut printer).unwrap();
    }
}
