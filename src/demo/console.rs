//! Console
//!
//! Output sinks shared between the driver thread and the callbacks that the
//! non-blocking client runs on its own workers.

use parking_lot::Mutex;
use std::fmt::Display;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Result and error streams, plus a count of reported errors
#[derive(Clone)]
pub struct Console {
    out: Sink,
    err: Sink,
    errors: Arc<AtomicUsize>,
}

impl Console {
    pub fn new(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
            err: Arc::new(Mutex::new(Box::new(err))),
            errors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Standard output and standard error
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }

    /// Write one record to the result stream. The lock is held for the whole
    /// record so concurrent callbacks never interleave lines.
    pub fn record<F>(&self, render: F) -> io::Result<()>
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        let mut out = self.out.lock();
        render(&mut **out)?;
        out.flush()
    }

    pub fn line(&self, text: impl Display) -> io::Result<()> {
        self.record(|w| writeln!(w, "{}", text))
    }

    /// Report a failed call on the error stream. The log only gets a debug
    /// record, since logs share stderr with the error stream.
    pub fn report_error(&self, context: &str, err: &dyn Display) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        debug!(error = %err, "{}", context);

        let mut sink = self.err.lock();
        if let Err(e) = writeln!(sink, "{}{}", context, err).and_then(|_| sink.flush()) {
            warn!(error = %e, "Failed to write to error stream");
        }
    }

    /// Number of errors reported so far
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }
}

/// In-memory sink for capturing console output
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_errors_go_to_separate_streams() {
        let (out, err) = (SharedBuffer::new(), SharedBuffer::new());
        let console = Console::new(out.clone(), err.clone());

        console.line("hello").unwrap();
        console.report_error("There was an error getting completions.", &"boom");

        assert_eq!(out.contents(), "hello\n");
        assert_eq!(err.contents(), "There was an error getting completions.boom\n");
        assert_eq!(console.error_count(), 1);
    }

    #[test]
    fn test_reported_error_is_not_repeated_in_default_log() {
        let (err, log) = (SharedBuffer::new(), SharedBuffer::new());
        let console = Console::new(io::sink(), err.clone());

        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            console.report_error("There was an error getting chat completions.", &"boom");
        });

        assert_eq!(err.contents().matches("boom").count(), 1);
        assert!(log.contents().is_empty());
    }

    #[test]
    fn test_clones_share_sinks() {
        let out = SharedBuffer::new();
        let console = Console::new(out.clone(), io::sink());
        let other = console.clone();

        console.line("a").unwrap();
        other.line("b").unwrap();
        other.report_error("ctx", &"e");

        assert_eq!(out.contents(), "a\nb\n");
        assert_eq!(console.error_count(), 1);
    }
}
