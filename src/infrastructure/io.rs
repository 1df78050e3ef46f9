//! Console I/O: output streams, decoration and verbosity
//!
//! Outputs are cheap to clone; clones share the underlying writer so log
//! handlers and commands write to the same stream in order.

use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Output verbosity, ordered from least to most chatty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    VeryVerbose,
    Debug,
}

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// A shareable, line-oriented output stream.
#[derive(Clone)]
pub struct Output {
    sink: Sink,
    decorated: bool,
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("decorated", &self.decorated)
            .finish_non_exhaustive()
    }
}

impl Output {
    pub fn new(writer: Box<dyn Write + Send>, decorated: bool) -> Self {
        Self {
            sink: Arc::new(Mutex::new(writer)),
            decorated,
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()), io::stdout().is_terminal())
    }

    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()), io::stderr().is_terminal())
    }

    /// In-memory output (undecorated) plus a handle to read what was written.
    pub fn buffered() -> (Self, BufferedOutput) {
        let buffer = BufferedOutput::default();
        (Self::new(Box::new(buffer.clone()), false), buffer)
    }

    pub fn is_decorated(&self) -> bool {
        self.decorated
    }

    pub fn set_decorated(&mut self, decorated: bool) {
        self.decorated = decorated;
    }

    pub fn write(&self, msg: &str) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        sink.write_all(msg.as_bytes()).ok();
        sink.flush().ok();
    }

    pub fn write_line(&self, msg: &str) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(sink, "{msg}").ok();
        sink.flush().ok();
    }
}

/// Shared in-memory writer used by [`Output::buffered`].
#[derive(Clone, Default)]
pub struct BufferedOutput(Arc<Mutex<Vec<u8>>>);

impl BufferedOutput {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for BufferedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Output pair plus the run's verbosity and interactivity.
#[derive(Debug, Clone)]
pub struct Io {
    output: Output,
    error_output: Output,
    verbosity: Verbosity,
    interactive: bool,
}

impl Io {
    pub fn new(output: Output, error_output: Output) -> Self {
        Self {
            output,
            error_output,
            verbosity: Verbosity::Normal,
            interactive: true,
        }
    }

    pub fn stdio() -> Self {
        Self::new(Output::stdout(), Output::stderr())
    }

    /// Io writing to memory: `(io, stdout, stderr)`.
    pub fn buffered() -> (Self, BufferedOutput, BufferedOutput) {
        let (out, out_buf) = Output::buffered();
        let (err, err_buf) = Output::buffered();
        (Self::new(out, err), out_buf, err_buf)
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn error_output(&self) -> &Output {
        &self.error_output
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity >= Verbosity::Verbose
    }

    pub fn is_very_verbose(&self) -> bool {
        self.verbosity >= Verbosity::VeryVerbose
    }

    pub fn is_debug(&self) -> bool {
        self.verbosity >= Verbosity::Debug
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn set_decorated(&mut self, decorated: bool) {
        self.output.set_decorated(decorated);
        self.error_output.set_decorated(decorated);
    }

    /// Write to stdout unless quiet.
    pub fn write_line(&self, msg: &str) {
        self.write_line_at(msg, Verbosity::Normal);
    }

    /// Write to stdout when the run is at least `level` verbose.
    pub fn write_line_at(&self, msg: &str, level: Verbosity) {
        if self.verbosity >= level {
            self.output.write_line(msg);
        }
    }

    /// Write to stderr unless quiet.
    pub fn write_error_line(&self, msg: &str) {
        if !self.is_quiet() {
            self.error_output.write_line(msg);
        }
    }
}
