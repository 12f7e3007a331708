//! Execution context handed to every evaluation: the program's output sink.
//!
//! The context belongs to the caller.  `print` reaches output only through
//! [`Context::output`]; `str()` asks [`Context::begin_render`] first.

use std::io::{self, Write};

pub trait Context {
    fn output(&mut self) -> &mut dyn Write;

    /// Called before `str()` renders a value.  Contexts that must not
    /// produce any text reject it.
    fn begin_render(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Context writing program output to any `io::Write` (stdout, a `Vec<u8>`, …).
pub struct SimpleContext<W: Write> {
    output: W,
}

impl<W: Write> SimpleContext<W> {
    pub fn new(output: W) -> Self {
        SimpleContext { output }
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> Context for SimpleContext<W> {
    fn output(&mut self) -> &mut dyn Write {
        &mut self.output
    }
}

/// Context for tests that must not produce output.  Every write and every
/// `str()` is rejected, so a stray `print` or `str` fails the evaluation with
/// an I/O error.
#[derive(Debug, Default)]
pub struct DummyContext {
    sink: RejectingWriter,
}

impl DummyContext {
    pub fn new() -> Self {
        DummyContext::default()
    }
}

impl Context for DummyContext {
    fn output(&mut self) -> &mut dyn Write {
        &mut self.sink
    }

    fn begin_render(&mut self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "DummyContext does not render values",
        ))
    }
}

#[derive(Debug, Default)]
struct RejectingWriter;

impl Write for RejectingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "DummyContext does not accept output",
        ))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
