//! # Engines
//!
//! An [`Engine`] is a language capability: it evaluates code against an
//! [`Environment`] and writes whatever the code prints into an
//! [`OutputSink`]. Engines are looked up by interpreter name through the
//! [`EngineRegistry`].
//!
//! * [`registry`]: name → engine resolution
//! * [`minipy`]: the built-in statement language registered as `python`

pub mod minipy;
pub mod registry;

use std::io;

use thiserror::Error;

use crate::environment::Environment;

pub use registry::EngineRegistry;

/// Failure raised by an engine while evaluating code.
///
/// The message is delivered to the client verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EvaluationFault {
    message: String,
}

impl EvaluationFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Captures the output of a single evaluation.
///
/// A fresh sink is attached to every call, so printed output never
/// accumulates across requests even though bindings do.
#[derive(Debug, Default)]
pub struct OutputSink {
    buf: Vec<u8>,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Captured output, with invalid UTF-8 replaced.
    pub fn into_string(self) -> String {
        match String::from_utf8(self.buf) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

impl io::Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A language capability identified by interpreter name.
///
/// Implementations must be callable from any thread; the dispatcher
/// guarantees that a given [`Environment`] is only ever handed to one
/// evaluation at a time.
#[mockall::automock]
pub trait Engine: Send + Sync {
    /// Evaluates `code` against `environment`. Bindings made before a
    /// failing statement stay in place.
    fn evaluate(
        &self,
        code: &str,
        environment: &mut Environment,
        output: &mut OutputSink,
    ) -> Result<(), EvaluationFault>;
}
