//! # minipy
//!
//! A small statement language with Python 2 flavored syntax, bundled so the
//! service is usable without an external runtime.
//!
//! ```text
//! a = 3; b = a * 2
//! print a + b, 'done'
//! ```
//!
//! Supported: assignment, `print` with comma separated items (a trailing
//! comma leaves the line open), arithmetic (`+ - * / %`), chained
//! comparisons, `and`/`or`/`not`, int, float and string literals, `True`,
//! `False` and `None`. Faults are reported in the form
//! `<Kind>: <detail> in <script> at line number <n>`.
//!
//! Inputs are bounded: a line may nest at most [`parser::MAX_NESTING`] deep
//! and hold at most [`parser::MAX_OPERATIONS`] operators, and no string may
//! grow past [`interpreter::MAX_STRING_LEN`] bytes.

pub mod ast;
pub mod interpreter;
pub mod parser;

use tracing::debug;

use super::{Engine, EvaluationFault, OutputSink};
use crate::environment::Environment;
use interpreter::Fault;

/// Names minipy is registered under by default.
pub const MINIPY_NAMES: [&str; 2] = ["python", "jython"];

#[derive(Debug, Clone, Copy, Default)]
pub struct MiniPy;

impl Engine for MiniPy {
    fn evaluate(
        &self,
        code: &str,
        environment: &mut Environment,
        output: &mut OutputSink,
    ) -> Result<(), EvaluationFault> {
        // the whole source is parsed before anything runs
        let program = parser::parse_program(code).map_err(|e| {
            debug!("minipy syntax error on line {}: {}", e.line, e.kind);
            Fault::syntax(e.kind.to_string()).at_line(e.line)
        })?;
        interpreter::execute(&program, environment, output)
    }
}
