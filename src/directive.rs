//! # Directive Parsing
//!
//! A submission has the shape `%<interpreter> <body>`: a `%`, a contiguous
//! non-whitespace interpreter name, one ASCII whitespace separator, and the
//! rest of the line as the body. The interpreter name is not validated here; unknown
//! names are resolved (and rejected) by the [`EngineRegistry`](crate::engine::EngineRegistry).

use lazy_static::lazy_static;
use regex::Regex;
use tracing::instrument;

use crate::error::{DispatchError, DispatchResult};

// Whitespace here is ASCII only: space, \t, \n, \x0B, \f and \r.
lazy_static! {
    static ref DIRECTIVE: Regex =
        Regex::new(r"^%([^ \t\n\x0B\x0C\r]+)[ \t\n\x0B\x0C\r](.*)").expect("directive pattern");
}

/// A parsed `%interpreter body` submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    pub interpreter: &'a str,
    pub body: &'a str,
}

/// Splits `code` into interpreter name and body.
///
/// Only the first line contributes to the body.
#[instrument(level = "debug")]
pub fn parse(code: &str) -> DispatchResult<Directive<'_>> {
    let captures = DIRECTIVE.captures(code).ok_or(DispatchError::Parse)?;
    let (Some(interpreter), Some(body)) = (captures.get(1), captures.get(2)) else {
        return Err(DispatchError::Parse);
    };
    let body = body.as_str();
    Ok(Directive {
        interpreter: interpreter.as_str(),
        body: body.strip_suffix('\r').unwrap_or(body),
    })
}
