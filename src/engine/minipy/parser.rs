//! nom grammar for minipy.
//!
//! A source is parsed line by line; each line holds zero or more statements
//! separated by `;` and may end with a `#` comment.
//!
//! Every line is parsed under [`Limits`]: nesting deeper than
//! [`MAX_NESTING`] or more than [`MAX_OPERATIONS`] operators is rejected
//! before the tree is built, so neither the parser nor the evaluator can
//! exhaust the thread's stack.

use std::cell::Cell;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, satisfy, space0},
    combinator::{all_consuming, map, map_res, not, opt, recognize, rest, value, verify},
    error::{Error, ErrorKind},
    multi::{fold_many0, many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
};
use tracing::instrument;

use super::ast::{BinaryOperator, Expression, Located, Program, Statement, UnaryOperator};
use crate::environment::Value;

const RESERVED_KEYWORDS: [&str; 7] = ["print", "and", "or", "not", "True", "False", "None"];

/// Deepest nesting of parentheses, `not` and unary signs in one expression.
pub const MAX_NESTING: usize = 64;

/// Most operators a single line may contain.
pub const MAX_OPERATIONS: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SyntaxErrorKind {
    #[strum(serialize = "invalid syntax")]
    Invalid,
    #[strum(serialize = "expression nested too deeply")]
    TooDeep,
    #[strum(serialize = "expression has too many operators")]
    TooComplex,
}

/// The line a source failed to parse on (1-based), and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub kind: SyntaxErrorKind,
}

/// Per-line parse budget.
#[derive(Debug, Default)]
struct Limits {
    operations: Cell<usize>,
    exceeded: Cell<Option<SyntaxErrorKind>>,
}

impl Limits {
    fn exceeded(&self) -> Option<SyntaxErrorKind> {
        self.exceeded.get()
    }

    // Failure, not Error: alternatives must not retry an oversized input.
    fn reject<'a, T>(&self, input: &'a str, kind: SyntaxErrorKind) -> IResult<&'a str, T> {
        self.exceeded.set(Some(kind));
        Err(nom::Err::Failure(Error::new(input, ErrorKind::TooLarge)))
    }

    fn enter<'a>(&self, input: &'a str, depth: usize) -> IResult<&'a str, ()> {
        if depth > MAX_NESTING {
            return self.reject(input, SyntaxErrorKind::TooDeep);
        }
        Ok((input, ()))
    }

    fn count_operation<'a>(&self, input: &'a str) -> IResult<&'a str, ()> {
        let used = self.operations.get() + 1;
        if used > MAX_OPERATIONS {
            return self.reject(input, SyntaxErrorKind::TooComplex);
        }
        self.operations.set(used);
        Ok((input, ()))
    }
}

/// Entry point of the parser.
#[instrument(level = "debug", skip(source))]
pub fn parse_program(source: &str) -> Result<Program, SyntaxError> {
    let mut program = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line_number = index + 1;
        let limits = Limits::default();
        let (_, statements) =
            all_consuming(|i| parse_line(i, &limits))(line).map_err(|_| SyntaxError {
                line: line_number,
                kind: limits.exceeded().unwrap_or(SyntaxErrorKind::Invalid),
            })?;
        program.extend(statements.into_iter().map(|statement| Located {
            line: line_number,
            statement,
        }));
    }
    Ok(program)
}

fn parse_line<'a>(input: &'a str, limits: &Limits) -> IResult<&'a str, Vec<Statement>> {
    terminated(
        separated_list0(ws(char(';')), |i: &'a str| parse_statement(i, limits)),
        tuple((opt(ws(char(';'))), space0, opt(parse_comment))),
    )(input)
}

fn parse_comment(input: &str) -> IResult<&str, &str> {
    preceded(char('#'), rest)(input)
}

fn parse_statement<'a>(input: &'a str, limits: &Limits) -> IResult<&'a str, Statement> {
    alt((
        |i: &'a str| parse_print(i, limits),
        |i: &'a str| parse_assignment(i, limits),
        map(
            |i: &'a str| parse_expression(i, limits, 0),
            Statement::Expression,
        ),
    ))(input)
}

fn parse_print<'a>(input: &'a str, limits: &Limits) -> IResult<&'a str, Statement> {
    let (input, _) = ws(keyword("print"))(input)?;
    let (input, items) = separated_list0(ws(char(',')), |i: &'a str| {
        parse_expression(i, limits, 0)
    })(input)?;
    if items.is_empty() {
        return Ok((input, Statement::print(items)));
    }
    // `print a,` leaves the line open
    let (input, trailing) = opt(ws(char(',')))(input)?;
    Ok((
        input,
        Statement::Print {
            items,
            newline: trailing.is_none(),
        },
    ))
}

fn parse_assignment<'a>(input: &'a str, limits: &Limits) -> IResult<&'a str, Statement> {
    map(
        tuple((
            ws(parse_name),
            // `=` but not `==`
            ws(terminated(char('='), not(char('=')))),
            |i: &'a str| parse_expression(i, limits, 0),
        )),
        |(target, _, value)| Statement::Assignment {
            target: target.to_string(),
            value,
        },
    )(input)
}

// Expressions, loosest binding first
fn parse_expression<'a>(
    input: &'a str,
    limits: &Limits,
    depth: usize,
) -> IResult<&'a str, Expression> {
    let (input, _) = limits.enter(input, depth)?;
    parse_logical_or(input, limits, depth)
}

fn parse_logical_or<'a>(
    input: &'a str,
    limits: &Limits,
    depth: usize,
) -> IResult<&'a str, Expression> {
    let (input, first) = parse_logical_and(input, limits, depth)?;
    fold_many0(
        |i: &'a str| {
            counted(
                i,
                limits,
                pair(value(BinaryOperator::Or, ws(keyword("or"))), |i: &'a str| {
                    parse_logical_and(i, limits, depth)
                }),
            )
        },
        move || first.clone(),
        |left, (op, right)| Expression::binary(op, left, right),
    )(input)
}

fn parse_logical_and<'a>(
    input: &'a str,
    limits: &Limits,
    depth: usize,
) -> IResult<&'a str, Expression> {
    let (input, first) = parse_logical_not(input, limits, depth)?;
    fold_many0(
        |i: &'a str| {
            counted(
                i,
                limits,
                pair(value(BinaryOperator::And, ws(keyword("and"))), |i: &'a str| {
                    parse_logical_not(i, limits, depth)
                }),
            )
        },
        move || first.clone(),
        |left, (op, right)| Expression::binary(op, left, right),
    )(input)
}

fn parse_logical_not<'a>(
    input: &'a str,
    limits: &Limits,
    depth: usize,
) -> IResult<&'a str, Expression> {
    let (input, _) = limits.enter(input, depth)?;
    alt((
        map(
            preceded(ws(keyword("not")), |i: &'a str| {
                counted(i, limits, |i: &'a str| {
                    parse_logical_not(i, limits, depth + 1)
                })
            }),
            |operand| Expression::unary(UnaryOperator::Not, operand),
        ),
        |i: &'a str| parse_comparison(i, limits, depth),
    ))(input)
}

/// `a < b` stays a binary operation; longer runs become a chain.
fn parse_comparison<'a>(
    input: &'a str,
    limits: &Limits,
    depth: usize,
) -> IResult<&'a str, Expression> {
    let (input, first) = parse_additive(input, limits, depth)?;
    let (input, mut links) = many0(|i: &'a str| {
        counted(
            i,
            limits,
            pair(comparison_operator, |i: &'a str| {
                parse_additive(i, limits, depth)
            }),
        )
    })(input)?;

    let expression = if links.len() > 1 {
        Expression::Chain {
            first: Box::new(first),
            links,
        }
    } else {
        match links.pop() {
            Some((op, right)) => Expression::binary(op, first, right),
            None => first,
        }
    };
    Ok((input, expression))
}

fn comparison_operator(input: &str) -> IResult<&str, BinaryOperator> {
    ws(map_res(
        alt((
            tag("=="),
            tag("!="),
            tag("<="),
            tag(">="),
            tag("<"),
            tag(">"),
        )),
        |op: &str| op.parse::<BinaryOperator>(),
    ))(input)
}

fn parse_additive<'a>(
    input: &'a str,
    limits: &Limits,
    depth: usize,
) -> IResult<&'a str, Expression> {
    let (input, first) = parse_multiplicative(input, limits, depth)?;
    fold_many0(
        |i: &'a str| {
            counted(
                i,
                limits,
                pair(additive_operator, |i: &'a str| {
                    parse_multiplicative(i, limits, depth)
                }),
            )
        },
        move || first.clone(),
        |left, (op, right)| Expression::binary(op, left, right),
    )(input)
}

fn additive_operator(input: &str) -> IResult<&str, BinaryOperator> {
    ws(map_res(alt((tag("+"), tag("-"))), |op: &str| {
        op.parse::<BinaryOperator>()
    }))(input)
}

fn parse_multiplicative<'a>(
    input: &'a str,
    limits: &Limits,
    depth: usize,
) -> IResult<&'a str, Expression> {
    let (input, first) = parse_unary(input, limits, depth)?;
    fold_many0(
        |i: &'a str| {
            counted(
                i,
                limits,
                pair(multiplicative_operator, |i: &'a str| {
                    parse_unary(i, limits, depth)
                }),
            )
        },
        move || first.clone(),
        |left, (op, right)| Expression::binary(op, left, right),
    )(input)
}

fn multiplicative_operator(input: &str) -> IResult<&str, BinaryOperator> {
    ws(map_res(alt((tag("*"), tag("/"), tag("%"))), |op: &str| {
        op.parse::<BinaryOperator>()
    }))(input)
}

fn parse_unary<'a>(input: &'a str, limits: &Limits, depth: usize) -> IResult<&'a str, Expression> {
    let (input, _) = limits.enter(input, depth)?;
    alt((
        map(
            |i: &'a str| {
                counted(
                    i,
                    limits,
                    pair(unary_operator, |i: &'a str| {
                        parse_unary(i, limits, depth + 1)
                    }),
                )
            },
            |(op, operand)| Expression::unary(op, operand),
        ),
        |i: &'a str| parse_primary(i, limits, depth),
    ))(input)
}

fn unary_operator(input: &str) -> IResult<&str, UnaryOperator> {
    ws(map_res(alt((tag("-"), tag("+"))), |op: &str| {
        op.parse::<UnaryOperator>()
    }))(input)
}

fn parse_primary<'a>(
    input: &'a str,
    limits: &Limits,
    depth: usize,
) -> IResult<&'a str, Expression> {
    ws(alt((
        map(parse_literal, Expression::Literal),
        delimited(
            ws(char('(')),
            |i: &'a str| parse_expression(i, limits, depth + 1),
            ws(char(')')),
        ),
        map(parse_name, |name: &str| Expression::Variable(name.to_string())),
    )))(input)
}

/// Runs `parser`, then charges one operation for the node its output becomes.
fn counted<'a, O, P>(input: &'a str, limits: &Limits, mut parser: P) -> IResult<&'a str, O>
where
    P: FnMut(&'a str) -> IResult<&'a str, O>,
{
    let (input, output) = parser(input)?;
    let (input, _) = limits.count_operation(input)?;
    Ok((input, output))
}

fn parse_literal(input: &str) -> IResult<&str, Value> {
    alt((
        map(parse_float, Value::Float),
        map(parse_int, Value::Int),
        map(parse_string, Value::Str),
        value(Value::Bool(true), keyword("True")),
        value(Value::Bool(false), keyword("False")),
        value(Value::None, keyword("None")),
    ))(input)
}

fn parse_float(input: &str) -> IResult<&str, f64> {
    map_res(recognize(tuple((digit1, char('.'), digit1))), |s: &str| {
        s.parse::<f64>()
    })(input)
}

fn parse_int(input: &str) -> IResult<&str, i64> {
    map_res(digit1, |s: &str| s.parse::<i64>())(input)
}

fn parse_string(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
        )),
        |s: &str| s.to_string(),
    )(input)
}

/// An identifier that is not a reserved keyword.
fn parse_name(input: &str) -> IResult<&str, &str> {
    verify(identifier, |id: &str| !RESERVED_KEYWORDS.contains(&id))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_identifier_char),
    ))(input)
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Matches `word` only when it is not the prefix of a longer identifier.
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag(word), not(satisfy(is_identifier_char)))
}

/// Skips spaces and tabs around `inner`.
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(space0, inner, space0)
}
