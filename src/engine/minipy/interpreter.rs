use std::cmp::Ordering;
use std::io::Write;

use super::ast::{BinaryOperator, Expression, Located, Statement, UnaryOperator};
use crate::engine::{EvaluationFault, OutputSink};
use crate::environment::{Environment, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum FaultKind {
    NameError,
    TypeError,
    ZeroDivisionError,
    OverflowError,
    MemoryError,
    SyntaxError,
    IOError,
}

/// A runtime failure before it is tied to a source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub kind: FaultKind,
    pub detail: String,
}

impl Fault {
    fn new(kind: FaultKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn syntax(detail: impl Into<String>) -> Self {
        Self::new(FaultKind::SyntaxError, detail)
    }

    fn unsupported(op: BinaryOperator, left: &Value, right: &Value) -> Self {
        Self::new(
            FaultKind::TypeError,
            format!(
                "unsupported operand type(s) for {}: '{}' and '{}'",
                op,
                left.type_name(),
                right.type_name()
            ),
        )
    }

    fn overflow() -> Self {
        Self::new(FaultKind::OverflowError, "integer overflow")
    }

    fn string_too_long() -> Self {
        Self::new(
            FaultKind::MemoryError,
            format!("string longer than {} bytes", MAX_STRING_LEN),
        )
    }

    pub fn at_line(self, line: usize) -> EvaluationFault {
        EvaluationFault::new(format!(
            "{}: {} in <script> at line number {}",
            self.kind, self.detail, line
        ))
    }
}

type EvalResult<T> = Result<T, Fault>;

/// Longest string an operation may produce.
pub const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Runs statements in order; stops at the first fault, keeping every
/// binding made before it.
pub fn execute(
    program: &[Located],
    env: &mut Environment,
    out: &mut OutputSink,
) -> Result<(), EvaluationFault> {
    // set after `print x,` so the next item is preceded by a space
    let mut softspace = false;
    for located in program {
        execute_statement(&located.statement, env, out, &mut softspace)
            .map_err(|f| f.at_line(located.line))?;
    }
    Ok(())
}

fn execute_statement(
    statement: &Statement,
    env: &mut Environment,
    out: &mut OutputSink,
    softspace: &mut bool,
) -> EvalResult<()> {
    match statement {
        Statement::Assignment { target, value } => {
            let value = evaluate(value, env)?;
            env.set(target.as_str(), value);
        }
        Statement::Print { items, newline } => {
            let mut line = String::new();
            for item in items {
                let rendered = evaluate(item, env)?.to_string();
                if *softspace {
                    line.push(' ');
                }
                line.push_str(&rendered);
                *softspace = true;
            }
            if *newline {
                line.push('\n');
                *softspace = false;
            }
            out.write_all(line.as_bytes())
                .map_err(|e| Fault::new(FaultKind::IOError, e.to_string()))?;
        }
        Statement::Expression(expression) => {
            evaluate(expression, env)?;
        }
    }
    Ok(())
}

pub fn evaluate(expression: &Expression, env: &Environment) -> EvalResult<Value> {
    match expression {
        Expression::Literal(value) => Ok(value.clone()),
        Expression::Variable(name) => env.get(name).cloned().ok_or_else(|| {
            Fault::new(
                FaultKind::NameError,
                format!("name '{}' is not defined", name),
            )
        }),
        Expression::UnaryOp { op, operand } => {
            let operand = evaluate(operand, env)?;
            apply_unary(*op, operand)
        }
        Expression::BinaryOp {
            op: BinaryOperator::And,
            left,
            right,
        } => {
            let left = evaluate(left, env)?;
            if left.is_truthy() {
                evaluate(right, env)
            } else {
                Ok(left)
            }
        }
        Expression::BinaryOp {
            op: BinaryOperator::Or,
            left,
            right,
        } => {
            let left = evaluate(left, env)?;
            if left.is_truthy() {
                Ok(left)
            } else {
                evaluate(right, env)
            }
        }
        Expression::BinaryOp { op, left, right } => {
            let left = evaluate(left, env)?;
            let right = evaluate(right, env)?;
            apply_binary(*op, &left, &right)
        }
        Expression::Chain { first, links } => {
            let mut left = evaluate(first, env)?;
            for (op, right) in links {
                let right = evaluate(right, env)?;
                if !apply_binary(*op, &left, &right)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                left = right;
            }
            Ok(Value::Bool(true))
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Number::Int(i64::from(*b))),
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

fn apply_unary(op: UnaryOperator, operand: Value) -> EvalResult<Value> {
    if op == UnaryOperator::Not {
        return Ok(Value::Bool(!operand.is_truthy()));
    }
    match (op, Number::of(&operand)) {
        (UnaryOperator::Negate, Some(Number::Int(i))) => {
            i.checked_neg().map(Value::Int).ok_or_else(Fault::overflow)
        }
        (UnaryOperator::Negate, Some(Number::Float(f))) => Ok(Value::Float(-f)),
        (UnaryOperator::Plus, Some(Number::Int(i))) => Ok(Value::Int(i)),
        (UnaryOperator::Plus, Some(Number::Float(f))) => Ok(Value::Float(f)),
        _ => Err(Fault::new(
            FaultKind::TypeError,
            format!("bad operand type for unary {}: '{}'", op, operand.type_name()),
        )),
    }
}

fn apply_binary(op: BinaryOperator, left: &Value, right: &Value) -> EvalResult<Value> {
    match op {
        BinaryOperator::Equal => Ok(Value::Bool(values_equal(left, right))),
        BinaryOperator::NotEqual => Ok(Value::Bool(!values_equal(left, right))),
        BinaryOperator::LessThan
        | BinaryOperator::GreaterThan
        | BinaryOperator::LessThanEqual
        | BinaryOperator::GreaterThanEqual => compare(op, left, right),
        _ => arithmetic(op, left, right),
    }
}

fn arithmetic(op: BinaryOperator, left: &Value, right: &Value) -> EvalResult<Value> {
    match (op, left, right) {
        (BinaryOperator::Add, Value::Str(a), Value::Str(b)) => {
            if a.len() + b.len() > MAX_STRING_LEN {
                return Err(Fault::string_too_long());
            }
            Ok(Value::Str(format!("{a}{b}")))
        }
        (BinaryOperator::Multiply, Value::Str(s), count)
        | (BinaryOperator::Multiply, count, Value::Str(s))
            if matches!(Number::of(count), Some(Number::Int(_))) =>
        {
            let Some(Number::Int(count)) = Number::of(count) else {
                return Err(Fault::unsupported(op, left, right));
            };
            let count = usize::try_from(count).unwrap_or(0);
            match s.len().checked_mul(count) {
                Some(len) if len <= MAX_STRING_LEN => Ok(Value::Str(s.repeat(count))),
                _ => Err(Fault::string_too_long()),
            }
        }
        _ => match (Number::of(left), Number::of(right)) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => int_arithmetic(op, a, b),
            (Some(a), Some(b)) => float_arithmetic(op, a.as_f64(), b.as_f64()),
            _ => Err(Fault::unsupported(op, left, right)),
        },
    }
}

fn int_arithmetic(op: BinaryOperator, a: i64, b: i64) -> EvalResult<Value> {
    if matches!(op, BinaryOperator::Divide | BinaryOperator::Modulo) && b == 0 {
        return Err(Fault::new(
            FaultKind::ZeroDivisionError,
            "integer division or modulo by zero",
        ));
    }
    let result = match op {
        BinaryOperator::Add => a.checked_add(b),
        BinaryOperator::Subtract => a.checked_sub(b),
        BinaryOperator::Multiply => a.checked_mul(b),
        BinaryOperator::Divide => floor_div(a, b),
        BinaryOperator::Modulo => floor_mod(a, b),
        _ => return Err(Fault::unsupported(op, &Value::Int(a), &Value::Int(b))),
    };
    result.map(Value::Int).ok_or_else(Fault::overflow)
}

fn float_arithmetic(op: BinaryOperator, a: f64, b: f64) -> EvalResult<Value> {
    let result = match op {
        BinaryOperator::Add => a + b,
        BinaryOperator::Subtract => a - b,
        BinaryOperator::Multiply => a * b,
        BinaryOperator::Divide if b == 0.0 => {
            return Err(Fault::new(
                FaultKind::ZeroDivisionError,
                "float division by zero",
            ));
        }
        BinaryOperator::Divide => a / b,
        BinaryOperator::Modulo if b == 0.0 => {
            return Err(Fault::new(FaultKind::ZeroDivisionError, "float modulo"));
        }
        BinaryOperator::Modulo => {
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r }
        }
        _ => return Err(Fault::unsupported(op, &Value::Float(a), &Value::Float(b))),
    };
    Ok(Value::Float(result))
}

/// Integer division rounding toward negative infinity.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    let r = a.checked_rem(b)?;
    if r != 0 && (r < 0) != (b < 0) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

/// Remainder with the sign of the divisor.
fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    if r != 0 && (r < 0) != (b < 0) {
        r.checked_add(b)
    } else {
        Some(r)
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (Number::of(left), Number::of(right)) {
        (Some(Number::Int(a)), Some(Number::Int(b))) => a == b,
        (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn compare(op: BinaryOperator, left: &Value, right: &Value) -> EvalResult<Value> {
    let ordering = match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match (Number::of(left), Number::of(right)) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => Some(a.cmp(&b)),
            (Some(a), Some(b)) => a.as_f64().partial_cmp(&b.as_f64()),
            _ => {
                return Err(Fault::new(
                    FaultKind::TypeError,
                    format!(
                        "unorderable types: {}() {} {}()",
                        left.type_name(),
                        op,
                        right.type_name()
                    ),
                ));
            }
        },
    };
    // NaN compares false against everything
    let Some(ordering) = ordering else {
        return Ok(Value::Bool(false));
    };
    let result = match op {
        BinaryOperator::LessThan => ordering == Ordering::Less,
        BinaryOperator::GreaterThan => ordering == Ordering::Greater,
        BinaryOperator::LessThanEqual => ordering != Ordering::Greater,
        BinaryOperator::GreaterThanEqual => ordering != Ordering::Less,
        _ => return Err(Fault::unsupported(op, left, right)),
    };
    Ok(Value::Bool(result))
}
