use crate::environment::Value;

/// A statement tagged with the 1-based source line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub line: usize,
    pub statement: Statement,
}

pub type Program = Vec<Located>;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `name = expr`
    Assignment { target: String, value: Expression },
    /// `print expr, expr`. A trailing comma clears `newline`.
    Print {
        items: Vec<Expression>,
        newline: bool,
    },
    /// A bare expression, evaluated and discarded.
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Value),
    Variable(String),
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// `a < b <= c`: each link compares neighbours, every operand is
    /// evaluated at most once.
    Chain {
        first: Box<Expression>,
        links: Vec<(BinaryOperator, Expression)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum UnaryOperator {
    #[strum(serialize = "-")]
    Negate,
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "not")]
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum BinaryOperator {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "%")]
    Modulo,
    #[strum(serialize = "==")]
    Equal,
    #[strum(serialize = "!=")]
    NotEqual,
    #[strum(serialize = "<")]
    LessThan,
    #[strum(serialize = ">")]
    GreaterThan,
    #[strum(serialize = "<=")]
    LessThanEqual,
    #[strum(serialize = ">=")]
    GreaterThanEqual,
    #[strum(serialize = "and")]
    And,
    #[strum(serialize = "or")]
    Or,
}

impl Statement {
    /// `print` with a terminating newline.
    pub fn print(items: Vec<Expression>) -> Self {
        Statement::Print {
            items,
            newline: true,
        }
    }
}

impl Expression {
    pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOperator, operand: Expression) -> Self {
        Expression::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }
}
