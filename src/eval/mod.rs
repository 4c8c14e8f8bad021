//! Evaluator for `CHECK-EVAL` expressions.
//!
//! Variable values are substituted into the assertion text before it reaches
//! this module, so the grammar only has to deal with literals:
//! integers, floats, quoted strings and `True`/`False`, combined with
//! arithmetic, comparison and boolean operators. `/` always yields a float,
//! `//` and `%` round towards negative infinity, and `and`/`or` return one
//! of their operands. The right operand of `and`/`or` is only evaluated when
//! the left one does not decide the result; it is still parsed.

mod lexer;


use std::cmp::Ordering;
use std::fmt;

use lexer::{Lexer, Token};

const MAX_NESTING_DEPTH: u32 = 64;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
        }
    }
}

/// Numeric view of a value; booleans count as 0 and 1.
#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn of(value: &Value) -> Option<Number> {
        match value {
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Float(f) => Some(Number::Float(*f)),
            Value::Bool(b) => Some(Number::Int(i64::from(*b))),
            Value::Str(_) => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Evaluate an expression to its value.
pub fn evaluate(text: &str) -> Result<Value, String> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        skipping: 0,
    };
    let value = parser.parse_or()?;
    if *parser.peek() != Token::Eof {
        return Err(format!("unexpected {} after expression", parser.peek().description()));
    }
    Ok(value)
}

/// Evaluate and report whether the result is truthy.
pub fn evaluate_condition(text: &str) -> Result<bool, String> {
    evaluate(text).map(|value| value.is_truthy())
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: u32,
    /// Non-zero while parsing an operand whose value is discarded.
    skipping: u32,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Value, String> {
        let mut left = self.parse_and()?;
        while self.eat(&Token::Or) {
            if left.is_truthy() {
                self.skip(Self::parse_and)?;
            } else {
                left = self.parse_and()?;
            }
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Value, String> {
        let mut left = self.parse_not()?;
        while self.eat(&Token::And) {
            if left.is_truthy() {
                left = self.parse_not()?;
            } else {
                self.skip(Self::parse_not)?;
            }
        }
        Ok(left)
    }

    /// Parse an operand without evaluating it.
    fn skip(&mut self, parse: fn(&mut Self) -> Result<Value, String>) -> Result<(), String> {
        self.skipping += 1;
        let result = parse(self);
        self.skipping -= 1;
        result.map(|_| ())
    }

    fn arithmetic(&self, op: BinOp, left: Value, right: Value) -> Result<Value, String> {
        if self.skipping > 0 {
            return Ok(left);
        }
        arithmetic(op, left, right)
    }

    fn parse_not(&mut self) -> Result<Value, String> {
        if self.eat(&Token::Not) {
            self.enter()?;
            let operand = self.parse_not();
            self.depth -= 1;
            return Ok(Value::Bool(!operand?.is_truthy()));
        }
        self.parse_comparison()
    }

    /// `a < b < c` means `a < b and b < c`.
    fn parse_comparison(&mut self) -> Result<Value, String> {
        let first = self.parse_sum()?;
        let mut left = first.clone();
        let mut result: Option<bool> = None;
        while let Some(op) = self.comparison_op() {
            self.advance();
            let right = self.parse_sum()?;
            let holds = self.skipping > 0 || compare(op, &left, &right)?;
            result = Some(result.unwrap_or(true) && holds);
            left = right;
        }
        Ok(match result {
            Some(holds) => Value::Bool(holds),
            None => first,
        })
    }

    fn comparison_op(&self) -> Option<CmpOp> {
        match self.peek() {
            Token::EqEq => Some(CmpOp::Eq),
            Token::NotEq => Some(CmpOp::Ne),
            Token::Lt => Some(CmpOp::Lt),
            Token::LtEq => Some(CmpOp::Le),
            Token::Gt => Some(CmpOp::Gt),
            Token::GtEq => Some(CmpOp::Ge),
            _ => None,
        }
    }

    fn parse_sum(&mut self) -> Result<Value, String> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_term()?;
            left = self.arithmetic(op, left, right)?;
        }
    }

    fn parse_term(&mut self) -> Result<Value, String> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::SlashSlash => BinOp::FloorDiv,
                Token::Percent => BinOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.arithmetic(op, left, right)?;
        }
    }

    fn parse_unary(&mut self) -> Result<Value, String> {
        let negate = match self.peek() {
            Token::Minus => true,
            Token::Plus => false,
            _ => return self.parse_atom(),
        };
        self.advance();
        self.enter()?;
        let operand = self.parse_unary();
        self.depth -= 1;
        let operand = operand?;
        if self.skipping > 0 {
            return Ok(operand);
        }
        if !negate {
            return match Number::of(&operand) {
                Some(Number::Int(n)) => Ok(Value::Int(n)),
                Some(Number::Float(f)) => Ok(Value::Float(f)),
                None => Err(format!("bad operand type for unary +: '{}'", operand.type_name())),
            };
        }
        match Number::of(&operand) {
            Some(Number::Int(n)) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| "integer overflow".to_string()),
            Some(Number::Float(f)) => Ok(Value::Float(-f)),
            None => Err(format!("bad operand type for unary -: '{}'", operand.type_name())),
        }
    }

    fn parse_atom(&mut self) -> Result<Value, String> {
        match self.advance() {
            Token::Int(n) => Ok(Value::Int(n)),
            Token::Float(f) => Ok(Value::Float(f)),
            Token::Str(s) => Ok(Value::Str(s)),
            Token::True => Ok(Value::Bool(true)),
            Token::False => Ok(Value::Bool(false)),
            Token::LParen => {
                self.enter()?;
                let inner = self.parse_or();
                self.depth -= 1;
                let inner = inner?;
                if !self.eat(&Token::RParen) {
                    return Err(format!("expected ')', found {}", self.peek().description()));
                }
                Ok(inner)
            }
            other => Err(format!("expected a value, found {}", other.description())),
        }
    }

    fn enter(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(format!("expression nested deeper than {} levels", MAX_NESTING_DEPTH));
        }
        Ok(())
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool, String> {
    let ordering = match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match (Number::of(left), Number::of(right)) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => Some(a.cmp(&b)),
            (Some(a), Some(b)) => a.as_f64().partial_cmp(&b.as_f64()),
            // Mixed strings and numbers: only (in)equality is defined.
            _ => {
                return match op {
                    CmpOp::Eq => Ok(false),
                    CmpOp::Ne => Ok(true),
                    _ => Err(format!(
                        "'{}' not supported between instances of '{}' and '{}'",
                        op.symbol(),
                        left.type_name(),
                        right.type_name()
                    )),
                };
            }
        },
    };

    // NaN compares unequal to everything.
    let Some(ordering) = ordering else {
        return Ok(op == CmpOp::Ne);
    };
    Ok(match op {
        CmpOp::Eq => ordering == Ordering::Equal,
        CmpOp::Ne => ordering != Ordering::Equal,
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::Le => ordering != Ordering::Greater,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::Ge => ordering != Ordering::Less,
    })
}

impl CmpOp {
    fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
        }
    }
}

fn arithmetic(op: BinOp, left: Value, right: Value) -> Result<Value, String> {
    if let (BinOp::Add, Value::Str(a), Value::Str(b)) = (op, &left, &right) {
        return Ok(Value::Str(format!("{}{}", a, b)));
    }
    let (Some(a), Some(b)) = (Number::of(&left), Number::of(&right)) else {
        return Err(format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ));
    };

    match (a, b) {
        (Number::Int(a), Number::Int(b)) => int_arithmetic(op, a, b),
        (a, b) => float_arithmetic(op, a.as_f64(), b.as_f64()),
    }
}

fn int_arithmetic(op: BinOp, a: i64, b: i64) -> Result<Value, String> {
    let overflow = || "integer overflow".to_string();
    if matches!(op, BinOp::Div | BinOp::FloorDiv | BinOp::Mod) && b == 0 {
        return Err("division by zero".to_string());
    }
    let value = match op {
        BinOp::Add => a.checked_add(b).ok_or_else(overflow)?,
        BinOp::Sub => a.checked_sub(b).ok_or_else(overflow)?,
        BinOp::Mul => a.checked_mul(b).ok_or_else(overflow)?,
        BinOp::Div => return Ok(Value::Float(a as f64 / b as f64)),
        BinOp::FloorDiv => {
            let q = a.checked_div(b).ok_or_else(overflow)?;
            if (a % b != 0) && ((a < 0) != (b < 0)) {
                q - 1
            } else {
                q
            }
        }
        BinOp::Mod => {
            let r = a.checked_rem(b).ok_or_else(overflow)?;
            if r != 0 && ((r < 0) != (b < 0)) {
                r + b
            } else {
                r
            }
        }
    };
    Ok(Value::Int(value))
}

fn float_arithmetic(op: BinOp, a: f64, b: f64) -> Result<Value, String> {
    if matches!(op, BinOp::Div | BinOp::FloorDiv | BinOp::Mod) && b == 0.0 {
        return Err("float division by zero".to_string());
    }
    let value = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::FloorDiv => (a / b).floor(),
        BinOp::Mod => a - b * (a / b).floor(),
    };
    Ok(Value::Float(value))
}
