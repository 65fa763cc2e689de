// Expression parser - converts normalized math strings into an AST
// Supports: numbers, identifiers, sqrt/ln/log/exp/pow calls, + - * / ^ (and **),
// unary minus, and implicit multiplication (`3x`, `2(x+1)`, `(x+1)x`).

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// Bound variable or named constant (`e`, `pi`), resolved at evaluation time
    Ident(String),
    Call {
        func: Func,
        args: Vec<Expr>,
    },
    BinaryOp {
        op: Op,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Neg(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sqrt,
    Ln,
    Exp,
    Pow,
}

impl Func {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Func::Sqrt),
            "ln" | "log" => Some(Func::Ln),
            "exp" => Some(Func::Exp),
            "pow" => Some(Func::Pow),
            _ => None,
        }
    }

    fn arity(&self) -> usize {
        match self {
            Func::Pow => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprError {
    Empty,
    UnexpectedChar(char),
    InvalidNumber(String),
    UnexpectedToken(usize),
    UnexpectedEnd,
    MissingParen,
    UnknownFunction(String),
    Arity { func: String, expected: usize, found: usize },
    TrailingInput(usize),
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty expression"),
            Self::UnexpectedChar(c) => write!(f, "unexpected character: {c}"),
            Self::InvalidNumber(s) => write!(f, "invalid number: {s}"),
            Self::UnexpectedToken(pos) => write!(f, "unexpected token at position {pos}"),
            Self::UnexpectedEnd => write!(f, "unexpected end of expression"),
            Self::MissingParen => write!(f, "missing closing parenthesis"),
            Self::UnknownFunction(name) => write!(f, "unknown function: {name}"),
            Self::Arity { func, expected, found } => {
                write!(f, "{func} takes {expected} argument(s), found {found}")
            }
            Self::TrailingInput(pos) => write!(f, "unexpected input after position {pos}"),
        }
    }
}

impl std::error::Error for ExprError {}

/// Parse a normalized expression string into an AST.
pub fn parse(input: &str) -> Result<Expr, ExprError> {
    let tokens = insert_implicit_mul(tokenize(input)?);
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    let (expr, pos) = parse_add_sub(&tokens, 0)?;
    if pos != tokens.len() {
        return Err(ExprError::TrailingInput(pos));
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '+' => {
                tokens.push(Token::Plus);
                chars.next();
            }
            '-' | '−' => {
                tokens.push(Token::Minus);
                chars.next();
            }
            '/' => {
                tokens.push(Token::Slash);
                chars.next();
            }
            '^' => {
                tokens.push(Token::Caret);
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            ',' => {
                tokens.push(Token::Comma);
                chars.next();
            }
            '*' => {
                chars.next();
                // `**` is exponentiation
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::Caret);
                } else {
                    tokens.push(Token::Star);
                }
            }
            'A'..='Z' | 'a'..='z' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            '0'..='9' | '.' => {
                let mut num_str = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        num_str.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let num: f64 =
                    num_str.parse().map_err(|_| ExprError::InvalidNumber(num_str.clone()))?;
                tokens.push(Token::Number(num));
            }
            _ => return Err(ExprError::UnexpectedChar(c)),
        }
    }

    Ok(tokens)
}

/// Insert `*` where multiplication is written by juxtaposition:
/// a number before an identifier or `(`, and `)` before an identifier.
fn insert_implicit_mul(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut prev: Option<&Token> = None;
    for tok in &tokens {
        let implicit = matches!(
            (prev, tok),
            (Some(Token::Number(_)), Token::Ident(_))
                | (Some(Token::Number(_)), Token::LParen)
                | (Some(Token::RParen), Token::Ident(_))
        );
        if implicit {
            out.push(Token::Star);
        }
        out.push(tok.clone());
        prev = Some(tok);
    }
    out
}

fn parse_add_sub(tokens: &[Token], pos: usize) -> Result<(Expr, usize), ExprError> {
    let (mut left, mut pos) = parse_mul_div(tokens, pos)?;

    while pos < tokens.len() {
        let op = match &tokens[pos] {
            Token::Plus => Op::Add,
            Token::Minus => Op::Sub,
            _ => break,
        };
        let (right, new_pos) = parse_mul_div(tokens, pos + 1)?;
        left = Expr::BinaryOp { op, left: Box::new(left), right: Box::new(right) };
        pos = new_pos;
    }

    Ok((left, pos))
}

fn parse_mul_div(tokens: &[Token], pos: usize) -> Result<(Expr, usize), ExprError> {
    let (mut left, mut pos) = parse_unary(tokens, pos)?;

    while pos < tokens.len() {
        let op = match &tokens[pos] {
            Token::Star => Op::Mul,
            Token::Slash => Op::Div,
            _ => break,
        };
        let (right, new_pos) = parse_unary(tokens, pos + 1)?;
        left = Expr::BinaryOp { op, left: Box::new(left), right: Box::new(right) };
        pos = new_pos;
    }

    Ok((left, pos))
}

// Unary sign binds looser than ^ so that -x^2 is -(x^2)
fn parse_unary(tokens: &[Token], pos: usize) -> Result<(Expr, usize), ExprError> {
    match tokens.get(pos) {
        Some(Token::Minus) => {
            let (expr, pos) = parse_unary(tokens, pos + 1)?;
            Ok((Expr::Neg(Box::new(expr)), pos))
        }
        Some(Token::Plus) => parse_unary(tokens, pos + 1),
        Some(_) => parse_power(tokens, pos),
        None => Err(ExprError::UnexpectedEnd),
    }
}

// Exponentiation (^) - right-associative; the exponent may carry its own sign
fn parse_power(tokens: &[Token], pos: usize) -> Result<(Expr, usize), ExprError> {
    let (base, pos) = parse_primary(tokens, pos)?;

    if let Some(Token::Caret) = tokens.get(pos) {
        let (exponent, new_pos) = parse_unary(tokens, pos + 1)?;
        return Ok((
            Expr::BinaryOp { op: Op::Pow, left: Box::new(base), right: Box::new(exponent) },
            new_pos,
        ));
    }

    Ok((base, pos))
}

fn parse_primary(tokens: &[Token], pos: usize) -> Result<(Expr, usize), ExprError> {
    let Some(token) = tokens.get(pos) else {
        return Err(ExprError::UnexpectedEnd);
    };

    match token {
        Token::Number(n) => Ok((Expr::Number(*n), pos + 1)),
        Token::Ident(name) => {
            if let Some(Token::LParen) = tokens.get(pos + 1) {
                let func = Func::from_name(name)
                    .ok_or_else(|| ExprError::UnknownFunction(name.clone()))?;
                let (args, new_pos) = parse_call_args(tokens, pos + 2)?;
                if args.len() != func.arity() {
                    return Err(ExprError::Arity {
                        func: name.clone(),
                        expected: func.arity(),
                        found: args.len(),
                    });
                }
                return Ok((Expr::Call { func, args }, new_pos));
            }
            Ok((Expr::Ident(name.clone()), pos + 1))
        }
        Token::LParen => {
            let (expr, pos) = parse_add_sub(tokens, pos + 1)?;
            match tokens.get(pos) {
                Some(Token::RParen) => Ok((expr, pos + 1)),
                Some(_) => Err(ExprError::UnexpectedToken(pos)),
                None => Err(ExprError::MissingParen),
            }
        }
        _ => Err(ExprError::UnexpectedToken(pos)),
    }
}

fn parse_call_args(tokens: &[Token], pos: usize) -> Result<(Vec<Expr>, usize), ExprError> {
    let mut args = Vec::new();
    let mut pos = pos;

    if let Some(Token::RParen) = tokens.get(pos) {
        return Ok((args, pos + 1));
    }

    loop {
        let (arg, new_pos) = parse_add_sub(tokens, pos)?;
        args.push(arg);
        pos = new_pos;

        match tokens.get(pos) {
            Some(Token::RParen) => return Ok((args, pos + 1)),
            Some(Token::Comma) => pos += 1,
            Some(_) => return Err(ExprError::UnexpectedToken(pos)),
            None => return Err(ExprError::MissingParen),
        }
    }
}
