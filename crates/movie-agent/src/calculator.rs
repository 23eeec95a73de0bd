//! Arithmetic evaluator for model-supplied expressions.
//!
//! Grammar (standard precedence, left associative):
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('+' | '-') unary | atom
//! atom   := number | '(' expr ')'
//! number := digits ['.' digits] | '.' digits, optional exponent e[+-]digits
//! ```
//!
//! Nothing else is accepted: no names, no calls, no attribute access.

use thiserror::Error;

/// Longest accepted expression, in characters.
pub const MAX_EXPRESSION_CHARS: usize = 256;
/// Deepest accepted nesting of parentheses and unary signs.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,
    #[error("illegal token {found:?} at position {position}")]
    IllegalToken { position: usize, found: String },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected {found:?} at position {position}")]
    UnexpectedToken { position: usize, found: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NonFinite,
    #[error("expression too complex")]
    TooComplex,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Num(n) => format_number(*n),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Star => "*".into(),
            Token::Slash => "/".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, EvalError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                let (value, end) = read_number(&chars, i)?;
                tokens.push((start, Token::Num(value)));
                i = end;
                continue;
            }
            _ => {
                let end = chars[i..]
                    .iter()
                    .position(|c| !c.is_alphanumeric() && *c != '_')
                    .map(|n| i + n.max(1))
                    .unwrap_or(chars.len());
                return Err(EvalError::IllegalToken {
                    position: i,
                    found: chars[i..end].iter().collect(),
                });
            }
        };
        tokens.push((i, token));
        i += 1;
    }
    Ok(tokens)
}

fn read_number(chars: &[char], start: usize) -> Result<(f64, usize), EvalError> {
    let mut i = start;
    let digits = |i: &mut usize| {
        let from = *i;
        while *i < chars.len() && chars[*i].is_ascii_digit() {
            *i += 1;
        }
        *i - from
    };
    let mut count = digits(&mut i);
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        count += digits(&mut i);
    }
    if count == 0 {
        return Err(EvalError::IllegalToken {
            position: start,
            found: ".".into(),
        });
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if digits(&mut j) > 0 {
            i = j;
        }
    }
    // A letter glued to the literal (`2x`, `1e`) is a name, not a number.
    if i < chars.len() && (chars[i].is_alphabetic() || chars[i] == '_' || chars[i] == '.') {
        let end = chars[i..]
            .iter()
            .position(|c| !c.is_alphanumeric() && *c != '_' && *c != '.')
            .map(|n| i + n)
            .unwrap_or(chars.len());
        return Err(EvalError::IllegalToken {
            position: start,
            found: chars[start..end].iter().collect(),
        });
    }
    let text: String = chars[start..i].iter().collect();
    let value = text.parse::<f64>().map_err(|_| EvalError::IllegalToken {
        position: start,
        found: text.clone(),
    })?;
    Ok((value, i))
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(_, t)| *t)
    }

    fn bump(&mut self) -> Option<(usize, Token)> {
        let t = self.tokens.get(self.pos).copied();
        self.pos += 1;
        t
    }

    fn descend(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::TooComplex);
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == Token::Plus { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            acc = if op == Token::Star {
                acc * rhs
            } else {
                if rhs == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                acc / rhs
            };
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<f64, EvalError> {
        match self.peek() {
            Some(Token::Plus) | Some(Token::Minus) => {
                let negate = self.peek() == Some(Token::Minus);
                self.pos += 1;
                self.descend()?;
                let v = self.unary()?;
                self.depth -= 1;
                Ok(if negate { -v } else { v })
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<f64, EvalError> {
        match self.bump() {
            Some((_, Token::Num(n))) => Ok(n),
            Some((_, Token::LParen)) => {
                self.descend()?;
                let v = self.expr()?;
                self.depth -= 1;
                match self.bump() {
                    Some((_, Token::RParen)) => Ok(v),
                    Some((position, t)) => Err(EvalError::UnexpectedToken {
                        position,
                        found: t.describe(),
                    }),
                    None => Err(EvalError::UnexpectedEnd),
                }
            }
            Some((position, t)) => Err(EvalError::UnexpectedToken {
                position,
                found: t.describe(),
            }),
            None => Err(EvalError::UnexpectedEnd),
        }
    }
}

/// Evaluates `expression` under the restricted grammar.
pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    if expression.chars().count() > MAX_EXPRESSION_CHARS {
        return Err(EvalError::TooComplex);
    }
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(EvalError::Empty);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some((position, t)) = parser.bump() {
        return Err(EvalError::UnexpectedToken {
            position,
            found: t.describe(),
        });
    }
    if !value.is_finite() {
        return Err(EvalError::NonFinite);
    }
    Ok(value)
}

/// Integral values print without a fraction (`4`, not `4.0`).
pub fn format_number(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
