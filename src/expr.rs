//! Evaluation of the small complex-valued expressions a matrix editor commits,
//! e.g. `1+i`, `-i`, `sqrt(1/2)` or `exp(i*pi/4)`.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary | primary)*     adjacent primary = implicit '*'
//! unary   := ('+' | '-') unary | power
//! power   := primary ('^' unary)?
//! primary := number | ident | ident '(' expr ')' | '(' expr ')'
//! ```

use num_complex::Complex64;

use crate::error::ExprError;

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
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Ident(name) => f.write_str(name),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Caret => f.write_str("^"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ExprError::MalformedNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() => {
                let mut name = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        name.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            _ => {
                let token = match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '^' => Token::Caret,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    found => return Err(ExprError::UnexpectedChar { found, offset }),
                };
                tokens.push(token);
                chars.next();
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ExprError> {
        match self.next() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn expr(&mut self) -> Result<Complex64, ExprError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<Complex64, ExprError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    value /= self.unary()?;
                }
                // `2i`, `3pi`, `2(1+i)`
                Some(Token::Number(_) | Token::Ident(_) | Token::LParen) => {
                    value *= self.power()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<Complex64, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Complex64, ExprError> {
        let base = self.primary()?;
        if self.peek() != Some(&Token::Caret) {
            return Ok(base);
        }
        self.pos += 1;
        let exponent = self.unary()?;
        if exponent.im == 0.0 && exponent.re.fract() == 0.0 && exponent.re.abs() <= i32::MAX as f64 {
            Ok(base.powi(exponent.re as i32))
        } else {
            Ok(base.powc(exponent))
        }
    }

    fn primary(&mut self) -> Result<Complex64, ExprError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Complex64::new(n, 0.0)),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let arg = self.expr()?;
                    self.expect(&Token::RParen)?;
                    return apply_function(&name, arg);
                }
                constant(&name)
            }
            Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

fn constant(name: &str) -> Result<Complex64, ExprError> {
    match name {
        "i" => Ok(Complex64::i()),
        "pi" => Ok(Complex64::new(std::f64::consts::PI, 0.0)),
        "e" => Ok(Complex64::new(std::f64::consts::E, 0.0)),
        _ => Err(ExprError::UnknownIdentifier(name.to_string())),
    }
}

fn apply_function(name: &str, arg: Complex64) -> Result<Complex64, ExprError> {
    match name {
        "sqrt" => Ok(arg.sqrt()),
        "exp" => Ok(arg.exp()),
        "sin" => Ok(arg.sin()),
        "cos" => Ok(arg.cos()),
        "conj" => Ok(arg.conj()),
        "abs" => Ok(Complex64::new(arg.norm(), 0.0)),
        _ => Err(ExprError::UnknownIdentifier(name.to_string())),
    }
}

/// Evaluates a single complex expression.
pub fn evaluate(input: &str) -> Result<Complex64, ExprError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    match parser.next() {
        None => Ok(value),
        Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
    }
}

/// Evaluates a real scalar factor. Blank input means `1`.
pub fn evaluate_scalar(input: &str) -> Result<f64, ExprError> {
    if input.trim().is_empty() {
        return Ok(1.0);
    }
    let value = evaluate(input)?;
    if value.im.abs() > 1e-12 * value.re.abs().max(1.0) {
        return Err(ExprError::NonRealScalar {
            re: value.re,
            im: value.im,
        });
    }
    Ok(value.re)
}

/// Splits a compact matrix literal such as `0 -i \\ i 0` into its four entry
/// strings. Columns are whitespace separated, rows separated by backslashes.
pub fn split_matrix(input: &str) -> Result<[[String; 2]; 2], ExprError> {
    let rows: Vec<&str> = input
        .split('\\')
        .map(str::trim)
        .filter(|row| !row.is_empty())
        .collect();
    if rows.len() != 2 {
        return Err(ExprError::MalformedMatrix(rows.len()));
    }

    let split_row = |row: &str| -> Result<[String; 2], ExprError> {
        let entries: Vec<&str> = row.split_whitespace().collect();
        match entries.as_slice() {
            [first, second] => Ok([first.to_string(), second.to_string()]),
            _ => Err(ExprError::MalformedRow(row.to_string())),
        }
    };

    Ok([split_row(rows[0])?, split_row(rows[1])?])
}
