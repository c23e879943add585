//! Prefix term notation for building predicates on the command line.
//!
//! ```text
//! and(eq(id, 5), not(in(region, 'eu', 'us')))
//! or(is_null(name), cast(flag, BOOLEAN))
//! ```
//!
//! Operators: `and`, `or` (two or more operands, folded left), `not`,
//! `eq`, `ne`, `lt`, `le`, `gt`, `ge`, `in`, `not_in`, `is_null`,
//! `is_not_null`, `cast(expr, TYPE)`. Leaves are column names, integers,
//! decimals, `'strings'`, `true`, `false` and `null`.

use crate::analyzer::DEFAULT_MAX_EXPR_DEPTH;
use crate::expression::expr::parenthesize_operands;
use crate::expression::{BinaryOperator, Expr};
use crate::types::DataType;
use anyhow::{anyhow, bail, Context, Result};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        match c {
            c if c.is_whitespace() => pos += 1,
            '(' => {
                tokens.push(Token::LParen);
                pos += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                pos += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                pos += 1;
            }
            '\'' => {
                let mut value = String::new();
                pos += 1;
                loop {
                    match chars.get(pos) {
                        None => bail!("unterminated string literal"),
                        // '' escapes a quote
                        Some('\'') if chars.get(pos + 1) == Some(&'\'') => {
                            value.push('\'');
                            pos += 2;
                        }
                        Some('\'') => {
                            pos += 1;
                            break;
                        }
                        Some(ch) => {
                            value.push(*ch);
                            pos += 1;
                        }
                    }
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let start = pos;
                pos += 1;
                while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                    pos += 1;
                }
                let text: String = chars[start..pos].iter().collect();
                let token = if text.contains('.') {
                    Token::Float(
                        text.parse()
                            .with_context(|| format!("invalid number '{}'", text))?,
                    )
                } else {
                    Token::Int(
                        text.parse()
                            .with_context(|| format!("invalid number '{}'", text))?,
                    )
                };
                tokens.push(token);
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = pos;
                while pos < chars.len()
                    && (chars[pos].is_alphanumeric() || chars[pos] == '_' || chars[pos] == '.')
                {
                    pos += 1;
                }
                tokens.push(Token::Ident(chars[start..pos].iter().collect()));
            }
            other => bail!("unexpected character '{}' at offset {}", other, pos),
        }
    }
    Ok(tokens)
}

struct TermParser {
    tokens: Vec<Token>,
    pos: usize,
    /// Nesting level of the term being parsed
    depth: usize,
    max_depth: usize,
}

impl TermParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => bail!("expected {:?}, found {:?}", expected, token),
            None => bail!("expected {:?}, found end of input", expected),
        }
    }

    fn parse_term(&mut self) -> Result<Expr> {
        self.depth += 1;
        if self.depth > self.max_depth {
            bail!("term nested deeper than {} levels", self.max_depth);
        }
        let expr = self.parse_term_inner()?;
        self.depth -= 1;
        Ok(expr)
    }

    fn parse_term_inner(&mut self) -> Result<Expr> {
        match self.next() {
            Some(Token::Int(v)) => Ok(Expr::int(v)),
            Some(Token::Float(v)) => Ok(Expr::float(v)),
            Some(Token::Str(s)) => Ok(Expr::string(s)),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    self.parse_call(&name)
                } else {
                    Ok(Self::leaf(name))
                }
            }
            Some(token) => bail!("unexpected {:?}", token),
            None => bail!("unexpected end of input"),
        }
    }

    fn leaf(name: String) -> Expr {
        match name.to_ascii_lowercase().as_str() {
            "true" => Expr::bool(true),
            "false" => Expr::bool(false),
            "null" => Expr::null(),
            _ => Expr::column(name),
        }
    }

    /// Parse a call whose opening parenthesis was consumed
    fn parse_call(&mut self, name: &str) -> Result<Expr> {
        let lower = name.to_ascii_lowercase();
        if lower == "cast" {
            let operand = self.parse_term()?;
            self.expect(Token::Comma)?;
            let type_name = match self.next() {
                Some(Token::Ident(t)) => t,
                other => bail!("expected type name in cast, found {:?}", other),
            };
            self.expect(Token::RParen)?;
            let target = DataType::from_sql(&type_name)
                .ok_or_else(|| anyhow!("unknown type '{}'", type_name))?;
            return Ok(Expr::cast(operand, target));
        }

        let mut args = vec![self.parse_term()?];
        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            args.push(self.parse_term()?);
        }
        self.expect(Token::RParen)?;
        build_call(&lower, args).with_context(|| format!("in call to '{}'", name))
    }
}

fn binary_operator(name: &str) -> Option<BinaryOperator> {
    BinaryOperator::ALL
        .into_iter()
        .find(|op| op.function_name() == name)
}

fn build_call(name: &str, mut args: Vec<Expr>) -> Result<Expr> {
    let expr = match (name, args.len()) {
        ("and" | "or", n) if n >= 2 => {
            let combine = if name == "and" { Expr::and } else { Expr::or };
            let mut operands = args.into_iter();
            let first = operands.next().ok_or_else(|| anyhow!("missing operand"))?;
            operands.fold(first, |acc, next| {
                let mut combined = combine(acc, next);
                parenthesize_operands(&mut combined);
                combined
            })
        }
        ("not", 1) => {
            let mut expr = Expr::not(args.remove(0));
            parenthesize_operands(&mut expr);
            expr
        }
        ("in" | "not_in", n) if n >= 2 => {
            let value = args.remove(0);
            if name == "in" {
                Expr::in_list(value, args)
            } else {
                Expr::not_in_list(value, args)
            }
        }
        ("is_null", 1) => Expr::is_null(args.remove(0)),
        ("is_not_null", 1) => Expr::is_not_null(args.remove(0)),
        (op, 2) if binary_operator(op).is_some() => {
            let right = args.remove(1);
            let left = args.remove(0);
            let op = binary_operator(op).ok_or_else(|| anyhow!("unknown operator '{}'", op))?;
            Expr::binary(op, left, right)
        }
        (other, n) => bail!("unknown operator '{}' with {} operand(s)", other, n),
    };
    Ok(expr)
}

/// Parse a predicate written in term notation
pub fn parse_term(input: &str) -> Result<Expr> {
    parse_term_with_limit(input, DEFAULT_MAX_EXPR_DEPTH)
}

/// Parse a predicate, rejecting terms nested deeper than `max_depth`
pub fn parse_term_with_limit(input: &str, max_depth: usize) -> Result<Expr> {
    let mut parser = TermParser {
        tokens: tokenize(input)?,
        pos: 0,
        depth: 0,
        max_depth,
    };
    let expr = parser.parse_term()?;
    if let Some(token) = parser.peek() {
        bail!("unexpected trailing {:?}", token);
    }
    Ok(expr)
}
