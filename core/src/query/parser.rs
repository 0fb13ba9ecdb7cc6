use super::lexer::{render, tokenize, Token};
use super::QueryConfig;
use crate::error::QueryError;
use std::fmt;

/// Boolean query AST. Built per query and dropped after evaluation.
///
/// A chain of one operator, `a or b or c`, is a single node holding every
/// operand, so long chains stay shallow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Term(String),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    fn chain(mut operands: Vec<Expr>, join: fn(Vec<Expr>) -> Expr) -> Expr {
        if operands.len() == 1 {
            if let Some(single) = operands.pop() {
                return single;
            }
        }
        join(operands)
    }
}

// left-associative rendering: ((a and b) and c)
fn write_chain(f: &mut fmt::Formatter<'_>, operands: &[Expr], op: &str) -> fmt::Result {
    for _ in 1..operands.len() {
        f.write_str("(")?;
    }
    for (i, x) in operands.iter().enumerate() {
        if i == 0 {
            write!(f, "{x}")?;
        } else {
            write!(f, " {op} {x})")?;
        }
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Term(t) => f.write_str(t),
            Expr::And(xs) => write_chain(f, xs, "and"),
            Expr::Or(xs) => write_chain(f, xs, "or"),
            Expr::Not(x) => write!(f, "not {x}"),
        }
    }
}

/// What the next operand is expected for.
#[derive(Clone, Copy)]
enum Slot {
    Start,
    Operator(&'static str),
    Group(usize),
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> { self.tokens.get(self.pos) }

    fn descend(&mut self) -> Result<(), QueryError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(QueryError::NestingTooDeep { limit: self.max_depth });
        }
        Ok(())
    }

    // or_expr := and_expr ( "or" and_expr )*
    fn parse_or(&mut self, slot: Slot) -> Result<Expr, QueryError> {
        let mut operands = vec![self.parse_and(slot)?];
        while let Some(Token::Or) = self.peek() {
            self.pos += 1;
            operands.push(self.parse_and(Slot::Operator("or"))?);
        }
        Ok(Expr::chain(operands, Expr::Or))
    }

    // and_expr := not_expr ( "and" not_expr )*
    fn parse_and(&mut self, slot: Slot) -> Result<Expr, QueryError> {
        let mut operands = vec![self.parse_not(slot)?];
        while let Some(Token::And) = self.peek() {
            self.pos += 1;
            operands.push(self.parse_not(Slot::Operator("and"))?);
        }
        Ok(Expr::chain(operands, Expr::And))
    }

    // not_expr := "not" not_expr | atom
    // atom     := term | "(" expr ")"
    fn parse_not(&mut self, slot: Slot) -> Result<Expr, QueryError> {
        let at = self.pos;
        let err = match (self.peek(), slot) {
            (Some(Token::Not), _) => {
                self.pos += 1;
                self.descend()?;
                let operand = self.parse_not(Slot::Operator("not"))?;
                self.depth -= 1;
                return Ok(Expr::Not(Box::new(operand)));
            }
            (Some(Token::Term(t)), _) => {
                self.pos += 1;
                return Ok(Expr::Term(t.clone()));
            }
            (Some(Token::LParen), _) => return self.parse_group(at),
            (Some(Token::RParen), Slot::Group(open)) => QueryError::EmptyGroup { position: open },
            (Some(Token::RParen), Slot::Start) => QueryError::UnexpectedCloseParen { position: at },
            (Some(Token::And), Slot::Start | Slot::Group(_)) => QueryError::MissingOperand { operator: "and", side: "left" },
            (Some(Token::Or), Slot::Start | Slot::Group(_)) => QueryError::MissingOperand { operator: "or", side: "left" },
            (None, Slot::Group(open)) => QueryError::UnclosedParen { position: open },
            (None, Slot::Start) => QueryError::UnexpectedEnd,
            (_, Slot::Operator(op)) => QueryError::MissingOperand { operator: op, side: "right" },
        };
        Err(err)
    }

    fn parse_group(&mut self, open: usize) -> Result<Expr, QueryError> {
        self.pos += 1;
        self.descend()?;
        let inner = self.parse_or(Slot::Group(open))?;
        match self.peek() {
            Some(Token::RParen) => self.pos += 1,
            _ => return Err(QueryError::UnclosedParen { position: open }),
        }
        self.depth -= 1;
        Ok(inner)
    }
}

/// Parse a token stream as one complete expression. An empty stream is
/// [`QueryError::UnexpectedEnd`].
pub fn parse_tokens(tokens: &[Token], config: &QueryConfig) -> Result<Expr, QueryError> {
    let mut parser = Parser { tokens, pos: 0, depth: 0, max_depth: config.max_nesting_depth };
    let expr = parser.parse_or(Slot::Start)?;
    match tokens.get(parser.pos) {
        None => Ok(expr),
        Some(Token::RParen) => Err(QueryError::UnexpectedCloseParen { position: parser.pos }),
        Some(_) => Err(QueryError::TrailingInput { residual: render(&tokens[parser.pos..]) }),
    }
}

/// Parse a boolean query into an AST. `Ok(None)` for a blank query.
pub fn parse(query: &str, config: &QueryConfig) -> Result<Option<Expr>, QueryError> {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Ok(None);
    }
    parse_tokens(&tokens, config).map(Some)
}
