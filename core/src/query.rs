//! Boolean query language: `casa & rua | !bola`.
//!
//! ```text
//! Query  := Term (BinOp Term)*
//! Term   := '!' Term | TERM_TOKEN
//! BinOp  := '&' | '|'
//! ```
//!
//! There is no precedence between `&` and `|`: binary operators fold left to
//! right, so `a & b | c` is `(a & b) | c` and `a | b & c` is `(a | b) & c`.

use crate::error::ParseError;
use crate::tokenizer::Normalizer;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Not,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::And => "&",
            Operator::Or => "|",
            Operator::Not => "!",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "&" => Some(Operator::And),
            "|" => Some(Operator::Or),
            "!" => Some(Operator::Not),
            _ => None,
        }
    }
}

/// Parsed query. `Term` values are already stemmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    Term(String),
    And(Box<Ast>, Box<Ast>),
    Or(Box<Ast>, Box<Ast>),
    Not(Box<Ast>),
}

impl Ast {
    pub fn term(value: impl Into<String>) -> Self { Ast::Term(value.into()) }

    pub fn and(left: Ast, right: Ast) -> Self { Ast::And(Box::new(left), Box::new(right)) }

    pub fn or(left: Ast, right: Ast) -> Self { Ast::Or(Box::new(left), Box::new(right)) }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Ast) -> Self { Ast::Not(Box::new(inner)) }

    /// Operator of an inner node, `None` for a leaf.
    pub fn kind(&self) -> Option<Operator> {
        match self {
            Ast::Term(_) => None,
            Ast::And(..) => Some(Operator::And),
            Ast::Or(..) => Some(Operator::Or),
            Ast::Not(_) => Some(Operator::Not),
        }
    }
}

// Deep `!` chains and long `&`/`|` chains would otherwise recurse once per node.
impl Drop for Ast {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        detach_children(self, &mut stack);
        while let Some(mut node) = stack.pop() {
            detach_children(&mut node, &mut stack);
        }
    }
}

fn detach_children(node: &mut Ast, stack: &mut Vec<Ast>) {
    let leaf = || Ast::Term(String::new());
    match node {
        Ast::Term(_) => {}
        Ast::And(left, right) | Ast::Or(left, right) => {
            stack.push(std::mem::replace(&mut **left, leaf()));
            stack.push(std::mem::replace(&mut **right, leaf()));
        }
        Ast::Not(inner) => stack.push(std::mem::replace(&mut **inner, leaf())),
    }
}

impl Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Piece<'a> {
            Node(&'a Ast),
            Text(&'static str),
        }
        let mut stack = vec![Piece::Node(self)];
        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Node(Ast::Term(value)) => f.write_str(value)?,
                Piece::Node(Ast::Not(inner)) => {
                    f.write_str("!")?;
                    stack.push(Piece::Node(inner));
                }
                Piece::Node(Ast::And(left, right)) => {
                    f.write_str("(")?;
                    stack.extend([Piece::Text(")"), Piece::Node(right), Piece::Text(" & "), Piece::Node(left)]);
                }
                Piece::Node(Ast::Or(left, right)) => {
                    f.write_str("(")?;
                    stack.extend([Piece::Text(")"), Piece::Node(right), Piece::Text(" | "), Piece::Node(left)]);
                }
            }
        }
        Ok(())
    }
}

/// Cursor over a query token stream.
pub struct Parser<'n> {
    tokens: Vec<String>,
    position: usize,
    normalizer: &'n dyn Normalizer,
}

impl<'n> Parser<'n> {
    pub fn new(tokens: Vec<String>, normalizer: &'n dyn Normalizer) -> Self {
        Self { tokens, position: 0, normalizer }
    }

    pub fn parse(mut self) -> Result<Ast, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::EmptyQuery);
        }
        let mut left = self.parse_term(None)?;
        while let Some(token) = self.next() {
            let position = self.position - 1;
            let op = match Operator::from_token(&token) {
                Some(op @ (Operator::And | Operator::Or)) => op,
                _ => {
                    return Err(ParseError::UnexpectedToken { token, position, expected: "binary operator" });
                }
            };
            let right = self.parse_term(Some(op))?;
            left = match op {
                Operator::And => Ast::and(left, right),
                _ => Ast::or(left, right),
            };
        }
        tracing::debug!(tokens = self.tokens.len(), "parsed query");
        Ok(left)
    }

    fn next(&mut self) -> Option<String> {
        let token = self.tokens.get(self.position).cloned()?;
        self.position += 1;
        Some(token)
    }

    /// `after` is the operator that demanded this term, if any.
    fn parse_term(&mut self, mut after: Option<Operator>) -> Result<Ast, ParseError> {
        let mut negations = 0usize;
        loop {
            let position = self.position;
            let token = match self.next() {
                Some(token) => token,
                None => {
                    let after = after.map_or("", Operator::symbol).to_string();
                    return Err(ParseError::MissingOperand { after, position });
                }
            };
            if Operator::from_token(&token) == Some(Operator::Not) {
                negations += 1;
                after = Some(Operator::Not);
                continue;
            }
            if !token.chars().all(char::is_alphabetic) {
                return Err(ParseError::UnexpectedToken { token, position, expected: "term" });
            }
            let mut ast = Ast::Term(self.normalizer.stem(&token));
            for _ in 0..negations {
                ast = Ast::not(ast);
            }
            return Ok(ast);
        }
    }
}

/// Tokenize `text` with `normalizer` and parse it.
pub fn parse_query(text: &str, normalizer: &dyn Normalizer) -> Result<Ast, ParseError> {
    Parser::new(normalizer.tokenize(text), normalizer).parse()
}
