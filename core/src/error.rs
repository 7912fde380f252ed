use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// A query that could not be turned into an [`Ast`](crate::Ast).
///
/// Positions are indices into the token stream, starting at 0.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty query")]
    EmptyQuery,

    #[error("missing operand after '{after}' at position {position}")]
    MissingOperand { after: String, position: usize },

    #[error("unexpected token at position {position}: expected {expected}, received '{token}'")]
    UnexpectedToken { token: String, position: usize, expected: &'static str },
}

impl ParseError {
    /// Token index the failure points at.
    pub fn position(&self) -> usize {
        match self {
            ParseError::EmptyQuery => 0,
            ParseError::MissingOperand { position, .. } | ParseError::UnexpectedToken { position, .. } => *position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("term not found in index: {0}")]
    UnknownTerm(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error in {}: {source}", path.display())]
    Config { path: PathBuf, source: serde_json::Error },
}
