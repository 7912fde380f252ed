pub mod error;
pub mod eval;
pub mod index;
pub mod persist;
pub mod query;
pub mod tokenizer;

pub use error::{Error, LookupError, ParseError, Result};
pub use eval::{evaluate, search, Evaluator, ResultSet};
pub use index::{build, DocId, Document, InvertedIndex, Posting, TermId};
pub use query::{parse_query, Ast, Operator, Parser};
pub use tokenizer::{Language, Normalizer, NormalizerConfig, TextNormalizer};
