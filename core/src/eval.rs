use crate::error::{LookupError, Result};
use crate::index::{DocId, InvertedIndex};
use crate::query::{parse_query, Ast};
use crate::tokenizer::Normalizer;
use std::collections::BTreeSet;

/// Matching document ids, ascending.
pub type ResultSet = BTreeSet<DocId>;

/// Evaluates parsed queries against a read-only index.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    index: &'a InvertedIndex,
    universe_size: u32,
}

impl<'a> Evaluator<'a> {
    pub fn new(index: &'a InvertedIndex, universe_size: u32) -> Self {
        Self { index, universe_size }
    }

    /// Complement against every document the index was built from.
    pub fn for_index(index: &'a InvertedIndex) -> Self { Self::new(index, index.num_docs()) }

    /// Post-order walk with an explicit stack, left operand before right.
    pub fn evaluate(&self, ast: &Ast) -> std::result::Result<ResultSet, LookupError> {
        enum Step<'t> {
            Visit(&'t Ast),
            Combine(&'t Ast),
        }
        let mut steps = vec![Step::Visit(ast)];
        let mut operands: Vec<ResultSet> = Vec::new();
        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(node) => match node {
                    Ast::Term(value) => operands.push(self.lookup(value)?),
                    Ast::And(left, right) | Ast::Or(left, right) => {
                        steps.extend([Step::Combine(node), Step::Visit(right), Step::Visit(left)]);
                    }
                    Ast::Not(right) => steps.extend([Step::Combine(node), Step::Visit(right)]),
                },
                Step::Combine(node) => {
                    // operands are always pushed before the node that combines them
                    let right = operands.pop().unwrap_or_default();
                    let combined = match node {
                        Ast::And(..) => {
                            let left = operands.pop().unwrap_or_default();
                            left.intersection(&right).copied().collect()
                        }
                        Ast::Or(..) => {
                            let mut left = operands.pop().unwrap_or_default();
                            left.extend(right);
                            left
                        }
                        Ast::Not(_) => (1..=self.universe_size).filter(|id| !right.contains(id)).collect(),
                        Ast::Term(_) => right,
                    };
                    operands.push(combined);
                }
            }
        }
        Ok(operands.pop().unwrap_or_default())
    }

    fn lookup(&self, term: &str) -> std::result::Result<ResultSet, LookupError> {
        let postings = self.index.get(term).ok_or_else(|| LookupError::UnknownTerm(term.to_string()))?;
        Ok(postings.iter().map(|p| p.doc_id).collect())
    }

    /// A missing tree matches nothing.
    pub fn evaluate_optional(&self, ast: Option<&Ast>) -> std::result::Result<ResultSet, LookupError> {
        match ast {
            Some(ast) => self.evaluate(ast),
            None => Ok(ResultSet::new()),
        }
    }
}

pub fn evaluate(ast: &Ast, index: &InvertedIndex, universe_size: u32) -> std::result::Result<ResultSet, LookupError> {
    Evaluator::new(index, universe_size).evaluate(ast)
}

/// Parse `text` and evaluate it against `index` in one step.
pub fn search(text: &str, index: &InvertedIndex, normalizer: &dyn Normalizer) -> Result<ResultSet> {
    let ast = parse_query(text, normalizer)?;
    let hits = Evaluator::for_index(index).evaluate(&ast)?;
    tracing::debug!(query = text, total_hits = hits.len(), "evaluated query");
    Ok(hits)
}
