use crate::tokenizer::Normalizer;
use std::collections::{BTreeMap, HashMap};

pub type TermId = u32;
pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// 1-based position in the collection. [`build`] numbers postings by position regardless.
    pub id: DocId,
    pub name: String,
    pub terms: Vec<String>,
}

impl Document {
    pub fn new(id: DocId, name: impl Into<String>, terms: Vec<String>) -> Self {
        Self { id, name: name.into(), terms }
    }

    pub fn from_text(id: DocId, name: impl Into<String>, text: &str, normalizer: &dyn Normalizer) -> Self {
        Self::new(id, name, normalizer.terms(text))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub frequency: u32,
}

#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    pub dictionary: HashMap<String, TermId>,
    /// Term text by id, in first-seen order.
    pub terms: Vec<String>,
    pub postings: Vec<Vec<Posting>>, // postings sorted by doc_id
    pub num_docs: u32,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, term: &str) -> Option<&[Posting]> {
        self.dictionary.get(term).map(|&tid| self.postings[tid as usize].as_slice())
    }

    pub fn contains(&self, term: &str) -> bool { self.dictionary.contains_key(term) }

    pub fn doc_freq(&self, term: &str) -> usize { self.get(term).map_or(0, |p| p.len()) }

    /// Number of distinct terms.
    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub fn num_docs(&self) -> u32 { self.num_docs }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Posting])> + '_ {
        self.terms.iter().zip(self.postings.iter()).map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    fn term_id(&mut self, term: &str) -> TermId {
        if let Some(&tid) = self.dictionary.get(term) {
            return tid;
        }
        let tid = self.terms.len() as TermId;
        self.dictionary.insert(term.to_string(), tid);
        self.terms.push(term.to_string());
        self.postings.push(Vec::new());
        tid
    }
}

/// Build the inverted index in one pass over `documents`.
///
/// Postings are numbered by position in `documents`, starting at 1; `Document::id` is not consulted.
pub fn build(documents: &[Document]) -> InvertedIndex {
    let mut index = InvertedIndex::new();
    for (pos, doc) in documents.iter().enumerate() {
        let doc_id = pos as DocId + 1;
        let mut tf_counts: BTreeMap<&str, u32> = BTreeMap::new();
        for term in &doc.terms {
            *tf_counts.entry(term.as_str()).or_insert(0) += 1;
        }
        for (term, frequency) in tf_counts {
            let tid = index.term_id(term);
            index.postings[tid as usize].push(Posting { doc_id, frequency });
        }
    }
    index.num_docs = documents.len() as u32;
    tracing::debug!(num_docs = index.num_docs, num_terms = index.len(), "built inverted index");
    index
}
