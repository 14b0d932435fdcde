use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A normalized keyword: lowercase, stop words and short tokens already removed.
pub type Term = String;
/// Source name of an ingested document.
pub type DocId = String;

/// Sentinel returned when a document's text was never stored.
pub const TEXT_NOT_AVAILABLE: &str = "not available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub frequency: u32,
}

/// Inverted keyword index plus the raw text of each document for snippets.
#[derive(Debug, Default, Clone)]
pub struct DocumentIndex {
    postings: HashMap<Term, Vec<Posting>>, // at most one entry per doc_id
    contents: HashMap<DocId, String>,
}

impl DocumentIndex {
    pub fn new() -> Self { Self::default() }

    pub fn record_occurrence(&mut self, term: &str, doc_id: &str) {
        let list = self.postings.entry(term.to_string()).or_default();
        match list.iter_mut().find(|p| p.doc_id == doc_id) {
            Some(p) => p.frequency += 1,
            None => list.push(Posting { doc_id: doc_id.to_string(), frequency: 1 }),
        }
    }

    /// Postings for `term` in storage order; callers rank them.
    pub fn postings(&self, term: &str) -> Vec<Posting> {
        self.postings.get(term).cloned().unwrap_or_default()
    }

    pub fn contains_term(&self, term: &str) -> bool { self.postings.contains_key(term) }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn store_document_text(&mut self, doc_id: &str, text: &str) {
        self.contents.insert(doc_id.to_string(), text.to_string());
    }

    pub fn document_text(&self, doc_id: &str) -> &str {
        self.contents.get(doc_id).map(String::as_str).unwrap_or(TEXT_NOT_AVAILABLE)
    }

    pub fn has_document_text(&self, doc_id: &str) -> bool { self.contents.contains_key(doc_id) }

    pub(crate) fn iter_postings(&self) -> impl Iterator<Item = (&Term, &Vec<Posting>)> {
        self.postings.iter()
    }

    pub(crate) fn iter_contents(&self) -> impl Iterator<Item = (&DocId, &String)> {
        self.contents.iter()
    }

    pub(crate) fn insert_postings(&mut self, term: Term, entries: Vec<Posting>) {
        self.postings.insert(term, entries);
    }

    pub fn clear(&mut self) {
        self.postings.clear();
        self.contents.clear();
    }
}
