//! Versioned, field-tagged snapshot of an [`Engine`](crate::Engine).
//!
//! Record order is part of the format: terms, postings and contents are
//! sorted by key, while topic records keep vertex insertion order and each
//! vertex keeps its edge order, so a restored engine answers every query
//! exactly as the exporting engine did.

use serde::{Deserialize, Serialize};

use crate::graph::Edge;
use crate::index::{DocId, Posting, Term};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingRecord {
    pub term: Term,
    pub entries: Vec<Posting>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub doc_id: DocId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub term: Term,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    /// Prefix-index terms.
    pub terms: Vec<Term>,
    pub postings: Vec<PostingRecord>,
    pub contents: Vec<ContentRecord>,
    pub topics: Vec<TopicRecord>,
    /// Upload history, duplicates included.
    pub documents: Vec<DocId>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            terms: Vec::new(),
            postings: Vec::new(),
            contents: Vec::new(),
            topics: Vec::new(),
            documents: Vec::new(),
        }
    }
}
