use serde::Serialize;
use std::collections::HashSet;

use crate::config::EngineConfig;
use crate::error::{Result, StoreError};
use crate::graph::{MindMap, TopicGraph};
use crate::index::{DocId, DocumentIndex, Term};
use crate::ranking::{RankedSelector, SearchResult};
use crate::snapshot::{ContentRecord, PostingRecord, Snapshot, TopicRecord, SNAPSHOT_VERSION};
use crate::tokenizer::{extract_snippet, split_into_sentences, tokenize};
use crate::trie::PrefixIndex;

pub const CONTENT_NOT_AVAILABLE: &str = "File content not available";
pub const KEYWORD_NOT_IN_CONTEXT: &str = "Keyword not found in context.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub doc_id: DocId,
    /// Term occurrences recorded in the keyword index.
    pub terms: usize,
    pub sentences: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub documents: usize,
    pub terms: usize,
    pub topics: usize,
    pub edges: usize,
}

/// Owns the prefix index, keyword index, topic graph and upload history of
/// one note collection. Not internally synchronised; wrap the whole engine
/// in a lock to share it between threads.
#[derive(Debug, Default, Clone)]
pub struct Engine {
    trie: PrefixIndex,
    index: DocumentIndex,
    graph: TopicGraph,
    documents: Vec<DocId>,
    config: EngineConfig,
}

impl Engine {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn from_snapshot(snapshot: Snapshot, config: EngineConfig) -> Result<Self> {
        let mut engine = Self::with_config(config);
        engine.import_state(snapshot)?;
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    /// Drops every indexed document but keeps the configuration.
    pub fn reset(&mut self) {
        self.trie.clear();
        self.index.clear();
        self.graph.clear();
        self.documents.clear();
    }

    /// Normalizes `text` and ingests it under `doc_id`.
    pub fn ingest(&mut self, doc_id: &str, text: &str) -> IngestReport {
        let terms = tokenize(text);
        let sentences: Vec<Vec<Term>> = split_into_sentences(text).iter().map(|s| tokenize(s)).collect();
        self.ingest_tokens(doc_id, text, &terms, &sentences)
    }

    /// Ingests already-normalized input: every term feeds the prefix and
    /// keyword indexes, and every pair of distinct terms sharing a sentence
    /// gains one unit of co-occurrence weight.
    pub fn ingest_tokens(&mut self, doc_id: &str, text: &str, terms: &[Term], sentences: &[Vec<Term>]) -> IngestReport {
        self.index.store_document_text(doc_id, text);

        let mut recorded = 0;
        for term in terms.iter().filter(|t| t.chars().count() > 2) {
            self.trie.insert(term);
            self.index.record_occurrence(term, doc_id);
            recorded += 1;
        }

        for group in sentences {
            let mut seen = HashSet::new();
            let distinct: Vec<&Term> = group.iter().filter(|t| seen.insert(t.as_str())).collect();
            for (i, a) in distinct.iter().enumerate() {
                self.graph.add_vertex(a);
                for b in &distinct[i + 1..] {
                    self.graph.bump_edge(a, b);
                }
            }
        }

        self.documents.push(doc_id.to_string());
        tracing::debug!(doc_id, terms = recorded, sentences = sentences.len(), "ingested document");
        IngestReport { doc_id: doc_id.to_string(), terms: recorded, sentences: sentences.len() }
    }

    pub fn autocomplete(&self, prefix: &str) -> Vec<Term> { self.trie.autocomplete(prefix) }

    pub fn contains_term(&self, term: &str) -> bool { self.trie.contains(term) }

    pub fn has_topic(&self, term: &str) -> bool { self.graph.contains(term) }

    /// Every document mentioning `term`, most mentions first.
    pub fn search(&self, term: &str) -> Vec<SearchResult> {
        self.search_top(term, usize::MAX)
    }

    pub fn search_top(&self, term: &str, k: usize) -> Vec<SearchResult> {
        let selector: RankedSelector = self.index.postings(term).into_iter().map(SearchResult::from).collect();
        selector.top_k(k.min(selector.len()))
    }

    pub fn related_topics(&self, term: &str, depth: usize) -> Vec<(Term, u32)> {
        self.graph.related_topics(term, depth)
    }

    pub fn clusters(&self, min_weight: u32) -> Vec<Vec<Term>> { self.graph.find_clusters(min_weight) }

    pub fn learning_path(&self, term: &str, max_topics: usize) -> Vec<Term> {
        self.graph.learning_path(term, max_topics)
    }

    pub fn mind_map(&self, term: &str, depth: usize) -> Option<MindMap> { self.graph.mind_map(term, depth) }

    pub fn topics(&self) -> Vec<Term> { self.graph.topics() }

    pub fn list_documents(&self) -> &[DocId] { &self.documents }

    pub fn document_text(&self, doc_id: &str) -> &str { self.index.document_text(doc_id) }

    /// Quoted context around `term` in the stored text of `doc_id`.
    pub fn snippet(&self, doc_id: &str, term: &str) -> String {
        if !self.index.has_document_text(doc_id) {
            return CONTENT_NOT_AVAILABLE.to_string();
        }
        extract_snippet(self.index.document_text(doc_id), term, self.config.snippet_context_words)
            .unwrap_or_else(|| KEYWORD_NOT_IN_CONTEXT.to_string())
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            documents: self.documents.len(),
            terms: self.trie.len(),
            topics: self.graph.num_vertices(),
            edges: self.graph.num_edges(),
        }
    }

    pub fn export_state(&self) -> Snapshot {
        let mut terms = self.trie.autocomplete("");
        terms.sort();

        let mut postings: Vec<PostingRecord> = self
            .index
            .iter_postings()
            .map(|(term, entries)| PostingRecord { term: term.clone(), entries: entries.clone() })
            .collect();
        postings.sort_by(|a, b| a.term.cmp(&b.term));

        let mut contents: Vec<ContentRecord> = self
            .index
            .iter_contents()
            .map(|(doc_id, text)| ContentRecord { doc_id: doc_id.clone(), text: text.clone() })
            .collect();
        contents.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));

        let topics = self
            .graph
            .adjacency()
            .into_iter()
            .map(|(term, edges)| TopicRecord { term, edges })
            .collect();

        Snapshot {
            version: SNAPSHOT_VERSION,
            terms,
            postings,
            contents,
            topics,
            documents: self.documents.clone(),
        }
    }

    /// Replaces all indexed state with `snapshot`. On error the engine is unchanged.
    pub fn import_state(&mut self, snapshot: Snapshot) -> Result<()> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion { found: snapshot.version, expected: SNAPSHOT_VERSION });
        }

        let mut trie = PrefixIndex::new();
        for term in &snapshot.terms {
            trie.insert(term);
        }

        let mut index = DocumentIndex::new();
        for record in snapshot.postings {
            index.insert_postings(record.term, record.entries);
        }
        for record in &snapshot.contents {
            index.store_document_text(&record.doc_id, &record.text);
        }

        let graph = TopicGraph::from_adjacency(
            snapshot.topics.into_iter().map(|r| (r.term, r.edges)).collect(),
        )?;

        self.trie = trie;
        self.index = index;
        self.graph = graph;
        self.documents = snapshot.documents;
        tracing::info!(documents = self.documents.len(), terms = self.trie.len(), "restored snapshot");
        Ok(())
    }
}
