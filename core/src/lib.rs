//! In-memory note indexing and topic discovery.
//!
//! Documents are normalized by [`tokenizer`], then fed into a prefix trie
//! (autocomplete), an inverted keyword index (ranked search) and a weighted
//! co-occurrence graph (related topics, clusters, learning paths, mind maps).
//! [`Engine`] owns all of them.

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod index;
pub mod persist;
pub mod ranking;
pub mod snapshot;
pub mod tokenizer;
pub mod trie;

pub use config::EngineConfig;
pub use engine::{Engine, EngineStats, IngestReport};
pub use error::StoreError;
pub use graph::{Edge, MindMap, TopicGraph};
pub use index::{DocId, DocumentIndex, Posting, Term};
pub use ranking::{RankedSelector, SearchResult};
pub use snapshot::Snapshot;
pub use trie::PrefixIndex;
