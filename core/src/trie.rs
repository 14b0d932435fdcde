use std::collections::BTreeMap;

use crate::index::Term;

#[derive(Debug, Default, Clone)]
struct TrieNode {
    children: BTreeMap<char, usize>,
    /// Set when the path from the root to this node spells an inserted term.
    term: Option<Term>,
}

/// Prefix tree over indexed terms, used for autocomplete.
///
/// Nodes live in a flat arena and refer to their children by index, so
/// clearing the trie drops every node at once.
#[derive(Debug, Clone)]
pub struct PrefixIndex {
    nodes: Vec<TrieNode>,
    len: usize,
}

impl Default for PrefixIndex {
    fn default() -> Self {
        Self { nodes: vec![TrieNode::default()], len: 0 }
    }
}

impl PrefixIndex {
    pub fn new() -> Self { Self::default() }

    /// Number of distinct terms stored.
    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn insert(&mut self, term: &str) {
        let mut current = 0;
        for c in term.chars() {
            current = match self.nodes[current].children.get(&c) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[current].children.insert(c, next);
                    next
                }
            };
        }
        let node = &mut self.nodes[current];
        if node.term.is_none() {
            node.term = Some(term.to_string());
            self.len += 1;
        }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.walk(term).map_or(false, |idx| self.nodes[idx].term.is_some())
    }

    /// Every stored term starting with `prefix`, in child (character) order.
    /// An empty prefix enumerates the whole trie.
    pub fn autocomplete(&self, prefix: &str) -> Vec<Term> {
        let mut out = Vec::new();
        let Some(start) = self.walk(prefix) else { return out };
        // Children are pushed in reverse so the pre-order matches a recursive walk.
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if let Some(term) = &node.term {
                out.push(term.clone());
            }
            stack.extend(node.children.values().rev().copied());
        }
        out
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn walk(&self, path: &str) -> Option<usize> {
        let mut current = 0;
        for c in path.chars() {
            current = *self.nodes[current].children.get(&c)?;
        }
        Some(current)
    }
}
