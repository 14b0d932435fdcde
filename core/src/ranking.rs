use serde::Serialize;
use std::cmp::Ordering;

use crate::index::{DocId, Posting};

/// A ranked search candidate. Relevance starts out equal to the frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub doc_id: DocId,
    pub frequency: u32,
    pub relevance: f64,
}

impl SearchResult {
    pub fn new(doc_id: DocId, frequency: u32) -> Self {
        Self { doc_id, frequency, relevance: f64::from(frequency) }
    }

    /// Heap key: lower relevance is weaker; among equals the larger doc id is weaker.
    fn strength(&self, other: &Self) -> Ordering {
        self.relevance
            .partial_cmp(&other.relevance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.doc_id.cmp(&self.doc_id))
    }
}

impl From<Posting> for SearchResult {
    fn from(p: Posting) -> Self { Self::new(p.doc_id, p.frequency) }
}

/// Binary min-heap whose root is always the weakest kept candidate.
#[derive(Debug, Default, Clone)]
pub struct RankedSelector {
    heap: Vec<SearchResult>,
}

impl RankedSelector {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.heap.len() }

    pub fn is_empty(&self) -> bool { self.heap.is_empty() }

    pub fn push(&mut self, candidate: SearchResult) {
        self.heap.push(candidate);
        self.sift_up(self.heap.len() - 1);
    }

    /// Removes and returns the weakest candidate.
    pub fn pop(&mut self) -> Option<SearchResult> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let weakest = self.heap.pop();
        self.sift_down(0);
        weakest
    }

    pub fn peek(&self) -> Option<&SearchResult> { self.heap.first() }

    /// The `k` strongest candidates, strongest first. Leaves `self` untouched.
    pub fn top_k(&self, k: usize) -> Vec<SearchResult> {
        if k == 0 {
            return Vec::new();
        }
        let mut kept = RankedSelector::new();
        for candidate in &self.heap {
            kept.push(candidate.clone());
            if kept.len() > k {
                kept.pop();
            }
        }
        // Draining a min-heap yields ascending strength.
        let mut out = Vec::with_capacity(kept.len());
        while let Some(c) = kept.pop() {
            out.push(c);
        }
        out.reverse();
        out
    }

    pub fn clear(&mut self) { self.heap.clear(); }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[index].strength(&self.heap[parent]) == Ordering::Less {
                self.heap.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let size = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;
            if left < size && self.heap[left].strength(&self.heap[smallest]) == Ordering::Less {
                smallest = left;
            }
            if right < size && self.heap[right].strength(&self.heap[smallest]) == Ordering::Less {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.heap.swap(index, smallest);
            index = smallest;
        }
    }

    #[cfg(test)]
    fn is_min_heap(&self) -> bool {
        (1..self.heap.len()).all(|i| self.heap[i].strength(&self.heap[(i - 1) / 2]) != Ordering::Less)
    }
}

impl FromIterator<SearchResult> for RankedSelector {
    fn from_iter<I: IntoIterator<Item = SearchResult>>(iter: I) -> Self {
        let mut selector = RankedSelector::new();
        for candidate in iter {
            selector.push(candidate);
        }
        selector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(freqs: &[u32]) -> RankedSelector {
        freqs
            .iter()
            .enumerate()
            .map(|(i, f)| SearchResult::new(format!("doc{i}"), *f))
            .collect()
    }

    #[test]
    fn heap_property_holds_after_push_and_pop() {
        let mut sel = candidates(&[7, 3, 9, 1, 4, 4, 8, 2]);
        assert!(sel.is_min_heap());
        assert_eq!(sel.pop().map(|c| c.frequency), Some(1));
        assert!(sel.is_min_heap());
        assert_eq!(sel.peek().map(|c| c.frequency), Some(2));
        sel.push(SearchResult::new("late".into(), 0));
        assert!(sel.is_min_heap());
        assert_eq!(sel.pop().map(|c| c.doc_id), Some("late".to_string()));
    }

    #[test]
    fn top_k_is_descending_and_bounded() {
        let sel = candidates(&[5, 1, 9, 3, 7]);
        let top: Vec<u32> = sel.top_k(3).iter().map(|c| c.frequency).collect();
        assert_eq!(top, vec![9, 7, 5]);
        assert_eq!(sel.top_k(10).len(), 5);
        assert!(sel.top_k(0).is_empty());
        assert_eq!(sel.len(), 5);
    }

    #[test]
    fn ties_break_by_doc_id() {
        let sel: RankedSelector = ["b", "c", "a"]
            .iter()
            .map(|d| SearchResult::new(d.to_string(), 2))
            .collect();
        let ids: Vec<String> = sel.top_k(3).into_iter().map(|c| c.doc_id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn pop_on_empty_and_clear() {
        let mut sel = candidates(&[1, 2]);
        sel.clear();
        assert!(sel.is_empty());
        assert_eq!(sel.pop(), None);
        assert!(sel.top_k(3).is_empty());
    }
}
