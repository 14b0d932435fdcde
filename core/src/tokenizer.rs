use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

use crate::index::Term;

/// Snippets longer than this many characters are cut and suffixed with `...`.
const MAX_SNIPPET_CHARS: usize = 200;

lazy_static! {
    static ref SENTENCE: Regex = Regex::new(r"[^.!?]+[.!?]*|[.!?]+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "the","a","an","and","or","but","in","on","at","to","for",
            "of","with","by","as","is","was","are","were","be","been",
            "have","has","had","do","does","did","will","would","could",
            "should","may","might","must","this","that","these","those",
            "it","its","they","them","their","what","which","who","whom",
            "when","where","why","how","all","any","both","each","few",
            "more","most","other","some","such","no","nor","not","only",
            "own","same","so","than","too","very","can","just","now"
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Long enough to carry meaning and not a bare number.
fn is_informative(token: &str) -> bool {
    token.chars().count() > 2 && !token.chars().all(|c| c.is_ascii_digit())
}

fn strip_punctuation(word: &str, keep_joiners: bool) -> String {
    word.chars()
        .filter(|&c| !c.is_ascii_punctuation() || (keep_joiners && (c == '_' || c == '-')))
        .collect()
}

/// Tokenize text into terms: NFKC normalization, lowercase, punctuation
/// stripped (except `_` and `-`), stop words and short or numeric tokens dropped.
pub fn tokenize(text: &str) -> Vec<Term> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    normalized
        .split_whitespace()
        .map(|w| strip_punctuation(w, true))
        .filter(|t| !t.is_empty() && !is_stopword(t) && is_informative(t))
        .collect()
}

/// Lowercased, trimmed form of a user-typed query term.
pub fn normalize_query(query: &str) -> String {
    query.trim().nfkc().collect::<String>().to_lowercase()
}

/// Split text after each run of `.`, `!` or `?`. Pieces are trimmed and
/// keep their terminator; a trailing unterminated piece is kept as well.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    SENTENCE
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Words surrounding the first occurrence of `keyword` in `content`, quoted.
/// Matching is case-insensitive on punctuation-stripped words and accepts
/// partial matches (`graph` matches `graphs,`).
pub fn extract_snippet(content: &str, keyword: &str, context_words: usize) -> Option<String> {
    let needle = keyword.to_lowercase();
    if needle.is_empty() {
        return None;
    }
    let words: Vec<&str> = content.split_whitespace().collect();
    let pos = words
        .iter()
        .position(|w| strip_punctuation(&w.to_lowercase(), false).contains(&needle))?;
    let start = pos.saturating_sub(context_words);
    let end = (pos + context_words + 1).min(words.len());
    let mut snippet = words[start..end].join(" ");
    if snippet.chars().count() > MAX_SNIPPET_CHARS {
        snippet = snippet.chars().take(MAX_SNIPPET_CHARS).collect::<String>() + "...";
    }
    Some(format!("\"{snippet}\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("The Binary-Search tree, in C++!");
        assert_eq!(t, vec!["binary-search", "tree"]);
    }

    #[test]
    fn query_normalization() {
        assert_eq!(normalize_query("  Dijkstra "), "dijkstra");
    }

    #[test]
    fn sentences_keep_terminators() {
        let s = split_into_sentences("Graphs are fun. Are heaps?  Yes!! trailing bit");
        assert_eq!(s, vec!["Graphs are fun.", "Are heaps?", "Yes!!", "trailing bit"]);
    }

    #[test]
    fn snippet_window() {
        let text = "one two three four graphs, five six seven";
        assert_eq!(extract_snippet(text, "graph", 2).as_deref(), Some("\"three four graphs, five six\""));
        assert_eq!(extract_snippet(text, "absent", 2), None);
    }
}
