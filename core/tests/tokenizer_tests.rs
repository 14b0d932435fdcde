use studygraph_core::tokenizer::{split_into_sentences, tokenize};

#[test]
fn it_normalizes_and_lowercases() {
    let words = tokenize("Running HEAPS: the café's menu, 2024 and ﬁle_system!");
    assert!(words.contains(&"running".to_string()));
    assert!(words.contains(&"heaps".to_string()));
    // NFKC folds the ligature
    assert!(words.contains(&"file_system".to_string()));
    assert!(words.contains(&"cafés".to_string()));
    // all-digit tokens are not informative
    assert!(!words.contains(&"2024".to_string()));
}

#[test]
fn it_filters_stopwords_and_short_tokens() {
    let words = tokenize("The quick brown fox and the lazy dog is on it");
    assert_eq!(words, vec!["quick", "brown", "fox", "lazy", "dog"]);
}

#[test]
fn sentences_feed_tokenizer() {
    let sentences = split_into_sentences("Heaps store priorities.\nTries store prefixes!");
    let groups: Vec<Vec<String>> = sentences.iter().map(|s| tokenize(s)).collect();
    assert_eq!(groups, vec![vec!["heaps", "store", "priorities"], vec!["tries", "store", "prefixes"]]);
}
