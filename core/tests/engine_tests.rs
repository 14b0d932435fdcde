use studygraph_core::{Engine, EngineConfig};

fn two_notes() -> Engine {
    let mut engine = Engine::new();
    engine.ingest("a", "alpha beta gamma.");
    engine.ingest("b", "alpha beta delta.");
    engine
}

fn course_notes() -> Engine {
    let mut engine = Engine::new();
    engine.ingest(
        "ds.txt",
        "Binary heaps implement priority queues. Priority queues drive Dijkstra shortest paths. \
         Dijkstra needs graph adjacency lists. Heaps support sorting too!",
    );
    engine.ingest(
        "algo.txt",
        "Graph traversal uses queues. Dijkstra relaxes graph edges with priority queues. \
         Tries support prefix autocomplete.",
    );
    engine.ingest("misc.txt", "Unrelated gardening tomatoes.");
    engine
}

#[test]
fn end_to_end_two_documents() {
    let engine = two_notes();

    let hits = engine.search("alpha");
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.frequency == 1));
    let mut ids: Vec<&str> = hits.iter().map(|h| h.doc_id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["a", "b"]);

    let related = engine.related_topics("alpha", 1);
    assert_eq!(related[0], ("beta".to_string(), 2));
    let rest: Vec<(String, u32)> = related[1..].to_vec();
    assert_eq!(rest, vec![("gamma".to_string(), 1), ("delta".to_string(), 1)]);

    let clusters = engine.clusters(1);
    assert_eq!(clusters.len(), 1);
    let mut members = clusters[0].clone();
    members.sort();
    assert_eq!(members, vec!["alpha", "beta", "delta", "gamma"]);
}

#[test]
fn search_ranks_by_frequency() {
    let engine = course_notes();
    let hits = engine.search("dijkstra");
    assert_eq!(hits[0].doc_id, "ds.txt");
    assert_eq!(hits[0].frequency, 2);
    assert_eq!(hits[1].frequency, 1);
    assert!(hits.windows(2).all(|w| w[0].relevance >= w[1].relevance));
    assert_eq!(engine.search_top("dijkstra", 1).len(), 1);
    assert!(engine.search("nothing").is_empty());
}

#[test]
fn autocomplete_covers_every_prefix() {
    let engine = course_notes();
    for term in engine.autocomplete("") {
        for (k, _) in term.char_indices() {
            assert!(engine.autocomplete(&term[..k]).contains(&term));
        }
        assert!(engine.contains_term(&term));
    }
    assert_eq!(engine.autocomplete("prio"), vec!["priority"]);
}

#[test]
fn graph_queries_hold_their_invariants() {
    let engine = course_notes();

    for depth in 0..4 {
        let related = engine.related_topics("queues", depth);
        assert!(related.len() <= 6);
        assert!(related.windows(2).all(|w| w[0].1 >= w[1].1));
        if depth == 0 {
            assert!(related.is_empty());
        }
    }

    let path = engine.learning_path("heaps", 8);
    assert_eq!(path[0], "heaps");
    assert!(path.len() <= 8);
    let mut unique = path.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), path.len());
    assert!(engine.learning_path("gardening-tools", 8).is_empty());

    let clusters = engine.clusters(2);
    let mut seen = std::collections::HashSet::new();
    for cluster in &clusters {
        assert!(cluster.len() > 1);
        for term in cluster {
            assert!(seen.insert(term.clone()), "{term} in two clusters");
        }
    }
    assert!(clusters.windows(2).all(|w| w[0].len() >= w[1].len()));
    assert!(clusters.iter().any(|c| c.contains(&"priority".to_string()) && c.contains(&"queues".to_string())));
}

#[test]
fn snapshot_round_trip_reproduces_queries() {
    let engine = course_notes();
    let restored = Engine::from_snapshot(engine.export_state(), EngineConfig::default()).unwrap();

    assert_eq!(restored.export_state(), engine.export_state());
    assert_eq!(restored.stats(), engine.stats());
    assert_eq!(restored.list_documents(), engine.list_documents());
    assert_eq!(restored.autocomplete(""), engine.autocomplete(""));
    assert_eq!(restored.topics(), engine.topics());
    assert_eq!(restored.clusters(1), engine.clusters(1));
    assert_eq!(restored.clusters(2), engine.clusters(2));
    for term in engine.topics() {
        assert_eq!(restored.search(&term), engine.search(&term));
        assert_eq!(restored.related_topics(&term, 2), engine.related_topics(&term, 2));
        assert_eq!(restored.learning_path(&term, 8), engine.learning_path(&term, 8));
        assert_eq!(restored.mind_map(&term, 2), engine.mind_map(&term, 2));
    }
    assert_eq!(restored.snippet("algo.txt", "tries"), engine.snippet("algo.txt", "tries"));
}
