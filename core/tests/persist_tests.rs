use studygraph_core::persist::{load_engine, load_meta, save_engine, save_snapshot, save_state, IndexPaths};
use studygraph_core::{Engine, EngineConfig, StoreError};
use tempfile::tempdir;

#[test]
fn saved_engine_loads_back() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path().join("index"));
    let mut engine = Engine::new();
    engine.ingest("notes/graphs.md", "Graphs have vertices. Vertices have edges.");

    let meta = save_engine(&paths, &engine, "2024-01-01T00:00:00Z").unwrap();
    assert!(paths.exists());
    assert_eq!(meta.num_docs, 1);
    assert_eq!(load_meta(&paths).unwrap(), meta);

    let loaded = load_engine(&paths, EngineConfig::default()).unwrap();
    assert_eq!(loaded.export_state(), engine.export_state());
    assert_eq!(loaded.related_topics("vertices", 1), engine.related_topics("vertices", 1));
}

#[test]
fn missing_index_is_an_io_error() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    assert!(!paths.exists());
    match load_engine(&paths, EngineConfig::default()) {
        Err(StoreError::Io { path, .. }) => assert_eq!(path, paths.snapshot()),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn corrupt_snapshot_is_a_decode_error() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    std::fs::write(paths.snapshot(), b"\x01garbage").unwrap();
    assert!(matches!(load_engine(&paths, EngineConfig::default()), Err(StoreError::Decode(_))));
}

#[test]
fn meta_counts_match_engine_stats() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let mut engine = Engine::new();
    engine.ingest("a.md", "Heaps order priorities.");
    engine.ingest("b.md", "Tries share prefixes.");

    let stats = engine.stats();
    let meta = save_state(&paths, &engine.export_state(), &stats, "2024-01-01T00:00:00Z").unwrap();
    assert_eq!(meta.num_docs, 2);
    assert_eq!(meta.num_terms, stats.terms);
    assert_eq!(meta.num_topics, stats.topics);
    assert_eq!(load_meta(&paths).unwrap(), meta);
}

#[test]
fn one_sided_edge_on_disk_is_rejected() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let mut engine = Engine::new();
    engine.ingest("a.md", "Alpha beta.");
    let mut snapshot = engine.export_state();
    let beta = snapshot.topics.iter_mut().find(|t| t.term == "beta").unwrap();
    beta.edges.clear();
    assert_eq!(snapshot.topics[0].edges.len(), 1);
    save_snapshot(&paths, &snapshot).unwrap();

    assert!(matches!(load_engine(&paths, EngineConfig::default()), Err(StoreError::InvalidSnapshot(_))));
}
