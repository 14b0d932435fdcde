use criterion::{criterion_group, criterion_main, Criterion};
use studygraph_core::tokenizer::tokenize;
use studygraph_core::Engine;

const NOTES: &str = "Binary heaps implement priority queues. Priority queues drive Dijkstra shortest paths. \
Dijkstra needs graph adjacency lists. Tries support prefix autocomplete for indexed keywords. \
Graph traversal with breadth-first search visits neighbours level by level!";

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_notes", |b| b.iter(|| tokenize(NOTES)));
}

fn bench_ingest(c: &mut Criterion) {
    c.bench_function("ingest_notes", |b| {
        b.iter(|| {
            let mut engine = Engine::new();
            for i in 0..20 {
                engine.ingest(&format!("note{i}.txt"), NOTES);
            }
            engine
        })
    });
}

criterion_group!(benches, bench_tokenize, bench_ingest);
criterion_main!(benches);
