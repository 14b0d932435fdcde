use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use studygraph_core::persist::{load_engine, save_engine, IndexPaths};
use studygraph_core::tokenizer::normalize_query;
use studygraph_core::{Engine, EngineConfig};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Index study notes and explore their topics", long_about = None)]
struct Cli {
    /// Index directory used by the query commands
    #[arg(long, global = true, default_value = "./index")]
    index: String,
    /// Optional TOML file overriding query defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a note file or a directory of .txt/.md notes
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Add to an existing index instead of starting fresh
        #[arg(long, default_value_t = false)]
        append: bool,
    },
    /// Rank documents mentioning a term
    Search {
        term: String,
        /// Number of documents to show
        #[arg(long)]
        k: Option<usize>,
    },
    /// Complete a term prefix
    Complete {
        prefix: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Topics related to a term
    Related {
        topic: String,
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Suggested study order starting at a topic
    Path {
        topic: String,
        #[arg(long)]
        max: Option<usize>,
    },
    /// Neighbourhood of a topic as a tree, or as Graphviz with --dot
    Mindmap {
        topic: String,
        #[arg(long)]
        depth: Option<usize>,
        /// Write a DOT file instead of printing the tree
        #[arg(long)]
        dot: Option<PathBuf>,
    },
    /// Groups of strongly related topics
    Clusters {
        #[arg(long)]
        min_weight: Option<u32>,
    },
    /// Uploaded documents in ingestion order
    Docs,
    /// Index totals
    Stats,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::from_toml_file(path)?,
        None => EngineConfig::default(),
    };

    if let Commands::Build { input, output, append } = &cli.command {
        return build_index(input, output, *append, config);
    }

    let paths = IndexPaths::new(&cli.index);
    if !paths.exists() {
        bail!("no index found in {} (run `indexer build` first)", cli.index);
    }
    let engine = load_engine(&paths, config)?;
    run_query(&engine, cli.command, cli.json)
}

fn build_index(input: &str, output: &str, append: bool, config: EngineConfig) -> Result<()> {
    let input_path = Path::new(input);
    let out_paths = IndexPaths::new(output);

    let mut engine = if append && out_paths.exists() {
        load_engine(&out_paths, config)?
    } else {
        Engine::with_config(config)
    };

    let notes = collect_notes(input_path)?;
    if notes.is_empty() {
        tracing::warn!(input, "no .txt or .md notes found");
    }
    let mut ingested = 0usize;
    for (doc_id, file) in notes {
        match fs::read_to_string(&file) {
            Ok(text) => {
                let report = engine.ingest(&doc_id, &text);
                tracing::info!(doc_id = %report.doc_id, terms = report.terms, sentences = report.sentences, "uploaded");
                ingested += 1;
            }
            Err(err) => tracing::warn!(file = %file.display(), %err, "skipping unreadable note"),
        }
    }

    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    let meta = save_engine(&out_paths, &engine, &created_at)?;
    tracing::info!(output, ingested, num_docs = meta.num_docs, num_terms = meta.num_terms, "index build complete");
    Ok(())
}

/// Note files under `input` paired with their document ids. A directory
/// yields paths relative to it; a single file is named by its file name.
fn collect_notes(input: &Path) -> Result<Vec<(String, PathBuf)>> {
    if input.is_file() {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("input file has no name")?;
        return Ok(vec![(name, input.to_path_buf())]);
    }
    if !input.is_dir() {
        bail!("input path {} does not exist", input.display());
    }
    let mut notes = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if !p.is_file() {
            continue;
        }
        if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
            if matches!(ext, "txt" | "md") {
                let rel = p.strip_prefix(input).unwrap_or(p);
                notes.push((rel.to_string_lossy().replace('\\', "/"), p.to_path_buf()));
            }
        }
    }
    Ok(notes)
}

fn run_query(engine: &Engine, command: Commands, json: bool) -> Result<()> {
    let cfg = engine.config().clone();
    match command {
        Commands::Build { .. } => unreachable!("handled before loading the index"),
        Commands::Search { term, k } => {
            let term = normalize_query(&term);
            let hits = engine.search_top(&term, k.unwrap_or(cfg.search_limit));
            let related = engine.related_topics(&term, cfg.related_depth);
            if json {
                return print_json(&serde_json::json!({ "query": term, "results": hits, "related": related }));
            }
            if hits.is_empty() {
                println!("No results found for: {term}");
                return Ok(());
            }
            println!("=== Search Results: {term} ===");
            for (i, hit) in hits.iter().enumerate() {
                println!("{}. {} ({} mentions)", i + 1, hit.doc_id, hit.frequency);
            }
            println!("\n--- Snippet from {} ---\n{}", hits[0].doc_id, engine.snippet(&hits[0].doc_id, &term));
            if !related.is_empty() {
                println!("\n--- Related topics ---");
                for (topic, weight) in related {
                    println!("- {topic} (strength: {weight})");
                }
            }
        }
        Commands::Complete { prefix, limit } => {
            let mut suggestions = engine.autocomplete(&normalize_query(&prefix));
            suggestions.truncate(limit);
            if json {
                return print_json(&suggestions);
            }
            for s in suggestions {
                println!("{s}");
            }
        }
        Commands::Related { topic, depth } => {
            let related = engine.related_topics(&normalize_query(&topic), depth.unwrap_or(cfg.related_depth));
            if json {
                return print_json(&related);
            }
            for (topic, weight) in related {
                println!("{topic} (strength: {weight})");
            }
        }
        Commands::Path { topic, max } => {
            let topic = normalize_query(&topic);
            if !engine.has_topic(&topic) {
                println!("Topic not found. Upload notes first.");
                return Ok(());
            }
            let path = engine.learning_path(&topic, max.unwrap_or(cfg.learning_path_len));
            if json {
                return print_json(&path);
            }
            if path.len() < 3 {
                println!("Insufficient connections to build learning path.");
                return Ok(());
            }
            println!("=== Learning Path: {topic} ===");
            for (i, step) in path.iter().enumerate() {
                println!(" {}. {step}", i + 1);
            }
        }
        Commands::Mindmap { topic, depth, dot } => {
            let topic = normalize_query(&topic);
            let Some(map) = engine.mind_map(&topic, depth.unwrap_or(cfg.mindmap_depth)) else {
                println!("Topic not found. Upload notes first.");
                return Ok(());
            };
            match dot {
                Some(path) => {
                    fs::write(&path, map.to_dot()).with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!(path = %path.display(), nodes = map.nodes.len(), "wrote mind map");
                }
                None if json => return print_json(&map),
                None => print!("{}", map.render_tree()),
            }
        }
        Commands::Clusters { min_weight } => {
            let clusters = engine.clusters(min_weight.unwrap_or(cfg.cluster_min_weight));
            if json {
                return print_json(&clusters);
            }
            for (i, cluster) in clusters.iter().enumerate() {
                println!("{}. {}", i + 1, cluster.join(", "));
            }
        }
        Commands::Docs => {
            if json {
                return print_json(&engine.list_documents());
            }
            for doc in engine.list_documents() {
                println!("{doc}");
            }
        }
        Commands::Stats => {
            let stats = engine.stats();
            if json {
                return print_json(&stats);
            }
            println!(
                "documents: {}\nterms: {}\ntopics: {}\nedges: {}",
                stats.documents, stats.terms, stats.topics, stats.edges
            );
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
