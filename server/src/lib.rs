use anyhow::Result;
use axum::{extract::{Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use studygraph_core::persist::{load_engine, save_state, IndexPaths, MetaFile};
use studygraph_core::tokenizer::normalize_query;
use studygraph_core::{Engine, EngineConfig, MindMap, Term};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, String);

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total: usize,
    pub results: Vec<SearchHit>,
    pub related: Vec<RelatedTopic>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub filename: String,
    pub frequency: u32,
    pub snippet: String,
}

#[derive(Serialize)]
pub struct RelatedTopic {
    pub topic: Term,
    pub weight: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_files: usize,
    pub total_terms: usize,
    pub total_topics: usize,
    pub total_edges: usize,
    pub uploaded_files: Vec<String>,
}

#[derive(Deserialize)]
pub struct AutocompleteParams {
    pub prefix: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}
fn default_limit() -> usize { 10 }

#[derive(Deserialize)]
pub struct TopicParams {
    pub topic: String,
    pub depth: Option<usize>,
    pub max: Option<usize>,
}

#[derive(Deserialize)]
pub struct ClusterParams {
    pub min_weight: Option<u32>,
}

#[derive(Serialize)]
pub struct PathStep {
    pub order: usize,
    pub topic: Term,
}

#[derive(Serialize)]
pub struct LearningPathResponse {
    pub topic: Term,
    pub path: Vec<PathStep>,
}

#[derive(Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub terms: usize,
    pub sentences: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<Engine>>,
    pub index_paths_root: PathBuf,
    pub admin_token: Option<String>,
}

pub fn build_app(index_dir: String) -> Result<Router> {
    build_app_with_config(index_dir, EngineConfig::default())
}

pub fn build_app_with_config(index_dir: String, config: EngineConfig) -> Result<Router> {
    // Resume from a saved index when there is one
    let index_paths = IndexPaths::new(&index_dir);
    let engine = if index_paths.exists() {
        load_engine(&index_paths, config)?
    } else {
        tracing::info!(index_dir = %index_dir, "no saved index, starting empty");
        Engine::with_config(config)
    };
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app_state = AppState { engine: Arc::new(RwLock::new(engine)), index_paths_root: PathBuf::from(&index_dir), admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let api = Router::new()
        .route("/stats", get(stats_handler))
        .route("/search", get(search_handler))
        .route("/autocomplete", get(autocomplete_handler))
        .route("/related", get(related_handler))
        .route("/clusters", get(clusters_handler))
        .route("/learning-path", get(learning_path_handler))
        .route("/mindmap", get(mindmap_handler))
        .route("/upload", post(upload_handler))
        .route("/save", post(save_handler));

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api)
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let engine = state.engine.read();
    let stats = engine.stats();
    Json(StatsResponse {
        total_files: stats.documents,
        total_terms: stats.terms,
        total_topics: stats.topics,
        total_edges: stats.edges,
        uploaded_files: engine.list_documents().to_vec(),
    })
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let term = normalize_query(&params.q);
    let engine = state.engine.read();
    let all = engine.search(&term);
    let total = all.len();
    let k = params.k.unwrap_or(engine.config().search_limit).clamp(1, 100);
    let results = all
        .into_iter()
        .take(k)
        .map(|hit| SearchHit {
            snippet: engine.snippet(&hit.doc_id, &term),
            filename: hit.doc_id,
            frequency: hit.frequency,
        })
        .collect();
    let related = engine
        .related_topics(&term, engine.config().related_depth)
        .into_iter()
        .map(|(topic, weight)| RelatedTopic { topic, weight })
        .collect();
    Json(SearchResponse { query: term, took_s: start.elapsed().as_secs_f64(), total, results, related })
}

pub async fn autocomplete_handler(State(state): State<AppState>, Query(params): Query<AutocompleteParams>) -> Json<serde_json::Value> {
    let prefix = normalize_query(&params.prefix);
    let mut suggestions = state.engine.read().autocomplete(&prefix);
    suggestions.truncate(params.limit);
    Json(serde_json::json!({ "prefix": prefix, "suggestions": suggestions }))
}

pub async fn related_handler(State(state): State<AppState>, Query(params): Query<TopicParams>) -> Json<serde_json::Value> {
    let topic = normalize_query(&params.topic);
    let engine = state.engine.read();
    let related: Vec<RelatedTopic> = engine
        .related_topics(&topic, params.depth.unwrap_or(engine.config().related_depth))
        .into_iter()
        .map(|(topic, weight)| RelatedTopic { topic, weight })
        .collect();
    Json(serde_json::json!({ "topic": topic, "related": related }))
}

pub async fn clusters_handler(State(state): State<AppState>, Query(params): Query<ClusterParams>) -> Json<serde_json::Value> {
    let engine = state.engine.read();
    let clusters = engine.clusters(params.min_weight.unwrap_or(engine.config().cluster_min_weight));
    Json(serde_json::json!({ "clusters": clusters }))
}

pub async fn learning_path_handler(State(state): State<AppState>, Query(params): Query<TopicParams>) -> Result<Json<LearningPathResponse>, ApiError> {
    let topic = normalize_query(&params.topic);
    let engine = state.engine.read();
    if !engine.has_topic(&topic) {
        return Err((StatusCode::NOT_FOUND, format!("unknown topic: {topic}")));
    }
    let path = engine
        .learning_path(&topic, params.max.unwrap_or(engine.config().learning_path_len))
        .into_iter()
        .enumerate()
        .map(|(i, topic)| PathStep { order: i + 1, topic })
        .collect();
    Ok(Json(LearningPathResponse { topic, path }))
}

pub async fn mindmap_handler(State(state): State<AppState>, Query(params): Query<TopicParams>) -> Result<Json<MindMap>, ApiError> {
    let topic = normalize_query(&params.topic);
    let engine = state.engine.read();
    engine
        .mind_map(&topic, params.depth.unwrap_or(engine.config().mindmap_depth))
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown topic: {topic}")))
}

// --- Mutating endpoints ---
pub async fn upload_handler(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<UploadRequest>) -> Result<Json<UploadResponse>, ApiError> {
    authorize(&state, &headers)?;
    if req.filename.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "filename is required".into()));
    }
    let report = state.engine.write().ingest(req.filename.trim(), &req.content);
    tracing::info!(doc_id = %report.doc_id, terms = report.terms, "uploaded note");
    Ok(Json(UploadResponse { filename: report.doc_id, terms: report.terms, sentences: report.sentences }))
}

pub async fn save_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<MetaFile>, ApiError> {
    authorize(&state, &headers)?;
    let paths = IndexPaths::new(&state.index_paths_root);
    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    let (snapshot, stats) = {
        let engine = state.engine.read();
        (engine.export_state(), engine.stats())
    };
    tokio::task::spawn_blocking(move || save_state(&paths, &snapshot, &stats, &created_at))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Mutations are open when no ADMIN_TOKEN is configured.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(required) = &state.admin_token else { return Ok(()) };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
