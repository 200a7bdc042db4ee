use amharic_ir_core::persist::{load_docs, open_engine, IndexPaths};
use amharic_ir_core::report::snippet;
use amharic_ir_core::{DocMeta, SearchEngine};
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    /// Falls back to the index's configured mode when absent.
    pub require_all: Option<bool>,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub terms: Vec<String>,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f64,
    pub snippet: Option<String>,
}

/// Everything a query needs, loaded together so a reload swaps it in one step.
pub struct Snapshot {
    pub engine: SearchEngine,
    pub docs: HashMap<String, DocMeta>,
}

impl Snapshot {
    pub fn load(index_root: &std::path::Path) -> Result<Self> {
        let paths = IndexPaths::new(index_root);
        let engine = open_engine(&paths)?;
        let docs = match load_docs(&paths) {
            Ok(docs) => docs.into_iter().map(|d| (d.id.clone(), d)).collect(),
            Err(err) => {
                tracing::warn!(error = %err, "document metadata unavailable, serving without snippets");
                HashMap::new()
            }
        };
        Ok(Self { engine, docs })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub index_root: PathBuf,
    pub live: Arc<RwLock<Arc<Snapshot>>>,
    pub admin_token: Option<String>,
}

impl AppState {
    /// Readers take a cheap clone of the current snapshot and never hold the lock while searching.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.live.read().clone()
    }
}

pub fn build_app(index_dir: String) -> Result<Router> {
    // Load index at startup
    let index_root = PathBuf::from(&index_dir);
    let snapshot = Snapshot::load(&index_root)?;
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app_state = AppState { index_root, live: Arc::new(RwLock::new(Arc::new(snapshot))), admin_token };

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

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/index/reload", post(reload_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let snapshot = state.snapshot();
    let engine = &snapshot.engine;
    let require_all = params.require_all.unwrap_or(engine.config().require_all);

    let terms = engine.query_terms(&params.q);
    let mut hits = engine.search_with(&params.q, require_all);
    let total_hits = hits.len();
    hits.truncate(params.k.max(1));

    let results = hits
        .into_iter()
        .map(|hit| {
            let snippet = snapshot
                .docs
                .get(&hit.doc_id)
                .and_then(|meta| meta.text_path.as_ref())
                .and_then(|rel| snippet_from_file(&state.index_root.join(rel), &terms));
            SearchHit { doc_id: hit.doc_id, score: hit.score, snippet }
        })
        .collect();

    let elapsed = start.elapsed();
    Json(SearchResponse { query: params.q, terms, took_s: elapsed.as_secs_f64(), total_hits, results })
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<String>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let snapshot = state.snapshot();
    let Some(meta) = snapshot.docs.get(&doc_id) else {
        return Err((StatusCode::NOT_FOUND, format!("unknown document {doc_id}")));
    };
    let mut obj = serde_json::json!({
        "doc_id": meta.id,
        "initial_tokens": meta.initial_tokens,
        "indexed_terms": meta.indexed_terms,
    });
    if let Some(rel) = &meta.text_path {
        if let Ok(text) = std::fs::read_to_string(state.index_root.join(rel)) {
            obj["text"] = serde_json::Value::String(text);
        }
    }
    Ok(Json(obj))
}

fn snippet_from_file(path: &std::path::Path, terms: &[String]) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    if text.is_empty() { return None; }
    Some(highlight_terms(&snippet(&text, terms), terms))
}

/// Escape the snippet as HTML, then wrap term matches in `<em>`.
fn highlight_terms(snippet: &str, terms: &[String]) -> String {
    let mut s = escape_html(snippet);
    for t in terms {
        if t.trim().is_empty() { continue; }
        let Ok(pat) = regex::Regex::new(&regex::escape(&escape_html(t))) else { continue };
        s = pat.replace_all(&s, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).to_string();
    }
    s
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Load the index from disk again and swap it in; in-flight searches finish on the old snapshot.
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let root = state.index_root.clone();
    let loaded = tokio::task::spawn_blocking(move || Snapshot::load(&root))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let snapshot = loaded.map_err(|e| {
        tracing::error!(error = %e, "index reload failed, keeping current index");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    let body = serde_json::json!({
        "docs": snapshot.engine.index().num_docs,
        "terms": snapshot.engine.index().vocabulary.len(),
    });
    *state.live.write() = Arc::new(snapshot);
    tracing::info!(root = %state.index_root.display(), "index reloaded");
    Ok(Json(body))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlighting_escapes_everything_but_the_em_tags() {
        let out = highlight_terms("<script>alert(1)</script> ገበያ & ቤት", &["ገበያ".to_string()]);
        assert_eq!(out, "&lt;script&gt;alert(1)&lt;/script&gt; <em>ገበያ</em> &amp; ቤት");
    }
}
