//! Structure resolution endpoint
//!
//! `GET /api/v1/structure?url=<document>&divId=<id>[&group=<file group>]`
//! returns the pages, outline and metadata of one structural node.

use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use mets_resolver::mets::{self, parse_document_url, ContentResolver, DefaultLoader, Resolution};

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureQuery {
    pub url: String,
    pub div_id: String,
    #[serde(default)]
    pub group: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(resolve_structure))
}

async fn resolve_structure(
    State(state): State<AppState>,
    query: std::result::Result<Query<StructureQuery>, QueryRejection>,
) -> Result<Json<Resolution>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if query.div_id.trim().is_empty() {
        return Err(AppError::BadRequest("divId must not be empty".to_string()));
    }
    let url = parse_document_url(&query.url).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let config = state.resolver_config().clone();
    let timeout = state.request_timeout();
    let deadline = Instant::now() + timeout;

    // Documents and the blocking HTTP client live and die on this thread.
    // The deadline stops it from fetching after the response timed out.
    let task = tokio::task::spawn_blocking(move || -> mets::Result<Resolution> {
        let loader = DefaultLoader::new(&config)?.with_deadline(deadline);
        let resolution = ContentResolver::new(&config, &loader)
            .with_deadline(deadline)
            .resolve(&url, query.div_id.trim(), query.group.as_deref());
        resolution
    });

    let resolution = tokio::time::timeout(timeout, task)
        .await
        .map_err(|_| AppError::Timeout(timeout.as_secs()))?
        .map_err(|e| AppError::Internal(format!("resolution task failed: {}", e)))??;

    tracing::debug!(
        "Resolved {} with {} pages and {} outline entries",
        resolution.div_id,
        resolution.pages.len(),
        resolution.outline.node_count()
    );
    Ok(Json(resolution))
}
