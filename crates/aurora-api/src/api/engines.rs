use super::{AdminGuard, ApiResult, AppState};
use aurora_common::{AuroraError, SearchEngine};
use aurora_core::{DetectedEngine, EngineDraft, detect_search_engine};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct DetectQuery {
    #[serde(default)]
    pub url: String,
}

/// GET /api/engines
pub async fn list_engines(State(state): State<AppState>) -> Json<Vec<SearchEngine>> {
    Json(state.dashboard.search_engines().await)
}

/// POST /api/engines
pub async fn create_engine(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(draft): Json<EngineDraft>,
) -> ApiResult<SearchEngine> {
    Ok(Json(state.dashboard.add_search_engine(draft).await?))
}

/// DELETE /api/engines/:id
pub async fn delete_engine(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    state.dashboard.delete_search_engine(&id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}

/// POST /api/engines/:id/activate
pub async fn activate_engine(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    state.dashboard.set_active_search_engine(&id).await?;
    Ok(Json(json!({ "activeSearchEngineId": id })))
}

/// Prefill the "add engine" form from a pasted URL.
/// GET /api/engines/detect?url=
pub async fn detect_engine(Query(query): Query<DetectQuery>) -> ApiResult<DetectedEngine> {
    detect_search_engine(&query.url)
        .map(Json)
        .ok_or_else(|| AuroraError::validation("无法识别该网址").into())
}

pub fn engine_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/engines", get(list_engines).post(create_engine))
        .route("/api/engines/detect", get(detect_engine))
        .route("/api/engines/:id", delete(delete_engine))
        .route("/api/engines/:id/activate", post(activate_engine))
        .with_state(state)
}
