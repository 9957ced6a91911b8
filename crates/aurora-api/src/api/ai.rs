use super::system::UrlRequest;
use super::{AdminGuard, ApiResult, AppState};
use aurora_common::{AiProviderConfig, ConnectionTestResult, LinkAnalysis};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use serde_json::{Value, json};

/// POST /api/ai/providers
pub async fn create_provider(
    _: AdminGuard,
    State(state): State<AppState>,
) -> ApiResult<AiProviderConfig> {
    Ok(Json(state.dashboard.add_ai_provider().await?))
}

/// PUT /api/ai/providers/:id
pub async fn update_provider(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut config): Json<AiProviderConfig>,
) -> ApiResult<AiProviderConfig> {
    config.id = id;
    Ok(Json(state.dashboard.update_ai_provider(config).await?))
}

/// DELETE /api/ai/providers/:id
pub async fn delete_provider(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    state.dashboard.delete_ai_provider(&id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}

/// POST /api/ai/providers/:id/activate
pub async fn activate_provider(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    state.dashboard.set_active_ai_provider(&id).await?;
    Ok(Json(json!({ "activeProviderId": id })))
}

/// Connection failures are reported in the body, not as an HTTP error.
/// POST /api/ai/providers/:id/test
pub async fn test_provider(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ConnectionTestResult> {
    Ok(Json(state.dashboard.test_ai_provider(&id).await?))
}

/// GET /api/ai/providers/:id/models
pub async fn list_models(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<String>> {
    Ok(Json(state.dashboard.list_models(&id).await?))
}

/// POST /api/ai/analyze
pub async fn analyze(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(req): Json<UrlRequest>,
) -> ApiResult<LinkAnalysis> {
    Ok(Json(state.dashboard.analyze_url(&req.url).await?))
}

/// GET /api/ai/greeting
pub async fn greeting(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "greeting": state.dashboard.greeting().await }))
}

pub fn ai_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/ai/providers", post(create_provider))
        .route(
            "/api/ai/providers/:id",
            put(update_provider).delete(delete_provider),
        )
        .route("/api/ai/providers/:id/activate", post(activate_provider))
        .route("/api/ai/providers/:id/test", post(test_provider))
        .route("/api/ai/providers/:id/models", get(list_models))
        .route("/api/ai/analyze", post(analyze))
        .route("/api/ai/greeting", get(greeting))
        .with_state(state)
}
