use super::{AdminGuard, ApiResult, AppState};
use aurora_common::{Category, LinkItem};
use aurora_core::{CategoryPatch, LinkDraft, MoveDirection};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

const DEFAULT_GENERATE_COUNT: usize = 4;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewCategory {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: MoveDirection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateRequest {
    pub count: Option<usize>,
}

/// GET /api/categories
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.dashboard.categories().await)
}

/// POST /api/categories
pub async fn create_category(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(req): Json<NewCategory>,
) -> ApiResult<Category> {
    Ok(Json(state.dashboard.add_category(req.title).await?))
}

/// Rename or re-icon a category. A rename without an explicit icon lets
/// the AI replace the placeholder icon.
/// PUT /api/categories/:id
pub async fn update_category(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<CategoryPatch>,
) -> ApiResult<Category> {
    let category = match (&patch.title, &patch.icon) {
        (Some(title), None) => state.dashboard.rename_category_with_icon(&id, title).await?,
        _ => state.dashboard.update_category(&id, patch).await?,
    };
    Ok(Json(category))
}

/// DELETE /api/categories/:id
pub async fn delete_category(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    state.dashboard.delete_category(&id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}

/// POST /api/categories/:id/move
pub async fn move_category(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<Vec<Category>> {
    state.dashboard.move_category(&id, req.direction).await?;
    Ok(Json(state.dashboard.categories().await))
}

/// POST /api/categories/:id/links
pub async fn create_link(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<LinkDraft>,
) -> ApiResult<LinkItem> {
    Ok(Json(state.dashboard.add_link(&id, draft).await?))
}

/// PUT /api/categories/:id/links/:link_id
pub async fn update_link(
    _: AdminGuard,
    State(state): State<AppState>,
    Path((id, link_id)): Path<(String, String)>,
    Json(draft): Json<LinkDraft>,
) -> ApiResult<LinkItem> {
    Ok(Json(state.dashboard.update_link(&id, &link_id, draft).await?))
}

/// DELETE /api/categories/:id/links/:link_id
pub async fn delete_link(
    _: AdminGuard,
    State(state): State<AppState>,
    Path((id, link_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    state.dashboard.delete_link(&id, &link_id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}

/// Ask the AI for new links and append the ones that pass the checks.
/// POST /api/categories/:id/generate
pub async fn generate_links(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<GenerateRequest>,
) -> ApiResult<Vec<LinkItem>> {
    let count = req.count.unwrap_or(DEFAULT_GENERATE_COUNT).max(1);
    Ok(Json(state.dashboard.generate_links_for(&id, count).await?))
}

pub fn category_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/:id",
            put(update_category).delete(delete_category),
        )
        .route("/api/categories/:id/move", post(move_category))
        .route("/api/categories/:id/links", post(create_link))
        .route(
            "/api/categories/:id/links/:link_id",
            put(update_link).delete(delete_link),
        )
        .route("/api/categories/:id/generate", post(generate_links))
        .with_state(state)
}
