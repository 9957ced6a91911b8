use super::engines::DetectQuery;
use super::{AdminGuard, ApiResult, AppState, redact};
use aurora_common::{AppSettings, AuroraError, SocialLink, Theme};
use aurora_core::{
    DetectedPlatform, SettingsPatch, SocialAction, SocialLinkDraft, detect_social_platform,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use serde_json::{Value, json};

/// GET /api/settings
pub async fn get_settings(
    State(state): State<AppState>,
    admin: Option<AdminGuard>,
) -> Json<AppSettings> {
    Json(redact(state.dashboard.settings().await, admin.is_some()))
}

/// PUT /api/settings
pub async fn update_settings(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> ApiResult<AppSettings> {
    let settings = state.dashboard.update_settings(patch).await?;
    Ok(Json(redact(settings, true)))
}

/// Visitors may switch the theme without logging in.
/// POST /api/settings/theme/cycle
pub async fn cycle_theme(State(state): State<AppState>) -> ApiResult<Value> {
    let theme: Theme = state.dashboard.cycle_theme().await?;
    Ok(Json(json!({ "theme": theme })))
}

/// POST /api/settings/icon/suggest
pub async fn suggest_icon(_: AdminGuard, State(state): State<AppState>) -> ApiResult<Value> {
    let icon = state.dashboard.suggest_app_icon().await?;
    Ok(Json(json!({ "appIcon": icon })))
}

/// POST /api/social
pub async fn create_social_link(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(draft): Json<SocialLinkDraft>,
) -> ApiResult<SocialLink> {
    Ok(Json(state.dashboard.add_social_link(draft).await?))
}

/// DELETE /api/social/:id
pub async fn delete_social_link(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    state.dashboard.delete_social_link(&id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}

/// What a click on the social link should do.
/// GET /api/social/:id/action
pub async fn social_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SocialAction> {
    Ok(Json(state.dashboard.social_action(&id).await?))
}

/// GET /api/social/detect?url=
pub async fn detect_platform(Query(query): Query<DetectQuery>) -> ApiResult<DetectedPlatform> {
    detect_social_platform(&query.url)
        .map(Json)
        .ok_or_else(|| AuroraError::validation("无法识别该网址").into())
}

pub fn settings_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/settings", get(get_settings).put(update_settings))
        .route("/api/settings/theme/cycle", post(cycle_theme))
        .route("/api/settings/icon/suggest", post(suggest_icon))
        .route("/api/social", post(create_social_link))
        .route("/api/social/detect", get(detect_platform))
        .route("/api/social/:id", delete(delete_social_link))
        .route("/api/social/:id/action", get(social_action))
        .with_state(state)
}
