use super::{AdminGuard, ApiError, ApiResult, AppState, redact};
use aurora_common::{AuroraError, DashboardSnapshot, LogEntry, NavigationTarget};
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Counters shown in the diagnostics panel
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub category_count: usize,
    pub link_count: usize,
    pub unique_sites: usize,
    pub cloud_configured: bool,
    pub configured_slots: Vec<String>,
    pub log_count: usize,
}

/// Handler returning all three collections.
/// GET /api/state
pub async fn get_state(
    State(state): State<AppState>,
    admin: Option<AdminGuard>,
) -> Json<DashboardSnapshot> {
    let mut snapshot = state.dashboard.snapshot().await;
    snapshot.settings = redact(snapshot.settings, admin.is_some());
    Json(snapshot)
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Value> {
    if state.gate.verify(&req.password) {
        Ok(Json(json!({ "status": "ok" })))
    } else {
        state.log.warn("管理员登录失败");
        Err(ApiError(AuroraError::Unauthorized))
    }
}

/// Count a click and return where to navigate.
/// POST /api/click
pub async fn click(
    State(state): State<AppState>,
    Json(req): Json<UrlRequest>,
) -> ApiResult<NavigationTarget> {
    Ok(Json(state.dashboard.record_click(&req.url).await?))
}

/// GET /api/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Value> {
    let url = state.dashboard.search_url(&query.q).await?;
    Ok(Json(json!({ "url": url })))
}

/// GET /api/logs
pub async fn list_logs(_: AdminGuard, State(state): State<AppState>) -> Json<Vec<LogEntry>> {
    Json(state.log.entries())
}

/// DELETE /api/logs
pub async fn clear_logs(_: AdminGuard, State(state): State<AppState>) -> Json<Value> {
    state.log.clear();
    Json(json!({ "status": "cleared" }))
}

/// GET /api/stats
pub async fn stats(_: AdminGuard, State(state): State<AppState>) -> Json<Stats> {
    let dashboard = &state.dashboard;
    let categories = dashboard.categories().await;
    let user_categories = categories.iter().filter(|c| !c.is_recommendations());

    Json(Stats {
        category_count: user_categories.clone().count(),
        link_count: user_categories.map(|c| c.links.len()).sum(),
        unique_sites: dashboard.unique_site_count().await,
        cloud_configured: dashboard.is_cloud_configured(),
        configured_slots: dashboard.ai().secrets().configured_slots(),
        log_count: state.log.len(),
    })
}

pub fn system_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/login", post(login))
        .route("/api/click", post(click))
        .route("/api/search", get(search))
        .route("/api/logs", get(list_logs).delete(clear_logs))
        .route("/api/stats", get(stats))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{PASSWORD, app, send};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_login() {
        let (app, state) = app().await;
        let (status, _) = send(&app, "POST", "/api/login", Some(json!({"password": PASSWORD})), false).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, "POST", "/api/login", Some(json!({"password": "nope"})), false).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(state.log.entries()[0].message, "管理员登录失败");
    }

    #[tokio::test]
    async fn test_state_and_click() {
        let (app, _) = app().await;
        let (status, body) = send(&app, "GET", "/api/state", None, false).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["categories"][0]["id"], "rec-1");
        assert_eq!(body["searchEngines"].as_array().unwrap().len(), 3);

        let (status, body) = send(
            &app,
            "POST",
            "/api/click",
            Some(json!({"url": "https://react.dev"})),
            false,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"url": "https://react.dev", "newTab": true}));
    }

    #[tokio::test]
    async fn test_search() {
        let (app, _) = app().await;
        let (status, body) = send(&app, "GET", "/api/search?q=rust%20lang", None, false).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "https://www.google.com/search?q=rust%20lang");

        let (status, body) = send(&app, "GET", "/api/search?q=", None, false).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "搜索内容不能为空");
    }

    #[tokio::test]
    async fn test_logs_and_stats_need_admin() {
        let (app, state) = app().await;
        state.log.info("hello");

        let (status, _) = send(&app, "GET", "/api/logs", None, false).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, "GET", "/api/stats", None, true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["categoryCount"], 2);
        assert_eq!(body["linkCount"], 4);
        assert_eq!(body["uniqueSites"], 4);
        assert_eq!(body["cloudConfigured"], false);

        let (status, _) = send(&app, "DELETE", "/api/logs", None, true).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&app, "GET", "/api/logs", None, true).await;
        assert_eq!(body, json!([]));
    }
}
