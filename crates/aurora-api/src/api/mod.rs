//! HTTP routes for the start page
//!
//! Every module exposes a `*_routes(state)` function; [`router`] merges
//! them. Failures are returned as `{ "error": message }` with a status
//! derived from the [`AuroraError`] variant.

pub mod ai;
pub mod categories;
pub mod engines;
pub mod settings;
pub mod system;

use aurora_common::{AppSettings, AuroraError};
use aurora_core::{ActivityLog, AdminGate, Dashboard};
use axum::{
    Json, Router,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// Header carrying the admin password on mutating requests
pub const ADMIN_HEADER: &str = "x-admin-password";

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub gate: AdminGate,
    pub log: ActivityLog,
}

/// Error returned by every handler
#[derive(Debug)]
pub struct ApiError(pub AuroraError);

pub type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

impl From<AuroraError> for ApiError {
    fn from(err: AuroraError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            AuroraError::Validation(_) => StatusCode::BAD_REQUEST,
            AuroraError::NotFound(_) => StatusCode::NOT_FOUND,
            AuroraError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuroraError::Ai(_) | AuroraError::Sync(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.message() }))).into_response()
    }
}

/// Extractor that only succeeds when the admin password header checks out
pub struct AdminGuard;

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let attempt = parts
            .headers
            .get(ADMIN_HEADER)
            .and_then(|v| v.to_str().ok());
        state.gate.require(attempt)?;
        Ok(AdminGuard)
    }
}

/// Manual API keys are only shown to the admin
pub(crate) fn redact(mut settings: AppSettings, admin: bool) -> AppSettings {
    if !admin {
        for config in settings.ai_configs.iter_mut() {
            config.api_key.clear();
        }
    }
    settings
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(system::system_routes(state.clone()))
        .merge(categories::category_routes(state.clone()))
        .merge(engines::engine_routes(state.clone()))
        .merge(settings::settings_routes(state.clone()))
        .merge(ai::ai_routes(state))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use aurora_common::EnvSecrets;
    use aurora_core::{AcceptAllProbe, AiService, CloudSync, MemoryStore};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    pub const PASSWORD: &str = "letmein";

    /// Router over an in-memory dashboard protected by [`PASSWORD`]
    pub async fn app() -> (Router, AppState) {
        let log = ActivityLog::default();
        let secrets = EnvSecrets::default().with_admin_password(PASSWORD);
        let ai = AiService::new(secrets.clone(), log.clone()).expect("ai service");
        let dashboard = Dashboard::new(
            Arc::new(MemoryStore::new()),
            CloudSync::disabled(log.clone()),
            Arc::new(ai),
            Arc::new(AcceptAllProbe),
            log.clone(),
        );
        dashboard.load_local().await;

        let state = AppState {
            dashboard: Arc::new(dashboard),
            gate: AdminGate::from_secrets(&secrets),
            log,
        };
        (router(state.clone()), state)
    }

    /// Send one request, optionally as admin, and decode the JSON reply
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
        admin: bool,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if admin {
            builder = builder.header(ADMIN_HEADER, PASSWORD);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (AuroraError::validation("x"), StatusCode::BAD_REQUEST),
            (AuroraError::not_found("x"), StatusCode::NOT_FOUND),
            (AuroraError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AuroraError::ai("x"), StatusCode::BAD_GATEWAY),
            (AuroraError::Storage("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn test_redact_hides_manual_keys() {
        let mut settings = AppSettings::default();
        settings.ai_configs[1].api_key = "sk-secret".to_string();

        let public = redact(settings.clone(), false);
        assert!(public.ai_configs.iter().all(|c| c.api_key.is_empty()));
        let admin = redact(settings, true);
        assert_eq!(admin.ai_configs[1].api_key, "sk-secret");
    }
}
