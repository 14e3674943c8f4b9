use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde::Deserialize;
use serde_json::json;

use crate::application::usecases::{ManageWatchesUseCase, RegisterBroadcastTargetUseCase};
use crate::application::{AppError, BroadcastTargetStore, WatchRegistry};
use crate::domain::NewNotifyRequest;

/// Foreground surface over the registry and broadcast targets.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<dyn WatchRegistry>,
    pub targets: Arc<dyn BroadcastTargetStore>,
    pub api_token: Option<String>,
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/watches", get(list_watches).post(register_watch))
        .route("/watches/{id}", delete(remove_watch))
        .route(
            "/broadcast-targets",
            get(list_broadcast_targets).put(register_broadcast_target),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn error_response(e: AppError) -> Response {
    let code = match e {
        AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (code, Json(json!({ "error": e.to_string() }))).into_response()
}

/// Malformed bodies (unknown scope, missing field, bad JSON) are invalid
/// requests like any other, not axum's default 422.
fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(v)| v)
        .map_err(|rej| error_response(AppError::InvalidRequest(rej.body_text())))
}

async fn register_watch(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Result<Json<NewNotifyRequest>, JsonRejection>,
) -> Response {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }
    let body = match parse_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let uc = ManageWatchesUseCase {
        registry: state.registry.as_ref(),
    };
    match uc.register_watch(body).await {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct WatchesQuery {
    watcher_id: String,
}

async fn list_watches(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(q): Query<WatchesQuery>,
) -> Response {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }
    let uc = ManageWatchesUseCase {
        registry: state.registry.as_ref(),
    };
    match uc.list_watches(&q.watcher_id).await {
        Ok(v) => Json(v).into_response(),
        Err(e) => error_response(e),
    }
}

async fn remove_watch(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }
    let uc = ManageWatchesUseCase {
        registry: state.registry.as_ref(),
    };
    match uc.remove_watch(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct BroadcastTargetBody {
    destination_id: String,
    channel_ref: Option<String>,
    purpose: String,
}

async fn register_broadcast_target(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Result<Json<BroadcastTargetBody>, JsonRejection>,
) -> Response {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }
    let body = match parse_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let uc = RegisterBroadcastTargetUseCase {
        store: state.targets.as_ref(),
    };
    match uc
        .execute(&body.destination_id, body.channel_ref.as_deref(), &body.purpose)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct TargetsQuery {
    purpose: String,
}

async fn list_broadcast_targets(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(q): Query<TargetsQuery>,
) -> Response {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }
    match state.targets.list_by_purpose(&q.purpose).await {
        Ok(v) => Json(v).into_response(),
        Err(e) => error_response(e),
    }
}

fn check_auth(headers: &HeaderMap, token: &Option<String>) -> Result<(), (StatusCode, String)> {
    let Some(expected) = token else {
        return Ok(());
    };
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if auth == format!("Bearer {}", expected) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "unauthorized".to_string()))
    }
}
