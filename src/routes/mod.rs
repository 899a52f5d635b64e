//! API routes

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

use crate::config::ALLOWED_ORIGIN;
use crate::conversation::{Message, Thread};
use crate::AppState;

type ApiError = (StatusCode, Json<Value>);

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Reply to a chat turn. A failed turn has an empty `response` and the
/// failure in `error`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AgentResponse {
    pub response: String,
    pub error: Option<String>,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn process_message(
    State(state): State<AppState>,
    Json(message): Json<Message>,
) -> Json<AgentResponse> {
    match state.chat_engine.process_message(&message).await {
        Ok(response) => Json(AgentResponse {
            response,
            error: None,
        }),
        Err(e) => {
            tracing::warn!(thread_id = %message.thread_id, error = %e, "chat turn failed");
            Json(AgentResponse {
                response: String::new(),
                error: Some(e.to_string()),
            })
        }
    }
}

async fn get_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Json<Thread>, ApiError> {
    match state.chat_engine.memory().get_thread(&thread_id).await {
        Ok(Some(thread)) => Ok(Json(thread)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Thread not found" })),
        )),
        Err(e) => Err(internal_error(e)),
    }
}

async fn delete_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .chat_engine
        .memory()
        .delete_thread(&thread_id)
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({ "status": "success" })))
}

fn internal_error(e: impl std::fmt::Display) -> ApiError {
    tracing::error!(error = %e, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": e.to_string() })),
    )
}

/// CORS for the single web client origin
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(HeaderValue::from_static(ALLOWED_ORIGIN))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/agent", post(process_message))
        .route("/api/threads/:thread_id", get(get_thread).delete(delete_thread))
}
