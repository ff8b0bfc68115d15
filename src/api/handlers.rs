//! HTTP request handlers

use super::types::{
    CallbackRequest, CommandRequest, ErrorResponse, HealthResponse, MessageRequest,
    MessagesResponse, ModelsResponse,
};
use super::AppState;
use crate::session::{SessionSnapshot, UserId};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Interview entry points
        .route("/api/users/:user_id/messages", post(send_message))
        .route("/api/users/:user_id/advance", post(advance))
        .route("/api/users/:user_id/cancel", post(cancel))
        .route("/api/users/:user_id/start", post(start))
        .route("/api/users/:user_id/callback", post(callback))
        // Session inspection
        .route("/api/users/:user_id/session", get(get_session))
        // Service info
        .route("/api/health", get(health))
        .route("/api/models", get(list_models))
        .with_state(state)
}

// ============================================================
// Interview Entry Points
// ============================================================

async fn send_message(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(req): Json<MessageRequest>,
) -> Json<MessagesResponse> {
    let chat_id = req.chat_id.unwrap_or(user_id);
    let messages = match req.user_name.as_deref() {
        Some(name) => {
            state
                .engine
                .handle_inbound_text_from(user_id, chat_id, &req.text, Some(name))
                .await
        }
        None => {
            state
                .engine
                .handle_inbound_text(user_id, chat_id, &req.text)
                .await
        }
    };
    Json(MessagesResponse { messages })
}

async fn advance(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    body: Option<Json<CommandRequest>>,
) -> Json<MessagesResponse> {
    let chat_id = command_chat_id(user_id, body);
    let messages = state.engine.handle_advance_command(user_id, chat_id).await;
    Json(MessagesResponse { messages })
}

async fn cancel(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    body: Option<Json<CommandRequest>>,
) -> Json<MessagesResponse> {
    let chat_id = command_chat_id(user_id, body);
    let messages = state.engine.handle_cancel_command(user_id, chat_id).await;
    Json(MessagesResponse { messages })
}

async fn start(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    body: Option<Json<CommandRequest>>,
) -> Json<MessagesResponse> {
    let chat_id = command_chat_id(user_id, body);
    let messages = state.engine.handle_start_command(user_id, chat_id).await;
    Json(MessagesResponse { messages })
}

async fn callback(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(req): Json<CallbackRequest>,
) -> Result<Json<MessagesResponse>, AppError> {
    if req.data.trim().is_empty() {
        return Err(AppError::BadRequest("Callback data is empty".to_string()));
    }
    let chat_id = req.chat_id.unwrap_or(user_id);
    let messages = state
        .engine
        .handle_callback(user_id, chat_id, &req.data)
        .await;
    Ok(Json(MessagesResponse { messages }))
}

fn command_chat_id(user_id: UserId, body: Option<Json<CommandRequest>>) -> i64 {
    body.and_then(|Json(req)| req.chat_id).unwrap_or(user_id)
}

// ============================================================
// Session Inspection
// ============================================================

async fn get_session(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state
        .engine
        .sessions()
        .snapshot(user_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No session for user {user_id}")))
}

// ============================================================
// Service Info
// ============================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        sessions: state.engine.sessions().len().await,
        model: state.engine.model_id().to_string(),
    })
}

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.llm_registry.available_models(),
        default: state.llm_registry.default_model_id().to_string(),
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
