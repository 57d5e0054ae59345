//! Chat REST handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::AppState;
use crate::client::{
    ChatDetail, ChatSummary, CreatedChat, SendRequest, SendResponse, StatusResponse, TitleUpdate,
};
use crate::domain::Message;

use super::answer;
use super::store::is_valid_chat_id;

/// JSON error payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn invalid_id() -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody::new("Invalid chat ID")),
    )
}

fn validate_id(id: &str) -> Result<(), ApiError> {
    if is_valid_chat_id(id) {
        Ok(())
    } else {
        Err(invalid_id())
    }
}

/// Path ids some front-ends send before any chat exists.
fn is_unset_id(id: &str) -> bool {
    matches!(id, "" | "null" | "undefined")
}

/// POST /chat/new
pub async fn new_chat(State(state): State<AppState>) -> Json<CreatedChat> {
    let record = state.store.create();
    info!(name: "chat.created", chat_id = %record.id, "Chat created");
    Json(CreatedChat { chat_id: record.id })
}

/// GET /chats
pub async fn list_chats(State(state): State<AppState>) -> Json<Vec<ChatSummary>> {
    Json(state.store.list())
}

/// GET /chat/{id}
pub async fn get_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChatDetail>, ApiError> {
    validate_id(&id)?;
    state
        .store
        .get(&id)
        .map(|record| Json(record.detail()))
        .ok_or_else(|| (StatusCode::NOT_FOUND, Json(ErrorBody::new("Chat not found"))))
}

/// PUT /chat/{id}/title
pub async fn update_title(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TitleUpdate>,
) -> Result<Json<StatusResponse>, ApiError> {
    validate_id(&id)?;
    if !state.store.rename(&id, req.title) {
        warn!(chat_id = %id, "rename of unknown chat");
    }
    Ok(Json(StatusResponse {
        status: "updated".to_string(),
    }))
}

/// DELETE /chat/{id}
pub async fn delete_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    validate_id(&id)?;
    if state.store.remove(&id).is_some() {
        info!(name: "chat.deleted", chat_id = %id, "Chat deleted");
    }
    Ok(Json(StatusResponse {
        status: "deleted".to_string(),
    }))
}

/// POST /chat/{id}/send
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SendRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let query = req.query.trim().to_string();

    let chat_id = if is_unset_id(&id) {
        let record = state.store.create();
        info!(name: "chat.created", chat_id = %record.id, "Chat created for send");
        record.id
    } else {
        validate_id(&id)?;
        id
    };

    if !state.store.append(&chat_id, Message::user(&query)) {
        warn!(chat_id = %chat_id, "send to unknown chat; reply will not be stored");
    }

    let reply = answer::respond(state.answerer.as_ref(), &query).await;
    state.store.append(&chat_id, Message::assistant(&reply));

    info!(
        name: "chat.answered",
        chat_id = %chat_id,
        reply_len = reply.len(),
        "Chat answered"
    );

    Ok(Json(SendResponse { bot: Some(reply) }))
}
