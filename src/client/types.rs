//! Request and response bodies of the chat service REST API.
//!
//! The server module serializes the same shapes, so both sides agree on
//! field names by construction.

use serde::{Deserialize, Serialize};

use crate::domain::Message;

// =============================================================================
// Responses
// =============================================================================

/// Sidebar entry returned by `GET /chats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    /// Opaque identifier assigned by the server.
    pub chat_id: String,
    /// Display title.
    pub title: String,
}

/// Full chat returned by `GET /chat/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDetail {
    /// Identifier, when the server echoes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    /// Display title.
    pub title: String,
    /// Creation timestamp (RFC 3339), when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Messages in conversation order.
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Body returned by `POST /chat/new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedChat {
    pub chat_id: String,
}

/// Body returned by `POST /chat/{id}/send`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    /// Generated answer; absent when the server had nothing to say.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<String>,
}

/// Acknowledgement returned by the rename and delete endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

// =============================================================================
// Requests
// =============================================================================

/// Body of `PUT /chat/{id}/title`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleUpdate {
    pub title: String,
}

/// Body of `POST /chat/{id}/send`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
    pub query: String,
}
