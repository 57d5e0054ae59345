//! HTTP client for the chat service.
//!
//! [`Client`] wraps the six REST endpoints. The controller does not depend on
//! it directly but on the [`ChatBackend`] trait, so view logic can be driven
//! by any backend that speaks the same resource model.

pub mod error;
pub mod types;

use async_trait::async_trait;
use url::Url;

pub use error::{Error, Result};
pub use types::{
    ChatDetail, ChatSummary, CreatedChat, SendRequest, SendResponse, StatusResponse, TitleUpdate,
};

/// Remote operations the chat controller needs.
///
/// Each method maps to exactly one request.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `GET /chats`
    async fn list_chats(&self) -> Result<Vec<ChatSummary>>;
    /// `GET /chat/{id}`
    async fn get_chat(&self, chat_id: &str) -> Result<ChatDetail>;
    /// `POST /chat/new`
    async fn create_chat(&self) -> Result<CreatedChat>;
    /// `PUT /chat/{id}/title`
    async fn rename_chat(&self, chat_id: &str, title: &str) -> Result<()>;
    /// `DELETE /chat/{id}`
    async fn delete_chat(&self, chat_id: &str) -> Result<()>;
    /// `POST /chat/{id}/send`
    async fn send_message(&self, chat_id: &str, query: &str) -> Result<SendResponse>;
}

/// HTTP client for the chat service API.
///
/// # Example
///
/// ```rust,no_run
/// use rag_chat::client::Client;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("http://localhost:8000")?;
///
/// let created = client.chats().create().await?;
/// let reply = client.chats().send(&created.chat_id, "Is coffee safe?").await?;
/// println!("{}", reply.bot.unwrap_or_default());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the server (e.g., "http://localhost:8000")
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a new client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(Error::CannotBeBase(base_url.to_string()));
        }
        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Access the chat resource API.
    pub fn chats(&self) -> ChatsApi<'_> {
        ChatsApi { client: self }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `with_client`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".into());
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }
}

// =============================================================================
// Chats API
// =============================================================================

/// Chat resource API client.
#[derive(Debug)]
pub struct ChatsApi<'a> {
    client: &'a Client,
}

impl ChatsApi<'_> {
    /// List chats, newest first.
    pub async fn list(&self) -> Result<Vec<ChatSummary>> {
        let response = self
            .client
            .http
            .get(self.client.url(&["chats"]))
            .send()
            .await?;
        Client::handle_response(response).await
    }

    /// Load a chat with its messages.
    pub async fn get(&self, chat_id: &str) -> Result<ChatDetail> {
        let response = self
            .client
            .http
            .get(self.client.url(&["chat", chat_id]))
            .send()
            .await?;
        Client::handle_response(response).await
    }

    /// Create an empty chat.
    pub async fn create(&self) -> Result<CreatedChat> {
        let response = self
            .client
            .http
            .post(self.client.url(&["chat", "new"]))
            .send()
            .await?;
        Client::handle_response(response).await
    }

    /// Change a chat's title.
    pub async fn rename(&self, chat_id: &str, title: impl Into<String>) -> Result<()> {
        let req = TitleUpdate {
            title: title.into(),
        };
        let response = self
            .client
            .http
            .put(self.client.url(&["chat", chat_id, "title"]))
            .json(&req)
            .send()
            .await?;
        Client::ensure_success(response).await?;
        Ok(())
    }

    /// Delete a chat.
    pub async fn delete(&self, chat_id: &str) -> Result<()> {
        let response = self
            .client
            .http
            .delete(self.client.url(&["chat", chat_id]))
            .send()
            .await?;
        Client::ensure_success(response).await?;
        Ok(())
    }

    /// Send a query and wait for the generated answer.
    pub async fn send(&self, chat_id: &str, query: impl Into<String>) -> Result<SendResponse> {
        let req = SendRequest {
            query: query.into(),
        };
        let response = self
            .client
            .http
            .post(self.client.url(&["chat", chat_id, "send"]))
            .json(&req)
            .send()
            .await?;
        Client::handle_response(response).await
    }
}

#[async_trait]
impl ChatBackend for Client {
    async fn list_chats(&self) -> Result<Vec<ChatSummary>> {
        self.chats().list().await
    }

    async fn get_chat(&self, chat_id: &str) -> Result<ChatDetail> {
        self.chats().get(chat_id).await
    }

    async fn create_chat(&self) -> Result<CreatedChat> {
        self.chats().create().await
    }

    async fn rename_chat(&self, chat_id: &str, title: &str) -> Result<()> {
        self.chats().rename(chat_id, title).await
    }

    async fn delete_chat(&self, chat_id: &str) -> Result<()> {
        self.chats().delete(chat_id).await
    }

    async fn send_message(&self, chat_id: &str, query: &str) -> Result<SendResponse> {
        self.chats().send(chat_id, query).await
    }
}
