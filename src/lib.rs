//! RAG Chat
//!
//! A terminal chat client for a retrieval-augmented question-answering
//! service, together with the service it talks to.
//!
//! # Architecture
//!
//! - **Client**: typed REST wrapper over the chat endpoints
//! - **Controller**: view state of the chat screen, rebuilt from the server
//!   after every action
//! - **Terminal**: line-oriented front-end with blocking prompt dialogs
//! - **Server**: Axum service with an in-memory chat store and an LLM-backed
//!   answer generator
//!
//! # Modules
//!
//! - [`client`]: HTTP client and the [`client::ChatBackend`] trait
//! - [`controller`]: chat screen state and rendering
//! - [`terminal`]: interactive front-end
//! - [`server`]: REST handlers, store, rate limiting
//! - [`llm`]: OpenAI-compatible answer generation

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::unused_async)]

pub mod client;
pub mod config;
pub mod controller;
pub mod domain;
pub mod llm;
pub mod server;
pub mod terminal;

use crate::config::AppConfig;
use crate::server::answer::Answerer;
use crate::server::rate_limit::SimpleRateLimiter;
use crate::server::store::ChatStore;

use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Conversation store.
    pub store: ChatStore,
    /// Reply generator for the send route.
    pub answerer: Arc<dyn Answerer>,
    /// Rate limiter for the send route.
    pub rate_limiter: Arc<SimpleRateLimiter>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Fresh state with an empty store.
    pub fn new(config: Arc<AppConfig>, answerer: Arc<dyn Answerer>) -> Self {
        let rate_limiter = Arc::new(SimpleRateLimiter::per_minute(
            config.resilience.send_requests_per_minute,
        ));
        Self {
            store: ChatStore::new(),
            answerer,
            rate_limiter,
            config,
        }
    }
}
