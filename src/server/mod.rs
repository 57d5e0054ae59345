//! Chat service: the REST endpoints the chat client talks to.
//!
//! # Routes
//!
//! - `GET /chats`: chat list, newest first
//! - `GET /chat/{id}`: one chat with its messages
//! - `POST /chat/new`: create an empty chat
//! - `PUT /chat/{id}/title`: rename
//! - `DELETE /chat/{id}`: delete
//! - `POST /chat/{id}/send`: ask a question (rate limited)

pub mod answer;
pub mod handlers;
pub mod rate_limit;
pub mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::config::AppConfig;

use answer::Answerer;

/// Build the router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/chats", get(handlers::list_chats))
        .route("/chat/new", post(handlers::new_chat))
        .route(
            "/chat/{id}",
            get(handlers::get_chat).delete(handlers::delete_chat),
        )
        .route("/chat/{id}/title", axum::routing::put(handlers::update_title))
        .route(
            "/chat/{id}/send",
            post(handlers::send_message).route_layer(axum::middleware::from_fn_with_state(
                state.clone(),
                rate_limit::rate_limit_middleware,
            )),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the chat service with the provided configuration.
pub async fn start_server(
    config: Arc<AppConfig>,
    answerer: Arc<dyn Answerer>,
) -> anyhow::Result<()> {
    let state = AppState::new(Arc::clone(&config), answerer);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        rate_limit = config.resilience.rate_limit_enabled,
        "Server started"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
