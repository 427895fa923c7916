use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::chat::chat_messages;
use super::health::{health, stats};
use super::threads::{add_reply, create_thread, get_thread, list_threads};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health))
        // Board API
        .nest(
            "/api",
            Router::new()
                .route("/threads", get(list_threads).post(create_thread))
                .route("/threads/{thread_id}", get(get_thread))
                .route("/threads/{thread_id}/reply", post(add_reply))
                .route("/chat/messages", get(chat_messages))
                .route("/stats", get(stats)),
        )
}
