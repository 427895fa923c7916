use axum::{extract::State, Json};

use crate::server::AppState;
use crate::store::BoardStore;

use super::models::ChatHistoryResponse;

/// Most recent chat messages, in chronological order
pub async fn chat_messages(State(state): State<AppState>) -> Json<ChatHistoryResponse> {
    let limit = state.settings.chat.history_limit;
    Json(ChatHistoryResponse {
        messages: state.store.recent_chat(limit).await,
    })
}
