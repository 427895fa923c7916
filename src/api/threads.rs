//! Thread and reply handlers.
//!
//! Each mutation appends to the store and hands the resulting event to the
//! fan-out; list and fetch read a snapshot of the store.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::server::AppState;
use crate::store::{BoardStore, Thread};
use crate::websocket::ServerEvent;

use super::models::{
    CreateReplyRequest, CreateThreadRequest, ListThreadsResponse, ReplyCreatedResponse,
    ThreadCreatedResponse,
};

/// List all threads
pub async fn list_threads(State(state): State<AppState>) -> Json<ListThreadsResponse> {
    Json(ListThreadsResponse {
        threads: state.store.list_threads().await,
    })
}

/// Create a thread and broadcast `new_thread` to all connected clients
#[tracing::instrument(
    name = "http.create_thread",
    skip(state, request),
    fields(category = %request.category)
)]
pub async fn create_thread(
    State(state): State<AppState>,
    Json(request): Json<CreateThreadRequest>,
) -> Result<Json<ThreadCreatedResponse>> {
    let thread = state
        .store
        .create_thread(request.title, request.content, request.category)
        .await;

    state
        .broadcaster
        .broadcast(ServerEvent::NewThread {
            thread: thread.clone(),
        })
        .await;

    Ok(Json(ThreadCreatedResponse {
        status: "ok".to_string(),
        thread,
    }))
}

/// Fetch a single thread by id
#[tracing::instrument(name = "http.get_thread", skip(state), fields(thread_id = %thread_id))]
pub async fn get_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
) -> Result<Json<Thread>> {
    let thread = state.store.get_thread(thread_id).await?;
    Ok(Json(thread))
}

/// Add a reply to a thread and broadcast `new_reply`
#[tracing::instrument(name = "http.add_reply", skip(state, request), fields(thread_id = %thread_id))]
pub async fn add_reply(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
    Json(request): Json<CreateReplyRequest>,
) -> Result<Json<ReplyCreatedResponse>> {
    let reply = state
        .store
        .add_reply(thread_id, request.content, request.name)
        .await?;

    state
        .broadcaster
        .broadcast(ServerEvent::NewReply {
            thread_id,
            reply: reply.clone(),
        })
        .await;

    Ok(Json(ReplyCreatedResponse {
        status: "ok".to_string(),
        reply,
    }))
}
