use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::registry::ConnectionHandle;
use crate::server::AppState;
use crate::store::{BoardStore, ChatMessage};

use super::message::{ClientFrame, ServerEvent};

const CHANNEL_BUFFER_SIZE: usize = 32;

/// WebSocket upgrade handler for `/ws/{user_id}`.
///
/// The identifier is client-supplied and not validated for uniqueness; a
/// duplicate identifier replaces (and closes) the prior session.
#[tracing::instrument(name = "ws.upgrade", skip(ws, state))]
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

/// Handle an established WebSocket connection
#[tracing::instrument(name = "ws.connection", skip(socket, state), fields(user_id = %user_id))]
async fn handle_socket(socket: WebSocket, state: AppState, user_id: String) {
    // Channel the fan-out pushes events into for this connection
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(CHANNEL_BUFFER_SIZE);

    let handle = state.registry.register(user_id.clone(), tx);
    let session = handle.session;

    tracing::info!(session = %session, "WebSocket connection established");

    // The joiner is already registered, so it receives its own join event
    // and the presence count includes it.
    state
        .broadcaster
        .broadcast(ServerEvent::UserJoined {
            user_id: user_id.clone(),
            active_users: state.registry.len(),
        })
        .await;

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Drain the event channel into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize outbound event");
                    continue;
                }
            };

            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Process inbound frames in arrival order
    let state_clone = state.clone();
    let handle_clone = handle.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = ws_receiver.next().await {
            match result {
                Ok(msg) => {
                    if !process_message(msg, &state_clone, &handle_clone).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    // Run until the socket closes, either task fails, or the registry closes
    // this session (replaced by a reconnect, or pruned by the fan-out).
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            tracing::debug!(session = %session, "Send task completed");
        }
        _ = &mut recv_task => {
            send_task.abort();
            tracing::debug!(session = %session, "Receive task completed");
        }
        _ = handle.closed() => {
            send_task.abort();
            recv_task.abort();
            tracing::debug!(session = %session, "Connection close-notified");
        }
    }

    // Session-guarded: a no-op if this session was already replaced, in which
    // case the replacement is still live and no user_left is emitted.
    if state.registry.deregister(&handle) {
        state
            .broadcaster
            .broadcast(ServerEvent::UserLeft {
                user_id: user_id.clone(),
                active_users: state.registry.len(),
            })
            .await;
    }

    tracing::info!(session = %session, "WebSocket connection closed");
}

/// Process a received WebSocket message.
/// Returns false if the connection should be closed.
async fn process_message(msg: Message, state: &AppState, handle: &Arc<ConnectionHandle>) -> bool {
    match msg {
        Message::Text(text) => {
            let frame: ClientFrame = match serde_json::from_str(&text) {
                Ok(f) => f,
                Err(e) => {
                    tracing::warn!(user_id = %handle.user_id, error = %e, "Rejected malformed inbound frame");
                    let _ = handle
                        .send(ServerEvent::error("INVALID_FRAME", e.to_string()))
                        .await;
                    return true;
                }
            };

            handle_client_frame(frame, state, handle).await;
            true
        }
        Message::Binary(_) => {
            let _ = handle
                .send(ServerEvent::error(
                    "UNSUPPORTED_FORMAT",
                    "Binary frames are not supported",
                ))
                .await;
            true
        }
        // No keep-alive mechanism; pings and pongs carry no state
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(user_id = %handle.user_id, "Received close frame");
            false
        }
    }
}

/// Handle a parsed client frame
#[tracing::instrument(name = "ws.frame", skip(frame, state, handle), fields(user_id = %handle.user_id))]
async fn handle_client_frame(frame: ClientFrame, state: &AppState, handle: &Arc<ConnectionHandle>) {
    match frame {
        ClientFrame::ChatMessage { message, name } => {
            let chat = ChatMessage::new(handle.user_id.clone(), name, message);
            state.store.append_chat(chat.clone()).await;

            // Awaited before the next inbound frame is read, so one sender's
            // messages are observed by others in that sender's order.
            state
                .broadcaster
                .broadcast(ServerEvent::ChatMessage { message: chat })
                .await;
        }
    }
}
