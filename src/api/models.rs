use serde::{Deserialize, Serialize};

use crate::broadcast::BroadcastStatsSnapshot;
use crate::store::{ChatMessage, Reply, Thread};

#[derive(Debug, Deserialize)]
pub struct CreateThreadRequest {
    pub title: String,
    pub content: String,
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateReplyRequest {
    pub content: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ListThreadsResponse {
    pub threads: Vec<Thread>,
}

#[derive(Debug, Serialize)]
pub struct ThreadCreatedResponse {
    pub status: String,
    pub thread: Thread,
}

#[derive(Debug, Serialize)]
pub struct ReplyCreatedResponse {
    pub status: String,
    pub reply: Reply,
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub active_users: usize,
    pub total_threads: usize,
    pub total_messages: usize,
    pub broadcast: BroadcastStatsSnapshot,
}
