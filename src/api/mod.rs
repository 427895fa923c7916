//! API layer - HTTP endpoint handlers organized by domain.

mod chat;
mod health;
mod models;
mod routes;
mod threads;

pub use chat::chat_messages;
pub use health::{health, stats};
pub use models::{
    ChatHistoryResponse, CreateReplyRequest, CreateThreadRequest, ListThreadsResponse,
    ReplyCreatedResponse, StatsResponse, ThreadCreatedResponse,
};
pub use routes::api_routes;
pub use threads::{add_reply, create_thread, get_thread, list_threads};
