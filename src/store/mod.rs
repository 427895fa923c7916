//! Board storage.
//!
//! Thread and chat state live behind the `BoardStore` trait so a persistent
//! backend can be added later without touching the fan-out or the handlers.
//! The only backend today is in-memory; state is lost on restart.

mod memory;
mod types;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;

pub use memory::MemoryStore;
pub use types::{ChatMessage, Reply, Thread};

/// Storage interface for threads, replies, and the chat log
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// All threads, oldest first
    async fn list_threads(&self) -> Vec<Thread>;

    /// Append a new thread and return it
    async fn create_thread(&self, title: String, content: String, category: String) -> Thread;

    /// Fetch one thread by id
    async fn get_thread(&self, thread_id: Uuid) -> Result<Thread, AppError>;

    /// Append a reply to a thread; `NotFound` if the thread does not exist,
    /// in which case nothing is mutated
    async fn add_reply(&self, thread_id: Uuid, content: String, name: String) -> Result<Reply, AppError>;

    /// Append a chat message to the global log
    async fn append_chat(&self, message: ChatMessage);

    /// The most recent `limit` chat messages, in chronological order
    async fn recent_chat(&self, limit: usize) -> Vec<ChatMessage>;

    /// Total thread count
    async fn thread_count(&self) -> usize;

    /// Total chat message count
    async fn chat_count(&self) -> usize;
}
