//! In-memory board storage.
//!
//! Unbounded vectors behind `tokio::sync::RwLock`. Reads for reporting may be
//! slightly stale, but every read-modify-write runs under the write lock so
//! no torn state is observable.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;

use super::{BoardStore, ChatMessage, Reply, Thread};

pub struct MemoryStore {
    threads: RwLock<Vec<Thread>>,
    chat_messages: RwLock<Vec<ChatMessage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            threads: RwLock::new(Vec::new()),
            chat_messages: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn list_threads(&self) -> Vec<Thread> {
        self.threads.read().await.clone()
    }

    async fn create_thread(&self, title: String, content: String, category: String) -> Thread {
        let thread = Thread::new(title, content, category);
        self.threads.write().await.push(thread.clone());

        tracing::debug!(thread_id = %thread.id, category = %thread.category, "Thread created");
        thread
    }

    async fn get_thread(&self, thread_id: Uuid) -> Result<Thread, AppError> {
        self.threads
            .read()
            .await
            .iter()
            .find(|t| t.id == thread_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Thread not found: {}", thread_id)))
    }

    async fn add_reply(&self, thread_id: Uuid, content: String, name: String) -> Result<Reply, AppError> {
        let mut threads = self.threads.write().await;

        let thread = threads
            .iter_mut()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| AppError::NotFound(format!("Thread not found: {}", thread_id)))?;

        let reply = Reply::new(content, name);
        thread.replies.push(reply.clone());

        tracing::debug!(thread_id = %thread_id, reply_id = %reply.id, "Reply added");
        Ok(reply)
    }

    async fn append_chat(&self, message: ChatMessage) {
        self.chat_messages.write().await.push(message);
    }

    async fn recent_chat(&self, limit: usize) -> Vec<ChatMessage> {
        let messages = self.chat_messages.read().await;
        let start = messages.len().saturating_sub(limit);
        messages[start..].to_vec()
    }

    async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }

    async fn chat_count(&self) -> usize {
        self.chat_messages.read().await.len()
    }
}
