//! In-memory conversation store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::client::{ChatDetail, ChatSummary};
use crate::domain::Message;

/// Title given to freshly created chats.
pub const DEFAULT_TITLE: &str = "New Chat";

/// A stored conversation.
#[derive(Debug, Clone)]
pub struct ChatRecord {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    /// Insertion order, breaks ties between equal timestamps.
    seq: u64,
}

impl ChatRecord {
    /// Sidebar view of this record.
    #[must_use]
    pub fn summary(&self) -> ChatSummary {
        ChatSummary {
            chat_id: self.id.clone(),
            title: self.title.clone(),
        }
    }

    /// Full view of this record.
    #[must_use]
    pub fn detail(&self) -> ChatDetail {
        ChatDetail {
            chat_id: Some(self.id.clone()),
            title: self.title.clone(),
            created_at: Some(self.created_at.to_rfc3339()),
            messages: self.messages.clone(),
        }
    }
}

/// Whether `id` has the shape of an identifier this store hands out.
#[must_use]
pub fn is_valid_chat_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

/// Thread-safe store for chats.
///
/// Cloning is cheap; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct ChatStore {
    inner: Arc<ChatStoreInner>,
}

#[derive(Debug, Default)]
struct ChatStoreInner {
    chats: RwLock<HashMap<String, ChatRecord>>,
    next_seq: AtomicU64,
}

impl ChatStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty chat titled [`DEFAULT_TITLE`].
    pub fn create(&self) -> ChatRecord {
        let record = ChatRecord {
            id: Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            created_at: Utc::now(),
            messages: Vec::new(),
            seq: self.inner.next_seq.fetch_add(1, Ordering::Relaxed),
        };
        let mut guard = self
            .inner
            .chats
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.insert(record.id.clone(), record.clone());
        record
    }

    /// Get a chat by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<ChatRecord> {
        let guard = self
            .inner
            .chats
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard.get(id).cloned()
    }

    /// All chats, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<ChatSummary> {
        let guard = self
            .inner
            .chats
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut records: Vec<&ChatRecord> = guard.values().collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        records.into_iter().map(ChatRecord::summary).collect()
    }

    /// Set a chat's title. Returns `false` if the chat does not exist.
    pub fn rename(&self, id: &str, title: impl Into<String>) -> bool {
        let mut guard = self
            .inner
            .chats
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match guard.get_mut(id) {
            Some(record) => {
                record.title = title.into();
                true
            }
            None => false,
        }
    }

    /// Append a message. Returns `false` if the chat does not exist.
    pub fn append(&self, id: &str, message: Message) -> bool {
        let mut guard = self
            .inner
            .chats
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match guard.get_mut(id) {
            Some(record) => {
                record.messages.push(message);
                true
            }
            None => false,
        }
    }

    /// Remove a chat by ID.
    pub fn remove(&self, id: &str) -> Option<ChatRecord> {
        let mut guard = self
            .inner
            .chats
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.remove(id)
    }

    /// Number of stored chats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .chats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if there are no chats.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
