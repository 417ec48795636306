//! Conversation index: one metadata entry per saved transcript.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::storage;
use crate::core::util::filter_by_query;

/// Metadata for a saved conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMeta {
    pub id: String,
    pub title: String,
    /// Unix seconds.
    pub created_at: u64,
    pub updated_at: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct Index {
    conversations: Vec<ConversationMeta>,
}

impl Index {
    /// Empty on first run. IO and parse errors propagate.
    pub(super) fn load(dir: &Path) -> io::Result<Self> {
        match storage::read_index(dir)? {
            Some(data) => serde_json::from_str(&data)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            None => Ok(Self::default()),
        }
    }

    pub(super) fn save(&self, dir: &Path) -> io::Result<()> {
        storage::write_index(dir, self)
    }

    pub(super) fn get(&self, id: &str) -> Option<&ConversationMeta> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Insert or replace the entry with the same id. The entry moves to the front,
    /// so it wins ties on `updated_at`.
    pub(super) fn upsert(&mut self, meta: ConversationMeta) {
        self.remove(&meta.id);
        self.conversations.insert(0, meta);
    }

    pub(super) fn remove(&mut self, id: &str) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        self.conversations.len() != before
    }

    /// Entries, most recently updated first.
    pub(super) fn into_sorted(mut self) -> Vec<ConversationMeta> {
        self.conversations
            .sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        self.conversations
    }

    /// Keep the `max` most recently updated entries (0 = unlimited) and return the dropped ones.
    pub(super) fn prune(&mut self, max: usize) -> Vec<ConversationMeta> {
        if max == 0 || self.conversations.len() <= max {
            return Vec::new();
        }
        self.conversations
            .sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        self.conversations.split_off(max)
    }
}

/// Filter conversations by title or id (case-insensitive).
pub fn filter_conversations<'a>(
    convs: &'a [ConversationMeta],
    query: &str,
) -> Vec<&'a ConversationMeta> {
    filter_by_query(convs, query, |c| (c.title.as_str(), c.id.as_str()))
}
