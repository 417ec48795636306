//! Saved chat transcripts in ~/.local/share/interlink-chat/conversations/.

mod index;
mod storage;

pub use index::{ConversationMeta, filter_conversations};

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::core::message::{ChatMessage, Role};
use crate::core::paths;
use index::Index;

/// Title from the first user message, truncated to `max_len` chars with an ellipsis.
pub fn first_message_preview(messages: &[ChatMessage], max_len: usize) -> String {
    let Some(first) = messages
        .iter()
        .find(|m| m.role == Role::User && !m.content.trim().is_empty())
    else {
        return "(No title)".to_string();
    };
    let s = first.content.trim().replace('\n', " ");
    if s.chars().count() <= max_len {
        return s;
    }
    let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
    format!("{}…", truncated)
}

fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Conversation store rooted at one directory.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the platform data directory.
    pub fn open_default() -> io::Result<Self> {
        paths::data_dir()
            .map(Self::at)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No data directory"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All conversations, most recently updated first.
    pub fn list(&self) -> io::Result<Vec<ConversationMeta>> {
        Ok(Index::load(&self.dir)?.into_sorted())
    }

    pub fn load(&self, id: &str) -> Option<Vec<ChatMessage>> {
        storage::read_transcript(&self.dir, id)
    }

    /// Create or update a conversation and return its id. Older conversations
    /// beyond `max_conversations` (0 = unlimited) are pruned.
    ///
    /// A transcript without any user message is refused unless it already has an id.
    pub fn save(
        &self,
        id: Option<&str>,
        title: &str,
        messages: &[ChatMessage],
        max_conversations: u32,
    ) -> io::Result<String> {
        if !messages.iter().any(|m| m.role == Role::User) {
            return match id {
                Some(existing) => Ok(existing.to_string()),
                None => Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "Cannot save empty conversation",
                )),
            };
        }

        let id = id
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        storage::write_transcript(&self.dir, &id, messages)?;

        let mut index = Index::load(&self.dir)?;
        let now = now_secs();
        let created_at = index.get(&id).map_or(now, |m| m.created_at);
        index.upsert(ConversationMeta {
            id: id.clone(),
            title: title.to_string(),
            created_at,
            updated_at: now,
        });
        for dropped in index.prune(max_conversations as usize) {
            if let Err(e) = storage::remove_transcript(&self.dir, &dropped.id) {
                log::warn!("Failed to remove conversation file {}: {}", dropped.id, e);
            }
        }
        index.save(&self.dir)?;

        log::debug!("Saved conversation {} ({} messages)", id, messages.len());
        Ok(id)
    }

    /// Delete a conversation's file and index entry. Unknown ids are NotFound.
    pub fn delete(&self, id: &str) -> io::Result<()> {
        let mut index = Index::load(&self.dir)?;
        if !index.remove(id) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("No conversation with id {}", id),
            ));
        }
        storage::remove_transcript(&self.dir, id)?;
        index.save(&self.dir)
    }
}
