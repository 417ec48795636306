//! On-disk layout: `index.json` plus one `conv_<id>.json` per transcript.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::message::ChatMessage;

const INDEX_FILE: &str = "index.json";

#[derive(Debug, Serialize, Deserialize)]
struct TranscriptFile {
    messages: Vec<ChatMessage>,
}

/// Path of a transcript file. Ids are uuids; anything path-like is refused.
fn transcript_path(dir: &Path, id: &str) -> Option<PathBuf> {
    if id.is_empty() || id.contains(['/', '\\', '.']) {
        return None;
    }
    Some(dir.join(format!("conv_{}.json", id)))
}

fn invalid_id(id: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("Invalid conversation id '{}'", id),
    )
}

/// Write through a temp file so a crash never leaves a half-written file behind.
fn write_atomic(path: &Path, json: String) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(tmp, path)
}

fn to_json<T: Serialize>(value: &T) -> io::Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Raw index contents, or None on first run.
pub(super) fn read_index(dir: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(dir.join(INDEX_FILE)) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

pub(super) fn write_index<T: Serialize>(dir: &Path, index: &T) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    write_atomic(&dir.join(INDEX_FILE), to_json(index)?)
}

/// Read a transcript. Missing, unreadable, or corrupt files yield None.
pub(super) fn read_transcript(dir: &Path, id: &str) -> Option<Vec<ChatMessage>> {
    let path = transcript_path(dir, id)?;
    let data = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<TranscriptFile>(&data) {
        Ok(file) => Some(file.messages),
        Err(e) => {
            log::warn!("Conversation {} is corrupt: {}", id, e);
            None
        }
    }
}

pub(super) fn write_transcript(dir: &Path, id: &str, messages: &[ChatMessage]) -> io::Result<()> {
    let path = transcript_path(dir, id).ok_or_else(|| invalid_id(id))?;
    fs::create_dir_all(dir)?;
    let file = TranscriptFile {
        messages: messages.to_vec(),
    };
    write_atomic(&path, to_json(&file)?)
}

/// Remove a transcript file. A file that is already gone is not an error.
pub(super) fn remove_transcript(dir: &Path, id: &str) -> io::Result<()> {
    let path = transcript_path(dir, id).ok_or_else(|| invalid_id(id))?;
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
