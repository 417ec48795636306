//! Attached files: size validation, MIME tagging, and loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::mime;

/// Largest accepted attachment (20 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 20 * 1024 * 1024;

/// A validated file ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// A file seen on disk, before its contents are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub size: u64,
}

/// A file excluded for exceeding [`MAX_ATTACHMENT_BYTES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub name: String,
    pub size: u64,
}

/// Outcome of attaching a batch of files.
#[derive(Debug, Default)]
pub struct AttachReport {
    pub accepted: Vec<Attachment>,
    pub rejected: Vec<RejectedFile>,
    /// Files that could not be read, with the reason.
    pub unreadable: Vec<(String, String)>,
}

impl AttachReport {
    pub fn accepted_names(&self) -> Vec<&str> {
        self.accepted.iter().map(|a| a.name.as_str()).collect()
    }
}

/// Display name for a path: its file name, or the full path when there is none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Split candidates into those within the size ceiling and those over it. Order is kept.
pub fn partition_by_size(candidates: Vec<Candidate>) -> (Vec<Candidate>, Vec<RejectedFile>) {
    let mut ok = Vec::with_capacity(candidates.len());
    let mut rejected = Vec::new();
    for c in candidates {
        if c.size > MAX_ATTACHMENT_BYTES {
            rejected.push(RejectedFile {
                name: display_name(&c.path),
                size: c.size,
            });
        } else {
            ok.push(c);
        }
    }
    (ok, rejected)
}

/// Warning naming every rejected file, or None when nothing was rejected.
pub fn rejection_warning(rejected: &[RejectedFile]) -> Option<String> {
    if rejected.is_empty() {
        return None;
    }
    let names: Vec<&str> = rejected.iter().map(|r| r.name.as_str()).collect();
    Some(format!(
        "The following files exceed the {} MB limit and were not attached: {}",
        MAX_ATTACHMENT_BYTES / (1024 * 1024),
        names.join(", ")
    ))
}

/// Stat, validate, and read each path. Oversized files are never read.
pub fn load_attachments<P: AsRef<Path>>(paths: &[P]) -> AttachReport {
    let mut report = AttachReport::default();
    let mut candidates = Vec::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => candidates.push(Candidate {
                path: path.to_path_buf(),
                size: meta.len(),
            }),
            Ok(_) => report
                .unreadable
                .push((display_name(path), "not a regular file".to_string())),
            Err(e) => report.unreadable.push((display_name(path), e.to_string())),
        }
    }

    let (ok, rejected) = partition_by_size(candidates);
    for r in &rejected {
        log::warn!("Rejected attachment {} ({} bytes)", r.name, r.size);
    }
    report.rejected = rejected;

    for c in ok {
        let name = display_name(&c.path);
        match fs::read(&c.path) {
            Ok(bytes) => {
                let mime_type = mime::detect_mime_type(&c.path);
                log::debug!("Attached {} as {} ({} bytes)", name, mime_type, bytes.len());
                report.accepted.push(Attachment::new(name, mime_type, bytes));
            }
            Err(e) => report.unreadable.push((name, e.to_string())),
        }
    }
    report
}
