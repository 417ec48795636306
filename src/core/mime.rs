//! MIME type detection for attachments.

use std::path::Path;

/// Returned when neither the table nor the platform guess knows the file.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Types the remote model accepts under a specific name. Checked before any guess.
const EXTENSION_TABLE: &[(&str, &str)] = &[
    // documents
    ("pdf", "application/pdf"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("txt", "text/plain"),
    ("md", "text/md"),
    ("rtf", "text/rtf"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("xml", "text/xml"),
    ("json", "application/json"),
    // code
    ("py", "text/x-python"),
    ("js", "application/x-javascript"),
    ("ts", "text/x-typescript"),
    ("java", "text/x-java"),
    ("c", "text/x-c"),
    ("cpp", "text/x-c++"),
    // images
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    // audio
    ("wav", "audio/wav"),
    ("mp3", "audio/mp3"),
    ("aiff", "audio/aiff"),
    ("aac", "audio/aac"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
    // video
    ("mp4", "video/mp4"),
    ("mpeg", "video/mpeg"),
    ("mov", "video/mov"),
    ("avi", "video/avi"),
    ("webm", "video/webm"),
];

fn table_lookup(ext: &str) -> Option<&'static str> {
    EXTENSION_TABLE
        .iter()
        .find(|(e, _)| e.eq_ignore_ascii_case(ext))
        .map(|(_, mime)| *mime)
}

/// Detect the MIME type of a file from its name: explicit table first, then the
/// platform guess, then [`FALLBACK_MIME_TYPE`]. Never fails.
pub fn detect_mime_type(path: &Path) -> String {
    if let Some(mime) = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(table_lookup)
    {
        return mime.to_string();
    }
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string())
}

/// Types whose bytes are readable text and can be sent inline.
pub fn is_text_like(mime: &str) -> bool {
    mime.starts_with("text/")
        || matches!(
            mime,
            "application/json" | "application/xml" | "application/x-javascript"
        )
}
