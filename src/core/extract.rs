//! Text extraction for attachments that are sent inline instead of as binary.
//!
//! Extraction never fails past this module: a failure becomes an inline message
//! that is sent to the model in place of the file contents.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file is not valid UTF-8 text")]
    NotUtf8(#[from] std::str::Utf8Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no text extractor for {0}")]
    Unsupported(String),
}

fn try_extract(mime: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match mime {
        "application/json" => {
            let value: serde_json::Value = serde_json::from_slice(bytes)?;
            Ok(serde_json::to_string_pretty(&value)?)
        }
        m if crate::core::mime::is_text_like(m) => Ok(std::str::from_utf8(bytes)?.to_string()),
        other => Err(ExtractError::Unsupported(other.to_string())),
    }
}

/// Extract readable text from a file. On failure returns an error string instead.
pub fn extract_text(name: &str, mime: &str, bytes: &[u8]) -> String {
    match try_extract(mime, bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Extraction failed for {}: {}", name, e);
            format!("[Could not extract text from {}: {}]", name, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(extract_text("a.txt", "text/plain", b"hello"), "hello");
    }

    #[test]
    fn bom_is_stripped() {
        assert_eq!(
            extract_text("a.csv", "text/csv", b"\xEF\xBB\xBFname,grade"),
            "name,grade"
        );
    }

    #[test]
    fn json_is_pretty_printed() {
        let out = extract_text("d.json", "application/json", br#"{"a":1}"#);
        assert_eq!(out, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn invalid_utf8_degrades_to_message() {
        let out = extract_text("bad.txt", "text/plain", &[0xff, 0xfe, 0x00]);
        assert!(out.starts_with("[Could not extract text from bad.txt:"));
    }

    #[test]
    fn invalid_json_degrades_to_message() {
        let out = extract_text("d.json", "application/json", b"{not json");
        assert!(out.contains("d.json"));
        assert!(out.contains("invalid JSON"));
    }

    #[test]
    fn unsupported_type_degrades_to_message() {
        let out = extract_text("x.pdf", "application/pdf", b"%PDF");
        assert!(out.contains("no text extractor for application/pdf"));
    }
}
