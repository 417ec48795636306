//! Content parts of a multi-modal request and their OpenAI-compatible wire form.

use base64::Engine as _;
use serde_json::{Value, json};

use crate::core::extract;
use crate::core::mime;

/// One unit of a request to the remote model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Binary {
        mime_type: String,
        data: Vec<u8>,
        /// Original file name, when the part came from a file.
        name: Option<String>,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text(text.into())
    }

    pub fn binary(mime_type: impl Into<String>, data: Vec<u8>, name: Option<String>) -> Self {
        ContentPart::Binary {
            mime_type: mime_type.into(),
            data,
            name,
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            ContentPart::Text(_) => "text/plain",
            ContentPart::Binary { mime_type, .. } => mime_type,
        }
    }

    /// Encode as an OpenAI-compatible content block.
    pub fn to_api_value(&self) -> Value {
        match self {
            ContentPart::Text(text) => json!({"type": "text", "text": text}),
            ContentPart::Binary {
                mime_type,
                data,
                name,
            } => {
                let label = name.as_deref().unwrap_or("attachment");
                if mime_type.starts_with("image/") {
                    json!({
                        "type": "image_url",
                        "image_url": {"url": data_url(mime_type, data)}
                    })
                } else if let Some(format) = audio_format(mime_type) {
                    json!({
                        "type": "input_audio",
                        "input_audio": {"data": encode(data), "format": format}
                    })
                } else if mime::is_text_like(mime_type) {
                    let body = extract::extract_text(label, mime_type, data);
                    json!({"type": "text", "text": format!("--- {} ---\n{}", label, body)})
                } else {
                    json!({
                        "type": "file",
                        "file": {"filename": label, "file_data": data_url(mime_type, data)}
                    })
                }
            }
        }
    }
}

/// Encode a request as the `content` of one user message.
/// A lone text part is sent as a plain string.
pub fn to_api_content(parts: &[ContentPart]) -> Value {
    if let [ContentPart::Text(text)] = parts {
        return json!(text);
    }
    Value::Array(parts.iter().map(ContentPart::to_api_value).collect())
}

/// Short description of a request for logs (no payload bytes).
pub fn describe(parts: &[ContentPart]) -> String {
    parts
        .iter()
        .map(|p| match p {
            ContentPart::Text(t) => format!("text({} chars)", t.chars().count()),
            ContentPart::Binary { data, .. } => format!("{}({} bytes)", p.mime_type(), data.len()),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn encode(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

fn data_url(mime_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, encode(data))
}

pub(crate) fn audio_format(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
        "audio/mp3" | "audio/mpeg" => Some("mp3"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_text_part_is_plain_string() {
        let content = to_api_content(&[ContentPart::text("hi")]);
        assert_eq!(content, json!("hi"));
    }

    #[test]
    fn image_becomes_data_url() {
        let part = ContentPart::binary("image/jpeg", vec![1, 2, 3], None);
        let v = part.to_api_value();
        assert_eq!(v["type"], "image_url");
        assert_eq!(v["image_url"]["url"], "data:image/jpeg;base64,AQID");
    }

    #[test]
    fn wav_becomes_input_audio() {
        let part = ContentPart::binary("audio/wav", vec![0, 0], Some("memo.wav".into()));
        let v = part.to_api_value();
        assert_eq!(v["type"], "input_audio");
        assert_eq!(v["input_audio"]["format"], "wav");
        assert_eq!(v["input_audio"]["data"], "AAA=");
    }

    #[test]
    fn text_file_is_inlined_with_name() {
        let part =
            ContentPart::binary("text/plain", b"chapter 4".to_vec(), Some("notes.txt".into()));
        let v = part.to_api_value();
        assert_eq!(v["type"], "text");
        assert_eq!(v["text"], "--- notes.txt ---\nchapter 4");
    }

    #[test]
    fn pdf_becomes_file_block() {
        let part = ContentPart::binary("application/pdf", b"%PDF".to_vec(), Some("hw.pdf".into()));
        let v = part.to_api_value();
        assert_eq!(v["type"], "file");
        assert_eq!(v["file"]["filename"], "hw.pdf");
        assert!(v["file"]["file_data"]
            .as_str()
            .unwrap()
            .starts_with("data:application/pdf;base64,"));
    }

    #[test]
    fn mixed_parts_keep_order() {
        let parts = vec![
            ContentPart::binary("image/png", vec![0], None),
            ContentPart::text("what is this?"),
        ];
        let content = to_api_content(&parts);
        let arr = content.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["type"], "image_url");
        assert_eq!(arr[1]["text"], "what is this?");
    }

    #[test]
    fn describe_omits_payload() {
        let parts = vec![
            ContentPart::binary("image/jpeg", vec![0; 10], None),
            ContentPart::text("abc"),
        ];
        assert_eq!(describe(&parts), "image/jpeg(10 bytes), text(3 chars)");
    }
}
