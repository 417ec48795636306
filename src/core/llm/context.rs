//! Context window management for the remote history: token estimation and truncation.

use serde_json::{Value, json};

/// Safety margin: truncate when estimated tokens exceed this fraction of context_length.
const CONTEXT_BUDGET_RATIO: f64 = 0.85;

/// Estimate the number of tokens in a set of messages.
///
/// Uses a conservative heuristic: JSON-serialized byte length / 4.
pub fn estimate_tokens(messages: &[Value]) -> usize {
    messages
        .iter()
        .map(|m| serde_json::to_string(m).map(|s| s.len()).unwrap_or(0) / 4)
        .sum()
}

fn is_system(msg: &Value) -> bool {
    msg.get("role").and_then(|r| r.as_str()) == Some("system")
}

/// Drop the oldest messages when the estimate exceeds the context budget.
///
/// A leading system message and the last message (the current prompt) are always kept.
pub fn truncate_if_needed(messages: &mut Vec<Value>, context_length: u64) {
    if context_length == 0 {
        return;
    }
    let budget = (context_length as f64 * CONTEXT_BUDGET_RATIO) as usize;
    let first_removable = usize::from(messages.first().is_some_and(is_system));

    while messages.len() > first_removable + 1 && estimate_tokens(messages) > budget {
        messages.remove(first_removable);
    }
}

/// Replace inline binary payloads of a stored user message with short placeholders.
///
/// Images, audio, and files are sent once; later turns only see their names.
pub fn summarize_binary_parts(message: &mut Value) {
    let Some(blocks) = message.get_mut("content").and_then(|c| c.as_array_mut()) else {
        return;
    };
    for block in blocks.iter_mut() {
        let kind = block.get("type").and_then(|t| t.as_str()).unwrap_or("");
        let placeholder = match kind {
            "image_url" => "[image previously shared]".to_string(),
            "input_audio" => "[audio previously shared]".to_string(),
            "file" => {
                let name = block
                    .get("file")
                    .and_then(|f| f.get("filename"))
                    .and_then(|n| n.as_str())
                    .unwrap_or("attachment");
                format!("[file previously shared: {}]", name)
            }
            _ => continue,
        };
        *block = json!({"type": "text", "text": placeholder});
    }
}
