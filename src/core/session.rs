//! Per-user session state and the request/normalize/type cycle of one turn.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::core::assembly;
use crate::core::attachments::{self, AttachReport, Attachment};
use crate::core::commands::{self, PrebuiltCommand};
use crate::core::config;
use crate::core::emit::{Emitter, Sink};
use crate::core::llm::{ChatError, RemoteModel};
use crate::core::message::ChatMessage;
use crate::core::normalize::normalize;

/// Everything one user's chat needs between turns. Mutated only between requests.
#[derive(Debug)]
pub struct SessionContext {
    transcript: Vec<ChatMessage>,
    attachments: Vec<Attachment>,
    camera_image: Option<Vec<u8>>,
    active_command: Option<&'static PrebuiltCommand>,
    /// History record this transcript is saved under, once saved.
    conversation_id: Option<String>,
    dirty: bool,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    /// Fresh session that starts with the assistant greeting.
    pub fn new() -> Self {
        Self {
            transcript: vec![ChatMessage::assistant(config::greeting())],
            attachments: Vec::new(),
            camera_image: None,
            active_command: None,
            conversation_id: None,
            dirty: false,
        }
    }

    /// Resume a saved conversation.
    pub fn resume(id: String, transcript: Vec<ChatMessage>) -> Self {
        let mut session = Self::new();
        if !transcript.is_empty() {
            session.transcript = transcript;
        }
        session.conversation_id = Some(id);
        session
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn has_camera_image(&self) -> bool {
        self.camera_image.is_some()
    }

    pub fn active_command(&self) -> Option<&'static PrebuiltCommand> {
        self.active_command
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn set_conversation_id(&mut self, id: Option<String>) {
        self.conversation_id = id;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Validate and queue files for the next request.
    pub fn attach<P: AsRef<Path>>(&mut self, paths: &[P]) -> AttachReport {
        let report = attachments::load_attachments(paths);
        log::info!("Queued attachments: {:?}", report.accepted_names());
        self.attachments.extend(report.accepted.iter().cloned());
        report
    }

    pub fn clear_attachments(&mut self) {
        self.attachments.clear();
        self.camera_image = None;
    }

    /// Queue a camera snapshot (JPEG bytes) for the next request.
    pub fn set_camera_image(&mut self, jpeg: Vec<u8>) {
        self.camera_image = Some(jpeg);
    }

    /// Activate a prebuilt command for the next prompt.
    pub fn select_command(&mut self, name: &str) -> Option<&'static PrebuiltCommand> {
        let command = commands::find_command(name)?;
        self.active_command = Some(command);
        Some(command)
    }

    /// Logout: drop all state and start over with the greeting.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Run one turn: send the prompt with queued inputs, then type the reply into `sink`.
    ///
    /// The user message is recorded first. On failure the error is returned and no
    /// assistant message is added; on success the assistant message equals the
    /// final typed text. Queued attachments, camera image, and command are consumed
    /// either way.
    pub async fn run_turn<M, S>(
        &mut self,
        model: &mut M,
        prompt: &str,
        emitter: &Emitter,
        sink: &mut S,
        cancel: Option<&CancellationToken>,
    ) -> Result<String, ChatError>
    where
        M: RemoteModel,
        S: Sink + ?Sized,
    {
        self.transcript.push(ChatMessage::user(prompt));
        self.dirty = true;

        let attachments = std::mem::take(&mut self.attachments);
        let camera_image = self.camera_image.take();
        let parts = assembly::assemble(
            prompt,
            &attachments,
            camera_image.as_deref(),
            &mut self.active_command,
        );

        let raw = match model.generate(&parts).await {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Request failed: {}", e);
                return Err(e);
            }
        };

        let normalized = normalize(&raw);
        let shown = emitter.emit(&normalized, sink, cancel).await;
        self.transcript.push(ChatMessage::assistant(shown.clone()));
        Ok(shown)
    }
}

#[cfg(test)]
mod tests;
