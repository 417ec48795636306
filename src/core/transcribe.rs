//! Voice input: turn a recorded clip into prompt text.

use thiserror::Error;

use crate::core::content::{self, ContentPart};
use crate::core::llm::{ChatError, ChatSession};

const TRANSCRIBE_INSTRUCTION: &str = "Transcribe this audio recording word for word. \
Reply with the transcript only. If no speech can be understood, reply with an empty message.";

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("Could not understand the audio. Please speak clearly and try again.")]
    Unintelligible,
    #[error("The recording must be mono, found {channels} channels. Please record again.")]
    NotMono { channels: u16 },
    #[error("Unsupported audio type {0}. Please record WAV or MP3 audio.")]
    UnsupportedFormat(String),
    #[error("Could not request transcription: {0}. Please try again.")]
    Request(#[from] ChatError),
}

/// Speech-to-text collaborator.
#[allow(async_fn_in_trait)]
pub trait Transcriber {
    async fn transcribe(
        &mut self,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<String, TranscribeError>;
}

/// Channel count from a RIFF/WAVE header, or None when the data is not a WAV file.
pub fn wav_channels(audio: &[u8]) -> Option<u16> {
    if audio.len() < 24 || &audio[0..4] != b"RIFF" || &audio[8..12] != b"WAVE" {
        return None;
    }
    // walk chunks to find "fmt "
    let mut pos = 12;
    while pos + 8 <= audio.len() {
        let id = &audio[pos..pos + 4];
        let size = u32::from_le_bytes([
            audio[pos + 4],
            audio[pos + 5],
            audio[pos + 6],
            audio[pos + 7],
        ]) as usize;
        let body = pos + 8;
        if id == b"fmt " {
            if body + 4 > audio.len() {
                return None;
            }
            return Some(u16::from_le_bytes([audio[body + 2], audio[body + 3]]));
        }
        pos = body.checked_add(size + (size & 1))?;
    }
    None
}

/// Check the clip before it is sent: supported type, and mono when WAV.
pub fn validate_recording(audio: &[u8], mime_type: &str) -> Result<(), TranscribeError> {
    if content::audio_format(mime_type).is_none() {
        return Err(TranscribeError::UnsupportedFormat(mime_type.to_string()));
    }
    if let Some(channels) = wav_channels(audio)
        && channels != 1
    {
        return Err(TranscribeError::NotMono { channels });
    }
    Ok(())
}

/// Clean up a transcript; empty means nothing was understood.
pub fn finish_transcript(raw: &str) -> Result<String, TranscribeError> {
    let text = raw.trim().trim_matches('"').trim();
    if text.is_empty() {
        return Err(TranscribeError::Unintelligible);
    }
    Ok(text.to_string())
}

impl Transcriber for ChatSession {
    async fn transcribe(
        &mut self,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<String, TranscribeError> {
        validate_recording(audio, mime_type)?;
        let parts = [
            ContentPart::text(TRANSCRIBE_INSTRUCTION),
            ContentPart::binary(mime_type, audio.to_vec(), Some("recording".to_string())),
        ];
        let raw = match self.complete_once(&parts).await {
            Ok(raw) => raw,
            Err(ChatError::EmptyResponse) => return Err(TranscribeError::Unintelligible),
            Err(e) => return Err(e.into()),
        };
        let text = finish_transcript(&raw)?;
        log::info!("Transcribed {} bytes of audio into {} chars", audio.len(), text.len());
        Ok(text)
    }
}
