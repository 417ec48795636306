//! Session tests with a scripted remote model.

use std::collections::VecDeque;

use crate::core::content::ContentPart;
use crate::core::emit::{CURSOR_MARKER, Emitter};
use crate::core::llm::{ChatError, RemoteModel};
use crate::core::message::{ChatMessage, Role};
use crate::core::session::SessionContext;

/// Returns queued replies in order and records every request.
#[derive(Default)]
struct ScriptedModel {
    replies: VecDeque<Result<String, ChatError>>,
    requests: Vec<Vec<ContentPart>>,
    resets: usize,
}

impl ScriptedModel {
    fn replying(replies: Vec<Result<String, ChatError>>) -> Self {
        Self {
            replies: replies.into(),
            ..Default::default()
        }
    }
}

impl RemoteModel for ScriptedModel {
    async fn generate(&mut self, parts: &[ContentPart]) -> Result<String, ChatError> {
        self.requests.push(parts.to_vec());
        self.replies
            .pop_front()
            .unwrap_or(Err(ChatError::EmptyResponse))
    }

    fn reset(&mut self) {
        self.resets += 1;
    }
}

#[test]
fn new_session_starts_with_greeting() {
    let session = SessionContext::new();
    assert_eq!(session.transcript().len(), 1);
    assert_eq!(session.transcript()[0].role, Role::Assistant);
    assert!(session.transcript()[0].content.contains("Interlink AI"));
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn successful_turn_persists_typed_text() {
    let mut session = SessionContext::new();
    let raw = "Steps:\n1. read\n2. write\n\n\n\nDone";
    let mut model = ScriptedModel::replying(vec![Ok(raw.to_string())]);
    let mut frames: Vec<String> = Vec::new();
    let mut sink = |s: &str| frames.push(s.to_string());

    let shown = session
        .run_turn(&mut model, "how do I study?", &Emitter::instant(), &mut sink, None)
        .await
        .expect("turn succeeds");

    assert_eq!(shown, "Steps:\n\n1. read\n\n2. write\n\nDone");
    assert_eq!(frames.last(), Some(&shown));
    assert!(frames[..frames.len() - 1].iter().all(|f| f.ends_with(CURSOR_MARKER)));

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1], ChatMessage::user("how do I study?"));
    assert_eq!(transcript[2], ChatMessage::assistant(shown));
    assert!(session.is_dirty());
}

#[tokio::test]
async fn failed_turn_appends_no_assistant_message() {
    let mut session = SessionContext::new();
    let mut model = ScriptedModel::replying(vec![Err(ChatError::RateLimited(
        "rate_limit_exceeded".to_string(),
    ))]);
    let mut frames: Vec<String> = Vec::new();
    let mut sink = |s: &str| frames.push(s.to_string());

    let err = session
        .run_turn(&mut model, "hello", &Emitter::instant(), &mut sink, None)
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
    assert!(frames.is_empty(), "emitter must not run on failure");
    let transcript = session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[1].role, Role::User);
}

#[tokio::test]
async fn queued_inputs_are_sent_in_order_and_consumed() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let notes = tmp.path().join("notes.txt");
    std::fs::write(&notes, "chapter 3").unwrap();

    let mut session = SessionContext::new();
    let report = session.attach(&[&notes]);
    assert_eq!(report.accepted_names(), vec!["notes.txt"]);
    session.set_camera_image(vec![0xFF, 0xD8]);
    let quiz = session.select_command("quiz").expect("quiz exists");

    let mut model = ScriptedModel::replying(vec![Ok("ok".into()), Ok("ok again".into())]);
    let mut sink = |_: &str| {};
    session
        .run_turn(&mut model, "photosynthesis", &Emitter::instant(), &mut sink, None)
        .await
        .unwrap();

    let sent = &model.requests[0];
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].mime_type(), "text/plain");
    assert_eq!(sent[1].mime_type(), "image/jpeg");
    assert_eq!(
        sent[2],
        ContentPart::Text(format!("{}\nphotosynthesis", quiz.prompt_template))
    );

    assert!(session.attachments().is_empty());
    assert!(!session.has_camera_image());
    assert!(session.active_command().is_none());

    session
        .run_turn(&mut model, "next", &Emitter::instant(), &mut sink, None)
        .await
        .unwrap();
    assert_eq!(model.requests[1], vec![ContentPart::text("next")]);
}

#[tokio::test]
async fn inputs_are_consumed_even_when_request_fails() {
    let mut session = SessionContext::new();
    session.set_camera_image(vec![1]);
    session.select_command("explain");
    let mut model = ScriptedModel::replying(vec![Err(ChatError::ApiMessage("boom".into()))]);
    let mut sink = |_: &str| {};
    assert!(session
        .run_turn(&mut model, "x", &Emitter::instant(), &mut sink, None)
        .await
        .is_err());
    assert!(!session.has_camera_image());
    assert!(session.active_command().is_none());
}

#[test]
fn unknown_command_is_not_selected() {
    let mut session = SessionContext::new();
    assert!(session.select_command("nope").is_none());
    assert!(session.active_command().is_none());
}

#[tokio::test]
async fn reset_clears_everything() {
    let mut session = SessionContext::new();
    let mut model = ScriptedModel::replying(vec![Ok("hi".into())]);
    let mut sink = |_: &str| {};
    session
        .run_turn(&mut model, "hello", &Emitter::instant(), &mut sink, None)
        .await
        .unwrap();
    session.set_conversation_id(Some("abc".into()));
    session.select_command("quiz");
    session.set_camera_image(vec![1]);

    session.reset();
    model.reset();

    assert_eq!(session.transcript().len(), 1);
    assert!(session.conversation_id().is_none());
    assert!(session.active_command().is_none());
    assert!(!session.has_camera_image());
    assert!(!session.is_dirty());
    assert_eq!(model.resets, 1);
}

#[test]
fn resume_keeps_saved_transcript() {
    let saved = vec![
        ChatMessage::assistant("greeting"),
        ChatMessage::user("q"),
        ChatMessage::assistant("a"),
    ];
    let session = SessionContext::resume("id-1".into(), saved.clone());
    assert_eq!(session.transcript(), saved.as_slice());
    assert_eq!(session.conversation_id(), Some("id-1"));
}
