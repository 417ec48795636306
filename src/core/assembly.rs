//! Builds the ordered content parts for one request.

use crate::core::attachments::Attachment;
use crate::core::commands::PrebuiltCommand;
use crate::core::content::ContentPart;

/// MIME type of camera snapshots.
pub const CAMERA_MIME_TYPE: &str = "image/jpeg";

/// Assemble a request: attachments in order, then the camera image, then the prompt.
///
/// An active command prefixes the prompt with its template and is reset to `None`.
pub fn assemble(
    prompt: &str,
    attachments: &[Attachment],
    camera_image: Option<&[u8]>,
    active_command: &mut Option<&'static PrebuiltCommand>,
) -> Vec<ContentPart> {
    let mut parts = Vec::with_capacity(attachments.len() + 2);

    parts.extend(attachments.iter().map(|a| {
        ContentPart::binary(a.mime_type.clone(), a.bytes.clone(), Some(a.name.clone()))
    }));

    if let Some(image) = camera_image {
        parts.push(ContentPart::binary(
            CAMERA_MIME_TYPE,
            image.to_vec(),
            Some("camera.jpg".to_string()),
        ));
    }

    let text = match active_command.take() {
        Some(command) => {
            log::debug!("Applying prebuilt command {}", command.name);
            command.apply(prompt)
        }
        None => prompt.to_string(),
    };
    parts.push(ContentPart::Text(text));
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::find_command;

    #[test]
    fn prompt_only() {
        let mut cmd = None;
        let parts = assemble("hello", &[], None, &mut cmd);
        assert_eq!(parts, vec![ContentPart::text("hello")]);
    }

    #[test]
    fn attachments_then_camera_then_prompt() {
        let attachments = vec![
            Attachment::new("a.pdf", "application/pdf", vec![1]),
            Attachment::new("b.png", "image/png", vec![2]),
        ];
        let mut cmd = None;
        let parts = assemble("what is this", &attachments, Some(&[9u8, 9][..]), &mut cmd);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].mime_type(), "application/pdf");
        assert_eq!(parts[1].mime_type(), "image/png");
        assert_eq!(
            parts[2],
            ContentPart::binary("image/jpeg", vec![9, 9], Some("camera.jpg".to_string()))
        );
        assert_eq!(parts[3], ContentPart::text("what is this"));
    }

    #[test]
    fn attachment_name_is_kept() {
        let attachments = vec![Attachment::new("essay.docx", "application/msword", vec![0])];
        let mut cmd = None;
        let parts = assemble("check", &attachments, None, &mut cmd);
        match &parts[0] {
            ContentPart::Binary { name, .. } => assert_eq!(name.as_deref(), Some("essay.docx")),
            other => panic!("expected binary part, got {:?}", other),
        }
    }

    #[test]
    fn active_command_prefixes_prompt_and_resets() {
        let quiz = find_command("quiz").unwrap();
        let mut cmd = Some(quiz);
        let parts = assemble("cell biology", &[], None, &mut cmd);
        assert_eq!(
            parts.last(),
            Some(&ContentPart::Text(format!(
                "{}\ncell biology",
                quiz.prompt_template
            )))
        );
        assert!(cmd.is_none());
    }
}
