//! Terminal sinks for the typing effect.

use std::io::{self, Write};

use crossterm::cursor::MoveLeft;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};

use crate::core::emit::{CURSOR_MARKER, Sink};

/// Renders each replacement incrementally: erases the cursor marker, prints the
/// new suffix, and redraws the marker. Falls back to a fresh line when the new
/// text does not extend what is on screen.
pub struct TerminalSink<W: Write> {
    out: W,
    shown: String,
    cursor_visible: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: String::new(),
            cursor_visible: false,
        }
    }

    fn render(&mut self, body: &str, with_cursor: bool) -> io::Result<()> {
        if self.cursor_visible {
            queue!(self.out, MoveLeft(1), Clear(ClearType::UntilNewLine))?;
        }
        match body.strip_prefix(self.shown.as_str()) {
            Some(rest) => {
                queue!(self.out, Print(rest))?;
                self.shown.push_str(rest);
            }
            None => {
                queue!(self.out, Print('\n'), Print(body))?;
                self.shown = body.to_string();
            }
        }
        if with_cursor {
            queue!(self.out, Print(CURSOR_MARKER))?;
        }
        self.cursor_visible = with_cursor;
        self.out.flush()
    }

    /// End the rendered block with a newline.
    pub fn end_line(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Sink for TerminalSink<W> {
    fn replace(&mut self, text: &str) {
        let body = text.strip_suffix(CURSOR_MARKER).unwrap_or(text);
        if let Err(e) = self.render(body, true) {
            log::debug!("terminal render failed: {}", e);
        }
    }

    fn finish(&mut self, text: &str) {
        if let Err(e) = self.render(text, false) {
            log::debug!("terminal render failed: {}", e);
        }
    }
}

/// For non-terminal output: ignores in-progress frames and writes only the final text.
pub struct FinalOnlySink<W: Write> {
    out: W,
}

impl<W: Write> FinalOnlySink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Sink for FinalOnlySink<W> {
    fn replace(&mut self, _text: &str) {}

    fn finish(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            log::debug!("output write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_shown_text_without_cursor() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.replace("one▌");
        sink.replace("one two▌");
        assert_eq!(sink.shown, "one two");
        sink.finish("one two");
        assert_eq!(sink.shown, "one two");
        assert!(!sink.cursor_visible);
    }

    #[test]
    fn final_text_keeps_trailing_cursor_glyph() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.replace("50% ▌▌");
        assert_eq!(sink.shown, "50% ▌");
        sink.finish("50% ▌");
        assert_eq!(sink.shown, "50% ▌");
        assert!(!sink.cursor_visible);
    }

    #[test]
    fn prints_only_new_suffix() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.finish("alpha");
        sink.finish("alpha beta");
        let out = String::from_utf8(sink.out.clone()).unwrap();
        assert_eq!(out, "alpha beta");
    }

    #[test]
    fn unrelated_text_starts_new_line() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.finish("first");
        sink.finish("second");
        let out = String::from_utf8(sink.out.clone()).unwrap();
        assert_eq!(out, "first\nsecond");
        assert_eq!(sink.shown, "second");
    }

    #[test]
    fn final_only_sink_skips_frames() {
        let mut buf = Vec::new();
        {
            let mut sink = FinalOnlySink::new(&mut buf);
            sink.replace("a▌");
            sink.replace("a b▌");
            sink.finish("a b");
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "a b\n");
    }

    #[tokio::test]
    async fn piped_reply_ending_in_cursor_glyph_is_printed() {
        let mut buf = Vec::new();
        let emitter = crate::core::emit::Emitter::instant();
        emitter
            .emit("progress bar ▌", &mut FinalOnlySink::new(&mut buf), None)
            .await;
        assert_eq!(String::from_utf8(buf).unwrap(), "progress bar ▌\n");
    }
}
