//! Simulated typing: re-render a finished response word by word.
//!
//! The final string always equals the input text. Pacing and the cursor marker
//! only affect intermediate renders.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Glyph shown at the end of the text while typing is in progress.
pub const CURSOR_MARKER: char = '▌';

/// Pause between two rendered tokens.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(50);

/// Something that displays a string and can replace it wholesale.
pub trait Sink {
    /// In-progress frame: the text so far followed by [`CURSOR_MARKER`].
    fn replace(&mut self, text: &str);

    /// Final text, without a cursor. Called exactly once, last.
    fn finish(&mut self, text: &str) {
        self.replace(text)
    }
}

impl<F: FnMut(&str)> Sink for F {
    fn replace(&mut self, text: &str) {
        self(text)
    }
}

/// One unit of simulated typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Word(&'a str),
    Newline,
}

/// Split text into words (on single spaces) with a newline token between lines.
/// Empty words from repeated spaces are kept so spacing survives the round trip.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            tokens.push(Token::Newline);
        }
        tokens.extend(line.split(' ').map(Token::Word));
    }
    tokens
}

#[derive(Debug, Clone)]
pub struct Emitter {
    delay: Duration,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl Emitter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// No pacing: every token is rendered back to back.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Type `text` into `sink` and return the final string.
    ///
    /// Each token is followed by a render of `accumulated + cursor` and a pause.
    /// Once `cancel` fires, the remaining tokens are appended without rendering
    /// and the final text is shown at once.
    pub async fn emit<S: Sink + ?Sized>(
        &self,
        text: &str,
        sink: &mut S,
        cancel: Option<&CancellationToken>,
    ) -> String {
        let mut acc = String::with_capacity(text.len() + 1);
        let mut at_line_start = true;
        let mut paced = true;

        for token in tokenize(text) {
            let before = acc.len();
            match token {
                Token::Newline => {
                    acc.push('\n');
                    at_line_start = true;
                }
                Token::Word(word) => {
                    if !at_line_start {
                        acc.push(' ');
                    }
                    acc.push_str(word);
                    at_line_start = false;
                }
            }

            // empty word at line start: nothing new to show
            if acc.len() == before {
                continue;
            }
            if paced && cancel.is_some_and(|t| t.is_cancelled()) {
                log::debug!("typing cancelled, rendering final text");
                paced = false;
            }
            if !paced {
                continue;
            }

            let mut frame = String::with_capacity(acc.len() + CURSOR_MARKER.len_utf8());
            frame.push_str(&acc);
            frame.push(CURSOR_MARKER);
            sink.replace(&frame);

            if self.delay.is_zero() {
                continue;
            }
            match cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => paced = false,
                        _ = tokio::time::sleep(self.delay) => {}
                    }
                }
                None => tokio::time::sleep(self.delay).await,
            }
        }

        sink.finish(&acc);
        acc
    }
}
