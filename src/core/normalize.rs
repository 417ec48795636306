//! Cleanup of raw model output before it is typed out.
//!
//! Models often glue list items to the preceding paragraph or leave runs of blank
//! lines. `normalize` puts every numbered and bulleted line on its own paragraph,
//! collapses blank runs, and separates a bullet block from the prose after it.
//!
//! Rule interaction, pinned down by the tests below:
//! - a nested bullet inside a numbered block is still a bullet and gets its own blank line;
//! - a numbered line followed by prose is left attached (only bullets get the trailing gap);
//! - any line starting with `*` counts as a bullet, including `**bold**` headings.

use std::sync::OnceLock;

use regex::Regex;

static ORDINAL_MARKER: OnceLock<Regex> = OnceLock::new();

fn ordinal_marker() -> &'static Regex {
    ORDINAL_MARKER.get_or_init(|| Regex::new(r"^\d+\.").expect("ordinal marker regex is valid"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Blank,
    Numbered,
    Bullet,
    Prose,
}

fn classify(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineKind::Blank
    } else if ordinal_marker().is_match(trimmed) {
        LineKind::Numbered
    } else if trimmed.starts_with('*') || trimmed.starts_with('-') {
        LineKind::Bullet
    } else {
        LineKind::Prose
    }
}

/// Rewrite raw model output into cleanly separated lines. Pure and idempotent.
pub fn normalize(raw: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut prev = LineKind::Blank;

    for line in raw.lines() {
        let line = line.trim_end();
        let kind = classify(line);
        match kind {
            LineKind::Blank => {
                if prev != LineKind::Blank {
                    out.push("");
                }
            }
            LineKind::Numbered | LineKind::Bullet => {
                if prev != LineKind::Blank {
                    out.push("");
                }
                out.push(line);
            }
            LineKind::Prose => {
                if prev == LineKind::Bullet {
                    out.push("");
                }
                out.push(line);
            }
        }
        prev = kind;
    }

    out.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_lines_are_isolated() {
        assert_eq!(
            normalize("intro\n1. first\n2. second"),
            "intro\n\n1. first\n\n2. second"
        );
    }

    #[test]
    fn bullets_are_isolated() {
        assert_eq!(
            normalize("Here you go:\n* one\n- two"),
            "Here you go:\n\n* one\n\n- two"
        );
    }

    #[test]
    fn blank_runs_collapse_to_one_blank_line() {
        assert_eq!(normalize("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\n\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\n  \n\t\n \nb"), "a\n\nb");
    }

    #[test]
    fn single_blank_line_is_kept() {
        assert_eq!(normalize("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn prose_after_bullet_gets_gap() {
        assert_eq!(
            normalize("- milk\n- eggs\nThat's everything."),
            "- milk\n\n- eggs\n\nThat's everything."
        );
    }

    #[test]
    fn prose_after_numbered_line_stays_attached() {
        assert_eq!(
            normalize("1. Preheat the oven\nto 350 degrees."),
            "1. Preheat the oven\nto 350 degrees."
        );
    }

    #[test]
    fn nested_bullet_inside_numbered_block() {
        assert_eq!(
            normalize("1. first\n   - detail\n2. second"),
            "1. first\n\n   - detail\n\n2. second"
        );
    }

    #[test]
    fn bold_heading_counts_as_bullet() {
        assert_eq!(
            normalize("Answer:\n**Photosynthesis**\nPlants make sugar."),
            "Answer:\n\n**Photosynthesis**\n\nPlants make sugar."
        );
    }

    #[test]
    fn whole_result_is_trimmed() {
        assert_eq!(normalize("\n\n  hello  \n\n\n"), "hello");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n \n"), "");
    }

    #[test]
    fn trailing_whitespace_removed_per_line() {
        assert_eq!(normalize("one   \ntwo\t"), "one\ntwo");
    }

    #[test]
    fn crlf_line_endings() {
        assert_eq!(normalize("intro\r\n1. first\r\n"), "intro\n\n1. first");
    }

    #[test]
    fn plain_paragraphs_untouched() {
        let text = "The mitochondria is the powerhouse of the cell.\nIt makes ATP.";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn idempotent_on_normalized_output() {
        let fixtures = [
            "intro\n1. first\n2. second",
            "Here:\n* a\n* b\nafter\n\n\n\nend",
            "1. first\n   - detail\n2. second\ntext",
            "**Title**\nBody\n- x\n\n\n- y",
            "no lists at all",
        ];
        for raw in fixtures {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", raw);
        }
    }
}
