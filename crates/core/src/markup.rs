//! Parsing of the star-delimited markup the model is asked to produce.
//!
//! The convention is: title in `*…*`, subtitles in `**…**`, paragraphs in
//! `***…***` and a comma-separated tag line in `****…****`.
//!
//! # Scanning rules
//!
//! The text is split into *star runs* (maximal sequences of `*`) and the
//! text between them. The length of a run decides its role:
//!
//! | run | role |
//! |-----|------|
//! | 1 | title delimiter |
//! | 2 | subtitle delimiter |
//! | 3 | paragraph delimiter |
//! | 4 | tag delimiter |
//! | 5 | subtitle close fused with paragraph open, or paragraph close fused with subtitle open |
//!
//! * **Title**: the text between the first pair of consecutive single-star
//!   runs with no line break in between. Defaults to `"Untitled"`.
//!   Stars that belong to longer runs never delimit the title.
//! * **Tag**: the text between a 4-run and the next 4-run on the same line.
//!   Single stars in between are literal. Defaults to `"No tags formed"`.
//!   The tag line is never split.
//! * **Sections**: a 2-run opens a subtitle, which closes at the very next
//!   run. A closing 2-run must be followed, after optional whitespace
//!   (line breaks included), by a 3-run opening the paragraph; otherwise
//!   both 2-runs are dropped. A closing 3-run opens the paragraph directly,
//!   and a 5-run is close plus open.
//!   The paragraph closes at the next 3-run or 5-run, with single stars
//!   inside kept as text. A 2-run or 4-run met inside a paragraph abandons
//!   the candidate and scanning resumes at that run. Neither field may span
//!   a line break. Text outside sections is ignored.
//!
//! A stray `*` in body text still changes how runs pair up, so badly formed
//! model output can lose or mis-split sections. Nothing here ever fails.

use chrono::{NaiveDate, Utc};

use crate::draft::{NewsletterDraft, Section};

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_TAG: &str = "No tags formed";

/// A maximal sequence of `*` starting at byte `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    start: usize,
    len: usize,
}

impl Run {
    fn end(self) -> usize {
        self.start + self.len
    }
}

/// Parses raw model output into a draft dated today (UTC).
pub fn parse_content(raw: &str, category: &str) -> NewsletterDraft {
    parse_content_on(raw, category, Utc::now().date_naive())
}

/// Parses raw model output into a draft carrying `date`.
pub fn parse_content_on(raw: &str, category: &str, date: NaiveDate) -> NewsletterDraft {
    let runs = star_runs(raw);

    NewsletterDraft {
        title: find_title(raw, &runs).unwrap_or(DEFAULT_TITLE).to_string(),
        tag: find_tag(raw, &runs).unwrap_or(DEFAULT_TAG).to_string(),
        category: category.to_string(),
        date,
        content: find_sections(raw, &runs),
    }
}

fn star_runs(text: &str) -> Vec<Run> {
    let bytes = text.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'*' {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i] == b'*' {
            i += 1;
        }
        runs.push(Run { start, len: i - start });
    }

    runs
}

fn has_line_break(text: &str) -> bool {
    text.chars().any(|c| matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}'))
}

fn between(text: &str, open: Run, close: Run) -> &str {
    &text[open.end()..close.start]
}

fn find_title<'a>(text: &'a str, runs: &[Run]) -> Option<&'a str> {
    runs.windows(2)
        .filter(|pair| pair[0].len == 1 && pair[1].len == 1)
        .map(|pair| between(text, pair[0], pair[1]))
        .find(|inner| !has_line_break(inner))
        .map(str::trim)
}

fn find_tag<'a>(text: &'a str, runs: &[Run]) -> Option<&'a str> {
    let mut i = 0;

    while i < runs.len() {
        if runs[i].len != 4 {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < runs.len() && runs[j].len == 1 {
            j += 1;
        }

        let close = runs.get(j)?;
        if close.len == 4 {
            let inner = between(text, runs[i], *close);
            if !has_line_break(inner) {
                return Some(inner.trim());
            }
        }
        i = j;
    }

    None
}

fn find_sections(text: &str, runs: &[Run]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut i = 0;
    // Set when runs[i] is a 5-run whose trailing stars open the next subtitle.
    let mut reopened = false;

    while i < runs.len() {
        let opener = runs[i];
        let opens = opener.len == 2 || (reopened && opener.len == 5);
        reopened = false;
        if !opens {
            i += 1;
            continue;
        }

        let Some(&close) = runs.get(i + 1) else {
            break;
        };
        let subtitle = between(text, opener, close);
        if has_line_break(subtitle) {
            i += 1;
            continue;
        }

        let para_open = match close.len {
            2 => match runs.get(i + 2) {
                Some(&next) if next.len == 3 && between(text, close, next).trim().is_empty() => i + 2,
                _ => {
                    i += 2;
                    continue;
                }
            },
            3 | 5 => i + 1,
            _ => {
                i += 1;
                continue;
            }
        };

        let mut q = para_open + 1;
        while q < runs.len() && runs[q].len == 1 {
            q += 1;
        }
        let Some(&para_close) = runs.get(q) else {
            break;
        };
        let paragraph = between(text, runs[para_open], para_close);

        if matches!(para_close.len, 3 | 5) && !has_line_break(paragraph) {
            sections.push(Section { subtitle: subtitle.trim().to_string(), paragraph: paragraph.trim().to_string() });
            reopened = para_close.len == 5;
            i = if reopened { q } else { q + 1 };
        } else {
            i = q;
        }
    }

    sections
}
