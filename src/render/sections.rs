use serde::Serialize;
use std::ops::Range;

use super::markup::{first_match, heading_title, HeadingRule};

/// A titled (or, for a leading preamble, untitled) span of model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub body: String,
    /// Byte range of the source text this section came from
    #[serde(skip)]
    pub span: Range<usize>,
}

/// Splits free-form text into sections at lines matching the heading rules.
///
/// The heading line opens the new section. Text ahead of the first heading
/// is kept as an untitled section unless it is whitespace only, in which
/// case its bytes fold into the first section's span. Spans are contiguous
/// and together cover the whole input.
#[derive(Debug, Clone, Default)]
pub struct SectionParser {
    rules: Vec<HeadingRule>,
}

impl SectionParser {
    pub fn new(rules: Vec<HeadingRule>) -> Self {
        Self { rules }
    }

    pub fn parse(&self, text: &str) -> Vec<Section> {
        let mut boundaries = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            if first_match(&self.rules, line).is_some() {
                boundaries.push(offset);
            }
            offset += line.len();
        }

        let mut sections = Vec::new();

        let preamble_end = boundaries.first().copied().unwrap_or(text.len());
        let preamble = &text[..preamble_end];
        let mut next_start = 0;
        if !preamble.trim().is_empty() {
            sections.push(Section {
                title: String::new(),
                body: trim_blank_lines(preamble).to_string(),
                span: 0..preamble_end,
            });
            next_start = preamble_end;
        }

        for (i, &start) in boundaries.iter().enumerate() {
            let end = boundaries.get(i + 1).copied().unwrap_or(text.len());
            let chunk = &text[start..end];
            let (heading, rest) = match chunk.split_once('\n') {
                Some((heading, rest)) => (heading, rest),
                None => (chunk, ""),
            };
            sections.push(Section {
                title: heading_title(heading),
                body: trim_blank_lines(rest).to_string(),
                span: next_start..end,
            });
            next_start = end;
        }

        sections
    }
}

/// Drop leading blank lines and trailing whitespace, keeping the
/// indentation of the first content line.
fn trim_blank_lines(text: &str) -> &str {
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        start += line.len();
    }
    text[start..].trim_end()
}
