use serde::Serialize;

use super::markup::{emphasis_wrapped, first_match, is_horizontal_rule, strip_emphasis, HeadingRule};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentNode {
    Heading {
        text: String,
    },
    Paragraph {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    ListItem {
        indent_level: usize,
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    TitledListItem {
        indent_level: usize,
        title: String,
        description: String,
    },
    NutritionNote {
        text: String,
    },
}

const NUTRITION_KEYWORD: &str = "nutritional information";
const MAX_TITLE_CHARS: usize = 48;
const MAX_TITLE_WORDS: usize = 6;

/// One source line, pre-split into bullet/indent parts.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    trimmed: &'a str,
    indent_level: usize,
    /// Text after the bullet marker, for list lines
    bullet_content: Option<&'a str>,
}

impl<'a> Line<'a> {
    fn parse(raw: &'a str) -> Self {
        let trimmed = raw.trim();
        let leading = raw.len() - raw.trim_start().len();
        let indent_spaces: usize = raw[..leading]
            .chars()
            .map(|c| if c == '\t' { 2 } else { 1 })
            .sum();

        let bullet_content = trimmed
            .strip_prefix('*')
            .or_else(|| trimmed.strip_prefix('-'))
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
            .map(str::trim);

        Self {
            trimmed,
            indent_level: indent_spaces / 2,
            bullet_content,
        }
    }

    /// Content a classifier looks at: bullet text for list lines, else the whole line.
    fn content(&self) -> &'a str {
        self.bullet_content.unwrap_or(self.trimmed)
    }
}

type Classify = fn(&InlineRenderer, &Line<'_>) -> Option<ContentNode>;

/// Classifiers in precedence order; the first to return a node wins.
const LINE_RULES: [(&str, Classify); 5] = [
    ("nutrition_note", nutrition_note),
    ("sub_heading", sub_heading),
    ("titled_list_item", titled_list_item),
    ("list_item", list_item),
    ("paragraph", paragraph),
];

/// Turns one section body into display nodes, line by line.
#[derive(Debug, Clone, Default)]
pub struct InlineRenderer {
    sub_headings: Vec<HeadingRule>,
}

impl InlineRenderer {
    pub fn new(sub_headings: Vec<HeadingRule>) -> Self {
        Self { sub_headings }
    }

    pub fn render(&self, body: &str) -> Vec<ContentNode> {
        self.nodes(body).collect()
    }

    /// Lazy form of [`render`](Self::render); calling it again restarts from the top.
    pub fn nodes<'a>(&'a self, body: &'a str) -> impl Iterator<Item = ContentNode> + 'a {
        body.lines().filter_map(move |raw| self.render_line(raw))
    }

    fn render_line(&self, raw: &str) -> Option<ContentNode> {
        if raw.trim().is_empty() || is_horizontal_rule(raw) {
            return None;
        }
        let line = Line::parse(raw);
        for (name, classify) in LINE_RULES {
            if let Some(node) = classify(self, &line) {
                log::trace!("line rule {} matched: {:?}", name, line.trimmed);
                return Some(node);
            }
        }
        None
    }
}

fn nutrition_note(_: &InlineRenderer, line: &Line<'_>) -> Option<ContentNode> {
    let inner = emphasis_wrapped(line.content())?;
    if !inner.to_lowercase().contains(NUTRITION_KEYWORD) {
        return None;
    }
    non_empty(strip_emphasis(inner)).map(|text| ContentNode::NutritionNote { text })
}

fn sub_heading(renderer: &InlineRenderer, line: &Line<'_>) -> Option<ContentNode> {
    if line.bullet_content.is_some() {
        return None;
    }
    let inner = emphasis_wrapped(line.trimmed)?;
    first_match(&renderer.sub_headings, inner)?;
    let text = strip_emphasis(inner);
    let text = text.strip_suffix(':').unwrap_or(&text).trim_end().to_string();
    non_empty(text).map(|text| ContentNode::Heading { text })
}

fn titled_list_item(_: &InlineRenderer, line: &Line<'_>) -> Option<ContentNode> {
    let content = line.bullet_content?;
    let (raw_title, raw_description) = content.split_once(':')?;

    // The colon must end the label: "7:30" or "https://" are not titles.
    let after_colon = raw_description.trim_start_matches(|c| c == '*' || c == '_');
    if !after_colon.is_empty() && !after_colon.starts_with(char::is_whitespace) {
        return None;
    }

    let title = strip_emphasis(raw_title);
    if title.is_empty()
        || title.chars().count() > MAX_TITLE_CHARS
        || title.split_whitespace().count() > MAX_TITLE_WORDS
    {
        return None;
    }

    Some(ContentNode::TitledListItem {
        indent_level: line.indent_level,
        title,
        description: strip_emphasis(raw_description),
    })
}

fn list_item(_: &InlineRenderer, line: &Line<'_>) -> Option<ContentNode> {
    let content = line.bullet_content?;
    non_empty(strip_emphasis(content)).map(|text| ContentNode::ListItem {
        indent_level: line.indent_level,
        text,
    })
}

fn paragraph(_: &InlineRenderer, line: &Line<'_>) -> Option<ContentNode> {
    if line.bullet_content.is_some() {
        return None;
    }
    non_empty(strip_emphasis(line.trimmed)).map(|text| ContentNode::Paragraph { text })
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
