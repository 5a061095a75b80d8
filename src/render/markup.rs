use regex::{Regex, RegexBuilder};

/// Recognises a heading line. Matching runs against the line after trimming
/// and dropping leading markup (`#`, emphasis markers, emoji) and inner
/// `**`/`__`, always case-insensitively and anchored at the line start.
#[derive(Debug, Clone)]
pub enum HeadingRule {
    Literal(String),
    Pattern(Regex),
}

impl HeadingRule {
    pub fn literal(prefix: &str) -> Self {
        HeadingRule::Literal(prefix.to_lowercase())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&format!("^(?:{})", pattern))
            .case_insensitive(true)
            .build()?;
        Ok(HeadingRule::Pattern(regex))
    }

    pub fn matches(&self, line: &str) -> bool {
        let key = heading_key(line);
        if key.is_empty() {
            return false;
        }
        match self {
            HeadingRule::Literal(prefix) => {
                let key = key.to_lowercase();
                let Some(rest) = key.strip_prefix(prefix.as_str()) else {
                    return false;
                };
                // A literal ending in a word character must end a word: "Tips" is not "Tipsy".
                !ends_in_word_char(prefix) || !rest.starts_with(is_word_char)
            }
            HeadingRule::Pattern(regex) => regex.is_match(&key),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn ends_in_word_char(text: &str) -> bool {
    text.chars().next_back().is_some_and(is_word_char)
}

/// First rule in order that matches wins.
pub fn first_match<'a>(rules: &'a [HeadingRule], line: &str) -> Option<&'a HeadingRule> {
    rules.iter().find(|rule| rule.matches(line))
}

fn heading_key(line: &str) -> String {
    // Bulleted lines are list content, never headings.
    let t = line.trim_start();
    if ["* ", "- ", "*\t", "-\t"].iter().any(|b| t.starts_with(b)) {
        return String::new();
    }
    let start = line
        .char_indices()
        .find(|&(_, c)| !is_leading_decoration(c))
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    line[start..].replace("**", "").replace("__", "").trim_end().to_string()
}

fn is_leading_decoration(c: char) -> bool {
    c.is_whitespace()
        || matches!(c, '*' | '_' | '#' | '\u{200d}' | '\u{fe0f}')
        || (!c.is_ascii() && !c.is_alphanumeric())
}

/// Drop bold/italic markers: every `**`/`__` pair, then stray `*`/`_` at the ends.
/// Unbalanced markers are tolerated.
pub fn strip_emphasis(text: &str) -> String {
    text.replace("**", "")
        .replace("__", "")
        .trim()
        .trim_matches(|c| c == '*' || c == '_')
        .trim()
        .to_string()
}

/// Title text for a heading line: markdown hashes, emphasis and one trailing colon removed.
pub fn heading_title(line: &str) -> String {
    let without_hashes = line.trim().trim_start_matches('#');
    let stripped = strip_emphasis(without_hashes);
    match stripped.strip_suffix(':') {
        Some(title) => title.trim_end().to_string(),
        None => stripped,
    }
}

const EMPHASIS_MARKERS: [&str; 6] = ["***", "**", "*", "___", "__", "_"];

/// Inner text if the whole line is wrapped in one emphasis marker
/// (`**x**`, `*x*`, `__x__`, also `**x**:`).
pub fn emphasis_wrapped(line: &str) -> Option<&str> {
    let t = line.trim();
    for marker in EMPHASIS_MARKERS {
        if t.len() <= marker.len() * 2 || !t.starts_with(marker) {
            continue;
        }
        let body = &t[marker.len()..];
        let inner = body.strip_suffix(marker).or_else(|| {
            body.strip_suffix(':')
                .and_then(|b| b.strip_suffix(marker))
        });
        if let Some(inner) = inner {
            let inner = inner.trim();
            if !inner.is_empty() {
                return Some(inner);
            }
        }
    }
    None
}

/// `---`, `***`, `___` and similar separator lines.
pub fn is_horizontal_rule(line: &str) -> bool {
    let t = line.trim();
    t.len() >= 3
        && (t.chars().all(|c| c == '-' || c == ' ')
            || t.chars().all(|c| c == '*' || c == ' ')
            || t.chars().all(|c| c == '_' || c == ' ')
            || t.chars().all(|c| c == '='))
}
