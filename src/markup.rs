use quick_xml::escape::{escape, partial_escape};
use std::borrow::Cow;

// @module: Caption markup rendering

// Markup syntax: **bold**, *italic*, _underline_, newline for a line break.
// Spans nest. A marker with no partner, or one closed across a different
// open marker, is plain text.

/// DFXP span opening tags, keyed by the markup marker they stand for
pub const DFXP_BOLD: &str = r#"<span tts:fontWeight="bold">"#;
pub const DFXP_ITALIC: &str = r#"<span tts:fontStyle="italic">"#;
pub const DFXP_UNDERLINE: &str = r#"<span tts:textDecoration="underline">"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Bold,
    Italic,
    Underline,
}

impl Marker {
    fn as_str(self) -> &'static str {
        match self {
            Marker::Bold => "**",
            Marker::Italic => "*",
            Marker::Underline => "_",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Token<'a> {
    Text(&'a str),
    Marker(Marker),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Open,
    Close,
    Literal,
}

// @struct: Output strings for one rendering target
struct SpanTags {
    bold: (&'static str, &'static str),
    italic: (&'static str, &'static str),
    underline: (&'static str, &'static str),
    line_break: &'static str,
    escape: fn(&str) -> Cow<'_, str>,
}

impl SpanTags {
    fn pair(&self, marker: Marker) -> (&'static str, &'static str) {
        match marker {
            Marker::Bold => self.bold,
            Marker::Italic => self.italic,
            Marker::Underline => self.underline,
        }
    }

    fn push_text(&self, out: &mut String, text: &str) {
        out.push_str(&(self.escape)(text).replace('\n', self.line_break));
    }
}

fn escape_html(text: &str) -> Cow<'_, str> {
    escape(text)
}

fn escape_xml_text(text: &str) -> Cow<'_, str> {
    partial_escape(text)
}

fn keep_text(text: &str) -> Cow<'_, str> {
    Cow::Borrowed(text)
}

const HTML_TAGS: SpanTags = SpanTags {
    bold: ("<b>", "</b>"),
    italic: ("<i>", "</i>"),
    underline: ("<u>", "</u>"),
    line_break: "<br>",
    escape: escape_html,
};

const DFXP_TAGS: SpanTags = SpanTags {
    bold: (DFXP_BOLD, "</span>"),
    italic: (DFXP_ITALIC, "</span>"),
    underline: (DFXP_UNDERLINE, "</span>"),
    line_break: "<br/>",
    escape: escape_xml_text,
};

const PLAIN_TAGS: SpanTags = SpanTags {
    bold: ("", ""),
    italic: ("", ""),
    underline: ("", ""),
    line_break: "\n",
    escape: keep_text,
};

/// Split markup into text runs and markers; `**` is read before `*`
fn tokenize(markup: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut chars = markup.char_indices().peekable();
    while let Some((index, c)) = chars.next() {
        let marker = match c {
            '*' if chars.peek().is_some_and(|(_, next)| *next == '*') => {
                chars.next();
                Marker::Bold
            }
            '*' => Marker::Italic,
            '_' => Marker::Underline,
            _ => continue,
        };
        if text_start < index {
            tokens.push(Token::Text(&markup[text_start..index]));
        }
        tokens.push(Token::Marker(marker));
        text_start = index + marker.as_str().len();
    }
    if text_start < markup.len() {
        tokens.push(Token::Text(&markup[text_start..]));
    }
    tokens
}

/// Decide, left to right, which markers open and close spans
fn assign_roles(tokens: &[Token<'_>]) -> Vec<Role> {
    let mut roles = vec![Role::Literal; tokens.len()];
    let mut open: Vec<(Marker, usize)> = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        let Token::Marker(marker) = token else {
            continue;
        };
        match open.iter().rposition(|(candidate, _)| candidate == marker) {
            Some(depth) => {
                // Markers opened inside the span but not closed in it stay literal
                let opener = open[depth].1;
                open.truncate(depth);
                roles[opener] = Role::Open;
                roles[index] = Role::Close;
            }
            None => open.push((*marker, index)),
        }
    }
    roles
}

fn render(markup: &str, tags: &SpanTags) -> String {
    let tokens = tokenize(markup);
    let roles = assign_roles(&tokens);
    let mut out = String::with_capacity(markup.len());
    for (token, role) in tokens.iter().zip(roles) {
        match (token, role) {
            (Token::Text(text), _) => tags.push_text(&mut out, text),
            (Token::Marker(marker), Role::Open) => out.push_str(tags.pair(*marker).0),
            (Token::Marker(marker), Role::Close) => out.push_str(tags.pair(*marker).1),
            (Token::Marker(marker), Role::Literal) => tags.push_text(&mut out, marker.as_str()),
        }
    }
    out
}

/// Render caption markup as HTML for display
pub fn to_html(markup: &str) -> String {
    render(markup, &HTML_TAGS)
}

/// Render caption markup as plain text, keeping line breaks
pub fn to_plaintext(markup: &str) -> String {
    render(markup, &PLAIN_TAGS)
}

/// Render caption markup as DFXP inline content (the children of a `<p>`)
pub fn to_dfxp(markup: &str) -> String {
    render(markup, &DFXP_TAGS)
}

/// Markup as a caption document stores it: every line trimmed, no surrounding blank lines
pub fn normalize(markup: &str) -> String {
    markup
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Count characters per line of the rendered plain text
pub fn character_counts_per_line(markup: &str) -> Vec<usize> {
    to_plaintext(markup)
        .split('\n')
        .map(|line| line.chars().count())
        .collect()
}
