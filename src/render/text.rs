//! Word wrapping and label escaping shared by the renderers.

/// Graphviz HTML-label line break, left aligned.
pub const DOT_LINE_BREAK: &str = r#"<BR align="left"/>"#;

/// Splits `text` into lines of at most `max_line_length` characters where possible.
///
/// Lines break at the last space before the limit. A line break already present within
/// one and a half times the limit is preferred over a new one, because scraped texts
/// carry both meaningful breaks ("Cluster: Ablehnung\n...") and layout artefacts. Words
/// longer than the limit are cut.
pub fn wrap(text: &str, max_line_length: usize) -> Vec<String> {
    let max = max_line_length.max(1);
    let lookahead = max * 3 / 2;
    let mut parts = Vec::new();
    let mut rest: Vec<char> = text.chars().collect();

    while rest.len() > max {
        let line_break = rest[..lookahead.min(rest.len())]
            .iter()
            .rposition(|&c| c == '\n');
        let whitespace = rest[..max].iter().rposition(|&c| c == ' ');
        let split = line_break.or(whitespace).unwrap_or(max);

        let head: String = rest[..split].iter().collect();
        let mut part = head.trim_end().to_string();
        if line_break.is_some() {
            part = part.replace('\n', "");
        }
        parts.push(part);

        let skip = rest[split..]
            .iter()
            .take_while(|c| c.is_whitespace())
            .count();
        rest.drain(..split + skip);
    }

    if !rest.is_empty() {
        parts.push(rest.into_iter().collect());
    }
    parts
}

/// Wraps, escapes and joins `text` for use inside a Graphviz HTML label.
pub fn html_label(text: &str, max_line_length: usize) -> String {
    let wrapped = wrap(text, max_line_length).join("\n");
    escape_html(&wrapped).replace('\n', DOT_LINE_BREAK)
}

pub fn escape_html(text: &str) -> String {
    htmlize::escape_text(text).into_owned()
}

/// Escapes a Graphviz quoted identifier.
pub fn quote_id(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}
