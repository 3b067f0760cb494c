//! # Inline Markup
//!
//! Rendering of text bodies to the markup an editable surface shows, and the
//! inverse walk that reads surface markup back into lines of runs.
//!
//! Wrapper order is fixed so equal content always renders identically:
//!
//! ```text
//! <a href> <span class style> <strong> <em> <u> <code|...> text
//! ```

use folio_document::{InlineRun, Line, TextBody};
use std::collections::BTreeMap;

/// Inline tags allowed as an `elementTypeOverride`
const OVERRIDE_TAGS: &[&str] = &["code", "mark", "s", "sub", "sup", "kbd"];

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `a: b; c: d` in key order
pub(crate) fn style_string(styles: &BTreeMap<String, String>) -> String {
    styles
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join("; ")
}

fn wrap(tag: &str, attrs: &str, inner: String) -> String {
    format!("<{}{}>{}</{}>", tag, attrs, inner, tag)
}

/// Markup for a single run
pub fn render_run(run: &InlineRun) -> String {
    let mut html = escape_html(&run.content);

    if let Some(tag) = &run.element_type_override {
        html = if OVERRIDE_TAGS.contains(&tag.as_str()) {
            wrap(tag, "", html)
        } else {
            wrap("span", &format!(" data-element-type=\"{}\"", escape_html(tag)), html)
        };
    }
    if run.underline {
        html = wrap("u", "", html);
    }
    if run.italic {
        html = wrap("em", "", html);
    }
    if run.bold {
        html = wrap("strong", "", html);
    }
    if run.class_name.is_some() || run.styles.is_some() {
        let mut attrs = String::new();
        if let Some(class) = &run.class_name {
            attrs.push_str(&format!(" class=\"{}\"", escape_html(class)));
        }
        if let Some(styles) = &run.styles {
            attrs.push_str(&format!(" style=\"{}\"", escape_html(&style_string(styles))));
        }
        html = wrap("span", &attrs, html);
    }
    if let Some(href) = &run.href {
        html = wrap("a", &format!(" href=\"{}\"", escape_html(href)), html);
    }

    html
}

pub fn render_line(line: &Line) -> String {
    line.runs.iter().map(render_run).collect()
}

/// Markup for a text body; lines are separated by `<br>`.
///
/// An empty last line gets one extra `<br>`, since a single trailing `<br>`
/// does not open a visible line.
pub fn render_inline(body: &TextBody) -> String {
    match body {
        TextBody::Plain(content) => escape_html(content),
        TextBody::Runs(runs) => runs.iter().map(render_run).collect(),
        TextBody::Lines(lines) => {
            let mut markup = lines.iter().map(render_line).collect::<Vec<_>>().join("<br>");
            if lines.len() > 1 && lines.last().is_some_and(Line::is_empty) {
                markup.push_str("<br>");
            }
            markup
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Open { name: String, attrs: Vec<(String, String)> },
    Close(String),
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some(' '),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => entity[1..].parse::<u32>().ok().and_then(char::from_u32),
                _ => None,
            };
            ch.map(|c| (c, semi + 1))
        });
        match decoded {
            Some((c, used)) => {
                out.push(c);
                rest = &tail[used..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn parse_attrs(source: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        while i < chars.len() && (chars[i].is_whitespace() || chars[i] == '/') {
            i += 1;
        }
        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '=' && chars[i] != '/' {
            i += 1;
        }
        if start == i {
            break;
        }
        let name: String = chars[start..i].iter().collect::<String>().to_ascii_lowercase();
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        let mut value = String::new();
        if i < chars.len() && chars[i] == '=' {
            i += 1;
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            if i < chars.len() && (chars[i] == '"' || chars[i] == '\'') {
                let quote = chars[i];
                i += 1;
                let vstart = i;
                while i < chars.len() && chars[i] != quote {
                    i += 1;
                }
                value = chars[vstart..i].iter().collect();
                i += 1;
            } else {
                let vstart = i;
                while i < chars.len() && !chars[i].is_whitespace() {
                    i += 1;
                }
                value = chars[vstart..i].iter().collect();
            }
        }
        attrs.push((name, decode_entities(&value)));
    }
    attrs
}

fn tokenize(markup: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = markup;

    while !rest.is_empty() {
        if let Some(comment) = rest.strip_prefix("<!--") {
            rest = comment.find("-->").map(|end| &comment[end + 3..]).unwrap_or("");
            continue;
        }
        if rest.starts_with('<') {
            // Find the closing '>' outside of quotes
            let mut quote = None;
            let mut end = None;
            for (i, c) in rest.char_indices().skip(1) {
                match (quote, c) {
                    (Some(q), c) if c == q => quote = None,
                    (Some(_), _) => {}
                    (None, '"') | (None, '\'') => quote = Some(c),
                    (None, '>') => {
                        end = Some(i);
                        break;
                    }
                    _ => {}
                }
            }
            let Some(end) = end else {
                tokens.push(Token::Text(decode_entities(rest)));
                break;
            };
            let inner = rest[1..end].trim();
            rest = &rest[end + 1..];

            if let Some(name) = inner.strip_prefix('/') {
                tokens.push(Token::Close(name.trim().to_ascii_lowercase()));
            } else {
                let name_end = inner
                    .find(|c: char| c.is_whitespace() || c == '/')
                    .unwrap_or(inner.len());
                let name = inner[..name_end].to_ascii_lowercase();
                let attrs = parse_attrs(&inner[name_end..]);
                let self_closing = inner.ends_with('/');
                tokens.push(Token::Open { name: name.clone(), attrs });
                if self_closing {
                    tokens.push(Token::Close(name));
                }
            }
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            tokens.push(Token::Text(decode_entities(&rest[..end])));
            rest = &rest[end..];
        }
    }

    tokens
}

fn parse_style(style: &str) -> BTreeMap<String, String> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let (k, v) = (k.trim(), v.trim());
            (!k.is_empty()).then(|| (k.to_string(), v.to_string()))
        })
        .collect()
}

/// How an open tag changes the formatting of the text inside it
fn apply_tag(run: &mut InlineRun, name: &str, attrs: &[(String, String)]) {
    let attr = |key: &str| attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone());
    match name {
        "b" | "strong" => run.bold = true,
        "i" | "em" => run.italic = true,
        "u" => run.underline = true,
        "a" => run.href = attr("href"),
        "span" => {
            if let Some(ty) = attr("data-element-type") {
                run.element_type_override = Some(ty);
            }
            if let Some(class) = attr("class") {
                run.class_name = Some(class);
            }
            if let Some(style) = attr("style") {
                let styles = parse_style(&style);
                if !styles.is_empty() {
                    run.styles = Some(styles);
                }
            }
        }
        other if OVERRIDE_TAGS.contains(&other) => run.element_type_override = Some(other.to_string()),
        _ => {}
    }
}

enum Event {
    Text(InlineRun),
    LineBreak,
}

/// Walk surface markup as formatted text pieces and line breaks.
///
/// `<br>` ends a line; a `<div>`/`<p>` opening after content starts a new
/// one, and a `<br>` that is the only thing in such a block is ignored.
/// A `<br>` at the very end opens no line.
fn walk(markup: &str) -> Vec<Event> {
    let mut events = Vec::new();
    let mut stack: Vec<(String, Vec<(String, String)>)> = Vec::new();
    let mut seen_content = false;
    let mut fresh_block_line = false;
    let mut trailing_br = false;

    for token in tokenize(markup) {
        match token {
            Token::Text(text) => {
                if text.is_empty() {
                    continue;
                }
                let mut run = InlineRun::plain(text);
                for (name, attrs) in &stack {
                    apply_tag(&mut run, name, attrs);
                }
                events.push(Event::Text(run));
                seen_content = true;
                fresh_block_line = false;
                trailing_br = false;
            }
            Token::Open { name, .. } if name == "br" => {
                if !fresh_block_line {
                    events.push(Event::LineBreak);
                    seen_content = true;
                    trailing_br = true;
                }
                fresh_block_line = false;
            }
            Token::Open { name, .. } if name == "div" || name == "p" => {
                if seen_content {
                    events.push(Event::LineBreak);
                    fresh_block_line = true;
                    trailing_br = false;
                }
            }
            Token::Open { name, attrs } => stack.push((name, attrs)),
            Token::Close(name) => {
                if let Some(pos) = stack.iter().rposition(|(n, _)| *n == name) {
                    stack.truncate(pos);
                }
            }
        }
    }

    if trailing_br {
        events.pop();
    }
    events
}

/// Read surface markup back into normalized lines of runs
pub fn parse_inline(markup: &str) -> Vec<Line> {
    let mut lines = vec![Line::default()];
    for event in walk(markup) {
        match event {
            Event::Text(run) => {
                if let Some(line) = lines.last_mut() {
                    line.runs.push(run);
                }
            }
            Event::LineBreak => lines.push(Line::default()),
        }
    }
    for line in &mut lines {
        line.normalize();
    }
    lines
}

/// The rendered text nodes of some markup, in document order.
///
/// Line breaks appear as `"\n"` segments so offsets line up with a node's
/// logical text.
pub fn text_segments(markup: &str) -> Vec<String> {
    walk(markup)
        .into_iter()
        .map(|event| match event {
            Event::Text(run) => run.content,
            Event::LineBreak => "\n".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_order_is_fixed() {
        let mut run = InlineRun::plain("x").bold().italic().underline().with_href("/a");
        run.class_name = Some("hl".into());
        assert_eq!(
            render_run(&run),
            r#"<a href="/a"><span class="hl"><strong><em><u>x</u></em></strong></span></a>"#
        );
    }

    #[test]
    fn test_parse_inverts_render() {
        let mut styled = InlineRun::plain("c & d");
        styled.styles = Some(BTreeMap::from([("color".to_string(), "red".to_string())]));
        let lines = vec![
            Line::new(vec![InlineRun::plain("a "), InlineRun::plain("b").bold().italic()]),
            Line::new(vec![styled, InlineRun::plain("e").with_href("https://x.y/?q=1&r=2")]),
        ];
        let markup = render_inline(&TextBody::Lines(lines.clone()));
        assert_eq!(parse_inline(&markup), lines);
    }

    #[test]
    fn test_browser_block_markup() {
        let lines = parse_inline("one<div>two</div><div><br></div>");
        let texts: Vec<String> = lines.iter().map(Line::text).collect();
        assert_eq!(texts, vec!["one", "two", ""]);
    }

    #[test]
    fn test_trailing_br_opens_no_line() {
        let texts = |markup: &str| parse_inline(markup).iter().map(Line::text).collect::<Vec<_>>();
        assert_eq!(texts("a<br>"), vec!["a"]);
        assert_eq!(texts("a<br><br>"), vec!["a", ""]);
        assert_eq!(texts("a<br>b<br>"), vec!["a", "b"]);
        assert_eq!(texts("<br>"), vec![""]);
        assert_eq!(text_segments("ab<br>"), vec!["ab"]);

        let lines = vec![Line::plain("a"), Line::default()];
        let markup = render_inline(&TextBody::Lines(lines.clone()));
        assert_eq!(markup, "a<br><br>");
        assert_eq!(parse_inline(&markup), lines);
    }

    #[test]
    fn test_entities_and_nbsp() {
        let lines = parse_inline("a&nbsp;&lt;b&gt;&#65;&#x42;&bogus");
        assert_eq!(lines[0].text(), "a <b>AB&bogus");
    }

    #[test]
    fn test_segments_count_line_breaks() {
        let segments = text_segments("ab<strong>cd</strong><br>ef");
        assert_eq!(segments, vec!["ab", "cd", "\n", "ef"]);
    }

    #[test]
    fn test_unclosed_tags_are_tolerated() {
        let lines = parse_inline("<b>bold <i>both</b> plain");
        assert_eq!(lines[0].runs.len(), 3);
        assert!(lines[0].runs[1].bold && lines[0].runs[1].italic);
        assert!(!lines[0].runs[2].bold && !lines[0].runs[2].italic);
    }
}
