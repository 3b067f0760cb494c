//! # Inline Content
//!
//! Text node content comes in three mutually exclusive shapes, held by
//! [`TextBody`]. Every shape can be viewed as a list of [`Line`]s, each a list
//! of [`InlineRun`]s, which is the form the formatting algorithms work on.
//!
//! Offsets are character offsets into the *logical* text: the runs of a line
//! concatenated, with lines joined by a single `'\n'`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Byte index of the `char_idx`-th character (clamped to the string length)
pub fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// A contiguous span of identically-formatted text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineRun {
    pub content: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<BTreeMap<String, String>>,
}

impl InlineRun {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Compare the formatting tuple (everything except content)
    pub fn same_format(&self, other: &InlineRun) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.element_type_override == other.element_type_override
            && self.href == other.href
            && self.class_name == other.class_name
            && self.styles == other.styles
    }

    /// True when no formatting is applied
    pub fn is_plain(&self) -> bool {
        self.same_format(&InlineRun::default())
    }

    /// Split at a character offset, returning the tail with the same format
    pub fn split_off(&mut self, char_offset: usize) -> InlineRun {
        let at = byte_index(&self.content, char_offset);
        let tail = self.content.split_off(at);
        InlineRun {
            content: tail,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<InlineRun>>,
}

/// One logical line of a multi-line text node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLine", into = "RawLine")]
pub struct Line {
    pub runs: Vec<InlineRun>,
}

impl From<RawLine> for Line {
    fn from(raw: RawLine) -> Self {
        match (raw.children, raw.content) {
            (Some(runs), _) => Line { runs },
            (None, Some(content)) => Line::plain(content),
            (None, None) => Line::default(),
        }
    }
}

impl From<Line> for RawLine {
    fn from(line: Line) -> Self {
        if line.runs.iter().all(InlineRun::is_plain) && line.runs.len() <= 1 {
            RawLine {
                content: Some(line.text()),
                children: None,
            }
        } else {
            RawLine {
                content: None,
                children: Some(line.runs),
            }
        }
    }
}

impl Line {
    pub fn new(runs: Vec<InlineRun>) -> Self {
        Self { runs }
    }

    pub fn plain(content: impl Into<String>) -> Self {
        let content = content.into();
        if content.is_empty() {
            Self::default()
        } else {
            Self {
                runs: vec![InlineRun::plain(content)],
            }
        }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.content.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.runs.iter().map(InlineRun::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.char_len() == 0
    }

    /// Drop empty runs and merge adjacent runs with identical formatting
    pub fn normalize(&mut self) {
        let mut merged: Vec<InlineRun> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.content.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(prev) if prev.same_format(&run) => prev.content.push_str(&run.content),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }

    /// True when the merge invariant holds
    pub fn is_normalized(&self) -> bool {
        self.runs.iter().all(|r| !r.content.is_empty())
            && self.runs.windows(2).all(|w| !w[0].same_format(&w[1]))
    }

    /// Ensure a run boundary exists at `offset`, returning the index of the
    /// first run starting there
    pub fn boundary(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        for i in 0..self.runs.len() {
            let len = self.runs[i].char_len();
            if offset == pos {
                return i;
            }
            if offset < pos + len {
                let tail = self.runs[i].split_off(offset - pos);
                self.runs.insert(i + 1, tail);
                return i + 1;
            }
            pos += len;
        }
        self.runs.len()
    }

    /// Apply `f` to every run inside `[start, end)`, splitting runs at the edges
    pub fn map_range(&mut self, start: usize, end: usize, mut f: impl FnMut(&mut InlineRun)) {
        if start >= end {
            return;
        }
        let first = self.boundary(start);
        let last = self.boundary(end);
        for run in &mut self.runs[first..last] {
            f(run);
        }
    }

    /// Cut the line in two at `offset`
    pub fn split_at(mut self, offset: usize) -> (Line, Line) {
        let at = self.boundary(offset);
        let tail = self.runs.split_off(at);
        let mut head = self;
        let mut tail = Line { runs: tail };
        head.normalize();
        tail.normalize();
        (head, tail)
    }

    /// Append another line's runs onto this one
    pub fn append(&mut self, other: Line) {
        self.runs.extend(other.runs);
        self.normalize();
    }

    /// Runs overlapping `[start, end)`; a collapsed range picks the run left
    /// of the caret (or the first run at offset 0)
    pub fn runs_in_range(&self, start: usize, end: usize) -> Vec<&InlineRun> {
        let mut found = Vec::new();
        let mut pos = 0;
        for run in &self.runs {
            let len = run.char_len();
            let run_end = pos + len;
            if start == end {
                let hit = if start == 0 { pos == 0 && len > 0 } else { start > pos && start <= run_end };
                if hit {
                    found.push(run);
                    break;
                }
            } else if start < run_end && end > pos && len > 0 {
                found.push(run);
            }
            pos = run_end;
        }
        found
    }
}

/// Locate a logical offset as `(line index, offset within line)`
pub fn locate(lines: &[Line], offset: usize) -> (usize, usize) {
    let mut remaining = offset;
    for (i, line) in lines.iter().enumerate() {
        let len = line.char_len();
        if remaining <= len || i + 1 == lines.len() {
            return (i, remaining.min(len));
        }
        remaining -= len + 1;
    }
    (0, 0)
}

/// Visit each line's slice of the logical range `[start, end)`
pub fn for_each_line_range(
    lines: &mut [Line],
    start: usize,
    end: usize,
    mut f: impl FnMut(&mut Line, usize, usize),
) {
    let mut line_start = 0;
    for line in lines.iter_mut() {
        let len = line.char_len();
        let line_end = line_start + len;
        let s = start.max(line_start);
        let e = end.min(line_end);
        if s < e {
            f(line, s - line_start, e - line_start);
        }
        line_start = line_end + 1;
    }
}

/// The content of a text node
#[derive(Debug, Clone, PartialEq)]
pub enum TextBody {
    Plain(String),
    Runs(Vec<InlineRun>),
    Lines(Vec<Line>),
}

impl Default for TextBody {
    fn default() -> Self {
        TextBody::Plain(String::new())
    }
}

impl TextBody {
    /// Canonical body for a list of lines.
    ///
    /// A single unformatted line collapses to `Plain`, a single line to
    /// `Runs`; only multi-line content keeps `Lines`.
    pub fn from_lines(mut lines: Vec<Line>) -> TextBody {
        for line in &mut lines {
            line.normalize();
        }
        match lines.len() {
            0 => TextBody::Plain(String::new()),
            1 => {
                let line = lines.remove(0);
                if line.runs.len() <= 1 && line.runs.iter().all(InlineRun::is_plain) {
                    TextBody::Plain(line.text())
                } else {
                    TextBody::Runs(line.runs)
                }
            }
            _ => TextBody::Lines(lines),
        }
    }

    pub fn to_lines(&self) -> Vec<Line> {
        match self {
            TextBody::Plain(content) => vec![Line::plain(content.clone())],
            TextBody::Runs(runs) => vec![Line::new(runs.clone())],
            TextBody::Lines(lines) if lines.is_empty() => vec![Line::default()],
            TextBody::Lines(lines) => lines.clone(),
        }
    }

    pub fn logical_text(&self) -> String {
        match self {
            TextBody::Plain(content) => content.clone(),
            TextBody::Runs(runs) => runs.iter().map(|r| r.content.as_str()).collect(),
            TextBody::Lines(lines) => lines.iter().map(Line::text).collect::<Vec<_>>().join("\n"),
        }
    }

    pub fn char_len(&self) -> usize {
        self.logical_text().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.char_len() == 0
    }

    /// Cut logical text at `offset`
    pub fn split_at(&self, offset: usize) -> (TextBody, TextBody) {
        let mut lines = self.to_lines();
        let (li, lo) = locate(&lines, offset);
        let rest = lines.split_off(li + 1);
        let cut = lines.pop().unwrap_or_default();
        let (head, tail) = cut.split_at(lo);
        lines.push(head);
        let mut after = vec![tail];
        after.extend(rest);
        (TextBody::from_lines(lines), TextBody::from_lines(after))
    }

    /// Concatenate two bodies, joining the last line of `self` with the first
    /// line of `other`
    pub fn concat(&self, other: &TextBody) -> TextBody {
        let mut lines = self.to_lines();
        let mut incoming = other.to_lines().into_iter();
        if let (Some(last), Some(first)) = (lines.last_mut(), incoming.next()) {
            last.append(first);
        }
        lines.extend(incoming);
        TextBody::from_lines(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_merges_identical_neighbours() {
        let mut line = Line::new(vec![
            InlineRun::plain("he"),
            InlineRun::plain("llo"),
            InlineRun::plain(""),
            InlineRun::plain(" world").bold(),
            InlineRun::plain("!").bold(),
        ]);
        line.normalize();
        assert_eq!(line.runs.len(), 2);
        assert_eq!(line.runs[0].content, "hello");
        assert_eq!(line.runs[1].content, " world!");
        assert!(line.is_normalized());
    }

    #[test]
    fn test_boundary_splits_multibyte_runs() {
        let mut line = Line::plain("héllo");
        let idx = line.boundary(2);
        assert_eq!(idx, 1);
        assert_eq!(line.runs[0].content, "hé");
        assert_eq!(line.runs[1].content, "llo");
        assert_eq!(line.boundary(5), 2);
        assert_eq!(line.boundary(0), 0);
    }

    #[test]
    fn test_split_body_across_lines() {
        let body = TextBody::Lines(vec![Line::plain("one"), Line::plain("two")]);
        assert_eq!(body.logical_text(), "one\ntwo");

        let (head, tail) = body.split_at(5);
        assert_eq!(head.logical_text(), "one\nt");
        assert_eq!(tail.logical_text(), "wo");
    }

    #[test]
    fn test_concat_joins_edge_lines() {
        let a = TextBody::Runs(vec![InlineRun::plain("Hello ").bold()]);
        let b = TextBody::Plain("world".to_string());
        let joined = a.concat(&b);
        assert_eq!(joined.logical_text(), "Hello world");
        match joined {
            TextBody::Runs(runs) => {
                assert_eq!(runs.len(), 2);
                assert!(runs[0].bold);
                assert!(!runs[1].bold);
            }
            other => panic!("expected runs, got {:?}", other),
        }
    }

    #[test]
    fn test_runs_in_collapsed_range_prefers_left_run() {
        let line = Line::new(vec![InlineRun::plain("ab").bold(), InlineRun::plain("cd")]);
        let at_join = line.runs_in_range(2, 2);
        assert_eq!(at_join.len(), 1);
        assert!(at_join[0].bold);

        let at_start = line.runs_in_range(0, 0);
        assert!(at_start[0].bold);

        let spanning = line.runs_in_range(1, 3);
        assert_eq!(spanning.len(), 2);
    }

    #[test]
    fn test_line_json_prefers_children() {
        let line: Line =
            serde_json::from_str(r#"{"content":"ignored","children":[{"content":"kept","bold":true}]}"#)
                .unwrap();
        assert_eq!(line.text(), "kept");
        assert!(line.runs[0].bold);
    }
}
