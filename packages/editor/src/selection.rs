//! # Selection Tracking
//!
//! A surface reports the caret as a point inside one of its rendered text
//! segments. The editor stores it as character offsets into the node's
//! logical text instead, so a selection survives the surface replacing the
//! node's markup as long as the text length is unchanged.
//!
//! ```text
//! segments:  "ab" | "cd" | "\n" | "ef"
//! point:            (1, 1)
//! offset:            3
//! ```

use folio_document::{Formats, InlineRun, SelectionInfo, TextNode};
use serde::{Deserialize, Serialize};

/// A position inside the `segment`-th rendered text segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomPoint {
    pub segment: usize,
    pub offset: usize,
}

impl DomPoint {
    pub fn new(segment: usize, offset: usize) -> Self {
        Self { segment, offset }
    }
}

/// A selection as the surface reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeRange {
    pub start: DomPoint,
    pub end: DomPoint,
}

impl NativeRange {
    pub fn collapsed(point: DomPoint) -> Self {
        Self { start: point, end: point }
    }
}

/// A selection as logical character offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSelection {
    pub start: usize,
    pub end: usize,
    pub collapsed: bool,
}

impl SavedSelection {
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
            collapsed: true,
        }
    }
}

fn char_len(segment: &str) -> usize {
    segment.chars().count()
}

fn point_offset(segments: &[String], point: DomPoint) -> Option<usize> {
    if segments.is_empty() {
        return (point.segment == 0).then_some(0);
    }
    let segment = segments.get(point.segment)?;
    let before: usize = segments[..point.segment].iter().map(|s| char_len(s)).sum();
    Some(before + point.offset.min(char_len(segment)))
}

fn offset_point(segments: &[String], offset: usize) -> DomPoint {
    let mut remaining = offset;
    for (i, segment) in segments.iter().enumerate() {
        let len = char_len(segment);
        if remaining <= len {
            return DomPoint::new(i, remaining);
        }
        remaining -= len;
    }
    match segments.len() {
        0 => DomPoint::new(0, 0),
        n => DomPoint::new(n - 1, char_len(&segments[n - 1])),
    }
}

/// Convert a surface selection to logical offsets.
///
/// Returns `None` when a point names a segment that does not exist.
pub fn save(segments: &[String], native: &NativeRange) -> Option<SavedSelection> {
    let a = point_offset(segments, native.start)?;
    let b = point_offset(segments, native.end)?;
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    Some(SavedSelection {
        start,
        end,
        collapsed: start == end,
    })
}

/// Convert logical offsets back to a surface selection; offsets past the
/// end clamp to the last segment
pub fn restore(segments: &[String], saved: &SavedSelection) -> NativeRange {
    let start = offset_point(segments, saved.start);
    if saved.collapsed {
        return NativeRange::collapsed(start);
    }
    NativeRange {
        start,
        end: offset_point(segments, saved.end),
    }
}

/// Runs of `text` covered by `[start, end)`; a collapsed range yields the
/// run left of the caret
fn covered_runs(text: &TextNode, start: usize, end: usize) -> Vec<InlineRun> {
    let lines = text.body.to_lines();

    if start == end {
        let (li, lo) = folio_document::inline::locate(&lines, start);
        return lines[li].runs_in_range(lo, lo).into_iter().cloned().collect();
    }

    let mut runs = Vec::new();
    let mut line_start = 0;
    for line in &lines {
        let line_end = line_start + line.char_len();
        let (s, e) = (start.max(line_start), end.min(line_end));
        if s < e {
            runs.extend(line.runs_in_range(s - line_start, e - line_start).into_iter().cloned());
        }
        line_start = line_end + 1;
    }
    runs
}

/// The shared value of `field` across runs, `None` when they differ
fn common<T: PartialEq + Clone>(runs: &[InlineRun], field: impl Fn(&InlineRun) -> &Option<T>) -> Option<T> {
    let first = field(runs.first()?).clone()?;
    runs.iter().all(|r| field(r).as_ref() == Some(&first)).then_some(first)
}

/// What the toolbar shows for a selection inside `text`
pub fn selection_info(text: &TextNode, start: usize, end: usize) -> SelectionInfo {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    let runs = covered_runs(text, start, end);
    let all = |f: fn(&InlineRun) -> bool| !runs.is_empty() && runs.iter().all(f);

    SelectionInfo {
        node_id: text.id.clone(),
        start,
        end,
        formats: Formats {
            bold: all(|r| r.bold),
            italic: all(|r| r.italic),
            underline: all(|r| r.underline),
        },
        element_type: Some(text.element_type),
        href: common(&runs, |r| &r.href),
        class_name: common(&runs, |r| &r.class_name),
        styles: common(&runs, |r| &r.styles),
    }
}
