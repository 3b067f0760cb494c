use crate::inline::InlineRun;
use crate::node::ElementType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A character range inside one text node's logical text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRange {
    pub node_id: String,
    pub start: usize,
    pub end: usize,
}

impl SelectionRange {
    pub fn new(node_id: impl Into<String>, start: usize, end: usize) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Self {
            node_id: node_id.into(),
            start,
            end,
        }
    }

    pub fn caret(node_id: impl Into<String>, offset: usize) -> Self {
        Self::new(node_id, offset, offset)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Boolean run formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Bold,
    Italic,
    Underline,
}

impl Format {
    pub fn get(&self, run: &InlineRun) -> bool {
        match self {
            Format::Bold => run.bold,
            Format::Italic => run.italic,
            Format::Underline => run.underline,
        }
    }

    pub fn flip(&self, run: &mut InlineRun) {
        match self {
            Format::Bold => run.bold = !run.bold,
            Format::Italic => run.italic = !run.italic,
            Format::Underline => run.underline = !run.underline,
        }
    }
}

/// Valued run attributes; `None` clears the attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum RunAttribute {
    Href(Option<String>),
    ClassName(Option<String>),
    Styles(Option<BTreeMap<String, String>>),
}

impl RunAttribute {
    pub fn apply(&self, run: &mut InlineRun) {
        match self {
            RunAttribute::Href(v) => run.href = v.clone(),
            RunAttribute::ClassName(v) => run.class_name = v.clone(),
            RunAttribute::Styles(v) => run.styles = v.clone(),
        }
    }
}

/// Boolean formats active over a selection; mixed values read as `false`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formats {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// What the toolbar needs to know about the current selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionInfo {
    pub node_id: String,
    pub start: usize,
    pub end: usize,
    pub formats: Formats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<BTreeMap<String, String>>,
}
