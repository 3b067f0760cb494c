//! # Document Nodes
//!
//! The document is a tree of three node kinds, tagged by `kind` in JSON:
//!
//! - **Container**: generic block holder (document root, lists, flex rows, table wrappers)
//! - **Text**: a leaf with inline content (paragraphs, headings, list items, media, cells)
//! - **Structural**: table plumbing (`table > thead|tbody > tr`)

use crate::attributes::{keys, Attributes};
use crate::inline::{InlineRun, Line, TextBody};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag of a text node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    P,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Li,
    Blockquote,
    Code,
    Img,
    Video,
    Th,
    Td,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::P => "p",
            ElementType::H1 => "h1",
            ElementType::H2 => "h2",
            ElementType::H3 => "h3",
            ElementType::H4 => "h4",
            ElementType::H5 => "h5",
            ElementType::H6 => "h6",
            ElementType::Li => "li",
            ElementType::Blockquote => "blockquote",
            ElementType::Code => "code",
            ElementType::Img => "img",
            ElementType::Video => "video",
            ElementType::Th => "th",
            ElementType::Td => "td",
        }
    }

    /// Media nodes carry a `src` instead of editable text
    pub fn is_media(&self) -> bool {
        matches!(self, ElementType::Img | ElementType::Video)
    }

    pub fn is_cell(&self) -> bool {
        matches!(self, ElementType::Th | ElementType::Td)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s {
            "p" => ElementType::P,
            "h1" => ElementType::H1,
            "h2" => ElementType::H2,
            "h3" => ElementType::H3,
            "h4" => ElementType::H4,
            "h5" => ElementType::H5,
            "h6" => ElementType::H6,
            "li" => ElementType::Li,
            "blockquote" => ElementType::Blockquote,
            "code" => ElementType::Code,
            "img" => ElementType::Img,
            "video" => ElementType::Video,
            "th" => ElementType::Th,
            "td" => ElementType::Td,
            other => return Err(format!("unknown element type: {}", other)),
        };
        Ok(ty)
    }
}

/// Tag of a structural (table family) node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructuralType {
    Table,
    Thead,
    Tbody,
    Tr,
}

impl StructuralType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructuralType::Table => "table",
            StructuralType::Thead => "thead",
            StructuralType::Tbody => "tbody",
            StructuralType::Tr => "tr",
        }
    }
}

/// List flavour of a list container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Ul,
    Ol,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::Ul => "ul",
            ListType::Ol => "ol",
        }
    }
}

/// Block holder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerNode {
    pub id: String,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl ContainerNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn is_flex(&self) -> bool {
        self.attributes.is_flex()
    }

    /// List flavour.
    ///
    /// The explicit `listType` attribute wins; a container whose children are
    /// all `li` nodes but carries no attribute reads as an unordered list.
    pub fn list_type(&self) -> Option<ListType> {
        match self.attributes.list_type() {
            Some("ol") => Some(ListType::Ol),
            Some("ul") => Some(ListType::Ul),
            Some(_) => None,
            None => {
                let all_items = !self.children.is_empty()
                    && self.children.iter().all(|c| {
                        matches!(c, Node::Text(t) if t.element_type == ElementType::Li)
                    });
                all_items.then_some(ListType::Ul)
            }
        }
    }

    /// True when this container wraps a table
    pub fn is_table_wrapper(&self) -> bool {
        matches!(
            self.children.first(),
            Some(Node::Structural(s)) if s.structural_type == StructuralType::Table
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTextNode {
    id: String,
    #[serde(rename = "type")]
    element_type: Option<ElementType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<InlineRun>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lines: Option<Vec<Line>>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    attributes: Attributes,
}

/// Leaf node with inline content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTextNode", into = "RawTextNode")]
pub struct TextNode {
    pub id: String,
    pub element_type: ElementType,
    pub body: TextBody,
    pub attributes: Attributes,
}

impl From<RawTextNode> for TextNode {
    fn from(raw: RawTextNode) -> Self {
        // lines > children > content
        let body = match (raw.lines, raw.children, raw.content) {
            (Some(lines), _, _) => TextBody::Lines(lines),
            (None, Some(runs), _) => TextBody::Runs(runs),
            (None, None, Some(content)) => TextBody::Plain(content),
            (None, None, None) => TextBody::default(),
        };

        TextNode {
            id: raw.id,
            element_type: raw.element_type.unwrap_or(ElementType::P),
            body,
            attributes: raw.attributes,
        }
    }
}

impl From<TextNode> for RawTextNode {
    fn from(node: TextNode) -> Self {
        let mut raw = RawTextNode {
            id: node.id,
            element_type: Some(node.element_type),
            attributes: node.attributes,
            ..Default::default()
        };
        match node.body {
            TextBody::Plain(content) => raw.content = Some(content),
            TextBody::Runs(runs) => raw.children = Some(runs),
            TextBody::Lines(lines) => raw.lines = Some(lines),
        }
        raw
    }
}

impl TextNode {
    pub fn new(id: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            id: id.into(),
            element_type,
            body: TextBody::default(),
            attributes: Attributes::new(),
        }
    }

    pub fn paragraph(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, ElementType::P).with_content(content)
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.body = TextBody::Plain(content.into());
        self
    }

    pub fn with_runs(mut self, runs: Vec<InlineRun>) -> Self {
        self.body = TextBody::Runs(runs);
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn logical_text(&self) -> String {
        self.body.logical_text()
    }

    pub fn char_len(&self) -> usize {
        self.body.char_len()
    }

    /// Media placeholder waiting for an upload
    pub fn is_placeholder(&self) -> bool {
        self.element_type.is_media()
            && (self.attributes.is_loading()
                || self.attributes.has_error()
                || self.attributes.flag(keys::UPLOAD_HANDLER_REQUIRED))
    }
}

/// Table plumbing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralNode {
    pub id: String,
    #[serde(rename = "type")]
    pub structural_type: StructuralType,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl StructuralNode {
    pub fn new(id: impl Into<String>, structural_type: StructuralType) -> Self {
        Self {
            id: id.into(),
            structural_type,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }
}

/// Any node of the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Container(ContainerNode),
    Text(TextNode),
    Structural(StructuralNode),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Container(c) => &c.id,
            Node::Text(t) => &t.id,
            Node::Structural(s) => &s.id,
        }
    }

    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Container(c) => Some(&c.children),
            Node::Structural(s) => Some(&s.children),
            Node::Text(_) => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Container(c) => Some(&mut c.children),
            Node::Structural(s) => Some(&mut s.children),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextNode> {
        match self {
            Node::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&ContainerNode> {
        match self {
            Node::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_flex(&self) -> bool {
        matches!(self, Node::Container(c) if c.is_flex())
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Node::Container(c) => Some(&c.attributes),
            Node::Text(t) => Some(&t.attributes),
            Node::Structural(_) => None,
        }
    }

    pub fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        match self {
            Node::Container(c) => Some(&mut c.attributes),
            Node::Text(t) => Some(&mut t.attributes),
            Node::Structural(_) => None,
        }
    }
}

impl From<TextNode> for Node {
    fn from(node: TextNode) -> Self {
        Node::Text(node)
    }
}

impl From<ContainerNode> for Node {
    fn from(node: ContainerNode) -> Self {
        Node::Container(node)
    }
}

impl From<StructuralNode> for Node {
    fn from(node: StructuralNode) -> Self {
        Node::Structural(node)
    }
}
