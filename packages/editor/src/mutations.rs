//! # Document Actions
//!
//! Every edit to a document is an [`Action`], applied by a single reducer
//! entry point, [`reduce`], which turns one snapshot into the next.
//!
//! ## Semantics
//!
//! - Actions never mutate the input snapshot; the reducer edits a clone of
//!   the tree and wraps the result in a new [`Snapshot`].
//! - Missing ids and structurally invalid requests are no-ops. The internal
//!   [`MutationError`] is logged at `debug` and reported as `changed: false`.
//! - `Batch` is one transaction: if any inner action fails, none apply.
//! - Ids in the tree are unique. Actions that would introduce a duplicate
//!   are rejected.
//! - Tables keep their shape. Rows and cells cannot be removed, moved or
//!   merged away, nothing is inserted under a structural node, and a split
//!   inside a cell becomes a line break in that cell.

use crate::formatting;
use crate::layout;
use crate::post_effects::PostEffectEngine;
use folio_document::{
    build_table, tree, AttrValue, Attributes, ContainerNode, ElementType, IdGenerator, Line, ListType, Node,
    RunAttribute, SelectionRange, Snapshot, TableContent, TextBody, TextNode,
};
use folio_document::{Format, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Where an inserted node goes relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Before,
    After,
    /// Last child of the anchor (or of the root when there is no anchor)
    Append,
}

/// Where a moved node goes relative to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovePosition {
    Before,
    After,
    Left,
    Right,
}

/// Semantic edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    Insert {
        node: Node,
        #[serde(default)]
        anchor_id: Option<String>,
        position: InsertPosition,
    },

    Delete {
        node_id: String,
    },

    /// Cut a text node in two at a logical offset
    Split {
        node_id: String,
        offset: usize,
    },

    /// Append `node_id`'s content to `into_id` and remove `node_id`
    Merge {
        node_id: String,
        into_id: String,
    },

    ConvertType {
        node_id: String,
        new_type: ElementType,
    },

    ToggleFormat {
        selection: SelectionRange,
        format: Format,
    },

    ApplyRunAttribute {
        selection: SelectionRange,
        attribute: RunAttribute,
    },

    CreateList {
        node_id: String,
        list_type: ListType,
    },

    CreateTable {
        rows: usize,
        cols: usize,
        #[serde(default)]
        anchor_id: Option<String>,
        position: InsertPosition,
    },

    GroupIntoFlex {
        node_ids: Vec<String>,
    },

    ExtractFromFlex {
        node_ids: Vec<String>,
        flex_id: String,
    },

    ReverseInFlex {
        node_ids: Vec<String>,
        flex_id: String,
    },

    Move {
        node_id: String,
        target_id: String,
        position: MovePosition,
    },

    /// Replace a text node's content with lines read back from the surface
    UpdateContent {
        node_id: String,
        lines: Vec<Line>,
    },

    UpdateAttributes {
        node_id: String,
        #[serde(default)]
        set: BTreeMap<String, AttrValue>,
        #[serde(default)]
        remove: Vec<String>,
    },

    ReplaceNode {
        node_id: String,
        node: Node,
    },

    Batch {
        actions: Vec<Action>,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Node is not text: {0}")]
    NotText(String),

    #[error("Node is not a flex container: {0}")]
    NotFlex(String),

    #[error("Table structure cannot change at: {0}")]
    TableStructure(String),
}

/// Where the caret should go after an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Focus {
    pub node_id: String,
    pub offset: usize,
}

impl Focus {
    pub fn new(node_id: impl Into<String>, offset: usize) -> Self {
        Self {
            node_id: node_id.into(),
            offset,
        }
    }
}

/// Result of reducing one action
#[derive(Debug, Clone)]
pub struct Applied {
    pub snapshot: Snapshot,
    pub focus: Option<Focus>,
    pub changed: bool,
}

pub type MutationResult = Result<Option<Focus>, MutationError>;

/// Apply `action` to `snapshot`, producing the next snapshot.
///
/// `ids` only advances when the action takes effect.
pub fn reduce(snapshot: &Snapshot, action: &Action, ids: &mut IdGenerator, effects: &PostEffectEngine) -> Applied {
    let mut root = snapshot.to_root();
    let mut scratch_ids = ids.clone();

    let focus = match effects.apply_with_effects(action, &mut root, &mut scratch_ids) {
        Ok(focus) => focus,
        Err(err) => {
            tracing::debug!(action = action.name(), error = %err, "action ignored");
            return Applied {
                snapshot: snapshot.clone(),
                focus: None,
                changed: false,
            };
        }
    };

    if &root == snapshot.root() {
        tracing::debug!(action = action.name(), "action left the document unchanged");
        return Applied {
            snapshot: snapshot.clone(),
            focus,
            changed: false,
        };
    }

    *ids = scratch_ids;
    let focus = focus.and_then(|f| repair_focus(&root, f));
    Applied {
        snapshot: Snapshot::from_edited(root),
        focus,
        changed: true,
    }
}

/// Post-effects may remove the node an action wanted to focus, and a
/// container focus resolves to its first text node
fn repair_focus(root: &Node, focus: Focus) -> Option<Focus> {
    match tree::find(root, &focus.node_id) {
        Some(Node::Text(_)) => Some(focus),
        Some(node) => first_text(node)
            .or_else(|| first_text(root))
            .map(|t| Focus::new(t.id.clone(), 0)),
        None => first_text(root).map(|t| Focus::new(t.id.clone(), 0)),
    }
}

impl Action {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::Insert { .. } => "insert",
            Action::Delete { .. } => "delete",
            Action::Split { .. } => "split",
            Action::Merge { .. } => "merge",
            Action::ConvertType { .. } => "convertType",
            Action::ToggleFormat { .. } => "toggleFormat",
            Action::ApplyRunAttribute { .. } => "applyRunAttribute",
            Action::CreateList { .. } => "createList",
            Action::CreateTable { .. } => "createTable",
            Action::GroupIntoFlex { .. } => "groupIntoFlex",
            Action::ExtractFromFlex { .. } => "extractFromFlex",
            Action::ReverseInFlex { .. } => "reverseInFlex",
            Action::Move { .. } => "move",
            Action::UpdateContent { .. } => "updateContent",
            Action::UpdateAttributes { .. } => "updateAttributes",
            Action::ReplaceNode { .. } => "replaceNode",
            Action::Batch { .. } => "batch",
        }
    }

    /// Apply this action to a tree in place (without post-effects)
    pub fn apply(&self, root: &mut Node, ids: &mut IdGenerator) -> MutationResult {
        match self {
            Action::Insert { node, anchor_id, position } => {
                Self::apply_insert(root, node.clone(), anchor_id.as_deref(), *position)
            }

            Action::Delete { node_id } => Self::apply_delete(root, node_id),

            Action::Split { node_id, offset } => Self::apply_split(root, ids, node_id, *offset),

            Action::Merge { node_id, into_id } => Self::apply_merge(root, node_id, into_id),

            Action::ConvertType { node_id, new_type } => {
                let text = text_mut(root, node_id)?;
                if text.element_type.is_cell() != new_type.is_cell() {
                    return Err(MutationError::TableStructure(node_id.clone()));
                }
                text.element_type = *new_type;
                Ok(None)
            }

            Action::ToggleFormat { selection, format } => {
                formatting::toggle_format(text_mut(root, &selection.node_id)?, selection, *format)
            }

            Action::ApplyRunAttribute { selection, attribute } => {
                formatting::apply_run_attribute(text_mut(root, &selection.node_id)?, selection, attribute)
            }

            Action::CreateList { node_id, list_type } => layout::create_list(root, ids, node_id, *list_type),

            Action::CreateTable { rows, cols, anchor_id, position } => {
                Self::apply_create_table(root, ids, *rows, *cols, anchor_id.as_deref(), *position)
            }

            Action::GroupIntoFlex { node_ids } => layout::group_into_flex(root, ids, node_ids),

            Action::ExtractFromFlex { node_ids, flex_id } => layout::extract_from_flex(root, node_ids, flex_id),

            Action::ReverseInFlex { node_ids, flex_id } => layout::reverse_in_flex(root, node_ids, flex_id),

            Action::Move { node_id, target_id, position } => layout::move_node(root, node_id, target_id, *position),

            Action::UpdateContent { node_id, lines } => {
                let text = text_mut(root, node_id)?;
                text.body = TextBody::from_lines(lines.clone());
                Ok(None)
            }

            Action::UpdateAttributes { node_id, set, remove } => {
                let attributes = tree::find_mut(root, node_id)
                    .ok_or_else(|| MutationError::NodeNotFound(node_id.clone()))?
                    .attributes_mut()
                    .ok_or_else(|| MutationError::InvalidStructure(format!("'{}' has no attributes", node_id)))?;
                for (key, value) in set {
                    attributes.set(key.clone(), value.clone());
                }
                for key in remove {
                    attributes.remove(key);
                }
                Ok(None)
            }

            Action::ReplaceNode { node_id, node } => Self::apply_replace(root, node_id, node.clone()),

            Action::Batch { actions } => {
                let mut focus = None;
                for action in actions {
                    if let Some(f) = action.apply(root, ids)? {
                        focus = Some(f);
                    }
                }
                Ok(focus)
            }
        }
    }

    fn apply_insert(root: &mut Node, node: Node, anchor_id: Option<&str>, position: InsertPosition) -> MutationResult {
        ensure_fresh_ids(root, &node, None)?;
        let focus = first_text(&node).map(|t| Focus::new(t.id.clone(), 0));
        insert_relative(root, node, anchor_id, position)?;
        Ok(focus)
    }

    fn apply_delete(root: &mut Node, node_id: &str) -> MutationResult {
        let (parent_id, index) = tree::location(root, node_id)
            .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;
        ensure_detachable(root, node_id)?;

        let focus = {
            let siblings = tree::find(root, &parent_id)
                .and_then(Node::children)
                .ok_or_else(|| MutationError::ParentNotFound(parent_id.clone()))?;
            let previous = index.checked_sub(1).and_then(|i| siblings.get(i));
            let next = siblings.get(index + 1);

            previous
                .and_then(last_text)
                .map(|t| Focus::new(t.id.clone(), t.char_len()))
                .or_else(|| next.and_then(first_text).map(|t| Focus::new(t.id.clone(), 0)))
                .unwrap_or_else(|| Focus::new(parent_id.clone(), 0))
        };

        tree::detach(root, node_id);
        Ok(Some(focus))
    }

    fn apply_split(root: &mut Node, ids: &mut IdGenerator, node_id: &str, offset: usize) -> MutationResult {
        let (parent_id, index) = tree::location(root, node_id)
            .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;

        let text = text_mut(root, node_id)?;
        if text.element_type.is_media() {
            return Err(MutationError::InvalidStructure(format!("cannot split media node '{}'", node_id)));
        }

        let offset = offset.min(text.char_len());
        let (head, tail) = text.body.split_at(offset);

        if text.element_type.is_cell() {
            let mut lines = head.to_lines();
            lines.extend(tail.to_lines());
            text.body = TextBody::from_lines(lines);
            return Ok(Some(Focus::new(node_id, offset + 1)));
        }
        text.body = head;

        let second = TextNode {
            id: ids.new_id(),
            element_type: text.element_type,
            body: tail,
            attributes: text.attributes.clone(),
        };
        let focus = Focus::new(second.id.clone(), 0);

        tree::insert_child(root, &parent_id, index + 1, second.into())
            .map_err(|_| MutationError::ParentNotFound(parent_id))?;
        Ok(Some(focus))
    }

    fn apply_merge(root: &mut Node, node_id: &str, into_id: &str) -> MutationResult {
        if node_id == into_id {
            return Err(MutationError::InvalidStructure("cannot merge a node into itself".to_string()));
        }
        ensure_detachable(root, node_id)?;

        let source = tree::find(root, node_id)
            .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?
            .as_text()
            .ok_or_else(|| MutationError::NotText(node_id.to_string()))?
            .body
            .clone();

        let target = text_mut(root, into_id)?;
        if target.element_type.is_media() {
            return Err(MutationError::InvalidStructure(format!("cannot merge into media node '{}'", into_id)));
        }
        let join = target.char_len();
        target.body = target.body.concat(&source);

        tree::detach(root, node_id);
        Ok(Some(Focus::new(into_id, join)))
    }

    fn apply_create_table(
        root: &mut Node,
        ids: &mut IdGenerator,
        rows: usize,
        cols: usize,
        anchor_id: Option<&str>,
        position: InsertPosition,
    ) -> MutationResult {
        if cols == 0 {
            return Err(MutationError::InvalidStructure("a table needs at least one column".to_string()));
        }
        let table = build_table(&TableContent::empty(rows, cols), ids);
        let focus = first_text(&table).map(|t| Focus::new(t.id.clone(), 0));
        insert_relative(root, table, anchor_id, position)?;
        Ok(focus)
    }

    fn apply_replace(root: &mut Node, node_id: &str, node: Node) -> MutationResult {
        let (parent_id, index) = tree::location(root, node_id)
            .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;

        if let Some((Node::Structural(_), _)) = tree::parent_of(root, node_id) {
            let is_cell = |n: Option<&Node>| n.and_then(Node::as_text).map_or(false, |t| t.element_type.is_cell());
            if !(is_cell(tree::find(root, node_id)) && is_cell(Some(&node))) {
                return Err(MutationError::TableStructure(node_id.to_string()));
            }
        }

        let replaced = tree::find(root, node_id)
            .map(tree::ids)
            .unwrap_or_default()
            .into_iter()
            .collect::<HashSet<_>>();
        ensure_fresh_ids(root, &node, Some(&replaced))?;

        let focus = first_text(&node).map(|t| Focus::new(t.id.clone(), 0));
        tree::detach(root, node_id);
        tree::insert_child(root, &parent_id, index, node).map_err(|_| MutationError::ParentNotFound(parent_id))?;
        Ok(focus)
    }
}

/// Insert `node` relative to an anchor, or append it to the root
pub(crate) fn insert_relative(
    root: &mut Node,
    node: Node,
    anchor_id: Option<&str>,
    position: InsertPosition,
) -> Result<(), MutationError> {
    let (parent_id, index) = match (anchor_id, position) {
        (None, InsertPosition::Append) => {
            let len = root.children().map(Vec::len).unwrap_or(0);
            (root.id().to_string(), len)
        }
        (None, _) => {
            return Err(MutationError::InvalidStructure(
                "before/after insertion needs an anchor".to_string(),
            ))
        }
        (Some(anchor), InsertPosition::Append) => {
            let len = tree::find(root, anchor)
                .ok_or_else(|| MutationError::NodeNotFound(anchor.to_string()))?
                .children()
                .map(Vec::len)
                .ok_or_else(|| MutationError::InvalidStructure(format!("'{}' cannot hold children", anchor)))?;
            (anchor.to_string(), len)
        }
        (Some(anchor), position) => {
            let (parent_id, index) =
                tree::location(root, anchor).ok_or_else(|| MutationError::NodeNotFound(anchor.to_string()))?;
            let index = if position == InsertPosition::After { index + 1 } else { index };
            (parent_id, index)
        }
    };

    ensure_open_parent(root, &parent_id)?;
    tree::insert_child(root, &parent_id, index, node).map_err(|_| MutationError::ParentNotFound(parent_id))
}

/// Table plumbing and cells only leave together with their table wrapper
pub(crate) fn ensure_detachable(root: &Node, node_id: &str) -> Result<(), MutationError> {
    match tree::parent_of(root, node_id) {
        Some((Node::Structural(_), _)) => Err(MutationError::TableStructure(node_id.to_string())),
        Some((parent, index)) => match parent.children().and_then(|c| c.get(index)) {
            Some(Node::Structural(_)) => Err(MutationError::TableStructure(node_id.to_string())),
            _ => Ok(()),
        },
        None => Err(MutationError::NodeNotFound(node_id.to_string())),
    }
}

/// Nothing new lands directly under a structural node
pub(crate) fn ensure_open_parent(root: &Node, parent_id: &str) -> Result<(), MutationError> {
    match tree::find(root, parent_id) {
        Some(Node::Structural(_)) => Err(MutationError::TableStructure(parent_id.to_string())),
        Some(_) => Ok(()),
        None => Err(MutationError::ParentNotFound(parent_id.to_string())),
    }
}

/// Reject `node` if any id in it already exists in `root` (ignoring `except`)
/// or repeats inside `node` itself
fn ensure_fresh_ids(root: &Node, node: &Node, except: Option<&HashSet<String>>) -> Result<(), MutationError> {
    if let Some(dup) = tree::duplicate_id(node) {
        return Err(MutationError::DuplicateId(dup));
    }
    let existing: HashSet<String> = tree::ids(root)
        .into_iter()
        .filter(|id| except.map_or(true, |skip| !skip.contains(id)))
        .collect();
    match tree::ids(node).into_iter().find(|id| existing.contains(id)) {
        Some(dup) => Err(MutationError::DuplicateId(dup)),
        None => Ok(()),
    }
}

pub(crate) fn text_mut<'a>(root: &'a mut Node, id: &str) -> Result<&'a mut TextNode, MutationError> {
    tree::find_mut(root, id)
        .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?
        .as_text_mut()
        .ok_or_else(|| MutationError::NotText(id.to_string()))
}

/// Collects text nodes in document order
#[derive(Default)]
pub(crate) struct TextCollector<'a> {
    pub texts: Vec<&'a TextNode>,
}

impl<'a> TextCollector<'a> {
    pub fn collect(node: &'a Node) -> Vec<&'a TextNode> {
        let mut collector = TextCollector::default();
        collector.gather(node);
        collector.texts
    }

    fn gather(&mut self, node: &'a Node) {
        match node {
            Node::Text(text) => self.texts.push(text),
            other => {
                for child in other.children().into_iter().flatten() {
                    self.gather(child);
                }
            }
        }
    }
}

pub(crate) fn first_text(node: &Node) -> Option<&TextNode> {
    TextCollector::collect(node).into_iter().next()
}

pub(crate) fn last_text(node: &Node) -> Option<&TextNode> {
    TextCollector::collect(node).into_iter().last()
}

/// Counts nodes by kind; used in logs after structural edits
#[derive(Debug, Default)]
pub(crate) struct ShapeCounter {
    pub containers: usize,
    pub texts: usize,
    pub structurals: usize,
}

impl Visitor for ShapeCounter {
    fn visit_container(&mut self, container: &ContainerNode) {
        self.containers += 1;
        folio_document::visitor::walk_children(self, &container.children);
    }

    fn visit_text(&mut self, _text: &TextNode) {
        self.texts += 1;
    }

    fn visit_structural(&mut self, structural: &folio_document::StructuralNode) {
        self.structurals += 1;
        folio_document::visitor::walk_children(self, &structural.children);
    }
}

/// Attributes marking a container as a list of `list_type`
pub(crate) fn list_attributes(list_type: ListType) -> Attributes {
    Attributes::new().with(folio_document::keys::LIST_TYPE, list_type.as_str())
}
