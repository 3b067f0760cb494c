//! # Editable Surfaces
//!
//! [`Surface`] is the boundary between the editor and whatever actually
//! displays the document (a browser DOM, a terminal view, a test double).
//! The editor only ever talks to mounted text nodes by id: it reads and
//! replaces their inner markup, inspects the native selection and asks for
//! focus.

use crate::selection::NativeRange;
use std::collections::BTreeMap;

pub trait Surface {
    /// True when the element for `node_id` exists on the surface
    fn is_mounted(&self, node_id: &str) -> bool;

    /// Inner markup of a mounted node
    fn markup(&self, node_id: &str) -> Option<String>;

    /// Replace the inner markup of a mounted node
    fn set_markup(&mut self, node_id: &str, markup: &str);

    /// Rendered text segments of a node, in document order
    fn text_segments(&self, node_id: &str) -> Vec<String> {
        self.markup(node_id)
            .map(|markup| folio_compiler_html::text_segments(&markup))
            .unwrap_or_default()
    }

    /// The node holding the native selection, and the selection within it
    fn selection(&self) -> Option<(String, NativeRange)>;

    fn set_selection(&mut self, node_id: &str, range: NativeRange);

    /// The node that currently has keyboard focus
    fn focused_node(&self) -> Option<String>;

    /// Move keyboard focus to a node; false when it is not mounted yet
    fn focus(&mut self, node_id: &str) -> bool;
}

/// Surface kept entirely in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    nodes: BTreeMap<String, String>,
    selection: Option<(String, NativeRange)>,
    focused: Option<String>,
    writes: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a node with initial markup
    pub fn mount(&mut self, node_id: impl Into<String>, markup: impl Into<String>) {
        self.nodes.insert(node_id.into(), markup.into());
    }

    pub fn unmount(&mut self, node_id: &str) {
        self.nodes.remove(node_id);
        if self.focused.as_deref() == Some(node_id) {
            self.focused = None;
            self.selection = None;
        }
    }

    pub fn mounted_ids(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }

    /// Simulate the user typing: markup changes without a write from the editor
    pub fn type_markup(&mut self, node_id: &str, markup: impl Into<String>) {
        if let Some(slot) = self.nodes.get_mut(node_id) {
            *slot = markup.into();
        }
    }

    /// Number of `set_markup` calls made by the editor
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl Surface for MemorySurface {
    fn is_mounted(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    fn markup(&self, node_id: &str) -> Option<String> {
        self.nodes.get(node_id).cloned()
    }

    fn set_markup(&mut self, node_id: &str, markup: &str) {
        if let Some(slot) = self.nodes.get_mut(node_id) {
            *slot = markup.to_string();
            self.writes += 1;
        }
    }

    fn selection(&self) -> Option<(String, NativeRange)> {
        self.selection.clone()
    }

    fn set_selection(&mut self, node_id: &str, range: NativeRange) {
        if self.is_mounted(node_id) {
            self.selection = Some((node_id.to_string(), range));
        }
    }

    fn focused_node(&self) -> Option<String> {
        self.focused.clone()
    }

    fn focus(&mut self, node_id: &str) -> bool {
        if !self.is_mounted(node_id) {
            return false;
        }
        self.focused = Some(node_id.to_string());
        true
    }
}
