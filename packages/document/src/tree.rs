//! Lookup and structural edits on a node tree, addressed by node id.

use crate::node::Node;
use crate::visitor::{IdCollector, Visitor};
use std::collections::HashSet;

/// Find a node by id
pub fn find<'a>(root: &'a Node, id: &str) -> Option<&'a Node> {
    if root.id() == id {
        return Some(root);
    }
    root.children()?.iter().find_map(|child| find(child, id))
}

/// Find a node by id (mutable)
pub fn find_mut<'a>(root: &'a mut Node, id: &str) -> Option<&'a mut Node> {
    if root.id() == id {
        return Some(root);
    }
    root.children_mut()?
        .iter_mut()
        .find_map(|child| find_mut(child, id))
}

/// Parent of `id` and the child's index within it
pub fn parent_of<'a>(root: &'a Node, id: &str) -> Option<(&'a Node, usize)> {
    let children = root.children()?;
    if let Some(index) = children.iter().position(|c| c.id() == id) {
        return Some((root, index));
    }
    children.iter().find_map(|child| parent_of(child, id))
}

/// Parent id of `id` and the child's index within it
pub fn location(root: &Node, id: &str) -> Option<(String, usize)> {
    parent_of(root, id).map(|(parent, index)| (parent.id().to_string(), index))
}

/// Index path from the root to `id`
pub fn path_to(root: &Node, id: &str) -> Option<Vec<usize>> {
    if root.id() == id {
        return Some(Vec::new());
    }
    for (i, child) in root.children()?.iter().enumerate() {
        if let Some(mut rest) = path_to(child, id) {
            rest.insert(0, i);
            return Some(rest);
        }
    }
    None
}

/// True if `id` is `node` itself or inside its subtree
pub fn contains(node: &Node, id: &str) -> bool {
    find(node, id).is_some()
}

/// Remove a node from its parent and return it (the root cannot be detached)
pub fn detach(root: &mut Node, id: &str) -> Option<Node> {
    let children = root.children_mut()?;
    if let Some(pos) = children.iter().position(|c| c.id() == id) {
        return Some(children.remove(pos));
    }
    children.iter_mut().find_map(|child| detach(child, id))
}

/// Insert `node` as a child of `parent_id` at `index` (clamped).
///
/// Gives the node back when the parent is missing or cannot hold children.
pub fn insert_child(root: &mut Node, parent_id: &str, index: usize, node: Node) -> Result<(), Node> {
    match find_mut(root, parent_id).and_then(Node::children_mut) {
        Some(children) => {
            let index = index.min(children.len());
            children.insert(index, node);
            Ok(())
        }
        None => Err(node),
    }
}

/// All ids in document order
pub fn ids(root: &Node) -> Vec<String> {
    let mut collector = IdCollector::default();
    collector.visit_node(root);
    collector.ids
}

/// Number of nodes in the tree, root included
pub fn count(root: &Node) -> usize {
    1 + root
        .children()
        .map(|children| children.iter().map(count).sum())
        .unwrap_or(0)
}

/// First id that occurs more than once, if any
pub fn duplicate_id(root: &Node) -> Option<String> {
    let mut seen = HashSet::new();
    ids(root).into_iter().find(|id| !seen.insert(id.clone()))
}
