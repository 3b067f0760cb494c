//! Structural rearrangement: lists, flex groups and moves.
//!
//! A flex group is a container with `layoutType: "flex"` laying its children
//! out side by side. `left`/`right` positions only make sense against a flex
//! group or one of its children; `before`/`after` against a flex child
//! address the group as a whole.

use crate::mutations::{
    ensure_detachable, ensure_open_parent, list_attributes, text_mut, Focus, MovePosition, MutationError, MutationResult,
    ShapeCounter,
};
use folio_document::{keys, tree, Attributes, ContainerNode, ElementType, IdGenerator, ListType, Node, Visitor};

fn log_shape(action: &str, root: &Node) {
    let mut shape = ShapeCounter::default();
    shape.visit_node(root);
    tracing::debug!(
        action,
        containers = shape.containers,
        texts = shape.texts,
        structurals = shape.structurals,
        "layout changed"
    );
}

/// Wrap a text node in a new list container, or switch the flavour of the
/// list it already sits in
pub fn create_list(root: &mut Node, ids: &mut IdGenerator, node_id: &str, list_type: ListType) -> MutationResult {
    let (parent_id, index) =
        tree::location(root, node_id).ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;

    let text = text_mut(root, node_id)?;
    if text.element_type.is_media() || text.element_type.is_cell() {
        return Err(MutationError::InvalidStructure(format!(
            "cannot make a list from '{}'",
            text.element_type
        )));
    }
    let offset = text.char_len();

    let already_item = text.element_type == ElementType::Li;
    if already_item {
        let parent = tree::find_mut(root, &parent_id)
            .ok_or_else(|| MutationError::ParentNotFound(parent_id.clone()))?;
        if let Node::Container(list) = parent {
            if list.list_type().is_some() {
                list.attributes.set(keys::LIST_TYPE, list_type.as_str());
                return Ok(Some(Focus::new(node_id, offset)));
            }
        }
    }

    let mut item = tree::detach(root, node_id).ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;
    if let Some(text) = item.as_text_mut() {
        text.element_type = ElementType::Li;
    }

    let list = ContainerNode::new(ids.new_id())
        .with_attributes(list_attributes(list_type))
        .with_children(vec![item]);
    tree::insert_child(root, &parent_id, index, list.into()).map_err(|_| MutationError::ParentNotFound(parent_id))?;

    Ok(Some(Focus::new(node_id, offset)))
}

/// Ids in document order, rejecting unknown ids, the root, table parts,
/// repeats and nodes nested inside another listed node
fn document_order(root: &Node, node_ids: &[String]) -> Result<Vec<String>, MutationError> {
    if node_ids.is_empty() {
        return Err(MutationError::InvalidStructure("no nodes given".to_string()));
    }
    for id in node_ids {
        if id == root.id() {
            return Err(MutationError::InvalidStructure("the root cannot be regrouped".to_string()));
        }
        if !tree::contains(root, id) {
            return Err(MutationError::NodeNotFound(id.clone()));
        }
        ensure_detachable(root, id)?;
    }

    let ordered: Vec<String> = tree::ids(root).into_iter().filter(|id| node_ids.contains(id)).collect();
    if ordered.len() != node_ids.len() {
        return Err(MutationError::InvalidStructure("node ids repeat".to_string()));
    }
    for outer in &ordered {
        let subtree = tree::find(root, outer).ok_or_else(|| MutationError::NodeNotFound(outer.clone()))?;
        if ordered.iter().any(|inner| inner != outer && tree::contains(subtree, inner)) {
            return Err(MutationError::CycleDetected);
        }
    }
    Ok(ordered)
}

/// Wrap nodes, in document order, in a new flex container placed where the
/// first of them was
pub fn group_into_flex(root: &mut Node, ids: &mut IdGenerator, node_ids: &[String]) -> MutationResult {
    let ordered = document_order(root, node_ids)?;
    let (parent_id, index) =
        tree::location(root, &ordered[0]).ok_or_else(|| MutationError::NodeNotFound(ordered[0].clone()))?;

    let mut children = Vec::with_capacity(ordered.len());
    for id in &ordered {
        children.push(tree::detach(root, id).ok_or_else(|| MutationError::NodeNotFound(id.clone()))?);
    }

    let flex = ContainerNode::new(ids.new_id())
        .with_attributes(Attributes::new().with(keys::LAYOUT_TYPE, "flex"))
        .with_children(children);
    tree::insert_child(root, &parent_id, index, flex.into()).map_err(|_| MutationError::ParentNotFound(parent_id))?;

    log_shape("groupIntoFlex", root);
    Ok(None)
}

/// Direct children of a flex container, validated
fn flex_children(root: &Node, flex_id: &str, node_ids: &[String]) -> Result<Vec<usize>, MutationError> {
    let flex = tree::find(root, flex_id).ok_or_else(|| MutationError::NodeNotFound(flex_id.to_string()))?;
    if !flex.is_flex() {
        return Err(MutationError::NotFlex(flex_id.to_string()));
    }
    let children = flex.children().map(Vec::as_slice).unwrap_or(&[]);

    let mut slots = Vec::with_capacity(node_ids.len());
    for id in node_ids {
        let slot = children
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| MutationError::InvalidStructure(format!("'{}' is not a child of '{}'", id, flex_id)))?;
        if slots.contains(&slot) {
            return Err(MutationError::InvalidStructure("node ids repeat".to_string()));
        }
        slots.push(slot);
    }
    if slots.is_empty() {
        return Err(MutationError::InvalidStructure("no nodes given".to_string()));
    }
    slots.sort_unstable();
    Ok(slots)
}

/// Move flex children out, directly after the flex container, keeping
/// their order
pub fn extract_from_flex(root: &mut Node, node_ids: &[String], flex_id: &str) -> MutationResult {
    let slots = flex_children(root, flex_id, node_ids)?;
    let (parent_id, flex_index) =
        tree::location(root, flex_id).ok_or_else(|| MutationError::NodeNotFound(flex_id.to_string()))?;

    let flex = tree::find_mut(root, flex_id)
        .and_then(Node::children_mut)
        .ok_or_else(|| MutationError::NotFlex(flex_id.to_string()))?;
    let extracted: Vec<Node> = slots.iter().rev().map(|&slot| flex.remove(slot)).collect();

    for (offset, node) in extracted.into_iter().rev().enumerate() {
        tree::insert_child(root, &parent_id, flex_index + 1 + offset, node)
            .map_err(|_| MutationError::ParentNotFound(parent_id.clone()))?;
    }

    log_shape("extractFromFlex", root);
    Ok(None)
}

/// Reverse the named children within the slots they occupy
pub fn reverse_in_flex(root: &mut Node, node_ids: &[String], flex_id: &str) -> MutationResult {
    let slots = flex_children(root, flex_id, node_ids)?;
    let children = tree::find_mut(root, flex_id)
        .and_then(Node::children_mut)
        .ok_or_else(|| MutationError::NotFlex(flex_id.to_string()))?;

    let (mut lo, mut hi) = (0, slots.len() - 1);
    while lo < hi {
        children.swap(slots[lo], slots[hi]);
        lo += 1;
        hi -= 1;
    }
    Ok(None)
}

/// Where a moved node lands: `(reference id, insert after it)` or the flex
/// container it enters at one end
enum Landing {
    Beside { reference: String, after: bool },
    Into { container: String, at_end: bool },
}

fn landing(root: &Node, target_id: &str, position: MovePosition) -> Result<Landing, MutationError> {
    let target = tree::find(root, target_id).ok_or_else(|| MutationError::NodeNotFound(target_id.to_string()))?;
    let parent_is_flex = tree::parent_of(root, target_id).is_some_and(|(parent, _)| parent.is_flex());

    let landing = match position {
        MovePosition::Left | MovePosition::Right if target.is_flex() => Landing::Into {
            container: target_id.to_string(),
            at_end: position == MovePosition::Right,
        },
        MovePosition::Left | MovePosition::Right if parent_is_flex => Landing::Beside {
            reference: target_id.to_string(),
            after: position == MovePosition::Right,
        },
        MovePosition::Left | MovePosition::Right => {
            return Err(MutationError::InvalidStructure(format!(
                "left/right needs a flex target, '{}' is not one",
                target_id
            )))
        }
        MovePosition::Before | MovePosition::After if parent_is_flex => {
            let (flex, _) = tree::parent_of(root, target_id)
                .ok_or_else(|| MutationError::ParentNotFound(target_id.to_string()))?;
            Landing::Beside {
                reference: flex.id().to_string(),
                after: position == MovePosition::After,
            }
        }
        MovePosition::Before | MovePosition::After => Landing::Beside {
            reference: target_id.to_string(),
            after: position == MovePosition::After,
        },
    };
    Ok(landing)
}

/// Detach a node and reinsert it relative to a target
pub fn move_node(root: &mut Node, node_id: &str, target_id: &str, position: MovePosition) -> MutationResult {
    if node_id == root.id() {
        return Err(MutationError::InvalidStructure("the root cannot move".to_string()));
    }
    ensure_detachable(root, node_id)?;
    let moving = tree::find(root, node_id).ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;
    if tree::contains(moving, target_id) {
        return Err(MutationError::CycleDetected);
    }

    let landing = landing(root, target_id, position)?;
    if let Landing::Beside { reference, .. } = &landing {
        if reference == root.id() {
            return Err(MutationError::InvalidStructure("cannot move beside the root".to_string()));
        }
    }

    let node = tree::detach(root, node_id).ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;
    let (parent_id, index) = match landing {
        Landing::Beside { reference, after } => {
            let (parent_id, index) =
                tree::location(root, &reference).ok_or_else(|| MutationError::NodeNotFound(reference.clone()))?;
            (parent_id, if after { index + 1 } else { index })
        }
        Landing::Into { container, at_end } => {
            let len = tree::find(root, &container).and_then(Node::children).map(Vec::len).unwrap_or(0);
            (container, if at_end { len } else { 0 })
        }
    };
    ensure_open_parent(root, &parent_id)?;
    tree::insert_child(root, &parent_id, index, node).map_err(|_| MutationError::ParentNotFound(parent_id))?;
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_document::TextNode;

    fn flat() -> Node {
        Node::Container(ContainerNode::new("root").with_children(vec![
            TextNode::paragraph("a", "A").into(),
            TextNode::paragraph("b", "B").into(),
            TextNode::paragraph("c", "C").into(),
        ]))
    }

    fn with_flex() -> Node {
        let flex = ContainerNode::new("flex")
            .with_attributes(Attributes::new().with(keys::LAYOUT_TYPE, "flex"))
            .with_children(vec![
                TextNode::new("i1", ElementType::Img).into(),
                TextNode::new("i2", ElementType::Img).into(),
                TextNode::new("i3", ElementType::Img).into(),
            ]);
        Node::Container(ContainerNode::new("root").with_children(vec![
            TextNode::paragraph("p", "P").into(),
            flex.into(),
            TextNode::paragraph("q", "Q").into(),
        ]))
    }

    fn child_ids(node: &Node) -> Vec<&str> {
        node.children().unwrap().iter().map(Node::id).collect()
    }

    #[test]
    fn test_move_before_only_reorders() {
        let mut root = flat();
        move_node(&mut root, "c", "a", MovePosition::Before).unwrap();
        assert_eq!(child_ids(&root), vec!["c", "a", "b"]);
        assert_eq!(tree::count(&root), 4);
    }

    #[test]
    fn test_move_into_own_subtree_is_rejected() {
        let mut root = with_flex();
        let err = move_node(&mut root, "flex", "i2", MovePosition::Left).unwrap_err();
        assert_eq!(err, MutationError::CycleDetected);
    }

    #[test]
    fn test_left_right_need_flex() {
        let mut root = flat();
        assert!(move_node(&mut root, "a", "b", MovePosition::Left).is_err());
    }

    #[test]
    fn test_move_into_flex_ends() {
        let mut root = with_flex();
        move_node(&mut root, "p", "flex", MovePosition::Left).unwrap();
        move_node(&mut root, "q", "flex", MovePosition::Right).unwrap();
        let flex = tree::find(&root, "flex").unwrap();
        assert_eq!(child_ids(flex), vec!["p", "i1", "i2", "i3", "q"]);
    }

    #[test]
    fn test_before_flex_child_targets_the_group() {
        let mut root = with_flex();
        move_node(&mut root, "q", "i2", MovePosition::Before).unwrap();
        assert_eq!(child_ids(&root), vec!["p", "q", "flex"]);

        move_node(&mut root, "i3", "i1", MovePosition::Left).unwrap();
        assert_eq!(child_ids(tree::find(&root, "flex").unwrap()), vec!["i3", "i1", "i2"]);
    }

    #[test]
    fn test_group_into_flex_adds_one_wrapper() {
        let mut root = flat();
        let mut ids = IdGenerator::new("root");
        group_into_flex(&mut root, &mut ids, &["c".to_string(), "b".to_string()]).unwrap();

        assert_eq!(tree::count(&root), 5);
        let flex = &root.children().unwrap()[1];
        assert!(flex.is_flex());
        assert_eq!(child_ids(flex), vec!["b", "c"]);
    }

    #[test]
    fn test_extract_keeps_order_after_flex() {
        let mut root = with_flex();
        extract_from_flex(&mut root, &["i3".to_string(), "i1".to_string()], "flex").unwrap();
        assert_eq!(child_ids(&root), vec!["p", "flex", "i1", "i3", "q"]);
        assert_eq!(child_ids(tree::find(&root, "flex").unwrap()), vec!["i2"]);
        assert_eq!(tree::count(&root), 7);
    }

    #[test]
    fn test_reverse_within_slots() {
        let mut root = with_flex();
        reverse_in_flex(&mut root, &["i1".to_string(), "i3".to_string()], "flex").unwrap();
        assert_eq!(child_ids(tree::find(&root, "flex").unwrap()), vec!["i3", "i2", "i1"]);
    }

    #[test]
    fn test_create_list_keeps_item_id() {
        let mut root = flat();
        let mut ids = IdGenerator::new("root");
        create_list(&mut root, &mut ids, "b", ListType::Ol).unwrap();

        let list = root.children().unwrap()[1].as_container().unwrap();
        assert_eq!(list.list_type(), Some(ListType::Ol));
        let item = list.children[0].as_text().unwrap();
        assert_eq!(item.id, "b");
        assert_eq!(item.element_type, ElementType::Li);

        // Converting an existing item switches the list flavour in place
        create_list(&mut root, &mut ids, "b", ListType::Ul).unwrap();
        let list = root.children().unwrap()[1].as_container().unwrap();
        assert_eq!(list.list_type(), Some(ListType::Ul));
        assert_eq!(tree::count(&root), 5);
    }
}
