//! # Post-Effect System
//!
//! Actions may leave the tree in a shape that needs tidying. After the
//! primary action is applied, every registered [`PostEffect`] inspects the
//! result and emits secondary actions, which are applied in the same
//! transaction. Analysis repeats until no effect has anything left to do.
//!
//! - **EnsureEditableRoot**: an empty document receives one empty paragraph
//! - **RemoveEmptyContainers**: lists, flex groups and table wrappers left
//!   without children are removed
//! - **UnwrapSingleChildFlex** (opt-in): a flex group holding one child is
//!   replaced by that child

use crate::mutations::{Action, InsertPosition, MutationError, MutationResult};
use folio_document::{IdGenerator, Node, TextNode};

/// Upper bound on analysis rounds per action
const MAX_EFFECT_PASSES: usize = 16;

/// Post-effect that can be triggered by an action
pub trait PostEffect: std::fmt::Debug {
    /// Inspect the tree after `action` and generate secondary actions if needed
    fn analyze(&self, action: &Action, root: &Node, ids: &mut IdGenerator) -> Vec<Action>;
}

/// Keep at least one editable block in the document
#[derive(Debug)]
pub struct EnsureEditableRoot;

impl PostEffect for EnsureEditableRoot {
    fn analyze(&self, _action: &Action, root: &Node, ids: &mut IdGenerator) -> Vec<Action> {
        match root.children() {
            Some(children) if children.is_empty() => vec![Action::Insert {
                node: TextNode::paragraph(ids.new_id(), "").into(),
                anchor_id: None,
                position: InsertPosition::Append,
            }],
            _ => vec![],
        }
    }
}

/// Remove non-root containers that no longer hold anything
#[derive(Debug)]
pub struct RemoveEmptyContainers;

fn collect_empty_containers(node: &Node, out: &mut Vec<String>) {
    for child in node.children().into_iter().flatten() {
        match child {
            Node::Container(container) if container.children.is_empty() => out.push(container.id.clone()),
            other => collect_empty_containers(other, out),
        }
    }
}

impl PostEffect for RemoveEmptyContainers {
    fn analyze(&self, _action: &Action, root: &Node, _ids: &mut IdGenerator) -> Vec<Action> {
        let mut empty = Vec::new();
        collect_empty_containers(root, &mut empty);
        empty.into_iter().map(|node_id| Action::Delete { node_id }).collect()
    }
}

/// Replace a flex group holding a single child with that child
#[derive(Debug)]
pub struct UnwrapSingleChildFlex;

fn collect_single_child_flex(node: &Node, out: &mut Vec<(String, Node)>) {
    for child in node.children().into_iter().flatten() {
        match child {
            Node::Container(container) if container.is_flex() && container.children.len() == 1 => {
                out.push((container.id.clone(), container.children[0].clone()));
            }
            other => collect_single_child_flex(other, out),
        }
    }
}

impl PostEffect for UnwrapSingleChildFlex {
    fn analyze(&self, _action: &Action, root: &Node, _ids: &mut IdGenerator) -> Vec<Action> {
        let mut found = Vec::new();
        collect_single_child_flex(root, &mut found);
        found
            .into_iter()
            .map(|(node_id, node)| Action::ReplaceNode { node_id, node })
            .collect()
    }
}

/// Post-effect engine that applies all registered effects
#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Create engine with default effects
    pub fn new() -> Self {
        Self {
            effects: vec![Box::new(RemoveEmptyContainers), Box::new(EnsureEditableRoot)],
        }
    }

    /// Default effects, plus flex unwrapping when requested
    pub fn with_flex_unwrapping(unwrap_single_child_flex: bool) -> Self {
        let mut engine = Self::new();
        if unwrap_single_child_flex {
            engine.register(Box::new(UnwrapSingleChildFlex));
        }
        engine
    }

    pub fn register(&mut self, effect: Box<dyn PostEffect>) {
        self.effects.push(effect);
    }

    /// Analyze the tree after an action and generate all secondary actions
    pub fn analyze(&self, action: &Action, root: &Node, ids: &mut IdGenerator) -> Vec<Action> {
        let mut secondary_actions = Vec::new();

        for effect in &self.effects {
            let mut effect_actions = effect.analyze(action, root, ids);
            secondary_actions.append(&mut effect_actions);
        }

        secondary_actions
    }

    /// Apply an action with all its post-effects; the focus is the primary
    /// action's
    pub fn apply_with_effects(&self, action: &Action, root: &mut Node, ids: &mut IdGenerator) -> MutationResult {
        let focus = action.apply(root, ids)?;

        for _ in 0..MAX_EFFECT_PASSES {
            let secondary = self.analyze(action, root, ids);
            if secondary.is_empty() {
                return Ok(focus);
            }
            for secondary_action in secondary {
                tracing::debug!(effect = secondary_action.name(), "applying post-effect");
                secondary_action.apply(root, ids)?;
            }
        }

        Err(MutationError::InvalidStructure("post-effects did not settle".to_string()))
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_document::{keys, tree, Attributes, ContainerNode};

    fn flex(id: &str, children: Vec<Node>) -> Node {
        ContainerNode::new(id)
            .with_attributes(Attributes::new().with(keys::LAYOUT_TYPE, "flex"))
            .with_children(children)
            .into()
    }

    #[test]
    fn test_post_effect_engine_creation() {
        assert_eq!(PostEffectEngine::new().effects.len(), 2);
        assert_eq!(PostEffectEngine::with_flex_unwrapping(true).effects.len(), 3);
    }

    #[test]
    fn test_deleting_last_block_leaves_a_paragraph() {
        let mut root: Node = ContainerNode::new("root")
            .with_children(vec![TextNode::paragraph("only", "x").into()])
            .into();
        let mut ids = IdGenerator::new("root");
        let engine = PostEffectEngine::new();

        engine
            .apply_with_effects(&Action::Delete { node_id: "only".into() }, &mut root, &mut ids)
            .unwrap();

        let children = root.children().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].as_text().unwrap().logical_text(), "");
    }

    #[test]
    fn test_empty_containers_cascade() {
        let outer: Node = ContainerNode::new("outer")
            .with_children(vec![flex("inner", vec![TextNode::paragraph("x", "x").into()])])
            .into();
        let mut root: Node = ContainerNode::new("root")
            .with_children(vec![TextNode::paragraph("keep", "k").into(), outer])
            .into();
        let mut ids = IdGenerator::new("root");

        PostEffectEngine::new()
            .apply_with_effects(&Action::Delete { node_id: "x".into() }, &mut root, &mut ids)
            .unwrap();

        assert_eq!(tree::ids(&root), vec!["root", "keep"]);
    }

    #[test]
    fn test_unwrap_single_child_flex_is_opt_in() {
        let build = || -> Node {
            ContainerNode::new("root")
                .with_children(vec![flex(
                    "row",
                    vec![TextNode::paragraph("a", "a").into(), TextNode::paragraph("b", "b").into()],
                )])
                .into()
        };
        let action = Action::Delete { node_id: "b".into() };

        let mut root = build();
        PostEffectEngine::new()
            .apply_with_effects(&action, &mut root, &mut IdGenerator::new("root"))
            .unwrap();
        assert!(tree::find(&root, "row").is_some());

        let mut root = build();
        PostEffectEngine::with_flex_unwrapping(true)
            .apply_with_effects(&action, &mut root, &mut IdGenerator::new("root"))
            .unwrap();
        assert_eq!(tree::ids(&root), vec!["root", "a"]);
    }
}
