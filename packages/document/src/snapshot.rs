use crate::error::{DocumentError, DocumentResult};
use crate::node::{ContainerNode, Node};
use crate::tree;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// One immutable state of the whole document.
///
/// Cloning is cheap (reference counted); edits build a new snapshot from a
/// copy of the root, so a snapshot held by the history never changes.
#[derive(Debug, Clone)]
pub struct Snapshot {
    root: Arc<Node>,
}

impl Snapshot {
    /// Wrap a root built in code, without checking it.
    ///
    /// Ids are assumed unique; use [`Snapshot::try_new`] for roots that come
    /// from elsewhere.
    pub fn new(root: ContainerNode) -> Self {
        Self {
            root: Arc::new(Node::Container(root)),
        }
    }

    /// Wrap a container root, rejecting repeated ids
    pub fn try_new(root: ContainerNode) -> DocumentResult<Self> {
        Self::from_node(Node::Container(root))
    }

    /// Validate and wrap a host-supplied root
    pub fn from_node(root: Node) -> DocumentResult<Self> {
        if !matches!(root, Node::Container(_)) {
            return Err(DocumentError::RootNotContainer(root.id().to_string()));
        }
        if let Some(id) = tree::duplicate_id(&root) {
            return Err(DocumentError::DuplicateId(id));
        }
        Ok(Self { root: Arc::new(root) })
    }

    pub fn from_json(json: &str) -> DocumentResult<Self> {
        let root: Node = serde_json::from_str(json)?;
        Self::from_node(root)
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string(self.root())?)
    }

    pub fn to_json_pretty(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(self.root())?)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_id(&self) -> &str {
        self.root.id()
    }

    /// Owned copy of the root for building the next snapshot
    pub fn to_root(&self) -> Node {
        (*self.root).clone()
    }

    /// Wrap an edited root produced from [`Snapshot::to_root`]
    pub fn from_edited(root: Node) -> Self {
        Self { root: Arc::new(root) }
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        tree::find(&self.root, id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn node_count(&self) -> usize {
        tree::count(&self.root)
    }

    /// True when both handles point at the same stored tree
    pub fn same_as(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other) || self.root == other.root
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TextNode;

    #[test]
    fn test_rejects_text_root() {
        let json = r#"{"kind":"text","id":"x","type":"p","content":"hi"}"#;
        assert!(matches!(
            Snapshot::from_json(json),
            Err(DocumentError::RootNotContainer(id)) if id == "x"
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let json = r#"{"kind":"container","id":"root","children":[
            {"kind":"text","id":"a","type":"p","content":"1"},
            {"kind":"text","id":"a","type":"p","content":"2"}
        ]}"#;
        assert!(matches!(Snapshot::from_json(json), Err(DocumentError::DuplicateId(_))));
    }

    #[test]
    fn test_try_new_checks_ids() {
        let dup = ContainerNode::new("root").with_children(vec![
            TextNode::paragraph("a", "1").into(),
            ContainerNode::new("a").into(),
        ]);
        assert!(matches!(Snapshot::try_new(dup.clone()), Err(DocumentError::DuplicateId(id)) if id == "a"));
        assert_eq!(Snapshot::new(dup).node_count(), 3);

        let ok = ContainerNode::new("root").with_children(vec![TextNode::paragraph("a", "1").into()]);
        assert!(Snapshot::try_new(ok).is_ok());
    }

    #[test]
    fn test_edits_do_not_touch_original() {
        let original = Snapshot::from_json(
            r#"{"kind":"container","id":"root","children":[{"kind":"text","id":"a","type":"p","content":"1"}]}"#,
        )
        .unwrap();

        let mut root = original.to_root();
        tree::detach(&mut root, "a");
        let edited = Snapshot::from_edited(root);

        assert!(original.contains("a"));
        assert!(!edited.contains("a"));
        assert_ne!(original, edited);
        assert_eq!(original, original.clone());
    }
}
