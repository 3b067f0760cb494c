use crate::node::Node;
use crate::visitor::{walk_node, Visitor};
use crc32fast::Hasher;

/// Generate a document seed from the root node id using CRC32
pub fn get_document_seed(root_id: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(root_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for nodes created while editing a document
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Document seed (CRC32 of the root id)
    count: u32,   // Sequential counter
}

impl IdGenerator {
    pub fn new(root_id: &str) -> Self {
        Self {
            seed: get_document_seed(root_id),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generator for an existing tree.
    ///
    /// The counter resumes after the highest `{seed}-{n}` id already present,
    /// so new ids never collide with ones the host supplied.
    pub fn for_document(root: &Node) -> Self {
        let mut gen = Self::new(root.id());
        let mut scan = HighestCounter {
            prefix: format!("{}-", gen.seed),
            highest: 0,
        };
        scan.visit_node(root);
        gen.count = scan.highest;
        gen
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Get document seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

struct HighestCounter {
    prefix: String,
    highest: u32,
}

impl Visitor for HighestCounter {
    fn visit_node(&mut self, node: &Node) {
        if let Some(n) = node
            .id()
            .strip_prefix(&self.prefix)
            .and_then(|rest| rest.parse::<u32>().ok())
        {
            self.highest = self.highest.max(n);
        }
        walk_node(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ContainerNode, TextNode};

    #[test]
    fn test_document_seed_generation() {
        let id1 = get_document_seed("doc-1");
        let id2 = get_document_seed("doc-1");

        // Same root always generates same seed
        assert_eq!(id1, id2);

        // Different roots generate different seeds
        let id3 = get_document_seed("doc-2");
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("root");

        let id1 = gen.new_id();
        let id2 = gen.new_id();
        let id3 = gen.new_id();

        // IDs are sequential
        assert!(id1.ends_with("-1"));
        assert!(id2.ends_with("-2"));
        assert!(id3.ends_with("-3"));

        // All share same seed
        let seed = gen.seed();
        assert!(id1.starts_with(seed));
        assert!(id2.starts_with(seed));
        assert!(id3.starts_with(seed));
    }

    #[test]
    fn test_resumes_after_existing_ids() {
        let seed = get_document_seed("root");
        let root = Node::Container(ContainerNode::new("root").with_children(vec![
            TextNode::paragraph(format!("{}-7", seed), "a").into(),
            TextNode::paragraph(format!("{}-3", seed), "b").into(),
            TextNode::paragraph("host-99", "c").into(),
        ]));

        let mut gen = IdGenerator::for_document(&root);
        assert_eq!(gen.new_id(), format!("{}-8", seed));
    }
}
