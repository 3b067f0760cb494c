use crate::inline::{InlineRun, TextBody};
use crate::node::{ContainerNode, Node, StructuralNode, TextNode};

/// Visitor pattern for traversing document nodes immutably
///
/// This trait provides default implementations that walk the entire tree.
/// Override specific visit_* methods to perform custom actions on nodes.
pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }

    fn visit_container(&mut self, container: &ContainerNode) {
        walk_children(self, &container.children);
    }

    fn visit_structural(&mut self, structural: &StructuralNode) {
        walk_children(self, &structural.children);
    }

    fn visit_text(&mut self, text: &TextNode) {
        walk_text(self, text);
    }

    fn visit_run(&mut self, _run: &InlineRun) {
        // Leaf, no children to walk
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node) {
    match node {
        Node::Container(c) => visitor.visit_container(c),
        Node::Structural(s) => visitor.visit_structural(s),
        Node::Text(t) => visitor.visit_text(t),
    }
}

pub fn walk_children<V: Visitor>(visitor: &mut V, children: &[Node]) {
    for child in children {
        visitor.visit_node(child);
    }
}

pub fn walk_text<V: Visitor>(visitor: &mut V, text: &TextNode) {
    match &text.body {
        TextBody::Plain(_) => {}
        TextBody::Runs(runs) => {
            for run in runs {
                visitor.visit_run(run);
            }
        }
        TextBody::Lines(lines) => {
            for run in lines.iter().flat_map(|l| l.runs.iter()) {
                visitor.visit_run(run);
            }
        }
    }
}

/// Collects node ids in document (pre-)order
#[derive(Debug, Default)]
pub struct IdCollector {
    pub ids: Vec<String>,
}

impl Visitor for IdCollector {
    fn visit_node(&mut self, node: &Node) {
        self.ids.push(node.id().to_string());
        walk_node(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::InlineRun;

    struct BoldCounter(usize);

    impl Visitor for BoldCounter {
        fn visit_run(&mut self, run: &InlineRun) {
            if run.bold {
                self.0 += 1;
            }
        }
    }

    fn sample() -> Node {
        Node::Container(ContainerNode::new("root").with_children(vec![
            TextNode::paragraph("a", "one").into(),
            Node::Container(ContainerNode::new("list").with_children(vec![TextNode::paragraph(
                "b", "",
            )
            .with_runs(vec![InlineRun::plain("x").bold(), InlineRun::plain("y")])
            .into()])),
        ]))
    }

    #[test]
    fn test_ids_in_document_order() {
        let mut collector = IdCollector::default();
        collector.visit_node(&sample());
        assert_eq!(collector.ids, vec!["root", "a", "list", "b"]);
    }

    #[test]
    fn test_visit_runs() {
        let mut counter = BoldCounter(0);
        counter.visit_node(&sample());
        assert_eq!(counter.0, 1);
    }
}
