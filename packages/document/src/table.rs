//! Table subtree construction and inspection.
//!
//! Tables are always shaped `Container > table > (thead > tr > th*) (tbody > tr* > td*)`.
//! Both manual table creation and markdown import go through [`build_table`].

use crate::id_generator::IdGenerator;
use crate::node::{ContainerNode, ElementType, Node, StructuralNode, StructuralType, TextNode};

/// Cell text of a table, header row first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableContent {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableContent {
    /// `rows` empty data rows of `cols` cells
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            header: vec![String::new(); cols],
            rows: vec![vec![String::new(); cols]; rows],
        }
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

fn cell(ids: &mut IdGenerator, element_type: ElementType, text: &str) -> Node {
    TextNode::new(ids.new_id(), element_type).with_content(text).into()
}

fn row(ids: &mut IdGenerator, element_type: ElementType, cells: &[String], cols: usize) -> Node {
    let children = (0..cols)
        .map(|i| cell(ids, element_type, cells.get(i).map(String::as_str).unwrap_or("")))
        .collect();
    StructuralNode::new(ids.new_id(), StructuralType::Tr)
        .with_children(children)
        .into()
}

/// Build a wrapped table subtree; data rows are padded or truncated to the
/// header's column count
pub fn build_table(content: &TableContent, ids: &mut IdGenerator) -> Node {
    let cols = content.column_count();

    let header_row = row(ids, ElementType::Th, &content.header, cols);
    let thead = StructuralNode::new(ids.new_id(), StructuralType::Thead).with_children(vec![header_row]);

    let body_rows = content
        .rows
        .iter()
        .map(|cells| row(ids, ElementType::Td, cells, cols))
        .collect();
    let tbody = StructuralNode::new(ids.new_id(), StructuralType::Tbody).with_children(body_rows);

    let table = StructuralNode::new(ids.new_id(), StructuralType::Table)
        .with_children(vec![thead.into(), tbody.into()]);

    ContainerNode::new(ids.new_id())
        .with_children(vec![table.into()])
        .into()
}

fn structural<'a>(node: &'a Node, ty: StructuralType) -> Option<&'a StructuralNode> {
    match node {
        Node::Structural(s) if s.structural_type == ty => Some(s),
        _ => None,
    }
}

fn row_text(tr: &Node) -> Option<Vec<String>> {
    let tr = structural(tr, StructuralType::Tr)?;
    tr.children
        .iter()
        .map(|c| c.as_text().map(TextNode::logical_text))
        .collect()
}

/// Read cell text back out of a table subtree (the wrapper or the `table` node)
pub fn table_content(node: &Node) -> Option<TableContent> {
    let table = match node {
        Node::Container(c) => c.children.first().and_then(|t| structural(t, StructuralType::Table))?,
        other => structural(other, StructuralType::Table)?,
    };

    let mut header = None;
    let mut rows = Vec::new();
    for section in &table.children {
        match section {
            Node::Structural(s) if s.structural_type == StructuralType::Thead => {
                header = s.children.first().and_then(row_text);
            }
            Node::Structural(s) if s.structural_type == StructuralType::Tbody => {
                for tr in &s.children {
                    rows.push(row_text(tr)?);
                }
            }
            _ => return None,
        }
    }

    Some(TableContent {
        header: header?,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_shape() {
        let mut ids = IdGenerator::new("root");
        let node = build_table(&TableContent::empty(3, 2), &mut ids);

        let content = table_content(&node).unwrap();
        assert_eq!(content.header.len(), 2);
        assert_eq!(content.rows.len(), 3);
        assert!(content.rows.iter().all(|r| r.len() == 2 && r.iter().all(String::is_empty)));
    }

    #[test]
    fn test_rows_are_padded_to_header_width() {
        let mut ids = IdGenerator::new("root");
        let content = TableContent {
            header: vec!["a".into(), "b".into()],
            rows: vec![vec!["1".into()], vec!["1".into(), "2".into(), "3".into()]],
        };
        let node = build_table(&content, &mut ids);
        let read = table_content(&node).unwrap();
        assert_eq!(read.rows[0], vec!["1".to_string(), String::new()]);
        assert_eq!(read.rows[1], vec!["1".to_string(), "2".to_string()]);
    }
}
