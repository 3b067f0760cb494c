//! Markdown pipe tables.
//!
//! ```text
//! | Name | Role  |
//! |------|:-----:|
//! | Ada  | Admin |
//! ```
//!
//! Leading/trailing pipes are optional. The separator row is required and
//! each of its cells must be dashes with optional `:` alignment markers.

use folio_document::{build_table, table_content, IdGenerator, Node, TableContent};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkdownError {
    #[error("Table text is empty")]
    Empty,

    #[error("Table has no header row")]
    MissingHeader,

    #[error("Table has no separator row after the header")]
    MissingSeparator,

    #[error("Invalid separator cell '{cell}' (expected dashes with optional ':')")]
    InvalidSeparator { cell: String },

    #[error("Row {line} has {found} cells, expected {expected}")]
    ColumnMismatch { line: usize, expected: usize, found: usize },

    #[error("Node '{0}' is not a table")]
    NotATable(String),
}

fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            other => current.push(other),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

fn is_separator_cell(cell: &str) -> bool {
    let inner = cell.strip_prefix(':').unwrap_or(cell);
    let inner = inner.strip_suffix(':').unwrap_or(inner);
    !inner.is_empty() && inner.chars().all(|c| c == '-')
}

/// Parse the cell text of a markdown table
pub fn parse_table_content(text: &str) -> Result<TableContent, MarkdownError> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| !l.trim().is_empty())
        .collect();

    let Some(&(_, header_line)) = lines.first() else {
        return Err(MarkdownError::Empty);
    };
    if !header_line.contains('|') {
        return Err(MarkdownError::MissingHeader);
    }
    let header = split_row(header_line);

    let Some(&(separator_no, separator_line)) = lines.get(1) else {
        return Err(MarkdownError::MissingSeparator);
    };
    let separator = split_row(separator_line);
    if let Some(cell) = separator.iter().find(|c| !is_separator_cell(c)) {
        // A data row where the separator should be
        if separator.iter().all(|c| !c.contains('-')) {
            return Err(MarkdownError::MissingSeparator);
        }
        return Err(MarkdownError::InvalidSeparator { cell: cell.clone() });
    }
    if separator.len() != header.len() {
        return Err(MarkdownError::ColumnMismatch {
            line: separator_no,
            expected: header.len(),
            found: separator.len(),
        });
    }

    let mut rows = Vec::new();
    for &(line_no, line) in &lines[2..] {
        let cells = split_row(line);
        if cells.len() > header.len() {
            return Err(MarkdownError::ColumnMismatch {
                line: line_no,
                expected: header.len(),
                found: cells.len(),
            });
        }
        rows.push(cells);
    }

    Ok(TableContent { header, rows })
}

/// Parse a markdown table into a table subtree with fresh ids.
///
/// Short rows are padded with empty cells; long rows are rejected.
pub fn parse_markdown_table(text: &str, ids: &mut IdGenerator) -> Result<Node, MarkdownError> {
    let content = parse_table_content(text)?;
    tracing::debug!(
        cols = content.column_count(),
        rows = content.rows.len(),
        "parsed markdown table"
    );
    Ok(build_table(&content, ids))
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn format_row(cells: &[String]) -> String {
    let inner: Vec<String> = cells.iter().map(|c| escape_cell(c)).collect();
    format!("| {} |", inner.join(" | "))
}

/// Emit a table subtree (wrapper or `table` node) as a markdown table
pub fn table_to_markdown(node: &Node) -> Result<String, MarkdownError> {
    let content = table_content(node).ok_or_else(|| MarkdownError::NotATable(node.id().to_string()))?;

    let mut out = Vec::with_capacity(content.rows.len() + 2);
    out.push(format_row(&content.header));
    out.push(format!("|{}|", vec!["---"; content.column_count()].join("|")));
    for row in &content.rows {
        out.push(format_row(row));
    }
    Ok(out.join("\n"))
}
