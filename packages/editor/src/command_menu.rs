//! Slash command menu.
//!
//! Typing `/` as the only content of a text block opens the menu; further
//! characters filter it. Choosing a command turns the block into the chosen
//! kind and clears the typed query, as one action. Menu state is ephemeral
//! and never enters history.

use crate::mutations::{Action, InsertPosition};
use folio_document::{ElementType, ListType, TextNode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    Text,
    Heading1,
    Heading2,
    Heading3,
    BulletedList,
    NumberedList,
    Quote,
    Code,
    Table,
}

impl Command {
    pub const ALL: [Command; 9] = [
        Command::Text,
        Command::Heading1,
        Command::Heading2,
        Command::Heading3,
        Command::BulletedList,
        Command::NumberedList,
        Command::Quote,
        Command::Code,
        Command::Table,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Command::Text => "Text",
            Command::Heading1 => "Heading 1",
            Command::Heading2 => "Heading 2",
            Command::Heading3 => "Heading 3",
            Command::BulletedList => "Bulleted list",
            Command::NumberedList => "Numbered list",
            Command::Quote => "Quote",
            Command::Code => "Code",
            Command::Table => "Table",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Command::Text => &["paragraph", "p"],
            Command::Heading1 => &["h1", "title"],
            Command::Heading2 => &["h2", "subtitle"],
            Command::Heading3 => &["h3"],
            Command::BulletedList => &["ul", "unordered"],
            Command::NumberedList => &["ol", "ordered"],
            Command::Quote => &["blockquote"],
            Command::Code => &["pre", "snippet"],
            Command::Table => &["grid"],
        }
    }

    fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.label().to_lowercase().contains(&query)
            || self.keywords().iter().any(|k| k.starts_with(&query))
    }

    /// The action applying this command to `node_id`, clearing its text
    pub fn action(&self, node_id: &str) -> Action {
        let clear = Action::UpdateContent {
            node_id: node_id.to_string(),
            lines: Vec::new(),
        };
        let convert = |new_type| Action::ConvertType {
            node_id: node_id.to_string(),
            new_type,
        };

        let apply = match self {
            Command::Text => convert(ElementType::P),
            Command::Heading1 => convert(ElementType::H1),
            Command::Heading2 => convert(ElementType::H2),
            Command::Heading3 => convert(ElementType::H3),
            Command::Quote => convert(ElementType::Blockquote),
            Command::Code => convert(ElementType::Code),
            Command::BulletedList => Action::CreateList {
                node_id: node_id.to_string(),
                list_type: ListType::Ul,
            },
            Command::NumberedList => Action::CreateList {
                node_id: node_id.to_string(),
                list_type: ListType::Ol,
            },
            Command::Table => Action::CreateTable {
                rows: 2,
                cols: 2,
                anchor_id: Some(node_id.to_string()),
                position: InsertPosition::After,
            },
        };

        Action::Batch {
            actions: vec![clear, apply],
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandMenu {
    node_id: Option<String>,
    query: String,
    highlighted: usize,
}

impl CommandMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.node_id.is_some()
    }

    /// The block the menu was opened from
    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Update menu state after the text of `text` changed
    pub fn on_input(&mut self, text: &TextNode) {
        if text.element_type.is_media() || text.element_type.is_cell() {
            return;
        }
        let content = text.logical_text();

        if content == "/" {
            self.node_id = Some(text.id.clone());
            self.query.clear();
            self.highlighted = 0;
            return;
        }

        if self.node_id.as_deref() == Some(text.id.as_str()) {
            match content.strip_prefix('/') {
                Some(query) if !query.contains('\n') => {
                    self.query = query.to_string();
                    self.highlighted = self.highlighted.min(self.matches().len().saturating_sub(1));
                }
                _ => self.close(),
            }
        }
    }

    /// Commands matching the current query
    pub fn matches(&self) -> Vec<Command> {
        Command::ALL.into_iter().filter(|c| c.matches(&self.query)).collect()
    }

    pub fn highlighted(&self) -> Option<Command> {
        self.matches().get(self.highlighted).copied()
    }

    /// Move the highlight, wrapping around the match list
    pub fn move_highlight(&mut self, delta: isize) {
        let len = self.matches().len() as isize;
        if len == 0 {
            return;
        }
        self.highlighted = (self.highlighted as isize + delta).rem_euclid(len) as usize;
    }

    /// Close the menu and return the action for `command`
    pub fn select(&mut self, command: Command) -> Option<Action> {
        let node_id = self.node_id.take()?;
        self.query.clear();
        self.highlighted = 0;
        Some(command.action(&node_id))
    }

    pub fn close(&mut self) {
        self.node_id = None;
        self.query.clear();
        self.highlighted = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_opens_and_query_filters() {
        let mut menu = CommandMenu::new();
        menu.on_input(&TextNode::paragraph("p", "/"));
        assert!(menu.is_open());
        assert_eq!(menu.matches().len(), Command::ALL.len());

        menu.on_input(&TextNode::paragraph("p", "/head"));
        assert_eq!(
            menu.matches(),
            vec![Command::Heading1, Command::Heading2, Command::Heading3]
        );

        menu.on_input(&TextNode::paragraph("p", "/h1"));
        assert_eq!(menu.matches(), vec![Command::Heading1]);

        menu.on_input(&TextNode::paragraph("p", "nothing"));
        assert!(!menu.is_open());
    }

    #[test]
    fn test_slash_in_other_text_does_not_open() {
        let mut menu = CommandMenu::new();
        menu.on_input(&TextNode::paragraph("p", "a/b"));
        assert!(!menu.is_open());
    }

    #[test]
    fn test_highlight_wraps() {
        let mut menu = CommandMenu::new();
        menu.on_input(&TextNode::paragraph("p", "/"));
        menu.move_highlight(-1);
        assert_eq!(menu.highlighted(), Some(Command::Table));
        menu.move_highlight(1);
        assert_eq!(menu.highlighted(), Some(Command::Text));
    }

    #[test]
    fn test_select_builds_single_batch() {
        let mut menu = CommandMenu::new();
        menu.on_input(&TextNode::paragraph("p", "/"));
        let action = menu.select(Command::Heading1).unwrap();
        assert!(!menu.is_open());
        assert_eq!(
            action,
            Action::Batch {
                actions: vec![
                    Action::UpdateContent { node_id: "p".into(), lines: vec![] },
                    Action::ConvertType { node_id: "p".into(), new_type: ElementType::H1 },
                ]
            }
        );
    }
}
