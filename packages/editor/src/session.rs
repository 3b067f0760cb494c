//! # Editor Session
//!
//! The state container for one open document: history, id generation,
//! post-effects, surface synchronisation and the ephemeral UI state (drag
//! session, command menu). Several sessions can coexist; nothing is global.
//!
//! Every committed change goes through [`EditorSession::dispatch`], which
//! reduces the action against the current snapshot, pushes the result onto
//! the history and notifies listeners.

use crate::command_menu::{Command, CommandMenu};
use crate::config::EditorConfig;
use crate::dom_sync::{extract, DomSync, FocusPoll};
use crate::drag::{DragController, DropTarget, Rect};
use crate::mutations::{reduce, Action, Focus, InsertPosition};
use crate::post_effects::PostEffectEngine;
use crate::selection::selection_info;
use crate::surface::Surface;
use crate::undo_stack::UndoStack;
use crate::upload::{DefaultUploader, MediaFile, PendingUpload, UploadError, UploadOutcome, Uploader};
use crate::EditorError;
use folio_compiler_html::{compile_to_html, parse_markdown_table};
use folio_document::{
    keys, tree, AttrValue, Attributes, ContainerNode, IdGenerator, Node, SelectionInfo, Snapshot, TextNode,
};
use std::collections::BTreeMap;
use std::time::Instant;

/// Called with the current snapshot after every commit, undo and redo
pub type ChangeListener = Box<dyn FnMut(&Snapshot)>;

pub struct EditorSession {
    history: UndoStack,
    ids: IdGenerator,
    effects: PostEffectEngine,
    config: EditorConfig,
    uploader: Box<dyn Uploader>,
    listeners: Vec<ChangeListener>,
    sync: DomSync,
    drag: DragController,
    menu: CommandMenu,
}

impl EditorSession {
    /// Open a document with the default configuration
    /// Open a root built in code; ids are not checked
    pub fn new(root: ContainerNode) -> Self {
        Self::from_snapshot(Snapshot::new(root), EditorConfig::default())
    }

    /// Open a root, rejecting repeated ids
    pub fn try_new(root: ContainerNode, config: EditorConfig) -> Result<Self, EditorError> {
        Ok(Self::from_snapshot(Snapshot::try_new(root)?, config))
    }

    pub fn with_config(root: ContainerNode, config: EditorConfig) -> Self {
        Self::from_snapshot(Snapshot::new(root), config)
    }

    pub fn from_snapshot(snapshot: Snapshot, config: EditorConfig) -> Self {
        let ids = IdGenerator::for_document(snapshot.root());
        let mut sync = DomSync::new();
        sync.set_read_only(config.read_only);

        if let Some(id) = tree::duplicate_id(snapshot.root()) {
            tracing::warn!(root = %snapshot.root_id(), id = %id, "document repeats a node id");
        }
        tracing::debug!(root = %snapshot.root_id(), nodes = snapshot.node_count(), "opened document");
        Self {
            history: UndoStack::with_max_levels(snapshot, config.history_limit),
            ids,
            effects: PostEffectEngine::with_flex_unwrapping(config.unwrap_single_child_flex),
            config,
            uploader: Box::new(DefaultUploader),
            listeners: Vec::new(),
            sync,
            drag: DragController::new(),
            menu: CommandMenu::new(),
        }
    }

    /// Replace the uploader used by `begin_upload`
    pub fn with_uploader(mut self, uploader: Box<dyn Uploader>) -> Self {
        self.uploader = uploader;
        self
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.history.current()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn on_change(&mut self, listener: impl FnMut(&Snapshot) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self) {
        let snapshot = self.history.current().clone();
        for listener in &mut self.listeners {
            listener(&snapshot);
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.config.read_only = read_only;
        self.sync.set_read_only(read_only);
    }

    /// Apply an action; returns whether the document changed
    pub fn dispatch(&mut self, action: Action) -> Result<bool, EditorError> {
        if self.config.read_only {
            return Err(EditorError::ReadOnly);
        }

        let applied = reduce(self.history.current(), &action, &mut self.ids, &self.effects);
        if !applied.changed {
            return Ok(false);
        }

        self.history.push(applied.snapshot);
        if let Some(focus) = applied.focus {
            self.sync.request_focus(focus, Instant::now());
        }
        tracing::debug!(
            action = action.name(),
            undo_levels = self.history.undo_levels(),
            "committed action"
        );
        self.notify();
        Ok(true)
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        if self.config.read_only {
            return Err(EditorError::ReadOnly);
        }
        if !self.history.undo() {
            return Ok(false);
        }
        self.notify();
        Ok(true)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        if self.config.read_only {
            return Err(EditorError::ReadOnly);
        }
        if !self.history.redo() {
            return Ok(false);
        }
        self.notify();
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// HTML for the current snapshot
    pub fn serialize(&self) -> Result<String, EditorError> {
        Ok(compile_to_html(self.snapshot().root(), &self.config.html)?)
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(self.snapshot().to_json()?)
    }

    /// Toolbar state for a range inside a text node
    pub fn selection_info(&self, node_id: &str, start: usize, end: usize) -> Option<SelectionInfo> {
        let text = self.snapshot().find(node_id)?.as_text()?;
        Some(selection_info(text, start, end))
    }

    /// Parse a markdown table and insert it after `anchor_id` (or at the end)
    pub fn import_markdown_table(&mut self, markdown: &str, anchor_id: Option<&str>) -> Result<bool, EditorError> {
        if self.config.read_only {
            return Err(EditorError::ReadOnly);
        }
        let table = parse_markdown_table(markdown, &mut self.ids)?;
        self.dispatch(Action::Insert {
            node: table,
            anchor_id: anchor_id.map(str::to_string),
            position: if anchor_id.is_some() { InsertPosition::After } else { InsertPosition::Append },
        })
    }

    /// Insert a placeholder for `file` and start uploading it.
    ///
    /// Returns `None` when nothing needs awaiting: the placeholder could not
    /// be inserted, or the uploader does not take this kind of file (the
    /// placeholder is then marked `uploadHandlerRequired`).
    pub fn begin_upload(&mut self, file: MediaFile, anchor_id: Option<&str>) -> Result<Option<PendingUpload>, EditorError> {
        if self.config.read_only {
            return Err(EditorError::ReadOnly);
        }
        let element_type = file
            .element_type()
            .ok_or_else(|| UploadError::Unsupported(file.mime_type.clone()))?;
        let accepted = self.uploader.accepts(&file);

        let mut attributes = Attributes::new().with(keys::ALT, file.name.as_str());
        if accepted {
            attributes.set(keys::LOADING, true);
        } else {
            attributes.set(keys::UPLOAD_HANDLER_REQUIRED, true);
        }
        let node_id = self.ids.new_id();
        let placeholder = TextNode::new(node_id.clone(), element_type).with_attributes(attributes);

        let inserted = self.dispatch(Action::Insert {
            node: placeholder.into(),
            anchor_id: anchor_id.map(str::to_string),
            position: if anchor_id.is_some() { InsertPosition::After } else { InsertPosition::Append },
        })?;
        if !inserted {
            return Ok(None);
        }
        if !accepted {
            tracing::info!(node = %node_id, mime = %file.mime_type, "no upload handler for media type");
            return Ok(None);
        }

        tracing::debug!(node = %node_id, name = %file.name, "upload started");
        let future = self.uploader.upload_image(file);
        Ok(Some(PendingUpload::new(node_id, future)))
    }

    /// Resolve a placeholder by id; a no-op if it was deleted meanwhile
    pub fn settle_upload(&mut self, outcome: UploadOutcome) -> Result<bool, EditorError> {
        if self.snapshot().find(&outcome.node_id).is_none() {
            tracing::debug!(node = %outcome.node_id, "placeholder gone before upload settled");
            return Ok(false);
        }

        let mut set = BTreeMap::new();
        let remove = match outcome.result {
            Ok(url) => {
                set.insert(keys::SRC.to_string(), AttrValue::from(url));
                vec![keys::LOADING.to_string(), keys::ERROR.to_string()]
            }
            Err(err) => {
                tracing::warn!(node = %outcome.node_id, error = %err, "upload failed");
                set.insert(keys::ERROR.to_string(), AttrValue::from(true));
                vec![keys::LOADING.to_string()]
            }
        };

        self.dispatch(Action::UpdateAttributes {
            node_id: outcome.node_id,
            set,
            remove,
        })
    }

    /// Pull a node's edited markup from the surface into the document
    pub fn handle_input(&mut self, surface: &dyn Surface, node_id: &str) -> Result<bool, EditorError> {
        if self.sync.composition() == crate::dom_sync::CompositionState::Composing {
            return Ok(false);
        }
        let Some(action) = extract(surface, node_id) else {
            return Ok(false);
        };
        let changed = self.dispatch(action)?;

        if let Some(text) = self.history.current().find(node_id).and_then(Node::as_text) {
            self.menu.on_input(text);
        }
        Ok(changed)
    }

    pub fn reconcile(&self, surface: &mut dyn Surface) -> Vec<String> {
        self.sync.reconcile(self.history.current(), surface)
    }

    pub fn composition_start(&mut self) {
        self.sync.composition_start();
    }

    /// Commit the composed text of `node_id`, then reconcile
    pub fn composition_end(&mut self, surface: &mut dyn Surface, node_id: &str) -> Result<Vec<String>, EditorError> {
        if let Some(action) = extract(surface, node_id) {
            self.dispatch(action)?;
        }
        Ok(self.sync.composition_end(self.history.current(), surface))
    }

    /// Retry a pending focus request against the surface
    pub fn poll_focus(&mut self, surface: &mut dyn Surface, now: Instant) -> FocusPoll {
        self.sync.poll_focus(surface, now)
    }

    pub fn drag_start(&mut self, node_id: &str) {
        self.drag.drag_start(node_id);
    }

    pub fn drag_over(&mut self, target_id: &str, rect: Rect, pointer: (f64, f64)) -> Option<DropTarget> {
        self.drag
            .drag_over(self.history.current(), target_id, rect, pointer)
            .cloned()
    }

    /// Drop the dragged node on the last computed target
    pub fn drop(&mut self) -> Result<bool, EditorError> {
        match self.drag.drop_action() {
            Some(action) => self.dispatch(action),
            None => Ok(false),
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    pub fn command_menu(&self) -> &CommandMenu {
        &self.menu
    }

    pub fn command_menu_mut(&mut self) -> &mut CommandMenu {
        &mut self.menu
    }

    /// Apply a menu command to the block the menu was opened from
    pub fn select_command(&mut self, command: Command) -> Result<bool, EditorError> {
        let Some(node_id) = self.menu.node_id().map(str::to_string) else {
            return Ok(false);
        };
        let Some(action) = self.menu.select(command) else {
            return Ok(false);
        };
        let changed = self.dispatch(action)?;
        if changed && command != Command::Table {
            self.sync.request_focus(Focus::new(node_id, 0), Instant::now());
        }
        Ok(changed)
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("root", &self.snapshot().root_id())
            .field("undo_levels", &self.history.undo_levels())
            .field("read_only", &self.config.read_only)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session() -> EditorSession {
        EditorSession::new(ContainerNode::new("root").with_children(vec![
            TextNode::paragraph("a", "Hello").into(),
            TextNode::paragraph("b", "World").into(),
        ]))
    }

    #[test]
    fn test_session_creation() {
        let session = session();
        assert_eq!(session.snapshot().root_id(), "root");
        assert!(!session.can_undo());
        assert!(!session.is_read_only());
    }

    #[test]
    fn test_listeners_see_commits_and_undo() {
        let mut session = session();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        session.on_change(move |snapshot| sink.borrow_mut().push(snapshot.node_count()));

        session.dispatch(Action::Delete { node_id: "b".into() }).unwrap();
        session.undo().unwrap();
        session.redo().unwrap();

        assert_eq!(*seen.borrow(), vec![2, 3, 2]);
    }

    #[test]
    fn test_noop_is_not_recorded() {
        let mut session = session();
        let changed = session.dispatch(Action::Delete { node_id: "missing".into() }).unwrap();
        assert!(!changed);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_read_only_rejects_dispatch() {
        let mut session = session();
        session.set_read_only(true);
        let err = session.dispatch(Action::Delete { node_id: "a".into() }).unwrap_err();
        assert!(matches!(err, EditorError::ReadOnly));
        assert!(session.snapshot().find("a").is_some());
    }

    #[test]
    fn test_selection_info_lookup() {
        let session = session();
        let info = session.selection_info("a", 0, 5).unwrap();
        assert_eq!(info.node_id, "a");
        assert!(session.selection_info("missing", 0, 0).is_none());
    }

    #[test]
    fn test_markdown_import_inserts_after_anchor() {
        let mut session = session();
        session
            .import_markdown_table("| x | y |\n|---|---|\n| 1 | 2 |", Some("a"))
            .unwrap();
        let children = session.snapshot().root().children().unwrap();
        assert_eq!(children.len(), 3);
        assert!(children[1].as_container().unwrap().is_table_wrapper());

        let err = session.import_markdown_table("no table here", None).unwrap_err();
        assert!(matches!(err, EditorError::Markdown(_)));
    }
}
