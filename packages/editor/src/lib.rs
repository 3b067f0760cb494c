//! # Folio Editor
//!
//! Block document editing engine: actions, history, post-effects and the
//! glue that keeps an editable surface in step with the document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ surface: editable markup per text node      │
//! └─────────────────────────────────────────────┘
//!          ↓ extract            ↑ reconcile
//! ┌─────────────────────────────────────────────┐
//! │ session: dispatch / undo / redo             │
//! │  - reduce action against current snapshot  │
//! │  - run post-effects to a fixed point        │
//! │  - push onto history, notify listeners      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ compiler-html: snapshot → HTML              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Snapshots are immutable**: every commit produces a new one
//! 2. **Ids are stable**: actions address nodes by id, never by path
//! 3. **Invalid actions are no-ops**: nothing is committed, nothing thrown
//! 4. **Surface is derived**: it can always be rebuilt from the snapshot
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{Action, EditorSession, Format};
//! use folio_document::{ContainerNode, SelectionRange, TextNode};
//!
//! let root = ContainerNode::new("root")
//!     .with_children(vec![TextNode::paragraph("p1", "Hello world").into()]);
//! let mut session = EditorSession::new(root);
//!
//! session.dispatch(Action::ToggleFormat {
//!     selection: SelectionRange::new("p1", 0, 5),
//!     format: Format::Bold,
//! })?;
//!
//! let html = session.serialize()?;
//! session.undo()?;
//! ```

mod command_menu;
mod config;
mod dom_sync;
mod drag;
mod errors;
mod formatting;
mod layout;
mod mutations;
mod post_effects;
mod selection;
mod session;
mod surface;
mod undo_stack;
mod upload;

pub use command_menu::{Command, CommandMenu};
pub use config::EditorConfig;
pub use dom_sync::{
    build_html, extract, reconcile, CompositionState, DomSync, FocusPoll, FOCUS_RETRY_DELAY, MAX_FOCUS_ATTEMPTS,
};
pub use drag::{DragController, DropTarget, Rect};
pub use errors::EditorError;
pub use mutations::{reduce, Action, Applied, Focus, InsertPosition, MovePosition, MutationError, MutationResult};
pub use post_effects::{EnsureEditableRoot, PostEffect, PostEffectEngine, RemoveEmptyContainers, UnwrapSingleChildFlex};
pub use selection::{restore, save, selection_info, DomPoint, NativeRange, SavedSelection};
pub use session::{ChangeListener, EditorSession};
pub use surface::{MemorySurface, Surface};
pub use undo_stack::UndoStack;
pub use upload::{DefaultUploader, MediaFile, PendingUpload, UploadError, UploadOutcome, Uploader};

// Re-export document types for convenience
pub use folio_document::{Format, RunAttribute, SelectionInfo, SelectionRange, Snapshot};
