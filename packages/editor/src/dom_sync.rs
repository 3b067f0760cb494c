//! # Surface Synchronisation
//!
//! Keeps a [`Surface`] in step with the current snapshot.
//!
//! ```text
//!   snapshot ──build_html──▶ expected markup
//!                                │ differs from surface?
//!                                ▼
//!   save selection ─▶ set_markup ─▶ restore selection
//! ```
//!
//! Reconciliation is suspended while an input method is composing text and
//! in read-only mode. Ending a composition reconciles immediately.

use crate::mutations::{Action, Focus, TextCollector};
use crate::selection::{restore, save, SavedSelection};
use crate::surface::Surface;
use folio_compiler_html::{parse_inline, render_inline};
use folio_document::{Snapshot, TextNode};
use std::time::{Duration, Instant};

/// Delay unit between focus attempts; attempt `n` waits `n` units
pub const FOCUS_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Focus attempts before giving up
pub const MAX_FOCUS_ATTEMPTS: u32 = 5;

/// Inner markup a text node should have on the surface
pub fn build_html(text: &TextNode) -> String {
    if text.element_type.is_media() {
        String::new()
    } else {
        render_inline(&text.body)
    }
}

/// Patch every mounted text node whose markup diverged from `snapshot`.
///
/// The focused node keeps its selection across the patch. Returns the ids
/// that were rewritten.
pub fn reconcile(snapshot: &Snapshot, surface: &mut dyn Surface) -> Vec<String> {
    let focused = surface.focused_node();
    let mut patched = Vec::new();

    for text in TextCollector::collect(snapshot.root()) {
        if !surface.is_mounted(&text.id) {
            continue;
        }
        let expected = build_html(text);
        if surface.markup(&text.id).as_deref() == Some(expected.as_str()) {
            continue;
        }

        let saved = if focused.as_deref() == Some(text.id.as_str()) {
            surface
                .selection()
                .filter(|(id, _)| *id == text.id)
                .and_then(|(_, range)| save(&surface.text_segments(&text.id), &range))
        } else {
            None
        };

        surface.set_markup(&text.id, &expected);

        if let Some(saved) = saved {
            let range = restore(&surface.text_segments(&text.id), &saved);
            surface.set_selection(&text.id, range);
        }
        patched.push(text.id.clone());
    }

    if !patched.is_empty() {
        tracing::debug!(count = patched.len(), "reconciled surface");
    }
    patched
}

/// Read a node's markup back from the surface as an `UpdateContent` action
pub fn extract(surface: &dyn Surface, node_id: &str) -> Option<Action> {
    let markup = surface.markup(node_id)?;
    Some(Action::UpdateContent {
        node_id: node_id.to_string(),
        lines: parse_inline(&markup),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositionState {
    #[default]
    Idle,
    Composing,
}

#[derive(Debug, Clone)]
struct PendingFocus {
    target: Focus,
    attempts: u32,
    next_at: Instant,
}

/// Outcome of one focus poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusPoll {
    /// Nothing requested
    Idle,
    /// Not mounted yet; poll again later
    Waiting,
    Focused(Focus),
    GaveUp(Focus),
}

/// Reconciliation gate, composition tracking and focus retry for one surface
#[derive(Debug, Default)]
pub struct DomSync {
    composition: CompositionState,
    read_only: bool,
    pending_focus: Option<PendingFocus>,
}

impl DomSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn composition(&self) -> CompositionState {
        self.composition
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn composition_start(&mut self) {
        self.composition = CompositionState::Composing;
    }

    /// Leave composition and bring the surface up to date
    pub fn composition_end(&mut self, snapshot: &Snapshot, surface: &mut dyn Surface) -> Vec<String> {
        self.composition = CompositionState::Idle;
        self.reconcile(snapshot, surface)
    }

    /// Reconcile unless composing or read-only
    pub fn reconcile(&self, snapshot: &Snapshot, surface: &mut dyn Surface) -> Vec<String> {
        if self.read_only || self.composition == CompositionState::Composing {
            return Vec::new();
        }
        reconcile(snapshot, surface)
    }

    /// Ask for `target` to receive focus; replaces any earlier request
    pub fn request_focus(&mut self, target: Focus, now: Instant) {
        self.pending_focus = Some(PendingFocus {
            target,
            attempts: 0,
            next_at: now,
        });
    }

    pub fn has_pending_focus(&self) -> bool {
        self.pending_focus.is_some()
    }

    /// Try to satisfy the pending focus request.
    ///
    /// Attempt `n` that fails schedules the next one `FOCUS_RETRY_DELAY * n`
    /// later; after `MAX_FOCUS_ATTEMPTS` the request is dropped.
    pub fn poll_focus(&mut self, surface: &mut dyn Surface, now: Instant) -> FocusPoll {
        let Some(mut pending) = self.pending_focus.take() else {
            return FocusPoll::Idle;
        };
        if now < pending.next_at {
            self.pending_focus = Some(pending);
            return FocusPoll::Waiting;
        }

        let target = pending.target.clone();
        if surface.focus(&target.node_id) {
            let segments = surface.text_segments(&target.node_id);
            let range = restore(&segments, &SavedSelection::caret(target.offset));
            surface.set_selection(&target.node_id, range);
            return FocusPoll::Focused(target);
        }

        pending.attempts += 1;
        if pending.attempts >= MAX_FOCUS_ATTEMPTS {
            tracing::debug!(node = %target.node_id, attempts = pending.attempts, "focus target never mounted");
            return FocusPoll::GaveUp(target);
        }
        pending.next_at = now + FOCUS_RETRY_DELAY * pending.attempts;
        self.pending_focus = Some(pending);
        FocusPoll::Waiting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{DomPoint, NativeRange};
    use crate::surface::MemorySurface;
    use folio_document::{ContainerNode, InlineRun, TextNode};

    fn snapshot() -> Snapshot {
        Snapshot::new(ContainerNode::new("root").with_children(vec![
            TextNode::paragraph("a", "").with_runs(vec![InlineRun::plain("hello "), InlineRun::plain("world").bold()]).into(),
            TextNode::paragraph("b", "plain").into(),
        ]))
    }

    fn mounted(snapshot: &Snapshot) -> MemorySurface {
        let mut surface = MemorySurface::new();
        for text in TextCollector::collect(snapshot.root()) {
            surface.mount(text.id.clone(), build_html(text));
        }
        surface
    }

    #[test]
    fn test_reconcile_only_patches_divergent_nodes() {
        let snap = snapshot();
        let mut surface = mounted(&snap);
        assert!(reconcile(&snap, &mut surface).is_empty());

        surface.type_markup("b", "plainX");
        assert_eq!(reconcile(&snap, &mut surface), vec!["b".to_string()]);
        assert_eq!(surface.markup("b").as_deref(), Some("plain"));
        assert_eq!(surface.write_count(), 1);
    }

    #[test]
    fn test_reconcile_keeps_caret_of_focused_node() {
        let snap = snapshot();
        let mut surface = mounted(&snap);
        surface.type_markup("a", "hello world");
        surface.focus("a");
        surface.set_selection("a", NativeRange::collapsed(DomPoint::new(0, 8)));

        reconcile(&snap, &mut surface);

        let (_, range) = surface.selection().unwrap();
        assert_eq!(range.start, DomPoint::new(1, 2));
    }

    #[test]
    fn test_no_reconcile_while_composing() {
        let snap = snapshot();
        let mut surface = mounted(&snap);
        let mut sync = DomSync::new();

        sync.composition_start();
        surface.type_markup("b", "plainか");
        assert!(sync.reconcile(&snap, &mut surface).is_empty());

        assert_eq!(sync.composition_end(&snap, &mut surface), vec!["b".to_string()]);
        assert_eq!(sync.composition(), CompositionState::Idle);
    }

    #[test]
    fn test_read_only_disables_reconcile() {
        let snap = snapshot();
        let mut surface = mounted(&snap);
        let mut sync = DomSync::new();
        sync.set_read_only(true);
        surface.type_markup("b", "changed");
        assert!(sync.reconcile(&snap, &mut surface).is_empty());
    }

    #[test]
    fn test_extract_reads_runs() {
        let mut surface = MemorySurface::new();
        surface.mount("a", "x<em>y</em>");
        match extract(&surface, "a") {
            Some(Action::UpdateContent { node_id, lines }) => {
                assert_eq!(node_id, "a");
                assert_eq!(lines[0].runs.len(), 2);
                assert!(lines[0].runs[1].italic);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(extract(&surface, "missing").is_none());
    }

    #[test]
    fn test_focus_retry_backs_off_then_gives_up() {
        let mut surface = MemorySurface::new();
        let mut sync = DomSync::new();
        let start = Instant::now();
        sync.request_focus(Focus::new("late", 0), start);

        // First attempt fails, next one is one delay unit away
        assert_eq!(sync.poll_focus(&mut surface, start), FocusPoll::Waiting);
        assert_eq!(sync.poll_focus(&mut surface, start), FocusPoll::Waiting);

        let mut now = start + FOCUS_RETRY_DELAY;
        for attempt in 2..MAX_FOCUS_ATTEMPTS {
            assert_eq!(sync.poll_focus(&mut surface, now), FocusPoll::Waiting);
            now += FOCUS_RETRY_DELAY * attempt;
        }
        assert_eq!(sync.poll_focus(&mut surface, now), FocusPoll::GaveUp(Focus::new("late", 0)));
        assert_eq!(sync.poll_focus(&mut surface, now), FocusPoll::Idle);
    }

    #[test]
    fn test_focus_succeeds_once_mounted() {
        let mut surface = MemorySurface::new();
        let mut sync = DomSync::new();
        let start = Instant::now();
        sync.request_focus(Focus::new("a", 2), start);
        assert_eq!(sync.poll_focus(&mut surface, start), FocusPoll::Waiting);

        surface.mount("a", "abc");
        let later = start + FOCUS_RETRY_DELAY;
        assert_eq!(sync.poll_focus(&mut surface, later), FocusPoll::Focused(Focus::new("a", 2)));
        assert_eq!(surface.selection().unwrap().1.start, DomPoint::new(0, 2));
    }
}
