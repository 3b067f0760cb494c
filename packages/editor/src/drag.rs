//! Drag-to-reorder.
//!
//! The controller only tracks which node is being dragged and where it
//! would land. Dropping produces a plain [`Action::Move`]; nothing here is
//! recorded in history.

use crate::mutations::{Action, MovePosition};
use folio_document::{tree, Snapshot};
use serde::{Deserialize, Serialize};

/// Bounding box of a target on screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    fn fraction(start: f64, extent: f64, pointer: f64) -> f64 {
        if extent <= 0.0 {
            0.0
        } else {
            ((pointer - start) / extent).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTarget {
    pub target_id: String,
    pub position: MovePosition,
}

#[derive(Debug, Default)]
pub struct DragController {
    dragged: Option<String>,
    target: Option<DropTarget>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_start(&mut self, node_id: impl Into<String>) {
        self.dragged = Some(node_id.into());
        self.target = None;
    }

    pub fn dragged(&self) -> Option<&str> {
        self.dragged.as_deref()
    }

    pub fn target(&self) -> Option<&DropTarget> {
        self.target.as_ref()
    }

    /// Work out where the dragged node would land over `target_id`.
    ///
    /// Flex groups and their children split horizontally into left/right;
    /// everything else splits vertically into before/after. Hovering the
    /// dragged node or anything inside it gives no target.
    pub fn drag_over(&mut self, snapshot: &Snapshot, target_id: &str, rect: Rect, pointer: (f64, f64)) -> Option<&DropTarget> {
        self.target = None;
        let dragged = self.dragged.as_deref()?;
        let dragged_node = snapshot.find(dragged)?;
        let target = snapshot.find(target_id)?;
        if tree::contains(dragged_node, target_id) {
            return None;
        }

        let in_flex = target.is_flex()
            || tree::parent_of(snapshot.root(), target_id).is_some_and(|(parent, _)| parent.is_flex());

        let position = if in_flex {
            if Rect::fraction(rect.x, rect.width, pointer.0) < 0.5 {
                MovePosition::Left
            } else {
                MovePosition::Right
            }
        } else if Rect::fraction(rect.y, rect.height, pointer.1) < 0.5 {
            MovePosition::Before
        } else {
            MovePosition::After
        };

        self.target = Some(DropTarget {
            target_id: target_id.to_string(),
            position,
        });
        self.target.as_ref()
    }

    /// Finish the drag, yielding the move to dispatch if there is a target
    pub fn drop_action(&mut self) -> Option<Action> {
        let dragged = self.dragged.take()?;
        let target = self.target.take()?;
        Some(Action::Move {
            node_id: dragged,
            target_id: target.target_id,
            position: target.position,
        })
    }

    pub fn cancel(&mut self) {
        self.dragged = None;
        self.target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_document::{keys, Attributes, ContainerNode, ElementType, TextNode};

    fn snapshot() -> Snapshot {
        let flex = ContainerNode::new("flex")
            .with_attributes(Attributes::new().with(keys::LAYOUT_TYPE, "flex"))
            .with_children(vec![
                TextNode::new("i1", ElementType::Img).into(),
                TextNode::new("i2", ElementType::Img).into(),
            ]);
        Snapshot::new(ContainerNode::new("root").with_children(vec![
            TextNode::paragraph("a", "A").into(),
            TextNode::paragraph("b", "B").into(),
            flex.into(),
        ]))
    }

    #[test]
    fn test_vertical_halves() {
        let snap = snapshot();
        let mut drag = DragController::new();
        drag.drag_start("a");
        let rect = Rect::new(0.0, 100.0, 200.0, 40.0);

        let over = drag.drag_over(&snap, "b", rect, (10.0, 110.0)).cloned();
        assert_eq!(over.map(|t| t.position), Some(MovePosition::Before));

        drag.drag_over(&snap, "b", rect, (10.0, 130.0));
        assert_eq!(
            drag.drop_action(),
            Some(Action::Move {
                node_id: "a".into(),
                target_id: "b".into(),
                position: MovePosition::After,
            })
        );
        assert!(drag.dragged().is_none());
    }

    #[test]
    fn test_flex_targets_use_horizontal_halves() {
        let snap = snapshot();
        let mut drag = DragController::new();
        drag.drag_start("a");
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);

        let pos = drag.drag_over(&snap, "i2", rect, (80.0, 10.0)).map(|t| t.position);
        assert_eq!(pos, Some(MovePosition::Right));
        let pos = drag.drag_over(&snap, "flex", rect, (20.0, 90.0)).map(|t| t.position);
        assert_eq!(pos, Some(MovePosition::Left));
    }

    #[test]
    fn test_no_target_inside_dragged_subtree() {
        let snap = snapshot();
        let mut drag = DragController::new();
        drag.drag_start("flex");
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(drag.drag_over(&snap, "i1", rect, (1.0, 1.0)).is_none());
        assert!(drag.drag_over(&snap, "flex", rect, (1.0, 1.0)).is_none());
        assert!(drag.drop_action().is_none());
    }
}
