//! Transient state for one pick-up-to-drop gesture.

use crate::domain::{Board, BoardId, CardId, ColumnId};
use crate::geometry::Point;

/// The item a gesture picked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragItem {
    Column(ColumnId),
    Card(CardId),
}

/// Container an item belongs to: the board for a column, a column for
/// a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerId {
    Board(BoardId),
    Column(ColumnId),
}

/// Phase of the gesture.
///
/// `Pending` is armed but below the activation threshold, so an
/// ordinary click never disturbs the order. There is no explicit idle
/// variant: no session means no gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Pending,
    Dragging,
}

/// One drag gesture from pointer-down to drop or cancel.
///
/// The session captures the pre-drag board the moment the gesture
/// activates; that snapshot is the sole rollback source for
/// cancellation and failed persistence. A session never outlives its
/// gesture.
#[derive(Debug)]
pub struct DragSession {
    pub item: DragItem,
    pub source: ContainerId,
    /// Pointer position at gesture start, used for overlap tie-breaks.
    pub origin: Point,
    pub phase: DragPhase,
    pub current_over: Option<ContainerId>,
    /// Board as it was before the first live reorder.
    pub snapshot: Option<Board>,
}

impl DragSession {
    /// Distance in pixels the pointer must travel before the gesture
    /// activates.
    pub const ACTIVATION_THRESHOLD: f32 = 4.0;

    /// Arms a new gesture at the given pointer position.
    pub fn new(item: DragItem, source: ContainerId, origin: Point) -> Self {
        Self {
            item,
            source,
            origin,
            phase: DragPhase::Pending,
            current_over: None,
            snapshot: None,
        }
    }

    /// True once the pointer has moved far enough to start dragging.
    pub fn past_threshold(&self, pointer: Point) -> bool {
        self.origin.distance_to(pointer) >= Self::ACTIVATION_THRESHOLD
    }

    /// Activates the gesture, keeping the pre-drag board for rollback.
    pub fn activate(&mut self, snapshot: Board) {
        self.phase = DragPhase::Dragging;
        self.snapshot = Some(snapshot);
    }

    /// True while live reordering is in effect.
    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }
}
