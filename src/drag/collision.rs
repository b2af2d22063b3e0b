//! Drop-target resolution for drag gestures.
//!
//! Given the dragged item's current rectangle and the rectangles the
//! rendering layer reports for columns and card slots, these functions
//! decide which container is under the drag and where the item would
//! be inserted. They are pure so every overlap rule can be pinned down
//! in tests.

use crate::domain::{CardId, ColumnId};
use crate::geometry::{Point, Rect};

/// Rectangle of a single rendered slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRect<Id> {
    pub id: Id,
    pub rect: Rect,
}

impl<Id> SlotRect<Id> {
    pub fn new(id: Id, rect: Rect) -> Self {
        Self { id, rect }
    }
}

/// A column's drop surface as the rendering layer sees it.
///
/// `card_slots` holds the real cards in display order. An empty column
/// reports no slots; its placeholder surface is the column rectangle
/// itself.
#[derive(Debug, Clone, PartialEq)]
pub struct DropZone {
    pub column_id: ColumnId,
    pub rect: Rect,
    pub card_slots: Vec<SlotRect<CardId>>,
}

impl DropZone {
    pub fn new(column_id: ColumnId, rect: Rect, card_slots: Vec<SlotRect<CardId>>) -> Self {
        Self {
            column_id,
            rect,
            card_slots,
        }
    }
}

/// Resolved target for a dragged card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDropTarget {
    pub column_id: ColumnId,
    pub index: usize,
}

/// Picks the column under a dragged card and the insertion index inside it.
///
/// The container is the zone sharing the greatest area with the dragged
/// rectangle; an exact tie breaks toward the zone whose center is
/// nearest `origin`, the pointer position at gesture start. Returns
/// `None` when the dragged rectangle overlaps no zone at all.
///
/// Within the winning zone the index is found by comparing the dragged
/// center against sibling midpoints along the vertical axis: the card
/// goes before the first sibling whose midpoint lies below it. The
/// dragged card's own slot never counts as a sibling, and a column with
/// no real cards always yields index 0.
pub fn resolve_card_drop(
    dragged: Rect,
    origin: Point,
    dragged_id: &CardId,
    zones: &[DropZone],
) -> Option<CardDropTarget> {
    let zone = pick_zone(dragged, origin, zones)?;
    let index = insertion_index(
        dragged.center().y,
        zone.card_slots
            .iter()
            .filter(|slot| &slot.id != dragged_id)
            .map(|slot| slot.rect.center().y),
    );
    Some(CardDropTarget {
        column_id: zone.column_id.clone(),
        index,
    })
}

/// Picks the insertion index for a dragged column among its siblings.
///
/// Same midpoint rule as cards, along the horizontal axis. Returns
/// `None` when no other column is on the board.
pub fn resolve_column_index(
    dragged: Rect,
    dragged_id: &ColumnId,
    zones: &[DropZone],
) -> Option<usize> {
    let mut siblings = zones
        .iter()
        .filter(|zone| &zone.column_id != dragged_id)
        .peekable();
    siblings.peek()?;
    Some(insertion_index(
        dragged.center().x,
        siblings.map(|zone| zone.rect.center().x),
    ))
}

/// Greatest-overlap container resolution with the deterministic
/// tie-break.
fn pick_zone<'a>(dragged: Rect, origin: Point, zones: &'a [DropZone]) -> Option<&'a DropZone> {
    let mut best: Option<(&DropZone, f32, f32)> = None;
    for zone in zones {
        let area = dragged.overlap_area(&zone.rect);
        if area <= 0.0 {
            continue;
        }
        let distance = zone.rect.center().distance_to(origin);
        let better = match best {
            None => true,
            Some((_, best_area, best_distance)) => {
                area > best_area || (area == best_area && distance < best_distance)
            }
        };
        if better {
            best = Some((zone, area, distance));
        }
    }
    best.map(|(zone, _, _)| zone)
}

/// Index of the first sibling whose midpoint lies past `center` on the
/// primary axis; past the last sibling otherwise.
fn insertion_index(center: f32, midpoints: impl Iterator<Item = f32>) -> usize {
    let mut index = 0;
    for midpoint in midpoints {
        if midpoint > center {
            return index;
        }
        index += 1;
    }
    index
}
