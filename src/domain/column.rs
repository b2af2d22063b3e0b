use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use super::board::BoardId;
use super::card::{Card, CardId};
use crate::error::{Result, TableroError};

/// Unique identifier for a column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnId(String);

impl ColumnId {
    /// Generates a fresh id for a locally created column
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ColumnId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ColumnId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ColumnId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered container of cards within a board
///
/// `card_order` is the authoritative display order. Invariant: it is
/// always a permutation of the key set of `cards`, and a column with
/// zero real cards holds exactly one placeholder card so it remains a
/// valid drop target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub title: String,
    pub card_order: Vec<CardId>,
    pub cards: HashMap<CardId, Card>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Column {
    /// Creates a new, empty column
    ///
    /// The caller (or [`crate::domain::Board::insert_column`]) is
    /// responsible for running the placeholder policy afterwards.
    pub fn new(id: ColumnId, board_id: BoardId, title: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            board_id,
            title,
            card_order: Vec::new(),
            cards: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the title
    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    /// Number of real cards (placeholders are never counted)
    pub fn card_count(&self) -> usize {
        self.cards.values().filter(|c| !c.placeholder).count()
    }

    /// Returns true if the column holds a placeholder card
    pub fn has_placeholder(&self) -> bool {
        self.cards.values().any(|c| c.placeholder)
    }

    /// Returns the card with the given id, if present
    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    /// Position of a real card in the display order
    pub fn card_position(&self, id: &CardId) -> Result<usize> {
        match self.cards.get(id) {
            Some(card) if !card.placeholder => {}
            _ => return Err(TableroError::CardNotFound(id.to_string())),
        }
        self.card_order
            .iter()
            .position(|c| c == id)
            .ok_or_else(|| TableroError::CardNotFound(id.to_string()))
    }

    /// Cards in display order
    pub fn ordered_cards(&self) -> impl Iterator<Item = &Card> {
        self.card_order.iter().filter_map(|id| self.cards.get(id))
    }

    /// Display order with placeholder ids stripped, as sent to the backend
    pub fn persisted_card_order(&self) -> Vec<CardId> {
        self.card_order
            .iter()
            .filter(|id| self.cards.get(id).is_some_and(|c| !c.placeholder))
            .cloned()
            .collect()
    }

    /// Inserts one placeholder card if the column has no real cards
    pub fn ensure_placeholder(&mut self) {
        if self.card_count() == 0 && !self.has_placeholder() {
            let card = Card::placeholder(&self.id);
            self.card_order.push(card.id.clone());
            self.cards.insert(card.id.clone(), card);
            self.updated_at = Utc::now();
        }
    }

    /// Removes any placeholder card from the order and the map
    pub fn strip_placeholder(&mut self) {
        let placeholder_ids: Vec<CardId> = self
            .cards
            .values()
            .filter(|c| c.placeholder)
            .map(|c| c.id.clone())
            .collect();
        if placeholder_ids.is_empty() {
            return;
        }
        for id in &placeholder_ids {
            self.cards.remove(id);
        }
        self.card_order.retain(|id| !placeholder_ids.contains(id));
        self.updated_at = Utc::now();
    }

    /// Appends a real card at the end of the order
    ///
    /// A placeholder standing in for the empty column is removed first.
    pub fn push_card(&mut self, card: Card) {
        let index = self.card_order.len();
        self.insert_card_at(card, index);
    }

    /// Inserts a real card at the given position, clamped to `[0, len]`
    ///
    /// A placeholder standing in for the empty column is removed first;
    /// the card's `column_id` is rewritten to this column.
    pub fn insert_card_at(&mut self, mut card: Card, index: usize) {
        self.strip_placeholder();
        card.column_id = self.id.clone();
        let index = index.min(self.card_order.len());
        self.card_order.insert(index, card.id.clone());
        self.cards.insert(card.id.clone(), card);
        self.updated_at = Utc::now();
    }

    /// Removes a real card and re-synthesizes a placeholder if the
    /// column empties
    pub fn take_card(&mut self, id: &CardId) -> Result<Card> {
        match self.cards.get(id) {
            Some(card) if !card.placeholder => {}
            _ => return Err(TableroError::CardNotFound(id.to_string())),
        }
        self.card_order.retain(|c| c != id);
        let card = self
            .cards
            .remove(id)
            .ok_or_else(|| TableroError::CardNotFound(id.to_string()))?;
        self.ensure_placeholder();
        self.updated_at = Utc::now();
        Ok(card)
    }

    /// Moves a real card to `to_index`, clamped to `[0, len - 1]`
    pub fn move_card(&mut self, id: &CardId, to_index: usize) -> Result<()> {
        let from = self.card_position(id)?;
        let to = to_index.min(self.card_order.len() - 1);
        if from == to {
            return Ok(());
        }
        let moved = self.card_order.remove(from);
        self.card_order.insert(to, moved);
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_with(ids: &[&str]) -> Column {
        let mut column = Column::new(
            ColumnId::from("col-1"),
            BoardId::from("board-1"),
            "Todo".to_string(),
        );
        for id in ids {
            column.push_card(Card::new(
                CardId::from(*id),
                column.id.clone(),
                format!("card {id}"),
            ));
        }
        column.ensure_placeholder();
        column
    }

    fn order_of(column: &Column) -> Vec<&str> {
        column.card_order.iter().map(|id| id.as_str()).collect()
    }

    fn assert_consistent(column: &Column) {
        // card_order is a permutation of the card map's key set
        assert_eq!(column.card_order.len(), column.cards.len());
        for id in &column.card_order {
            assert!(column.cards.contains_key(id));
        }
        // placeholder iff zero real cards, and at most one of them
        let placeholders = column.cards.values().filter(|c| c.placeholder).count();
        if column.card_count() == 0 {
            assert_eq!(placeholders, 1);
        } else {
            assert_eq!(placeholders, 0);
        }
    }

    #[test]
    fn test_empty_column_gets_exactly_one_placeholder() {
        let column = column_with(&[]);
        assert_eq!(column.card_count(), 0);
        assert!(column.has_placeholder());
        assert_eq!(order_of(&column), vec!["col-1-placeholder"]);
        assert_consistent(&column);
    }

    #[test]
    fn test_ensure_placeholder_is_idempotent() {
        let mut column = column_with(&[]);
        column.ensure_placeholder();
        column.ensure_placeholder();
        assert_eq!(column.card_order.len(), 1);
        assert_consistent(&column);
    }

    #[test]
    fn test_push_card_replaces_placeholder() {
        let mut column = column_with(&[]);
        column.push_card(Card::new(
            CardId::from("a"),
            column.id.clone(),
            "A".to_string(),
        ));

        assert_eq!(order_of(&column), vec!["a"]);
        assert!(!column.has_placeholder());
        assert_consistent(&column);
    }

    #[test]
    fn test_take_last_card_restores_placeholder() {
        let mut column = column_with(&["a"]);
        let card = column.take_card(&CardId::from("a")).unwrap();

        assert_eq!(card.id.as_str(), "a");
        assert_eq!(order_of(&column), vec!["col-1-placeholder"]);
        assert_consistent(&column);
    }

    #[test]
    fn test_card_count_excludes_placeholder() {
        let column = column_with(&[]);
        assert_eq!(column.card_count(), 0);
        assert_eq!(column.cards.len(), 1);
    }

    #[test]
    fn test_persisted_card_order_strips_placeholder() {
        let column = column_with(&[]);
        assert!(column.persisted_card_order().is_empty());

        let column = column_with(&["a", "b"]);
        let order = column.persisted_card_order();
        let ids: Vec<&str> = order.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_move_card_to_front() {
        // Dragging b to index 0 in [a, b, c] yields [b, a, c]
        let mut column = column_with(&["a", "b", "c"]);
        column.move_card(&CardId::from("b"), 0).unwrap();
        assert_eq!(order_of(&column), vec!["b", "a", "c"]);
        assert_consistent(&column);
    }

    #[test]
    fn test_move_card_clamps_past_the_end() {
        let mut column = column_with(&["a", "b", "c"]);
        column.move_card(&CardId::from("a"), 99).unwrap();
        assert_eq!(order_of(&column), vec!["b", "c", "a"]);
        assert_consistent(&column);
    }

    #[test]
    fn test_move_card_to_same_position_is_a_no_op() {
        let mut column = column_with(&["a", "b", "c"]);
        column.move_card(&CardId::from("b"), 1).unwrap();
        assert_eq!(order_of(&column), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_move_unknown_card_fails_without_mutation() {
        let mut column = column_with(&["a", "b"]);
        let before = column.clone();

        let err = column.move_card(&CardId::from("zz"), 0).unwrap_err();
        assert!(matches!(err, TableroError::CardNotFound(_)));
        assert_eq!(column, before);
    }

    #[test]
    fn test_placeholder_cannot_be_moved_or_taken() {
        let mut column = column_with(&[]);
        let placeholder_id = CardId::placeholder_for(&column.id);

        assert!(matches!(
            column.move_card(&placeholder_id, 0),
            Err(TableroError::CardNotFound(_))
        ));
        assert!(matches!(
            column.take_card(&placeholder_id),
            Err(TableroError::CardNotFound(_))
        ));
        assert_consistent(&column);
    }

    #[test]
    fn test_insert_card_at_clamps_index() {
        let mut column = column_with(&["a", "b"]);
        column.insert_card_at(
            Card::new(CardId::from("c"), column.id.clone(), "C".to_string()),
            99,
        );
        assert_eq!(order_of(&column), vec!["a", "b", "c"]);
        assert_consistent(&column);
    }

    #[test]
    fn test_insert_card_rewrites_owner() {
        let mut column = column_with(&[]);
        let stray = Card::new(
            CardId::from("x"),
            ColumnId::from("somewhere-else"),
            "X".to_string(),
        );
        column.insert_card_at(stray, 0);
        assert_eq!(column.card(&CardId::from("x")).unwrap().column_id, column.id);
    }

    #[test]
    fn test_never_both_placeholder_and_real_cards() {
        let mut column = column_with(&[]);
        for id in ["a", "b", "c"] {
            column.push_card(Card::new(
                CardId::from(id),
                column.id.clone(),
                id.to_string(),
            ));
            assert_consistent(&column);
        }
        for id in ["a", "b", "c"] {
            column.take_card(&CardId::from(id)).unwrap();
            assert_consistent(&column);
        }
        assert!(column.has_placeholder());
    }
}
