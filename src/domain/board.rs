use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use super::card::{Card, CardId};
use super::column::{Column, ColumnId};
use crate::error::{Result, TableroError};

/// Unique identifier for a board
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardId(String);

impl BoardId {
    /// Generates a fresh id for a locally created board
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BoardId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for BoardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BoardId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical in-memory board tree
///
/// The board exclusively owns its columns and each column exclusively
/// owns its cards; `column_order` is the authoritative display order.
/// All order changes go through the primitives below, which never drop
/// or duplicate ids: after any operation `column_order` is a
/// permutation of the live column ids, and each column's `card_order`
/// is a permutation of its live card ids (at most one of which is a
/// placeholder).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub column_order: Vec<ColumnId>,
    pub columns: HashMap<ColumnId, Column>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Creates a new board with no columns
    pub fn new(id: BoardId, title: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            column_order: Vec::new(),
            columns: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the title
    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    /// Runs the placeholder policy over every column
    ///
    /// Called once after a board arrives from the backend, which knows
    /// nothing about placeholders.
    pub fn normalize(&mut self) {
        for column in self.columns.values_mut() {
            if column.card_count() == 0 {
                column.ensure_placeholder();
            } else {
                column.strip_placeholder();
            }
        }
    }

    /// Returns the column with the given id
    pub fn column(&self, id: &ColumnId) -> Result<&Column> {
        self.columns
            .get(id)
            .ok_or_else(|| TableroError::ColumnNotFound(id.to_string()))
    }

    /// Returns the column with the given id, mutably
    pub fn column_mut(&mut self, id: &ColumnId) -> Result<&mut Column> {
        self.columns
            .get_mut(id)
            .ok_or_else(|| TableroError::ColumnNotFound(id.to_string()))
    }

    /// Position of a column in the display order
    pub fn column_position(&self, id: &ColumnId) -> Result<usize> {
        self.column_order
            .iter()
            .position(|c| c == id)
            .ok_or_else(|| TableroError::ColumnNotFound(id.to_string()))
    }

    /// Columns in display order
    pub fn ordered_columns(&self) -> impl Iterator<Item = &Column> {
        self.column_order.iter().filter_map(|id| self.columns.get(id))
    }

    /// Finds the column owning a real card
    pub fn column_of_card(&self, card_id: &CardId) -> Option<&ColumnId> {
        self.columns
            .values()
            .find(|col| col.card(card_id).is_some_and(|c| !c.placeholder))
            .map(|col| &col.id)
    }

    /// Looks up a real card anywhere on the board
    pub fn card(&self, card_id: &CardId) -> Result<&Card> {
        self.columns
            .values()
            .find_map(|col| col.card(card_id).filter(|c| !c.placeholder))
            .ok_or_else(|| TableroError::CardNotFound(card_id.to_string()))
    }

    /// Appends a column at the end of the display order
    ///
    /// The column gets its placeholder if it arrives empty.
    pub fn insert_column(&mut self, mut column: Column) {
        column.board_id = self.id.clone();
        column.ensure_placeholder();
        self.column_order.push(column.id.clone());
        self.columns.insert(column.id.clone(), column);
        self.updated_at = Utc::now();
    }

    /// Removes a column and all of its cards
    ///
    /// Returns the removed column together with its old position so a
    /// failed remote delete can restore it.
    pub fn remove_column(&mut self, id: &ColumnId) -> Result<(Column, usize)> {
        let position = self.column_position(id)?;
        let column = self
            .columns
            .remove(id)
            .ok_or_else(|| TableroError::ColumnNotFound(id.to_string()))?;
        self.column_order.remove(position);
        self.updated_at = Utc::now();
        Ok((column, position))
    }

    /// Puts a removed column back at its old position
    pub fn restore_column(&mut self, column: Column, position: usize) {
        let position = position.min(self.column_order.len());
        self.column_order.insert(position, column.id.clone());
        self.columns.insert(column.id.clone(), column);
        self.updated_at = Utc::now();
    }

    /// Moves a column to `to_index`, clamped to `[0, len - 1]`
    pub fn move_column(&mut self, id: &ColumnId, to_index: usize) -> Result<()> {
        let from = self.column_position(id)?;
        let to = to_index.min(self.column_order.len() - 1);
        if from == to {
            return Ok(());
        }
        let moved = self.column_order.remove(from);
        self.column_order.insert(to, moved);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Moves a card within one column, `to_index` clamped to `[0, len - 1]`
    pub fn move_card_within(
        &mut self,
        column_id: &ColumnId,
        card_id: &CardId,
        to_index: usize,
    ) -> Result<()> {
        self.column_mut(column_id)?.move_card(card_id, to_index)
    }

    /// Moves a card from one column to another, inserting at `to_index`
    /// clamped to `[0, dest_len]`
    ///
    /// The card's owner is rewritten atomically; a destination
    /// placeholder is removed before the insert and the source gains a
    /// placeholder if it empties. Nothing is mutated when any id is
    /// stale.
    pub fn move_card_across(
        &mut self,
        from: &ColumnId,
        to: &ColumnId,
        card_id: &CardId,
        to_index: usize,
    ) -> Result<()> {
        if from == to {
            return self.move_card_within(from, card_id, to_index);
        }

        // Validate both endpoints before touching anything
        if !self.columns.contains_key(to) {
            return Err(TableroError::ColumnNotFound(to.to_string()));
        }
        self.column(from)?.card_position(card_id)?;

        let card = self.column_mut(from)?.take_card(card_id)?;
        self.column_mut(to)?.insert_card_at(card, to_index);
        self.updated_at = Utc::now();
        Ok(())
    }
}
