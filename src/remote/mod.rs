use crate::domain::{BoardId, Card, CardId, Column, ColumnId};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod memory;
pub mod reconcile;

pub use memory::InMemoryGateway;
pub use reconcile::{PersistChange, PersistRequest, PersistScope, ReconcileOutcome, ReorderLedger};

/// New card order for one column affected by a move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnCardOrder {
    pub column_id: ColumnId,
    pub card_order: Vec<CardId>,
}

/// Result of a cascading column delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub deleted: bool,
}

/// Remote contract for board mutations
///
/// The engine applies every change locally first and treats these
/// calls as fire-and-forget apart from their success/failure signal,
/// which drives rollback. Card orders in payloads never contain
/// placeholder ids.
#[async_trait]
pub trait BoardGateway: Send + Sync {
    /// Creates a card at the end of a column
    async fn create_card(&self, column_id: &ColumnId, title: &str) -> Result<Card>;

    /// Creates an empty column at the end of a board
    async fn create_column(&self, board_id: &BoardId, title: &str) -> Result<Column>;

    /// Replaces a board's column order
    async fn update_column_order(&self, board_id: &BoardId, column_order: &[ColumnId])
        -> Result<()>;

    /// Replaces one column's card order (same-column reorder)
    async fn update_card_order(&self, column_id: &ColumnId, card_order: &[CardId]) -> Result<()>;

    /// Reassigns a card to a new column and replaces the card order of
    /// every affected column in one call
    async fn update_card_order_and_owner(
        &self,
        card_id: &CardId,
        new_column_id: &ColumnId,
        orders: &[ColumnCardOrder],
    ) -> Result<()>;

    /// Deletes a column and all of its cards
    async fn delete_column(&self, column_id: &ColumnId) -> Result<DeleteResult>;

    /// Renames a column
    async fn update_column_title(&self, column_id: &ColumnId, title: &str) -> Result<()>;
}
