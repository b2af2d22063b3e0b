//! In-memory gateway, the reference implementation of [`BoardGateway`].
//!
//! Plays the backend's role for demos and tests: flat records keyed by
//! id, cascading deletes, and the same validation the real API
//! performs. State lives behind an async mutex so the gateway can be
//! shared across tasks.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Board, BoardId, Card, CardId, Column, ColumnId};
use crate::error::{Result, TableroError};

use super::{BoardGateway, ColumnCardOrder, DeleteResult};

#[derive(Debug, Clone)]
struct ColumnRecord {
    board_id: BoardId,
    title: String,
    card_order: Vec<CardId>,
}

#[derive(Debug, Default)]
struct GatewayState {
    column_orders: HashMap<BoardId, Vec<ColumnId>>,
    columns: HashMap<ColumnId, ColumnRecord>,
    cards: HashMap<CardId, Card>,
}

/// In-memory board backend.
pub struct InMemoryGateway {
    state: Mutex<GatewayState>,
}

impl InMemoryGateway {
    /// Creates an empty gateway
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GatewayState::default()),
        }
    }

    /// Creates a gateway pre-loaded with a board's current contents
    ///
    /// Placeholder cards are not part of the backend's world and are
    /// skipped.
    pub fn with_board(board: &Board) -> Self {
        let mut state = GatewayState::default();
        state
            .column_orders
            .insert(board.id.clone(), board.column_order.clone());
        for column in board.columns.values() {
            state.columns.insert(
                column.id.clone(),
                ColumnRecord {
                    board_id: column.board_id.clone(),
                    title: column.title.clone(),
                    card_order: column.persisted_card_order(),
                },
            );
            for card in column.cards.values().filter(|c| !c.placeholder) {
                state.cards.insert(card.id.clone(), card.clone());
            }
        }
        Self {
            state: Mutex::new(state),
        }
    }

    /// Card order stored for a column, for assertions in tests
    pub async fn stored_card_order(&self, column_id: &ColumnId) -> Option<Vec<CardId>> {
        let state = self.state.lock().await;
        state.columns.get(column_id).map(|c| c.card_order.clone())
    }

    /// Column order stored for a board, for assertions in tests
    pub async fn stored_column_order(&self, board_id: &BoardId) -> Option<Vec<ColumnId>> {
        let state = self.state.lock().await;
        state.column_orders.get(board_id).cloned()
    }

    /// Owning column stored for a card, for assertions in tests
    pub async fn stored_owner(&self, card_id: &CardId) -> Option<ColumnId> {
        let state = self.state.lock().await;
        state.cards.get(card_id).map(|c| c.column_id.clone())
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn require_title(title: &str, what: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(TableroError::Validation(format!(
            "{what} title must not be empty"
        )));
    }
    Ok(())
}

#[async_trait]
impl BoardGateway for InMemoryGateway {
    async fn create_card(&self, column_id: &ColumnId, title: &str) -> Result<Card> {
        require_title(title, "card")?;
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let record = state
            .columns
            .get_mut(column_id)
            .ok_or_else(|| TableroError::ColumnNotFound(column_id.to_string()))?;

        let card = Card::new(CardId::new(), column_id.clone(), title.trim().to_string());
        record.card_order.push(card.id.clone());
        state.cards.insert(card.id.clone(), card.clone());
        Ok(card)
    }

    async fn create_column(&self, board_id: &BoardId, title: &str) -> Result<Column> {
        require_title(title, "column")?;
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let order = state
            .column_orders
            .get_mut(board_id)
            .ok_or_else(|| TableroError::BoardNotFound(board_id.to_string()))?;

        let column = Column::new(ColumnId::new(), board_id.clone(), title.trim().to_string());
        order.push(column.id.clone());
        state.columns.insert(
            column.id.clone(),
            ColumnRecord {
                board_id: board_id.clone(),
                title: column.title.clone(),
                card_order: Vec::new(),
            },
        );
        Ok(column)
    }

    async fn update_column_order(
        &self,
        board_id: &BoardId,
        column_order: &[ColumnId],
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let stored = state
            .column_orders
            .get_mut(board_id)
            .ok_or_else(|| TableroError::BoardNotFound(board_id.to_string()))?;

        let mut expected: Vec<&ColumnId> = stored.iter().collect();
        let mut proposed: Vec<&ColumnId> = column_order.iter().collect();
        expected.sort_by_key(|id| id.as_str().to_string());
        proposed.sort_by_key(|id| id.as_str().to_string());
        if expected != proposed {
            return Err(TableroError::Validation(
                "column order does not match the board's columns".to_string(),
            ));
        }

        *stored = column_order.to_vec();
        Ok(())
    }

    async fn update_card_order(&self, column_id: &ColumnId, card_order: &[CardId]) -> Result<()> {
        let mut state = self.state.lock().await;
        let record = state
            .columns
            .get_mut(column_id)
            .ok_or_else(|| TableroError::ColumnNotFound(column_id.to_string()))?;

        let mut expected: Vec<&CardId> = record.card_order.iter().collect();
        let mut proposed: Vec<&CardId> = card_order.iter().collect();
        expected.sort_by_key(|id| id.as_str().to_string());
        proposed.sort_by_key(|id| id.as_str().to_string());
        if expected != proposed {
            return Err(TableroError::Validation(
                "card order does not match the column's cards".to_string(),
            ));
        }

        record.card_order = card_order.to_vec();
        Ok(())
    }

    async fn update_card_order_and_owner(
        &self,
        card_id: &CardId,
        new_column_id: &ColumnId,
        orders: &[ColumnCardOrder],
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.cards.contains_key(card_id) {
            return Err(TableroError::CardNotFound(card_id.to_string()));
        }
        for order in orders {
            if !state.columns.contains_key(&order.column_id) {
                return Err(TableroError::ColumnNotFound(order.column_id.to_string()));
            }
            for id in &order.card_order {
                if !state.cards.contains_key(id) {
                    return Err(TableroError::CardNotFound(id.to_string()));
                }
            }
        }
        if !state.columns.contains_key(new_column_id) {
            return Err(TableroError::ColumnNotFound(new_column_id.to_string()));
        }

        if let Some(card) = state.cards.get_mut(card_id) {
            card.column_id = new_column_id.clone();
        }
        for order in orders {
            if let Some(record) = state.columns.get_mut(&order.column_id) {
                record.card_order = order.card_order.clone();
            }
        }
        Ok(())
    }

    async fn delete_column(&self, column_id: &ColumnId) -> Result<DeleteResult> {
        let mut state = self.state.lock().await;
        let record = state
            .columns
            .remove(column_id)
            .ok_or_else(|| TableroError::ColumnNotFound(column_id.to_string()))?;

        if let Some(order) = state.column_orders.get_mut(&record.board_id) {
            order.retain(|id| id != column_id);
        }
        state.cards.retain(|_, card| &card.column_id != column_id);
        Ok(DeleteResult { deleted: true })
    }

    async fn update_column_title(&self, column_id: &ColumnId, title: &str) -> Result<()> {
        require_title(title, "column")?;
        let mut state = self.state.lock().await;
        let record = state
            .columns
            .get_mut(column_id)
            .ok_or_else(|| TableroError::ColumnNotFound(column_id.to_string()))?;
        record.title = title.trim().to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_board() -> Board {
        let mut board = Board::new(BoardId::from("board-1"), "Sprint".to_string());
        for (column_id, cards) in [("C1", vec!["a", "b"]), ("C2", vec![])] {
            let mut column = Column::new(
                ColumnId::from(column_id),
                board.id.clone(),
                column_id.to_string(),
            );
            for card_id in cards {
                column.push_card(Card::new(
                    CardId::from(card_id),
                    column.id.clone(),
                    card_id.to_string(),
                ));
            }
            board.insert_column(column);
        }
        board
    }

    #[tokio::test]
    async fn test_with_board_skips_placeholders() {
        let gateway = InMemoryGateway::with_board(&seeded_board());

        let order = gateway
            .stored_card_order(&ColumnId::from("C2"))
            .await
            .unwrap();
        assert!(order.is_empty());

        let order = gateway
            .stored_card_order(&ColumnId::from("C1"))
            .await
            .unwrap();
        assert_eq!(order, vec![CardId::from("a"), CardId::from("b")]);
    }

    #[tokio::test]
    async fn test_create_card_requires_title() {
        let gateway = InMemoryGateway::with_board(&seeded_board());
        let err = gateway
            .create_card(&ColumnId::from("C1"), "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, TableroError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_card_appends_to_order() {
        let gateway = InMemoryGateway::with_board(&seeded_board());
        let card = gateway
            .create_card(&ColumnId::from("C1"), "New card")
            .await
            .unwrap();

        let order = gateway
            .stored_card_order(&ColumnId::from("C1"))
            .await
            .unwrap();
        assert_eq!(order.len(), 3);
        assert_eq!(order[2], card.id);
        assert_eq!(gateway.stored_owner(&card.id).await, Some(ColumnId::from("C1")));
    }

    #[tokio::test]
    async fn test_create_card_in_unknown_column_fails() {
        let gateway = InMemoryGateway::new();
        let err = gateway
            .create_card(&ColumnId::from("nope"), "Card")
            .await
            .unwrap_err();
        assert!(matches!(err, TableroError::ColumnNotFound(_)));
    }

    #[tokio::test]
    async fn test_update_card_order_accepts_permutations_only() {
        let gateway = InMemoryGateway::with_board(&seeded_board());
        let column_id = ColumnId::from("C1");

        gateway
            .update_card_order(&column_id, &[CardId::from("b"), CardId::from("a")])
            .await
            .unwrap();
        assert_eq!(
            gateway.stored_card_order(&column_id).await.unwrap(),
            vec![CardId::from("b"), CardId::from("a")]
        );

        // Dropping a card is not a permutation
        let err = gateway
            .update_card_order(&column_id, &[CardId::from("a")])
            .await
            .unwrap_err();
        assert!(matches!(err, TableroError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_card_order_and_owner_moves_card() {
        let gateway = InMemoryGateway::with_board(&seeded_board());
        let card_id = CardId::from("a");

        gateway
            .update_card_order_and_owner(
                &card_id,
                &ColumnId::from("C2"),
                &[
                    ColumnCardOrder {
                        column_id: ColumnId::from("C1"),
                        card_order: vec![CardId::from("b")],
                    },
                    ColumnCardOrder {
                        column_id: ColumnId::from("C2"),
                        card_order: vec![card_id.clone()],
                    },
                ],
            )
            .await
            .unwrap();

        assert_eq!(gateway.stored_owner(&card_id).await, Some(ColumnId::from("C2")));
        assert_eq!(
            gateway.stored_card_order(&ColumnId::from("C1")).await.unwrap(),
            vec![CardId::from("b")]
        );
        assert_eq!(
            gateway.stored_card_order(&ColumnId::from("C2")).await.unwrap(),
            vec![card_id]
        );
    }

    #[tokio::test]
    async fn test_update_column_order_validates_membership() {
        let gateway = InMemoryGateway::with_board(&seeded_board());
        let board_id = BoardId::from("board-1");

        gateway
            .update_column_order(&board_id, &[ColumnId::from("C2"), ColumnId::from("C1")])
            .await
            .unwrap();
        assert_eq!(
            gateway.stored_column_order(&board_id).await.unwrap(),
            vec![ColumnId::from("C2"), ColumnId::from("C1")]
        );

        let err = gateway
            .update_column_order(&board_id, &[ColumnId::from("C1")])
            .await
            .unwrap_err();
        assert!(matches!(err, TableroError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_column_cascades_cards() {
        let gateway = InMemoryGateway::with_board(&seeded_board());
        let result = gateway.delete_column(&ColumnId::from("C1")).await.unwrap();
        assert!(result.deleted);

        assert!(gateway.stored_card_order(&ColumnId::from("C1")).await.is_none());
        assert!(gateway.stored_owner(&CardId::from("a")).await.is_none());
        assert!(gateway.stored_owner(&CardId::from("b")).await.is_none());
        assert_eq!(
            gateway
                .stored_column_order(&BoardId::from("board-1"))
                .await
                .unwrap(),
            vec![ColumnId::from("C2")]
        );
    }

    #[tokio::test]
    async fn test_create_column_appends_to_board() {
        let gateway = InMemoryGateway::with_board(&seeded_board());
        let column = gateway
            .create_column(&BoardId::from("board-1"), "Done")
            .await
            .unwrap();

        let order = gateway
            .stored_column_order(&BoardId::from("board-1"))
            .await
            .unwrap();
        assert_eq!(order.last(), Some(&column.id));
        assert!(gateway.stored_card_order(&column.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_column_title() {
        let gateway = InMemoryGateway::with_board(&seeded_board());
        gateway
            .update_column_title(&ColumnId::from("C1"), "Renamed")
            .await
            .unwrap();

        let err = gateway
            .update_column_title(&ColumnId::from("C1"), "")
            .await
            .unwrap_err();
        assert!(matches!(err, TableroError::Validation(_)));
    }
}
