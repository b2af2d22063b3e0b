//! Reconciliation of optimistic reorders against the remote gateway.
//!
//! A completed drop is classified into a [`PersistChange`] and wrapped
//! in a [`PersistRequest`] together with the pre-drag snapshot and the
//! sequence tickets issued by the [`ReorderLedger`]. Dispatching the
//! request makes exactly one gateway call; by the time its result
//! arrives the ledger decides whether that result still matters.

use std::collections::HashMap;

use crate::domain::{Board, BoardId, CardId, ColumnId};
use crate::error::Result;

use super::{BoardGateway, ColumnCardOrder};

/// What a persistence call writes to.
///
/// Sequence tickets are issued per scope so that reorders of different
/// columns never block each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PersistScope {
    /// A board's column order.
    ColumnOrder(BoardId),
    /// One column's card order.
    CardOrder(ColumnId),
}

/// The reorder computed by a completed drop.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistChange {
    /// A column changed position on the board.
    ColumnMove {
        board_id: BoardId,
        column_order: Vec<ColumnId>,
    },
    /// A card changed position inside its column.
    CardReorder {
        column_id: ColumnId,
        card_order: Vec<CardId>,
    },
    /// A card moved to another column.
    CardMove {
        card_id: CardId,
        from: ColumnCardOrder,
        to: ColumnCardOrder,
    },
}

impl PersistChange {
    /// Scopes this change writes to.
    pub fn scopes(&self) -> Vec<PersistScope> {
        match self {
            Self::ColumnMove { board_id, .. } => {
                vec![PersistScope::ColumnOrder(board_id.clone())]
            }
            Self::CardReorder { column_id, .. } => {
                vec![PersistScope::CardOrder(column_id.clone())]
            }
            Self::CardMove { from, to, .. } => vec![
                PersistScope::CardOrder(from.column_id.clone()),
                PersistScope::CardOrder(to.column_id.clone()),
            ],
        }
    }
}

/// One drop's pending persistence: the classified change, the pre-drag
/// board for rollback, and the tickets that decide staleness.
#[derive(Debug)]
pub struct PersistRequest {
    pub change: PersistChange,
    pub(crate) snapshot: Board,
    pub(crate) tickets: Vec<(PersistScope, u64)>,
}

impl PersistRequest {
    pub(crate) fn new(change: PersistChange, snapshot: Board, tickets: Vec<(PersistScope, u64)>) -> Self {
        Self {
            change,
            snapshot,
            tickets,
        }
    }

    /// Issues the single gateway call for this drop.
    ///
    /// The session is deliberately not involved here: a caller can
    /// dispatch in the background and hand the result back through
    /// [`crate::session::BoardSession::resolve_persist`] while new
    /// gestures are already running.
    pub async fn dispatch(&self, gateway: &dyn BoardGateway) -> Result<()> {
        match &self.change {
            PersistChange::ColumnMove {
                board_id,
                column_order,
            } => gateway.update_column_order(board_id, column_order).await,
            PersistChange::CardReorder {
                column_id,
                card_order,
            } => gateway.update_card_order(column_id, card_order).await,
            PersistChange::CardMove { card_id, from, to } => {
                gateway
                    .update_card_order_and_owner(
                        card_id,
                        &to.column_id,
                        &[from.clone(), to.clone()],
                    )
                    .await
            }
        }
    }
}

/// Latest-wins ledger: one monotonically increasing sequence per scope.
///
/// A drop stamps every scope it writes; any earlier in-flight call for
/// one of those scopes becomes stale and its result (success or
/// failure) is discarded on arrival. Local mutations that change an
/// order outside a drag (card created, column deleted, ...) bump the
/// scope for the same reason: the latest local order is authoritative.
#[derive(Debug, Default)]
pub struct ReorderLedger {
    seqs: HashMap<PersistScope, u64>,
}

impl ReorderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps every scope of a change, returning the issued tickets.
    pub fn stamp(&mut self, scopes: Vec<PersistScope>) -> Vec<(PersistScope, u64)> {
        scopes
            .into_iter()
            .map(|scope| {
                let seq = self.seqs.entry(scope.clone()).or_insert(0);
                *seq += 1;
                (scope, *seq)
            })
            .collect()
    }

    /// Invalidates any in-flight call touching the scope.
    pub fn bump(&mut self, scope: PersistScope) {
        *self.seqs.entry(scope).or_insert(0) += 1;
    }

    /// True while no newer order has been issued for any of the tickets.
    pub fn is_current(&self, tickets: &[(PersistScope, u64)]) -> bool {
        tickets
            .iter()
            .all(|(scope, seq)| self.seqs.get(scope).copied().unwrap_or(0) == *seq)
    }
}

/// What became of a dispatched persistence call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The remote accepted the latest order.
    Confirmed,
    /// A newer order was computed while the call was in flight; its
    /// result was discarded.
    Superseded,
}
