//! Owned per-board editing session.
//!
//! A [`BoardSession`] is created when a board is opened and dropped on
//! navigation away. It owns the canonical board tree, at most one drag
//! gesture, and the ledger deciding which in-flight persistence result
//! still matters. The rendering layer reads the tree through
//! [`BoardSession::board`] and drives the gesture with the four drag
//! calls; nothing else mutates the tree.
//!
//! Every pointer-event method completes synchronously. Remote calls
//! happen only in [`PersistRequest::dispatch`] and the `async` user
//! operations, so a drag gesture never waits on the network.

use std::sync::Arc;

use crate::domain::{Board, CardId, ColumnId};
use crate::drag::{
    collision, ContainerId, DragItem, DragPhase, DragSession, DropZone,
};
use crate::error::{Result, TableroError};
use crate::geometry::{Point, Rect};
use crate::remote::{
    BoardGateway, ColumnCardOrder, PersistChange, PersistRequest, PersistScope, ReconcileOutcome,
    ReorderLedger,
};

pub struct BoardSession {
    board: Board,
    gateway: Arc<dyn BoardGateway>,
    drag: Option<DragSession>,
    ledger: ReorderLedger,
}

impl BoardSession {
    /// Opens a session over a board freshly loaded from the backend
    ///
    /// Empty columns get their placeholder here; the backend knows
    /// nothing about placeholders.
    pub fn new(mut board: Board, gateway: Arc<dyn BoardGateway>) -> Self {
        board.normalize();
        Self {
            board,
            gateway,
            drag: None,
            ledger: ReorderLedger::new(),
        }
    }

    /// Read-only view of the board tree
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The remote gateway this session reconciles against
    pub fn gateway(&self) -> Arc<dyn BoardGateway> {
        Arc::clone(&self.gateway)
    }

    /// The gesture in progress, if any
    pub fn active_drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// True while a gesture is live-reordering the board
    pub fn is_dragging(&self) -> bool {
        self.drag.as_ref().is_some_and(|d| d.is_dragging())
    }

    // -------------------------------------------------------------
    // Drag gesture
    // -------------------------------------------------------------

    /// Arms a gesture on a card or column header
    ///
    /// The gesture stays inert until the pointer travels past the
    /// activation threshold, so plain clicks never disturb the order.
    pub fn begin_drag(&mut self, item: DragItem, pointer: Point) -> Result<()> {
        if self.drag.is_some() {
            tracing::warn!("gesture began while another was active, cancelling the old one");
            self.cancel_drag();
        }
        let source = match &item {
            DragItem::Card(card_id) => {
                let card = self.board.card(card_id)?;
                ContainerId::Column(card.column_id.clone())
            }
            DragItem::Column(column_id) => {
                self.board.column(column_id)?;
                ContainerId::Board(self.board.id.clone())
            }
        };
        tracing::debug!(item = ?item, "gesture armed");
        self.drag = Some(DragSession::new(item, source, pointer));
        Ok(())
    }

    /// Feeds a pointer move into the active gesture
    ///
    /// `dragged` is the dragged item's current rectangle and `zones`
    /// the column surfaces, both reported by the rendering layer in the
    /// same coordinate space. Once past the threshold the resolved
    /// order is applied to the board immediately; the pre-drag snapshot
    /// is retained for rollback. Calls without an armed gesture are
    /// ignored.
    pub fn update_drag_position(
        &mut self,
        pointer: Point,
        dragged: Rect,
        zones: &[DropZone],
    ) -> Result<()> {
        let (item, origin) = match self.drag.as_mut() {
            None => return Ok(()),
            Some(drag) => {
                if drag.phase == DragPhase::Pending {
                    if !drag.past_threshold(pointer) {
                        return Ok(());
                    }
                    drag.activate(self.board.clone());
                    tracing::debug!(item = ?drag.item, "gesture activated");
                }
                (drag.item.clone(), drag.origin)
            }
        };

        match item {
            DragItem::Card(card_id) => {
                match collision::resolve_card_drop(dragged, origin, &card_id, zones) {
                    Some(target) => {
                        let current_column = self
                            .board
                            .column_of_card(&card_id)
                            .cloned()
                            .ok_or_else(|| TableroError::CardNotFound(card_id.to_string()))?;
                        if current_column != target.column_id {
                            self.board.move_card_across(
                                &current_column,
                                &target.column_id,
                                &card_id,
                                target.index,
                            )?;
                        } else {
                            let position =
                                self.board.column(&current_column)?.card_position(&card_id)?;
                            if position != target.index {
                                self.board.move_card_within(
                                    &current_column,
                                    &card_id,
                                    target.index,
                                )?;
                            }
                        }
                        if let Some(drag) = self.drag.as_mut() {
                            drag.current_over = Some(ContainerId::Column(target.column_id));
                        }
                    }
                    None => {
                        if let Some(drag) = self.drag.as_mut() {
                            drag.current_over = None;
                        }
                    }
                }
            }
            DragItem::Column(column_id) => {
                if let Some(index) = collision::resolve_column_index(dragged, &column_id, zones) {
                    let position = self.board.column_position(&column_id)?;
                    if position != index {
                        self.board.move_column(&column_id, index)?;
                    }
                }
                let board_id = self.board.id.clone();
                if let Some(drag) = self.drag.as_mut() {
                    drag.current_over = Some(ContainerId::Board(board_id));
                }
            }
        }
        Ok(())
    }

    /// Completes the gesture on pointer-up
    ///
    /// The final order is already applied, so this only classifies what
    /// changed and hands back the persistence work as a
    /// [`PersistRequest`]: dispatch it (or use
    /// [`BoardSession::sync_drop`]) and feed the result to
    /// [`BoardSession::resolve_persist`]. Returns `None` when the drop
    /// was a plain click, landed outside every valid target (the
    /// pre-drag order is restored), or changed nothing.
    pub fn end_drag(&mut self) -> Result<Option<PersistRequest>> {
        let Some(drag) = self.drag.take() else {
            return Ok(None);
        };
        let Some(snapshot) = drag.snapshot else {
            // Never passed the activation threshold: a plain click
            return Ok(None);
        };
        if drag.current_over.is_none() {
            tracing::debug!(item = ?drag.item, "dropped outside valid targets, restoring order");
            self.board = snapshot;
            return Ok(None);
        }

        let change = match &drag.item {
            DragItem::Column(_) => {
                if self.board.column_order == snapshot.column_order {
                    None
                } else {
                    Some(PersistChange::ColumnMove {
                        board_id: self.board.id.clone(),
                        column_order: self.board.column_order.clone(),
                    })
                }
            }
            DragItem::Card(card_id) => {
                let ContainerId::Column(source) = &drag.source else {
                    return Err(TableroError::CardNotFound(card_id.to_string()));
                };
                let current = self
                    .board
                    .column_of_card(card_id)
                    .cloned()
                    .ok_or_else(|| TableroError::CardNotFound(card_id.to_string()))?;
                if &current == source {
                    let column = self.board.column(&current)?;
                    if column.card_order == snapshot.column(&current)?.card_order {
                        None
                    } else {
                        Some(PersistChange::CardReorder {
                            column_id: current.clone(),
                            card_order: column.persisted_card_order(),
                        })
                    }
                } else {
                    Some(PersistChange::CardMove {
                        card_id: card_id.clone(),
                        from: ColumnCardOrder {
                            column_id: source.clone(),
                            card_order: self.board.column(source)?.persisted_card_order(),
                        },
                        to: ColumnCardOrder {
                            column_id: current.clone(),
                            card_order: self.board.column(&current)?.persisted_card_order(),
                        },
                    })
                }
            }
        };

        let Some(change) = change else {
            tracing::debug!(item = ?drag.item, "drop changed nothing, no persistence");
            return Ok(None);
        };
        let tickets = self.ledger.stamp(change.scopes());
        tracing::debug!(change = ?change, "drop classified for persistence");
        Ok(Some(PersistRequest::new(change, snapshot, tickets)))
    }

    /// Abandons the gesture and restores the pre-drag order verbatim
    ///
    /// Nothing is persisted; an inert (never activated) or absent
    /// gesture is simply discarded.
    pub fn cancel_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            if let Some(snapshot) = drag.snapshot {
                tracing::debug!(item = ?drag.item, "gesture cancelled, restoring pre-drag order");
                self.board = snapshot;
            }
        }
    }

    // -------------------------------------------------------------
    // Reconciliation
    // -------------------------------------------------------------

    /// Settles a dispatched persistence call
    ///
    /// A result whose tickets were superseded while the call was in
    /// flight is discarded, success or failure alike: the latest local
    /// order is authoritative. A fresh failure rolls the affected
    /// scopes back to the request's pre-drag snapshot and surfaces the
    /// error exactly once. No retry is attempted.
    pub fn resolve_persist(
        &mut self,
        request: PersistRequest,
        result: Result<()>,
    ) -> Result<ReconcileOutcome> {
        if !self.ledger.is_current(&request.tickets) {
            tracing::debug!(change = ?request.change, "persistence result superseded, discarding");
            return Ok(ReconcileOutcome::Superseded);
        }
        match result {
            Ok(()) => Ok(ReconcileOutcome::Confirmed),
            Err(err) => {
                tracing::warn!(error = %err, "persistence failed, rolling back affected order");
                for (scope, _) in &request.tickets {
                    match scope {
                        PersistScope::ColumnOrder(_) => {
                            self.board.column_order = request.snapshot.column_order.clone();
                        }
                        PersistScope::CardOrder(column_id) => {
                            if let Some(previous) = request.snapshot.columns.get(column_id) {
                                self.board
                                    .columns
                                    .insert(column_id.clone(), previous.clone());
                            }
                        }
                    }
                }
                Err(err)
            }
        }
    }

    /// Dispatches a drop's persistence call and settles it in one step
    ///
    /// Convenient when nothing else needs the session while the call is
    /// in flight. Callers that want a new gesture to run concurrently
    /// should dispatch via [`PersistRequest::dispatch`] themselves and
    /// settle with [`BoardSession::resolve_persist`] afterwards.
    pub async fn sync_drop(&mut self, request: PersistRequest) -> Result<ReconcileOutcome> {
        let gateway = Arc::clone(&self.gateway);
        let result = request.dispatch(gateway.as_ref()).await;
        self.resolve_persist(request, result)
    }

    // -------------------------------------------------------------
    // User operations
    // -------------------------------------------------------------

    /// Creates a card at the end of a column
    ///
    /// The backend assigns the id, so the card lands locally only after
    /// the call succeeds. A placeholder standing in for the empty
    /// column is replaced by the new card.
    pub async fn create_card(&mut self, column_id: &ColumnId, title: &str) -> Result<CardId> {
        if title.trim().is_empty() {
            return Err(TableroError::Validation(
                "card title must not be empty".to_string(),
            ));
        }
        self.board.column(column_id)?;

        let card = self.gateway.create_card(column_id, title).await?;
        let card_id = card.id.clone();
        self.board.column_mut(column_id)?.push_card(card);
        self.ledger.bump(PersistScope::CardOrder(column_id.clone()));
        Ok(card_id)
    }

    /// Creates an empty column at the end of the board
    pub async fn create_column(&mut self, title: &str) -> Result<ColumnId> {
        if title.trim().is_empty() {
            return Err(TableroError::Validation(
                "column title must not be empty".to_string(),
            ));
        }
        let column = self.gateway.create_column(&self.board.id, title).await?;
        let column_id = column.id.clone();
        self.board.insert_column(column);
        self.ledger
            .bump(PersistScope::ColumnOrder(self.board.id.clone()));
        Ok(column_id)
    }

    /// Deletes a column and its cards
    ///
    /// The column disappears locally right away; if the backend then
    /// refuses, it is restored at its old position and the error is
    /// surfaced.
    pub async fn delete_column(&mut self, column_id: &ColumnId) -> Result<bool> {
        let (column, position) = self.board.remove_column(column_id)?;
        self.ledger
            .bump(PersistScope::ColumnOrder(self.board.id.clone()));
        self.ledger.bump(PersistScope::CardOrder(column_id.clone()));

        match self.gateway.delete_column(column_id).await {
            Ok(result) => Ok(result.deleted),
            Err(err) => {
                tracing::warn!(error = %err, "column delete failed, restoring column");
                self.board.restore_column(column, position);
                Err(err)
            }
        }
    }

    /// Renames a column once the backend has accepted the new title
    pub async fn update_column_title(&mut self, column_id: &ColumnId, title: &str) -> Result<()> {
        if title.trim().is_empty() {
            return Err(TableroError::Validation(
                "column title must not be empty".to_string(),
            ));
        }
        self.board.column(column_id)?;

        self.gateway.update_column_title(column_id, title).await?;
        self.board
            .column_mut(column_id)?
            .set_title(title.trim().to_string());
        Ok(())
    }
}
