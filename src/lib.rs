//! # Tablero Core
//!
//! Board reordering state engine and domain models for Tablero kanban
//! boards.
//!
//! This crate owns the in-memory board tree (ordered columns of ordered
//! cards), computes the new order while a card or column is dragged,
//! applies it optimistically, and reconciles every completed drop
//! against a remote gateway, rolling the affected order back when the
//! remote refuses. Empty columns carry a synthetic placeholder card so
//! they stay valid drop targets.
//!
//! Rendering, dialogs, and the HTTP backend live elsewhere: the engine
//! takes layout rectangles in and sends gateway calls out, nothing
//! more.

pub mod domain;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod remote;
pub mod session;

// Re-export commonly used types
pub use domain::{Board, BoardId, Card, CardId, Column, ColumnId};
pub use drag::{CardDropTarget, DragItem, DragSession, DropZone, SlotRect};
pub use error::{Result, TableroError};
pub use geometry::{Point, Rect};
pub use remote::{
    BoardGateway, ColumnCardOrder, DeleteResult, InMemoryGateway, PersistChange, PersistRequest,
    ReconcileOutcome,
};
pub use session::BoardSession;
