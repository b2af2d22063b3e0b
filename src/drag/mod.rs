pub mod collision;
pub mod session;

pub use collision::{resolve_card_drop, resolve_column_index, CardDropTarget, DropZone, SlotRect};
pub use session::{ContainerId, DragItem, DragPhase, DragSession};
