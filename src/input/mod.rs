//! Pointer/touch interaction tracking.

pub mod tab_drag;

pub use tab_drag::{DragAreas, DragPhase, TabDrag, DRAG_THRESHOLD};
