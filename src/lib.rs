//! State-management core for a splittable tabbed-panel widget.
//!
//! The widget itself (rendering, event capture, element geometry) lives in
//! the host; this crate holds the two pieces with actual invariants:
//!
//! - the [`layout`] module: an immutable model of how tabs are partitioned
//!   into resizable zones, with pure transformation operations (reconcile
//!   against a tab catalog, split a tab off, merge a tab into a zone at a
//!   position, change the active tab);
//! - the [`input`] module: the drag gesture state machine that turns raw
//!   pointer coordinates plus geometry lookups into a resolved drop target
//!   (hover zone and insertion position).
//!
//! [`widget::SplitTabs`] ties the two together and emits layout-changed
//! notifications a host can consume in controlled or uncontrolled mode.
//!
//! ```
//! use splittabs::layout::{TabCatalog, Zones};
//!
//! let catalog: TabCatalog<&str, ()> = [("files", ()), ("search", ())].into_iter().collect();
//! let layout = Zones::new().recalculate(&catalog);
//! assert_eq!(layout.zones()[0].tabs, ["files", "search"]);
//!
//! let layout = layout.split_off(&"search").unwrap();
//! assert_eq!(layout.len(), 2);
//! assert_eq!(layout.zones()[1].tabs, ["search"]);
//! ```

pub mod input;
pub mod layout;
pub mod utils;
pub mod widget;

#[cfg(test)]
mod tests;

pub use input::{DragAreas, DragPhase, TabDrag, DRAG_THRESHOLD};
pub use layout::{TabCatalog, TabKey, TabPosition, Zone, Zones};
pub use widget::{ControlMode, LayoutChangeCause, LayoutUpdate, SplitTabs};
