//! Widget controller: glues the zone layout model to pointer events.
//!
//! [`SplitTabs`] owns the current [`Zones`] and [`TabDrag`] snapshots.
//! Pointer events and catalog updates come in, layout-changed
//! notifications go out; the rendering layer supplies element geometry
//! through [`DragAreas`]. In controlled mode the host owns the layout:
//! structural results are reported but not committed until the host feeds
//! the accepted snapshot back through [`SplitTabs::sync_layout`].

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::input::{DragAreas, TabDrag};
use crate::layout::{TabCatalog, TabKey, TabPosition, Zones};

/// What caused a layout-changed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutChangeCause {
    /// The tab catalog was reconciled against the layout.
    TabsReconciled,
    /// A tab became the active tab of its zone.
    TabActivated,
    /// A tab was split off into a new zone.
    TabSplitOff,
    /// A tab was moved into a zone at a drop position.
    TabRepositioned,
}

/// A layout-changed notification: the new (or would-be) layout, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutUpdate<K> {
    pub cause: LayoutChangeCause,
    pub layout: Zones<K>,
}

/// Who owns the layout state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    /// The widget owns the layout and commits every change itself.
    #[default]
    Uncontrolled,
    /// The host owns the layout; the widget reports would-be changes and
    /// waits for [`SplitTabs::sync_layout`].
    Controlled,
}

/// The splittable-tabs widget core.
#[derive(Debug)]
pub struct SplitTabs<K: TabKey> {
    layout: Zones<K>,
    drag: TabDrag<K>,
    mode: ControlMode,
}

impl<K: TabKey> Default for SplitTabs<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TabKey> SplitTabs<K> {
    pub fn new() -> Self {
        Self::with_mode(ControlMode::Uncontrolled)
    }

    pub fn with_mode(mode: ControlMode) -> Self {
        Self {
            layout: Zones::new(),
            drag: TabDrag::idle(),
            mode,
        }
    }

    pub fn layout(&self) -> &Zones<K> {
        &self.layout
    }

    pub fn drag(&self) -> &TabDrag<K> {
        &self.drag
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Replace the layout with a host-owned snapshot: the accepted layout
    /// fed back in controlled mode, or a restored one in uncontrolled
    /// mode.
    pub fn sync_layout(&mut self, layout: Zones<K>) {
        self.layout = layout;
    }

    fn apply(&mut self, cause: LayoutChangeCause, layout: Zones<K>) -> LayoutUpdate<K> {
        if self.mode == ControlMode::Uncontrolled {
            self.layout = layout.clone();
        }
        LayoutUpdate { cause, layout }
    }

    /// Reconcile the layout against the latest tab catalog.
    ///
    /// Returns `None` when nothing changed.
    pub fn set_tabs<M>(&mut self, catalog: &TabCatalog<K, M>) -> Option<LayoutUpdate<K>> {
        let next = self.layout.recalculate(catalog);
        if next.ptr_eq(&self.layout) {
            return None;
        }
        debug!("reconciled tab catalog:\n{}", next.debug_layout());
        Some(self.apply(LayoutChangeCause::TabsReconciled, next))
    }

    /// Make `key` the active tab of its zone. `None` when already active.
    pub fn activate_tab(&mut self, key: &K) -> Result<Option<LayoutUpdate<K>>> {
        let next = self.layout.set_active_tab(key)?;
        if next.ptr_eq(&self.layout) {
            return Ok(None);
        }
        Ok(Some(self.apply(LayoutChangeCause::TabActivated, next)))
    }

    /// Split `key` off into a new zone at the end of the layout. `None`
    /// when the tab is already alone in its zone.
    pub fn split_tab(&mut self, key: &K) -> Result<Option<LayoutUpdate<K>>> {
        let next = self.layout.split_off(key)?;
        if next.ptr_eq(&self.layout) {
            return Ok(None);
        }
        debug!("split off tab {key:?}:\n{}", next.debug_layout());
        Ok(Some(self.apply(LayoutChangeCause::TabSplitOff, next)))
    }

    /// Pointer-down on a tab: activates it and begins gesture tracking.
    pub fn pointer_down(
        &mut self,
        key: K,
        x: f64,
        y: f64,
        areas: &impl DragAreas<K>,
    ) -> Result<Option<LayoutUpdate<K>>> {
        let update = self.activate_tab(&key)?;
        self.drag = self.drag.start(key, x, y, areas);
        Ok(update)
    }

    /// Pointer motion over the widget surface.
    pub fn pointer_move(&mut self, x: f64, y: f64, areas: &impl DragAreas<K>) {
        let next = self.drag.motion(x, y, areas, &self.layout);
        if next.tab_over_zone() != self.drag.tab_over_zone()
            || next.hover_position() != self.drag.hover_position()
        {
            trace!(
                "drag hover: zone {:?}, position {:?}",
                next.tab_over_zone(),
                next.hover_position(),
            );
        }
        self.drag = next;
    }

    /// Pointer release: commits the drop if the drag resolved a target
    /// zone, then returns the gesture to idle.
    ///
    /// A successful drop yields a `TabRepositioned` update followed by a
    /// `TabActivated` one for the moved tab. A drop that can no longer be
    /// applied (the tab vanished from the layout mid-drag, or the target
    /// zone did) is discarded without error.
    pub fn pointer_up(&mut self) -> Vec<LayoutUpdate<K>> {
        let mut updates = Vec::new();

        if let (Some(key), Some(zone_index)) =
            (self.drag.tab_down().cloned(), self.drag.tab_over_zone())
        {
            let position = self
                .drag
                .hover_position()
                .map_or(TabPosition::Last, TabPosition::At);
            match self.layout.merge_into(zone_index, &key, position) {
                Ok(merged) => {
                    if !merged.ptr_eq(&self.layout) {
                        debug!(
                            "dropped tab {key:?} into zone {zone_index}:\n{}",
                            merged.debug_layout(),
                        );
                        updates.push(self.apply(LayoutChangeCause::TabRepositioned, merged.clone()));
                    }
                    // The dropped tab becomes the visible one in its zone.
                    if let Ok(activated) = merged.set_active_tab(&key) {
                        if !activated.ptr_eq(&merged) {
                            updates.push(self.apply(LayoutChangeCause::TabActivated, activated));
                        }
                    }
                }
                Err(err) => warn!("discarding in-flight tab move: {err}"),
            }
        }

        self.drag = self.drag.reset();
        updates
    }

    /// Pointer left the widget surface: cancel any in-progress drag
    /// without committing a layout change.
    pub fn pointer_leave(&mut self) {
        self.drag = self.drag.reset();
    }
}
