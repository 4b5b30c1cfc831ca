//! Tab drag gesture.
//!
//! Tracks a pressed tab from pointer-down, through the drag threshold, to
//! a resolved drop target (hover zone and insertion position). The widget
//! layer feeds in pointer coordinates plus geometry lookups and reads the
//! target back out on release; this module never touches the layout.
//!
//! Like [`Zones`], a [`TabDrag`] is an immutable snapshot: operations
//! return a new value, or the same instance when nothing changed.

use std::rc::Rc;

use crate::layout::{TabKey, Zones};
use crate::utils::{Point, Rect};

/// Manhattan distance the pointer must travel from the press point before
/// a press becomes a drag. Keeps plain clicks from turning into drops.
pub const DRAG_THRESHOLD: f64 = 10.0;

/// Geometry lookups supplied by the rendering layer.
///
/// Rectangles are in the same coordinate space as the pointer events and
/// are expected to be re-queried fresh on every motion event. `None`
/// means the element is not currently rendered.
pub trait DragAreas<K> {
    /// On-screen rectangle of the tab identified by `key`.
    fn tab_rect(&self, key: &K) -> Option<Rect>;

    /// On-screen rectangle of the tab-bar region of the zone at
    /// `zone_index`.
    fn zone_tab_area(&self, zone_index: usize) -> Option<Rect>;
}

/// Lifecycle phase of the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// No tab pressed.
    Idle,
    /// A tab is pressed but the pointer has not cleared the threshold.
    Pressed,
    /// Past the threshold; hover target is being tracked.
    Dragging,
}

#[derive(Debug, PartialEq)]
struct DragData<K> {
    tab_down: Option<K>,
    dragging: bool,
    touch_start: Point,
    original_start: Point,
    offset: Point,
    tab_over_zone: Option<usize>,
    hover_position: Option<usize>,
}

impl<K> Default for DragData<K> {
    fn default() -> Self {
        Self {
            tab_down: None,
            dragging: false,
            touch_start: Point::ZERO,
            original_start: Point::ZERO,
            offset: Point::ZERO,
            tab_over_zone: None,
            hover_position: None,
        }
    }
}

/// Immutable drag-interaction snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TabDrag<K> {
    data: Rc<DragData<K>>,
}

impl<K: TabKey> Default for TabDrag<K> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<K: TabKey> TabDrag<K> {
    /// The idle state: no tab pressed.
    pub fn idle() -> Self {
        Self {
            data: Rc::new(DragData::default()),
        }
    }

    /// Whether two values are the same snapshot, not merely equal.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    pub fn phase(&self) -> DragPhase {
        match (&self.data.tab_down, self.data.dragging) {
            (None, _) => DragPhase::Idle,
            (Some(_), false) => DragPhase::Pressed,
            (Some(_), true) => DragPhase::Dragging,
        }
    }

    /// The pressed tab, if any.
    pub fn tab_down(&self) -> Option<&K> {
        self.data.tab_down.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.data.dragging
    }

    /// True iff exactly this tab is pressed and past the threshold.
    pub fn is_dragging_tab(&self, key: &K) -> bool {
        self.data.dragging && self.data.tab_down.as_ref() == Some(key)
    }

    /// Pointer displacement since the press, for rendering the tab under
    /// the pointer.
    pub fn offset(&self) -> Point {
        self.data.offset
    }

    pub fn touch_start(&self) -> Point {
        self.data.touch_start
    }

    /// On-screen top-left of the pressed tab at press time.
    pub fn original_start(&self) -> Point {
        self.data.original_start
    }

    /// Index of the zone whose tab bar the dragged tab is over.
    pub fn tab_over_zone(&self) -> Option<usize> {
        self.data.tab_over_zone
    }

    /// Insertion index within [`Self::tab_over_zone`] if released now.
    pub fn hover_position(&self) -> Option<usize> {
        self.data.hover_position
    }

    /// Pointer-down on a tab: any state becomes Pressed.
    ///
    /// Captures the press point and the pressed tab's on-screen top-left;
    /// both stay fixed for the rest of the gesture. Any prior hover
    /// target is cleared.
    ///
    /// # Panics
    ///
    /// When `areas` has no rectangle for `key`: pressing a tab that is
    /// not rendered is a caller contract violation.
    pub fn start(&self, key: K, x: f64, y: f64, areas: &impl DragAreas<K>) -> Self {
        let rect = areas
            .tab_rect(&key)
            .unwrap_or_else(|| panic!("no geometry for pressed tab {key:?}"));
        Self {
            data: Rc::new(DragData {
                tab_down: Some(key),
                dragging: false,
                touch_start: Point::new(x, y),
                original_start: rect.loc,
                offset: Point::ZERO,
                tab_over_zone: None,
                hover_position: None,
            }),
        }
    }

    /// Pointer motion.
    ///
    /// No-op while Idle, and while Pressed until the pointer gets more
    /// than [`DRAG_THRESHOLD`] away (Manhattan) from the press point.
    /// Once dragging, recomputes the displacement and resolves the hover
    /// target from fresh geometry: the first zone (in zone order) whose
    /// tab-bar rectangle overlaps the dragged tab's current rectangle,
    /// and the insertion index within it.
    pub fn motion(&self, x: f64, y: f64, areas: &impl DragAreas<K>, layout: &Zones<K>) -> Self {
        let Some(key) = &self.data.tab_down else {
            return self.clone();
        };

        let pointer = Point::new(x, y);
        if !self.data.dragging
            && pointer.manhattan_distance(self.data.touch_start) <= DRAG_THRESHOLD
        {
            return self.clone();
        }

        let offset = pointer - self.data.touch_start;
        let (tab_over_zone, hover_position) = self.hover_target(key, pointer, offset, areas, layout);

        Self {
            data: Rc::new(DragData {
                tab_down: Some(key.clone()),
                dragging: true,
                touch_start: self.data.touch_start,
                original_start: self.data.original_start,
                offset,
                tab_over_zone,
                hover_position,
            }),
        }
    }

    fn hover_target(
        &self,
        key: &K,
        pointer: Point,
        offset: Point,
        areas: &impl DragAreas<K>,
        layout: &Zones<K>,
    ) -> (Option<usize>, Option<usize>) {
        // The dragged tab keeps its rendered size; its position follows
        // the pointer displacement from where it sat at press time. Using
        // the whole rectangle rather than the bare pointer lets a large
        // tab hover a zone it only partially covers.
        let Some(tab_rect) = areas.tab_rect(key) else {
            return (None, None);
        };
        let dragged = Rect::new(self.data.original_start + offset, tab_rect.size);

        let zone_index = (0..layout.zones().len()).find(|&index| {
            areas
                .zone_tab_area(index)
                .is_some_and(|area| area.overlaps(&dragged))
        });
        let Some(zone_index) = zone_index else {
            return (None, None);
        };

        let zone = &layout.zones()[zone_index];
        let dragged_index = zone.tabs.iter().position(|k| k == key);

        for (index, tab) in zone.tabs.iter().enumerate() {
            if tab == key {
                continue;
            }
            let Some(rect) = areas.tab_rect(tab) else {
                continue;
            };
            if pointer.x < rect.center().x {
                // The dragged tab still occupies its old slot; account
                // for its removal when it sits before the insertion point.
                let shift = matches!(dragged_index, Some(d) if d < index);
                return (Some(zone_index), Some(index - usize::from(shift)));
            }
        }

        let append = zone.tabs.len() - usize::from(dragged_index.is_some());
        (Some(zone_index), Some(append))
    }

    /// Release or pointer-leave: back to Idle, discarding any in-progress
    /// drag. Returns the same instance when already Idle.
    pub fn reset(&self) -> Self {
        if self.data.tab_down.is_none() {
            return self.clone();
        }
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::layout::Zone;
    use crate::utils::Size;

    #[derive(Default)]
    struct Areas {
        tabs: HashMap<i32, Rect>,
        zones: HashMap<usize, Rect>,
    }

    impl DragAreas<i32> for Areas {
        fn tab_rect(&self, key: &i32) -> Option<Rect> {
            self.tabs.get(key).copied()
        }

        fn zone_tab_area(&self, zone_index: usize) -> Option<Rect> {
            self.zones.get(&zone_index).copied()
        }
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(Point::new(x, y), Size::new(w, h))
    }

    fn zone(tabs: &[i32]) -> Zone<i32> {
        Zone {
            active_key: tabs[0],
            size_percent: 50.0,
            tabs: tabs.to_vec(),
        }
    }

    // Two zones stacked vertically, tab bars 20 tall, tabs 40 wide:
    // zone 0 holds tabs 1 2 3 at y=0, zone 1 holds tab 4 at y=100.
    fn fixture() -> (Areas, Zones<i32>) {
        let mut areas = Areas::default();
        areas.zones.insert(0, rect(0.0, 0.0, 200.0, 20.0));
        areas.zones.insert(1, rect(0.0, 100.0, 200.0, 20.0));
        for (i, key) in [1, 2, 3].iter().enumerate() {
            areas.tabs.insert(*key, rect(i as f64 * 40.0, 0.0, 40.0, 20.0));
        }
        areas.tabs.insert(4, rect(0.0, 100.0, 40.0, 20.0));

        let layout = Zones::from_zones(vec![zone(&[1, 2, 3]), zone(&[4])]);
        (areas, layout)
    }

    #[test]
    fn motion_while_idle_is_identity() {
        let (areas, layout) = fixture();
        let drag: TabDrag<i32> = TabDrag::idle();
        let same = drag.motion(50.0, 50.0, &areas, &layout);
        assert!(same.ptr_eq(&drag));
        assert_eq!(same.phase(), DragPhase::Idle);
    }

    #[test]
    fn press_captures_start_points() {
        let (areas, _) = fixture();
        let drag = TabDrag::idle().start(4, 10.0, 110.0, &areas);

        assert_eq!(drag.phase(), DragPhase::Pressed);
        assert_eq!(drag.tab_down(), Some(&4));
        assert_eq!(drag.touch_start(), Point::new(10.0, 110.0));
        assert_eq!(drag.original_start(), Point::new(0.0, 100.0));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn motion_below_threshold_does_not_arm() {
        let (areas, layout) = fixture();
        let drag = TabDrag::idle().start(4, 10.0, 110.0, &areas);

        // Manhattan distance of exactly 10 still counts as a click.
        let same = drag.motion(16.0, 114.0, &areas, &layout);
        assert!(same.ptr_eq(&drag));
        assert_eq!(same.phase(), DragPhase::Pressed);
        assert_eq!(same.offset(), Point::ZERO);
        assert_eq!(same.tab_over_zone(), None);
    }

    #[test]
    fn motion_past_threshold_arms_and_tracks_offset() {
        let (areas, layout) = fixture();
        let drag = TabDrag::idle().start(4, 10.0, 110.0, &areas);

        let drag = drag.motion(16.0, 115.0, &areas, &layout);
        assert_eq!(drag.phase(), DragPhase::Dragging);
        assert_eq!(drag.offset(), Point::new(6.0, 5.0));
        assert!(drag.is_dragging_tab(&4));
        assert!(!drag.is_dragging_tab(&1));
    }

    #[test]
    fn dragging_persists_when_pointer_returns_near_start() {
        let (areas, layout) = fixture();
        let drag = TabDrag::idle().start(4, 10.0, 110.0, &areas);
        let drag = drag.motion(40.0, 110.0, &areas, &layout);
        let drag = drag.motion(11.0, 110.0, &areas, &layout);
        assert_eq!(drag.phase(), DragPhase::Dragging);
        assert_eq!(drag.offset(), Point::new(1.0, 0.0));
    }

    #[test]
    fn hover_resolves_first_overlapping_zone() {
        let (areas, layout) = fixture();
        let drag = TabDrag::idle().start(4, 10.0, 110.0, &areas);

        // Dragged rect lands at (40, 0): over zone 0's tab bar.
        let drag = drag.motion(50.0, 10.0, &areas, &layout);
        assert_eq!(drag.tab_over_zone(), Some(0));
    }

    #[test]
    fn hover_position_uses_tab_midpoints() {
        let (areas, layout) = fixture();
        let drag = TabDrag::idle().start(4, 10.0, 110.0, &areas);

        // Pointer at x=50: right of tab 1's midpoint (20), left of tab
        // 2's (60), so the drop slot is tab 2's index.
        let drag = drag.motion(50.0, 10.0, &areas, &layout);
        assert_eq!(drag.hover_position(), Some(1));

        // Pointer left of every midpoint: slot 0.
        let drag = drag.motion(11.0, 10.0, &areas, &layout);
        assert_eq!(drag.hover_position(), Some(0));
    }

    #[test]
    fn hover_position_appends_past_the_last_midpoint() {
        let (areas, layout) = fixture();
        let drag = TabDrag::idle().start(4, 10.0, 110.0, &areas);

        // Pointer at x=150: right of tab 3's midpoint (100).
        let drag = drag.motion(150.0, 10.0, &areas, &layout);
        assert_eq!(drag.tab_over_zone(), Some(0));
        assert_eq!(drag.hover_position(), Some(3));
    }

    #[test]
    fn hover_position_accounts_for_own_slot_in_same_zone() {
        let (areas, layout) = fixture();
        let drag = TabDrag::idle().start(1, 10.0, 10.0, &areas);

        // Tab 1 dragged within its own zone, pointer left of tab 3's
        // midpoint (100): raw slot 2, minus one for the dragged tab's
        // own slot before it.
        let drag = drag.motion(90.0, 10.0, &areas, &layout);
        assert_eq!(drag.tab_over_zone(), Some(0));
        assert_eq!(drag.hover_position(), Some(1));

        // Past every midpoint: append at len - 1.
        let drag = drag.motion(150.0, 10.0, &areas, &layout);
        assert_eq!(drag.hover_position(), Some(2));
    }

    #[test]
    fn hover_skips_zones_without_geometry() {
        let (mut areas, layout) = fixture();
        areas.zones.remove(&0);

        let drag = TabDrag::idle().start(1, 10.0, 10.0, &areas);
        let drag = drag.motion(30.0, 10.0, &areas, &layout);
        assert_eq!(drag.phase(), DragPhase::Dragging);
        assert_eq!(drag.tab_over_zone(), None);
        assert_eq!(drag.hover_position(), None);
    }

    #[test]
    fn hover_misses_when_rects_only_touch() {
        let (mut areas, layout) = fixture();
        // The only remaining bar exactly abuts the dragged tab's bottom
        // edge; an edge-to-edge touch is not an overlap.
        areas.zones.remove(&0);
        areas.zones.insert(1, rect(0.0, 20.0, 200.0, 20.0));

        let drag = TabDrag::idle().start(1, 10.0, 10.0, &areas);
        let drag = drag.motion(30.0, 10.0, &areas, &layout);
        assert_eq!(drag.tab_over_zone(), None);

        // One pixel of intrusion and it hits.
        areas.zones.insert(1, rect(0.0, 19.0, 200.0, 20.0));
        let drag = drag.motion(30.0, 10.0, &areas, &layout);
        assert_eq!(drag.tab_over_zone(), Some(1));
    }

    #[test]
    fn reset_returns_to_idle_and_is_identity_when_idle() {
        let (areas, layout) = fixture();
        let idle: TabDrag<i32> = TabDrag::idle();
        assert!(idle.reset().ptr_eq(&idle));

        let drag = idle.start(4, 10.0, 110.0, &areas);
        let drag = drag.motion(50.0, 10.0, &areas, &layout);
        let reset = drag.reset();
        assert_eq!(reset.phase(), DragPhase::Idle);
        assert_eq!(reset.tab_down(), None);
        assert_eq!(reset.tab_over_zone(), None);
    }

    #[test]
    #[should_panic(expected = "no geometry for pressed tab")]
    fn press_without_geometry_panics() {
        let areas = Areas::default();
        let _ = TabDrag::<i32>::idle().start(1, 0.0, 0.0, &areas);
    }
}
