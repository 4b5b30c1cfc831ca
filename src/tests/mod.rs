//! Crate-level scenario tests driving the widget controller end to end.

use std::collections::HashMap;

use crate::input::DragAreas;
use crate::layout::{TabCatalog, Zones};
use crate::utils::{Point, Rect, Size};
use crate::widget::{ControlMode, LayoutUpdate, SplitTabs};


const TAB_W: f64 = 40.0;
const BAR_W: f64 = 200.0;
const BAR_H: f64 = 20.0;
const ZONE_PITCH: f64 = 100.0;

#[derive(Default)]
struct Areas {
    tab_rects: HashMap<i32, Rect>,
    zone_areas: HashMap<usize, Rect>,
}

impl DragAreas<i32> for Areas {
    fn tab_rect(&self, key: &i32) -> Option<Rect> {
        self.tab_rects.get(key).copied()
    }

    fn zone_tab_area(&self, zone_index: usize) -> Option<Rect> {
        self.zone_areas.get(&zone_index).copied()
    }
}

/// A widget plus a programmable stand-in for the rendering layer.
struct Fixture {
    widget: SplitTabs<i32>,
    areas: Areas,
}

impl Fixture {
    fn new() -> Self {
        Self::with_mode(ControlMode::Uncontrolled)
    }

    fn with_mode(mode: ControlMode) -> Self {
        Self {
            widget: SplitTabs::with_mode(mode),
            areas: Areas::default(),
        }
    }

    /// The host's render pass: every zone gets a tab bar stacked
    /// vertically, every tab a fixed-size rectangle within it.
    fn render(&mut self) {
        self.areas.tab_rects.clear();
        self.areas.zone_areas.clear();
        for (zone_index, zone) in self.widget.layout().zones().iter().enumerate() {
            let y = zone_index as f64 * ZONE_PITCH;
            self.areas.zone_areas.insert(
                zone_index,
                Rect::new(Point::new(0.0, y), Size::new(BAR_W, BAR_H)),
            );
            for (tab_index, key) in zone.tabs.iter().enumerate() {
                self.areas.tab_rects.insert(
                    *key,
                    Rect::new(
                        Point::new(tab_index as f64 * TAB_W, y),
                        Size::new(TAB_W, BAR_H),
                    ),
                );
            }
        }
    }

    fn set_tabs(&mut self, keys: &[i32]) -> Option<LayoutUpdate<i32>> {
        let catalog: TabCatalog<i32, &str> = keys.iter().map(|key| (*key, "tab")).collect();
        let update = self.widget.set_tabs(&catalog);
        self.render();
        update
    }

    fn split(&mut self, key: i32) -> Option<LayoutUpdate<i32>> {
        let update = self.widget.split_tab(&key).unwrap();
        self.render();
        update
    }

    fn sync(&mut self, layout: Zones<i32>) {
        self.widget.sync_layout(layout);
        self.render();
    }

    fn press(&mut self, key: i32, x: f64, y: f64) -> Option<LayoutUpdate<i32>> {
        self.widget.pointer_down(key, x, y, &self.areas).unwrap()
    }

    fn drag_to(&mut self, x: f64, y: f64) {
        self.widget.pointer_move(x, y, &self.areas);
    }

    fn release(&mut self) -> Vec<LayoutUpdate<i32>> {
        let updates = self.widget.pointer_up();
        self.render();
        updates
    }
}
