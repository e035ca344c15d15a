use eframe::egui::{Color32, Vec2};

use crate::flavor::{Ingredient, Pairing, Region, RegionLink};

mod engine;
mod interaction;
mod tooltip;
mod view;

use engine::MapEngine;

/// Configuration contract of the map core: externally owned data, accessor
/// and color-encoding functions, and the current selection/hover references.
pub(in crate::app) struct MapProps<'a> {
    pub nodes: &'a [Ingredient],
    pub links: &'a [Pairing],
    pub regions: &'a [Region],
    pub region_links: &'a [RegionLink],
    /// Names the member-id list inside a region.
    pub members_of: fn(&Region) -> &[String],
    pub encode_node_color: &'a dyn Fn(&Ingredient) -> Color32,
    pub selected_node: Option<&'a str>,
    pub hovered_node: Option<&'a str>,
}

/// Events emitted upward to the owner of selection/hover state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) enum MapEvent {
    NodeHoverEnter(String),
    NodeHoverExit(String),
    NodeClicked(String),
    BackgroundClicked,
}

/// The force-layout map: dual simulation engine plus the pan/zoom render
/// surface. Owns no application state beyond the viewport transform.
pub(in crate::app) struct FlavorMapLayout {
    engine: MapEngine,
    pan: Vec2,
    zoom: f32,
    dirty: bool,
    pub(in crate::app) show_region_overlay: bool,
}

impl FlavorMapLayout {
    pub(in crate::app) fn new() -> Self {
        Self {
            engine: MapEngine::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            dirty: true,
            show_region_overlay: false,
        }
    }

    /// Marks the next frame as a draw pass: props are re-ingested and both
    /// simulations re-heated.
    pub(in crate::app) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
