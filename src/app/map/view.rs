use eframe::egui::{self, Color32, Sense, Stroke, Ui};

use crate::flavor::Pairing;
use crate::util::dedupe;

use super::super::render_utils::{
    NODE_RADIUS, draw_background, with_opacity, world_to_screen,
};
use super::engine::MapEngine;
use super::tooltip::draw_tooltip;
use super::{FlavorMapLayout, MapEvent, MapProps};

const DIMMED_OPACITY: f32 = 0.1;
const LINK_COLOR: Color32 = Color32::from_rgb(0xbd, 0xbd, 0xbd);
const NODE_STROKE_COLOR: Color32 = Color32::WHITE;
const REGION_OUTLINE_COLOR: Color32 = Color32::from_rgba_premultiplied(110, 110, 110, 90);

/// Neighbor set of a selection: the deduplicated union of every link's
/// source and target ids, plus the selected id itself.
fn neighbor_ids(links: &[Pairing], selected: &str) -> Vec<String> {
    let endpoints = links
        .iter()
        .map(|link| link.source.clone())
        .chain(links.iter().map(|link| link.target.clone()))
        .collect::<Vec<_>>();

    let mut ids = dedupe(&endpoints);
    if !ids.iter().any(|id| id == selected) {
        ids.push(selected.to_owned());
    }
    ids
}

fn node_opacity(neighbors: Option<&[String]>, id: &str) -> f32 {
    match neighbors {
        Some(set) => {
            if set.iter().any(|neighbor| neighbor == id) {
                1.0
            } else {
                DIMMED_OPACITY
            }
        }
        None => 1.0,
    }
}

/// Resolves a tooltip's node reference to an engine index. Absent or stale
/// references resolve to `None`, which callers treat as a no-op.
fn resolve_tooltip(engine: &MapEngine, node: Option<&str>) -> Option<usize> {
    node.and_then(|id| engine.index_of(id))
}

impl FlavorMapLayout {
    /// One frame of the map: ingest on dirty props, advance both
    /// simulations a tick, repaint links/nodes/tooltips from current
    /// positions, and report interaction events upward.
    pub(in crate::app) fn show(&mut self, ui: &mut Ui, props: &MapProps<'_>) -> Vec<MapEvent> {
        let mut events = Vec::new();

        if self.dirty {
            self.engine.ingest(
                props.nodes,
                props.links,
                props.regions,
                props.region_links,
                props.members_of,
            );
            self.engine.restart();
            self.dirty = false;
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        self.handle_zoom(ui, rect, &response);
        self.handle_pan(&response);

        let simulating = self.engine.step();
        if simulating || response.dragged() {
            ui.ctx().request_repaint();
        }

        let screen_positions = self
            .engine
            .node_bodies
            .positions
            .iter()
            .map(|&world| world_to_screen(rect, self.pan, self.zoom, world))
            .collect::<Vec<_>>();
        let screen_radius = NODE_RADIUS * self.zoom;

        if self.show_region_overlay {
            for (index, &world) in self.engine.region_bodies.positions.iter().enumerate() {
                painter.circle_stroke(
                    world_to_screen(rect, self.pan, self.zoom, world),
                    self.engine.region_radii[index] * self.zoom,
                    Stroke::new(1.0, REGION_OUTLINE_COLOR),
                );
            }
        }

        let link_stroke = Stroke::new(2.0 * self.zoom, LINK_COLOR);
        for &(source, target) in &self.engine.link_endpoints {
            painter.line_segment(
                [screen_positions[source], screen_positions[target]],
                link_stroke,
            );
        }

        let hovered_index = if response.hovered() {
            Self::hovered_index(ui, &screen_positions, screen_radius)
        } else {
            None
        };
        if hovered_index.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let hovered_id = hovered_index.map(|index| self.engine.node_ids[index].clone());
        if hovered_id.as_deref() != props.hovered_node {
            if let Some(previous) = props.hovered_node {
                events.push(MapEvent::NodeHoverExit(previous.to_owned()));
            }
            if let Some(current) = &hovered_id {
                events.push(MapEvent::NodeHoverEnter(current.clone()));
            }
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            match &hovered_id {
                Some(id) => events.push(MapEvent::NodeClicked(id.clone())),
                None => events.push(MapEvent::BackgroundClicked),
            }
        }

        let neighbors = props
            .selected_node
            .map(|selected| neighbor_ids(props.links, selected));

        let node_stroke = Stroke::new(1.0 * self.zoom, NODE_STROKE_COLOR);
        for index in 0..self.engine.node_count() {
            let id = &self.engine.node_ids[index];
            let Some(ingredient) = props.nodes.get(index).filter(|node| &node.id == id) else {
                continue;
            };

            let opacity = node_opacity(neighbors.as_deref(), id);
            let fill = with_opacity((props.encode_node_color)(ingredient), opacity);
            painter.circle_filled(screen_positions[index], screen_radius, fill);
            painter.circle_stroke(
                screen_positions[index],
                screen_radius,
                Stroke::new(node_stroke.width, with_opacity(node_stroke.color, opacity)),
            );
        }

        for reference in [props.selected_node, props.hovered_node] {
            let Some(index) = resolve_tooltip(&self.engine, reference) else {
                continue;
            };
            let Some(ingredient) = props
                .nodes
                .get(index)
                .filter(|node| node.id == self.engine.node_ids[index])
            else {
                continue;
            };
            draw_tooltip(
                &painter,
                Some((screen_positions[index], screen_radius)),
                &ingredient.name,
            );
        }

        events
    }
}
