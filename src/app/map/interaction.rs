use eframe::egui::{self, Pos2, Rect, Ui};

use super::FlavorMapLayout;
use super::super::render_utils::screen_to_world;

pub(super) const ZOOM_MIN: f32 = 0.1;
pub(super) const ZOOM_MAX: f32 = 7.0;

pub(super) fn clamp_zoom(zoom: f32) -> f32 {
    zoom.clamp(ZOOM_MIN, ZOOM_MAX)
}

impl FlavorMapLayout {
    /// Wheel zoom anchored at the pointer. Clicks never reach here; only
    /// scroll gestures change the scale.
    pub(super) fn handle_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = clamp_zoom(self.zoom * zoom_factor);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(super) fn handle_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// The node under the pointer, closest center first.
    pub(super) fn hovered_index(
        ui: &Ui,
        screen_positions: &[Pos2],
        screen_radius: f32,
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        screen_positions
            .iter()
            .enumerate()
            .filter_map(|(index, position)| {
                let distance = position.distance(pointer);
                (distance <= screen_radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}
