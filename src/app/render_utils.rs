use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use eframe::egui::{Color32, Painter, Pos2, Rect, Vec2};

/// Base (unzoomed) radius of every ingredient circle.
pub(super) const NODE_RADIUS: f32 = 10.0;
/// Output range of the region radius scale.
pub(super) const REGION_RADIUS_MIN: f32 = 10.0;
pub(super) const REGION_RADIUS_MAX: f32 = 300.0;

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// Linear scale from the region member-count domain to the radius range.
/// A degenerate domain (all regions the same size) maps to the midpoint.
pub(super) fn region_radius(members: usize, min_members: usize, max_members: usize) -> f32 {
    let t = if max_members <= min_members {
        0.5
    } else {
        (members.saturating_sub(min_members)) as f32 / (max_members - min_members) as f32
    };
    REGION_RADIUS_MIN + t.clamp(0.0, 1.0) * (REGION_RADIUS_MAX - REGION_RADIUS_MIN)
}

/// Stable per-cluster fill color derived from the cluster id hash.
pub(super) fn cluster_color(cluster_id: &str) -> Color32 {
    let mut hasher = DefaultHasher::new();
    cluster_id.hash(&mut hasher);
    let hash = hasher.finish();

    let hue = (hash & 0xffff) as f32 / 0xffff as f32;
    hue_color(hue)
}

fn hue_color(hue: f32) -> Color32 {
    let h = (hue.fract() * 6.0).clamp(0.0, 6.0);
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };

    // Mixed toward white for a pastel palette that reads on the light canvas.
    let channel = |v: f32| (120.0 + v * 120.0) as u8;
    Color32::from_rgb(channel(r), channel(g), channel(b))
}

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let opacity = opacity.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * opacity) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(250, 250, 248));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_radius_maps_domain_endpoints_to_range_endpoints() {
        assert_eq!(region_radius(2, 2, 10), 10.0);
        assert_eq!(region_radius(10, 2, 10), 300.0);
    }

    #[test]
    fn region_radius_midpoint_is_linear() {
        assert_eq!(region_radius(6, 2, 10), 155.0);
    }

    #[test]
    fn region_radius_degenerate_domain_maps_to_midpoint() {
        assert_eq!(region_radius(4, 4, 4), 155.0);
    }

    #[test]
    fn cluster_color_is_stable_per_id() {
        assert_eq!(cluster_color("herbal"), cluster_color("herbal"));
    }

    #[test]
    fn screen_world_round_trip() {
        let rect = Rect::from_min_size(Pos2::ZERO, eframe::egui::vec2(800.0, 600.0));
        let pan = eframe::egui::vec2(12.0, -7.0);
        let zoom = 2.5;
        let world = eframe::egui::vec2(40.0, -33.0);
        let back = screen_to_world(rect, pan, zoom, world_to_screen(rect, pan, zoom, world));
        assert!((back - world).length() < 1e-3);
    }
}
