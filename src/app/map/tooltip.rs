use eframe::egui::{
    Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, StrokeKind, Vec2, pos2, vec2,
};

/// Gap between the node's top edge and the tooltip's pointer arrow.
const GAP: f32 = 5.0;
const PADDING: Vec2 = vec2(8.0, 5.0);
const ARROW_HALF_WIDTH: f32 = 7.0;
const ARROW_HEIGHT: f32 = 7.0;

/// Top-left corner of a tooltip box centered horizontally above a node,
/// clearing the node's on-screen radius plus the arrow and a fixed gap.
pub(super) fn tooltip_anchor(node_center: Pos2, screen_radius: f32, box_size: Vec2) -> Pos2 {
    pos2(
        node_center.x - box_size.x * 0.5,
        node_center.y - screen_radius - GAP - ARROW_HEIGHT - box_size.y,
    )
}

/// Draws a tooltip for a node anchor, if one resolved. A missing anchor
/// (absent or stale node reference) is a no-op.
pub(super) fn draw_tooltip(painter: &Painter, anchor: Option<(Pos2, f32)>, text: &str) {
    let Some((node_center, screen_radius)) = anchor else {
        return;
    };

    let galley = painter.layout_no_wrap(
        text.to_owned(),
        FontId::proportional(14.0),
        Color32::from_gray(20),
    );
    let box_size = galley.size() + PADDING * 2.0;
    let top_left = tooltip_anchor(node_center, screen_radius, box_size);
    let rect = Rect::from_min_size(top_left, box_size);

    painter.rect_filled(rect, 2.0, Color32::WHITE);
    painter.rect_stroke(
        rect,
        2.0,
        Stroke::new(2.0, Color32::from_gray(20)),
        StrokeKind::Outside,
    );

    let arrow_tip = pos2(node_center.x, rect.bottom() + ARROW_HEIGHT);
    painter.add(Shape::convex_polygon(
        vec![
            pos2(node_center.x - ARROW_HALF_WIDTH, rect.bottom()),
            pos2(node_center.x + ARROW_HALF_WIDTH, rect.bottom()),
            arrow_tip,
        ],
        Color32::from_gray(20),
        Stroke::NONE,
    ));

    painter.galley(rect.min + PADDING, galley, Color32::from_gray(20));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_is_centered_above_the_node() {
        let anchor = tooltip_anchor(pos2(100.0, 100.0), 10.0, vec2(40.0, 20.0));
        assert_eq!(anchor.x, 80.0);
        // box bottom + arrow + gap reaches the node's top edge
        assert_eq!(anchor.y + 20.0 + ARROW_HEIGHT + GAP, 90.0);
    }

    #[test]
    fn anchor_accounts_for_zoomed_radius() {
        let small = tooltip_anchor(pos2(0.0, 0.0), 10.0, vec2(10.0, 10.0));
        let large = tooltip_anchor(pos2(0.0, 0.0), 70.0, vec2(10.0, 10.0));
        assert!(large.y < small.y);
    }
}
