use eframe::egui::epaint::CubicBezierShape;
use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use depgraph_view::engine::Viewport;
use depgraph_view::engine::scene::{Arrowhead, LinkPath};
use depgraph_view::engine::style::NodeShape;

const HALO_DIRECTIONS: [Vec2; 8] = [
    Vec2::new(1.0, 0.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, -1.0),
    Vec2::new(0.7, 0.7),
    Vec2::new(-0.7, 0.7),
    Vec2::new(0.7, -0.7),
    Vec2::new(-0.7, -0.7),
];

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, fill: Color32, viewport: &Viewport) {
    painter.rect_filled(rect, 0.0, fill);

    let step = (48.0 * viewport.scale().clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + viewport.translation();
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(148, 163, 184, 40));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Conservative test against the box spanned by the path's points.
pub(super) fn bounds_visible(rect: Rect, path: &LinkPath, origin: Vec2) -> bool {
    let bounds = match *path {
        LinkPath::Line { from, to } => Rect::from_two_pos(from, to),
        LinkPath::Cubic {
            from,
            control_a,
            control_b,
            to,
        } => Rect::from_points(&[from, control_a, control_b, to]),
    };
    rect.intersects(bounds.translate(origin).expand(4.0))
}

pub(super) fn paint_link(
    painter: &Painter,
    path: &LinkPath,
    origin: Vec2,
    color: Color32,
    opacity: f32,
    width: f32,
) {
    let stroke = Stroke::new(width, with_opacity(color, opacity));
    match *path {
        LinkPath::Line { from, to } => {
            painter.line_segment([from + origin, to + origin], stroke);
        }
        LinkPath::Cubic {
            from,
            control_a,
            control_b,
            to,
        } => {
            painter.add(CubicBezierShape::from_points_stroke(
                [from + origin, control_a + origin, control_b + origin, to + origin],
                false,
                Color32::TRANSPARENT,
                stroke,
            ));
        }
    }
}

pub(super) fn paint_arrow(
    painter: &Painter,
    arrow: &Arrowhead,
    origin: Vec2,
    color: Color32,
    opacity: f32,
) {
    painter.add(Shape::convex_polygon(
        vec![arrow.tip + origin, arrow.left + origin, arrow.right + origin],
        with_opacity(color, opacity),
        Stroke::NONE,
    ));
}

pub(super) fn paint_node(
    painter: &Painter,
    center: Pos2,
    shape: NodeShape,
    radius: f32,
    fill: Color32,
    opacity: f32,
) {
    let fill = with_opacity(fill, opacity);
    match shape {
        NodeShape::Circle => {
            painter.circle_filled(center, radius, fill);
        }
        NodeShape::Square => {
            painter.rect_filled(
                Rect::from_center_size(center, Vec2::splat(radius * 2.0)),
                0.0,
                fill,
            );
        }
    }
}

/// Text anchored left-centre, drawn over a ring of halo copies.
#[allow(clippy::too_many_arguments)]
pub(super) fn paint_label(
    painter: &Painter,
    anchor: Pos2,
    text: &str,
    size: f32,
    color: Color32,
    halo: Color32,
    halo_width: f32,
    opacity: f32,
) {
    if size < 4.0 {
        return;
    }

    let font = FontId::proportional(size);
    let halo = with_opacity(halo, opacity);
    let offset = (halo_width * 0.5).max(1.0);
    for direction in HALO_DIRECTIONS {
        painter.text(
            anchor + direction * offset,
            Align2::LEFT_CENTER,
            text,
            font.clone(),
            halo,
        );
    }
    painter.text(
        anchor,
        Align2::LEFT_CENTER,
        text,
        font,
        with_opacity(color, opacity),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    #[test]
    fn test_circle_visibility() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        assert!(circle_visible(rect, pos2(-5.0, 50.0), 10.0));
        assert!(!circle_visible(rect, pos2(-20.0, 50.0), 10.0));
    }

    #[test]
    fn test_curve_bounds_include_control_points() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        let path = LinkPath::Cubic {
            from: pos2(-50.0, -50.0),
            control_a: pos2(50.0, -50.0),
            control_b: pos2(150.0, 150.0),
            to: pos2(250.0, 150.0),
        };
        assert!(bounds_visible(rect, &path, Vec2::ZERO));
        assert!(!bounds_visible(rect, &path, vec2(0.0, 400.0)));
    }

    #[test]
    fn test_with_opacity_fades_alpha() {
        let faded = with_opacity(Color32::from_rgb(200, 100, 50), 0.1);
        assert!(faded.a() < 40);
        assert_eq!(with_opacity(Color32::WHITE, 1.0), Color32::WHITE);
    }
}
