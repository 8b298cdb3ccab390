use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use super::camera::Camera;

pub(super) const DIMMED_OPACITY: f32 = 0.15;

pub(super) fn draw_background(painter: &Painter, rect: Rect, camera: &Camera) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(248, 250, 252));

    let step = (64.0 * camera.zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + camera.pan;
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

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    if max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom() {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let top_left = rect.left_top();
    let top_right = rect.right_top();
    let bottom_left = rect.left_bottom();
    let bottom_right = rect.right_bottom();

    segments_intersect(start, end, top_left, top_right)
        || segments_intersect(start, end, top_right, bottom_right)
        || segments_intersect(start, end, bottom_right, bottom_left)
        || segments_intersect(start, end, bottom_left, top_left)
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}

/// Directed edge from the rim of the source circle to an arrow tip on the rim of the target.
pub(super) fn draw_arrow(
    painter: &Painter,
    (start, start_radius): (Pos2, f32),
    (end, end_radius): (Pos2, f32),
    width: f32,
    color: Color32,
) {
    let delta = end - start;
    let length = delta.length();
    if length <= start_radius + end_radius + 1.0 {
        return;
    }

    let direction = delta / length;
    let tail = start + direction * start_radius;
    let tip = end - direction * end_radius;
    let head_length = (width * 2.5 + 6.0).min(length * 0.4);
    let head_base = tip - direction * head_length;
    let normal = Vec2::new(-direction.y, direction.x) * (head_length * 0.5);

    painter.line_segment([tail, head_base], Stroke::new(width, color));
    painter.add(Shape::convex_polygon(
        vec![tip, head_base + normal, head_base - normal],
        color,
        Stroke::NONE,
    ));
}
