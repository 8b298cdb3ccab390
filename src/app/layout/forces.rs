use eframe::egui::{Vec2, vec2};

use super::quadtree::Cell;

#[derive(Clone, Copy)]
pub(super) struct RepulsionParams {
    pub(super) strength: f32,
    pub(super) softening: f32,
    pub(super) theta: f32,
    pub(super) collision_strength: f32,
    pub(super) collision_padding: f32,
}

/// Unit vector from `b` to `a`; a deterministic spread direction when they coincide.
pub(super) fn separation(a: Vec2, b: Vec2, salt: usize) -> (Vec2, f32) {
    let delta = a - b;
    let distance = delta.length();
    if distance > 0.0001 {
        (delta / distance, distance)
    } else {
        let angle = (salt as f32 * 0.618_034).fract() * std::f32::consts::TAU;
        (vec2(angle.cos(), angle.sin()), 0.0)
    }
}

/// Charge repulsion plus overlap push acting on node `index`.
pub(super) fn accumulate_repulsion(
    cell: &Cell,
    index: usize,
    points: &[Vec2],
    radii: &[f32],
    params: RepulsionParams,
    force: &mut Vec2,
) {
    if cell.count == 0 {
        return;
    }

    let point = points[index];

    if cell.is_leaf() {
        for &other in &cell.members {
            if other == index {
                continue;
            }

            let (direction, distance) = separation(point, points[other], index + other * 7);
            *force += direction * (params.strength / (distance * distance + params.softening));

            let min_distance = radii[index] + radii[other] + params.collision_padding;
            if distance < min_distance {
                *force += direction * (min_distance - distance) * params.collision_strength;
            }
        }
        return;
    }

    let (direction, distance) = separation(point, cell.centroid, index);
    let far_enough = !cell.square.contains(point)
        && distance > 0.0
        && cell.square.side() / distance < params.theta;

    if far_enough {
        let charge = params.strength * cell.count as f32;
        *force += direction * (charge / (distance * distance + params.softening));
        return;
    }

    for child in &cell.children {
        accumulate_repulsion(child, index, points, radii, params, force);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RepulsionParams {
        RepulsionParams {
            strength: 1000.0,
            softening: 10.0,
            theta: 0.8,
            collision_strength: 1.0,
            collision_padding: 0.0,
        }
    }

    #[test]
    fn two_nodes_push_apart_symmetrically() {
        let points = [vec2(-5.0, 0.0), vec2(5.0, 0.0)];
        let radii = [1.0, 1.0];
        let root = Cell::build(&points).expect("finite points");

        let mut left = Vec2::ZERO;
        let mut right = Vec2::ZERO;
        accumulate_repulsion(&root, 0, &points, &radii, params(), &mut left);
        accumulate_repulsion(&root, 1, &points, &radii, params(), &mut right);

        assert!(left.x < 0.0 && right.x > 0.0);
        assert!((left.x + right.x).abs() < 1e-4);
    }

    #[test]
    fn coincident_nodes_still_separate() {
        let points = [vec2(2.0, 2.0), vec2(2.0, 2.0)];
        let radii = [5.0, 5.0];
        let root = Cell::build(&points).expect("finite points");

        let mut force = Vec2::ZERO;
        accumulate_repulsion(&root, 0, &points, &radii, params(), &mut force);

        assert!(force.length() > 0.0);
        assert!(force.x.is_finite() && force.y.is_finite());
    }
}
