use eframe::egui::Vec2;

use super::forces::{RepulsionParams, accumulate_repulsion, separation};
use super::quadtree::Cell;
use super::{LayoutConfig, RenderGraph};

const BARNES_HUT_THETA: f32 = 0.8;
const SOFTENING: f32 = 900.0;
const COLLISION_PADDING: f32 = 12.0;
const VELOCITY_DAMPING: f32 = 0.86;
const FORCE_TO_VELOCITY: f32 = 0.055;
const MAX_FORCE: f32 = 320.0;
const MAX_SPEED: f32 = 36.0;
const REST_SPEED: f32 = 0.05;

#[derive(Default)]
pub(super) struct LayoutScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    radii: Vec<f32>,
}

/// One iteration of the force pass. Returns whether any node still moves.
///
/// Speed is capped by a temperature that cools linearly to zero over
/// `config.max_iterations`, so the pass always comes to rest.
pub(super) fn step_layout(graph: &mut RenderGraph, config: &LayoutConfig) -> bool {
    let node_count = graph.nodes.len();
    if node_count < 2 {
        return false;
    }

    let temperature =
        1.0 - (graph.iterations as f32 / config.max_iterations.max(1) as f32).clamp(0.0, 1.0);
    if temperature <= 0.0 {
        return false;
    }

    let scratch = &mut graph.scratch;
    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);
    scratch.positions.clear();
    scratch.radii.clear();
    for node in &graph.nodes {
        scratch.positions.push(node.world_pos);
        scratch.radii.push(node.radius());
    }

    let repulsion = RepulsionParams {
        strength: config.node_repulsion,
        softening: SOFTENING,
        theta: BARNES_HUT_THETA,
        collision_strength: 1.6,
        collision_padding: COLLISION_PADDING,
    };

    if let Some(root) = Cell::build(&scratch.positions) {
        for (index, force) in scratch.forces.iter_mut().enumerate() {
            accumulate_repulsion(
                &root,
                index,
                &scratch.positions,
                &scratch.radii,
                repulsion,
                force,
            );
        }
    }

    for edge in &graph.edges {
        let (source, target) = (edge.source, edge.target);
        if source == target || source >= node_count || target >= node_count {
            continue;
        }

        let (direction, distance) = separation(
            scratch.positions[source],
            scratch.positions[target],
            source + target,
        );
        let preferred =
            config.ideal_edge_length + scratch.radii[source] + scratch.radii[target];
        let pull = direction * ((distance - preferred) * config.edge_elasticity * 0.1);

        scratch.forces[source] -= pull;
        scratch.forces[target] += pull;
    }

    // The seed is anchored harder so the picture grows outward from it.
    for (index, force) in scratch.forces.iter_mut().enumerate() {
        let gravity = if Some(index) == graph.seed_index {
            config.gravity * 4.0
        } else {
            config.gravity
        };
        *force -= scratch.positions[index] * gravity;
    }

    let max_speed = MAX_SPEED * temperature;
    let mut moving = false;
    for (node, force) in graph.nodes.iter_mut().zip(scratch.forces.iter()) {
        let mut force = *force;
        if force.length() > MAX_FORCE {
            force = force.normalized() * MAX_FORCE;
        }

        let mut velocity = (node.velocity + force * FORCE_TO_VELOCITY) * VELOCITY_DAMPING;
        let speed = velocity.length();
        if speed > max_speed {
            velocity *= max_speed / speed;
        }

        if velocity.length() < REST_SPEED {
            velocity = Vec2::ZERO;
        } else {
            moving = true;
        }

        node.velocity = velocity;
        node.world_pos += velocity;
    }

    graph.iterations += 1;
    moving
}
