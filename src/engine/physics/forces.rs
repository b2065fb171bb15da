use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

const COINCIDENT_EPSILON_SQ: f32 = 1e-9;

/// Deterministic unit direction used to separate two coincident nodes.
pub(super) fn perturbation(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214 + 0.11) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// Direction in which `index` leaves a coincident `other`; antisymmetric in
/// its arguments so the pair always splits.
fn away_from(index: usize, other: usize) -> Vec2 {
    if index < other {
        -perturbation(index, other)
    } else {
        perturbation(other, index)
    }
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    /// Charge already multiplied by alpha.
    pub(super) strength: f32,
    pub(super) min_distance: f32,
    pub(super) theta: f32,
}

/// Barnes-Hut accumulation of the many-body velocity change for `index`.
pub(super) fn accumulate_charge(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    delta_v: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other != index {
                *delta_v += charge_between(point, positions[other], index, other, 1.0, params);
            }
        }
        return;
    }

    let offset = node.center_of_mass - point;
    let distance_sq = offset.length_sq();
    let far_enough = node.bounds.side() * node.bounds.side()
        < params.theta * params.theta * distance_sq;
    if far_enough && !node.bounds.contains(point) {
        *delta_v += charge_between(point, node.center_of_mass, index, usize::MAX, node.mass, params);
        return;
    }

    for child in node.children() {
        accumulate_charge(child, index, positions, params, delta_v);
    }
}

fn charge_between(
    point: Vec2,
    other: Vec2,
    index: usize,
    other_index: usize,
    mass: f32,
    params: ChargeParams,
) -> Vec2 {
    let min_distance_sq = params.min_distance * params.min_distance;
    let mut offset = other - point;
    let mut distance_sq = offset.length_sq();
    if distance_sq < COINCIDENT_EPSILON_SQ {
        offset = -away_from(index, other_index) * params.min_distance;
        distance_sq = min_distance_sq;
    }
    offset * (params.strength * mass / distance_sq.max(min_distance_sq))
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) min_distance: f32,
    /// Collision strength already multiplied by alpha.
    pub(super) strength: f32,
}

/// Dual-tree traversal visiting only node pairs whose boxes are closer than
/// the minimum separation.
pub(super) fn accumulate_collisions(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    if node_a.bounds.gap_sq(node_b.bounds) > params.min_distance * params.min_distance {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    separate_pair(from, to, positions, params, deltas);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    separate_pair(from, to, positions, params, deltas);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.children().collect::<Vec<_>>();
        for (offset, child_a) in children.iter().enumerate() {
            accumulate_collisions(child_a, child_a, true, positions, params, deltas);
            for child_b in &children[offset + 1..] {
                accumulate_collisions(child_a, child_b, false, positions, params, deltas);
            }
        }
        return;
    }

    let split_a = !node_a.is_leaf()
        && (node_b.is_leaf() || node_a.bounds.half_extent >= node_b.bounds.half_extent);
    if split_a {
        for child in node_a.children() {
            accumulate_collisions(child, node_b, false, positions, params, deltas);
        }
    } else {
        for child in node_b.children() {
            accumulate_collisions(node_a, child, false, positions, params, deltas);
        }
    }
}

fn separate_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    let delta = positions[from] - positions[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= params.min_distance * params.min_distance {
        return;
    }

    let distance = distance_sq.sqrt();
    let direction = if distance_sq > COINCIDENT_EPSILON_SQ {
        delta / distance
    } else {
        away_from(from, to)
    };

    let push = (params.min_distance - distance) * params.strength * 0.5;
    deltas[from] += direction * push;
    deltas[to] -= direction * push;
}
