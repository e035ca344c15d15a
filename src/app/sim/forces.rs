use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::BodySet;
use super::quadtree::QuadNode;

/// Barnes-Hut acceptance criterion, theta = 0.9 squared.
const THETA_SQ: f32 = 0.81;
/// Near-field clamp for the charge force, squared.
const DISTANCE_MIN_SQ: f32 = 1.0;
/// Fixed magnitude of the same-cluster attraction nudge.
const CLUSTER_NUDGE: f32 = 10.0;

/// Deterministic stand-in for d3's random jiggle when two bodies coincide.
fn jiggle(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * TAU;
    vec2(angle.cos(), angle.sin()) * 1e-6
}

/// Per-axis pull toward a target position: `v += (target - p) * strength * alpha`.
pub(in crate::app) fn apply_positional(
    bodies: &mut BodySet,
    targets: &[Vec2],
    strength: f32,
    alpha: f32,
) {
    let count = bodies.len().min(targets.len());
    for index in 0..count {
        let delta = targets[index] - bodies.positions[index];
        bodies.velocities[index] += delta * strength * alpha;
    }
}

/// Many-body charge force. Negative strength repels. Far cells are folded
/// into a single interaction once they pass the theta criterion.
pub(in crate::app) fn apply_many_body(bodies: &mut BodySet, strength: f32, alpha: f32) {
    if bodies.len() < 2 {
        return;
    }
    let Some(tree) = QuadNode::build(&bodies.positions) else {
        return;
    };

    let scaled = strength * alpha;
    for index in 0..bodies.len() {
        let mut nudge = Vec2::ZERO;
        accumulate_charge(&tree, index, &bodies.positions, scaled, &mut nudge);
        bodies.velocities[index] += nudge;
    }
}

fn accumulate_charge(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    scaled_strength: f32,
    nudge: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if !node.is_leaf() {
        let delta = node.center_of_mass - point;
        let mut distance_sq = delta.length_sq();
        let side = node.bounds.side_length();

        if distance_sq > 0.0 && side * side < THETA_SQ * distance_sq && !node.bounds.contains(point)
        {
            if distance_sq < DISTANCE_MIN_SQ {
                distance_sq = (DISTANCE_MIN_SQ * distance_sq).sqrt();
            }
            *nudge += delta * (scaled_strength * node.mass / distance_sq);
            return;
        }

        for child in node.children.iter().flatten() {
            accumulate_charge(child, index, positions, scaled_strength, nudge);
        }
        return;
    }

    for &other in &node.indices {
        if other == index {
            continue;
        }
        let mut delta = positions[other] - point;
        let mut distance_sq = delta.length_sq();
        if distance_sq <= 0.0 {
            delta = jiggle(index, other);
            distance_sq = delta.length_sq();
        }
        if distance_sq < DISTANCE_MIN_SQ {
            distance_sq = (DISTANCE_MIN_SQ * distance_sq).sqrt();
        }
        *nudge += delta * (scaled_strength / distance_sq);
    }
}

/// Pairwise non-overlap force over projected positions (`p + v`). Overlap is
/// resolved through velocity corrections split by squared-radius ratio.
pub(in crate::app) fn apply_collide(
    bodies: &mut BodySet,
    radii: &[f32],
    strength: f32,
    iterations: usize,
) {
    let count = bodies.len().min(radii.len());
    if count < 2 {
        return;
    }

    let max_radius = radii
        .iter()
        .take(count)
        .fold(0.0_f32, |max, radius| max.max(*radius));
    let max_pair_distance = max_radius * 2.0;
    let mut projected = Vec::with_capacity(count);

    for _ in 0..iterations {
        projected.clear();
        for index in 0..count {
            projected.push(bodies.positions[index] + bodies.velocities[index]);
        }

        let Some(tree) = QuadNode::build(&projected) else {
            return;
        };
        resolve_collision_pairs(
            &tree,
            &tree,
            true,
            &projected,
            radii,
            CollideParams {
                strength,
                max_pair_distance_sq: max_pair_distance * max_pair_distance,
            },
            &mut bodies.velocities,
        );
    }
}

#[derive(Clone, Copy)]
struct CollideParams {
    strength: f32,
    max_pair_distance_sq: f32,
}

fn collide_pair(
    from: usize,
    to: usize,
    projected: &[Vec2],
    radii: &[f32],
    strength: f32,
    velocities: &mut [Vec2],
) {
    let combined = radii[from] + radii[to];
    let mut delta = projected[from] - projected[to];
    let mut distance_sq = delta.length_sq();
    if distance_sq >= combined * combined {
        return;
    }
    if distance_sq <= 0.0 {
        delta = jiggle(from, to);
        distance_sq = delta.length_sq();
    }

    let distance = distance_sq.sqrt();
    let push = (combined - distance) / distance * strength;
    let correction = delta * push;
    let ratio = (radii[to] * radii[to]) / (radii[from] * radii[from] + radii[to] * radii[to]);

    velocities[from] += correction * ratio;
    velocities[to] -= correction * (1.0 - ratio);
}

fn resolve_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    projected: &[Vec2],
    radii: &[f32],
    params: CollideParams,
    velocities: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_pair_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for i in 0..node_a.indices.len() {
                for j in (i + 1)..node_a.indices.len() {
                    collide_pair(
                        node_a.indices[i],
                        node_a.indices[j],
                        projected,
                        radii,
                        params.strength,
                        velocities,
                    );
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    collide_pair(from, to, projected, radii, params.strength, velocities);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };
            resolve_collision_pairs(child_a, child_a, true, projected, radii, params, velocities);
            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                resolve_collision_pairs(
                    child_a, child_b, false, projected, radii, params, velocities,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            resolve_collision_pairs(child, node_b, false, projected, radii, params, velocities);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            resolve_collision_pairs(node_a, child, false, projected, radii, params, velocities);
        }
    }
}

/// A link resolved to body indices, with the degree-derived bias and
/// strength of the d3 link force.
#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct SpringLink {
    pub(in crate::app) source: usize,
    pub(in crate::app) target: usize,
    bias: f32,
    strength: f32,
}

/// Builds spring links from index pairs. Pairs referencing out-of-range
/// bodies or linking a body to itself are dropped.
pub(in crate::app) fn spring_links(pairs: &[(usize, usize)], body_count: usize) -> Vec<SpringLink> {
    let mut degree = vec![0usize; body_count];
    let valid = |&(source, target): &(usize, usize)| {
        source < body_count && target < body_count && source != target
    };

    for pair in pairs.iter().filter(|pair| valid(pair)) {
        degree[pair.0] += 1;
        degree[pair.1] += 1;
    }

    pairs
        .iter()
        .filter(|pair| valid(pair))
        .map(|&(source, target)| SpringLink {
            source,
            target,
            bias: degree[source] as f32 / (degree[source] + degree[target]) as f32,
            strength: 1.0 / degree[source].min(degree[target]) as f32,
        })
        .collect()
}

/// Spring force pulling linked bodies toward a rest distance.
pub(in crate::app) fn apply_links(
    bodies: &mut BodySet,
    links: &[SpringLink],
    distance: f32,
    alpha: f32,
) {
    for link in links {
        let (source, target) = (link.source, link.target);
        if source >= bodies.len() || target >= bodies.len() {
            continue;
        }

        let mut delta = (bodies.positions[target] + bodies.velocities[target])
            - (bodies.positions[source] + bodies.velocities[source]);
        if delta.length_sq() <= 0.0 {
            delta = jiggle(source, target);
        }

        let length = delta.length();
        let magnitude = (length - distance) / length * alpha * link.strength;
        let correction = delta * magnitude;

        bodies.velocities[target] -= correction * link.bias;
        bodies.velocities[source] += correction * (1.0 - link.bias);
    }
}

/// Custom clustering force: each body with same-cluster peers is nudged
/// along the normalized sum of vectors to those peers by `10 * alpha`.
/// Bodies whose cluster has no other member are untouched.
pub(in crate::app) fn apply_cluster(bodies: &mut BodySet, clusters: &[u32], alpha: f32) {
    let count = bodies.len().min(clusters.len());
    for index in 0..count {
        let mut vector = Vec2::ZERO;
        let mut peers = 0usize;
        for other in 0..count {
            if other == index || clusters[other] != clusters[index] {
                continue;
            }
            vector += bodies.positions[other] - bodies.positions[index];
            peers += 1;
        }

        if peers == 0 {
            continue;
        }

        let magnitude = vector.length();
        if magnitude <= f32::EPSILON {
            continue;
        }
        bodies.velocities[index] += vector * (CLUSTER_NUDGE / magnitude) * alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_set(positions: &[Vec2]) -> BodySet {
        let mut bodies = BodySet::new();
        for &position in positions {
            bodies.push(position, Vec2::ZERO);
        }
        bodies
    }

    #[test]
    fn positional_pulls_toward_target() {
        let mut bodies = body_set(&[vec2(0.0, 0.0)]);
        apply_positional(&mut bodies, &[vec2(100.0, 0.0)], 0.1, 1.0);
        assert!((bodies.velocities[0].x - 10.0).abs() < 1e-4);
        assert_eq!(bodies.velocities[0].y, 0.0);
    }

    #[test]
    fn many_body_negative_strength_repels() {
        let mut bodies = body_set(&[vec2(-5.0, 0.0), vec2(5.0, 0.0)]);
        apply_many_body(&mut bodies, -30.0, 1.0);
        assert!(bodies.velocities[0].x < 0.0);
        assert!(bodies.velocities[1].x > 0.0);
    }

    #[test]
    fn many_body_handles_coincident_bodies() {
        let mut bodies = body_set(&[vec2(1.0, 1.0), vec2(1.0, 1.0)]);
        apply_many_body(&mut bodies, -30.0, 1.0);
        let apart = bodies.velocities[1] - bodies.velocities[0];
        assert!(apart.length_sq() > 0.0);
    }

    #[test]
    fn collide_separates_overlapping_bodies() {
        let mut bodies = body_set(&[vec2(0.0, 0.0), vec2(5.0, 0.0)]);
        apply_collide(&mut bodies, &[10.0, 10.0], 1.0, 1);
        assert!(bodies.velocities[0].x < 0.0);
        assert!(bodies.velocities[1].x > 0.0);
    }

    #[test]
    fn collide_ignores_separated_bodies() {
        let mut bodies = body_set(&[vec2(0.0, 0.0), vec2(100.0, 0.0)]);
        apply_collide(&mut bodies, &[10.0, 10.0], 1.0, 1);
        assert_eq!(bodies.velocities[0], Vec2::ZERO);
        assert_eq!(bodies.velocities[1], Vec2::ZERO);
    }

    #[test]
    fn spring_links_drop_dangling_and_self_pairs() {
        let links = spring_links(&[(0, 1), (1, 1), (0, 9)], 2);
        assert_eq!(links.len(), 1);
        assert_eq!((links[0].source, links[0].target), (0, 1));
    }

    #[test]
    fn link_force_pulls_distant_endpoints_together() {
        let mut bodies = body_set(&[vec2(0.0, 0.0), vec2(300.0, 0.0)]);
        let links = spring_links(&[(0, 1)], 2);
        apply_links(&mut bodies, &links, 30.0, 1.0);
        assert!(bodies.velocities[0].x > 0.0);
        assert!(bodies.velocities[1].x < 0.0);
    }

    #[test]
    fn cluster_force_nudges_by_unit_vector_times_ten_alpha() {
        // Two bodies in the same cluster, 100 apart on x: each receives a
        // nudge of exactly 10 * alpha toward the other.
        let alpha = 0.5;
        let mut bodies = body_set(&[vec2(0.0, 0.0), vec2(100.0, 0.0)]);
        apply_cluster(&mut bodies, &[7, 7], alpha);
        assert!((bodies.velocities[0].x - 10.0 * alpha).abs() < 1e-4);
        assert!((bodies.velocities[1].x + 10.0 * alpha).abs() < 1e-4);
        assert_eq!(bodies.velocities[0].y, 0.0);
    }

    #[test]
    fn cluster_force_skips_bodies_without_peers() {
        let mut bodies = body_set(&[vec2(0.0, 0.0), vec2(100.0, 0.0)]);
        apply_cluster(&mut bodies, &[1, 2], 1.0);
        assert_eq!(bodies.velocities[0], Vec2::ZERO);
        assert_eq!(bodies.velocities[1], Vec2::ZERO);
    }
}
