use std::collections::HashMap;
use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};

use crate::flavor::{Ingredient, Pairing, Region, RegionLink};
use crate::util::average;

use super::super::render_utils::region_radius;
use super::super::sim::{
    BodySet, Simulation, SpringLink, apply_cluster, apply_collide, apply_links, apply_many_body,
    apply_positional, spring_links,
};

const NODE_CHARGE: f32 = -30.0;
const REGION_CHARGE: f32 = -5000.0;
const LINK_DISTANCE: f32 = 30.0;
const CENTER_STRENGTH: f32 = 0.1;
const COLLIDE_RADIUS: f32 = 10.0;

/// Two coupled simulations: regions arrange themselves around the center,
/// nodes are pulled toward the centroid of their owning regions. Bodies are
/// keyed by id across ingests so prop updates never reset the layout.
pub(in crate::app) struct MapEngine {
    pub(in crate::app) node_ids: Vec<String>,
    node_clusters: Vec<u32>,
    node_index_by_id: HashMap<String, usize>,
    pub(in crate::app) node_bodies: BodySet,
    node_radii: Vec<f32>,
    node_targets: Vec<Vec2>,
    /// Regions (by index) whose member list contains each node.
    node_region_lists: Vec<Vec<usize>>,
    node_links: Vec<SpringLink>,
    pub(in crate::app) link_endpoints: Vec<(usize, usize)>,

    region_ids: Vec<String>,
    region_index_by_id: HashMap<String, usize>,
    pub(in crate::app) region_bodies: BodySet,
    pub(in crate::app) region_radii: Vec<f32>,
    region_centers: Vec<Vec2>,
    region_links: Vec<SpringLink>,

    node_sim: Simulation,
    region_sim: Simulation,

    target_xs: Vec<f32>,
    target_ys: Vec<f32>,
}

impl MapEngine {
    pub(in crate::app) fn new() -> Self {
        Self {
            node_ids: Vec::new(),
            node_clusters: Vec::new(),
            node_index_by_id: HashMap::new(),
            node_bodies: BodySet::new(),
            node_radii: Vec::new(),
            node_targets: Vec::new(),
            node_region_lists: Vec::new(),
            node_links: Vec::new(),
            link_endpoints: Vec::new(),
            region_ids: Vec::new(),
            region_index_by_id: HashMap::new(),
            region_bodies: BodySet::new(),
            region_radii: Vec::new(),
            region_centers: Vec::new(),
            region_links: Vec::new(),
            node_sim: Simulation::new(),
            region_sim: Simulation::new(),
            target_xs: Vec::new(),
            target_ys: Vec::new(),
        }
    }

    pub(in crate::app) fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    pub(in crate::app) fn index_of(&self, id: &str) -> Option<usize> {
        self.node_index_by_id.get(id).copied()
    }

    /// Seeds one draw pass. Existing bodies keep position and velocity,
    /// entering bodies start on a phyllotaxis spiral, exiting bodies are
    /// dropped. Dangling ids in links or member lists are skipped.
    pub(in crate::app) fn ingest(
        &mut self,
        nodes: &[Ingredient],
        links: &[Pairing],
        regions: &[Region],
        region_links: &[RegionLink],
        members_of: fn(&Region) -> &[String],
    ) {
        self.ingest_nodes(nodes);
        self.ingest_regions(regions, members_of);

        let pairs = links
            .iter()
            .filter_map(|link| {
                Some((
                    self.index_of(&link.source)?,
                    self.index_of(&link.target)?,
                ))
            })
            .filter(|&(source, target)| source != target)
            .collect::<Vec<_>>();
        self.node_links = spring_links(&pairs, self.node_bodies.len());
        self.link_endpoints = pairs;

        let region_pairs = region_links
            .iter()
            .filter_map(|link| {
                Some((
                    self.region_index_by_id.get(&link.source).copied()?,
                    self.region_index_by_id.get(&link.target).copied()?,
                ))
            })
            .filter(|&(source, target)| source != target)
            .collect::<Vec<_>>();
        self.region_links = spring_links(&region_pairs, self.region_bodies.len());

        self.recompute_node_targets();
    }

    fn ingest_nodes(&mut self, nodes: &[Ingredient]) {
        let mut prior = HashMap::with_capacity(self.node_ids.len());
        for (index, id) in self.node_ids.iter().enumerate() {
            prior.insert(
                id.clone(),
                (
                    self.node_bodies.positions[index],
                    self.node_bodies.velocities[index],
                ),
            );
        }

        self.node_ids.clear();
        self.node_bodies.clear();
        self.node_index_by_id.clear();
        self.node_clusters.clear();
        self.node_radii.clear();

        let mut cluster_indices: HashMap<&str, u32> = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            let (position, velocity) = prior
                .get(&node.id)
                .copied()
                .unwrap_or_else(|| (seed_position(index), Vec2::ZERO));

            let next_cluster = cluster_indices.len() as u32;
            let cluster = *cluster_indices
                .entry(node.cluster_id.as_str())
                .or_insert(next_cluster);

            self.node_index_by_id.insert(node.id.clone(), index);
            self.node_ids.push(node.id.clone());
            self.node_clusters.push(cluster);
            self.node_radii.push(COLLIDE_RADIUS);
            self.node_bodies.push(position, velocity);
        }

        self.node_targets = vec![Vec2::ZERO; self.node_bodies.len()];
    }

    fn ingest_regions(&mut self, regions: &[Region], members_of: fn(&Region) -> &[String]) {
        let mut prior = HashMap::with_capacity(self.region_ids.len());
        for (index, id) in self.region_ids.iter().enumerate() {
            prior.insert(
                id.clone(),
                (
                    self.region_bodies.positions[index],
                    self.region_bodies.velocities[index],
                ),
            );
        }

        self.region_ids.clear();
        self.region_bodies.clear();
        self.region_index_by_id.clear();
        self.region_radii.clear();

        // The radius scale domain is the raw member-list length, matching
        // the permissive handling of dangling member ids.
        let member_counts = regions
            .iter()
            .map(|region| members_of(region).len())
            .collect::<Vec<_>>();
        let min_members = member_counts.iter().copied().min().unwrap_or(0);
        let max_members = member_counts.iter().copied().max().unwrap_or(0);

        self.node_region_lists = vec![Vec::new(); self.node_bodies.len()];

        for (index, region) in regions.iter().enumerate() {
            let (position, velocity) = prior
                .get(&region.id)
                .copied()
                .unwrap_or_else(|| (seed_position(index), Vec2::ZERO));

            self.region_index_by_id.insert(region.id.clone(), index);
            self.region_ids.push(region.id.clone());
            self.region_radii
                .push(region_radius(member_counts[index], min_members, max_members));
            self.region_bodies.push(position, velocity);

            for member in members_of(region) {
                if let Some(&node_index) = self.node_index_by_id.get(member) {
                    self.node_region_lists[node_index].push(index);
                }
            }
        }

        self.region_centers = vec![Vec2::ZERO; self.region_bodies.len()];
    }

    /// Pull-based coupling: each node's per-axis target is the average
    /// position of its owning regions, or the center when it has none.
    /// Recomputed after every region tick.
    fn recompute_node_targets(&mut self) {
        for (index, regions) in self.node_region_lists.iter().enumerate() {
            self.target_xs.clear();
            self.target_ys.clear();
            for &region in regions {
                self.target_xs.push(self.region_bodies.positions[region].x);
                self.target_ys.push(self.region_bodies.positions[region].y);
            }

            self.node_targets[index] = match (average(&self.target_xs), average(&self.target_ys)) {
                (Some(x), Some(y)) => vec2(x, y),
                _ => Vec2::ZERO,
            };
        }
    }

    /// Runs at most one tick of each simulation. Returns true while either
    /// still carries heat.
    pub(in crate::app) fn step(&mut self) -> bool {
        if self.region_sim.active() && !self.region_bodies.is_empty() {
            let alpha = self.region_sim.step_alpha();
            apply_positional(
                &mut self.region_bodies,
                &self.region_centers,
                CENTER_STRENGTH,
                alpha,
            );
            apply_collide(&mut self.region_bodies, &self.region_radii, 1.0, 1);
            apply_many_body(&mut self.region_bodies, REGION_CHARGE, alpha);
            apply_links(&mut self.region_bodies, &self.region_links, LINK_DISTANCE, alpha);
            self.region_sim.integrate(&mut self.region_bodies);
            self.recompute_node_targets();
        }

        if self.node_sim.active() && !self.node_bodies.is_empty() {
            let alpha = self.node_sim.step_alpha();
            apply_cluster(&mut self.node_bodies, &self.node_clusters, alpha);
            apply_collide(&mut self.node_bodies, &self.node_radii, 1.0, 1);
            apply_many_body(&mut self.node_bodies, NODE_CHARGE, alpha);
            apply_positional(
                &mut self.node_bodies,
                &self.node_targets,
                CENTER_STRENGTH,
                alpha,
            );
            self.node_sim.integrate(&mut self.node_bodies);
        }

        self.region_sim.active() || self.node_sim.active()
    }

    /// Re-heats both simulations without touching body state.
    pub(in crate::app) fn restart(&mut self) {
        self.region_sim.restart();
        self.node_sim.restart();
    }

    pub(in crate::app) fn stop(&mut self) {
        self.region_sim.stop();
        self.node_sim.stop();
    }
}

/// Phyllotaxis seeding for entering bodies, spiralling out from the center.
fn seed_position(index: usize) -> Vec2 {
    let radius = 10.0 * (0.5 + index as f32).sqrt();
    let angle = index as f32 * PI * (3.0 - 5.0_f32.sqrt());
    vec2(radius * angle.cos(), radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_members(region: &Region) -> &[String] {
        &region.members
    }

    fn ingredient(id: &str, cluster: &str) -> Ingredient {
        Ingredient {
            id: id.to_owned(),
            name: id.to_owned(),
            cluster_id: cluster.to_owned(),
        }
    }

    fn pairing(source: &str, target: &str) -> Pairing {
        Pairing {
            source: source.to_owned(),
            target: target.to_owned(),
        }
    }

    fn region(id: &str, members: &[&str]) -> Region {
        Region {
            id: id.to_owned(),
            name: id.to_owned(),
            members: members.iter().map(|m| (*m).to_owned()).collect(),
        }
    }

    fn sample_engine() -> MapEngine {
        let mut engine = MapEngine::new();
        engine.ingest(
            &[
                ingredient("a", "citrus"),
                ingredient("b", "citrus"),
                ingredient("c", "earthy"),
            ],
            &[pairing("a", "b"), pairing("b", "c")],
            &[region("west", &["a", "b"]), region("east", &["c"])],
            &[RegionLink {
                source: "west".into(),
                target: "east".into(),
            }],
            region_members,
        );
        engine
    }

    #[test]
    fn step_preserves_the_node_id_set_with_defined_positions() {
        let mut engine = sample_engine();
        engine.step();

        assert_eq!(engine.node_ids, ["a", "b", "c"]);
        assert_eq!(engine.node_bodies.len(), 3);
        for position in &engine.node_bodies.positions {
            assert!(position.x.is_finite() && position.y.is_finite());
        }
    }

    #[test]
    fn reingest_with_unchanged_props_is_idempotent() {
        let mut engine = sample_engine();
        for _ in 0..5 {
            engine.step();
        }
        let before = engine.node_bodies.positions.clone();

        engine.ingest(
            &[
                ingredient("a", "citrus"),
                ingredient("b", "citrus"),
                ingredient("c", "earthy"),
            ],
            &[pairing("a", "b"), pairing("b", "c")],
            &[region("west", &["a", "b"]), region("east", &["c"])],
            &[],
            region_members,
        );

        assert_eq!(engine.node_bodies.len(), 3);
        assert_eq!(engine.node_bodies.positions, before);
    }

    #[test]
    fn keyed_diff_adds_and_drops_by_id() {
        let mut engine = sample_engine();
        for _ in 0..3 {
            engine.step();
        }
        let position_of_a = engine.node_bodies.positions[0];

        engine.ingest(
            &[ingredient("a", "citrus"), ingredient("d", "earthy")],
            &[],
            &[],
            &[],
            region_members,
        );

        assert_eq!(engine.node_ids, ["a", "d"]);
        assert_eq!(engine.node_bodies.positions[0], position_of_a);
        assert!(engine.index_of("b").is_none());
    }

    #[test]
    fn dangling_link_and_member_ids_are_skipped() {
        let mut engine = MapEngine::new();
        engine.ingest(
            &[ingredient("a", "citrus")],
            &[pairing("a", "ghost")],
            &[region("west", &["a", "ghost"])],
            &[RegionLink {
                source: "west".into(),
                target: "ghost".into(),
            }],
            region_members,
        );

        assert!(engine.link_endpoints.is_empty());
        assert_eq!(engine.node_region_lists[0], [0]);
        assert!(engine.region_links.is_empty());
        engine.step();
        assert!(engine.node_bodies.positions[0].x.is_finite());
    }

    #[test]
    fn node_target_follows_owning_region_and_falls_back_to_center() {
        let mut engine = MapEngine::new();
        engine.ingest(
            &[ingredient("a", "citrus"), ingredient("b", "earthy")],
            &[],
            &[region("west", &["a"])],
            &[],
            region_members,
        );

        engine.step();
        assert_eq!(engine.node_targets[0], engine.region_bodies.positions[0]);
        assert_eq!(engine.node_targets[1], Vec2::ZERO);
    }

    #[test]
    fn node_in_two_regions_targets_their_average() {
        let mut engine = MapEngine::new();
        engine.ingest(
            &[ingredient("a", "citrus")],
            &[],
            &[region("west", &["a"]), region("east", &["a"])],
            &[],
            region_members,
        );
        engine.step();

        let expected =
            (engine.region_bodies.positions[0] + engine.region_bodies.positions[1]) * 0.5;
        assert!((engine.node_targets[0] - expected).length() < 1e-4);
    }

    #[test]
    fn restart_reheats_a_settled_engine() {
        let mut engine = sample_engine();
        engine.stop();
        assert!(!engine.step());
        engine.restart();
        assert!(engine.step());
    }

    #[test]
    fn empty_graph_steps_without_panicking() {
        let mut engine = MapEngine::new();
        engine.ingest(&[], &[], &[], &[], region_members);
        engine.step();
        assert_eq!(engine.node_count(), 0);
    }
}
