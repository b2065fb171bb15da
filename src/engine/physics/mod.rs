mod forces;
mod quadtree;

use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::graph::ProjectedGraph;
use crate::util::stable_pair;

use super::config::{LayeredConfig, PhysicsConfig};
use forces::{ChargeParams, CollisionParams, accumulate_charge, accumulate_collisions};
use quadtree::QuadNode;

const INITIAL_RADIUS: f32 = 10.0;
const SEED_JITTER: f32 = 2.0;

/// Which force configuration drives the shared integrator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutMode {
    /// Repulsion, springs, collision and centering.
    #[default]
    Force,
    /// Like `Force`, with centering replaced by column and mid-line pulls.
    Layered,
}

impl LayoutMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Force => "Dependency (force)",
            Self::Layered => "Process (layered)",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimNode {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Set while the node is dragged; overrides integration.
    pub pinned: Option<Vec2>,
}

#[derive(Clone, Copy, Debug)]
struct SimLink {
    source: usize,
    target: usize,
    rest_length: f32,
    strength: f32,
    /// Share of the correction applied to the target.
    bias: f32,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    deltas: Vec<Vec2>,
}

pub struct Simulation {
    mode: LayoutMode,
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    levels: Vec<u32>,
    center: Vec2,
    alpha: f32,
    alpha_target: f32,
    physics: PhysicsConfig,
    layered: LayeredConfig,
    scratch: Scratch,
}

impl Simulation {
    pub fn new(
        graph: &ProjectedGraph,
        mode: LayoutMode,
        center: Vec2,
        physics: PhysicsConfig,
        layered: LayeredConfig,
    ) -> Self {
        let levels = graph.nodes.iter().map(|node| node.level()).collect::<Vec<_>>();
        let nodes = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let spiral = phyllotaxis(index);
                let (jx, jy) = stable_pair(&node.id);
                let jitter = vec2(jx, jy) * SEED_JITTER;
                let position = match mode {
                    LayoutMode::Force => center + spiral + jitter,
                    LayoutMode::Layered => vec2(
                        layered.column_center(node.level()) + jitter.x,
                        center.y + spiral.y + jitter.y,
                    ),
                };
                SimNode {
                    position,
                    velocity: Vec2::ZERO,
                    pinned: None,
                }
            })
            .collect::<Vec<_>>();

        let links = graph
            .links
            .iter()
            .filter(|link| link.source != link.target)
            .map(|link| {
                let source_degree = graph.degree(link.source).max(1) as f32;
                let target_degree = graph.degree(link.target).max(1) as f32;
                let mut strength = 1.0 / source_degree.min(target_degree);
                let mut rest_length = physics.link_distance;
                if mode == LayoutMode::Layered {
                    let span = levels[link.source].abs_diff(levels[link.target]).max(1);
                    rest_length = layered.column_width * span as f32;
                    strength *= layered.link_strength_scale;
                }
                SimLink {
                    source: link.source,
                    target: link.target,
                    rest_length,
                    strength,
                    bias: source_degree / (source_degree + target_degree),
                }
            })
            .collect::<Vec<_>>();

        debug!(
            nodes = nodes.len(),
            links = links.len(),
            ?mode,
            "seeded simulation"
        );

        Self {
            mode,
            nodes,
            links,
            levels,
            center,
            alpha: 1.0,
            alpha_target: 0.0,
            physics,
            layered,
            scratch: Scratch::default(),
        }
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn position(&self, index: usize) -> Option<Vec2> {
        self.nodes.get(index).map(|node| node.position)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_settled(&self) -> bool {
        self.alpha < self.physics.alpha_min && self.alpha_target < self.physics.alpha_min
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    pub fn pin(&mut self, index: usize, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pinned = Some(position);
            node.position = position;
            node.velocity = Vec2::ZERO;
        }
    }

    /// Releases a pin. The node rests where it was last pinned.
    pub fn unpin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index)
            && let Some(position) = node.pinned.take()
        {
            node.position = position;
            node.velocity = Vec2::ZERO;
        }
    }

    /// Advances one step. Returns `false` without touching anything once settled.
    pub fn tick(&mut self) -> bool {
        if self.is_settled() {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.physics.alpha_decay();
        let alpha = self.alpha;
        let node_count = self.nodes.len();
        if node_count == 0 {
            return !self.is_settled();
        }

        self.scratch.positions.clear();
        self.scratch
            .positions
            .extend(self.nodes.iter().map(|node| node.position));
        self.scratch.deltas.clear();
        self.scratch.deltas.resize(node_count, Vec2::ZERO);

        self.apply_links(alpha);
        self.apply_charge_and_collisions(alpha);
        match self.mode {
            LayoutMode::Force => self.apply_centering(alpha),
            LayoutMode::Layered => self.apply_column_pulls(alpha),
        }

        let retain = 1.0 - self.physics.velocity_decay.clamp(0.0, 1.0);
        for (node, delta) in self.nodes.iter_mut().zip(&self.scratch.deltas) {
            if let Some(pinned) = node.pinned {
                node.position = pinned;
                node.velocity = Vec2::ZERO;
                continue;
            }

            node.velocity = (node.velocity + *delta) * retain;
            node.position += node.velocity;
        }

        !self.is_settled()
    }

    fn apply_links(&mut self, alpha: f32) {
        let deltas = &mut self.scratch.deltas;
        for link in &self.links {
            let source = self.nodes[link.source];
            let target = self.nodes[link.target];
            let mut offset = (target.position + target.velocity + deltas[link.target])
                - (source.position + source.velocity + deltas[link.source]);
            let mut distance = offset.length();
            if distance <= f32::EPSILON {
                offset = forces::perturbation(link.source, link.target);
                distance = 1.0;
            }

            let stretch = (distance - link.rest_length) / distance * alpha * link.strength;
            let correction = offset * stretch;
            deltas[link.target] -= correction * link.bias;
            deltas[link.source] += correction * (1.0 - link.bias);
        }
    }

    fn apply_charge_and_collisions(&mut self, alpha: f32) {
        let positions = &self.scratch.positions;
        let Some(tree) = QuadNode::build(positions) else {
            return;
        };

        let charge = ChargeParams {
            strength: self.physics.charge * alpha,
            min_distance: self.physics.charge_min_distance.max(0.01),
            theta: self.physics.barnes_hut_theta,
        };
        for (index, delta) in self.scratch.deltas.iter_mut().enumerate() {
            accumulate_charge(&tree, index, positions, charge, delta);
        }

        let min_distance = self.physics.collide_radius * 2.0;
        if min_distance > 0.0 {
            accumulate_collisions(
                &tree,
                &tree,
                true,
                positions,
                CollisionParams {
                    min_distance,
                    strength: self.physics.collide_strength * alpha,
                },
                &mut self.scratch.deltas,
            );
        }
    }

    /// Moves the free nodes' centroid toward the viewport midpoint without
    /// changing their relative layout.
    fn apply_centering(&mut self, alpha: f32) {
        let mut centroid = Vec2::ZERO;
        let mut free = 0usize;
        for node in self.nodes.iter().filter(|node| node.pinned.is_none()) {
            centroid += node.position;
            free += 1;
        }
        if free == 0 {
            return;
        }

        let shift = (self.center - centroid / free as f32) * self.physics.center_strength * alpha;
        for (node, delta) in self.nodes.iter().zip(self.scratch.deltas.iter_mut()) {
            if node.pinned.is_none() {
                *delta += shift;
            }
        }
    }

    fn apply_column_pulls(&mut self, alpha: f32) {
        for ((node, level), delta) in self
            .nodes
            .iter()
            .zip(&self.levels)
            .zip(self.scratch.deltas.iter_mut())
        {
            let target_x = self.layered.column_center(*level);
            delta.x += (target_x - node.position.x) * self.layered.x_strength * alpha;
            delta.y += (self.center.y - node.position.y) * self.layered.y_strength * alpha;
        }
    }
}

fn phyllotaxis(index: usize) -> Vec2 {
    let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
    let angle = index as f32 * PI * (3.0 - 5.0_f32.sqrt());
    vec2(radius * angle.cos(), radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FilterSet, GraphData, GraphLink, GraphNode, LinkType, project};

    fn simulate(data: &GraphData, mode: LayoutMode) -> Simulation {
        let projected = project(data, &FilterSet::all_of(data));
        Simulation::new(
            &projected,
            mode,
            vec2(400.0, 300.0),
            PhysicsConfig::default(),
            LayeredConfig::default(),
        )
    }

    fn settle(sim: &mut Simulation) -> usize {
        let mut ticks = 0;
        while sim.tick() {
            ticks += 1;
            assert!(ticks < 2_000, "simulation never settled");
        }
        ticks
    }

    fn chain() -> GraphData {
        GraphData {
            nodes: vec![
                GraphNode::new("a", "Object", "A").with_level(0),
                GraphNode::new("b", "Flow", "B").with_level(1),
                GraphNode::new("c", "Flow", "C").with_level(1),
                GraphNode::new("d", "Field", "D").with_level(2),
            ],
            links: vec![
                GraphLink::new("a", "b", LinkType::ProcessStep),
                GraphLink::new("a", "c", LinkType::ProcessStep),
                GraphLink::new("b", "d", LinkType::ProcessStep),
            ],
        }
    }

    #[test]
    fn test_empty_graph_settles() {
        let mut sim = simulate(&GraphData::default(), LayoutMode::Force);
        settle(&mut sim);
        assert!(sim.is_settled());
        assert!(sim.nodes().is_empty());
    }

    #[test]
    fn test_settles_in_about_300_ticks() {
        let mut sim = simulate(&chain(), LayoutMode::Force);
        let ticks = settle(&mut sim);
        assert!((295..=305).contains(&ticks), "took {ticks} ticks");
        assert!(!sim.tick());
    }

    #[test]
    fn test_force_layout_keeps_separation() {
        let mut sim = simulate(&chain(), LayoutMode::Force);
        settle(&mut sim);

        let nodes = sim.nodes();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let distance = (nodes[i].position - nodes[j].position).length();
                assert!(distance > 30.0, "nodes {i} and {j} only {distance} apart");
            }
        }
    }

    #[test]
    fn test_force_layout_centers_on_viewport() {
        let mut sim = simulate(&chain(), LayoutMode::Force);
        settle(&mut sim);

        let centroid = sim
            .nodes()
            .iter()
            .fold(Vec2::ZERO, |sum, node| sum + node.position)
            / sim.nodes().len() as f32;
        assert!((centroid - vec2(400.0, 300.0)).length() < 25.0, "{centroid:?}");
    }

    #[test]
    fn test_layered_layout_buckets_x_by_level() {
        let layered = LayeredConfig::default();
        let mut sim = simulate(&chain(), LayoutMode::Layered);
        settle(&mut sim);

        for (node, level) in sim.nodes().iter().zip([0, 1, 1, 2]) {
            let expected = layered.column_center(level);
            assert!(
                (node.position.x - expected).abs() < layered.column_width * 0.15,
                "level {level}: x = {}, expected {expected}",
                node.position.x
            );
        }
    }

    #[test]
    fn test_layered_two_nodes_one_column_apart() {
        let data = GraphData {
            nodes: vec![
                GraphNode::new("A", "X", "A").with_level(0),
                GraphNode::new("B", "Y", "B").with_level(1),
            ],
            links: vec![GraphLink::new("A", "B", LinkType::ProcessStep)],
        };
        let mut sim = simulate(&data, LayoutMode::Layered);
        settle(&mut sim);

        let gap = sim.nodes()[1].position.x - sim.nodes()[0].position.x;
        let column_width = LayeredConfig::default().column_width;
        assert!((gap - column_width).abs() < column_width * 0.05, "gap {gap}");
    }

    #[test]
    fn test_pinned_node_ignores_forces_and_stays_after_release() {
        let mut sim = simulate(&chain(), LayoutMode::Force);
        let pin = vec2(900.0, -50.0);
        sim.pin(0, pin);
        sim.set_alpha_target(0.3);

        for _ in 0..50 {
            sim.tick();
        }
        assert_eq!(sim.position(0), Some(pin));
        assert!(!sim.is_settled());

        sim.unpin(0);
        sim.set_alpha_target(0.0);
        assert_eq!(sim.position(0), Some(pin));
        assert_eq!(sim.nodes()[0].velocity, Vec2::ZERO);
        assert!(sim.nodes().iter().all(|node| node.pinned.is_none()));
    }

    #[test]
    fn test_coincident_seeds_separate() {
        let data = GraphData {
            nodes: vec![
                GraphNode::new("same", "X", "A"),
                GraphNode::new("same", "X", "B"),
            ],
            links: Vec::new(),
        };
        let mut sim = simulate(&data, LayoutMode::Force);
        for node in &mut sim.nodes {
            node.position = vec2(10.0, 10.0);
        }

        settle(&mut sim);
        let nodes = sim.nodes();
        assert!(nodes.iter().all(|node| node.position.x.is_finite()));
        assert!((nodes[0].position - nodes[1].position).length() > 1.0);
    }
}
