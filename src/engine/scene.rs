use eframe::egui::{Color32, Pos2, Vec2, pos2, vec2};

use crate::graph::ProjectedGraph;
use crate::util::truncate_label;

use super::highlight::{DIM_OPACITY, Highlighter, LINK_OPACITY, LinkEmphasis};
use super::physics::{LayoutMode, SimNode};
use super::style::{self, NodeShape, NodeStyle, node_style};
use super::viewport::Viewport;

const ARROW_LENGTH: f32 = 8.0;
const ARROW_HALF_WIDTH: f32 = 4.0;
const ARROW_GAP: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LinkPath {
    Line {
        from: Pos2,
        to: Pos2,
    },
    /// Horizontal S-curve used by the layered layout.
    Cubic {
        from: Pos2,
        control_a: Pos2,
        control_b: Pos2,
        to: Pos2,
    },
}

impl LinkPath {
    pub fn from(&self) -> Pos2 {
        match *self {
            Self::Line { from, .. } | Self::Cubic { from, .. } => from,
        }
    }

    pub fn to(&self) -> Pos2 {
        match *self {
            Self::Line { to, .. } | Self::Cubic { to, .. } => to,
        }
    }

    /// Unit direction in which the path arrives at `to`.
    fn arrival_direction(&self) -> Option<Vec2> {
        let tangent = match *self {
            Self::Line { from, to } => to - from,
            Self::Cubic {
                from, control_b, to, ..
            } => {
                let tangent = to - control_b;
                if tangent.length_sq() > f32::EPSILON {
                    tangent
                } else {
                    to - from
                }
            }
        };
        (tangent.length_sq() > f32::EPSILON).then(|| tangent.normalized())
    }
}

/// Filled triangle whose point touches the target node's outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrowhead {
    pub tip: Pos2,
    pub left: Pos2,
    pub right: Pos2,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Link {
        index: usize,
        path: LinkPath,
        arrow: Option<Arrowhead>,
        color: Color32,
        arrow_color: Color32,
        opacity: f32,
        width: f32,
    },
    Node {
        index: usize,
        center: Pos2,
        shape: NodeShape,
        radius: f32,
        fill: Color32,
        opacity: f32,
    },
    Label {
        index: usize,
        anchor: Pos2,
        text: String,
        size: f32,
        color: Color32,
        halo: Color32,
        halo_width: f32,
        opacity: f32,
    },
}

/// One frame's worth of screen-space drawables in paint order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub size: Vec2,
    pub background: Color32,
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn links(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Link { .. }))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Node { .. }))
    }

    pub fn labels(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Label { .. }))
    }
}

pub struct SceneInputs<'a> {
    pub graph: &'a ProjectedGraph,
    pub nodes: &'a [SimNode],
    pub viewport: &'a Viewport,
    pub highlight: &'a Highlighter,
    /// Node indices back to front, shared with hit testing.
    pub paint_order: &'a [usize],
    pub mode: LayoutMode,
    pub label_max_chars: usize,
    pub surface: Vec2,
}

/// Node indices sorted so heavier nodes paint last.
pub fn paint_order(graph: &ProjectedGraph) -> Vec<usize> {
    let mut order = (0..graph.node_count()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| graph.nodes[a].weight.total_cmp(&graph.nodes[b].weight));
    order
}

pub fn build_scene(inputs: &SceneInputs<'_>) -> Scene {
    let SceneInputs {
        graph,
        nodes,
        viewport,
        highlight,
        paint_order,
        mode,
        label_max_chars,
        surface,
    } = *inputs;

    let mut scene = Scene {
        size: surface,
        background: style::BACKGROUND,
        commands: Vec::with_capacity(graph.link_count() + graph.node_count() * 2),
    };
    if graph.is_empty() || nodes.len() != graph.node_count() {
        return scene;
    }

    let scale = viewport.scale();
    let centers = nodes
        .iter()
        .map(|node| viewport.world_to_screen(node.position))
        .collect::<Vec<_>>();
    let styles = graph
        .nodes
        .iter()
        .map(|node| node_style(&node.group))
        .collect::<Vec<_>>();

    for (index, link) in graph.links.iter().enumerate() {
        let from = centers[link.source];
        let to = centers[link.target];
        let path = match mode {
            LayoutMode::Force => LinkPath::Line { from, to },
            LayoutMode::Layered => {
                let bend = (to.x - from.x) * 0.5;
                LinkPath::Cubic {
                    from,
                    control_a: pos2(from.x + bend, from.y),
                    control_b: pos2(to.x - bend, to.y),
                    to,
                }
            }
        };
        let arrow = (link.source != link.target)
            .then(|| arrowhead(&path, styles[link.target].radius * scale, scale))
            .flatten();

        let (color, opacity) = match highlight.link_emphasis(index) {
            LinkEmphasis::Normal => (style::LINK, LINK_OPACITY),
            LinkEmphasis::Accent => (style::ACCENT, 1.0),
            LinkEmphasis::Dimmed => (style::LINK, DIM_OPACITY),
        };
        let arrow_color = if color == style::ACCENT {
            style::ACCENT
        } else {
            style::ARROW
        };

        scene.commands.push(DrawCommand::Link {
            index,
            path,
            arrow,
            color,
            arrow_color,
            opacity,
            width: style::LINK_WIDTH * scale.sqrt(),
        });
    }

    for &index in paint_order {
        let NodeStyle {
            shape,
            fill,
            radius,
        } = styles[index];
        scene.commands.push(DrawCommand::Node {
            index,
            center: centers[index],
            shape,
            radius: radius * scale,
            fill,
            opacity: highlight.node_opacity(index),
        });
    }

    for &index in paint_order {
        let node = &graph.nodes[index];
        let text = match mode {
            LayoutMode::Force => node.display_label().to_owned(),
            LayoutMode::Layered => truncate_label(node.display_label(), label_max_chars),
        };
        if text.is_empty() {
            continue;
        }

        scene.commands.push(DrawCommand::Label {
            index,
            anchor: centers[index] + vec2((styles[index].radius + style::LABEL_GAP) * scale, 0.0),
            text,
            size: style::LABEL_SIZE * scale,
            color: style::LABEL,
            halo: style::LABEL_HALO,
            halo_width: style::LABEL_HALO_WIDTH * scale.sqrt(),
            opacity: highlight.node_opacity(index),
        });
    }

    scene
}

fn arrowhead(path: &LinkPath, target_radius: f32, scale: f32) -> Option<Arrowhead> {
    let direction = path.arrival_direction()?;
    let normal = vec2(-direction.y, direction.x);
    let tip = path.to() - direction * (target_radius + ARROW_GAP * scale);
    let base = tip - direction * ARROW_LENGTH * scale;
    Some(Arrowhead {
        tip,
        left: base + normal * ARROW_HALF_WIDTH * scale,
        right: base - normal * ARROW_HALF_WIDTH * scale,
    })
}
