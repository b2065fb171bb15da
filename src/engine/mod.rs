pub mod config;
pub mod export;
pub mod highlight;
pub mod interaction;
pub mod physics;
pub mod scene;
pub mod style;
pub mod ticker;
pub mod viewport;

use std::collections::{BTreeSet, VecDeque};

use eframe::egui::{Pos2, Rect, Vec2, vec2};
use tracing::{debug, info};

use crate::graph::{FilterSet, GraphData, GraphNode, ProjectedGraph, project};

pub use config::EngineConfig;
pub use export::{ExportError, PngRenderOpts};
pub use highlight::HighlightState;
pub use interaction::{GraphEvent, NodeRef};
pub use physics::{LayoutMode, Simulation};
pub use scene::{DrawCommand, LinkPath, Scene};
pub use ticker::FrameTicket;
pub use viewport::Viewport;

use interaction::{DragUpdate, GestureTracker};
use scene::SceneInputs;
use style::{NodeShape, node_style};
use ticker::Ticker;

const FIT_PADDING: f32 = 40.0;

/// Owns one interactive graph view: the loaded data, the active projection,
/// the solver, viewport, highlight and pointer state. Every mutation goes
/// through `&mut self`, so each piece of state has exactly one writer.
pub struct GraphEngine {
    config: EngineConfig,
    data: GraphData,
    filter: FilterSet,
    graph: ProjectedGraph,
    paint_order: Vec<usize>,
    simulation: Simulation,
    mode: LayoutMode,
    viewport: Viewport,
    highlight: highlight::Highlighter,
    gestures: GestureTracker,
    ticker: Ticker,
    surface: Vec2,
    focused: bool,
    events: VecDeque<GraphEvent>,
}

impl GraphEngine {
    pub fn new(config: EngineConfig, surface: Vec2) -> Self {
        let surface = surface.max(Vec2::splat(1.0));
        let graph = ProjectedGraph::default();
        let simulation = Simulation::new(
            &graph,
            LayoutMode::default(),
            surface * 0.5,
            config.physics,
            config.layered,
        );

        Self {
            viewport: Viewport::new(&config.interaction),
            gestures: GestureTracker::new(config.interaction.click_threshold),
            config,
            data: GraphData::default(),
            filter: FilterSet::default(),
            graph,
            paint_order: Vec::new(),
            simulation,
            mode: LayoutMode::default(),
            highlight: highlight::Highlighter::default(),
            ticker: Ticker::default(),
            surface,
            focused: false,
            events: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn data(&self) -> &GraphData {
        &self.data
    }

    pub fn projected(&self) -> &ProjectedGraph {
        &self.graph
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn surface(&self) -> Vec2 {
        self.surface
    }

    pub fn highlight_state(&self) -> &HighlightState {
        self.highlight.state()
    }

    /// Replaces the whole data set. Every present group becomes active.
    pub fn set_data(&mut self, data: GraphData) {
        self.ticker.cancel();
        info!(
            nodes = data.node_count(),
            links = data.link_count(),
            "loaded graph data"
        );
        self.filter = FilterSet::all_of(&data);
        self.data = data;
        self.reproject();
    }

    pub fn group_tags(&self) -> BTreeSet<String> {
        self.data.group_tags()
    }

    pub fn filter(&self) -> &FilterSet {
        &self.filter
    }

    /// Flips one group in or out of the projection. Tags absent from the
    /// data are ignored.
    pub fn toggle_group(&mut self, group: &str) -> bool {
        if !self.filter.toggle(group, &self.data) {
            return false;
        }
        self.ticker.cancel();
        self.reproject();
        true
    }

    pub fn set_filter(&mut self, mut filter: FilterSet) {
        filter.retain_present(&self.data);
        if filter == self.filter {
            return;
        }
        self.ticker.cancel();
        self.filter = filter;
        self.reproject();
    }

    pub fn query(&self) -> &str {
        self.highlight.query()
    }

    pub fn set_query(&mut self, query: &str) {
        self.highlight.set_query(query, &self.graph);
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        if mode == self.mode {
            return;
        }
        self.ticker.cancel();
        info!(mode = mode.label(), "switched layout");
        self.mode = mode;
        self.reproject();
    }

    /// Tracks the drawing surface; the solver centres on its midpoint.
    pub fn resize(&mut self, surface: Vec2) {
        let surface = surface.max(Vec2::splat(1.0));
        if surface == self.surface {
            return;
        }
        self.surface = surface;
        self.simulation.set_center(surface * 0.5);
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn zoom_at(&mut self, focal: Pos2, delta: f32) {
        self.viewport.zoom_at(focal, delta);
    }

    pub fn zoom_by(&mut self, factor: f32) {
        self.viewport.zoom_by(factor, self.surface);
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.viewport.pan(delta);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// Zooms and pans so every projected node is on screen.
    pub fn fit_view(&mut self) {
        if let Some(bounds) = self.world_bounds() {
            self.viewport.fit_bounds(bounds, self.surface, FIT_PADDING);
        }
    }

    /// World-space box around all node shapes.
    pub fn world_bounds(&self) -> Option<Rect> {
        self.simulation
            .nodes()
            .iter()
            .zip(&self.graph.nodes)
            .map(|(sim, node)| {
                Rect::from_center_size(
                    sim.position.to_pos2(),
                    Vec2::splat(node_style(&node.group).radius * 2.0),
                )
            })
            .reduce(|bounds, rect| bounds.union(rect))
    }

    pub fn node(&self, index: usize) -> Option<&GraphNode> {
        self.graph.nodes.get(index)
    }

    pub fn node_position(&self, id: &str) -> Option<Vec2> {
        self.graph
            .index_of(id)
            .and_then(|index| self.simulation.position(index))
    }

    pub fn node_screen_position(&self, id: &str) -> Option<Pos2> {
        self.node_position(id)
            .map(|position| self.viewport.world_to_screen(position))
    }

    /// Topmost node whose shape contains `pointer` (surface coordinates).
    pub fn node_at(&self, pointer: Pos2) -> Option<usize> {
        let scale = self.viewport.scale();
        self.paint_order.iter().rev().copied().find(|&index| {
            let Some(position) = self.simulation.position(index) else {
                return false;
            };
            let style = node_style(&self.graph.nodes[index].group);
            let offset = pointer - self.viewport.world_to_screen(position);
            let reach = style.radius * scale;
            match style.shape {
                NodeShape::Circle => offset.length_sq() <= reach * reach,
                NodeShape::Square => offset.x.abs() <= reach && offset.y.abs() <= reach,
            }
        })
    }

    pub fn pointer_down(&mut self, pointer: Pos2) {
        let hit = self.node_at(pointer);
        self.gestures.press(hit, pointer);
        if let Some(index) = hit
            && let Some(position) = self.simulation.position(index)
        {
            self.simulation.pin(index, position);
            self.simulation
                .set_alpha_target(self.config.physics.drag_alpha_target);
            debug!(node = %self.graph.nodes[index].id, "pinned node");
        }
    }

    pub fn pointer_move(&mut self, pointer: Pos2) {
        if !self.gestures.is_active() {
            self.update_hover(pointer);
            return;
        }

        match self.gestures.drag_to(pointer) {
            DragUpdate::MoveNode { index, pointer } => {
                let world = self.viewport.screen_to_world(pointer);
                self.simulation.pin(index, world);
            }
            DragUpdate::Pan(delta) => self.viewport.pan(delta),
            DragUpdate::Idle | DragUpdate::Pending => {}
        }
    }

    pub fn pointer_up(&mut self) {
        let release = self.gestures.release();
        let Some(index) = release.node else {
            return;
        };

        self.simulation.unpin(index);
        self.simulation.set_alpha_target(0.0);
        if release.click
            && let Some(node) = self.graph.nodes.get(index)
        {
            self.events.push_back(GraphEvent::NodeClick(NodeRef::from(node)));
        }
    }

    /// The pointer left the drawing surface.
    pub fn pointer_exit(&mut self) {
        if !self.gestures.is_active() {
            self.highlight.pointer_leave(&self.graph);
        }
    }

    pub fn secondary_click(&mut self, pointer: Pos2) {
        if let Some(index) = self.node_at(pointer) {
            let node = NodeRef::from(&self.graph.nodes[index]);
            self.events
                .push_back(GraphEvent::NodeContextMenu(node, pointer));
        }
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = GraphEvent> + '_ {
        self.events.drain(..)
    }

    pub fn is_dragging(&self) -> bool {
        self.gestures.held_node().is_some()
    }

    pub fn is_settled(&self) -> bool {
        self.simulation.is_settled()
    }

    /// True while the frame loop has work to do.
    pub fn wants_ticks(&self) -> bool {
        !self.simulation.is_settled() || self.gestures.is_active() || self.focused
    }

    /// Starts (or continues) the frame loop and returns the live ticket.
    pub fn start(&mut self) -> FrameTicket {
        self.ticker.start()
    }

    /// Runs one solver step if `ticket` is still current. Returns the ticket
    /// for the next frame, or `None` once the loop should stop.
    pub fn tick(&mut self, ticket: FrameTicket) -> Option<FrameTicket> {
        if !self.ticker.is_current(ticket) {
            return None;
        }

        self.simulation.tick();
        if self.wants_ticks() {
            Some(ticket)
        } else {
            self.ticker.park();
            None
        }
    }

    /// Ticks until settled or `max_ticks` is reached; returns ticks run.
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut ticket = Some(self.start());
        let mut ticks = 0;
        while let Some(current) = ticket {
            if ticks >= max_ticks {
                break;
            }
            ticket = self.tick(current);
            ticks += 1;
        }
        debug!(ticks, settled = self.is_settled(), "ran simulation");
        ticks
    }

    /// Stops the frame loop for good; outstanding tickets become inert.
    pub fn teardown(&mut self) {
        self.ticker.cancel();
        self.gestures.abort();
    }

    pub fn scene(&self) -> Scene {
        scene::build_scene(&SceneInputs {
            graph: &self.graph,
            nodes: self.simulation.nodes(),
            viewport: &self.viewport,
            highlight: &self.highlight,
            paint_order: &self.paint_order,
            mode: self.mode,
            label_max_chars: self.config.layered.label_max_chars,
            surface: self.surface,
        })
    }

    pub fn export_svg(&self) -> String {
        export::scene_to_svg(&self.scene())
    }

    pub fn export_png(&self, opts: &PngRenderOpts) -> Result<Vec<u8>, ExportError> {
        let png = export::svg_to_png(&self.export_svg(), opts)?;
        info!(bytes = png.len(), "exported scene");
        Ok(png)
    }

    fn update_hover(&mut self, pointer: Pos2) {
        match self.node_at(pointer) {
            Some(index) => self.highlight.pointer_enter(index, &self.graph),
            None => self.highlight.pointer_leave(&self.graph),
        }
    }

    /// Discards the projection and solver state and seeds new ones. Callers
    /// cancel the ticker first.
    fn reproject(&mut self) {
        self.gestures.abort();
        self.graph = project(&self.data, &self.filter);
        self.paint_order = scene::paint_order(&self.graph);
        self.simulation = Simulation::new(
            &self.graph,
            self.mode,
            self.surface * 0.5,
            self.config.physics,
            self.config.layered,
        );
        self.highlight.reset_projection(&self.graph);
        debug!(
            nodes = self.graph.node_count(),
            links = self.graph.link_count(),
            groups = self.filter.len(),
            "reseeded layout"
        );
    }
}

impl Default for GraphEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default(), vec2(800.0, 600.0))
    }
}
