use std::collections::VecDeque;

use eframe::egui::{self, Align, Context, Layout, vec2};

use depgraph_view::engine::{EngineConfig, GraphEngine, LayoutMode};
use depgraph_view::graph::GraphData;

use super::super::{GraphSource, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(data: GraphData, config: EngineConfig, mode: LayoutMode) -> Self {
        let mut engine = GraphEngine::new(config, vec2(1200.0, 800.0));
        engine.set_layout_mode(mode);
        engine.set_data(data);

        Self {
            engine,
            ticket: None,
            search: String::new(),
            selected: None,
            context_menu: None,
            export_path: "graph.png".to_owned(),
            export_status: None,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &GraphSource,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.update_fps_counter(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("depgraph-view");
                    ui.separator();
                    ui.label(format!("source: {}", source.describe()));
                    ui.label(format!("nodes: {}", self.engine.data().node_count()));
                    ui.label(format!("links: {}", self.engine.data().link_count()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload graph"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.visible_graph_text());
                        ui.label(self.simulation_status_text());
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }

    /// Swaps in freshly loaded data; the active query carries over.
    pub(in crate::app) fn replace_data(&mut self, data: GraphData) {
        self.ticket = None;
        self.engine.set_data(data);
        self.context_menu = None;
        if let Some(selected) = &self.selected
            && self.engine.data().node(selected).is_none()
        {
            self.selected = None;
        }
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        self.selected = selected;
        self.context_menu = None;
    }
}
