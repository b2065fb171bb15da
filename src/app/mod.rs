use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Result;
use eframe::egui::{self, Context, Pos2};
use tracing::{info, warn};

use depgraph_view::engine::{EngineConfig, FrameTicket, GraphEngine, LayoutMode, NodeRef};
use depgraph_view::graph::{GraphData, load_graph_file, sample};

mod graph;
mod render_utils;
mod ui;

/// Where the viewer gets its data from; re-read on every reload.
#[derive(Clone, Debug)]
pub enum GraphSource {
    File(PathBuf),
    DependencySample,
    ProcessSample,
}

impl GraphSource {
    pub fn load(&self) -> Result<GraphData> {
        match self {
            Self::File(path) => load_graph_file(path),
            Self::DependencySample => Ok(sample::dependency_graph()),
            Self::ProcessSample => Ok(sample::process_graph()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::DependencySample => "built-in dependency sample".to_owned(),
            Self::ProcessSample => "built-in process sample".to_owned(),
        }
    }
}

pub struct GraphExplorerApp {
    source: GraphSource,
    config: EngineConfig,
    initial_mode: LayoutMode,
    state: AppState,
    reload_rx: Option<Receiver<Result<GraphData, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<GraphData, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    engine: GraphEngine,
    ticket: Option<FrameTicket>,
    search: String,
    selected: Option<String>,
    context_menu: Option<(NodeRef, Pos2)>,
    export_path: String,
    export_status: Option<std::result::Result<String, String>>,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

impl GraphExplorerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: GraphSource,
        config: EngineConfig,
        initial_mode: LayoutMode,
    ) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            config,
            initial_mode,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: GraphSource) -> Receiver<Result<GraphData, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = source.load().map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: GraphSource) -> AppState {
        info!(source = %source.describe(), "loading graph");
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn ready_state(&self, data: GraphData) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(data, self.config, self.initial_mode)))
    }
}

impl eframe::App for GraphExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(data)) => transition = Some(Ok(data)),
                    Ok(Err(error)) => transition = Some(Err(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading dependency graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load dependency graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        retry = true;
                    }
                });
                if retry {
                    self.state = Self::start_load(self.source.clone());
                    return;
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.source, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    info!(source = %self.source.describe(), "reloading graph");
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(data)) => model.replace_data(data),
                        Ok(Err(error)) => {
                            warn!(%error, "reload failed");
                            transition = Some(Err(error));
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            if let AppState::Ready(model) = &mut self.state {
                model.engine.teardown();
            }
            self.state = match result {
                Ok(data) => self.ready_state(data),
                Err(error) => {
                    warn!(%error, "graph load failed");
                    AppState::Error(error)
                }
            };
        }
    }
}
