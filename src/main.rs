mod app;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use eframe::egui::vec2;
use tracing::info;

use depgraph_view::engine::{EngineConfig, GraphEngine, LayoutMode, PngRenderOpts};

use app::{GraphExplorerApp, GraphSource};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SampleArg {
    Dependency,
    Process,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    Force,
    Layered,
}

impl From<LayoutArg> for LayoutMode {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Force => Self::Force,
            LayoutArg::Layered => Self::Layered,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file with `nodes` and `links`.
    #[arg(long, conflicts_with = "sample")]
    graph: Option<PathBuf>,
    /// Built-in data set used when no graph file is given.
    #[arg(long, value_enum, default_value = "dependency")]
    sample: SampleArg,
    /// Defaults to layered for the process sample, force otherwise.
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,
    /// JSON engine settings; missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Render a settled layout to this PNG and exit.
    #[arg(long)]
    export: Option<PathBuf>,
    #[arg(long, default_value_t = 2000)]
    max_ticks: usize,
    #[arg(long, default_value_t = 1200.0)]
    width: f32,
    #[arg(long, default_value_t = 800.0)]
    height: f32,
}

impl Args {
    fn source(&self) -> GraphSource {
        match (&self.graph, self.sample) {
            (Some(path), _) => GraphSource::File(path.clone()),
            (None, SampleArg::Dependency) => GraphSource::DependencySample,
            (None, SampleArg::Process) => GraphSource::ProcessSample,
        }
    }

    fn layout_mode(&self) -> LayoutMode {
        match (self.layout, &self.graph, self.sample) {
            (Some(layout), _, _) => layout.into(),
            (None, None, SampleArg::Process) => LayoutMode::Layered,
            _ => LayoutMode::Force,
        }
    }
}

fn export_headless(args: &Args, config: EngineConfig, path: &Path) -> Result<()> {
    let source = args.source();
    let data = source.load()?;

    let mut engine = GraphEngine::new(config, vec2(args.width, args.height));
    engine.set_layout_mode(args.layout_mode());
    engine.set_data(data);
    let ticks = engine.run_until_settled(args.max_ticks);
    engine.fit_view();

    let png = engine
        .export_png(&PngRenderOpts::default())
        .context("failed to render graph image")?;
    fs::write(path, &png).with_context(|| format!("failed to write {}", path.display()))?;
    info!(
        source = %source.describe(),
        ticks,
        settled = engine.is_settled(),
        path = %path.display(),
        "exported graph"
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    if let Some(path) = &args.export {
        return export_headless(&args, config, path);
    }

    let source = args.source();
    let mode = args.layout_mode();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "depgraph-view",
        options,
        Box::new(move |cc| {
            Ok(Box::new(GraphExplorerApp::new(
                cc,
                source.clone(),
                config,
                mode,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
