use std::path::Path;

use anyhow::{Context as _, Result};
use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::{info, warn};

use depgraph_view::engine::{GraphEngine, LayoutMode, PngRenderOpts};
use depgraph_view::engine::style::node_style;

use super::super::ViewModel;

const SEARCH_RESULT_ROWS: usize = 12;
const BUTTON_ZOOM_STEP: f32 = 1.25;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Best-first `(id, label)` pairs from the visible graph.
fn ranked_matches(engine: &GraphEngine, query: &str, limit: usize) -> Vec<(String, String)> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = engine
        .projected()
        .nodes
        .iter()
        .filter_map(|node| {
            let score = fuzzy_match_score(&matcher, node.display_label(), query)
                .max(fuzzy_match_score(&matcher, &node.id, query))?;
            Some((score, node.id.clone(), node.display_label().to_owned()))
        })
        .collect::<Vec<_>>();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.2.cmp(&b.2)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, id, label)| (id, label))
        .collect()
}

fn write_png(engine: &GraphEngine, path: &Path) -> Result<usize> {
    let png = engine
        .export_png(&PngRenderOpts::default())
        .context("failed to render graph image")?;
    std::fs::write(path, &png).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(png.len())
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        self.draw_search(ui);
        ui.separator();
        self.draw_layout_controls(ui);
        ui.separator();
        self.draw_group_filters(ui);
        ui.separator();
        self.draw_view_controls(ui);
        ui.separator();
        self.draw_export_controls(ui);
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label("Search (label or metadata)").on_hover_text(
            "Highlights every node whose label or metadata contains the text, ignoring case.",
        );
        let response = ui.text_edit_singleline(&mut self.search);
        if response.changed() {
            self.engine.set_query(&self.search);
        }

        let matches = ranked_matches(&self.engine, &self.search, SEARCH_RESULT_ROWS);
        if self.search.trim().is_empty() {
            return;
        }

        if matches.is_empty() {
            ui.small("No visible node matches.");
            return;
        }

        for (id, label) in matches {
            if ui.link(label).on_hover_text(id.as_str()).clicked() {
                self.set_selected(Some(id));
            }
        }
    }

    fn draw_layout_controls(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Layout").strong());
        let mut mode = self.engine.mode();
        ui.horizontal(|ui| {
            ui.radio_value(&mut mode, LayoutMode::Force, LayoutMode::Force.label());
            ui.radio_value(&mut mode, LayoutMode::Layered, LayoutMode::Layered.label());
        });
        if mode != self.engine.mode() {
            self.ticket = None;
            self.engine.set_layout_mode(mode);
        }
    }

    fn draw_group_filters(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Groups").strong());

        let mut toggled = None;
        for group in self.engine.group_tags() {
            let mut active = self.engine.filter().contains(&group);
            let swatch = node_style(&group).fill;
            ui.horizontal(|ui| {
                ui.label(RichText::new("■").color(swatch));
                if ui.checkbox(&mut active, group.as_str()).changed() {
                    toggled = Some(group.clone());
                }
            });
        }

        if let Some(group) = toggled {
            self.ticket = None;
            self.engine.toggle_group(&group);
            self.context_menu = None;
        }
    }

    fn draw_view_controls(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("View").strong());
        ui.horizontal_wrapped(|ui| {
            if ui.button("Zoom in").clicked() {
                self.engine.zoom_by(BUTTON_ZOOM_STEP);
            }
            if ui.button("Zoom out").clicked() {
                self.engine.zoom_by(1.0 / BUTTON_ZOOM_STEP);
            }
            if ui.button("Fit").clicked() {
                self.engine.fit_view();
            }
            if ui.button("Reset").clicked() {
                self.engine.reset_view();
            }
        });
        ui.small(format!("zoom {:.0}%", self.engine.viewport().scale() * 100.0));
        ui.checkbox(&mut self.show_fps_bar, "Show FPS");
    }

    fn draw_export_controls(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Export").strong());
        ui.horizontal(|ui| {
            ui.label("PNG path");
            ui.text_edit_singleline(&mut self.export_path);
        });

        let can_export = !self.export_path.trim().is_empty();
        if ui
            .add_enabled(can_export, egui::Button::new("Save image"))
            .clicked()
        {
            let path = Path::new(self.export_path.trim());
            self.export_status = Some(match write_png(&self.engine, path) {
                Ok(bytes) => {
                    info!(path = %path.display(), bytes, "saved graph image");
                    Ok(format!("Saved {} ({bytes} bytes)", path.display()))
                }
                Err(error) => {
                    warn!(error = %format!("{error:#}"), "graph image export failed");
                    Err(format!("{error:#}"))
                }
            });
        }

        match &self.export_status {
            Some(Ok(message)) => {
                ui.small(message.as_str());
            }
            Some(Err(message)) => {
                ui.colored_label(ui.visuals().error_fg_color, message.as_str());
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depgraph_view::engine::EngineConfig;
    use depgraph_view::graph::sample;
    use eframe::egui::vec2;

    fn engine() -> GraphEngine {
        let mut engine = GraphEngine::new(EngineConfig::default(), vec2(800.0, 600.0));
        engine.set_data(sample::dependency_graph());
        engine
    }

    #[test]
    fn test_ranked_matches_prefers_close_labels() {
        let matches = ranked_matches(&engine(), "account", 5);
        assert_eq!(matches.first().map(|(id, _)| id.as_str()), Some("Account"));
    }

    #[test]
    fn test_ranked_matches_blank_query() {
        assert!(ranked_matches(&engine(), "   ", 5).is_empty());
    }

    #[test]
    fn test_ranked_matches_respects_limit() {
        assert!(ranked_matches(&engine(), "a", 2).len() <= 2);
    }
}
