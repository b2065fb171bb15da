use eframe::egui::{self, Grid, RichText, Ui};

use depgraph_view::graph::{GraphData, LinkType};

use super::super::ViewModel;

struct RelatedLink {
    id: String,
    label: String,
    link_type: LinkType,
    is_visible: bool,
}

fn related_links(data: &GraphData, selected_id: &str, outgoing: bool) -> Vec<RelatedLink> {
    let mut related = data
        .links
        .iter()
        .filter_map(|link| {
            let (near, far) = if outgoing {
                (&link.source, &link.target)
            } else {
                (&link.target, &link.source)
            };
            if near != selected_id {
                return None;
            }
            let node = data.node(far)?;
            Some(RelatedLink {
                id: node.id.clone(),
                label: node.display_label().to_owned(),
                link_type: link.link_type,
                is_visible: false,
            })
        })
        .collect::<Vec<_>>();
    related.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
    related
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Click a node in the graph or a search result.");
            return;
        };

        let Some(node) = self.engine.data().node(&selected_id).cloned() else {
            ui.label("Selected node no longer exists in the graph data.");
            return;
        };

        ui.label(RichText::new(node.display_label()).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        let is_visible = self.engine.projected().index_of(&node.id).is_some();
        Grid::new("selection_fields")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                ui.label("Group");
                ui.label(node.group.as_str());
                ui.end_row();
                ui.label("Level");
                ui.label(node.level().to_string());
                ui.end_row();
                ui.label("Weight");
                ui.label(format!("{:.1}", node.weight));
                ui.end_row();
                ui.label("Visible");
                ui.label(if is_visible { "yes" } else { "filtered out" });
                ui.end_row();
                for (key, value) in &node.metadata {
                    ui.label(key.as_str());
                    ui.label(value.as_str());
                    ui.end_row();
                }
            });

        ui.horizontal(|ui| {
            if ui.add_enabled(is_visible, egui::Button::new("Centre")).clicked()
                && let Some(position) = self.engine.node_position(&node.id)
            {
                let surface = self.engine.surface();
                let screen = self.engine.viewport().world_to_screen(position);
                self.engine.pan(surface * 0.5 - screen.to_vec2());
            }
            if ui.button("Clear selection").clicked() {
                self.set_selected(None);
            }
        });

        let mut next_selection = None;
        for (heading, outgoing) in [("Outgoing links", true), ("Incoming links", false)] {
            ui.separator();
            let mut links = related_links(self.engine.data(), &node.id, outgoing);
            for link in &mut links {
                link.is_visible = self.engine.projected().index_of(&link.id).is_some();
            }

            ui.label(RichText::new(format!("{heading} ({})", links.len())).strong());
            if links.is_empty() {
                ui.small("None.");
                continue;
            }

            egui::ScrollArea::vertical()
                .id_salt(heading)
                .max_height(220.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    for link in &links {
                        let mut text = format!("{}  [{}]", link.label, link.link_type.label());
                        if !link.is_visible {
                            text.push_str("  (hidden)");
                        }
                        if ui.link(text).on_hover_text(link.id.as_str()).clicked() {
                            next_selection = Some(link.id.clone());
                        }
                    }
                });
        }

        if let Some(id) = next_selection {
            self.set_selected(Some(id));
        }
    }
}
