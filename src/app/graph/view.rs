use eframe::egui::{self, Align2, Color32, FontId, Sense, Ui, vec2};

use depgraph_view::engine::DrawCommand;

use super::super::ViewModel;
use super::super::render_utils::{
    bounds_visible, circle_visible, draw_background, paint_arrow, paint_label, paint_link,
    paint_node,
};

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.engine.resize(rect.size());
        self.handle_canvas_keys(ui);
        self.handle_canvas_pointer(ui, rect, &response);
        self.apply_graph_events();
        self.drive_simulation(ui.ctx());

        if self.engine.is_dragging() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grabbing);
        } else if self.engine.highlight_state().is_hover() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let scene = self.engine.scene();
        draw_background(&painter, rect, scene.background, self.engine.viewport());

        if self.engine.projected().is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No nodes match the active group filters.",
                FontId::proportional(14.0),
                Color32::from_gray(110),
            );
            return;
        }

        let origin = rect.min.to_vec2();
        for command in &scene.commands {
            match command {
                DrawCommand::Link {
                    path,
                    arrow,
                    color,
                    arrow_color,
                    opacity,
                    width,
                    ..
                } => {
                    if !bounds_visible(rect, path, origin) {
                        continue;
                    }
                    paint_link(&painter, path, origin, *color, *opacity, *width);
                    if let Some(arrow) = arrow {
                        paint_arrow(&painter, arrow, origin, *arrow_color, *opacity);
                    }
                }
                DrawCommand::Node {
                    center,
                    shape,
                    radius,
                    fill,
                    opacity,
                    ..
                } => {
                    let center = *center + origin;
                    if circle_visible(rect, center, *radius) {
                        paint_node(&painter, center, *shape, *radius, *fill, *opacity);
                    }
                }
                DrawCommand::Label {
                    anchor,
                    text,
                    size,
                    color,
                    halo,
                    halo_width,
                    opacity,
                    ..
                } => {
                    let anchor = *anchor + origin;
                    if rect.expand(200.0).contains(anchor) {
                        paint_label(
                            &painter,
                            anchor,
                            text,
                            *size,
                            *color,
                            *halo,
                            *halo_width,
                            *opacity,
                        );
                    }
                }
            }
        }

        if let Some(index) = self.engine.highlight_state().hovered()
            && let Some(node) = self.engine.node(index)
        {
            let neighbours = self.engine.projected().degree(index);
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}  |  links {neighbours}", node.display_label(), node.group),
                FontId::proportional(13.0),
                Color32::from_gray(40),
            );
        }

        self.draw_context_menu(ui, rect);
    }

    fn drive_simulation(&mut self, ctx: &egui::Context) {
        let mut ticket = self.ticket.take().and_then(|ticket| self.engine.tick(ticket));
        if ticket.is_none() && self.engine.wants_ticks() {
            let fresh = self.engine.start();
            ticket = self.engine.tick(fresh);
        }
        self.ticket = ticket;

        if self.ticket.is_some() {
            ctx.request_repaint();
        }
    }

    fn draw_context_menu(&mut self, ui: &Ui, rect: egui::Rect) {
        let Some((node, pointer)) = self.context_menu.clone() else {
            return;
        };

        let mut close = false;
        egui::Area::new(egui::Id::new("node-context-menu"))
            .order(egui::Order::Foreground)
            .fixed_pos(rect.min + pointer.to_vec2())
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.strong(node.label.as_str());
                    ui.small(format!("{}  ({})", node.id, node.group));
                    ui.separator();
                    if ui.button("Show details").clicked() {
                        self.selected = Some(node.id.clone());
                        close = true;
                    }
                    if ui.button(format!("Hide group {}", node.group)).clicked() {
                        self.engine.toggle_group(&node.group);
                        close = true;
                    }
                    if ui.button("Close").clicked() {
                        close = true;
                    }
                });
            });

        if close {
            self.context_menu = None;
        }
    }
}
