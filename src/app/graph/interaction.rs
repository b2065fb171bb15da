use eframe::egui::{self, Key, PointerButton, Pos2, Rect, Ui};

use super::super::ViewModel;

const KEYBOARD_ZOOM_STEP: f32 = 1.25;

fn to_surface(rect: Rect, screen: Pos2) -> Pos2 {
    (screen - rect.min).to_pos2()
}

impl ViewModel {
    /// Feeds this frame's pointer input for the canvas into the engine.
    pub(in crate::app) fn handle_canvas_pointer(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        let (hover, pressed, released, scroll) = ui.input(|input| {
            (
                input.pointer.hover_pos(),
                input.pointer.button_pressed(PointerButton::Primary),
                input.pointer.button_released(PointerButton::Primary),
                input.raw_scroll_delta.y,
            )
        });
        let inside = hover.filter(|pointer| rect.contains(*pointer));

        if let Some(pointer) = inside {
            if scroll.abs() > f32::EPSILON {
                let rate = self.engine.config().interaction.wheel_zoom_rate;
                self.engine.zoom_at(to_surface(rect, pointer), scroll * rate);
            }
            if pressed && response.hovered() {
                self.context_menu = None;
                self.engine.pointer_down(to_surface(rect, pointer));
            }
        }

        match hover {
            Some(pointer) if inside.is_some() || self.engine.is_dragging() => {
                self.engine.pointer_move(to_surface(rect, pointer));
            }
            _ => self.engine.pointer_exit(),
        }

        if released {
            self.engine.pointer_up();
        }

        if response.secondary_clicked()
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.engine.secondary_click(to_surface(rect, pointer));
        }

        self.engine.set_focus(response.has_focus());
    }

    /// Canvas shortcuts; ignored while a text field owns the keyboard.
    pub(in crate::app) fn handle_canvas_keys(&mut self, ui: &Ui) {
        if ui.ctx().wants_keyboard_input() {
            if ui.input(|input| input.key_pressed(Key::Escape)) {
                self.clear_search();
            }
            return;
        }

        let (escape, zoom_in, zoom_out, reset) = ui.input(|input| {
            (
                input.key_pressed(Key::Escape),
                input.key_pressed(Key::Plus) || input.key_pressed(Key::Equals),
                input.key_pressed(Key::Minus),
                input.key_pressed(Key::Num0),
            )
        });

        if escape {
            self.clear_search();
            self.context_menu = None;
        }
        if zoom_in {
            self.engine.zoom_by(KEYBOARD_ZOOM_STEP);
        }
        if zoom_out {
            self.engine.zoom_by(1.0 / KEYBOARD_ZOOM_STEP);
        }
        if reset {
            self.engine.reset_view();
        }
    }

    pub(in crate::app) fn clear_search(&mut self) {
        self.search.clear();
        self.engine.set_query("");
    }

    /// Moves engine events into viewer state.
    pub(in crate::app) fn apply_graph_events(&mut self) {
        use depgraph_view::engine::GraphEvent;

        for event in self.engine.drain_events() {
            match event {
                GraphEvent::NodeClick(node) => {
                    self.selected = Some(node.id);
                }
                GraphEvent::NodeContextMenu(node, pointer) => {
                    self.context_menu = Some((node, pointer));
                }
            }
        }
    }
}
