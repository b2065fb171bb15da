use eframe::egui::{Pos2, Rect, Vec2, pos2};

use super::config::InteractionConfig;

/// Uniform scale and translation over world space:
/// `screen = world * scale + translation`, with screen coordinates relative
/// to the surface's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    scale: f32,
    translation: Vec2,
    min_scale: f32,
    max_scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&InteractionConfig::default())
    }
}

impl Viewport {
    pub fn new(config: &InteractionConfig) -> Self {
        let min_scale = config.min_scale.max(f32::EPSILON);
        Self {
            scale: 1.0,
            translation: Vec2::ZERO,
            min_scale,
            max_scale: config.max_scale.max(min_scale),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    pub fn world_to_screen(&self, world: Vec2) -> Pos2 {
        (world * self.scale + self.translation).to_pos2()
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.translation) / self.scale
    }

    /// Rescales by `2^delta`, keeping the world point under `focal` fixed.
    pub fn zoom_at(&mut self, focal: Pos2, delta: f32) {
        self.zoom_around(focal, 2.0_f32.powf(delta));
    }

    /// Multiplies the scale around the middle of the surface.
    pub fn zoom_by(&mut self, factor: f32, surface: Vec2) {
        self.zoom_around((surface * 0.5).to_pos2(), factor);
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.translation += delta;
    }

    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.translation = Vec2::ZERO;
    }

    /// Frames `bounds` (world space) inside the surface, leaving `padding`
    /// screen pixels on each side.
    pub fn fit_bounds(&mut self, bounds: Rect, surface: Vec2, padding: f32) {
        if !bounds.is_finite() || bounds.is_negative() {
            return;
        }

        let available = (surface - Vec2::splat(padding * 2.0)).max(Vec2::splat(1.0));
        let extent = bounds.size().max(Vec2::splat(1.0));
        self.scale = (available.x / extent.x)
            .min(available.y / extent.y)
            .clamp(self.min_scale, self.max_scale);
        self.translation = surface * 0.5 - bounds.center().to_vec2() * self.scale;
    }

    /// Screen-space rectangle covered by the surface, in world coordinates.
    pub fn visible_world_rect(&self, surface: Vec2) -> Rect {
        Rect::from_min_max(
            self.screen_to_world(Pos2::ZERO).to_pos2(),
            self.screen_to_world(pos2(surface.x, surface.y)).to_pos2(),
        )
    }

    fn zoom_around(&mut self, focal: Pos2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        let anchor = self.screen_to_world(focal);
        self.scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        self.translation = focal.to_vec2() - anchor * self.scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::vec2;

    fn assert_close(a: Pos2, b: Pos2) {
        assert!((a - b).length() < 1e-3, "{a:?} != {b:?}");
    }

    #[test]
    fn test_zoom_at_keeps_focal_point_fixed() {
        let mut viewport = Viewport::default();
        viewport.pan(vec2(37.0, -12.0));
        let focal = pos2(250.0, 180.0);
        let world = viewport.screen_to_world(focal);

        viewport.zoom_at(focal, 1.0);
        assert!((viewport.scale() - 2.0).abs() < 1e-6);
        assert_close(viewport.world_to_screen(world), focal);

        viewport.zoom_at(focal, -0.5);
        assert_close(viewport.world_to_screen(world), focal);
    }

    #[test]
    fn test_scale_clamps_silently() {
        let mut viewport = Viewport::default();
        viewport.zoom_at(pos2(0.0, 0.0), 10.0);
        assert_eq!(viewport.scale(), 4.0);

        viewport.zoom_at(pos2(0.0, 0.0), -20.0);
        assert_eq!(viewport.scale(), 0.1);

        viewport.zoom_at(pos2(0.0, 0.0), f32::NAN);
        assert_eq!(viewport.scale(), 0.1);
    }

    #[test]
    fn test_pan_and_reset() {
        let mut viewport = Viewport::default();
        viewport.pan(vec2(10.0, 20.0));
        assert_eq!(viewport.world_to_screen(Vec2::ZERO), pos2(10.0, 20.0));

        viewport.zoom_by(2.0, vec2(800.0, 600.0));
        viewport.reset();
        assert_eq!(viewport.scale(), 1.0);
        assert_eq!(viewport.translation(), Vec2::ZERO);
    }

    #[test]
    fn test_fit_bounds_centers_content() {
        let mut viewport = Viewport::default();
        let bounds = Rect::from_min_max(pos2(-100.0, -50.0), pos2(300.0, 150.0));
        let surface = vec2(800.0, 600.0);

        viewport.fit_bounds(bounds, surface, 50.0);

        assert!((viewport.scale() - 1.75).abs() < 1e-4);
        assert_close(
            viewport.world_to_screen(bounds.center().to_vec2()),
            pos2(400.0, 300.0),
        );
        let visible = viewport.visible_world_rect(surface);
        assert!(visible.contains_rect(bounds));
    }
}
