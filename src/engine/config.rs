use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Constants shared by both layout modes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Many-body strength; negative values repel.
    pub charge: f32,
    pub charge_min_distance: f32,
    pub barnes_hut_theta: f32,
    pub link_distance: f32,
    pub collide_radius: f32,
    pub collide_strength: f32,
    pub center_strength: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
    /// Alpha level held while a node is being dragged.
    pub drag_alpha_target: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            charge: -300.0,
            charge_min_distance: 1.0,
            barnes_hut_theta: 0.9,
            link_distance: 100.0,
            collide_radius: 30.0,
            collide_strength: 0.7,
            center_strength: 0.5,
            velocity_decay: 0.4,
            alpha_min: 0.001,
            drag_alpha_target: 0.3,
        }
    }
}

impl PhysicsConfig {
    /// Per-tick decay that brings alpha from 1 to `alpha_min` in 300 ticks.
    pub fn alpha_decay(&self) -> f32 {
        1.0 - self.alpha_min.clamp(1e-6, 0.999).powf(1.0 / 300.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayeredConfig {
    pub column_width: f32,
    pub x_strength: f32,
    pub y_strength: f32,
    pub link_strength_scale: f32,
    pub label_max_chars: usize,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self {
            column_width: 220.0,
            x_strength: 1.0,
            y_strength: 0.05,
            link_strength_scale: 0.3,
            label_max_chars: 18,
        }
    }
}

impl LayeredConfig {
    pub fn column_center(&self, level: u32) -> f32 {
        (level as f32 * self.column_width) + (self.column_width * 0.5)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Pointer travel in screen pixels after which a press becomes a drag.
    pub click_threshold: f32,
    pub wheel_zoom_rate: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 4.0,
            click_threshold: 3.0,
            wheel_zoom_rate: 0.002,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub physics: PhysicsConfig,
    pub layered: LayeredConfig,
    pub interaction: InteractionConfig,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid engine config {}", path.display()))
    }
}
