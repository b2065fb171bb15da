use eframe::egui::Color32;

pub const ACCENT: Color32 = Color32::from_rgb(0x01, 0x76, 0xd3);
pub const LINK: Color32 = Color32::from_rgb(0xcb, 0xd5, 0xe1);
pub const ARROW: Color32 = Color32::from_rgb(0x94, 0xa3, 0xb8);
pub const LABEL: Color32 = Color32::from_rgb(0x33, 0x41, 0x55);
pub const LABEL_HALO: Color32 = Color32::WHITE;
pub const BACKGROUND: Color32 = Color32::from_rgb(0xf8, 0xfa, 0xfc);

pub const LINK_WIDTH: f32 = 1.5;
pub const LABEL_SIZE: f32 = 10.0;
pub const LABEL_HALO_WIDTH: f32 = 3.0;
/// Horizontal gap between a node's edge and its label, in world units.
pub const LABEL_GAP: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
    Circle,
    Square,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
    pub shape: NodeShape,
    pub fill: Color32,
    /// Circle radius, or half the side of a square.
    pub radius: f32,
}

impl NodeStyle {
    const fn circle(fill: Color32, radius: f32) -> Self {
        Self {
            shape: NodeShape::Circle,
            fill,
            radius,
        }
    }

    const fn square(fill: Color32, side: f32) -> Self {
        Self {
            shape: NodeShape::Square,
            fill,
            radius: side * 0.5,
        }
    }
}

pub const FALLBACK_STYLE: NodeStyle = NodeStyle::circle(Color32::from_rgb(0x9c, 0xa3, 0xaf), 8.0);

pub fn node_style(group: &str) -> NodeStyle {
    match group {
        "Object" => NodeStyle::circle(ACCENT, 15.0),
        "Flow" => NodeStyle::circle(Color32::from_rgb(0x93, 0x33, 0xea), 12.0),
        "Trigger" => NodeStyle::square(Color32::from_rgb(0xf9, 0x73, 0x16), 20.0),
        "Field" => NodeStyle::circle(Color32::from_rgb(0x10, 0xb9, 0x81), 8.0),
        "ValidationRule" => NodeStyle::square(Color32::from_rgb(0xdc, 0x26, 0x26), 16.0),
        "ApexClass" => NodeStyle::square(Color32::from_rgb(0x0e, 0xa5, 0xe9), 18.0),
        "LWC" => NodeStyle::circle(Color32::from_rgb(0xea, 0xb3, 0x08), 10.0),
        "Aura" => NodeStyle::circle(Color32::from_rgb(0xdb, 0x27, 0x77), 10.0),
        "Visualforce" => NodeStyle::circle(Color32::from_rgb(0x4f, 0x46, 0xe5), 10.0),
        "Stage" => NodeStyle::circle(Color32::from_rgb(0x01, 0x44, 0x86), 14.0),
        _ => FALLBACK_STYLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_groups() {
        assert_eq!(node_style("Object").radius, 15.0);
        assert_eq!(node_style("Object").fill, ACCENT);

        let trigger = node_style("Trigger");
        assert_eq!(trigger.shape, NodeShape::Square);
        assert_eq!(trigger.radius, 10.0);
    }

    #[test]
    fn test_unknown_group_falls_back() {
        assert_eq!(node_style("CustomMetadataType"), FALLBACK_STYLE);
        assert_eq!(node_style(""), FALLBACK_STYLE);
        assert_eq!(FALLBACK_STYLE.shape, NodeShape::Circle);
        assert_eq!(FALLBACK_STYLE.radius, 8.0);
    }
}
