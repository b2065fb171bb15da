//! Scene serialization for the image export hook.
//!
//! The draw list is first written as SVG, then rasterized with resvg. Labels
//! use whatever sans-serif face the system font database resolves.

use std::fmt::Write as _;
use std::sync::Arc;

use eframe::egui::{Color32, Pos2};
use resvg::tiny_skia;
use resvg::usvg;
use thiserror::Error;

use super::scene::{DrawCommand, LinkPath, Scene};
use super::style::NodeShape;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to parse SVG: {0}")]
    Svg(#[from] usvg::Error),
    #[error("computed image dimensions are zero")]
    EmptySurface,
    #[error("failed to allocate a {width}x{height} pixmap")]
    Allocation { width: u32, height: u32 },
    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

/// Output size. With neither set the scene's own size is used; `width` wins
/// when both are given and the other side follows the aspect ratio.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngRenderOpts {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

pub fn scene_to_svg(scene: &Scene) -> String {
    let width = scene.size.x.max(1.0);
    let height = scene.size.y.max(1.0);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = writeln!(
        svg,
        r#"<rect x="0" y="0" width="{width}" height="{height}" fill="{}"/>"#,
        hex(scene.background)
    );

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
                let d = match *path {
                    LinkPath::Line { from, to } => {
                        format!("M{} L{}", point(from), point(to))
                    }
                    LinkPath::Cubic {
                        from,
                        control_a,
                        control_b,
                        to,
                    } => format!(
                        "M{} C{} {} {}",
                        point(from),
                        point(control_a),
                        point(control_b),
                        point(to)
                    ),
                };
                let _ = writeln!(
                    svg,
                    r#"<path d="{d}" fill="none" stroke="{}" stroke-opacity="{opacity}" stroke-width="{width}"/>"#,
                    hex(*color)
                );
                if let Some(arrow) = arrow {
                    let _ = writeln!(
                        svg,
                        r#"<polygon points="{} {} {}" fill="{}" fill-opacity="{opacity}"/>"#,
                        point(arrow.tip),
                        point(arrow.left),
                        point(arrow.right),
                        hex(*arrow_color)
                    );
                }
            }
            DrawCommand::Node {
                center,
                shape,
                radius,
                fill,
                opacity,
                ..
            } => match shape {
                NodeShape::Circle => {
                    let _ = writeln!(
                        svg,
                        r#"<circle cx="{}" cy="{}" r="{radius}" fill="{}" fill-opacity="{opacity}"/>"#,
                        center.x,
                        center.y,
                        hex(*fill)
                    );
                }
                NodeShape::Square => {
                    let _ = writeln!(
                        svg,
                        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" fill-opacity="{opacity}"/>"#,
                        center.x - radius,
                        center.y - radius,
                        radius * 2.0,
                        radius * 2.0,
                        hex(*fill)
                    );
                }
            },
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
                let text = escape(text);
                // Text is vertically centred on the anchor.
                let y = anchor.y + size * 0.35;
                let _ = writeln!(
                    svg,
                    r#"<text x="{}" y="{y}" font-family="sans-serif" font-size="{size}" fill="none" stroke="{}" stroke-width="{halo_width}" stroke-linejoin="round" opacity="{opacity}">{text}</text>"#,
                    anchor.x,
                    hex(*halo)
                );
                let _ = writeln!(
                    svg,
                    r#"<text x="{}" y="{y}" font-family="sans-serif" font-size="{size}" fill="{}" opacity="{opacity}">{text}</text>"#,
                    anchor.x,
                    hex(*color)
                );
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

pub fn svg_to_png(svg: &str, opts: &PngRenderOpts) -> Result<Vec<u8>, ExportError> {
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();

    let usvg_opts = usvg::Options {
        fontdb: Arc::new(fontdb),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(svg, &usvg_opts)?;

    let svg_size = tree.size();
    let svg_w = svg_size.width();
    let svg_h = svg_size.height();

    let (px_w, px_h) = match (opts.width, opts.height) {
        (Some(w), _) => (w, (svg_h * (w as f32 / svg_w)).ceil() as u32),
        (None, Some(h)) => ((svg_w * (h as f32 / svg_h)).ceil() as u32, h),
        (None, None) => (svg_w.ceil() as u32, svg_h.ceil() as u32),
    };
    if px_w == 0 || px_h == 0 {
        return Err(ExportError::EmptySurface);
    }

    let mut pixmap = tiny_skia::Pixmap::new(px_w, px_h).ok_or(ExportError::Allocation {
        width: px_w,
        height: px_h,
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let transform = tiny_skia::Transform::from_scale(px_w as f32 / svg_w, px_h as f32 / svg_h);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|error| ExportError::Encode(error.to_string()))
}

fn hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

fn point(position: Pos2) -> String {
    format!("{:.2},{:.2}", position.x, position.y)
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::Arrowhead;
    use eframe::egui::{pos2, vec2};

    fn assert_valid_png(data: &[u8]) {
        assert!(data.len() > 8, "PNG data too short");
        assert_eq!(&data[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }

    fn sample_scene() -> Scene {
        Scene {
            size: vec2(200.0, 100.0),
            background: Color32::WHITE,
            commands: vec![
                DrawCommand::Link {
                    index: 0,
                    path: LinkPath::Line {
                        from: pos2(20.0, 50.0),
                        to: pos2(180.0, 50.0),
                    },
                    arrow: Some(Arrowhead {
                        tip: pos2(168.0, 50.0),
                        left: pos2(160.0, 46.0),
                        right: pos2(160.0, 54.0),
                    }),
                    color: Color32::from_rgb(0xcb, 0xd5, 0xe1),
                    arrow_color: Color32::from_rgb(0x94, 0xa3, 0xb8),
                    opacity: 0.6,
                    width: 1.5,
                },
                DrawCommand::Node {
                    index: 0,
                    center: pos2(20.0, 50.0),
                    shape: NodeShape::Circle,
                    radius: 15.0,
                    fill: Color32::from_rgb(0x01, 0x76, 0xd3),
                    opacity: 1.0,
                },
                DrawCommand::Node {
                    index: 1,
                    center: pos2(180.0, 50.0),
                    shape: NodeShape::Square,
                    radius: 10.0,
                    fill: Color32::from_rgb(0xf9, 0x73, 0x16),
                    opacity: 0.1,
                },
                DrawCommand::Label {
                    index: 1,
                    anchor: pos2(193.0, 50.0),
                    text: "R&D <Trigger>".to_owned(),
                    size: 10.0,
                    color: Color32::from_rgb(0x33, 0x41, 0x55),
                    halo: Color32::WHITE,
                    halo_width: 3.0,
                    opacity: 1.0,
                },
            ],
        }
    }

    #[test]
    fn test_scene_to_svg_content() {
        let svg = scene_to_svg(&sample_scene());

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="200""#));
        assert!(svg.contains("M20.00,50.00 L180.00,50.00"));
        assert!(svg.contains(r##"<circle cx="20" cy="50" r="15" fill="#0176d3""##));
        assert!(svg.contains(r##"fill="#f97316" fill-opacity="0.1""##));
        assert!(svg.contains("R&amp;D &lt;Trigger&gt;"));
        assert!(svg.contains("<polygon"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_svg_to_png_scene() {
        let svg = scene_to_svg(&sample_scene());
        let png = svg_to_png(&svg, &PngRenderOpts::default()).expect("scene should render");
        assert_valid_png(&png);

        let pixmap = tiny_skia::Pixmap::decode_png(&png).expect("PNG should decode");
        assert_eq!(pixmap.width(), 200);
        assert_eq!(pixmap.height(), 100);
    }

    #[test]
    fn test_svg_to_png_width_scaling() {
        let svg = scene_to_svg(&sample_scene());
        let opts = PngRenderOpts {
            width: Some(400),
            height: Some(9999),
        };
        let png = svg_to_png(&svg, &opts).expect("scaled scene should render");

        let pixmap = tiny_skia::Pixmap::decode_png(&png).expect("PNG should decode");
        assert_eq!(pixmap.width(), 400);
        assert_eq!(pixmap.height(), 200);
    }

    #[test]
    fn test_svg_to_png_invalid_svg() {
        let result = svg_to_png("not valid svg at all", &PngRenderOpts::default());
        assert!(matches!(result, Err(ExportError::Svg(_))));
    }

    #[test]
    fn test_empty_scene_still_exports() {
        let scene = Scene {
            size: vec2(64.0, 32.0),
            ..Scene::default()
        };
        let png = svg_to_png(&scene_to_svg(&scene), &PngRenderOpts::default())
            .expect("empty scene should render");
        assert_valid_png(&png);
    }
}
