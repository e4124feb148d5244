//! Rendering - accent graphs onto a 2D surface, and result cards / 渲染
//!
//! The surface trait mirrors a canvas-style 2D context: path building,
//! stroke/fill, full-circle arcs and centred text. `SvgSurface` is the
//! implementation shipped with the crate.

pub mod card;
pub mod svg;

use crate::accent::AccentLayout;
use crate::theme::Theme;

pub use card::ResultCard;
pub use svg::SvgSurface;

pub const LINE_WIDTH: f64 = 2.5;
pub const MARKER_RADIUS: f64 = 5.0;
pub const LABEL_FONT: &str = "16px sans-serif";
/// Text baseline for the reading labels (logical px) / 标签基线
pub const LABEL_BASELINE_Y: f64 = 35.0;

/// 2D drawing context / 绘图上下文
pub trait DrawingSurface {
    /// Set logical size and backing resolution
    fn resize(&mut self, css_width: f64, css_height: f64, pixel_width: u32, pixel_height: u32);
    fn scale(&mut self, factor: f64);
    fn set_line_width(&mut self, width: f64);
    fn set_font(&mut self, font: &str);
    fn set_stroke_color(&mut self, color: &str);
    fn set_fill_color(&mut self, color: &str);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    /// Full circle around (x, y)
    fn arc(&mut self, x: f64, y: f64, radius: f64);
    fn stroke(&mut self);
    fn fill(&mut self);
    /// Text horizontally centred on x, baseline at y
    fn fill_text_centered(&mut self, text: &str, x: f64, y: f64);
}

/// Graph colours / 配色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Line and markers, follows the theme
    pub graph: &'static str,
    /// Reading labels, same in both themes
    pub label: &'static str,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        let graph = match theme {
            Theme::Light => "#000000",
            Theme::Dark => "#F5F5F7",
        };
        Self {
            graph,
            label: "#8e8e93",
        }
    }
}

/// Draw one accent graph. Returns false (and draws nothing) for an empty layout.
///
/// Polyline through every point, filled markers on the moras, a hollow
/// marker on the particle, and the reading characters under the moras.
pub fn draw_accent_graph<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    layout: &AccentLayout,
    reading: &str,
    theme: Theme,
) -> bool {
    let Some(particle) = layout.particle_point() else {
        return false;
    };
    let palette = Palette::for_theme(theme);

    surface.resize(layout.css_width, layout.css_height, layout.pixel_width, layout.pixel_height);
    surface.scale(layout.scale);
    surface.set_line_width(LINE_WIDTH);
    surface.set_font(LABEL_FONT);

    surface.begin_path();
    let first = &layout.points[0];
    surface.move_to(first.x, first.y);
    for point in &layout.points[1..] {
        surface.line_to(point.x, point.y);
    }
    surface.set_stroke_color(palette.graph);
    surface.stroke();

    for (point, mora) in layout.mora_points().iter().zip(reading.chars()) {
        surface.begin_path();
        surface.arc(point.x, point.y, MARKER_RADIUS);
        surface.set_fill_color(palette.graph);
        surface.fill();

        surface.set_fill_color(palette.label);
        surface.fill_text_centered(&mora.to_string(), point.x, LABEL_BASELINE_Y);
    }

    surface.begin_path();
    surface.arc(particle.x, particle.y, MARKER_RADIUS);
    surface.set_stroke_color(palette.graph);
    surface.stroke();

    true
}
