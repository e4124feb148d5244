//! SVG drawing surface / SVG 画布
//!
//! Coordinates are written in logical units; the document's width/height
//! carry the backing resolution and the viewBox maps one onto the other,
//! which is what the canvas scale transform does.

use quick_xml::escape::escape;
use std::fmt::Write;

use super::DrawingSurface;

#[derive(Debug, Clone, Copy)]
enum PathOp {
    Move(f64, f64),
    Line(f64, f64),
    Circle(f64, f64, f64),
}

pub struct SvgSurface {
    css_width: f64,
    css_height: f64,
    pixel_width: u32,
    pixel_height: u32,
    scale: f64,
    line_width: f64,
    font: String,
    stroke_color: String,
    fill_color: String,
    path: Vec<PathOp>,
    elements: Vec<String>,
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgSurface {
    pub fn new() -> Self {
        Self {
            css_width: 0.0,
            css_height: 0.0,
            pixel_width: 0,
            pixel_height: 0,
            scale: 1.0,
            line_width: 1.0,
            font: "10px sans-serif".to_string(),
            stroke_color: "#000000".to_string(),
            fill_color: "#000000".to_string(),
            path: Vec::new(),
            elements: Vec::new(),
        }
    }

    fn path_data(&self) -> String {
        let mut d = String::new();
        for op in &self.path {
            match op {
                PathOp::Move(x, y) => {
                    let _ = write!(d, "M{} {} ", fmt_num(*x), fmt_num(*y));
                }
                PathOp::Line(x, y) => {
                    let _ = write!(d, "L{} {} ", fmt_num(*x), fmt_num(*y));
                }
                PathOp::Circle(..) => {}
            }
        }
        d.trim_end().to_string()
    }

    fn circles(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.path.iter().filter_map(|op| match op {
            PathOp::Circle(x, y, r) => Some((*x, *y, *r)),
            _ => None,
        })
    }

    /// Finished SVG document / 生成 SVG 文档
    pub fn finish(&self) -> String {
        let view_width = self.pixel_width as f64 / self.scale;
        let view_height = self.pixel_height as f64 / self.scale;
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" style="width:{}px;height:{}px">"#,
            self.pixel_width,
            self.pixel_height,
            fmt_num(view_width),
            fmt_num(view_height),
            fmt_num(self.css_width),
            fmt_num(self.css_height),
        );
        for element in &self.elements {
            svg.push_str(element);
        }
        svg.push_str("</svg>");
        svg
    }
}

impl DrawingSurface for SvgSurface {
    fn resize(&mut self, css_width: f64, css_height: f64, pixel_width: u32, pixel_height: u32) {
        // Resizing a canvas clears it
        self.css_width = css_width;
        self.css_height = css_height;
        self.pixel_width = pixel_width;
        self.pixel_height = pixel_height;
        self.scale = 1.0;
        self.path.clear();
        self.elements.clear();
    }

    fn scale(&mut self, factor: f64) {
        self.scale *= factor;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn set_font(&mut self, font: &str) {
        self.font = font.to_string();
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.stroke_color = color.to_string();
    }

    fn set_fill_color(&mut self, color: &str) {
        self.fill_color = color.to_string();
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.push(PathOp::Move(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.push(PathOp::Line(x, y));
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64) {
        self.path.push(PathOp::Circle(x, y, radius));
    }

    fn stroke(&mut self) {
        let d = self.path_data();
        if !d.is_empty() {
            self.elements.push(format!(
                r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linejoin="miter"/>"#,
                d,
                escape(&self.stroke_color),
                fmt_num(self.line_width)
            ));
        }
        let circles: Vec<_> = self.circles().collect();
        for (x, y, r) in circles {
            self.elements.push(format!(
                r#"<circle cx="{}" cy="{}" r="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
                fmt_num(x),
                fmt_num(y),
                fmt_num(r),
                escape(&self.stroke_color),
                fmt_num(self.line_width)
            ));
        }
    }

    fn fill(&mut self) {
        let d = self.path_data();
        if !d.is_empty() {
            self.elements.push(format!(
                r#"<path d="{}" fill="{}"/>"#,
                d,
                escape(&self.fill_color)
            ));
        }
        let circles: Vec<_> = self.circles().collect();
        for (x, y, r) in circles {
            self.elements.push(format!(
                r#"<circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
                fmt_num(x),
                fmt_num(y),
                fmt_num(r),
                escape(&self.fill_color)
            ));
        }
    }

    fn fill_text_centered(&mut self, text: &str, x: f64, y: f64) {
        self.elements.push(format!(
            r#"<text x="{}" y="{}" text-anchor="middle" fill="{}" style="font:{}">{}</text>"#,
            fmt_num(x),
            fmt_num(y),
            escape(&self.fill_color),
            escape(&self.font),
            escape(text)
        ));
    }
}

/// Two decimals, trailing zeros trimmed / 数字格式化
fn fmt_num(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
