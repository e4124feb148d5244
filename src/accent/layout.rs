//! Accent graph geometry / 声调图布局
//!
//! Turns a pitch pattern into logical (CSS pixel) coordinates. The drawing
//! surface gets a resolution of `logical * device_pixel_ratio` and a matching
//! scale, so points stay in logical units and strokes stay crisp.

use serde::Serialize;

use crate::error::{LexiconError, Result};

/// Pitch level of one mora / 音高
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Pitch {
    High,
    Low,
}

impl Pitch {
    /// Only an exact `'H'` is high; any other letter is low
    pub fn from_letter(c: char) -> Self {
        if c == 'H' {
            Pitch::High
        } else {
            Pitch::Low
        }
    }

    /// Particle pitch: stays high only for accent type 0 (heiban)
    pub fn particle(accent_type: Option<i64>) -> Self {
        if accent_type == Some(0) {
            Pitch::High
        } else {
            Pitch::Low
        }
    }
}

/// Geometry constants, logical pixels / 布局常量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub spacing_per_mora: f64,
    pub horizontal_padding: f64,
    pub y_high: f64,
    pub y_low: f64,
    pub height: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            spacing_per_mora: 25.0,
            horizontal_padding: 15.0,
            y_high: 15.0,
            y_low: 45.0,
            height: 60.0,
        }
    }
}

impl LayoutMetrics {
    fn y_for(&self, pitch: Pitch) -> f64 {
        match pitch {
            Pitch::High => self.y_high,
            Pitch::Low => self.y_low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccentPoint {
    pub x: f64,
    pub y: f64,
    pub is_particle: bool,
}

/// Points plus the surface size they were laid out for / 布局结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccentLayout {
    /// `mora_count + 1` points, the last one is the particle; empty for no moras
    pub points: Vec<AccentPoint>,
    pub css_width: f64,
    pub css_height: f64,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Device pixel ratio applied to the surface transform
    pub scale: f64,
}

impl AccentLayout {
    fn empty() -> Self {
        Self {
            points: Vec::new(),
            css_width: 0.0,
            css_height: 0.0,
            pixel_width: 0,
            pixel_height: 0,
            scale: 1.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn mora_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn mora_points(&self) -> &[AccentPoint] {
        &self.points[..self.mora_count()]
    }

    pub fn particle_point(&self) -> Option<&AccentPoint> {
        self.points.last()
    }
}

/// Lay out a pitch pattern with the default metrics / 计算声调图坐标
pub fn layout(
    pitch_pattern: &str,
    accent_type: Option<i64>,
    reading: &str,
    container_width: f64,
    device_pixel_ratio: f64,
) -> Result<AccentLayout> {
    layout_with(
        &LayoutMetrics::default(),
        pitch_pattern,
        accent_type,
        reading,
        container_width,
        device_pixel_ratio,
    )
}

pub fn layout_with(
    metrics: &LayoutMetrics,
    pitch_pattern: &str,
    accent_type: Option<i64>,
    reading: &str,
    container_width: f64,
    device_pixel_ratio: f64,
) -> Result<AccentLayout> {
    let pitches = parse_pattern(pitch_pattern, reading)?;
    let mora_count = pitches.len();
    if mora_count == 0 {
        return Ok(AccentLayout::empty());
    }

    let mut full_pitch = pitches;
    full_pitch.push(Pitch::particle(accent_type));

    let ideal_width = metrics.spacing_per_mora * (mora_count + 1) as f64 + metrics.horizontal_padding;
    let final_width = ideal_width.min(container_width);

    // Narrower than the padding: collapse onto the start column
    let step_x = ((final_width - metrics.horizontal_padding) / mora_count as f64).max(0.0);
    let start_x = metrics.horizontal_padding / 2.0;

    let points = full_pitch
        .iter()
        .enumerate()
        .map(|(i, pitch)| AccentPoint {
            x: start_x + i as f64 * step_x,
            y: metrics.y_for(*pitch),
            is_particle: i == mora_count,
        })
        .collect();

    let scale = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };

    Ok(AccentLayout {
        points,
        css_width: final_width,
        css_height: metrics.height,
        pixel_width: (final_width.max(0.0) * scale).floor() as u32,
        pixel_height: (metrics.height * scale).floor() as u32,
        scale,
    })
}

/// Check the pattern against the reading, one letter per mora
fn parse_pattern(pitch_pattern: &str, reading: &str) -> Result<Vec<Pitch>> {
    let pattern_len = pitch_pattern.chars().count();
    let reading_len = reading.chars().count();
    if pattern_len != reading_len {
        return Err(LexiconError::InvalidPitchPattern {
            pattern: pitch_pattern.to_string(),
            reading: reading.to_string(),
            reason: format!("{} pitch letters for {} moras", pattern_len, reading_len),
        });
    }

    Ok(pitch_pattern.chars().map(Pitch::from_letter).collect())
}
