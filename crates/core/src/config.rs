//! Engine configuration
//!
//! Every field has a default, so a config file only needs the values it
//! wants to change. Sizes suffixed `_px` are screen pixels and get divided
//! by the zoom factor before use in image space.

use crate::annotation::{AnnotationKind, Color};
use crate::error::{EngineError, EngineResult};

/// Width and height pair
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Extent {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Default color for each annotation kind
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Palette {
    pub marker: Color,
    pub r#box: Color,
    pub circle: Color,
    pub ellipse: Color,
    pub line: Color,
    pub ruler: Color,
    pub angle: Color,
    pub freehand: Color,
    pub text: Color,
}

impl Palette {
    pub fn color_for(&self, kind: AnnotationKind) -> Color {
        match kind {
            AnnotationKind::Marker => self.marker,
            AnnotationKind::Box => self.r#box,
            AnnotationKind::Circle => self.circle,
            AnnotationKind::Ellipse => self.ellipse,
            AnnotationKind::Line => self.line,
            AnnotationKind::Ruler => self.ruler,
            AnnotationKind::Angle => self.angle,
            AnnotationKind::Freehand => self.freehand,
            AnnotationKind::Text => self.text,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            marker: Color::rgb(0xf4, 0x3f, 0x5e),   // Rose
            r#box: Color::rgb(0x22, 0xc5, 0x5e),    // Green
            circle: Color::rgb(0x3b, 0x82, 0xf6),   // Blue
            ellipse: Color::rgb(0xec, 0x48, 0x99),  // Pink
            line: Color::rgb(0xf5, 0x9e, 0x0b),     // Amber
            ruler: Color::rgb(0x8b, 0x5c, 0xf6),    // Violet
            angle: Color::rgb(0x06, 0xb6, 0xd4),    // Cyan
            freehand: Color::rgb(0xef, 0x44, 0x44), // Red
            text: Color::rgb(0xa8, 0x55, 0xf7),     // Purple
        }
    }
}

/// Tunables for hit testing, gestures and rendering
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hit radius in screen pixels (divided by zoom for image space)
    pub hit_radius_px: f32,

    /// Extra marker hit allowance in image pixels, on top of the hit radius
    pub marker_hit_allowance: f32,

    /// Stroke width for shapes
    pub stroke_width_px: f32,

    /// Opacity of the in-progress draft
    pub draft_opacity: f32,

    /// Gap between a selected shape and its highlight box
    pub selection_padding_px: f32,

    /// Dash length of the selection highlight
    pub selection_dash_px: f32,

    /// Smallest text-box drag (image pixels, exclusive) that opens text entry
    pub text_min_drag: Extent,

    /// Smallest editable text area (image pixels)
    pub text_min_area: Extent,

    /// Font size of text annotations
    pub text_font_px: f32,

    /// Font size of measurement labels
    pub label_font_px: f32,

    /// Per-kind default colors
    pub palette: Palette,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hit_radius_px: 15.0,
            marker_hit_allowance: 8.0,
            stroke_width_px: 2.0,
            draft_opacity: 0.7,
            selection_padding_px: 6.0,
            selection_dash_px: 4.0,
            text_min_drag: Extent::new(20.0, 15.0),
            text_min_area: Extent::new(100.0, 30.0),
            text_font_px: 16.0,
            label_font_px: 12.0,
            palette: Palette::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break hit testing or rendering
    pub fn validate(&self) -> EngineResult<()> {
        let positive = [
            ("hit_radius_px", self.hit_radius_px),
            ("stroke_width_px", self.stroke_width_px),
            ("selection_padding_px", self.selection_padding_px),
            ("selection_dash_px", self.selection_dash_px),
            ("text_min_drag.width", self.text_min_drag.width),
            ("text_min_drag.height", self.text_min_drag.height),
            ("text_min_area.width", self.text_min_area.width),
            ("text_min_area.height", self.text_min_area.height),
            ("text_font_px", self.text_font_px),
            ("label_font_px", self.label_font_px),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if !self.marker_hit_allowance.is_finite() || self.marker_hit_allowance < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "marker_hit_allowance must be zero or positive, got {}",
                self.marker_hit_allowance
            )));
        }

        if !(self.draft_opacity > 0.0 && self.draft_opacity <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "draft_opacity must be in (0, 1], got {}",
                self.draft_opacity
            )));
        }

        Ok(())
    }
}
