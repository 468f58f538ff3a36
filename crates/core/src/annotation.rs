//! Annotation data model
//!
//! Annotations are stored in image space: unscaled pixel coordinates of the
//! loaded image, origin at the top-left, y increasing downward.

use crate::error::{EngineError, EngineResult};
use std::fmt;
use std::ops::{Add, Sub};
use std::sync::Arc;

/// Unique identifier for an annotation
///
/// Opaque to the outside world; serialized as a UUID string.
pub type AnnotationId = uuid::Uuid;

/// Point in image space
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Length of this point taken as a vector from the origin
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Dot product, treating both points as vectors
    pub fn dot(&self, other: &Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Midpoint between this point and another
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Multiply both components by a factor
    pub fn scale(&self, factor: f32) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// RGBA color, (de)serialized as a `#rrggbb` or `#rrggbbaa` hex string
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    /// Translucent black used behind measurement labels
    pub const LABEL_PLATE: Color = Color { r: 0, g: 0, b: 0, a: 191 };

    /// Create a new color
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidColor(hex.to_string());
        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.is_ascii() || (digits.len() != 6 && digits.len() != 8) {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        let a = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = EngineError;

    fn try_from(value: String) -> EngineResult<Self> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        color.to_hex()
    }
}

/// Persisted annotation shapes
///
/// The `select` and `eraser` tools are not shapes and never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Marker,
    Box,
    Circle,
    Ellipse,
    Line,
    Ruler,
    Angle,
    Freehand,
    Text,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 9] = [
        AnnotationKind::Marker,
        AnnotationKind::Box,
        AnnotationKind::Circle,
        AnnotationKind::Ellipse,
        AnnotationKind::Line,
        AnnotationKind::Ruler,
        AnnotationKind::Angle,
        AnnotationKind::Freehand,
        AnnotationKind::Text,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::Marker => "marker",
            AnnotationKind::Box => "box",
            AnnotationKind::Circle => "circle",
            AnnotationKind::Ellipse => "ellipse",
            AnnotationKind::Line => "line",
            AnnotationKind::Ruler => "ruler",
            AnnotationKind::Angle => "angle",
            AnnotationKind::Freehand => "freehand",
            AnnotationKind::Text => "text",
        }
    }

    /// Whether a committed annotation of this kind may hold `count` points
    pub fn accepts_point_count(&self, count: usize) -> bool {
        match self {
            AnnotationKind::Marker => count == 1,
            AnnotationKind::Box
            | AnnotationKind::Circle
            | AnnotationKind::Ellipse
            | AnnotationKind::Line
            | AnnotationKind::Ruler
            | AnnotationKind::Text => count == 2,
            AnnotationKind::Angle => count == 3,
            AnnotationKind::Freehand => count >= 2,
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single annotation
///
/// This is also the plain record handed to external persistence.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Annotation {
    id: AnnotationId,
    kind: AnnotationKind,
    points: Vec<Point>,
    color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Annotation {
    /// Create a new annotation with a generated ID
    pub fn new(kind: AnnotationKind, points: Vec<Point>, color: Color) -> Self {
        Self::with_id(AnnotationId::new_v4(), kind, points, color)
    }

    /// Create an annotation with a specific ID
    pub fn with_id(id: AnnotationId, kind: AnnotationKind, points: Vec<Point>, color: Color) -> Self {
        Self {
            id,
            kind,
            points,
            color,
            text: None,
        }
    }

    /// Attach text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Create a copy with every point shifted by `delta` (preserves ID)
    pub fn translated(&self, delta: Point) -> Self {
        let mut moved = self.clone();
        for point in &mut moved.points {
            *point = *point + delta;
        }
        moved
    }

    /// Check the commit-time invariants for this annotation's kind
    ///
    /// Covers both the point count and the size rules: a shape that would
    /// draw as nothing (zero length, zero radius, zero area) is degenerate.
    pub fn validate(&self) -> EngineResult<()> {
        let degenerate = || EngineError::DegenerateAnnotation { kind: self.kind };

        if !self.kind.accepts_point_count(self.points.len())
            || self.points.iter().any(|p| !p.is_finite())
        {
            return Err(degenerate());
        }

        let ok = match self.kind {
            AnnotationKind::Marker | AnnotationKind::Angle | AnnotationKind::Freehand => true,
            AnnotationKind::Line | AnnotationKind::Ruler | AnnotationKind::Circle => {
                self.points[0] != self.points[1]
            }
            AnnotationKind::Box | AnnotationKind::Ellipse => {
                self.points[0].x != self.points[1].x && self.points[0].y != self.points[1].y
            }
            AnnotationKind::Text => self
                .text
                .as_deref()
                .is_some_and(|text| !text.trim().is_empty()),
        };

        if ok {
            Ok(())
        } else {
            Err(degenerate())
        }
    }
}

/// Ordered annotation collection
///
/// Order is insertion order and doubles as z-order: the last annotation is
/// drawn last (topmost). Annotations are held behind `Arc` so history
/// snapshots share everything a mutation did not touch.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct AnnotationSet {
    annotations: Vec<Arc<Annotation>>,
}

impl AnnotationSet {
    /// Create a new empty set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Iterate annotations in storage (z) order
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> + '_ {
        self.annotations.iter().map(|a| a.as_ref())
    }

    /// Get an annotation by ID
    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.iter().find(|a| a.id() == id)
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.position(id).is_some()
    }

    /// Storage index of an annotation
    pub fn position(&self, id: AnnotationId) -> Option<usize> {
        self.annotations.iter().position(|a| a.id() == id)
    }

    /// Copy out the plain record list for external persistence
    pub fn to_records(&self) -> Vec<Annotation> {
        self.iter().cloned().collect()
    }

    pub(crate) fn push(&mut self, annotation: Annotation) {
        self.annotations.push(Arc::new(annotation));
    }

    pub(crate) fn remove(&mut self, id: AnnotationId) -> Option<Arc<Annotation>> {
        let index = self.position(id)?;
        Some(self.annotations.remove(index))
    }

    /// Replace an annotation in place, keeping its z-order slot
    pub(crate) fn replace(&mut self, annotation: Annotation) -> bool {
        match self.position(annotation.id()) {
            Some(index) => {
                self.annotations[index] = Arc::new(annotation);
                true
            }
            None => false,
        }
    }
}

impl FromIterator<Annotation> for AnnotationSet {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        Self {
            annotations: iter.into_iter().map(Arc::new).collect(),
        }
    }
}
