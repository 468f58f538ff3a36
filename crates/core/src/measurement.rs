//! Measurement geometry
//!
//! Pure functions for lengths, angles, areas and bounding boxes, plus the
//! per-kind figures shown in the external dimensions panel. All values are
//! in image pixels.

use crate::annotation::{Annotation, AnnotationKind, Point};
use std::f32::consts::PI;

/// Distance between two points
pub fn length(p0: Point, p1: Point) -> f32 {
    p0.distance_to(&p1)
}

/// Angle at `vertex` between the legs towards `start` and `end`, in degrees
///
/// Reports 0 when either leg has zero length.
pub fn angle_degrees(start: Point, vertex: Point, end: Point) -> f32 {
    let v1 = start - vertex;
    let v2 = end - vertex;
    let mag1 = v1.magnitude();
    let mag2 = v2.magnitude();

    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }

    let cos_angle = (v1.dot(&v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// Area of the box spanned by two corners
pub fn box_area(p0: Point, p1: Point) -> f32 {
    (p1.x - p0.x).abs() * (p1.y - p0.y).abs()
}

/// Area of a circle with the given radius
pub fn circle_area(radius: f32) -> f32 {
    PI * radius * radius
}

/// Area of an ellipse with the given radii
pub fn ellipse_area(radius_x: f32, radius_y: f32) -> f32 {
    PI * radius_x * radius_y
}

/// Ellipse center and radii from the two corners of its bounding box
pub fn ellipse_from_corners(p0: Point, p1: Point) -> (Point, f32, f32) {
    (
        p0.midpoint(&p1),
        (p1.x - p0.x).abs() / 2.0,
        (p1.y - p0.y).abs() / 2.0,
    )
}

/// Axis-aligned bounding box in image space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    /// Componentwise min/max over a set of points; `None` when empty
    pub fn of_points(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bbox = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for point in rest {
            bbox.min_x = bbox.min_x.min(point.x);
            bbox.min_y = bbox.min_y.min(point.y);
            bbox.max_x = bbox.max_x.max(point.x);
            bbox.max_y = bbox.max_y.max(point.y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn min(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// Grow outward by `amount` on every side
    pub fn expanded(&self, amount: f32) -> Self {
        BoundingBox {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    /// Inclusive containment test
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }
}

/// Bounding box of an annotation's defining points
pub fn bounding_box(annotation: &Annotation) -> Option<BoundingBox> {
    BoundingBox::of_points(annotation.points())
}

/// Per-kind figures for the dimensions panel
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Dimensions {
    Marker { x: f32, y: f32 },
    Box { width: f32, height: f32, area: f32 },
    Circle { radius: f32, diameter: f32, area: f32 },
    Ellipse { width: f32, height: f32, area: f32 },
    Line { length: f32 },
    Ruler { length: f32 },
    Angle { degrees: f32, first_leg: f32, second_leg: f32 },
    Freehand { bounding_width: f32, bounding_height: f32, point_count: usize },
    Text { width: f32, height: f32 },
}

/// One row of the dimensions panel
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DimensionRow {
    pub label: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl DimensionRow {
    fn new(label: &'static str, value: f32, unit: &'static str) -> Self {
        Self {
            label,
            value: format!("{value:.1}"),
            unit,
        }
    }
}

impl Dimensions {
    /// Compute the figures for an annotation
    ///
    /// Returns `None` when the annotation lacks the points its kind needs.
    pub fn of(annotation: &Annotation) -> Option<Self> {
        let points = annotation.points();
        let dims = match annotation.kind() {
            AnnotationKind::Marker => {
                let p = points.first()?;
                Dimensions::Marker { x: p.x, y: p.y }
            }
            AnnotationKind::Box => {
                let [p0, p1] = first_two(points)?;
                Dimensions::Box {
                    width: (p1.x - p0.x).abs(),
                    height: (p1.y - p0.y).abs(),
                    area: box_area(p0, p1),
                }
            }
            AnnotationKind::Circle => {
                let [center, edge] = first_two(points)?;
                let radius = length(center, edge);
                Dimensions::Circle {
                    radius,
                    diameter: radius * 2.0,
                    area: circle_area(radius),
                }
            }
            AnnotationKind::Ellipse => {
                let [p0, p1] = first_two(points)?;
                let (_, rx, ry) = ellipse_from_corners(p0, p1);
                Dimensions::Ellipse {
                    width: rx * 2.0,
                    height: ry * 2.0,
                    area: ellipse_area(rx, ry),
                }
            }
            AnnotationKind::Line => {
                let [p0, p1] = first_two(points)?;
                Dimensions::Line { length: length(p0, p1) }
            }
            AnnotationKind::Ruler => {
                let [p0, p1] = first_two(points)?;
                Dimensions::Ruler { length: length(p0, p1) }
            }
            AnnotationKind::Angle => {
                if points.len() < 3 {
                    return None;
                }
                let (start, vertex, end) = (points[0], points[1], points[2]);
                Dimensions::Angle {
                    degrees: angle_degrees(start, vertex, end),
                    first_leg: length(start, vertex),
                    second_leg: length(end, vertex),
                }
            }
            AnnotationKind::Freehand => {
                if points.len() < 2 {
                    return None;
                }
                let bbox = BoundingBox::of_points(points)?;
                Dimensions::Freehand {
                    bounding_width: bbox.width(),
                    bounding_height: bbox.height(),
                    point_count: points.len(),
                }
            }
            AnnotationKind::Text => {
                let [p0, p1] = first_two(points)?;
                Dimensions::Text {
                    width: (p1.x - p0.x).abs(),
                    height: (p1.y - p0.y).abs(),
                }
            }
        };
        Some(dims)
    }

    /// Area, for the kinds that enclose one
    pub fn area(&self) -> Option<f32> {
        match self {
            Dimensions::Box { area, .. }
            | Dimensions::Circle { area, .. }
            | Dimensions::Ellipse { area, .. } => Some(*area),
            _ => None,
        }
    }

    /// Labelled rows, values formatted to one decimal
    pub fn rows(&self) -> Vec<DimensionRow> {
        match *self {
            Dimensions::Marker { x, y } => vec![
                DimensionRow::new("X", x, "px"),
                DimensionRow::new("Y", y, "px"),
            ],
            Dimensions::Box { width, height, area } | Dimensions::Ellipse { width, height, area } => vec![
                DimensionRow::new("Width", width, "px"),
                DimensionRow::new("Height", height, "px"),
                DimensionRow::new("Area", area, "px²"),
            ],
            Dimensions::Circle { radius, diameter, area } => vec![
                DimensionRow::new("Radius", radius, "px"),
                DimensionRow::new("Diameter", diameter, "px"),
                DimensionRow::new("Area", area, "px²"),
            ],
            Dimensions::Line { length } | Dimensions::Ruler { length } => {
                vec![DimensionRow::new("Length", length, "px")]
            }
            Dimensions::Angle { degrees, first_leg, second_leg } => vec![
                DimensionRow::new("Angle", degrees, "°"),
                DimensionRow::new("Line 1 Length", first_leg, "px"),
                DimensionRow::new("Line 2 Length", second_leg, "px"),
            ],
            Dimensions::Freehand { bounding_width, bounding_height, point_count } => vec![
                DimensionRow::new("Bounding Width", bounding_width, "px"),
                DimensionRow::new("Bounding Height", bounding_height, "px"),
                DimensionRow {
                    label: "Points",
                    value: point_count.to_string(),
                    unit: "",
                },
            ],
            Dimensions::Text { width, height } => vec![
                DimensionRow::new("Width", width, "px"),
                DimensionRow::new("Height", height, "px"),
            ],
        }
    }
}

fn first_two(points: &[Point]) -> Option<[Point; 2]> {
    match points {
        [p0, p1, ..] => Some([*p0, *p1]),
        _ => None,
    }
}
