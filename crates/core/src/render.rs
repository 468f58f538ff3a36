//! Frame building for an external drawing surface
//!
//! Produces an ordered list of abstract draw primitives per frame. All
//! coordinates are in image space; the surface applies the frame's viewport
//! transform. Stroke widths and glyph sizes are screen pixels divided by
//! zoom, so they look the same at every zoom level.

use crate::annotation::{Annotation, AnnotationKind, AnnotationSet, Color, Point};
use crate::config::{EngineConfig, Extent};
use crate::measurement::{angle_degrees, ellipse_from_corners, length, BoundingBox};
use crate::viewport::{ImageAdjustments, ViewportState};

/// Marker ring radius (screen pixels)
const MARKER_RING_RADIUS: f32 = 10.0;
/// Marker center dot radius
const MARKER_DOT_RADIUS: f32 = 3.0;
/// Crosshair ticks run from this distance...
const MARKER_TICK_INNER: f32 = 12.0;
/// ...to this distance from the marker center
const MARKER_TICK_OUTER: f32 = 15.0;
const MARKER_TICK_WIDTH: f32 = 1.5;
/// Half height of ruler end caps
const RULER_CAP: f32 = 6.0;
const ANGLE_ARC_RADIUS: f32 = 25.0;
const ANGLE_ARC_WIDTH: f32 = 1.5;
const ANGLE_VERTEX_RADIUS: f32 = 4.0;
const SELECTION_STROKE: f32 = 1.0;

/// Visual primitive types an external surface must draw
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    /// The underlying image at the image-space origin
    Image {
        width: f32,
        height: f32,
        adjustments: ImageAdjustments,
    },
    /// Line segment
    Line {
        start: Point,
        end: Point,
        width: f32,
        color: Color,
        opacity: f32,
    },
    /// Open path through sampled points
    Polyline {
        points: Vec<Point>,
        width: f32,
        color: Color,
        opacity: f32,
    },
    /// Axis-aligned rectangle; `dash` is the dash length for dashed outlines
    Rectangle {
        min: Point,
        max: Point,
        fill_color: Option<Color>,
        stroke_color: Color,
        stroke_width: f32,
        dash: Option<f32>,
        opacity: f32,
    },
    /// Circle (stroke-only unless `fill_color` is set)
    Circle {
        center: Point,
        radius: f32,
        fill_color: Option<Color>,
        stroke_color: Color,
        stroke_width: f32,
        opacity: f32,
    },
    /// Axis-aligned ellipse outline
    Ellipse {
        center: Point,
        radius_x: f32,
        radius_y: f32,
        width: f32,
        color: Color,
        opacity: f32,
    },
    /// Circular arc starting at `start_angle`, sweeping `sweep_angle` (radians)
    Arc {
        center: Point,
        radius: f32,
        start_angle: f32,
        sweep_angle: f32,
        width: f32,
        color: Color,
        opacity: f32,
    },
    /// Text; `centered` anchors the horizontal center instead of the left edge
    Text {
        anchor: Point,
        text: String,
        font_size: f32,
        color: Color,
        centered: bool,
        opacity: f32,
    },
}

/// Target that draws primitives (canvas, GPU scene, SVG writer, ...)
pub trait DrawSurface {
    /// Called once per frame before any primitive
    fn begin(&mut self, _viewport: &ViewportState) {}

    fn draw(&mut self, primitive: &Primitive);
}

/// Everything one frame needs, borrowed from the engine
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub annotations: &'a AnnotationSet,
    pub draft: Option<&'a Annotation>,
    pub selected: Option<&'a Annotation>,
    pub viewport: &'a ViewportState,
    pub image: Option<Extent>,
    pub adjustments: ImageAdjustments,
    pub config: &'a EngineConfig,
}

/// Ordered draw list for one frame
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Frame {
    pub viewport: ViewportState,
    pub primitives: Vec<Primitive>,
}

impl Frame {
    /// Build the draw list: image, annotations in z-order, selection
    /// highlight, then the draft
    pub fn build(input: FrameInput<'_>) -> Self {
        let painter = Painter {
            config: input.config,
            viewport: input.viewport,
        };
        let mut primitives = Vec::new();

        if let Some(image) = input.image {
            primitives.push(Primitive::Image {
                width: image.width,
                height: image.height,
                adjustments: input.adjustments,
            });
        }

        for annotation in input.annotations.iter() {
            painter.annotation(annotation, 1.0, false, &mut primitives);
        }

        if let Some(selected) = input.selected {
            painter.selection(selected, &mut primitives);
        }

        if let Some(draft) = input.draft {
            painter.annotation(draft, input.config.draft_opacity, true, &mut primitives);
        }

        Self {
            viewport: *input.viewport,
            primitives,
        }
    }

    /// Hand every primitive to a surface, in order
    pub fn replay<S: DrawSurface + ?Sized>(&self, surface: &mut S) {
        surface.begin(&self.viewport);
        for primitive in &self.primitives {
            surface.draw(primitive);
        }
    }
}

/// Per-frame drawing helper
struct Painter<'a> {
    config: &'a EngineConfig,
    viewport: &'a ViewportState,
}

impl Painter<'_> {
    /// Screen pixels to image pixels at the frame's zoom
    fn px(&self, screen_px: f32) -> f32 {
        self.viewport.screen_to_image_len(screen_px)
    }

    fn annotation(&self, annotation: &Annotation, opacity: f32, is_draft: bool, out: &mut Vec<Primitive>) {
        let points = annotation.points();
        let color = annotation.color();
        let width = self.px(self.config.stroke_width_px);

        match annotation.kind() {
            AnnotationKind::Marker => {
                if let Some(&center) = points.first() {
                    self.marker(center, color, opacity, out);
                }
            }

            AnnotationKind::Box => {
                if let Some(rect) = two_point_box(points) {
                    out.push(Primitive::Rectangle {
                        min: rect.min(),
                        max: Point::new(rect.max_x, rect.max_y),
                        fill_color: None,
                        stroke_color: color,
                        stroke_width: width,
                        dash: None,
                        opacity,
                    });
                }
            }

            AnnotationKind::Circle => {
                if let [center, edge, ..] = points {
                    out.push(Primitive::Circle {
                        center: *center,
                        radius: length(*center, *edge),
                        fill_color: None,
                        stroke_color: color,
                        stroke_width: width,
                        opacity,
                    });
                }
            }

            AnnotationKind::Ellipse => {
                if let [p0, p1, ..] = points {
                    let (center, radius_x, radius_y) = ellipse_from_corners(*p0, *p1);
                    out.push(Primitive::Ellipse {
                        center,
                        radius_x,
                        radius_y,
                        width,
                        color,
                        opacity,
                    });
                }
            }

            AnnotationKind::Line => {
                if let [start, end, ..] = points {
                    out.push(line(*start, *end, width, color, opacity));
                }
            }

            AnnotationKind::Ruler => {
                if let [start, end, ..] = points {
                    self.ruler(*start, *end, color, opacity, out);
                }
            }

            AnnotationKind::Angle => self.angle(points, color, opacity, out),

            AnnotationKind::Freehand => {
                if points.len() >= 2 {
                    out.push(Primitive::Polyline {
                        points: points.to_vec(),
                        width,
                        color,
                        opacity,
                    });
                }
            }

            AnnotationKind::Text => {
                let Some(rect) = two_point_box(points) else {
                    return;
                };
                if is_draft {
                    out.push(Primitive::Rectangle {
                        min: rect.min(),
                        max: Point::new(rect.max_x, rect.max_y),
                        fill_color: None,
                        stroke_color: color,
                        stroke_width: self.px(SELECTION_STROKE),
                        dash: Some(self.px(self.config.selection_dash_px)),
                        opacity,
                    });
                }
                if let Some(text) = annotation.text().filter(|t| !t.is_empty()) {
                    out.push(Primitive::Text {
                        anchor: rect.min(),
                        text: text.to_string(),
                        font_size: self.px(self.config.text_font_px),
                        color,
                        centered: false,
                        opacity,
                    });
                }
            }
        }
    }

    /// Ring, center dot and four crosshair ticks
    fn marker(&self, center: Point, color: Color, opacity: f32, out: &mut Vec<Primitive>) {
        out.push(Primitive::Circle {
            center,
            radius: self.px(MARKER_RING_RADIUS),
            fill_color: None,
            stroke_color: color,
            stroke_width: self.px(self.config.stroke_width_px),
            opacity,
        });
        out.push(Primitive::Circle {
            center,
            radius: self.px(MARKER_DOT_RADIUS),
            fill_color: Some(color),
            stroke_color: color,
            stroke_width: 0.0,
            opacity,
        });

        let inner = self.px(MARKER_TICK_INNER);
        let outer = self.px(MARKER_TICK_OUTER);
        let tick = self.px(MARKER_TICK_WIDTH);
        for (dx, dy) in [(-1.0, 0.0), (1.0, 0.0), (0.0, -1.0), (0.0, 1.0)] {
            let dir = Point::new(dx, dy);
            out.push(line(center + dir.scale(inner), center + dir.scale(outer), tick, color, opacity));
        }
    }

    fn ruler(&self, start: Point, end: Point, color: Color, opacity: f32, out: &mut Vec<Primitive>) {
        let width = self.px(self.config.stroke_width_px);
        let cap = Point::new(0.0, self.px(RULER_CAP));
        out.push(line(start, end, width, color, opacity));
        out.push(line(start - cap, start + cap, width, color, opacity));
        out.push(line(end - cap, end + cap, width, color, opacity));

        let mid = start.midpoint(&end);
        self.label(
            format!("{:.1}px", length(start, end)),
            Point::new(mid.x - self.px(25.0), mid.y - self.px(20.0)),
            Extent::new(self.px(50.0), self.px(16.0)),
            Point::new(mid.x, mid.y - self.px(8.0)),
            opacity,
            out,
        );
    }

    /// Both legs, the arc between them and the degree label
    ///
    /// A two-point angle (the draft before the end click) draws only the
    /// first leg and the vertex dot.
    fn angle(&self, points: &[Point], color: Color, opacity: f32, out: &mut Vec<Primitive>) {
        let width = self.px(self.config.stroke_width_px);
        let (start, vertex) = match points {
            [start, vertex, ..] => (*start, *vertex),
            _ => return,
        };
        out.push(line(start, vertex, width, color, opacity));

        if let Some(&end) = points.get(2) {
            out.push(line(vertex, end, width, color, opacity));

            let v1 = start - vertex;
            let v2 = end - vertex;
            if v1 != Point::ORIGIN && v2 != Point::ORIGIN {
                let start_angle = v1.y.atan2(v1.x);
                let end_angle = v2.y.atan2(v2.x);
                out.push(Primitive::Arc {
                    center: vertex,
                    radius: self.px(ANGLE_ARC_RADIUS),
                    start_angle,
                    sweep_angle: shortest_sweep(start_angle, end_angle),
                    width: self.px(ANGLE_ARC_WIDTH),
                    color,
                    opacity,
                });
            }

            self.label(
                format!("{:.1}°", angle_degrees(start, vertex, end)),
                Point::new(vertex.x + self.px(20.0), vertex.y - self.px(25.0)),
                Extent::new(self.px(45.0), self.px(18.0)),
                Point::new(vertex.x + self.px(42.0), vertex.y - self.px(12.0)),
                opacity,
                out,
            );
        }

        out.push(Primitive::Circle {
            center: vertex,
            radius: self.px(ANGLE_VERTEX_RADIUS),
            fill_color: Some(color),
            stroke_color: color,
            stroke_width: 0.0,
            opacity,
        });
    }

    /// Measurement text on a dark plate
    fn label(
        &self,
        text: String,
        plate_min: Point,
        plate_size: Extent,
        anchor: Point,
        opacity: f32,
        out: &mut Vec<Primitive>,
    ) {
        out.push(Primitive::Rectangle {
            min: plate_min,
            max: plate_min + Point::new(plate_size.width, plate_size.height),
            fill_color: Some(Color::LABEL_PLATE),
            stroke_color: Color::LABEL_PLATE,
            stroke_width: 0.0,
            dash: None,
            opacity,
        });
        out.push(Primitive::Text {
            anchor,
            text,
            font_size: self.px(self.config.label_font_px),
            color: Color::WHITE,
            centered: true,
            opacity,
        });
    }

    /// Dashed box around the selected annotation
    fn selection(&self, annotation: &Annotation, out: &mut Vec<Primitive>) {
        let Some(bbox) = BoundingBox::of_points(annotation.points()) else {
            return;
        };
        let padded = bbox.expanded(self.px(self.config.selection_padding_px));
        out.push(Primitive::Rectangle {
            min: padded.min(),
            max: Point::new(padded.max_x, padded.max_y),
            fill_color: None,
            stroke_color: Color::WHITE,
            stroke_width: self.px(SELECTION_STROKE),
            dash: Some(self.px(self.config.selection_dash_px)),
            opacity: 1.0,
        });
    }
}

fn line(start: Point, end: Point, width: f32, color: Color, opacity: f32) -> Primitive {
    Primitive::Line {
        start,
        end,
        width,
        color,
        opacity,
    }
}

fn two_point_box(points: &[Point]) -> Option<BoundingBox> {
    match points {
        [p0, p1, ..] => BoundingBox::of_points(&[*p0, *p1]),
        _ => None,
    }
}

/// Signed sweep from `from` to `to`, in `(-PI, PI]`
fn shortest_sweep(from: f32, to: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut sweep = (to - from) % TAU;
    if sweep > PI {
        sweep -= TAU;
    } else if sweep <= -PI {
        sweep += TAU;
    }
    sweep
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(kind: AnnotationKind, points: &[(f32, f32)]) -> Annotation {
        let points = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        Annotation::new(kind, points, Color::BLACK)
    }

    fn frame(set: &AnnotationSet, draft: Option<&Annotation>, selected: Option<&Annotation>, zoom: f32) -> Frame {
        let config = EngineConfig::default();
        let viewport = ViewportState::new(zoom, Point::ORIGIN);
        Frame::build(FrameInput {
            annotations: set,
            draft,
            selected,
            viewport: &viewport,
            image: Some(Extent::new(640.0, 480.0)),
            adjustments: ImageAdjustments::default(),
            config: &config,
        })
    }

    #[test]
    fn test_order_is_image_set_then_draft() {
        let set: AnnotationSet = vec![
            annotation(AnnotationKind::Box, &[(0.0, 0.0), (10.0, 10.0)]),
            annotation(AnnotationKind::Line, &[(0.0, 0.0), (10.0, 10.0)]),
        ]
        .into_iter()
        .collect();
        let draft = annotation(AnnotationKind::Freehand, &[(1.0, 1.0), (2.0, 2.0)]);
        let frame = frame(&set, Some(&draft), None, 1.0);

        assert!(matches!(frame.primitives[0], Primitive::Image { .. }));
        assert!(matches!(frame.primitives[1], Primitive::Rectangle { .. }));
        assert!(matches!(frame.primitives[2], Primitive::Line { .. }));
        let Primitive::Polyline { opacity, .. } = &frame.primitives[3] else {
            panic!("draft should be drawn last");
        };
        assert_eq!(*opacity, 0.7);
    }

    #[test]
    fn test_stroke_width_divided_by_zoom() {
        let set: AnnotationSet = vec![annotation(AnnotationKind::Line, &[(0.0, 0.0), (10.0, 0.0)])]
            .into_iter()
            .collect();
        for (zoom, expected) in [(1.0, 2.0), (2.0, 1.0), (0.5, 4.0)] {
            let frame = frame(&set, None, None, zoom);
            let Primitive::Line { width, .. } = frame.primitives[1] else {
                panic!("expected line");
            };
            assert!((width - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_selection_highlight_is_dashed_and_padded() {
        let rect = annotation(AnnotationKind::Box, &[(10.0, 10.0), (110.0, 60.0)]);
        let set: AnnotationSet = vec![rect.clone()].into_iter().collect();
        let frame = frame(&set, None, Some(&rect), 2.0);

        let Some(Primitive::Rectangle { min, max, dash, .. }) = frame.primitives.last() else {
            panic!("expected selection rectangle");
        };
        assert_eq!(*min, Point::new(7.0, 7.0));
        assert_eq!(*max, Point::new(113.0, 63.0));
        assert_eq!(*dash, Some(2.0));
    }

    #[test]
    fn test_ruler_label() {
        let set: AnnotationSet = vec![annotation(AnnotationKind::Ruler, &[(0.0, 0.0), (30.0, 40.0)])]
            .into_iter()
            .collect();
        let frame = frame(&set, None, None, 1.0);
        let label = frame.primitives.iter().find_map(|p| match p {
            Primitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        });
        assert_eq!(label, Some("50.0px"));
    }

    #[test]
    fn test_angle_label_and_arc() {
        let set: AnnotationSet = vec![annotation(AnnotationKind::Angle, &[(10.0, 0.0), (0.0, 0.0), (0.0, 10.0)])]
            .into_iter()
            .collect();
        let frame = frame(&set, None, None, 1.0);
        let sweep = frame.primitives.iter().find_map(|p| match p {
            Primitive::Arc { sweep_angle, .. } => Some(*sweep_angle),
            _ => None,
        });
        assert!((sweep.unwrap() - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!(frame.primitives.iter().any(|p| matches!(p, Primitive::Text { text, .. } if text == "90.0°")));
    }

    #[test]
    fn test_incomplete_drafts_draw_nothing() {
        let set = AnnotationSet::new();
        let draft = annotation(AnnotationKind::Box, &[(1.0, 1.0)]);
        let frame = frame(&set, Some(&draft), None, 1.0);
        assert_eq!(frame.primitives.len(), 1);
    }

    #[test]
    fn test_replay_visits_every_primitive() {
        struct Counter(usize, bool);
        impl DrawSurface for Counter {
            fn begin(&mut self, _viewport: &ViewportState) {
                self.1 = true;
            }
            fn draw(&mut self, _primitive: &Primitive) {
                self.0 += 1;
            }
        }

        let set: AnnotationSet = vec![annotation(AnnotationKind::Marker, &[(5.0, 5.0)])].into_iter().collect();
        let frame = frame(&set, None, None, 1.0);
        let mut counter = Counter(0, false);
        frame.replay(&mut counter);
        // image + ring + dot + 4 ticks
        assert_eq!(counter.0, 7);
        assert!(counter.1);
    }

    #[test]
    fn test_shortest_sweep_wraps() {
        use std::f32::consts::PI;
        assert!((shortest_sweep(0.9 * PI, -0.9 * PI) - 0.2 * PI).abs() < 1e-5);
        assert!((shortest_sweep(-0.9 * PI, 0.9 * PI) + 0.2 * PI).abs() < 1e-5);
    }
}
