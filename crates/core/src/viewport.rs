//! Viewport state and screen/image coordinate transform
//!
//! Screen space is the viewport's pixel grid; image space is the unscaled
//! pixel grid of the loaded image. A screen point maps to image space as
//! `(screen - pan) / zoom`.

use crate::annotation::Point;
use crate::config::Extent;

/// Smallest allowed zoom factor
pub const MIN_ZOOM: f32 = 0.2;

/// Largest allowed zoom factor
pub const MAX_ZOOM: f32 = 5.0;

/// Factor applied by one zoom-in or zoom-out step
pub const ZOOM_STEP: f32 = 1.2;

/// Share of the viewport a freshly loaded image may fill
pub const FIT_PADDING: f32 = 0.85;

/// Minimum screen margin kept around a centered image
pub const MIN_CENTER_MARGIN: f32 = 20.0;

/// Map a screen point into image space
pub fn to_image(screen: Point, pan: Point, zoom: f32) -> Point {
    Point::new((screen.x - pan.x) / zoom, (screen.y - pan.y) / zoom)
}

/// Map an image point onto the screen
pub fn to_screen(image: Point, pan: Point, zoom: f32) -> Point {
    Point::new(image.x * zoom + pan.x, image.y * zoom + pan.y)
}

/// Clamp a zoom factor into `[MIN_ZOOM, MAX_ZOOM]`
pub fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Zoom and pan of the viewport
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewportState {
    zoom: f32,
    pan: Point,
}

impl ViewportState {
    /// Create a viewport; the zoom is clamped
    pub fn new(zoom: f32, pan: Point) -> Self {
        Self {
            zoom: clamp_zoom(zoom),
            pan,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    /// Zoom as a rounded percentage, for the zoom indicator
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    pub fn to_image(&self, screen: Point) -> Point {
        to_image(screen, self.pan, self.zoom)
    }

    pub fn to_screen(&self, image: Point) -> Point {
        to_screen(image, self.pan, self.zoom)
    }

    /// Convert a screen-pixel length into image pixels
    pub fn screen_to_image_len(&self, px: f32) -> f32 {
        px / self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = clamp_zoom(zoom);
    }

    pub fn set_pan(&mut self, pan: Point) {
        self.pan = pan;
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    /// Back to 100% with no pan
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Point::ORIGIN;
    }

    /// Fit an image into the viewport and center it
    ///
    /// Never zooms past 100%; keeps at least `MIN_CENTER_MARGIN` pixels of
    /// margin at the top-left.
    pub fn fit(image: Extent, viewport: Extent) -> Self {
        let zoom = if image.width > 0.0 && image.height > 0.0 {
            let scale_x = viewport.width / image.width;
            let scale_y = viewport.height / image.height;
            clamp_zoom(scale_x.min(scale_y).min(1.0) * FIT_PADDING)
        } else {
            1.0
        };

        let centered_x = (viewport.width - image.width * zoom) / 2.0;
        let centered_y = (viewport.height - image.height * zoom) / 2.0;
        Self {
            zoom,
            pan: Point::new(
                centered_x.max(MIN_CENTER_MARGIN),
                centered_y.max(MIN_CENTER_MARGIN),
            ),
        }
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::ORIGIN,
        }
    }
}

/// Drag-to-pan tracker
///
/// While active it swallows every pointer event before any tool sees it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanState {
    active: bool,
    /// Screen point minus pan at press time
    anchor: Option<Point>,
}

impl PanState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.anchor = None;
        }
    }

    pub fn press(&mut self, screen: Point, viewport: &ViewportState) {
        self.anchor = Some(screen - viewport.pan());
    }

    pub fn drag(&mut self, screen: Point, viewport: &mut ViewportState) {
        if let Some(anchor) = self.anchor {
            viewport.set_pan(screen - anchor);
        }
    }

    pub fn release(&mut self) {
        self.anchor = None;
    }
}

/// Display filters for the underlying image
///
/// Percentages use 100 as neutral; hue is a rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ImageAdjustments {
    pub brightness: u16,
    pub contrast: u16,
    pub saturation: u16,
    pub hue: u16,
    pub gamma: u16,
    pub invert: bool,
}

impl ImageAdjustments {
    pub fn set_brightness(&mut self, value: u16) {
        self.brightness = value.min(200);
    }

    pub fn set_contrast(&mut self, value: u16) {
        self.contrast = value.min(200);
    }

    pub fn set_saturation(&mut self, value: u16) {
        self.saturation = value.min(200);
    }

    pub fn set_hue(&mut self, value: u16) {
        self.hue = value.min(360);
    }

    pub fn set_gamma(&mut self, value: u16) {
        self.gamma = value.clamp(20, 300);
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.invert = invert;
    }

    /// Apply every setter to another value, clamping out-of-range fields
    pub fn apply(&mut self, other: ImageAdjustments) {
        self.set_brightness(other.brightness);
        self.set_contrast(other.contrast);
        self.set_saturation(other.saturation);
        self.set_hue(other.hue);
        self.set_gamma(other.gamma);
        self.set_invert(other.invert);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for ImageAdjustments {
    fn default() -> Self {
        Self {
            brightness: 100,
            contrast: 100,
            saturation: 100,
            hue: 0,
            gamma: 100,
            invert: false,
        }
    }
}
