//! X-ray annotation engine
//!
//! Geometry core for overlaying annotations and measurements on a zoomable,
//! pannable raster image: data model, hit testing, the tool gesture state
//! machine, the screen/image transform and undo/redo history. Drawing is
//! left to an external surface that consumes the emitted primitives.

pub mod annotation;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod input;
pub mod measurement;
pub mod render;
pub mod tool;
pub mod viewport;

pub use annotation::{Annotation, AnnotationId, AnnotationKind, AnnotationSet, Color, Point};
pub use config::{EngineConfig, Extent, Palette};
pub use engine::{AnnotationEngine, SelectionSummary};
pub use error::{EngineError, EngineResult};
pub use hit_test::HitTester;
pub use history::AnnotationStore;
pub use input::{command_for, Command, InputEvent, Key, Modifiers};
pub use measurement::{BoundingBox, DimensionRow, Dimensions};
pub use render::{DrawSurface, Frame, FrameInput, Primitive};
pub use tool::{Gesture, Tool, ToolStateMachine};
pub use viewport::{ImageAdjustments, PanState, ViewportState};
