//! Annotation engine facade
//!
//! Wires the viewport, the tool state machine and the renderer together
//! behind one entry point for an external event loop. Events are processed
//! synchronously and in order; nothing here fails outward.

use crate::annotation::{Annotation, AnnotationId, AnnotationKind, Point};
use crate::config::{EngineConfig, Extent};
use crate::input::{command_for, Command, InputEvent, Key, Modifiers};
use crate::measurement::{DimensionRow, Dimensions};
use crate::render::{Frame, FrameInput};
use crate::tool::{Tool, ToolStateMachine};
use crate::viewport::{ImageAdjustments, PanState, ViewportState};

/// Selected annotation and its figures, for an external measurement panel
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SelectionSummary {
    pub id: AnnotationId,
    pub kind: AnnotationKind,
    pub dimensions: Option<Dimensions>,
    pub rows: Vec<DimensionRow>,
}

/// The annotation engine for one image
#[derive(Debug, Clone)]
pub struct AnnotationEngine {
    viewport: ViewportState,
    pan: PanState,
    tools: ToolStateMachine,
    image: Option<Extent>,
    adjustments: ImageAdjustments,
}

impl AnnotationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            viewport: ViewportState::default(),
            pan: PanState::default(),
            tools: ToolStateMachine::new(config),
            image: None,
            adjustments: ImageAdjustments::default(),
        }
    }

    /// Load a new image: fit it into the viewport and start from an empty
    /// annotation set and history
    pub fn load_image(&mut self, image: Extent, viewport: Extent) {
        self.viewport = ViewportState::fit(image, viewport);
        self.pan = PanState::default();
        self.tools.reset();
        self.adjustments.reset();
        self.image = Some(image);
        tracing::info!(
            width = image.width,
            height = image.height,
            zoom = self.viewport.zoom(),
            "image loaded"
        );
    }

    /// Process one event; returns true when it changed engine state
    pub fn handle(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { .. } | InputEvent::PointerMove { .. } | InputEvent::PointerUp { .. } => {
                self.handle_pointer(&event)
            }
            InputEvent::KeyDown { key, modifiers } => self.handle_key_down(key, modifiers),
            InputEvent::KeyUp { key: Key::Space } => {
                let was_active = self.pan.is_active();
                self.pan.set_active(false);
                was_active
            }
            InputEvent::KeyUp { .. } => false,
            InputEvent::Text { text } => {
                if !self.tools.is_editing_text() {
                    return false;
                }
                self.tools.text_input(&text);
                true
            }
            InputEvent::FocusLost => {
                if !self.tools.is_editing_text() {
                    return false;
                }
                self.tools.submit_text();
                true
            }
            InputEvent::SelectTool { tool } => self.select_tool_named(&tool),
            InputEvent::Adjust { adjustments } => {
                self.adjustments.apply(adjustments);
                true
            }
        }
    }

    fn handle_pointer(&mut self, event: &InputEvent) -> bool {
        let Some(screen) = event.screen_point() else {
            return false;
        };
        if self.image.is_none() {
            tracing::trace!("pointer event before image load ignored");
            return false;
        }

        // Panning swallows pointer input before any tool sees it
        if self.pan.is_active() {
            match event {
                InputEvent::PointerDown { .. } => self.pan.press(screen, &self.viewport),
                InputEvent::PointerMove { .. } => self.pan.drag(screen, &mut self.viewport),
                _ => self.pan.release(),
            }
            return true;
        }

        match event {
            InputEvent::PointerDown { .. } => self.tools.pointer_down(screen, &self.viewport),
            InputEvent::PointerMove { .. } => self.tools.pointer_move(screen, &self.viewport),
            _ => self.tools.pointer_up(screen, &self.viewport),
        }
        true
    }

    fn handle_key_down(&mut self, key: Key, modifiers: Modifiers) -> bool {
        if self.tools.is_editing_text() {
            return self.handle_text_key(key, modifiers);
        }

        let Some(command) = command_for(key, modifiers) else {
            return false;
        };
        match command {
            Command::SelectTool(tool) => self.select_tool(tool),
            Command::ResetView => self.reset_view(),
            Command::ZoomIn => self.zoom_in(),
            Command::ZoomOut => self.zoom_out(),
            Command::BeginPan => {
                // The pointer-up that ends the press will go to the pan
                self.tools.release_press();
                self.pan.set_active(true);
            }
            Command::Undo => return self.undo(),
            Command::Redo => return self.redo(),
            Command::Cancel => return self.tools.cancel(),
        }
        true
    }

    /// Keys while a text box is open; accelerators are suppressed
    fn handle_text_key(&mut self, key: Key, modifiers: Modifiers) -> bool {
        match key {
            Key::Enter if modifiers.shift => self.tools.text_input("\n"),
            Key::Enter => {
                self.tools.submit_text();
            }
            Key::Backspace => self.tools.backspace(),
            Key::Escape => {
                self.tools.cancel();
            }
            // Printable characters arrive as text events
            Key::Char(_) | Key::Space => return false,
        }
        true
    }

    pub fn select_tool(&mut self, tool: Tool) {
        tracing::debug!(%tool, "tool selected");
        self.tools.set_tool(tool);
    }

    /// Select a tool by its toolbar name; unknown names are ignored
    pub fn select_tool_named(&mut self, name: &str) -> bool {
        match name.parse::<Tool>() {
            Ok(tool) => {
                self.select_tool(tool);
                true
            }
            Err(error) => {
                tracing::warn!(%error, "tool selection ignored");
                false
            }
        }
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// 100% zoom with no pan
    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn undo(&mut self) -> bool {
        self.tools.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.tools.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.tools.store().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.tools.store().can_redo()
    }

    pub fn tool(&self) -> Tool {
        self.tools.tool()
    }

    pub fn tools(&self) -> &ToolStateMachine {
        &self.tools
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn image(&self) -> Option<Extent> {
        self.image
    }

    pub fn adjustments(&self) -> ImageAdjustments {
        self.adjustments
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_active()
    }

    pub fn zoom_percent(&self) -> u32 {
        self.viewport.zoom_percent()
    }

    /// The live annotation set as plain records
    pub fn annotations(&self) -> Vec<Annotation> {
        self.tools.annotations().to_records()
    }

    pub fn selected(&self) -> Option<AnnotationId> {
        self.tools.selected()
    }

    pub fn selection_summary(&self) -> Option<SelectionSummary> {
        let annotation = self.tools.selected_annotation()?;
        let dimensions = Dimensions::of(annotation);
        let rows = dimensions.as_ref().map(Dimensions::rows).unwrap_or_default();
        Some(SelectionSummary {
            id: annotation.id(),
            kind: annotation.kind(),
            dimensions,
            rows,
        })
    }

    /// Status line text for multi-step tools
    pub fn hint(&self) -> Option<&'static str> {
        if self.tools.tool() != Tool::Angle {
            return None;
        }
        match self.tools.angle_step() {
            1 => Some("Click vertex point (1/2)"),
            2 => Some("Click end point (2/2)"),
            _ => None,
        }
    }

    /// Draw list for the current state
    pub fn frame(&self) -> Frame {
        let draft = self.tools.draft();
        Frame::build(FrameInput {
            annotations: self.tools.annotations(),
            draft: draft.as_ref(),
            selected: self.tools.selected_annotation(),
            viewport: &self.viewport,
            image: self.image,
            adjustments: self.adjustments,
            config: self.tools.config(),
        })
    }

    /// Image-space position of a screen point under the current viewport
    pub fn to_image(&self, screen: Point) -> Point {
        self.viewport.to_image(screen)
    }
}

impl Default for AnnotationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Primitive;
    use crate::tool::Gesture;

    fn engine() -> AnnotationEngine {
        let mut engine = AnnotationEngine::default();
        engine.load_image(Extent::new(1000.0, 1000.0), Extent::new(1000.0, 1000.0));
        // Identity transform so screen and image points coincide
        engine.viewport = ViewportState::default();
        engine
    }

    fn drag(engine: &mut AnnotationEngine, from: (f32, f32), to: (f32, f32)) {
        engine.handle(InputEvent::pointer_down(from.0, from.1));
        engine.handle(InputEvent::pointer_move(to.0, to.1));
        engine.handle(InputEvent::pointer_up(to.0, to.1));
    }

    #[test]
    fn test_pointer_ignored_before_image_load() {
        let mut engine = AnnotationEngine::default();
        engine.select_tool(Tool::Marker);
        assert!(!engine.handle(InputEvent::pointer_down(5.0, 5.0)));
        assert!(engine.annotations().is_empty());
    }

    #[test]
    fn test_load_image_fits_and_resets() {
        let mut engine = engine();
        engine.select_tool(Tool::Marker);
        engine.handle(InputEvent::pointer_down(5.0, 5.0));
        assert!(engine.can_undo());

        engine.load_image(Extent::new(2000.0, 1000.0), Extent::new(1000.0, 800.0));
        assert!(engine.annotations().is_empty());
        assert!(!engine.can_undo());
        assert!((engine.viewport().zoom() - 0.425).abs() < 1e-6);
    }

    #[test]
    fn test_accelerators_switch_tools() {
        let mut engine = engine();
        assert!(engine.handle(InputEvent::key(Key::Char('b'))));
        assert_eq!(engine.tool(), Tool::Box);
        assert!(!engine.handle(InputEvent::key(Key::Char('q'))));
        assert_eq!(engine.tool(), Tool::Box);
    }

    #[test]
    fn test_unknown_tool_name_is_noop() {
        let mut engine = engine();
        engine.select_tool(Tool::Ruler);
        assert!(!engine.handle(InputEvent::SelectTool { tool: "lasso".into() }));
        assert_eq!(engine.tool(), Tool::Ruler);
        assert!(engine.handle(InputEvent::SelectTool { tool: "Angle".into() }));
        assert_eq!(engine.tool(), Tool::Angle);
    }

    #[test]
    fn test_space_pan_intercepts_pointer() {
        let mut engine = engine();
        engine.select_tool(Tool::Line);
        engine.handle(InputEvent::key(Key::Space));
        assert!(engine.is_panning());
        drag(&mut engine, (10.0, 10.0), (40.0, 30.0));
        assert!(engine.annotations().is_empty());
        assert_eq!(engine.viewport().pan(), Point::new(30.0, 20.0));

        engine.handle(InputEvent::KeyUp { key: Key::Space });
        assert!(!engine.is_panning());
        drag(&mut engine, (30.0, 20.0), (130.0, 20.0));
        let line = &engine.annotations()[0];
        assert_eq!(line.points(), &[Point::ORIGIN, Point::new(100.0, 0.0)]);
    }

    #[test]
    fn test_space_mid_drag_ends_the_drag() {
        let mut engine = engine();
        engine.select_tool(Tool::Line);
        drag(&mut engine, (0.0, 50.0), (100.0, 50.0));
        let history = engine.tools().store().history_len();

        engine.select_tool(Tool::Select);
        engine.handle(InputEvent::pointer_down(50.0, 50.0));
        engine.handle(InputEvent::key(Key::Space));
        engine.handle(InputEvent::pointer_up(50.0, 50.0));
        engine.handle(InputEvent::KeyUp { key: Key::Space });
        engine.handle(InputEvent::pointer_move(250.0, 250.0));

        assert_eq!(engine.annotations()[0].points(), &[Point::new(0.0, 50.0), Point::new(100.0, 50.0)]);
        assert_eq!(engine.tools().store().history_len(), history);
        assert_eq!(*engine.tools().gesture(), Gesture::Idle);
    }

    #[test]
    fn test_space_mid_erase_ends_the_erase() {
        let mut engine = engine();
        engine.select_tool(Tool::Marker);
        engine.handle(InputEvent::pointer_down(300.0, 300.0));

        engine.select_tool(Tool::Eraser);
        engine.handle(InputEvent::pointer_down(0.0, 0.0));
        engine.handle(InputEvent::key(Key::Space));
        engine.handle(InputEvent::pointer_up(0.0, 0.0));
        engine.handle(InputEvent::KeyUp { key: Key::Space });
        engine.handle(InputEvent::pointer_move(300.0, 300.0));

        assert_eq!(engine.annotations().len(), 1);
    }

    #[test]
    fn test_adjust_replaces_every_filter() {
        let mut engine = engine();
        let event: InputEvent =
            serde_json::from_str(r#"{"type":"adjust","adjustments":{"brightness":150}}"#).unwrap();
        engine.handle(event);
        let event: InputEvent = serde_json::from_str(r#"{"type":"adjust","adjustments":{"invert":true}}"#).unwrap();
        engine.handle(event);

        assert!(engine.adjustments().invert);
        assert_eq!(engine.adjustments().brightness, 100);
    }

    #[test]
    fn test_zoom_keys_and_reset() {
        let mut engine = engine();
        engine.handle(InputEvent::key(Key::Char('+')));
        assert_eq!(engine.zoom_percent(), 120);
        engine.handle(InputEvent::key(Key::Char('-')));
        engine.handle(InputEvent::key(Key::Char('-')));
        assert_eq!(engine.zoom_percent(), 83);
        engine.handle(InputEvent::key(Key::Char('r')));
        assert_eq!(*engine.viewport(), ViewportState::default());
    }

    #[test]
    fn test_undo_redo_keys() {
        let mut engine = engine();
        engine.select_tool(Tool::Marker);
        engine.handle(InputEvent::pointer_down(5.0, 5.0));
        assert!(engine.handle(InputEvent::key_with(Key::Char('z'), Modifiers::ctrl())));
        assert!(engine.annotations().is_empty());
        assert!(engine.can_redo());
        assert!(engine.handle(InputEvent::key_with(Key::Char('Z'), Modifiers::ctrl_shift())));
        assert_eq!(engine.annotations().len(), 1);
        assert!(!engine.handle(InputEvent::key_with(Key::Char('Z'), Modifiers::ctrl_shift())));
    }

    #[test]
    fn test_text_entry_suppresses_accelerators() {
        let mut engine = engine();
        engine.select_tool(Tool::Text);
        drag(&mut engine, (0.0, 0.0), (200.0, 100.0));
        assert!(engine.tools().is_editing_text());

        engine.handle(InputEvent::key(Key::Char('b')));
        assert_eq!(engine.tool(), Tool::Text);
        engine.handle(InputEvent::Text { text: "left".into() });
        engine.handle(InputEvent::key_with(Key::Enter, Modifiers::shift()));
        engine.handle(InputEvent::Text { text: "hip".into() });
        engine.handle(InputEvent::key(Key::Enter));

        let text = &engine.annotations()[0];
        assert_eq!(text.text(), Some("left\nhip"));
        assert!(!engine.tools().is_editing_text());
    }

    #[test]
    fn test_text_escape_and_focus_loss() {
        let mut engine = engine();
        engine.select_tool(Tool::Text);
        drag(&mut engine, (0.0, 0.0), (200.0, 100.0));
        engine.handle(InputEvent::Text { text: "discard".into() });
        engine.handle(InputEvent::key(Key::Escape));
        assert!(engine.annotations().is_empty());

        drag(&mut engine, (0.0, 0.0), (200.0, 100.0));
        engine.handle(InputEvent::Text { text: "keep".into() });
        assert!(engine.handle(InputEvent::FocusLost));
        assert_eq!(engine.annotations().len(), 1);
    }

    #[test]
    fn test_angle_hint() {
        let mut engine = engine();
        engine.select_tool(Tool::Angle);
        assert_eq!(engine.hint(), None);
        engine.handle(InputEvent::pointer_down(10.0, 0.0));
        assert_eq!(engine.hint(), Some("Click vertex point (1/2)"));
        engine.handle(InputEvent::pointer_down(0.0, 0.0));
        assert_eq!(engine.hint(), Some("Click end point (2/2)"));
        engine.handle(InputEvent::key(Key::Escape));
        assert_eq!(engine.hint(), None);
    }

    #[test]
    fn test_selection_summary() {
        let mut engine = engine();
        engine.select_tool(Tool::Ruler);
        drag(&mut engine, (0.0, 0.0), (30.0, 40.0));
        engine.select_tool(Tool::Select);
        engine.handle(InputEvent::pointer_down(15.0, 20.0));
        engine.handle(InputEvent::pointer_up(15.0, 20.0));

        let summary = engine.selection_summary().unwrap();
        assert_eq!(summary.kind, AnnotationKind::Ruler);
        assert_eq!(summary.dimensions, Some(Dimensions::Ruler { length: 50.0 }));
        assert_eq!(summary.rows[0].value, "50.0");
    }

    #[test]
    fn test_adjustments_reach_frame() {
        let mut engine = engine();
        let mut adjustments = ImageAdjustments::default();
        adjustments.set_invert(true);
        engine.handle(InputEvent::Adjust { adjustments });
        let frame = engine.frame();
        assert!(matches!(
            frame.primitives[0],
            Primitive::Image { adjustments: ImageAdjustments { invert: true, .. }, .. }
        ));
    }
}
