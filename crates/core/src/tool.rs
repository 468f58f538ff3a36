//! Tool state machine
//!
//! Interprets pointer and keyboard input against the active tool. Each tool
//! has its own gesture states, held in a single `Gesture` value so that
//! impossible combinations (dragging while mid-angle, erasing while typing)
//! cannot be represented. In-progress geometry lives in the gesture, never
//! in the store; an annotation reaches the store only when its gesture
//! completes and passes validation.

use crate::annotation::{Annotation, AnnotationId, AnnotationKind, AnnotationSet, Point};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::hit_test::HitTester;
use crate::history::AnnotationStore;
use crate::viewport::ViewportState;
use std::fmt;
use std::str::FromStr;

/// Tools offered on the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Select,
    Eraser,
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

impl Tool {
    pub const ALL: [Tool; 11] = [
        Tool::Select,
        Tool::Eraser,
        Tool::Marker,
        Tool::Box,
        Tool::Circle,
        Tool::Ellipse,
        Tool::Line,
        Tool::Ruler,
        Tool::Angle,
        Tool::Freehand,
        Tool::Text,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Eraser => "eraser",
            Tool::Marker => "marker",
            Tool::Box => "box",
            Tool::Circle => "circle",
            Tool::Ellipse => "ellipse",
            Tool::Line => "line",
            Tool::Ruler => "ruler",
            Tool::Angle => "angle",
            Tool::Freehand => "freehand",
            Tool::Text => "text",
        }
    }

    /// The shape this tool creates, if any
    pub fn shape_kind(&self) -> Option<AnnotationKind> {
        match self {
            Tool::Select | Tool::Eraser => None,
            Tool::Marker => Some(AnnotationKind::Marker),
            Tool::Box => Some(AnnotationKind::Box),
            Tool::Circle => Some(AnnotationKind::Circle),
            Tool::Ellipse => Some(AnnotationKind::Ellipse),
            Tool::Line => Some(AnnotationKind::Line),
            Tool::Ruler => Some(AnnotationKind::Ruler),
            Tool::Angle => Some(AnnotationKind::Angle),
            Tool::Freehand => Some(AnnotationKind::Freehand),
            Tool::Text => Some(AnnotationKind::Text),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name() == wanted)
            .ok_or_else(|| EngineError::UnknownTool(s.to_string()))
    }
}

/// Transient, tool-specific gesture state
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,

    /// Two-point shape or freehand path while the button is held
    Drawing { kind: AnnotationKind, points: Vec<Point> },

    /// Angle tool: start placed, waiting for the vertex
    AngleVertex { start: Point, cursor: Point },

    /// Angle tool: start and vertex placed, waiting for the end
    AngleEnd { start: Point, vertex: Point, cursor: Point },

    /// Text box rectangle being dragged out
    TextBox { anchor: Point, corner: Point },

    /// Text being typed into a placed box
    TextEntry { min: Point, max: Point, text: String },

    /// Selected annotation following the pointer
    Dragging { id: AnnotationId, last: Point },

    /// Eraser button held
    Erasing,
}

/// Interprets input for the active tool and owns the annotation store
#[derive(Debug, Clone)]
pub struct ToolStateMachine {
    tool: Tool,
    gesture: Gesture,
    selected: Option<AnnotationId>,
    store: AnnotationStore,
    config: EngineConfig,
}

impl ToolStateMachine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            tool: Tool::Select,
            gesture: Gesture::Idle,
            selected: None,
            store: AnnotationStore::new(),
            config,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// The live annotation set
    pub fn annotations(&self) -> &AnnotationSet {
        self.store.current()
    }

    pub fn selected(&self) -> Option<AnnotationId> {
        self.selected
    }

    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.selected.and_then(|id| self.store.current().get(id))
    }

    /// Angle progress: 0 idle, 1 awaiting vertex, 2 awaiting end
    pub fn angle_step(&self) -> u8 {
        match self.gesture {
            Gesture::AngleVertex { .. } => 1,
            Gesture::AngleEnd { .. } => 2,
            _ => 0,
        }
    }

    pub fn is_editing_text(&self) -> bool {
        matches!(self.gesture, Gesture::TextEntry { .. })
    }

    /// Switch tools, abandoning any gesture and selection
    pub fn set_tool(&mut self, tool: Tool) {
        if !matches!(self.gesture, Gesture::Idle) {
            tracing::debug!(from = %self.tool, to = %tool, "tool switch aborted gesture");
        }
        self.tool = tool;
        self.gesture = Gesture::Idle;
        self.selected = None;
    }

    /// Escape: abort a multi-click or text entry without committing
    pub fn cancel(&mut self) -> bool {
        match self.gesture {
            Gesture::Idle => false,
            _ => {
                tracing::debug!(tool = %self.tool, "gesture cancelled");
                self.gesture = Gesture::Idle;
                true
            }
        }
    }

    /// The host took over the pointer (pan mode) while the button was held
    ///
    /// Press-and-hold gestures end without committing; multi-click angle and
    /// open text entry survive, since they do not depend on the button.
    pub fn release_press(&mut self) {
        match self.gesture {
            Gesture::Drawing { .. } | Gesture::TextBox { .. } | Gesture::Dragging { .. } | Gesture::Erasing => {
                tracing::debug!(tool = %self.tool, "press released by pan");
                self.gesture = Gesture::Idle;
            }
            Gesture::Idle
            | Gesture::AngleVertex { .. }
            | Gesture::AngleEnd { .. }
            | Gesture::TextEntry { .. } => {}
        }
    }

    pub fn pointer_down(&mut self, screen: Point, viewport: &ViewportState) {
        let p = viewport.to_image(screen);

        // Clicking away from an open text box is a loss of focus
        if self.is_editing_text() {
            self.submit_text();
        }

        match self.tool {
            Tool::Select => {
                let hit = self.hit_tester(viewport).first_hit(self.store.current(), p).map(|a| a.id());
                match hit {
                    Some(id) => {
                        self.selected = Some(id);
                        self.gesture = Gesture::Dragging { id, last: p };
                    }
                    None => {
                        self.selected = None;
                        self.gesture = Gesture::Idle;
                    }
                }
            }
            Tool::Eraser => {
                self.erase_at(p, viewport);
                self.gesture = Gesture::Erasing;
            }
            Tool::Marker => {
                self.commit(AnnotationKind::Marker, vec![p], None);
            }
            Tool::Angle => {
                let next = match std::mem::take(&mut self.gesture) {
                    Gesture::AngleVertex { start, .. } => Gesture::AngleEnd {
                        start,
                        vertex: p,
                        cursor: p,
                    },
                    Gesture::AngleEnd { start, vertex, .. } => {
                        self.commit(AnnotationKind::Angle, vec![start, vertex, p], None);
                        Gesture::Idle
                    }
                    _ => Gesture::AngleVertex { start: p, cursor: p },
                };
                self.gesture = next;
            }
            Tool::Text => {
                self.gesture = Gesture::TextBox { anchor: p, corner: p };
            }
            Tool::Box | Tool::Circle | Tool::Ellipse | Tool::Line | Tool::Ruler | Tool::Freehand => {
                if let Some(kind) = self.tool.shape_kind() {
                    self.gesture = Gesture::Drawing { kind, points: vec![p] };
                }
            }
        }
    }

    pub fn pointer_move(&mut self, screen: Point, viewport: &ViewportState) {
        let p = viewport.to_image(screen);

        match self.gesture {
            Gesture::Erasing => {
                self.erase_at(p, viewport);
                return;
            }
            Gesture::Dragging { id, last } => {
                self.drag_selected(id, last, p);
                return;
            }
            _ => {}
        }

        match &mut self.gesture {
            Gesture::Drawing { kind: AnnotationKind::Freehand, points } => points.push(p),
            Gesture::Drawing { points, .. } => {
                points.truncate(1);
                points.push(p);
            }
            Gesture::AngleVertex { cursor, .. } | Gesture::AngleEnd { cursor, .. } => *cursor = p,
            Gesture::TextBox { corner, .. } => *corner = p,
            Gesture::Dragging { .. } | Gesture::Erasing | Gesture::Idle | Gesture::TextEntry { .. } => {}
        }
    }

    pub fn pointer_up(&mut self, screen: Point, viewport: &ViewportState) {
        let p = viewport.to_image(screen);

        match std::mem::take(&mut self.gesture) {
            Gesture::Drawing { kind, mut points } => {
                if kind != AnnotationKind::Freehand {
                    points.truncate(1);
                    points.push(p);
                }
                self.commit(kind, points, None);
            }
            Gesture::TextBox { anchor, .. } => {
                self.gesture = self.open_text_entry(anchor, p);
            }
            // Multi-click and typing states survive the release
            gesture @ (Gesture::AngleVertex { .. }
            | Gesture::AngleEnd { .. }
            | Gesture::TextEntry { .. }) => self.gesture = gesture,
            Gesture::Dragging { .. } | Gesture::Erasing | Gesture::Idle => {}
        }
    }

    /// Append typed characters to the open text box
    pub fn text_input(&mut self, input: &str) {
        if let Gesture::TextEntry { text, .. } = &mut self.gesture {
            text.push_str(input);
        }
    }

    /// Delete the last typed character
    pub fn backspace(&mut self) {
        if let Gesture::TextEntry { text, .. } = &mut self.gesture {
            text.pop();
        }
    }

    /// Commit the open text box if it holds non-blank text
    pub fn submit_text(&mut self) -> Option<AnnotationId> {
        match std::mem::take(&mut self.gesture) {
            Gesture::TextEntry { min, max, text } => {
                self.commit(AnnotationKind::Text, vec![min, max], Some(text.trim().to_string()))
            }
            other => {
                self.gesture = other;
                None
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.store.undo();
        self.prune_selection();
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.store.redo();
        self.prune_selection();
        changed
    }

    /// Drop every annotation, the history and any gesture
    pub fn reset(&mut self) {
        self.store.clear();
        self.gesture = Gesture::Idle;
        self.selected = None;
    }

    /// In-progress geometry for the renderer
    ///
    /// The returned annotation carries the nil ID; it is never stored.
    pub fn draft(&self) -> Option<Annotation> {
        let (kind, points, text) = match &self.gesture {
            Gesture::Drawing { kind, points } => (*kind, points.clone(), None),
            Gesture::AngleVertex { start, cursor } => (AnnotationKind::Angle, vec![*start, *cursor], None),
            Gesture::AngleEnd { start, vertex, cursor } => {
                (AnnotationKind::Angle, vec![*start, *vertex, *cursor], None)
            }
            Gesture::TextBox { anchor, corner } => (AnnotationKind::Text, vec![*anchor, *corner], None),
            Gesture::TextEntry { min, max, text } => (AnnotationKind::Text, vec![*min, *max], Some(text.clone())),
            Gesture::Dragging { .. } | Gesture::Erasing | Gesture::Idle => return None,
        };

        let draft = Annotation::with_id(
            AnnotationId::nil(),
            kind,
            points,
            self.config.palette.color_for(kind),
        );
        Some(match text {
            Some(text) => draft.with_text(text),
            None => draft,
        })
    }

    fn hit_tester(&self, viewport: &ViewportState) -> HitTester {
        HitTester::for_zoom(viewport.zoom(), &self.config)
    }

    /// Translate the dragged annotation by the pointer delta since the last move
    fn drag_selected(&mut self, id: AnnotationId, last: Point, p: Point) {
        let delta = p - last;
        if delta == Point::ORIGIN {
            return;
        }
        if self.store.move_by(id, delta) {
            self.gesture = Gesture::Dragging { id, last: p };
        } else {
            self.gesture = Gesture::Idle;
            self.selected = None;
        }
    }

    fn erase_at(&mut self, p: Point, viewport: &ViewportState) {
        let hit = self.hit_tester(viewport).first_hit(self.store.current(), p).map(|a| a.id());
        if let Some(id) = hit {
            self.store.remove(id);
            if self.selected == Some(id) {
                self.selected = None;
            }
        }
    }

    /// Turn a released text-box drag into an editable area, or discard it
    fn open_text_entry(&self, anchor: Point, corner: Point) -> Gesture {
        let width = corner.x - anchor.x;
        let height = corner.y - anchor.y;
        let min_drag = self.config.text_min_drag;

        if width.abs() <= min_drag.width || height.abs() <= min_drag.height {
            tracing::debug!(width, height, "text box too small, discarded");
            return Gesture::Idle;
        }

        let min_area = self.config.text_min_area;
        let min = Point::new(anchor.x.min(corner.x), anchor.y.min(corner.y));
        let max = min + Point::new(width.abs().max(min_area.width), height.abs().max(min_area.height));
        Gesture::TextEntry {
            min,
            max,
            text: String::new(),
        }
    }

    /// Validate and store a finished gesture; degenerate ones are dropped
    fn commit(&mut self, kind: AnnotationKind, points: Vec<Point>, text: Option<String>) -> Option<AnnotationId> {
        let mut annotation = Annotation::new(kind, points, self.config.palette.color_for(kind));
        if let Some(text) = text {
            annotation = annotation.with_text(text);
        }

        match self.store.add(annotation) {
            Ok(id) => Some(id),
            Err(error) => {
                tracing::debug!(%error, "gesture discarded");
                None
            }
        }
    }

    fn prune_selection(&mut self) {
        if let Some(id) = self.selected {
            if !self.store.current().contains(id) {
                self.selected = None;
                if matches!(self.gesture, Gesture::Dragging { .. }) {
                    self.gesture = Gesture::Idle;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(tool: Tool) -> ToolStateMachine {
        let mut machine = ToolStateMachine::new(EngineConfig::default());
        machine.set_tool(tool);
        machine
    }

    fn drag(machine: &mut ToolStateMachine, from: (f32, f32), to: (f32, f32)) {
        let viewport = ViewportState::default();
        machine.pointer_down(Point::new(from.0, from.1), &viewport);
        machine.pointer_move(Point::new(to.0, to.1), &viewport);
        machine.pointer_up(Point::new(to.0, to.1), &viewport);
    }

    fn click(machine: &mut ToolStateMachine, x: f32, y: f32) {
        let viewport = ViewportState::default();
        machine.pointer_down(Point::new(x, y), &viewport);
        machine.pointer_up(Point::new(x, y), &viewport);
    }

    #[test]
    fn test_tool_from_str() {
        assert_eq!("Freehand".parse::<Tool>().unwrap(), Tool::Freehand);
        assert_eq!(" eraser ".parse::<Tool>().unwrap(), Tool::Eraser);
        assert!(matches!("lasso".parse::<Tool>(), Err(EngineError::UnknownTool(_))));
        assert_eq!(Tool::Select.shape_kind(), None);
        assert_eq!(Tool::Ruler.shape_kind(), Some(AnnotationKind::Ruler));
    }

    #[test]
    fn test_box_drag_commits_on_release() {
        let mut m = machine(Tool::Box);
        let viewport = ViewportState::default();
        m.pointer_down(Point::new(10.0, 10.0), &viewport);
        m.pointer_move(Point::new(60.0, 30.0), &viewport);
        assert!(m.annotations().is_empty());
        assert_eq!(m.draft().unwrap().points().len(), 2);

        m.pointer_up(Point::new(110.0, 60.0), &viewport);
        let stored = m.annotations().iter().next().unwrap();
        assert_eq!(stored.kind(), AnnotationKind::Box);
        assert_eq!(stored.points(), &[Point::new(10.0, 10.0), Point::new(110.0, 60.0)]);
        assert_eq!(stored.color(), EngineConfig::default().palette.r#box);
        assert!(m.draft().is_none());
    }

    #[test]
    fn test_click_without_drag_is_discarded() {
        for tool in [Tool::Box, Tool::Circle, Tool::Ellipse, Tool::Line, Tool::Ruler, Tool::Freehand] {
            let mut m = machine(tool);
            click(&mut m, 40.0, 40.0);
            assert!(m.annotations().is_empty(), "{tool} committed a degenerate shape");
            assert!(!m.store().can_undo());
        }
    }

    #[test]
    fn test_move_without_press_does_nothing() {
        let mut m = machine(Tool::Line);
        m.pointer_move(Point::new(5.0, 5.0), &ViewportState::default());
        assert_eq!(*m.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_freehand_appends_every_move() {
        let mut m = machine(Tool::Freehand);
        let viewport = ViewportState::default();
        m.pointer_down(Point::new(0.0, 0.0), &viewport);
        for i in 1..=5 {
            m.pointer_move(Point::new(i as f32, (i * i) as f32), &viewport);
        }
        m.pointer_up(Point::new(5.0, 25.0), &viewport);
        assert_eq!(m.annotations().iter().next().unwrap().points().len(), 6);
    }

    #[test]
    fn test_marker_commits_on_press() {
        let mut m = machine(Tool::Marker);
        m.pointer_down(Point::new(7.0, 8.0), &ViewportState::default());
        assert_eq!(m.annotations().len(), 1);
    }

    #[test]
    fn test_angle_three_clicks() {
        let mut m = machine(Tool::Angle);
        let viewport = ViewportState::default();
        click(&mut m, 10.0, 0.0);
        assert_eq!(m.angle_step(), 1);
        m.pointer_move(Point::new(3.0, 3.0), &viewport);
        assert_eq!(m.draft().unwrap().points(), &[Point::new(10.0, 0.0), Point::new(3.0, 3.0)]);

        click(&mut m, 0.0, 0.0);
        assert_eq!(m.angle_step(), 2);
        m.pointer_move(Point::new(0.0, 4.0), &viewport);
        assert_eq!(m.draft().unwrap().points().len(), 3);
        assert!(m.annotations().is_empty());

        click(&mut m, 0.0, 10.0);
        assert_eq!(m.angle_step(), 0);
        let angle = m.annotations().iter().next().unwrap();
        assert_eq!(
            angle.points(),
            &[Point::new(10.0, 0.0), Point::new(0.0, 0.0), Point::new(0.0, 10.0)]
        );
    }

    #[test]
    fn test_escape_aborts_angle() {
        let mut m = machine(Tool::Angle);
        click(&mut m, 10.0, 0.0);
        click(&mut m, 0.0, 0.0);
        assert!(m.cancel());
        assert_eq!(m.angle_step(), 0);
        click(&mut m, 50.0, 50.0);
        assert_eq!(m.angle_step(), 1);
        assert!(m.annotations().is_empty());
    }

    #[test]
    fn test_tool_switch_aborts_gesture() {
        let mut m = machine(Tool::Angle);
        click(&mut m, 10.0, 0.0);
        click(&mut m, 0.0, 0.0);
        m.set_tool(Tool::Box);
        assert_eq!(*m.gesture(), Gesture::Idle);
        m.set_tool(Tool::Angle);
        click(&mut m, 5.0, 5.0);
        assert_eq!(m.angle_step(), 1);
        assert!(m.annotations().is_empty());
    }

    #[test]
    fn test_text_box_flow() {
        let mut m = machine(Tool::Text);
        drag(&mut m, (50.0, 50.0), (20.0, 30.0));
        assert!(m.is_editing_text());
        let Gesture::TextEntry { min, max, .. } = m.gesture().clone() else {
            panic!("expected text entry");
        };
        assert_eq!(min, Point::new(20.0, 30.0));
        assert_eq!(max, Point::new(120.0, 60.0));

        m.text_input("Fracturx");
        m.backspace();
        m.text_input("e  ");
        assert!(m.submit_text().is_some());
        let text = m.annotations().iter().next().unwrap();
        assert_eq!(text.text(), Some("Fracture"));
        assert_eq!(text.points(), &[min, max]);
    }

    #[test]
    fn test_small_text_box_is_discarded() {
        let mut m = machine(Tool::Text);
        drag(&mut m, (0.0, 0.0), (20.0, 40.0));
        assert!(!m.is_editing_text());
        drag(&mut m, (0.0, 0.0), (40.0, 15.0));
        assert!(!m.is_editing_text());
    }

    #[test]
    fn test_blank_text_is_not_committed() {
        let mut m = machine(Tool::Text);
        drag(&mut m, (0.0, 0.0), (200.0, 100.0));
        m.text_input("   ");
        assert!(m.submit_text().is_none());
        assert!(m.annotations().is_empty());
        assert!(!m.is_editing_text());
    }

    #[test]
    fn test_click_away_commits_text() {
        let mut m = machine(Tool::Text);
        drag(&mut m, (0.0, 0.0), (200.0, 100.0));
        m.text_input("note");
        m.pointer_down(Point::new(500.0, 500.0), &ViewportState::default());
        assert_eq!(m.annotations().len(), 1);
    }

    #[test]
    fn test_select_and_drag_translates_incrementally() {
        let mut m = machine(Tool::Line);
        drag(&mut m, (0.0, 0.0), (100.0, 0.0));
        let id = m.annotations().iter().next().unwrap().id();
        let history_before = m.store().history_len();

        m.set_tool(Tool::Select);
        let viewport = ViewportState::default();
        m.pointer_down(Point::new(50.0, 2.0), &viewport);
        assert_eq!(m.selected(), Some(id));
        m.pointer_move(Point::new(55.0, 2.0), &viewport);
        m.pointer_move(Point::new(60.0, 12.0), &viewport);
        m.pointer_up(Point::new(60.0, 12.0), &viewport);

        let moved = m.annotations().get(id).unwrap();
        assert_eq!(moved.points(), &[Point::new(10.0, 10.0), Point::new(110.0, 10.0)]);
        assert_eq!(m.store().history_len(), history_before + 2);
        assert_eq!(m.selected(), Some(id));
    }

    #[test]
    fn test_select_miss_clears_selection() {
        let mut m = machine(Tool::Marker);
        click(&mut m, 10.0, 10.0);
        m.set_tool(Tool::Select);
        click(&mut m, 10.0, 10.0);
        assert!(m.selected().is_some());
        click(&mut m, 400.0, 400.0);
        assert!(m.selected().is_none());
    }

    #[test]
    fn test_eraser_is_continuous() {
        let mut m = machine(Tool::Line);
        drag(&mut m, (0.0, 0.0), (0.0, 100.0));
        drag(&mut m, (50.0, 0.0), (50.0, 100.0));
        drag(&mut m, (300.0, 0.0), (300.0, 100.0));

        m.set_tool(Tool::Eraser);
        let viewport = ViewportState::default();
        m.pointer_down(Point::new(0.0, 50.0), &viewport);
        assert_eq!(m.annotations().len(), 2);
        m.pointer_move(Point::new(25.0, 50.0), &viewport);
        m.pointer_move(Point::new(50.0, 50.0), &viewport);
        m.pointer_up(Point::new(50.0, 50.0), &viewport);
        assert_eq!(m.annotations().len(), 1);

        // Moving with the button up erases nothing
        m.pointer_move(Point::new(300.0, 50.0), &viewport);
        assert_eq!(m.annotations().len(), 1);
    }

    #[test]
    fn test_undo_prunes_selection() {
        let mut m = machine(Tool::Marker);
        click(&mut m, 10.0, 10.0);
        m.set_tool(Tool::Select);
        click(&mut m, 10.0, 10.0);
        assert!(m.selected().is_some());
        assert!(m.undo());
        assert!(m.selected().is_none());
        assert!(m.redo());
        assert_eq!(m.annotations().len(), 1);
    }

    #[test]
    fn test_release_press_ends_held_gestures_only() {
        let viewport = ViewportState::default();

        let mut m = machine(Tool::Line);
        drag(&mut m, (0.0, 50.0), (100.0, 50.0));
        m.set_tool(Tool::Select);
        m.pointer_down(Point::new(50.0, 50.0), &viewport);
        m.release_press();
        m.pointer_move(Point::new(250.0, 250.0), &viewport);
        assert_eq!(*m.gesture(), Gesture::Idle);
        assert_eq!(
            m.annotations().iter().next().unwrap().points(),
            &[Point::new(0.0, 50.0), Point::new(100.0, 50.0)]
        );

        let mut m = machine(Tool::Box);
        m.pointer_down(Point::new(10.0, 10.0), &viewport);
        m.pointer_move(Point::new(40.0, 40.0), &viewport);
        m.release_press();
        assert!(m.draft().is_none());
        assert!(m.annotations().is_empty());

        let mut m = machine(Tool::Angle);
        click(&mut m, 10.0, 0.0);
        m.release_press();
        assert_eq!(m.angle_step(), 1);
    }

    #[test]
    fn test_points_are_converted_to_image_space() {
        let mut m = machine(Tool::Marker);
        let viewport = ViewportState::new(2.0, Point::new(50.0, 50.0));
        m.pointer_down(Point::new(150.0, 150.0), &viewport);
        assert_eq!(m.annotations().iter().next().unwrap().points(), &[Point::new(50.0, 50.0)]);
    }
}
