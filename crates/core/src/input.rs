//! Input events and keyboard accelerators
//!
//! Pointer coordinates arriving here are in screen space. Events are
//! deserializable so an external event loop (or a recorded script) can feed
//! them straight into the engine.

use crate::annotation::Point;
use crate::tool::Tool;
use crate::viewport::ImageAdjustments;

/// A key as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Char(char),
    Space,
    Escape,
    Enter,
    Backspace,
}

/// Modifier keys held during a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    /// Command key on macOS; treated like ctrl for accelerators
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        meta: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn ctrl_shift() -> Self {
        Self {
            ctrl: true,
            shift: true,
            ..Self::NONE
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// One event from the host event loop
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyUp { key: Key },
    /// Characters typed while a text box is being edited
    Text { text: String },
    /// The text editor lost focus
    FocusLost,
    /// Tool picked on an external toolbar, by name
    SelectTool { tool: String },
    /// New image display filters from an external adjustments panel
    ///
    /// Replaces every filter: fields missing from the payload take their
    /// neutral value, not the current one.
    Adjust { adjustments: ImageAdjustments },
}

impl InputEvent {
    pub fn pointer_down(x: f32, y: f32) -> Self {
        InputEvent::PointerDown { x, y }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        InputEvent::PointerMove { x, y }
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        InputEvent::PointerUp { x, y }
    }

    pub fn key(key: Key) -> Self {
        InputEvent::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key_with(key: Key, modifiers: Modifiers) -> Self {
        InputEvent::KeyDown { key, modifiers }
    }

    /// Screen position carried by a pointer event
    pub fn screen_point(&self) -> Option<Point> {
        match *self {
            InputEvent::PointerDown { x, y }
            | InputEvent::PointerMove { x, y }
            | InputEvent::PointerUp { x, y } => Some(Point::new(x, y)),
            _ => None,
        }
    }
}

/// Action bound to a keyboard accelerator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectTool(Tool),
    ResetView,
    ZoomIn,
    ZoomOut,
    /// Pan while the key stays held
    BeginPan,
    Undo,
    Redo,
    Cancel,
}

/// Look up the accelerator for a key press
///
/// V select, P marker, B box, C circle, L line, D freehand, M ruler,
/// A angle, T text, E eraser, R reset view, +/= zoom in, - zoom out,
/// Space pan, Ctrl+Z undo, Ctrl+Shift+Z redo, Escape cancel.
pub fn command_for(key: Key, modifiers: Modifiers) -> Option<Command> {
    let c = match key {
        Key::Space => return Some(Command::BeginPan),
        Key::Escape => return Some(Command::Cancel),
        Key::Enter | Key::Backspace => return None,
        Key::Char(c) => c.to_ascii_lowercase(),
    };

    if modifiers.command() {
        return match c {
            'z' if modifiers.shift => Some(Command::Redo),
            'z' => Some(Command::Undo),
            _ => None,
        };
    }

    let command = match c {
        'v' => Command::SelectTool(Tool::Select),
        'p' => Command::SelectTool(Tool::Marker),
        'b' => Command::SelectTool(Tool::Box),
        'c' => Command::SelectTool(Tool::Circle),
        'l' => Command::SelectTool(Tool::Line),
        'd' => Command::SelectTool(Tool::Freehand),
        'm' => Command::SelectTool(Tool::Ruler),
        'a' => Command::SelectTool(Tool::Angle),
        't' => Command::SelectTool(Tool::Text),
        'e' => Command::SelectTool(Tool::Eraser),
        'r' => Command::ResetView,
        '+' | '=' => Command::ZoomIn,
        '-' => Command::ZoomOut,
        _ => return None,
    };
    Some(command)
}
