use std::fmt;

/// Keyboard key identifier.
///
/// Only keys the loop or the demo react to get a variant; everything else is
/// `Unknown` with the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Tab,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ElementState {
    Pressed,
    Released,
}

/// Pointer button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Primary contact of a touch screen or pen; acts as a second left button.
    Touch,
    Other(u16),
}

/// Platform-agnostic input events emitted by the window binding.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: ElementState,
        repeat: bool,
    },

    /// Pointer position in physical window pixels.
    PointerMoved { x: f32, y: f32 },

    PointerButton {
        button: MouseButton,
        state: ElementState,
        x: f32,
        y: f32,
    },

    PointerLeft,

    Focused(bool),
}
