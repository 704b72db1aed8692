use bitflags::bitflags;

use crate::input::MouseButton;

bitflags! {
    /// Pointer buttons as the UI sees them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ButtonMask: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const MIDDLE = 1 << 2;
    }
}

impl Default for ButtonMask {
    fn default() -> Self {
        Self::empty()
    }
}

impl ButtonMask {
    /// ORs every held button into the mask. Touch contacts count as LEFT.
    pub fn from_buttons(held: impl IntoIterator<Item = MouseButton>) -> Self {
        held.into_iter().fold(Self::empty(), |mask, button| {
            mask | match button {
                MouseButton::Left | MouseButton::Touch => Self::LEFT,
                MouseButton::Right => Self::RIGHT,
                MouseButton::Middle => Self::MIDDLE,
                MouseButton::Other(_) => Self::empty(),
            }
        })
    }
}
