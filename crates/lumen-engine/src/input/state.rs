use std::collections::HashSet;

use crate::overlay::ButtonMask;

use super::frame::InputFrame;
use super::types::{ElementState, InputEvent, Key, MouseButton};

/// Pointer snapshot handed to the UI overlay.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct PointerState {
    /// Physical window pixels; the last known position if the pointer left.
    pub x: f32,
    pub y: f32,
    pub buttons: ButtonMask,
}

/// Held keys and buttons plus pointer position for one window.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,
    pub pointer_pos: Option<(f32, f32)>,
    last_pos: (f32, f32),
    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies `ev` and records the transition into `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(focused) => {
                self.focused = *focused;
                if !*focused {
                    // Releases are not delivered while unfocused.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved { x, y } => self.set_pointer(*x, *y),

            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::Key { key, state, .. } => match state {
                ElementState::Pressed => {
                    if self.keys_down.insert(*key) {
                        frame.keys_pressed.push(*key);
                    }
                }
                ElementState::Released => {
                    self.keys_down.remove(key);
                }
            },

            InputEvent::PointerButton { button, state, x, y } => {
                self.set_pointer(*x, *y);
                match state {
                    ElementState::Pressed => {
                        if self.buttons_down.insert(*button) {
                            frame.buttons_pressed.insert(*button);
                        }
                    }
                    ElementState::Released => {
                        if self.buttons_down.remove(button) {
                            frame.buttons_released.insert(*button);
                        }
                    }
                }
            }
        }

        frame.events.push(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn pointer(&self) -> PointerState {
        let (x, y) = self.pointer_pos.unwrap_or(self.last_pos);
        PointerState {
            x,
            y,
            buttons: ButtonMask::from_buttons(self.buttons_down.iter().copied()),
        }
    }

    fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer_pos = Some((x, y));
        self.last_pos = (x, y);
    }
}
