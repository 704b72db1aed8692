//! Input subsystem.
//!
//! Public API does not expose winit types; `platform::winit` translates window
//! events into `InputEvent`s. Pointer coordinates are physical window pixels,
//! the space the overlay maps into its logical viewport.

mod frame;
pub mod platform;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::{InputState, PointerState};
pub use types::{ElementState, InputEvent, Key, MouseButton};
