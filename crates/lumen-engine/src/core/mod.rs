//! Engine-facing contracts and the presentation loop.
//!
//! Platform and UI callbacks never reach application code directly: bindings
//! push typed `LoopEvent`s into an `EventQueue`, and the loop hands them to
//! the `App` once per tick.

mod app;
mod events;
mod presentation;

pub use app::{default_event_handling, App, AppControl, LoopCtx, SCREENSHOT_PATH};
pub use events::{EventQueue, LoopEvent, UiEvent, WidgetId};
pub use presentation::{LoopParts, LoopState, PresentationLoop, ShutdownReport, StopReason};
