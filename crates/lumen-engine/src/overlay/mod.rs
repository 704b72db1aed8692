//! UI overlay compositing.
//!
//! The overlay lives in a logical coordinate space with a fixed height; the
//! width follows the window aspect. Each frame the composite image of the
//! dispatch pipeline becomes the overlay background, layout is iterated until
//! stable, and only then is the canvas rasterised.

mod buttons;
mod compositor;
mod viewport;

pub use buttons::ButtonMask;
pub use compositor::{OverlayFrame, OverlayReport, UiOverlay};
pub use viewport::LogicalViewport;
