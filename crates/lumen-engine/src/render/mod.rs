//! GPU rendering for the window target.
//!
//! Two renderers draw into the acquired surface texture inside the target pass:
//! the full-screen background primitive and the UI canvas (composite image plus
//! solid rects). Each renderer owns its pipelines and buffers and builds them
//! lazily for the surface format it is first used with.
//!
//! Convention:
//! - canvas geometry is in logical pixels (top-left origin, +Y down)
//! - vertex shaders convert to NDC using a viewport uniform

mod background;
mod canvas;
mod common;
mod ctx;

pub use background::BackgroundRenderer;
pub use canvas::{CanvasImage, CanvasList, CanvasRect, CanvasRenderer};
pub use ctx::{RenderCtx, RenderTarget};
