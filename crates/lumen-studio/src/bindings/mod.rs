//! Scene, render and UI bindings for the native window device.
//!
//! The scene and render bindings share one `GpuScene`: the scene side extracts
//! camera, light and objects and owns uploaded textures, the render side reads
//! them when drawing.

mod render;
mod scene;
mod shared;
mod ui;

pub use render::StudioRender;
pub use scene::{StudioScene, TorusMesh, DIFFUSE_SLOT};
pub use ui::{StudioUi, WidgetIds};
