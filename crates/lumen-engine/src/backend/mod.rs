//! Capability interface between the orchestrator and an engine binding.
//!
//! `PresentationLoop` and `DispatchPipeline` only see these traits. A binding
//! implements them as thin adapters over its native handles; the native wgpu
//! window in `window` is one, the test mocks are another.

mod traits;
mod types;

pub use traits::{Device, FrameTargets, RenderBackend, SceneBackend, UiBackend, WindowBackend};
pub use types::{BackgroundParams, Presented};
