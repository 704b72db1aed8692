use std::path::Path;
use std::sync::Arc;

use crate::core::EventQueue;
use crate::error::{BackendError, BackendResult};
use crate::input::PointerState;
use crate::overlay::ButtonMask;
use crate::scene::{MaterialId, Scene};
use crate::streaming::{AsyncContext, StreamSource};

use super::{BackgroundParams, Presented};

/// GPU device handle.
pub trait Device {
    /// One compute submission; recorded into, then handed back to `submit_compute`.
    type Compute;

    /// Sampled texture handle, e.g. the composite image bound by the overlay.
    type Texture: Clone;

    fn create_compute(&self) -> Self::Compute;

    fn submit_compute(&self, compute: Self::Compute);
}

/// Window plus the device presenting into it.
pub trait WindowBackend: Device {
    /// Drawable size in physical pixels.
    fn pixel_size(&self) -> (u32, u32);

    /// Processes pending platform events and queues the ones the loop handles.
    fn pump_events(&mut self, events: &mut EventQueue);

    fn pointer(&self) -> PointerState;

    /// Device pixels per canvas unit, passed to the UI layout.
    fn canvas_scale(&self) -> f32;

    /// Acquires the next frame. False when the window cannot be rendered to.
    fn begin_frame(&mut self) -> bool;

    fn begin_target(&mut self) -> BackendResult<()>;

    fn draw_background(&mut self, params: &BackgroundParams) -> BackendResult<()>;

    fn end_target(&mut self) -> BackendResult<()>;

    fn present(&mut self) -> Presented;

    /// False once the device is lost or reported an error.
    fn check(&mut self) -> bool;

    /// Saves the last presented image.
    fn capture_screenshot(&mut self, path: &Path) -> BackendResult<()> {
        let _ = path;
        Err(BackendError::Device("screenshots are not supported".into()))
    }

    /// Blocks until the device is idle.
    fn finish(&mut self);
}

/// Scene manager side of a binding.
pub trait SceneBackend<D: Device> {
    /// Handle used by the streaming thread. Everything else stays on the
    /// render thread.
    fn stream_source(&self) -> Arc<dyn StreamSource>;

    /// Creates GPU resources the scene references this frame. `dirty` lists
    /// the materials changed since the previous commit.
    fn commit_scene(
        &mut self,
        device: &D,
        scene: &Scene,
        dirty: &[MaterialId],
        async_ctx: &mut AsyncContext,
    ) -> BackendResult<()>;

    /// Manager-level commit of pending work.
    fn update(&mut self, device: &D, async_ctx: &mut AsyncContext) -> BackendResult<()>;

    fn dispatch(&mut self, device: &D, compute: &mut D::Compute, scene: &Scene);

    fn flush(&mut self, device: &D);

    /// Asks the stream source to stop. Called before the streamer is joined.
    fn terminate(&mut self);

    /// Drops every per-scene resource.
    fn clear(&mut self);
}

/// Frame-sized targets of a render backend.
pub trait FrameTargets<D: Device> {
    fn size(&self) -> (u32, u32);

    fn flush(&mut self, device: &D);

    fn composite_texture(&self) -> D::Texture;
}

/// Deferred renderer side of a binding.
pub trait RenderBackend<D: Device> {
    type Targets: FrameTargets<D>;

    /// Per-frame bookkeeping (streaming budget, counters).
    fn update(&mut self);

    fn create_targets(&mut self, device: &D, width: u32, height: u32) -> BackendResult<Self::Targets>;

    fn dispatch_spatial(&mut self, compute: &mut D::Compute, targets: &mut Self::Targets, scene: &Scene);

    fn dispatch_objects(&mut self, compute: &mut D::Compute, targets: &mut Self::Targets, scene: &Scene);

    fn dispatch_renderer(&mut self, compute: &mut D::Compute, targets: &mut Self::Targets, scene: &Scene);

    fn flush(&mut self, device: &D);

    fn draw_deferred(&mut self, device: &D, targets: &mut Self::Targets);

    fn dispatch_light(&mut self, device: &D, compute: &mut D::Compute, targets: &mut Self::Targets);

    fn dispatch_occluder(&mut self, device: &D, compute: &mut D::Compute, targets: &mut Self::Targets);

    fn dispatch_luminance(&mut self, device: &D, compute: &mut D::Compute, targets: &mut Self::Targets);

    fn dispatch_composite(&mut self, device: &D, compute: &mut D::Compute, targets: &mut Self::Targets);

    /// True when render targets are stored bottom-up relative to the window.
    fn is_target_flipped(&self) -> bool;
}

/// Immediate-mode UI root.
pub trait UiBackend<D: Device> {
    fn set_viewport(&mut self, width: f32, height: f32);

    fn set_mouse(&mut self, x: f32, y: f32, buttons: ButtonMask);

    fn set_background(&mut self, texture: D::Texture, scale: [f32; 2], flip_y: bool);

    /// One layout pass. True while another pass is required.
    fn update(&mut self, scale: f32) -> bool;

    fn rasterize(&mut self, device: &D) -> BackendResult<()>;

    /// Draws the rasterised canvas into the open window target.
    fn draw_canvas(&mut self, device: &mut D) -> BackendResult<()>;

    /// Moves UI events produced by the last update into the loop queue.
    fn drain_events(&mut self, events: &mut EventQueue);
}
