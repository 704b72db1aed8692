use crate::backend::{Device, UiBackend};
use crate::config::OverlayConfig;
use crate::error::BackendResult;
use crate::input::PointerState;

use super::LogicalViewport;

/// Outcome of one overlay composite.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OverlayReport {
    pub viewport: LogicalViewport,
    /// Number of `update` calls made.
    pub passes: u32,
    /// False when the pass bound was hit with layout still changing.
    pub converged: bool,
}

/// Drives a `UiBackend` through one frame of overlay work.
#[derive(Debug, Clone)]
pub struct UiOverlay {
    logical_height: f32,
    max_passes: u32,
}

/// Inputs of one composite, gathered from the window binding and the pipeline.
#[derive(Debug, Clone)]
pub struct OverlayFrame<T> {
    pub window_size: (u32, u32),
    pub pointer: PointerState,
    pub canvas_scale: f32,
    pub composite: T,
    pub flip_y: bool,
}

impl UiOverlay {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            logical_height: config.logical_height,
            max_passes: config.max_layout_passes.max(1),
        }
    }

    pub fn logical_height(&self) -> f32 {
        self.logical_height
    }

    /// Binds the composite texture, feeds viewport and pointer, iterates layout
    /// to a fixed point (bounded) and rasterises the canvas.
    pub fn composite<D, U>(
        &self,
        ui: &mut U,
        device: &D,
        frame: OverlayFrame<D::Texture>,
    ) -> BackendResult<OverlayReport>
    where
        D: Device,
        U: UiBackend<D>,
    {
        let viewport = LogicalViewport::from_window(frame.window_size, self.logical_height);

        ui.set_background(frame.composite, viewport.texture_scale(), frame.flip_y);
        ui.set_viewport(viewport.width, viewport.height);

        let (mx, my) = viewport.map_pointer(frame.pointer.x, frame.pointer.y);
        ui.set_mouse(mx, my, frame.pointer.buttons);

        let mut passes = 0;
        let converged = loop {
            passes += 1;
            if !ui.update(frame.canvas_scale) {
                break true;
            }
            if passes >= self.max_passes {
                log::warn!(
                    "ui layout still changing after {} passes, rasterising last layout",
                    passes
                );
                break false;
            }
        };

        ui.rasterize(device)?;

        Ok(OverlayReport {
            viewport,
            passes,
            converged,
        })
    }
}
