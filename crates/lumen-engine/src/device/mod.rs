//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue for a window
//! - configuring the surface and acquiring/presenting frames
//! - tracking device loss and reading textures back for screenshots

mod gpu;
mod readback;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
pub use readback::read_texture_rgba;
