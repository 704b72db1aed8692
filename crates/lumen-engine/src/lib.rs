//! Lumen engine crate.
//!
//! Per-frame orchestration for an interactive deferred renderer. The
//! orchestrator (`core::PresentationLoop` driving `pipeline::DispatchPipeline`)
//! is written against the capability traits in `backend`; the native binding
//! (winit window + wgpu device) lives in `window`, `device` and `render`.

pub mod backend;
pub mod config;
pub mod core;
pub mod device;
pub mod error;
pub mod frame;
pub mod input;
pub mod logging;
pub mod overlay;
pub mod pipeline;
pub mod render;
pub mod scene;
pub mod streaming;
pub mod time;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;
