//! Native window binding.
//!
//! Owns the `winit` EventLoop and Window, pumps it from the presentation loop
//! and wires it to the GPU layer. Implements `Device` and `WindowBackend`.

mod runtime;

pub use runtime::NativeWindow;
