//! Per-frame dispatch sequence.

mod dispatch;
mod stage;

pub use dispatch::{Backends, CadenceBinding, DispatchPipeline, FrameInput, FrameOutcome};
pub use stage::Stage;
