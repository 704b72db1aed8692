//! Time subsystem.
//!
//! - `Clock`: source of monotonic seconds (`SystemClock` in production,
//!   `ManualClock` for deterministic tests).
//! - `FrameClock`: one per presentation loop; `tick()` once per frame.
//! - `CadenceTimer`: fixed-rate refresh decoupled from the display rate.

mod cadence;
mod clock;
mod frame_clock;

pub use cadence::{CadenceTick, CadenceTimer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use frame_clock::{FrameClock, FrameTime};
