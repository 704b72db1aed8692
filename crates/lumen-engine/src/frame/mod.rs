//! Frame resource lifecycle.

mod resources;

pub use resources::{FrameResourceEvent, FrameResources};
