use std::fmt;

/// Instrumented steps of a frame, in execution order.
///
/// The first eighteen belong to `DispatchPipeline`; the rest are driven by the
/// presentation loop around it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    ManagerUpdate,
    Resize,
    Cadence,
    Animate,
    SceneCommit,
    ManagerCommit,
    SceneCompute,
    SpatialCompute,
    ObjectCompute,
    RendererCompute,
    FlushScene,
    FlushRenderer,
    FlushFrame,
    DeferredDraw,
    LightCompute,
    OccluderCompute,
    LuminanceCompute,
    CompositeCompute,

    Begin,
    Overlay,
    TargetPass,
    Present,
    DeviceCheck,
}

impl Stage {
    /// Compute and draw stages; their relative order is a data dependency.
    pub const GPU_ORDER: [Stage; 9] = [
        Stage::SceneCompute,
        Stage::SpatialCompute,
        Stage::ObjectCompute,
        Stage::RendererCompute,
        Stage::DeferredDraw,
        Stage::LightCompute,
        Stage::OccluderCompute,
        Stage::LuminanceCompute,
        Stage::CompositeCompute,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::ManagerUpdate => "manager update",
            Stage::Resize => "resize",
            Stage::Cadence => "cadence",
            Stage::Animate => "animate",
            Stage::SceneCommit => "scene commit",
            Stage::ManagerCommit => "manager commit",
            Stage::SceneCompute => "scene compute",
            Stage::SpatialCompute => "spatial compute",
            Stage::ObjectCompute => "object compute",
            Stage::RendererCompute => "renderer compute",
            Stage::FlushScene => "flush scene",
            Stage::FlushRenderer => "flush renderer",
            Stage::FlushFrame => "flush frame",
            Stage::DeferredDraw => "deferred draw",
            Stage::LightCompute => "light compute",
            Stage::OccluderCompute => "occluder compute",
            Stage::LuminanceCompute => "luminance compute",
            Stage::CompositeCompute => "composite compute",
            Stage::Begin => "begin",
            Stage::Overlay => "overlay",
            Stage::TargetPass => "target pass",
            Stage::Present => "present",
            Stage::DeviceCheck => "device check",
        }
    }

    pub(crate) fn enter(self) {
        log::trace!("stage: {}", self.name());
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
