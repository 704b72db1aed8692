//! Scene state owned by the render thread.
//!
//! - `SceneGraph`: node tree with double precision transforms
//! - `SpatialIndex`: world bounds derived from the graph
//! - `MaterialSet`: parameters and texture slots with dirty tracking
//! - `Animator`: time-driven motions applied before propagation
//!
//! `Scene::update` runs the whole time step in the order the dispatch stages
//! rely on: motions, propagation, spatial rebuild.

mod animate;
mod graph;
mod material;
mod node;
mod procedural;
mod spatial;
mod transform;

pub use animate::{Animator, Motion};
pub use graph::SceneGraph;
pub use material::{Material, MaterialId, MaterialSet, MaterialValue, TextureSlot};
pub use node::{Camera, Light, MeshHandle, MeshObject, NodeId, NodePayload, SceneNode};
pub use procedural::{PatternTexture, TextureGenerator};
pub use spatial::{Aabb, SpatialEntry, SpatialIndex, SpatialKind};
pub use transform::Transform;

/// Counters from one `Scene::update`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SceneUpdate {
    pub animated: usize,
    pub propagated: usize,
    pub spatial_rebuilt: bool,
}

#[derive(Debug, Default)]
pub struct Scene {
    pub graph: SceneGraph,
    pub materials: MaterialSet,
    pub spatial: SpatialIndex,
    pub animator: Animator,
    /// Node rendered from, if any.
    pub camera: Option<NodeId>,
    time: f64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene time in seconds, as last set by the dispatch pipeline.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Applies motions at `time`, propagates transforms and refreshes the
    /// spatial index. Globals are consistent with the tree afterwards.
    pub fn update(&mut self, time: f64) -> SceneUpdate {
        let animated = self.animator.apply(&mut self.graph, time);
        let propagated = self.graph.propagate();
        let spatial_rebuilt = self.spatial.update(&self.graph);
        SceneUpdate {
            animated,
            propagated,
            spatial_rebuilt,
        }
    }

    pub fn clear(&mut self) {
        self.animator.clear();
        self.graph.clear();
        self.materials.clear();
        self.spatial.rebuild(&self.graph);
        self.camera = None;
    }
}
