use super::{MaterialId, Transform};

slotmap::new_key_type! {
    /// Stable handle to a node in a `SceneGraph`.
    pub struct NodeId;
}

/// Opaque mesh handle owned by the scene backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_y_deg: 60.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Point light.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub intensity: f32,
    pub radius: f32,
    pub color: [f32; 3],
}

impl Default for Light {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            radius: 10.0,
            color: [1.0; 3],
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshObject {
    pub mesh: MeshHandle,
    pub material: MaterialId,
    /// Radius of the bounding sphere around the node origin.
    pub bound_radius: f64,
}

/// What a node carries besides its transform.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum NodePayload {
    /// Pure grouping node.
    #[default]
    Empty,
    Camera(Camera),
    Light(Light),
    Mesh(MeshObject),
}

impl NodePayload {
    pub fn kind(&self) -> &'static str {
        match self {
            NodePayload::Empty => "empty",
            NodePayload::Camera(_) => "camera",
            NodePayload::Light(_) => "light",
            NodePayload::Mesh(_) => "mesh",
        }
    }
}

/// A node in the scene tree.
///
/// `global` is a cache: it is valid only after `SceneGraph::propagate` has run
/// since the last edit touching this node or one of its ancestors.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub(super) name: String,
    pub(super) local: Transform,
    pub(super) global: Transform,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    pub(super) payload: NodePayload,
    pub(super) dirty: bool,
}

impl SceneNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_transform(&self) -> Transform {
        self.local
    }

    pub fn global_transform(&self) -> Transform {
        self.global
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn payload(&self) -> &NodePayload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut NodePayload {
        &mut self.payload
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
