use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use lumen_engine::scene::MaterialId;
use parking_lot::Mutex;

/// Uploaded diffuse texture and the material generation it came from.
pub(crate) struct DiffuseTexture {
    pub view: wgpu::TextureView,
    pub generation: u64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct ViewData {
    /// Camera to world.
    pub camera: Mat4,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct LightData {
    pub position: Vec3,
    pub intensity: f32,
    pub radius: f32,
    pub color: [f32; 3],
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct ObjectData {
    /// Object to world.
    pub world: Mat4,
    pub material: MaterialId,
    pub major_radius: f32,
    pub minor_radius: f32,
    pub roughness: f32,
    pub metallic: f32,
}

/// Scene state extracted for the GPU, written by the scene binding.
#[derive(Default)]
pub(crate) struct GpuScene {
    pub textures: HashMap<MaterialId, DiffuseTexture>,
    pub view: Option<ViewData>,
    pub light: Option<LightData>,
    pub objects: Vec<ObjectData>,
}

impl GpuScene {
    pub fn clear(&mut self) {
        self.textures.clear();
        self.view = None;
        self.light = None;
        self.objects.clear();
    }
}

pub(crate) type SharedScene = Arc<Mutex<GpuScene>>;
