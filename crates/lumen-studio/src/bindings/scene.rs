use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use parking_lot::Mutex;

use lumen_engine::backend::SceneBackend;
use lumen_engine::error::{BackendError, BackendResult};
use lumen_engine::scene::{MaterialId, MaterialValue, MeshHandle, NodePayload, Scene, SpatialKind};
use lumen_engine::streaming::{AsyncContext, StreamSource};
use lumen_engine::window::NativeWindow;

use super::shared::{DiffuseTexture, GpuScene, LightData, ObjectData, SharedScene, ViewData};

/// Material slot uploaded for shading.
pub const DIFFUSE_SLOT: &str = "diffuse";

/// Torus around the local Z axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TorusMesh {
    pub major_radius: f32,
    pub minor_radius: f32,
}

impl TorusMesh {
    pub fn bound_radius(&self) -> f64 {
        (self.major_radius + self.minor_radius) as f64
    }
}

struct TextureRequest {
    material: MaterialId,
    generation: u64,
    image: Arc<RgbaImage>,
}

struct PreparedTexture {
    material: MaterialId,
    generation: u64,
    mips: Vec<RgbaImage>,
}

/// Streaming side of the scene binding; shared with the streaming thread.
///
/// The render thread queues texture requests, the streaming thread turns them
/// into mip chains, and the render thread picks the results up in `update`.
#[derive(Default)]
pub struct StreamCore {
    requests: Mutex<VecDeque<TextureRequest>>,
    ready: Arc<Mutex<Vec<PreparedTexture>>>,
    terminated: AtomicBool,
}

impl StreamCore {
    /// Queues `request`, replacing an older one for the same material.
    fn request(&self, request: TextureRequest) {
        let mut requests = self.requests.lock();
        requests.retain(|r| r.material != request.material);
        requests.push_back(request);
    }

    fn take_ready(&self) -> Vec<PreparedTexture> {
        std::mem::take(&mut *self.ready.lock())
    }

    fn clear(&self) {
        self.requests.lock().clear();
        self.ready.lock().clear();
    }
}

impl StreamSource for StreamCore {
    fn process(&self, async_ctx: &mut AsyncContext) -> BackendResult<bool> {
        let Some(request) = self.requests.lock().pop_front() else {
            return Ok(false);
        };

        let ready = Arc::clone(&self.ready);
        async_ctx.spawn(move || {
            let mips = build_mip_chain(&request.image);
            log::trace!(
                "prepared texture generation {} ({} mips)",
                request.generation,
                mips.len()
            );
            ready.lock().push(PreparedTexture {
                material: request.material,
                generation: request.generation,
                mips,
            });
        });
        Ok(true)
    }

    fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }
}

/// Level 0 is the source; each level halves down to 1x1.
pub(crate) fn build_mip_chain(source: &RgbaImage) -> Vec<RgbaImage> {
    let mut mips = vec![source.clone()];
    loop {
        let Some(last) = mips.last() else { break };
        let (w, h) = last.dimensions();
        if w <= 1 && h <= 1 {
            break;
        }
        let next = imageops::resize(last, (w / 2).max(1), (h / 2).max(1), FilterType::Triangle);
        mips.push(next);
    }
    mips
}

/// Scene manager binding: texture streaming, GPU scene extraction.
pub struct StudioScene {
    core: Arc<StreamCore>,
    shared: SharedScene,
    meshes: Vec<TorusMesh>,
    requested: HashMap<MaterialId, u64>,
    /// Created textures waiting for their texel upload in `flush`.
    uploads: Vec<(wgpu::Texture, Vec<RgbaImage>)>,
}

impl StudioScene {
    pub fn new() -> Self {
        Self {
            core: Arc::new(StreamCore::default()),
            shared: SharedScene::default(),
            meshes: Vec::new(),
            requested: HashMap::new(),
            uploads: Vec::new(),
        }
    }

    pub(crate) fn shared(&self) -> SharedScene {
        Arc::clone(&self.shared)
    }

    pub fn register_torus(&mut self, mesh: TorusMesh) -> MeshHandle {
        self.meshes.push(mesh);
        MeshHandle(self.meshes.len() as u32 - 1)
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&TorusMesh> {
        self.meshes.get(handle.0 as usize)
    }

    /// Queues a diffuse texture for every dirty material with a new generation.
    fn request_textures(&mut self, scene: &Scene, dirty: &[MaterialId]) -> usize {
        let mut queued = 0;
        for &id in dirty {
            let Some(slot) = scene.materials.get(id).and_then(|m| m.texture(DIFFUSE_SLOT)) else {
                continue;
            };
            if self.requested.get(&id) == Some(&slot.generation) {
                continue;
            }
            self.requested.insert(id, slot.generation);
            self.core.request(TextureRequest {
                material: id,
                generation: slot.generation,
                image: Arc::clone(&slot.image),
            });
            queued += 1;
        }
        queued
    }

    fn check_meshes(&self, scene: &Scene) -> BackendResult<()> {
        for (_, node) in scene.graph.iter() {
            if let NodePayload::Mesh(object) = node.payload() {
                if self.mesh(object.mesh).is_none() {
                    return Err(BackendError::Creation {
                        what: "object",
                        reason: format!("node \"{}\" uses unknown mesh {}", node.name(), object.mesh.0),
                    });
                }
            }
        }
        Ok(())
    }

    fn extract(&self, scene: &Scene, gpu: &mut GpuScene) {
        gpu.view = scene.camera.and_then(|id| {
            let node = scene.graph.get(id)?;
            let NodePayload::Camera(camera) = node.payload() else {
                return None;
            };
            Some(ViewData {
                camera: node.global_transform().to_mat4_f32(),
                fov_y_deg: camera.fov_y_deg,
                near: camera.near,
                far: camera.far,
            })
        });

        gpu.light = None;
        gpu.objects.clear();
        for entry in scene.spatial.entries() {
            let Some(node) = scene.graph.get(entry.node) else { continue };
            let global = node.global_transform();
            match (entry.kind, node.payload()) {
                (SpatialKind::Light, NodePayload::Light(light)) if gpu.light.is_none() => {
                    gpu.light = Some(LightData {
                        position: global.translation.as_vec3(),
                        intensity: light.intensity,
                        radius: light.radius,
                        color: light.color,
                    });
                }
                (SpatialKind::Object, NodePayload::Mesh(object)) => {
                    let Some(mesh) = self.mesh(object.mesh) else { continue };
                    let scalar = |name: &str, default: f32| match scene.materials.resolve_param(object.material, name) {
                        Some(MaterialValue::Scalar(v)) => v,
                        _ => default,
                    };
                    gpu.objects.push(ObjectData {
                        world: global.to_mat4_f32(),
                        material: object.material,
                        major_radius: mesh.major_radius,
                        minor_radius: mesh.minor_radius,
                        roughness: scalar("roughness_scale", 1.0),
                        metallic: scalar("metallic_scale", 0.0),
                    });
                }
                _ => {}
            }
        }
    }
}

impl Default for StudioScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBackend<NativeWindow> for StudioScene {
    fn stream_source(&self) -> Arc<dyn StreamSource> {
        self.core.clone()
    }

    fn commit_scene(
        &mut self,
        _device: &NativeWindow,
        scene: &Scene,
        dirty: &[MaterialId],
        _async_ctx: &mut AsyncContext,
    ) -> BackendResult<()> {
        self.check_meshes(scene)?;
        let queued = self.request_textures(scene, dirty);
        if queued > 0 {
            log::trace!("queued {queued} texture(s) for streaming");
        }
        Ok(())
    }

    fn update(&mut self, device: &NativeWindow, async_ctx: &mut AsyncContext) -> BackendResult<()> {
        let limit = device.device().limits().max_texture_dimension_2d;
        for prepared in self.core.take_ready() {
            // A newer generation was requested meanwhile; it is still in flight.
            if self.requested.get(&prepared.material) != Some(&prepared.generation) {
                continue;
            }
            let Some(base) = prepared.mips.first() else { continue };
            let (width, height) = base.dimensions();
            if width > limit || height > limit {
                return Err(BackendError::Update(format!(
                    "texture {width}x{height} exceeds device limit {limit}"
                )));
            }

            let texture = device.device().create_texture(&wgpu::TextureDescriptor {
                label: Some("lumen diffuse texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: prepared.mips.len() as u32,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            self.uploads.push((texture, prepared.mips));

            let replaced = self.shared.lock().textures.insert(
                prepared.material,
                DiffuseTexture {
                    view,
                    generation: prepared.generation,
                },
            );
            // Frames in flight may still sample the old one.
            if let Some(old) = replaced {
                async_ctx.spawn(move || drop(old));
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, _device: &NativeWindow, compute: &mut wgpu::CommandEncoder, scene: &Scene) {
        let mut gpu = self.shared.lock();
        self.extract(scene, &mut gpu);
        drop(gpu);

        compute.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("lumen scene"),
            timestamp_writes: None,
        });
    }

    fn flush(&mut self, device: &NativeWindow) {
        for (texture, mips) in self.uploads.drain(..) {
            for (level, mip) in mips.iter().enumerate() {
                let (width, height) = mip.dimensions();
                device.queue().write_texture(
                    wgpu::TexelCopyTextureInfo {
                        texture: &texture,
                        mip_level: level as u32,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    mip.as_raw(),
                    wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(width * 4),
                        rows_per_image: Some(height),
                    },
                    wgpu::Extent3d {
                        width,
                        height,
                        depth_or_array_layers: 1,
                    },
                );
            }
        }
    }

    fn terminate(&mut self) {
        self.core.terminated.store(true, Ordering::Release);
    }

    fn clear(&mut self) {
        self.core.clear();
        self.requested.clear();
        self.uploads.clear();
        self.shared.lock().clear();
    }
}
