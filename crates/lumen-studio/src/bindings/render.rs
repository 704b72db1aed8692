use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use lumen_engine::backend::{FrameTargets, RenderBackend};
use lumen_engine::error::{BackendError, BackendResult};
use lumen_engine::scene::{MaterialId, Scene, SpatialKind};
use lumen_engine::window::NativeWindow;

use super::shared::{GpuScene, SharedScene};
use super::StudioScene;

/// Objects shaded per frame; the rest are culled.
pub const MAX_OBJECTS: usize = 8;

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
const COMPOSITE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const WORKGROUP: u32 = 8;

/// Deferred renderer: ray-marched geometry pass, luminance, composite.
pub struct StudioRender {
    shared: SharedScene,
    pipelines: Pipelines,
    frame: FrameUniform,
    deferred_bind: Option<(Option<(MaterialId, u64)>, wgpu::BindGroup)>,
    visible: usize,
}

struct Pipelines {
    deferred: wgpu::RenderPipeline,
    deferred_bgl: wgpu::BindGroupLayout,
    luminance: wgpu::ComputePipeline,
    luminance_bgl: wgpu::BindGroupLayout,
    composite: wgpu::ComputePipeline,
    composite_bgl: wgpu::BindGroupLayout,
    frame_ubo: wgpu::Buffer,
    sampler: wgpu::Sampler,
    fallback: wgpu::TextureView,
}

/// Frame-sized render targets.
pub struct StudioTargets {
    size: (u32, u32),
    color: wgpu::TextureView,
    composite: wgpu::TextureView,
    exposure: wgpu::Buffer,
    luminance_bind: wgpu::BindGroup,
    composite_bind: wgpu::BindGroup,
    fresh: bool,
}

impl StudioRender {
    pub fn new(device: &NativeWindow, scene: &StudioScene) -> Self {
        Self {
            shared: scene.shared(),
            pipelines: Pipelines::new(device.device(), device.queue()),
            frame: FrameUniform::zeroed(),
            deferred_bind: None,
            visible: 0,
        }
    }

    fn deferred_bind_group(&mut self, device: &wgpu::Device) -> wgpu::BindGroup {
        let gpu = self.shared.lock();
        let texture = gpu
            .objects
            .first()
            .and_then(|o| gpu.textures.get(&o.material).map(|t| (o.material, t)));
        let key = texture.map(|(id, t)| (id, t.generation));

        if let Some((cached, bind)) = self.deferred_bind.as_ref() {
            if *cached == key {
                return bind.clone();
            }
        }

        let view = texture.map_or(&self.pipelines.fallback, |(_, t)| &t.view);
        let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen deferred bind group"),
            layout: &self.pipelines.deferred_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.pipelines.frame_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.pipelines.sampler),
                },
            ],
        });
        drop(gpu);
        self.deferred_bind = Some((key, bind.clone()));
        bind
    }
}

fn marker_pass(compute: &mut wgpu::CommandEncoder, label: &'static str) {
    compute.begin_compute_pass(&wgpu::ComputePassDescriptor {
        label: Some(label),
        timestamp_writes: None,
    });
}

impl RenderBackend<NativeWindow> for StudioRender {
    type Targets = StudioTargets;

    fn update(&mut self) {
        // Pipelines are built once in `new`; nothing is streamed in.
    }

    fn create_targets(&mut self, device: &NativeWindow, width: u32, height: u32) -> BackendResult<StudioTargets> {
        let limit = device.device().limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > limit || height > limit {
            return Err(BackendError::Creation {
                what: "frame targets",
                reason: format!("{width}x{height} outside 1..={limit}"),
            });
        }
        Ok(StudioTargets::new(device.device(), &self.pipelines, width, height))
    }

    fn dispatch_spatial(&mut self, compute: &mut wgpu::CommandEncoder, _targets: &mut StudioTargets, scene: &Scene) {
        log::trace!("spatial pass over {} entries", scene.spatial.len());
        marker_pass(compute, "lumen spatial");
    }

    fn dispatch_objects(&mut self, compute: &mut wgpu::CommandEncoder, _targets: &mut StudioTargets, scene: &Scene) {
        let gpu = self.shared.lock();
        self.visible = match gpu.view {
            Some(view) => {
                let eye = view.camera.w_axis.truncate().as_dvec3();
                scene
                    .spatial
                    .query_sphere(eye, view.far as f64)
                    .filter(|e| e.kind == SpatialKind::Object)
                    .count()
                    .min(MAX_OBJECTS)
            }
            None => 0,
        };
        marker_pass(compute, "lumen objects");
    }

    fn dispatch_renderer(&mut self, compute: &mut wgpu::CommandEncoder, targets: &mut StudioTargets, _scene: &Scene) {
        let gpu = self.shared.lock();
        self.frame = FrameUniform::build(&gpu, targets.size, self.visible);
        marker_pass(compute, "lumen renderer");
    }

    fn flush(&mut self, device: &NativeWindow) {
        device
            .queue()
            .write_buffer(&self.pipelines.frame_ubo, 0, bytemuck::bytes_of(&self.frame));
    }

    fn draw_deferred(&mut self, device: &NativeWindow, targets: &mut StudioTargets) {
        let bind = self.deferred_bind_group(device.device());
        let mut encoder = device
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen deferred encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lumen deferred pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &targets.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            rpass.set_pipeline(&self.pipelines.deferred);
            rpass.set_bind_group(0, &bind, &[]);
            rpass.draw(0..3, 0..1);
        }
        device.queue().submit(std::iter::once(encoder.finish()));
    }

    fn dispatch_light(&mut self, _device: &NativeWindow, compute: &mut wgpu::CommandEncoder, _targets: &mut StudioTargets) {
        // Single point light, shaded in the geometry pass.
        marker_pass(compute, "lumen light");
    }

    fn dispatch_occluder(&mut self, _device: &NativeWindow, compute: &mut wgpu::CommandEncoder, _targets: &mut StudioTargets) {
        marker_pass(compute, "lumen occluder");
    }

    fn dispatch_luminance(&mut self, _device: &NativeWindow, compute: &mut wgpu::CommandEncoder, targets: &mut StudioTargets) {
        let mut cpass = compute.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("lumen luminance"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&self.pipelines.luminance);
        cpass.set_bind_group(0, &targets.luminance_bind, &[]);
        cpass.dispatch_workgroups(1, 1, 1);
    }

    fn dispatch_composite(&mut self, _device: &NativeWindow, compute: &mut wgpu::CommandEncoder, targets: &mut StudioTargets) {
        let (width, height) = targets.size;
        let mut cpass = compute.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("lumen composite"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&self.pipelines.composite);
        cpass.set_bind_group(0, &targets.composite_bind, &[]);
        cpass.dispatch_workgroups(width.div_ceil(WORKGROUP), height.div_ceil(WORKGROUP), 1);
    }

    fn is_target_flipped(&self) -> bool {
        // wgpu textures are top-down, like the window.
        false
    }
}

impl StudioTargets {
    fn new(device: &wgpu::Device, pipelines: &Pipelines, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let target = |label: &'static str, format, usage| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        };

        let color = target(
            "lumen color target",
            COLOR_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let composite = target(
            "lumen composite target",
            COMPOSITE_FORMAT,
            wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let exposure = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen exposure"),
            size: std::mem::size_of::<[f32; 4]>() as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let luminance_bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen luminance bind group"),
            layout: &pipelines.luminance_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: exposure.as_entire_binding(),
                },
            ],
        });
        let composite_bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen composite bind group"),
            layout: &pipelines.composite_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: exposure.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&composite),
                },
            ],
        });

        Self {
            size: (width, height),
            color,
            composite,
            exposure,
            luminance_bind,
            composite_bind,
            fresh: true,
        }
    }
}

impl FrameTargets<NativeWindow> for StudioTargets {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Seeds the exposure buffer once after creation.
    fn flush(&mut self, device: &NativeWindow) {
        if !self.fresh {
            return;
        }
        device
            .queue()
            .write_buffer(&self.exposure, 0, bytemuck::cast_slice(&[1.0f32, 1.0, 0.0, 0.0]));
        self.fresh = false;
    }

    fn composite_texture(&self) -> wgpu::TextureView {
        self.composite.clone()
    }
}

impl Pipelines {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let deferred_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen deferred shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/deferred.wgsl").into()),
        });
        let luminance_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen luminance shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/luminance.wgsl").into()),
        });
        let composite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen composite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/composite.wgsl").into()),
        });

        let sampled = |binding, visibility, filterable| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let storage = |binding, read_only| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let deferred_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen deferred bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                sampled(1, wgpu::ShaderStages::FRAGMENT, true),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let luminance_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen luminance bgl"),
            entries: &[sampled(0, wgpu::ShaderStages::COMPUTE, false), storage(1, false)],
        });
        let composite_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen composite bgl"),
            entries: &[
                sampled(0, wgpu::ShaderStages::COMPUTE, false),
                storage(1, true),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: COMPOSITE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let layout = |label: &'static str, bgl: &wgpu::BindGroupLayout| {
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &[bgl],
                immediate_size: 0,
            })
        };

        let deferred_layout = layout("lumen deferred pipeline layout", &deferred_bgl);
        let deferred = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lumen deferred pipeline"),
            layout: Some(&deferred_layout),
            vertex: wgpu::VertexState {
                module: &deferred_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &deferred_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let compute = |label: &'static str, module: &wgpu::ShaderModule, bgl: &wgpu::BindGroupLayout| {
            let pipeline_layout = layout(label, bgl);
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                cache: None,
            })
        };
        let luminance = compute("lumen luminance pipeline", &luminance_shader, &luminance_bgl);
        let composite = compute("lumen composite pipeline", &composite_shader, &composite_bgl);

        let frame_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen frame ubo"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lumen diffuse sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            deferred,
            deferred_bgl,
            luminance,
            luminance_bgl,
            composite,
            composite_bgl,
            frame_ubo,
            sampler,
            fallback: white_texture(device, queue),
        }
    }
}

/// 1x1 white, bound until the first diffuse texture arrives.
fn white_texture(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: 1,
        height: 1,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("lumen fallback texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        texture.as_image_copy(),
        &[255u8; 4],
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4),
            rows_per_image: Some(1),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

// ── uniforms ──────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ObjectUniform {
    world: [[f32; 4]; 4],
    inv_world: [[f32; 4]; 4],
    /// major radius, minor radius, roughness, metallic
    shape: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct FrameUniform {
    inv_view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    /// xyz position, w intensity
    light_pos: [f32; 4],
    /// rgb color, w radius
    light_color: [f32; 4],
    counts: [u32; 4],
    objects: [ObjectUniform; MAX_OBJECTS],
}

impl FrameUniform {
    fn build(gpu: &GpuScene, size: (u32, u32), visible: usize) -> Self {
        let mut frame = Self::zeroed();
        let Some(view) = gpu.view else {
            return frame;
        };

        let aspect = size.0 as f32 / size.1.max(1) as f32;
        let proj = Mat4::perspective_rh(view.fov_y_deg.to_radians(), aspect, view.near, view.far);
        frame.inv_view_proj = (proj * view.camera.inverse()).inverse().to_cols_array_2d();
        frame.camera_pos = view.camera.w_axis.to_array();

        if let Some(light) = gpu.light {
            frame.light_pos = light.position.extend(light.intensity).to_array();
            frame.light_color = [light.color[0], light.color[1], light.color[2], light.radius];
        }

        let count = visible.min(gpu.objects.len());
        for (slot, object) in frame.objects.iter_mut().zip(&gpu.objects[..count]) {
            slot.world = object.world.to_cols_array_2d();
            slot.inv_world = object.world.inverse().to_cols_array_2d();
            slot.shape = Vec4::new(
                object.major_radius,
                object.minor_radius,
                object.roughness,
                object.metallic,
            )
            .to_array();
        }
        frame.counts[0] = count as u32;
        frame
    }
}
