use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::{RenderCtx, RenderTarget};

use super::common::{
    premul_alpha_blend, triangle_list, uniform_entry, QuadVertex, ViewportUniform, QUAD_INDICES,
    QUAD_VERTICES,
};

/// Image stretched over the whole canvas (the composite texture).
#[derive(Debug, Clone)]
pub struct CanvasImage {
    pub view: wgpu::TextureView,
    /// Canvas units per texel.
    pub scale: [f32; 2],
    pub flip_y: bool,
}

/// Solid, premultiplied rectangle in canvas units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CanvasRect {
    pub origin: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
}

/// Rasterised UI: one optional background image plus rects in paint order.
#[derive(Debug, Clone, Default)]
pub struct CanvasList {
    /// Logical canvas size.
    pub viewport: [f32; 2],
    pub image: Option<CanvasImage>,
    pub rects: Vec<CanvasRect>,
}

impl CanvasList {
    pub fn clear(&mut self) {
        self.image = None;
        self.rects.clear();
    }

    pub fn push_rect(&mut self, origin: [f32; 2], size: [f32; 2], color: [f32; 4]) {
        if size[0] <= 0.0 || size[1] <= 0.0 {
            return;
        }
        self.rects.push(CanvasRect { origin, size, color });
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.rects.is_empty()
    }
}

/// Draws a `CanvasList` over the window target.
#[derive(Default)]
pub struct CanvasRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    rect_pipeline: Option<wgpu::RenderPipeline>,
    image_pipeline: Option<wgpu::RenderPipeline>,

    rect_bgl: Option<wgpu::BindGroupLayout>,
    image_bgl: Option<wgpu::BindGroupLayout>,
    rect_bind_group: Option<wgpu::BindGroup>,

    viewport_ubo: Option<wgpu::Buffer>,
    image_ubo: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,

    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,
}

impl CanvasRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, list: &CanvasList) {
        if list.is_empty() || list.viewport[0] <= 0.0 || list.viewport[1] <= 0.0 {
            return;
        }

        self.ensure_pipelines(ctx);
        self.ensure_static_buffers(ctx);
        self.write_uniforms(ctx, list);

        let image_bind_group = list.image.as_ref().and_then(|image| self.image_bind_group(ctx, image));

        let instances: Vec<RectInstance> = list.rects.iter().map(RectInstance::from).collect();
        if !instances.is_empty() {
            self.ensure_instance_capacity(ctx, instances.len());
            if let Some(vbo) = self.instance_vbo.as_ref() {
                ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&instances));
            }
        }

        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };

        let mut rpass = target.load_pass("lumen canvas pass");
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);

        if let (Some(pipeline), Some(bind_group)) = (self.image_pipeline.as_ref(), image_bind_group.as_ref()) {
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, bind_group, &[]);
            rpass.draw_indexed(0..6, 0, 0..1);
        }

        if instances.is_empty() {
            return;
        }
        let (Some(pipeline), Some(bind_group), Some(instance_vbo)) = (
            self.rect_pipeline.as_ref(),
            self.rect_bind_group.as_ref(),
            self.instance_vbo.as_ref(),
        ) else {
            return;
        };
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.draw_indexed(0..6, 0, 0..instances.len() as u32);
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.rect_pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen canvas shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/canvas.wgsl").into()),
        });

        let rect_bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("lumen canvas rect bgl"),
                entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
            });

        let image_bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("lumen canvas image bgl"),
                entries: &[
                    uniform_entry(0, wgpu::ShaderStages::VERTEX),
                    uniform_entry(1, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let color_target = [Some(wgpu::ColorTargetState {
            format: ctx.surface_format,
            blend: Some(premul_alpha_blend()),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let make_pipeline = |label: &'static str,
                             bgl: &wgpu::BindGroupLayout,
                             vs: &'static str,
                             fs: &'static str,
                             buffers: &[wgpu::VertexBufferLayout<'_>]| {
            let layout = ctx
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(label),
                    bind_group_layouts: &[bgl],
                    immediate_size: 0,
                });
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(vs),
                    compilation_options: Default::default(),
                    buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fs),
                    compilation_options: Default::default(),
                    targets: &color_target,
                }),
                primitive: triangle_list(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let rect_pipeline = make_pipeline(
            "lumen canvas rect pipeline",
            &rect_bgl,
            "vs_rect",
            "fs_rect",
            &[QuadVertex::layout(), RectInstance::layout()],
        );
        let image_pipeline = make_pipeline(
            "lumen canvas image pipeline",
            &image_bgl,
            "vs_image",
            "fs_image",
            &[QuadVertex::layout()],
        );

        let viewport_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen canvas viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let image_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen canvas image ubo"),
            size: std::mem::size_of::<ImageUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let rect_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen canvas rect bind group"),
            layout: &rect_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lumen canvas sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.rect_pipeline = Some(rect_pipeline);
        self.image_pipeline = Some(image_pipeline);
        self.rect_bgl = Some(rect_bgl);
        self.image_bgl = Some(image_bgl);
        self.rect_bind_group = Some(rect_bind_group);
        self.viewport_ubo = Some(viewport_ubo);
        self.image_ubo = Some(image_ubo);
        self.sampler = Some(sampler);
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen canvas quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen canvas quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    fn write_uniforms(&self, ctx: &RenderCtx<'_>, list: &CanvasList) {
        if let Some(ubo) = self.viewport_ubo.as_ref() {
            let u = ViewportUniform {
                viewport: list.viewport,
                _pad: [0.0; 2],
            };
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
        }
        if let (Some(ubo), Some(image)) = (self.image_ubo.as_ref(), list.image.as_ref()) {
            ctx.queue
                .write_buffer(ubo, 0, bytemuck::bytes_of(&ImageUniform::new(image)));
        }
    }

    // The bound view changes whenever the frame targets are recreated, so the
    // group is rebuilt per draw.
    fn image_bind_group(&self, ctx: &RenderCtx<'_>, image: &CanvasImage) -> Option<wgpu::BindGroup> {
        let layout = self.image_bgl.as_ref()?;
        let viewport_ubo = self.viewport_ubo.as_ref()?;
        let image_ubo = self.image_ubo.as_ref()?;
        let sampler = self.sampler.as_ref()?;

        Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen canvas image bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: viewport_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: image_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&image.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }))
    }

    fn ensure_instance_capacity(&mut self, ctx: &RenderCtx<'_>, required_instances: usize) {
        if required_instances <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }

        let new_cap = required_instances.next_power_of_two().max(64);
        let new_size = (new_cap * std::mem::size_of::<RectInstance>()) as u64;

        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen canvas instance vbo"),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ImageUniform {
    scale: [f32; 2],
    flip_y: f32,
    _pad: f32,
}

impl ImageUniform {
    fn new(image: &CanvasImage) -> Self {
        Self {
            scale: [image.scale[0].max(f32::EPSILON), image.scale[1].max(f32::EPSILON)],
            flip_y: if image.flip_y { 1.0 } else { 0.0 },
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct RectInstance {
    origin: [f32; 2],
    size: [f32; 2],
    color: [f32; 4],
}

impl From<&CanvasRect> for RectInstance {
    fn from(r: &CanvasRect) -> Self {
        Self {
            origin: r.origin,
            size: r.size,
            color: r.color,
        }
    }
}

impl RectInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RectInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_rect_skips_empty() {
        let mut list = CanvasList::default();
        list.push_rect([0.0, 0.0], [0.0, 10.0], [1.0; 4]);
        list.push_rect([0.0, 0.0], [10.0, -1.0], [1.0; 4]);
        assert!(list.is_empty());

        list.push_rect([4.0, 2.0], [10.0, 10.0], [1.0; 4]);
        assert_eq!(list.rects.len(), 1);

        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn instance_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<RectInstance>(), 32);
        assert_eq!(std::mem::size_of::<ImageUniform>(), 16);
    }
}
