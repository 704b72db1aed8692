use bytemuck::{Pod, Zeroable};

use crate::backend::BackgroundParams;
use crate::render::{RenderCtx, RenderTarget};

use super::common::{premul_alpha_blend, triangle_list, uniform_entry};

/// Full-screen background primitive.
///
/// One oversized triangle covering the viewport, positioned by
/// `BackgroundParams::transform` and shaded from its color and time.
#[derive(Default)]
pub struct BackgroundRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group: Option<wgpu::BindGroup>,
    ubo: Option<wgpu::Buffer>,
}

impl BackgroundRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, params: &BackgroundParams) {
        self.ensure_pipeline(ctx);

        let Some(ubo) = self.ubo.as_ref() else { return };
        ctx.queue
            .write_buffer(ubo, 0, bytemuck::bytes_of(&BackgroundUniform::from(params)));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };

        let mut rpass = target.load_pass("lumen background pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen background shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/background.wgsl").into()),
        });

        let bind_group_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("lumen background bgl"),
                entries: &[uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                )],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("lumen background pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lumen background pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: triangle_list(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen background ubo"),
            size: std::mem::size_of::<BackgroundUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen background bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group = Some(bind_group);
        self.ubo = Some(ubo);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct BackgroundUniform {
    transform: [[f32; 4]; 4],
    color: [f32; 4],
    time: f32,
    _pad: [f32; 3],
}

impl From<&BackgroundParams> for BackgroundUniform {
    fn from(params: &BackgroundParams) -> Self {
        Self {
            transform: params.transform.to_cols_array_2d(),
            color: params.color,
            time: params.time,
            _pad: [0.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_std140_sized() {
        assert_eq!(std::mem::size_of::<BackgroundUniform>(), 96);
        assert_eq!(std::mem::size_of::<BackgroundUniform>() % 16, 0);
    }

    #[test]
    fn uniform_copies_params() {
        let mut params = BackgroundParams {
            color: [0.25, 0.5, 0.75, 1.0],
            ..Default::default()
        };
        params.animate(2.0);
        let u = BackgroundUniform::from(&params);
        assert_eq!(u.color, params.color);
        assert_eq!(u.time, 2.0);
        assert_eq!(u.transform, params.transform.to_cols_array_2d());
    }
}
