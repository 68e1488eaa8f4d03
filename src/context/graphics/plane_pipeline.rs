use super::{
    GraphicsContext, PlaneVertex, Texture2D, ToWorldview, ViewProjection, DEPTH_FORMAT,
};

use anyhow::{anyhow, Context, Result};

/// Display controls for one plane, mirrored into the fragment shader.
/// `take_log` switches between the linear [vmin, vmax] window and the
/// log10 [log_vmin, log_vmax] window; `colormap` selects a shader ramp.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PlaneParams {
    pub take_log: u32,
    pub colormap: i32,
    pub vmin: f32,
    pub vmax: f32,
    pub log_vmin: f32,
    pub log_vmax: f32,
    pub _pad: [u32; 2],
}

unsafe impl bytemuck::Pod for PlaneParams {}
unsafe impl bytemuck::Zeroable for PlaneParams {}

impl Default for PlaneParams {
    fn default() -> Self {
        Self {
            take_log: 0,
            colormap: 0,
            vmin: 0.0,
            vmax: 1.0,
            log_vmin: 0.0,
            log_vmax: 1.0,
            _pad: [0; 2],
        }
    }
}

/// GPU state for one plane: quad buffers, the uploaded FRB texture and
/// the per-plane uniforms, bound together as bind group 1.
pub struct PlaneBinding {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub to_worldview_buffer: wgpu::Buffer,
    pub params_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub texture: Texture2D,
}

pub struct PlanePipeline {
    pipeline: wgpu::RenderPipeline,
    pub view_proj_buffer: wgpu::Buffer,
    view_proj_bind_group: wgpu::BindGroup,
    plane_bind_group_layout: wgpu::BindGroupLayout,
}

impl PlanePipeline {
    pub fn new(ctx: &GraphicsContext) -> Result<Self> {
        let vs_src = include_str!("shaders/plane.vert");
        let fs_src = include_str!("shaders/plane.frag");

        let vs_spirv = glsl_to_spirv::compile(vs_src, glsl_to_spirv::ShaderType::Vertex)
            .map_err(|s| anyhow!(s))
            .context("Failed to compile 'shaders/plane.vert' to SPIR-V")?;
        let fs_spirv = glsl_to_spirv::compile(fs_src, glsl_to_spirv::ShaderType::Fragment)
            .map_err(|s| anyhow!(s))
            .context("Failed to compile 'shaders/plane.frag' to SPIR-V")?;

        let vs_data = wgpu::read_spirv(vs_spirv)?;
        let fs_data = wgpu::read_spirv(fs_spirv)?;

        let vs_module = ctx.device.create_shader_module(&vs_data);
        let fs_module = ctx.device.create_shader_module(&fs_data);

        let view_proj_buffer = ctx.device.create_buffer_with_data(
            bytemuck::cast_slice(&[ViewProjection::default()]),
            wgpu::BufferUsage::UNIFORM | wgpu::BufferUsage::COPY_DST,
        );

        let view_proj_bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("view_proj_bind_group_layout"),
                    bindings: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStage::VERTEX,
                        ty: wgpu::BindingType::UniformBuffer { dynamic: false },
                    }],
                });

        let view_proj_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("view_proj_bind_group"),
            layout: &view_proj_bind_group_layout,
            bindings: &[wgpu::Binding {
                binding: 0,
                resource: wgpu::BindingResource::Buffer {
                    buffer: &view_proj_buffer,
                    range: 0..std::mem::size_of::<ViewProjection>() as wgpu::BufferAddress,
                },
            }],
        });

        let plane_bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("plane_bind_group_layout"),
                    bindings: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStage::VERTEX,
                            ty: wgpu::BindingType::UniformBuffer { dynamic: false },
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStage::FRAGMENT,
                            ty: wgpu::BindingType::UniformBuffer { dynamic: false },
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStage::FRAGMENT,
                            ty: wgpu::BindingType::SampledTexture {
                                multisampled: false,
                                component_type: wgpu::TextureComponentType::Float,
                                dimension: wgpu::TextureViewDimension::D2,
                            },
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 3,
                            visibility: wgpu::ShaderStage::FRAGMENT,
                            ty: wgpu::BindingType::Sampler { comparison: false },
                        },
                    ],
                });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                bind_group_layouts: &[&view_proj_bind_group_layout, &plane_bind_group_layout],
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                layout: &pipeline_layout,
                vertex_stage: wgpu::ProgrammableStageDescriptor {
                    module: &vs_module,
                    entry_point: "main",
                },
                fragment_stage: Some(wgpu::ProgrammableStageDescriptor {
                    module: &fs_module,
                    entry_point: "main",
                }),
                rasterization_state: Some(wgpu::RasterizationStateDescriptor {
                    front_face: wgpu::FrontFace::Ccw,
                    // Planes are inspected from both sides.
                    cull_mode: wgpu::CullMode::None,
                    depth_bias: 0,
                    depth_bias_slope_scale: 0.0,
                    depth_bias_clamp: 0.0,
                }),
                color_states: &[wgpu::ColorStateDescriptor {
                    format: ctx.sc_desc.format,
                    color_blend: wgpu::BlendDescriptor::REPLACE,
                    alpha_blend: wgpu::BlendDescriptor::REPLACE,
                    write_mask: wgpu::ColorWrite::ALL,
                }],
                primitive_topology: wgpu::PrimitiveTopology::TriangleList,
                depth_stencil_state: Some(wgpu::DepthStencilStateDescriptor {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil_front: wgpu::StencilStateFaceDescriptor::IGNORE,
                    stencil_back: wgpu::StencilStateFaceDescriptor::IGNORE,
                    stencil_read_mask: 0,
                    stencil_write_mask: 0,
                }),
                vertex_state: wgpu::VertexStateDescriptor {
                    index_format: wgpu::IndexFormat::Uint32,
                    vertex_buffers: &[PlaneVertex::desc()],
                },
                sample_count: 1,
                sample_mask: !0,
                alpha_to_coverage_enabled: false,
            });

        Ok(Self {
            pipeline,
            view_proj_buffer,
            view_proj_bind_group,
            plane_bind_group_layout,
        })
    }

    pub fn create_binding(
        &self,
        ctx: &GraphicsContext,
        vertices: &[PlaneVertex],
        indices: &[u32],
        texture: Texture2D,
        to_worldview: ToWorldview,
        params: PlaneParams,
    ) -> PlaneBinding {
        let vertex_buffer = ctx
            .device
            .create_buffer_with_data(bytemuck::cast_slice(vertices), wgpu::BufferUsage::VERTEX);
        let index_buffer = ctx
            .device
            .create_buffer_with_data(bytemuck::cast_slice(indices), wgpu::BufferUsage::INDEX);

        let to_worldview_buffer = ctx.device.create_buffer_with_data(
            bytemuck::cast_slice(&[to_worldview]),
            wgpu::BufferUsage::UNIFORM | wgpu::BufferUsage::COPY_DST,
        );
        let params_buffer = ctx.device.create_buffer_with_data(
            bytemuck::cast_slice(&[params]),
            wgpu::BufferUsage::UNIFORM | wgpu::BufferUsage::COPY_DST,
        );

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("plane_bind_group"),
            layout: &self.plane_bind_group_layout,
            bindings: &[
                wgpu::Binding {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer {
                        buffer: &to_worldview_buffer,
                        range: 0..std::mem::size_of::<ToWorldview>() as wgpu::BufferAddress,
                    },
                },
                wgpu::Binding {
                    binding: 1,
                    resource: wgpu::BindingResource::Buffer {
                        buffer: &params_buffer,
                        range: 0..std::mem::size_of::<PlaneParams>() as wgpu::BufferAddress,
                    },
                },
                wgpu::Binding {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::Binding {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        PlaneBinding {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            to_worldview_buffer,
            params_buffer,
            bind_group,
            texture,
        }
    }

    pub fn create_depth_texture(&self, ctx: &GraphicsContext) -> wgpu::TextureView {
        ctx.device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("depth_texture"),
                size: wgpu::Extent3d {
                    width: ctx.sc_desc.width,
                    height: ctx.sc_desc.height,
                    depth: 1,
                },
                array_layer_count: 1,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsage::OUTPUT_ATTACHMENT,
            })
            .create_default_view()
    }

    pub fn update_view_proj(&self, ctx: &mut GraphicsContext, view_proj: &ViewProjection) {
        copy_to_buffer(ctx, &self.view_proj_buffer, view_proj);
    }

    pub fn update_to_worldview(
        &self,
        ctx: &mut GraphicsContext,
        binding: &PlaneBinding,
        to_worldview: &ToWorldview,
    ) {
        copy_to_buffer(ctx, &binding.to_worldview_buffer, to_worldview);
    }

    pub fn update_params(
        &self,
        ctx: &mut GraphicsContext,
        binding: &PlaneBinding,
        params: &PlaneParams,
    ) {
        copy_to_buffer(ctx, &binding.params_buffer, params);
    }

    pub fn render<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>, binding: &'a PlaneBinding) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.view_proj_bind_group, &[]);
        render_pass.set_bind_group(1, &binding.bind_group, &[]);
        render_pass.set_vertex_buffer(0, &binding.vertex_buffer, 0, 0);
        render_pass.set_index_buffer(&binding.index_buffer, 0, 0);
        render_pass.draw_indexed(0..binding.index_count, 0, 0..1);
    }
}

fn copy_to_buffer<T: bytemuck::Pod>(ctx: &mut GraphicsContext, target: &wgpu::Buffer, value: &T) {
    let staging = ctx
        .device
        .create_buffer_with_data(bytemuck::bytes_of(value), wgpu::BufferUsage::COPY_SRC);

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("uniform_update_encoder"),
        });
    encoder.copy_buffer_to_buffer(
        &staging,
        0,
        target,
        0,
        std::mem::size_of::<T>() as wgpu::BufferAddress,
    );
    ctx.queue.submit(&[encoder.finish()]);
}
