use std::collections::HashMap;

use anyhow::Result;
use engine::{ProgramCompiler, ProgramError, ProgramHandle, ShaderSource, SlotRole};

use crate::compile::{compile_fragment_shader, compile_vertex_shader, with_validation};

/// Offscreen format the primary program renders into.
pub(crate) const SCENE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Bind group layouts shared by every program of a role.
pub(crate) struct ProgramLayouts {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub scene_layout: wgpu::BindGroupLayout,
    primary: wgpu::PipelineLayout,
    post: wgpu::PipelineLayout,
}

impl ProgramLayouts {
    fn new(device: &wgpu::Device) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let primary = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("primary pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });
        let post = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("post pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &scene_layout],
            push_constant_ranges: &[],
        });
        Self {
            uniform_layout,
            scene_layout,
            primary,
            post,
        }
    }
}

/// wgpu-backed [`ProgramCompiler`]: every handle names one render pipeline.
pub struct WgpuPrograms {
    device: wgpu::Device,
    vertex_module: wgpu::ShaderModule,
    layouts: ProgramLayouts,
    surface_format: wgpu::TextureFormat,
    next_id: u32,
    pipelines: HashMap<ProgramHandle, wgpu::RenderPipeline>,
}

impl WgpuPrograms {
    pub(crate) fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Result<Self> {
        let vertex_module = compile_vertex_shader(device)?;
        Ok(Self {
            device: device.clone(),
            vertex_module,
            layouts: ProgramLayouts::new(device),
            surface_format,
            next_id: 0,
            pipelines: HashMap::new(),
        })
    }

    pub(crate) fn layouts(&self) -> &ProgramLayouts {
        &self.layouts
    }

    pub(crate) fn pipeline(&self, handle: ProgramHandle) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&handle)
    }

    /// Number of pipelines created and not yet destroyed.
    pub fn live_programs(&self) -> usize {
        self.pipelines.len()
    }

    fn build_pipeline(
        &self,
        role: SlotRole,
        fragment_module: &wgpu::ShaderModule,
    ) -> Result<wgpu::RenderPipeline, ProgramError> {
        let (layout, format, label) = match role {
            SlotRole::Primary => (&self.layouts.primary, SCENE_FORMAT, "primary pipeline"),
            SlotRole::PostProcess => (&self.layouts.post, self.surface_format, "post pipeline"),
        };
        with_validation(&self.device, ProgramError::link, || {
            self.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(label),
                    layout: Some(layout),
                    vertex: wgpu::VertexState {
                        module: &self.vertex_module,
                        entry_point: Some("main"),
                        buffers: &[],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: None,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    fragment: Some(wgpu::FragmentState {
                        module: fragment_module,
                        entry_point: Some("main"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format,
                            blend: Some(wgpu::BlendState::REPLACE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    multiview: None,
                    cache: None,
                })
        })
    }
}

impl ProgramCompiler for WgpuPrograms {
    fn create_program(
        &mut self,
        role: SlotRole,
        source: &ShaderSource,
    ) -> Result<ProgramHandle, ProgramError> {
        let text = source
            .text()
            .ok_or_else(|| ProgramError::compile("shader source is not valid UTF-8"))?;
        let fragment_module = compile_fragment_shader(&self.device, role, text)?;
        let pipeline = self.build_pipeline(role, &fragment_module)?;

        self.next_id += 1;
        let handle = ProgramHandle::new(self.next_id);
        self.pipelines.insert(handle, pipeline);
        tracing::debug!(%role, %handle, "created render pipeline");
        Ok(handle)
    }

    fn destroy_program(&mut self, handle: ProgramHandle) {
        if self.pipelines.remove(&handle).is_none() {
            tracing::warn!(%handle, "destroy requested for unknown program");
        }
    }
}
