use engine::ProgramHandle;
use winit::dpi::PhysicalSize;

use super::context::GpuContext;
use super::programs::{WgpuPrograms, SCENE_FORMAT};
use super::uniforms::FrameUniforms;

/// Offscreen target written by the primary program and read by the post one.
struct SceneTarget {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

impl SceneTarget {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        size: PhysicalSize<u32>,
    ) -> (Self, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("scene target"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SCENE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        (
            Self {
                _texture: texture,
                bind_group,
            },
            view,
        )
    }
}

/// Draws one frame: primary program into the scene target, post program
/// from the scene target onto the surface.
pub(crate) struct FrameRenderer {
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    scene: SceneTarget,
    scene_view: wgpu::TextureView,
}

impl FrameRenderer {
    pub(crate) fn new(context: &GpuContext, programs: &WgpuPrograms) -> Self {
        let device = &context.device;
        let layouts = programs.layouts();
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame uniform buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame uniform bind group"),
            layout: &layouts.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("scene sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let (scene, scene_view) =
            SceneTarget::new(device, &layouts.scene_layout, &sampler, context.size);
        Self {
            uniform_buffer,
            uniform_bind_group,
            sampler,
            scene,
            scene_view,
        }
    }

    /// Recreates the scene target to match a resized surface.
    pub(crate) fn resize(&mut self, context: &GpuContext, programs: &WgpuPrograms) {
        let (scene, scene_view) = SceneTarget::new(
            &context.device,
            &programs.layouts().scene_layout,
            &self.sampler,
            context.size,
        );
        self.scene = scene;
        self.scene_view = scene_view;
    }

    pub(crate) fn render(
        &mut self,
        context: &GpuContext,
        programs: &WgpuPrograms,
        primary: ProgramHandle,
        post: ProgramHandle,
        time: f64,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = context.surface.get_current_texture()?;
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uniforms = FrameUniforms::new(context.size.width, context.size.height, time);
        context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        self.draw_pass(
            &mut encoder,
            "primary pass",
            &self.scene_view,
            programs.pipeline(primary),
            None,
        );
        self.draw_pass(
            &mut encoder,
            "post pass",
            &surface_view,
            programs.pipeline(post),
            Some(&self.scene.bind_group),
        );

        context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn draw_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        target: &wgpu::TextureView,
        pipeline: Option<&wgpu::RenderPipeline>,
        scene: Option<&wgpu::BindGroup>,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        // A missing pipeline leaves the cleared target.
        let Some(pipeline) = pipeline else {
            return;
        };
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        if let Some(scene) = scene {
            render_pass.set_bind_group(1, scene, &[]);
        }
        render_pass.draw(0..3, 0..1);
    }
}
