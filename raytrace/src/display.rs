//! wgpu display
//!
//! Allocates frame buffers as storage textures and blits them to the window
//! surface, scaled into the requested rectangle.

use std::sync::Arc;

use anyhow::Result;
use raytrace_core::{Display, DisplayError, FilterMode, FrameBufferDesc, PixelFormat, Rect, ScaleMode};
use winit::window::Window;

use crate::gpu::GpuContext;
use crate::shaders::BLIT_SHADER;

/// A frame buffer texture, writable by kernels and sampled by the blit.
pub struct FrameBuffer {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    blit_bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl FrameBuffer {
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// [`Display`] over a window surface.
pub struct WgpuDisplay {
    gpu: GpuContext,
    blit_pipeline: wgpu::RenderPipeline,
    blit_bind_group_layout: wgpu::BindGroupLayout,
}

impl WgpuDisplay {
    pub fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let gpu = GpuContext::new(window, vsync)?;
        let (blit_pipeline, blit_bind_group_layout) =
            create_blit_pipeline(gpu.device(), gpu.surface_format());

        Ok(Self {
            gpu,
            blit_pipeline,
            blit_bind_group_layout,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        self.gpu.device()
    }

    pub fn queue(&self) -> &wgpu::Queue {
        self.gpu.queue()
    }

    /// Reconfigure the swapchain for a new window size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    fn create_sampler(&self, filter: FilterMode) -> wgpu::Sampler {
        let filter = match filter {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        };
        self.gpu.device().create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Frame Buffer Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        })
    }
}

impl Display for WgpuDisplay {
    type Image = FrameBuffer;

    fn size(&self) -> (u32, u32) {
        self.gpu.size()
    }

    fn create_image(&mut self, desc: &FrameBufferDesc) -> Result<FrameBuffer, DisplayError> {
        let max_dimension = self.gpu.device().limits().max_texture_dimension_2d;
        if desc.width == 0
            || desc.height == 0
            || desc.width > max_dimension
            || desc.height > max_dimension
        {
            return Err(DisplayError::UnsupportedSize {
                width: desc.width,
                height: desc.height,
            });
        }

        let format = match desc.format {
            PixelFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        };

        let mut usage = wgpu::TextureUsages::TEXTURE_BINDING;
        if desc.kernel_writable {
            usage |= wgpu::TextureUsages::STORAGE_BINDING;
        }

        let texture = self.gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Frame Buffer"),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = self.create_sampler(desc.filter);
        let blit_bind_group = self.gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blit Bind Group"),
            layout: &self.blit_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        tracing::debug!(
            "Allocated frame buffer {}x{} ({} bytes)",
            desc.width,
            desc.height,
            desc.byte_size()
        );

        Ok(FrameBuffer {
            texture,
            view,
            blit_bind_group,
            width: desc.width,
            height: desc.height,
        })
    }

    fn draw_image(
        &mut self,
        image: &FrameBuffer,
        area: Rect,
        mode: ScaleMode,
    ) -> Result<(), DisplayError> {
        let frame = self
            .gpu
            .acquire_frame()
            .map_err(|e| DisplayError::SurfaceUnavailable(e.to_string()))?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let viewport = mode.viewport(image.size(), area);

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Blit Encoder"),
            });
        {
            let mut blit_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // A degenerate viewport still clears the surface
            if viewport.width > 0.0 && viewport.height > 0.0 {
                blit_pass.set_pipeline(&self.blit_pipeline);
                blit_pass.set_bind_group(0, &image.blit_bind_group, &[]);
                blit_pass.set_viewport(
                    viewport.x,
                    viewport.y,
                    viewport.width,
                    viewport.height,
                    0.0,
                    1.0,
                );
                blit_pass.draw(0..3, 0..1);
            }
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// Blit pipeline and the layout of its per-image bind group.
fn create_blit_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Blit Shader"),
        source: wgpu::ShaderSource::Wgsl(BLIT_SHADER.into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Blit Bind Group Layout"),
        entries: &[
            // Frame buffer texture
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
            // Sampler
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Blit Pipeline Layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Blit Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    });

    (pipeline, bind_group_layout)
}
