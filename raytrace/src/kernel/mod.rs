//! WGSL compute kernel backend.
//!
//! Wraps a WGSL compute module as a [`ComputeKernel`]: one pipeline per
//! compute entry point, one bind group (group 0) covering every named
//! resource the module declares.

mod reflect;


pub use reflect::{
    EntryPointInfo, ImageAccess, KernelLayout, RESOURCE_GROUP, ResourceInfo, ResourceKind,
};

use hashbrown::HashMap;
use raytrace_core::{ComputeKernel, KernelError, KernelIndex, ThreadGroupSize};

use crate::display::FrameBuffer;

/// Size of the uniform buffer backing each float parameter (one f32, padded)
const PARAM_BUFFER_SIZE: u64 = 16;

/// A WGSL compute module ready to dispatch.
pub struct WgpuKernel {
    device: wgpu::Device,
    queue: wgpu::Queue,
    layout: KernelLayout,
    bind_group_layout: wgpu::BindGroupLayout,
    pipelines: Vec<wgpu::ComputePipeline>,
    /// Uniform buffers for float parameters, by binding
    params: HashMap<u32, wgpu::Buffer>,
    /// Bound storage image views, by binding
    images: HashMap<u32, wgpu::TextureView>,
    /// Rebuilt after any image binding change
    cached_bind_group: Option<wgpu::BindGroup>,
}

impl WgpuKernel {
    /// Reflect and compile a WGSL compute module.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        source: &str,
    ) -> Result<Self, KernelError> {
        let layout = KernelLayout::from_wgsl(source)?;

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let entries: Vec<wgpu::BindGroupLayoutEntry> = layout
            .resources()
            .iter()
            .map(|resource| wgpu::BindGroupLayoutEntry {
                binding: resource.binding,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: binding_type(resource.kind),
                count: None,
            })
            .collect();

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Kernel Bind Group Layout"),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Kernel Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipelines = layout
            .entry_points()
            .iter()
            .map(|ep| {
                device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some(ep.name.as_str()),
                    layout: Some(&pipeline_layout),
                    module: &shader_module,
                    entry_point: Some(ep.name.as_str()),
                    compilation_options: Default::default(),
                    cache: None,
                })
            })
            .collect();

        let params = layout
            .resources()
            .iter()
            .filter(|resource| resource.kind == ResourceKind::FloatParam)
            .map(|resource| {
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(resource.name.as_str()),
                    size: PARAM_BUFFER_SIZE,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                (resource.binding, buffer)
            })
            .collect();

        for ep in layout.entry_points() {
            tracing::debug!("Kernel '{}': entry point {} ({})", label, ep.name, ep.workgroup_size);
        }
        for resource in layout.resources() {
            tracing::debug!(
                "Kernel '{}': @binding({}) {} is {}",
                label,
                resource.binding,
                resource.name,
                resource.kind.describe()
            );
        }

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            layout,
            bind_group_layout,
            pipelines,
            params,
            images: HashMap::new(),
            cached_bind_group: None,
        })
    }

    pub fn layout(&self) -> &KernelLayout {
        &self.layout
    }

    /// Look up a resource and check its kind.
    fn expect_resource(
        &self,
        name: &str,
        matches: fn(ResourceKind) -> bool,
        expected: &'static str,
    ) -> Result<u32, KernelError> {
        let resource = self.layout.resource(name)?;
        if matches(resource.kind) {
            Ok(resource.binding)
        } else {
            Err(KernelError::ResourceKindMismatch {
                name: name.to_string(),
                expected,
            })
        }
    }

    /// Bind group over all resources, built on first use after a binding change.
    fn bind_group(&mut self) -> Result<wgpu::BindGroup, KernelError> {
        if let Some(bind_group) = &self.cached_bind_group {
            return Ok(bind_group.clone());
        }

        let mut entries = Vec::with_capacity(self.layout.resources().len());
        for resource in self.layout.resources() {
            let binding_resource = match resource.kind {
                ResourceKind::StorageImage { .. } => self
                    .images
                    .get(&resource.binding)
                    .map(wgpu::BindingResource::TextureView),
                ResourceKind::FloatParam => self
                    .params
                    .get(&resource.binding)
                    .map(|buffer| buffer.as_entire_binding()),
            }
            .ok_or_else(|| KernelError::UnboundResource(resource.name.clone()))?;

            entries.push(wgpu::BindGroupEntry {
                binding: resource.binding,
                resource: binding_resource,
            });
        }

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Kernel Bind Group"),
            layout: &self.bind_group_layout,
            entries: &entries,
        });
        self.cached_bind_group = Some(bind_group.clone());
        Ok(bind_group)
    }
}

impl ComputeKernel for WgpuKernel {
    type Image = FrameBuffer;

    fn find_kernel(&self, name: &str) -> Result<KernelIndex, KernelError> {
        self.layout.find_kernel(name)
    }

    fn thread_group_size(&self, kernel: KernelIndex) -> Result<ThreadGroupSize, KernelError> {
        Ok(self.layout.entry_point(kernel)?.workgroup_size)
    }

    fn bind_image(
        &mut self,
        kernel: KernelIndex,
        name: &str,
        image: &FrameBuffer,
    ) -> Result<(), KernelError> {
        self.layout.entry_point(kernel)?;
        let binding = self.expect_resource(
            name,
            |kind| matches!(kind, ResourceKind::StorageImage { .. }),
            "an image",
        )?;

        self.images.insert(binding, image.view().clone());
        self.cached_bind_group = None;
        Ok(())
    }

    fn set_float(&mut self, name: &str, value: f32) -> Result<(), KernelError> {
        let binding = self.expect_resource(
            name,
            |kind| kind == ResourceKind::FloatParam,
            "a float parameter",
        )?;

        let buffer = self
            .params
            .get(&binding)
            .ok_or_else(|| KernelError::UnboundResource(name.to_string()))?;
        self.queue.write_buffer(buffer, 0, bytemuck::bytes_of(&value));
        Ok(())
    }

    fn dispatch(
        &mut self,
        kernel: KernelIndex,
        groups_x: u32,
        groups_y: u32,
        groups_z: u32,
    ) -> Result<(), KernelError> {
        self.layout.entry_point(kernel)?;
        let bind_group = self.bind_group()?;
        let pipeline = &self.pipelines[kernel];

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Kernel Dispatch Encoder"),
            });
        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Kernel Dispatch Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(pipeline);
            compute_pass.set_bind_group(0, &bind_group, &[]);
            compute_pass.dispatch_workgroups(groups_x, groups_y, groups_z);
        }

        // Queued, not awaited: later submissions (the blit) are ordered after it
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

/// wgpu binding type for a reflected resource
fn binding_type(kind: ResourceKind) -> wgpu::BindingType {
    match kind {
        ResourceKind::StorageImage { access } => wgpu::BindingType::StorageTexture {
            access: match access {
                ImageAccess::WriteOnly => wgpu::StorageTextureAccess::WriteOnly,
                ImageAccess::ReadWrite => wgpu::StorageTextureAccess::ReadWrite,
            },
            format: wgpu::TextureFormat::Rgba8Unorm,
            view_dimension: wgpu::TextureViewDimension::D2,
        },
        ResourceKind::FloatParam => wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
    }
}
