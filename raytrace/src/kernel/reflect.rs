//! WGSL kernel reflection.
//!
//! Extracts what the frame driver needs from a compute module without
//! touching the GPU: compute entry points with their `@workgroup_size`, and
//! the named group-0 resources (storage images and `f32` uniforms).

use hashbrown::HashMap;
use raytrace_core::{KernelError, KernelIndex, ThreadGroupSize};

/// Bind group every kernel resource must live in
pub const RESOURCE_GROUP: u32 = 0;

/// A compute entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointInfo {
    pub name: String,
    pub workgroup_size: ThreadGroupSize,
}

/// Access a kernel declares on a storage image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAccess {
    WriteOnly,
    ReadWrite,
}

/// Kind of a named kernel resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// `texture_storage_2d<rgba8unorm, ...>`
    StorageImage { access: ImageAccess },
    /// `var<uniform> name: f32`
    FloatParam,
}

impl ResourceKind {
    pub fn describe(self) -> &'static str {
        match self {
            ResourceKind::StorageImage { .. } => "an image",
            ResourceKind::FloatParam => "a float parameter",
        }
    }
}

/// A named resource and its binding slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    pub name: String,
    pub binding: u32,
    pub kind: ResourceKind,
}

/// Reflected interface of a WGSL compute module.
#[derive(Debug, Clone)]
pub struct KernelLayout {
    entry_points: Vec<EntryPointInfo>,
    resources: Vec<ResourceInfo>,
    by_name: HashMap<String, usize>,
}

impl KernelLayout {
    /// Parse, validate and reflect a WGSL compute module.
    pub fn from_wgsl(source: &str) -> Result<Self, KernelError> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| KernelError::InvalidSource(e.emit_to_string(source)))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| KernelError::InvalidSource(format!("{:?}", e.into_inner())))?;

        Self::from_module(&module)
    }

    /// Reflect an already parsed module.
    pub fn from_module(module: &naga::Module) -> Result<Self, KernelError> {
        let entry_points: Vec<EntryPointInfo> = module
            .entry_points
            .iter()
            .filter(|ep| ep.stage == naga::ShaderStage::Compute)
            .map(|ep| EntryPointInfo {
                name: ep.name.clone(),
                workgroup_size: ThreadGroupSize::from(ep.workgroup_size),
            })
            .collect();

        if entry_points.is_empty() {
            return Err(KernelError::NoEntryPoints);
        }

        let mut resources = Vec::new();
        for (_, global) in module.global_variables.iter() {
            let Some(binding) = &global.binding else {
                continue;
            };
            let name = global.name.clone().unwrap_or_default();

            if binding.group != RESOURCE_GROUP {
                return Err(KernelError::Unsupported(format!(
                    "'{}' is in bind group {}, only group {} is supported",
                    name, binding.group, RESOURCE_GROUP
                )));
            }

            let kind = resource_kind(module, global)
                .ok_or_else(|| KernelError::Unsupported(format!("'{name}' has an unsupported type")))?;

            resources.push(ResourceInfo {
                name,
                binding: binding.binding,
                kind,
            });
        }
        resources.sort_by_key(|resource| resource.binding);

        let by_name = resources
            .iter()
            .enumerate()
            .map(|(i, resource)| (resource.name.clone(), i))
            .collect();

        Ok(Self {
            entry_points,
            resources,
            by_name,
        })
    }

    pub fn entry_points(&self) -> &[EntryPointInfo] {
        &self.entry_points
    }

    pub fn resources(&self) -> &[ResourceInfo] {
        &self.resources
    }

    /// Index of the compute entry point with the given name.
    pub fn find_kernel(&self, name: &str) -> Result<KernelIndex, KernelError> {
        self.entry_points
            .iter()
            .position(|ep| ep.name == name)
            .ok_or_else(|| KernelError::KernelNotFound(name.to_string()))
    }

    /// Entry point at `index`.
    pub fn entry_point(&self, index: KernelIndex) -> Result<&EntryPointInfo, KernelError> {
        self.entry_points
            .get(index)
            .ok_or(KernelError::UnknownKernel {
                index,
                count: self.entry_points.len(),
            })
    }

    /// Resource with the given name.
    pub fn resource(&self, name: &str) -> Result<&ResourceInfo, KernelError> {
        self.by_name
            .get(name)
            .map(|&i| &self.resources[i])
            .ok_or_else(|| KernelError::UnknownResource(name.to_string()))
    }
}

fn resource_kind(module: &naga::Module, global: &naga::GlobalVariable) -> Option<ResourceKind> {
    match (global.space, &module.types[global.ty].inner) {
        (
            naga::AddressSpace::Uniform,
            naga::TypeInner::Scalar(naga::Scalar {
                kind: naga::ScalarKind::Float,
                width: 4,
            }),
        ) => Some(ResourceKind::FloatParam),
        (
            naga::AddressSpace::Handle,
            naga::TypeInner::Image {
                dim: naga::ImageDimension::D2,
                arrayed: false,
                class:
                    naga::ImageClass::Storage {
                        format: naga::StorageFormat::Rgba8Unorm,
                        access,
                    },
            },
        ) => {
            let access = if access.contains(naga::StorageAccess::LOAD) {
                ImageAccess::ReadWrite
            } else {
                ImageAccess::WriteOnly
            };
            Some(ResourceKind::StorageImage { access })
        }
        _ => None,
    }
}
