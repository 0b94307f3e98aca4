//! Compute kernel collaborator
//!
//! A compute kernel is an external GPU program with one or more entry points.
//! The frame driver only needs to query an entry point's thread-group size,
//! bind its output image by name, set a named scalar and dispatch it.

use std::fmt;

/// Index of a compute entry point within a kernel module.
///
/// Entry points are numbered in declaration order, starting at 0.
pub type KernelIndex = usize;

/// Declared per-group thread dimensions of a kernel entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadGroupSize {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl ThreadGroupSize {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

impl From<[u32; 3]> for ThreadGroupSize {
    fn from([x, y, z]: [u32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for ThreadGroupSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

/// Errors raised by a compute kernel backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KernelError {
    /// Kernel index out of range
    #[error("kernel index {index} out of range ({count} compute entry points)")]
    UnknownKernel { index: KernelIndex, count: usize },

    /// No entry point with the given name
    #[error("no compute entry point named '{0}'")]
    KernelNotFound(String),

    /// Module declares no compute entry points at all
    #[error("kernel module has no compute entry points")]
    NoEntryPoints,

    /// No resource with the given name
    #[error("kernel has no resource named '{0}'")]
    UnknownResource(String),

    /// Resource exists but is of a different kind
    #[error("kernel resource '{name}' is not {expected}")]
    ResourceKindMismatch { name: String, expected: &'static str },

    /// A resource was never bound before dispatch
    #[error("kernel resource '{0}' has not been bound")]
    UnboundResource(String),

    /// Kernel source failed to parse or validate
    #[error("kernel source is invalid: {0}")]
    InvalidSource(String),

    /// Kernel uses a binding, type or format the backend cannot drive
    #[error("unsupported kernel resource: {0}")]
    Unsupported(String),
}

/// A GPU compute program exposing named resources and dispatchable entry points.
///
/// `Image` is the backend's frame buffer type; it is shared with the
/// [`Display`](crate::Display) that allocates and presents it.
pub trait ComputeKernel {
    /// Image type accepted by [`bind_image`](Self::bind_image)
    type Image;

    /// Look up a compute entry point by name.
    fn find_kernel(&self, name: &str) -> Result<KernelIndex, KernelError>;

    /// Declared thread-group size of the given entry point.
    fn thread_group_size(&self, kernel: KernelIndex) -> Result<ThreadGroupSize, KernelError>;

    /// Bind an image to the named output resource.
    fn bind_image(
        &mut self,
        kernel: KernelIndex,
        name: &str,
        image: &Self::Image,
    ) -> Result<(), KernelError>;

    /// Set a named floating-point parameter.
    fn set_float(&mut self, name: &str, value: f32) -> Result<(), KernelError>;

    /// Queue the entry point over a grid of thread-groups.
    ///
    /// Fire-and-forget: returns once the work is queued, not when it completes.
    fn dispatch(
        &mut self,
        kernel: KernelIndex,
        groups_x: u32,
        groups_y: u32,
        groups_z: u32,
    ) -> Result<(), KernelError>;
}
