//! Shared test utilities for unit tests

use crate::display::{Display, DisplayError, FrameBufferDesc, Rect, ScaleMode};
use crate::kernel::{ComputeKernel, KernelError, KernelIndex, ThreadGroupSize};

// ============================================================================
// Test Display Implementation
// ============================================================================

/// Image handle produced by [`MockDisplay`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockImage {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

/// One recorded `draw_image` call
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub image: MockImage,
    pub area: Rect,
    pub mode: ScaleMode,
}

/// Test display that records allocations and draws
pub struct MockDisplay {
    width: u32,
    height: u32,
    fail_allocation: bool,
    pub created: Vec<FrameBufferDesc>,
    pub draws: Vec<DrawCall>,
}

impl MockDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fail_allocation: false,
            created: Vec::new(),
            draws: Vec::new(),
        }
    }

    /// Make every `create_image` call fail
    pub fn failing_allocation(mut self) -> Self {
        self.fail_allocation = true;
        self
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

impl Display for MockDisplay {
    type Image = MockImage;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn create_image(&mut self, desc: &FrameBufferDesc) -> Result<MockImage, DisplayError> {
        if self.fail_allocation {
            return Err(DisplayError::UnsupportedSize {
                width: desc.width,
                height: desc.height,
            });
        }
        let image = MockImage {
            id: self.created.len() as u32,
            width: desc.width,
            height: desc.height,
        };
        self.created.push(*desc);
        Ok(image)
    }

    fn draw_image(
        &mut self,
        image: &MockImage,
        area: Rect,
        mode: ScaleMode,
    ) -> Result<(), DisplayError> {
        self.draws.push(DrawCall {
            image: *image,
            area,
            mode,
        });
        Ok(())
    }
}

// ============================================================================
// Test Kernel Implementation
// ============================================================================

/// One successful mutating call made on [`MockKernel`]
#[derive(Debug, Clone, PartialEq)]
pub enum KernelCall {
    BindImage {
        kernel: KernelIndex,
        name: String,
        image: u32,
    },
    SetFloat {
        name: String,
        value: f32,
    },
    Dispatch {
        kernel: KernelIndex,
        groups: [u32; 3],
    },
}

/// Test kernel with configurable entry points and resources.
///
/// Only calls that succeed are recorded.
pub struct MockKernel {
    entry_points: Vec<(String, ThreadGroupSize)>,
    images: Vec<String>,
    params: Vec<String>,
    pub calls: Vec<KernelCall>,
}

impl MockKernel {
    /// Kernel with a single `main` entry point, a `result` image and a `time` parameter
    pub fn new(group: ThreadGroupSize) -> Self {
        Self {
            entry_points: vec![("main".to_string(), group)],
            images: vec![crate::OUTPUT_SLOT.to_string()],
            params: vec![crate::TIME_PARAM.to_string()],
            calls: Vec::new(),
        }
    }

    pub fn with_kernel(mut self, name: &str, group: ThreadGroupSize) -> Self {
        self.entry_points.push((name.to_string(), group));
        self
    }

    pub fn without_output(mut self) -> Self {
        self.images.clear();
        self
    }

    pub fn without_time(mut self) -> Self {
        self.params.clear();
        self
    }

    /// Values passed to the `time` parameter, in call order
    pub fn times(&self) -> Vec<f32> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                KernelCall::SetFloat { name, value } if name == crate::TIME_PARAM => Some(*value),
                _ => None,
            })
            .collect()
    }

    fn check_kernel(&self, kernel: KernelIndex) -> Result<(), KernelError> {
        if kernel < self.entry_points.len() {
            Ok(())
        } else {
            Err(KernelError::UnknownKernel {
                index: kernel,
                count: self.entry_points.len(),
            })
        }
    }
}

impl ComputeKernel for MockKernel {
    type Image = MockImage;

    fn find_kernel(&self, name: &str) -> Result<KernelIndex, KernelError> {
        self.entry_points
            .iter()
            .position(|(entry, _)| entry == name)
            .ok_or_else(|| KernelError::KernelNotFound(name.to_string()))
    }

    fn thread_group_size(&self, kernel: KernelIndex) -> Result<ThreadGroupSize, KernelError> {
        self.check_kernel(kernel)?;
        Ok(self.entry_points[kernel].1)
    }

    fn bind_image(
        &mut self,
        kernel: KernelIndex,
        name: &str,
        image: &MockImage,
    ) -> Result<(), KernelError> {
        self.check_kernel(kernel)?;
        if !self.images.iter().any(|slot| slot == name) {
            return Err(KernelError::UnknownResource(name.to_string()));
        }
        self.calls.push(KernelCall::BindImage {
            kernel,
            name: name.to_string(),
            image: image.id,
        });
        Ok(())
    }

    fn set_float(&mut self, name: &str, value: f32) -> Result<(), KernelError> {
        if !self.params.iter().any(|param| param == name) {
            return Err(KernelError::UnknownResource(name.to_string()));
        }
        self.calls.push(KernelCall::SetFloat {
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn dispatch(
        &mut self,
        kernel: KernelIndex,
        groups_x: u32,
        groups_y: u32,
        groups_z: u32,
    ) -> Result<(), KernelError> {
        self.check_kernel(kernel)?;
        self.calls.push(KernelCall::Dispatch {
            kernel,
            groups: [groups_x, groups_y, groups_z],
        });
        Ok(())
    }
}
