//! Frame driver
//!
//! Owns the screen-sized frame buffer and feeds it to a compute kernel once
//! per frame:
//!
//! - **Startup**: allocate the frame buffer at display size, derive the
//!   dispatch geometry from the kernel's thread-group size, bind the buffer
//!   to the kernel's `result` slot.
//! - **Tick**: set the kernel's `time` parameter, dispatch once.
//! - **Draw**: present the buffer over the whole display, aspect preserved.
//!
//! A driver only exists once startup has succeeded, so the uninitialized
//! state is simply "no driver yet" on the host side.

use std::fmt;

use crate::display::{Display, DisplayError, FrameBufferDesc, Rect, ScaleMode};
use crate::kernel::{ComputeKernel, KernelError, KernelIndex, ThreadGroupSize};

/// Name of the kernel resource the frame buffer is bound to
pub const OUTPUT_SLOT: &str = "result";

/// Name of the kernel parameter receiving elapsed time
pub const TIME_PARAM: &str = "time";

/// Axis of a thread-group dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Errors raised while starting or running the frame driver
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// Kernel declared a zero thread-group width or height
    #[error("division by zero: kernel thread-group {axis} dimension is 0")]
    ZeroThreadGroupDimension { axis: Axis },

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Display(#[from] DisplayError),
}

/// Number of thread-groups dispatched along x and y.
///
/// Computed once at startup by floor division, so when the frame size is not
/// a multiple of the thread-group size the right and bottom border pixels are
/// never covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchGeometry {
    pub groups_x: u32,
    pub groups_y: u32,
}

impl DispatchGeometry {
    /// Groups needed to cover `width`x`height` with `group`-sized thread-groups.
    pub fn cover(width: u32, height: u32, group: ThreadGroupSize) -> Result<Self, DriverError> {
        let groups_x = width
            .checked_div(group.x)
            .ok_or(DriverError::ZeroThreadGroupDimension { axis: Axis::X })?;
        let groups_y = height
            .checked_div(group.y)
            .ok_or(DriverError::ZeroThreadGroupDimension { axis: Axis::Y })?;
        Ok(Self { groups_x, groups_y })
    }

    /// Group counts as passed to a dispatch (z is always 1)
    pub fn groups(&self) -> [u32; 3] {
        [self.groups_x, self.groups_y, 1]
    }

    /// Columns and rows along the right/bottom edge that no group covers.
    pub fn uncovered(&self, width: u32, height: u32, group: ThreadGroupSize) -> (u32, u32) {
        (
            width - self.groups_x * group.x,
            height - self.groups_y * group.y,
        )
    }
}

/// Drives one compute kernel into one frame buffer, once per frame.
///
/// `I` is the frame buffer type shared by the kernel and display backends.
#[derive(Debug)]
pub struct FrameDriver<I> {
    kernel: KernelIndex,
    frame_buffer: I,
    desc: FrameBufferDesc,
    geometry: DispatchGeometry,
}

impl<I> FrameDriver<I> {
    /// Allocate the frame buffer, compute dispatch geometry and bind the output.
    pub fn start<D, K>(display: &mut D, kernel: &mut K, index: KernelIndex) -> Result<Self, DriverError>
    where
        D: Display<Image = I>,
        K: ComputeKernel<Image = I>,
    {
        let (width, height) = display.size();
        let desc = FrameBufferDesc::screen(width, height);
        let frame_buffer = display.create_image(&desc)?;

        let group = kernel.thread_group_size(index)?;
        let geometry = DispatchGeometry::cover(width, height, group)?;

        let (columns, rows) = geometry.uncovered(width, height, group);
        if columns > 0 || rows > 0 {
            tracing::warn!(
                "Frame {}x{} is not a multiple of thread-group {}: {} column(s) and {} row(s) stay unwritten",
                width,
                height,
                group,
                columns,
                rows
            );
        }

        kernel.bind_image(index, OUTPUT_SLOT, &frame_buffer)?;

        tracing::info!(
            "Frame driver started: {}x{} frame, kernel {} thread-group {}, dispatch {}x{}x1",
            width,
            height,
            index,
            group,
            geometry.groups_x,
            geometry.groups_y
        );

        Ok(Self {
            kernel: index,
            frame_buffer,
            desc,
            geometry,
        })
    }

    /// Push elapsed time into the kernel and dispatch it once.
    pub fn tick<K>(&self, kernel: &mut K, time: f32) -> Result<(), DriverError>
    where
        K: ComputeKernel<Image = I>,
    {
        kernel.set_float(TIME_PARAM, time)?;
        let [x, y, z] = self.geometry.groups();
        kernel.dispatch(self.kernel, x, y, z)?;
        Ok(())
    }

    /// Draw the frame buffer over the whole display, preserving aspect ratio.
    pub fn draw<D>(&self, display: &mut D) -> Result<(), DriverError>
    where
        D: Display<Image = I>,
    {
        let area = Rect::full(display.size());
        display.draw_image(&self.frame_buffer, area, ScaleMode::Fit)?;
        Ok(())
    }

    pub fn kernel(&self) -> KernelIndex {
        self.kernel
    }

    pub fn geometry(&self) -> DispatchGeometry {
        self.geometry
    }

    pub fn frame_buffer(&self) -> &I {
        &self.frame_buffer
    }

    /// Frame buffer size as allocated at startup
    pub fn frame_size(&self) -> (u32, u32) {
        (self.desc.width, self.desc.height)
    }
}
