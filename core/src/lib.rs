//! Raytrace Core - host framework and frame driver
//!
//! This crate provides the host-agnostic pieces of the raytrace player: the
//! per-frame driver that feeds a compute kernel, the collaborator traits it
//! talks to, and the windowing/config framework that schedules it.
//!
//! # Architecture
//!
//! - [`FrameDriver`] - Owns the frame buffer, dispatches the kernel each tick, draws it
//! - [`ComputeKernel`] - Trait implemented by a GPU compute backend
//! - [`Display`] - Trait implemented by the presenting surface
//! - [`FrameClock`] - Monotonic elapsed-time source sampled once per frame
//! - [`app`] - Event loop and configuration shared by host applications

pub mod app;
pub mod clock;
pub mod display;
pub mod driver;
pub mod kernel;
#[cfg(test)]
pub mod test_utils;

pub use clock::FrameClock;
pub use display::{
    Display, DisplayError, FilterMode, FrameBufferDesc, PixelFormat, Rect, ScaleMode, Viewport,
};
pub use driver::{Axis, DispatchGeometry, DriverError, FrameDriver, OUTPUT_SLOT, TIME_PARAM};
pub use kernel::{ComputeKernel, KernelError, KernelIndex, ThreadGroupSize};
