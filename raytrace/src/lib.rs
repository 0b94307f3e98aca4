//! Raytrace - compute kernel frame player
//!
//! Runs a WGSL compute kernel into a window-sized frame buffer every frame
//! and presents it, scaled to fit the window.
//!
//! - [`display`] - wgpu surface, frame buffer allocation and the blit pass
//! - [`kernel`] - WGSL kernels reflected with naga and dispatched with wgpu
//! - [`app`] - the [`HostApp`](raytrace_core::app::HostApp) wiring it together
//! - [`player`] - logging setup and the blocking entry point

pub mod app;
pub mod display;
pub mod gpu;
pub mod kernel;
pub mod player;
pub mod shaders;

pub use app::TracerApp;
pub use display::{FrameBuffer, WgpuDisplay};
pub use kernel::WgpuKernel;
