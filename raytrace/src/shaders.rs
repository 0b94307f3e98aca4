//! Bundled WGSL sources.

/// Fullscreen-triangle blit used by the display.
pub const BLIT_SHADER: &str = include_str!("../shaders/blit.wgsl");

/// Demo ray tracing kernel, used when no kernel file is given.
pub const RAYTRACING_KERNEL: &str = include_str!("../shaders/raytracing.wgsl");

/// Label the bundled kernel is compiled under
pub const RAYTRACING_KERNEL_LABEL: &str = "raytracing.wgsl";
