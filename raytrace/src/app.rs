//! Player application
//!
//! Wires the window, the wgpu display, the WGSL kernel and the frame driver
//! into the generic host event loop.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use raytrace_core::app::HostApp;
use raytrace_core::{ComputeKernel, FrameClock, FrameDriver, KernelIndex};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowAttributes};

use crate::display::{FrameBuffer, WgpuDisplay};
use crate::kernel::WgpuKernel;
use crate::player::PlayerConfig;
use crate::shaders::{RAYTRACING_KERNEL, RAYTRACING_KERNEL_LABEL};

/// WGSL source of the kernel to run, with the label it is compiled under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSource {
    pub label: String,
    pub source: Cow<'static, str>,
}

impl KernelSource {
    /// The bundled ray tracing kernel.
    pub fn bundled() -> Self {
        Self {
            label: RAYTRACING_KERNEL_LABEL.to_string(),
            source: Cow::Borrowed(RAYTRACING_KERNEL),
        }
    }

    /// Read a kernel from a WGSL file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read kernel file {}", path.display()))?;
        let label = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("kernel")
            .to_string();

        Ok(Self {
            label,
            source: Cow::Owned(source),
        })
    }

    /// The configured kernel file, or the bundled kernel when none is set.
    pub fn from_config(config: &PlayerConfig) -> Result<Self> {
        match &config.kernel.path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::bundled()),
        }
    }
}

/// Pick the entry point to run: the named one, or the first.
pub fn select_kernel<K: ComputeKernel>(kernel: &K, entry_point: Option<&str>) -> Result<KernelIndex> {
    match entry_point {
        Some(name) => kernel
            .find_kernel(name)
            .with_context(|| format!("Kernel entry point '{}' not available", name)),
        None => Ok(0),
    }
}

/// Everything that exists once the window is up.
struct Session {
    display: WgpuDisplay,
    kernel: WgpuKernel,
    driver: FrameDriver<FrameBuffer>,
    clock: FrameClock,
}

impl Session {
    fn start(window: Arc<Window>, config: &PlayerConfig) -> Result<Self> {
        let mut display = WgpuDisplay::new(window, config.video.vsync)
            .context("Failed to initialize graphics")?;

        let kernel_source = KernelSource::from_config(config)?;
        tracing::info!("Kernel: {}", kernel_source.label);

        let mut kernel = WgpuKernel::new(
            display.device(),
            display.queue(),
            &kernel_source.label,
            &kernel_source.source,
        )
        .with_context(|| format!("Failed to load kernel {}", kernel_source.label))?;

        let index = select_kernel(&kernel, config.kernel.entry_point.as_deref())?;

        let driver = FrameDriver::start(&mut display, &mut kernel, index)
            .context("Failed to start frame driver")?;

        Ok(Self {
            display,
            kernel,
            driver,
            clock: FrameClock::start(),
        })
    }

    fn frame(&mut self) -> Result<()> {
        let time = self.clock.sample();
        self.driver.tick(&mut self.kernel, time)?;
        self.driver.draw(&mut self.display)?;
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::info!(
            "Shutting down after {} frames ({:.1}s)",
            self.clock.frame_count(),
            self.clock.uptime().as_secs_f32()
        );
    }
}

/// [`HostApp`] running one compute kernel into the window.
pub struct TracerApp {
    config: PlayerConfig,
    window: Option<Arc<Window>>,
    session: Option<Session>,
    should_exit: bool,
}

impl TracerApp {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            window: None,
            session: None,
            should_exit: false,
        }
    }

    fn handle_key_input(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }

        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => {
                self.should_exit = true;
            }
            PhysicalKey::Code(KeyCode::F11) => {
                if let Some(window) = &self.window {
                    if window.fullscreen().is_some() {
                        window.set_fullscreen(None);
                    } else {
                        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
                    }
                }
            }
            _ => {}
        }
    }
}

impl HostApp for TracerApp {
    fn window_attributes(&self) -> WindowAttributes {
        let attributes = Window::default_attributes()
            .with_title("Raytrace")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.video.width,
                self.config.video.height,
            ));

        // Fullscreen up front so the frame buffer gets the fullscreen size
        if self.config.video.fullscreen {
            attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
        } else {
            attributes
        }
    }

    fn on_window_created(&mut self, window: Arc<Window>, _event_loop: &ActiveEventLoop) -> Result<()> {
        let session = Session::start(window.clone(), &self.config)?;
        self.window = Some(window);
        self.session = Some(session);
        Ok(())
    }

    fn render_frame(&mut self) -> Result<()> {
        match &mut self.session {
            Some(session) => session.frame(),
            None => Ok(()),
        }
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key_input(event);
                true
            }
            WindowEvent::Resized(size) => {
                // Swapchain only: the frame buffer keeps its startup size
                if let Some(session) = &mut self.session {
                    session.display.resize(size.width, size.height);
                }
                false
            }
            _ => false,
        }
    }

    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raytrace_core::app::config::KernelConfig;

    #[test]
    fn test_default_config_uses_bundled_kernel() {
        let source = KernelSource::from_config(&PlayerConfig::default()).unwrap();
        assert_eq!(source, KernelSource::bundled());
        assert_eq!(source.label, "raytracing.wgsl");
    }

    #[test]
    fn test_kernel_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waves.wgsl");
        std::fs::write(&path, "// kernel").unwrap();

        let config = PlayerConfig {
            kernel: KernelConfig {
                path: Some(path),
                entry_point: None,
            },
            ..Default::default()
        };

        let source = KernelSource::from_config(&config).unwrap();
        assert_eq!(source.label, "waves.wgsl");
        assert_eq!(source.source, "// kernel");
    }

    #[test]
    fn test_missing_kernel_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.wgsl");

        let err = KernelSource::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("missing.wgsl"));
    }

    #[test]
    fn test_window_attributes_follow_config() {
        let mut config = PlayerConfig::default();
        config.video.width = 640;
        config.video.height = 360;
        config.video.fullscreen = true;

        let attributes = TracerApp::new(config).window_attributes();
        assert_eq!(attributes.title, "Raytrace");
        assert_eq!(
            attributes.inner_size,
            Some(winit::dpi::LogicalSize::new(640, 360).into())
        );
        assert!(attributes.fullscreen.is_some());
    }
}
