//! Generic application event loop for host applications
//!
//! This module provides the per-frame callback scheduling every host
//! application shares: window creation, one `render_frame` per redraw,
//! and shutdown on close or on the first error.

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

/// Trait for host-specific application behavior.
///
/// Implement this trait to define how your application sets up GPU
/// resources and renders frames. The generic event loop calls these methods
/// at appropriate times.
///
/// # Example
///
/// ```rust,ignore
/// use raytrace_core::app::event_loop::HostApp;
///
/// struct TracerApp {
///     session: Option<Session>,
///     // ... other fields
/// }
///
/// impl HostApp for TracerApp {
///     fn on_window_created(&mut self, window: Arc<Window>, _: &ActiveEventLoop) -> Result<()> {
///         // Create display, load kernel, start the frame driver
///         Ok(())
///     }
///
///     fn render_frame(&mut self) -> Result<()> {
///         // Tick the kernel and draw the frame buffer
///         Ok(())
///     }
///
///     // ... implement other methods
/// }
/// ```
pub trait HostApp {
    /// Attributes of the window created when the event loop resumes.
    fn window_attributes(&self) -> WindowAttributes {
        Window::default_attributes()
            .with_title("Raytrace")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
    }

    /// Called once the window exists.
    ///
    /// Initialize graphics and any window-dependent resources here. An error
    /// stops the event loop.
    fn on_window_created(
        &mut self,
        window: Arc<Window>,
        event_loop: &ActiveEventLoop,
    ) -> anyhow::Result<()>;

    /// Run one frame.
    ///
    /// Called once per redraw, sequentially on the event loop thread. An
    /// error stops the event loop.
    fn render_frame(&mut self) -> anyhow::Result<()>;

    /// Handle a window event.
    ///
    /// Return `true` if the event was consumed (prevents default handling).
    fn on_window_event(&mut self, event: &WindowEvent) -> bool;

    /// Check if application should exit.
    fn should_exit(&self) -> bool;

    /// Request a redraw from the event loop.
    fn request_redraw(&self);
}

/// Generic event loop handler for any [`HostApp`].
///
/// Wraps the app and implements winit's `ApplicationHandler`. The first
/// startup or frame error is kept and returned from [`run`].
pub struct AppEventHandler<A: HostApp> {
    app: A,
    window_created: bool,
    error: Option<anyhow::Error>,
}

impl<A: HostApp> AppEventHandler<A> {
    /// Create a new event handler with the given app.
    pub fn new(app: A) -> Self {
        Self {
            app,
            window_created: false,
            error: None,
        }
    }

    /// Consume the handler, returning the app and the error that stopped it, if any.
    pub fn into_parts(self) -> (A, Option<anyhow::Error>) {
        (self.app, self.error)
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{:#}", error);
        if self.error.is_none() {
            self.error = Some(error);
        }
        event_loop.exit();
    }
}

impl<A: HostApp> ApplicationHandler for AppEventHandler<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Startup runs once; later resumes reuse the existing window
        if self.window_created {
            return;
        }

        match event_loop.create_window(self.app.window_attributes()) {
            Ok(window) => {
                self.window_created = true;
                let window = Arc::new(window);
                if let Err(e) = self.app.on_window_created(window, event_loop) {
                    self.fail(event_loop, e.context("Failed to initialize window"));
                }
            }
            Err(e) => {
                self.fail(
                    event_loop,
                    anyhow::Error::new(e).context("Failed to create window"),
                );
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        // Let app handle the event first
        if self.app.on_window_event(&event) {
            if self.app.should_exit() {
                event_loop.exit();
            }
            return; // Event was consumed
        }

        // Handle common events
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Window close requested");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.app.render_frame() {
                    self.fail(event_loop, e.context("Frame failed"));
                    return;
                }
            }
            _ => {}
        }

        // Check if app wants to exit
        if self.app.should_exit() {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Redraw continuously; presentation paces frames to the display refresh
        event_loop.set_control_flow(ControlFlow::Wait);
        self.app.request_redraw();
    }
}

/// Run the event loop with a host application.
///
/// Blocks until the window closes, the app asks to exit, or a startup/frame
/// error occurs; the error is returned.
///
/// # Example
///
/// ```rust,ignore
/// use raytrace_core::app::event_loop;
///
/// let app = TracerApp::new(config);
/// event_loop::run(app)?;
/// ```
pub fn run<A: HostApp>(app: A) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;

    let mut handler = AppEventHandler::new(app);
    event_loop.run_app(&mut handler)?;

    match handler.into_parts() {
        (_, Some(error)) => Err(error),
        (_, None) => Ok(()),
    }
}
