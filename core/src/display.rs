//! Display collaborator
//!
//! The display supplies the drawable size, allocates the frame buffer and
//! presents it. Scaling of the frame buffer into the drawable area is
//! described by [`ScaleMode`] and resolved to a [`Viewport`].

/// Pixel format of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 4 channels, 8 bits each, unsigned normalized
    Rgba8Unorm,
}

impl PixelFormat {
    /// Size of one pixel in bytes
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Rgba8Unorm => 4,
        }
    }
}

/// Sampling filter used when the frame buffer is scaled for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Description of an image to allocate on the display's device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameBufferDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub filter: FilterMode,
    /// Whether compute kernels may write to the image
    pub kernel_writable: bool,
}

impl FrameBufferDesc {
    /// Screen-sized, kernel-writable RGBA8 image with nearest sampling.
    pub const fn screen(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgba8Unorm,
            filter: FilterMode::Nearest,
            kernel_writable: true,
        }
    }

    /// Total size in bytes
    pub fn byte_size(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.format.bytes_per_pixel() as u64
    }
}

/// Axis-aligned rectangle in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole drawable area of a display of the given size.
    pub fn full((width, height): (u32, u32)) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }
}

/// Scaling mode for drawing an image into a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    /// Stretch to fill the rectangle (may distort aspect ratio)
    Stretch,
    /// Maintain aspect ratio, scale to fill as much as possible (adds letterbox bars)
    #[default]
    Fit,
    /// Integer scaling for pixel-perfect rendering (adds black bars, may not fill the rectangle)
    PixelPerfect,
}

/// Region of the target an image is drawn into.
pub type Viewport = Rect;

impl ScaleMode {
    /// Compute where an image of `image_size` lands inside `area`.
    pub fn viewport(self, (image_width, image_height): (u32, u32), area: Rect) -> Viewport {
        let render_width = image_width as f32;
        let render_height = image_height as f32;

        let scale = match self {
            ScaleMode::Stretch => return area,
            ScaleMode::Fit => {
                let scale_x = area.width / render_width;
                let scale_y = area.height / render_height;
                scale_x.min(scale_y)
            }
            ScaleMode::PixelPerfect => {
                // Largest integer scale that fits both dimensions, at least 1x
                let scale_x = (area.width / render_width).floor();
                let scale_y = (area.height / render_height).floor();
                scale_x.min(scale_y).max(1.0)
            }
        };

        let scaled_width = render_width * scale;
        let scaled_height = render_height * scale;

        // Center inside the area (letterbox/pillarbox)
        Rect::new(
            area.x + (area.width - scaled_width) / 2.0,
            area.y + (area.height - scaled_height) / 2.0,
            scaled_width,
            scaled_height,
        )
    }
}

/// Errors raised by a display backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    #[error("display surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("frame buffer format {0:?} is not supported by this display")]
    UnsupportedFormat(PixelFormat),

    #[error("frame buffer size {width}x{height} is not supported by this display")]
    UnsupportedSize { width: u32, height: u32 },
}

/// The presenting surface of the host.
pub trait Display {
    /// Image type produced by [`create_image`](Self::create_image)
    type Image;

    /// Current drawable size in pixels.
    fn size(&self) -> (u32, u32);

    /// Allocate an image on the display's device.
    fn create_image(&mut self, desc: &FrameBufferDesc) -> Result<Self::Image, DisplayError>;

    /// Draw an image into `area`, scaled according to `mode`, and present it.
    fn draw_image(
        &mut self,
        image: &Self::Image,
        area: Rect,
        mode: ScaleMode,
    ) -> Result<(), DisplayError>;
}
