//! Off-screen raster the sampler paints video frames into

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use image::RgbaImage;

/// Default dimensions of a freshly created raster surface
pub const DEFAULT_RASTER_WIDTH: u32 = 300;
pub const DEFAULT_RASTER_HEIGHT: u32 = 150;

/// Shared handle to an RGBA pixel buffer
///
/// Clones refer to the same buffer, so a caller can keep a handle and
/// inspect the last sampled frame.
#[derive(Clone, Debug)]
pub struct RasterSurface {
    pixels: Rc<RefCell<RgbaImage>>,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::with_size(DEFAULT_RASTER_WIDTH, DEFAULT_RASTER_HEIGHT)
    }
}

impl RasterSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: Rc::new(RefCell::new(RgbaImage::new(width, height))),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.borrow().width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.borrow().height()
    }

    /// Reallocate to the given size; contents are cleared
    pub fn resize(&self, width: u32, height: u32) {
        *self.pixels.borrow_mut() = RgbaImage::new(width, height);
    }

    /// Copy `frame` into the buffer with its top-left corner at (x, y)
    pub fn paint(&self, frame: &RgbaImage, x: i64, y: i64) {
        image::imageops::replace(&mut *self.pixels.borrow_mut(), frame, x, y);
    }

    /// Borrow the current pixels
    pub fn pixels(&self) -> Ref<'_, RgbaImage> {
        self.pixels.borrow()
    }
}

/// What a sampling step hands to the detector
#[derive(Clone, Debug)]
pub enum RasterHandle {
    /// The fixed blank raster used when no real frame could be taken
    Placeholder(Rc<RgbaImage>),
    /// The raster surface holding a freshly painted frame
    Frame(RasterSurface),
}

impl RasterHandle {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, RasterHandle::Placeholder(_))
    }

    /// Run `f` against the pixels behind this handle
    pub fn with_image<R>(&self, f: impl FnOnce(&RgbaImage) -> R) -> R {
        match self {
            RasterHandle::Placeholder(image) => f(image),
            RasterHandle::Frame(surface) => f(&surface.pixels()),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.with_image(|image| image.dimensions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_default_size() {
        let surface = RasterSurface::new();
        assert_eq!((surface.width(), surface.height()), (300, 150));
    }

    #[test]
    fn test_resize_and_paint_shared_between_clones() {
        let surface = RasterSurface::new();
        let other = surface.clone();

        let frame = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255]));
        surface.resize(4, 3);
        surface.paint(&frame, 0, 0);

        assert_eq!(other.pixels().dimensions(), (4, 3));
        assert_eq!(*other.pixels().get_pixel(3, 2), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_handle_dimensions() {
        let placeholder = RasterHandle::Placeholder(Rc::new(RgbaImage::new(10, 10)));
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.dimensions(), (10, 10));

        let frame = RasterHandle::Frame(RasterSurface::with_size(640, 480));
        assert!(!frame.is_placeholder());
        assert_eq!(frame.dimensions(), (640, 480));
    }
}
