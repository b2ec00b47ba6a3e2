//! Frame sampling into the raster surface

use std::rc::Rc;

use image::RgbaImage;

use crate::platform::MediaStream;
use crate::surface::{RasterHandle, RasterSurface, VideoSurface};

/// Side of the blank raster handed out instead of a real frame
pub const PLACEHOLDER_SIZE: u32 = 10;

/// The single in-flight slot of a detection loop
///
/// Claimed when a real frame is sampled and released once its cycle
/// resolves, so no two captures overlap.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CycleSlot {
    #[default]
    Free,
    InFlight,
}

impl CycleSlot {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, CycleSlot::InFlight)
    }

    pub fn claim(&mut self) {
        *self = CycleSlot::InFlight;
    }

    pub fn release(&mut self) {
        *self = CycleSlot::Free;
    }
}

pub struct FrameSampler<S> {
    video: VideoSurface<S>,
    canvas: RasterSurface,
    placeholder: Rc<RgbaImage>,
}

impl<S: MediaStream> FrameSampler<S> {
    pub fn new(video: VideoSurface<S>, canvas: RasterSurface) -> Self {
        Self {
            video,
            canvas,
            placeholder: Rc::new(RgbaImage::new(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE)),
        }
    }

    pub fn canvas(&self) -> &RasterSurface {
        &self.canvas
    }

    fn placeholder(&self) -> RasterHandle {
        RasterHandle::Placeholder(Rc::clone(&self.placeholder))
    }

    /// Capture the frame on display into the canvas
    ///
    /// Paused, ended or unbound video, or a slot already in flight, yields
    /// the placeholder without touching the canvas.
    pub fn sample(&self, slot: &mut CycleSlot) -> RasterHandle {
        if self.video.is_paused() || self.video.is_ended() || slot.is_in_flight() {
            return self.placeholder();
        }
        let Some(stream) = self.video.src_object() else {
            return self.placeholder();
        };
        let Some(frame) = stream.current_frame() else {
            log::debug!("Stream {} has no frame to sample", stream.id());
            return self.placeholder();
        };

        slot.claim();
        let (width, height) = frame.dimensions();
        self.canvas.resize(width, height);
        self.canvas.paint(&frame, 0, 0);
        RasterHandle::Frame(self.canvas.clone())
    }
}
