//! Host capabilities a scan session is built on
//!
//! A [`Platform`] bundles device enumeration, stream acquisition, the
//! barcode detector, next-frame scheduling and the wall clock. The
//! session only talks to the host through these traits.
//!
//! All futures are polled on a single thread; none are required to be
//! `Send`.

#![allow(async_fn_in_trait)]

use std::rc::Rc;

use chrono::{DateTime, Local};
use image::RgbaImage;

use crate::domain::DetectedBarcode;
use crate::error::PlatformError;
use crate::surface::RasterHandle;

#[cfg(test)]
pub(crate) mod mock;
pub mod stills;

pub use stills::{StillsPlatform, StillsStream};

/// What the host exposes, reported rather than thrown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// A barcode detector can be constructed
    pub barcode_detector: bool,
    /// Devices can be enumerated and streams requested
    pub media_devices: bool,
    /// Photo capabilities and torch constraints can be inspected
    pub image_capture: bool,
}

/// Kind of an enumerated media device
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

/// One enumerated device
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaDeviceInfo {
    pub device_id: String,
    pub kind: DeviceKind,
    /// Human-readable name; may be empty before access is granted
    pub label: String,
}

/// Constraints for a video stream request
#[derive(Clone, Debug, PartialEq)]
pub struct VideoConstraints {
    /// Exact device to open; `None` lets the host choose
    pub device_id: Option<String>,
    pub frame_rate_ideal: f64,
    pub frame_rate_max: f64,
    pub width_ideal: u32,
    pub height_ideal: u32,
    pub audio: bool,
}

/// Photo settings a track can report
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhotoCapabilities {
    pub torch: bool,
    pub fill_light_mode: Vec<String>,
}

impl PhotoCapabilities {
    /// A torch is usable when reported directly or through a fill-light
    /// mode other than a lone "none"
    pub fn torch_supported(&self) -> bool {
        self.torch
            || match self.fill_light_mode.as_slice() {
                [] => false,
                [only] => only != "none",
                _ => true,
            }
    }
}

/// A video track of an acquired stream
pub trait VideoTrack: Clone + 'static {
    /// Stop the track and release the device
    fn stop(&self);

    fn is_live(&self) -> bool;

    async fn photo_capabilities(&self) -> Result<PhotoCapabilities, PlatformError>;

    /// Apply the torch constraint
    async fn apply_torch(&self, on: bool) -> Result<(), PlatformError>;
}

/// A live camera stream; clones refer to the same stream
pub trait MediaStream: Clone + 'static {
    type Track: VideoTrack;

    fn id(&self) -> &str;

    fn video_tracks(&self) -> Vec<Self::Track>;

    /// The frame currently on display, `None` once the stream stopped
    fn current_frame(&self) -> Option<Rc<RgbaImage>>;

    fn stop_tracks(&self) {
        for track in self.video_tracks() {
            track.stop();
        }
    }
}

/// Scans a raster for encoded symbols
pub trait BarcodeDetector {
    async fn detect(&self, raster: &RasterHandle) -> Result<Vec<DetectedBarcode>, PlatformError>;
}

/// The host environment
pub trait Platform: 'static {
    type Stream: MediaStream;
    type Detector: BarcodeDetector + 'static;

    fn capabilities(&self) -> Capabilities;

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, PlatformError>;

    async fn get_user_media(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Self::Stream, PlatformError>;

    async fn supported_formats(&self) -> Result<Vec<String>, PlatformError>;

    fn barcode_detector(&self, formats: &[String]) -> Result<Self::Detector, PlatformError>;

    /// Resolves at the next display refresh opportunity
    async fn next_frame(&self);

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
