//! Scriptable in-memory platform for unit tests

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use image::{Rgba, RgbaImage};

use super::{
    BarcodeDetector, Capabilities, DeviceKind, MediaDeviceInfo, MediaStream, PhotoCapabilities,
    Platform, VideoConstraints, VideoTrack,
};
use crate::domain::{DetectedBarcode, Point, Rect};
use crate::error::{PlatformError, PlatformErrorKind};
use crate::surface::RasterHandle;

type DetectResult = Result<Vec<DetectedBarcode>, PlatformError>;

/// Everything the mock observed, shared with the test after the platform
/// moved into a session
#[derive(Debug, Default)]
pub(crate) struct MockLog {
    pub enumerations: Cell<usize>,
    pub requests: RefCell<Vec<VideoConstraints>>,
    pub streams: RefCell<Vec<MockStream>>,
    pub detector_formats: RefCell<Option<Vec<String>>>,
    /// Raster size of every detect call
    pub detect_calls: RefCell<Vec<(u32, u32)>>,
    pub torch: Rc<RefCell<Vec<bool>>>,
}

#[derive(Clone, Debug)]
pub(crate) struct MockTrack {
    live: Rc<Cell<bool>>,
    photo: Result<PhotoCapabilities, PlatformError>,
    torch: Rc<RefCell<Vec<bool>>>,
}

impl VideoTrack for MockTrack {
    fn stop(&self) {
        self.live.set(false);
    }

    fn is_live(&self) -> bool {
        self.live.get()
    }

    async fn photo_capabilities(&self) -> Result<PhotoCapabilities, PlatformError> {
        self.photo.clone()
    }

    async fn apply_torch(&self, on: bool) -> Result<(), PlatformError> {
        self.torch.borrow_mut().push(on);
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct MockStream {
    id: String,
    frame: Rc<RgbaImage>,
    track: MockTrack,
}

impl MockStream {
    pub fn new(id: &str, width: u32, height: u32) -> Self {
        Self {
            id: id.to_string(),
            frame: Rc::new(RgbaImage::from_pixel(width, height, Rgba([200, 200, 200, 255]))),
            track: MockTrack {
                live: Rc::new(Cell::new(true)),
                photo: Ok(PhotoCapabilities::default()),
                torch: Rc::default(),
            },
        }
    }

    pub fn is_live(&self) -> bool {
        self.track.is_live()
    }
}

impl MediaStream for MockStream {
    type Track = MockTrack;

    fn id(&self) -> &str {
        &self.id
    }

    fn video_tracks(&self) -> Vec<MockTrack> {
        vec![self.track.clone()]
    }

    fn current_frame(&self) -> Option<Rc<RgbaImage>> {
        self.track.is_live().then(|| Rc::clone(&self.frame))
    }
}

pub(crate) struct MockDetector {
    queue: Rc<RefCell<VecDeque<DetectResult>>>,
    log: Rc<MockLog>,
}

impl BarcodeDetector for MockDetector {
    async fn detect(&self, raster: &RasterHandle) -> DetectResult {
        self.log.detect_calls.borrow_mut().push(raster.dimensions());
        tokio::task::yield_now().await;
        self.queue.borrow_mut().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub(crate) struct MockPlatform {
    pub capabilities: Capabilities,
    pub devices: Vec<MediaDeviceInfo>,
    pub enumerate_error: Option<PlatformError>,
    pub reject_exact: bool,
    pub reject_fallback: bool,
    pub photo: Result<PhotoCapabilities, PlatformError>,
    pub supported_formats: Vec<String>,
    pub frame_size: (u32, u32),
    pub detections: Rc<RefCell<VecDeque<DetectResult>>>,
    pub log: Rc<MockLog>,
}

impl MockPlatform {
    /// A fully capable host with one video input per label
    pub fn with_cameras(labels: &[&str]) -> Self {
        let devices = labels
            .iter()
            .enumerate()
            .map(|(i, label)| MediaDeviceInfo {
                device_id: format!("cam-{i}"),
                kind: DeviceKind::VideoInput,
                label: label.to_string(),
            })
            .collect();
        Self {
            capabilities: Capabilities {
                barcode_detector: true,
                media_devices: true,
                image_capture: true,
            },
            devices,
            enumerate_error: None,
            reject_exact: false,
            reject_fallback: false,
            photo: Ok(PhotoCapabilities::default()),
            supported_formats: vec!["qr_code".into(), "ean_13".into(), "code_128".into()],
            frame_size: (320, 240),
            detections: Rc::default(),
            log: Rc::default(),
        }
    }

    pub fn queue_detection(&self, result: DetectResult) {
        self.detections.borrow_mut().push_back(result);
    }
}

impl Platform for MockPlatform {
    type Stream = MockStream;
    type Detector = MockDetector;

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, PlatformError> {
        self.log.enumerations.set(self.log.enumerations.get() + 1);
        match &self.enumerate_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.devices.clone()),
        }
    }

    async fn get_user_media(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<MockStream, PlatformError> {
        self.log.requests.borrow_mut().push(constraints.clone());
        let id = match &constraints.device_id {
            Some(_) if self.reject_exact => {
                return Err(PlatformError::new(
                    PlatformErrorKind::NotReadable,
                    "Could not start video source",
                ));
            }
            None if self.reject_fallback => {
                return Err(PlatformError::new(
                    PlatformErrorKind::NotAllowed,
                    "Permission denied",
                ));
            }
            Some(id) => id.clone(),
            None => "default".to_string(),
        };

        let (width, height) = self.frame_size;
        let mut stream = MockStream::new(&id, width, height);
        stream.track.photo = self.photo.clone();
        stream.track.torch = Rc::clone(&self.log.torch);
        self.log.streams.borrow_mut().push(stream.clone());
        Ok(stream)
    }

    async fn supported_formats(&self) -> Result<Vec<String>, PlatformError> {
        Ok(self.supported_formats.clone())
    }

    fn barcode_detector(&self, formats: &[String]) -> Result<MockDetector, PlatformError> {
        *self.log.detector_formats.borrow_mut() = Some(formats.to_vec());
        Ok(MockDetector {
            queue: Rc::clone(&self.detections),
            log: Rc::clone(&self.log),
        })
    }

    async fn next_frame(&self) {
        tokio::task::yield_now().await;
    }
}

/// A detector result shaped like a QR match
pub(crate) fn barcode(format: &str, raw_value: Option<&str>, raw_data: Option<&str>) -> DetectedBarcode {
    let corners = vec![
        Point::new(10.0, 10.0),
        Point::new(60.0, 10.0),
        Point::new(60.0, 60.0),
        Point::new(10.0, 60.0),
    ];
    DetectedBarcode {
        bounding_box: Rect::enclosing(&corners).unwrap_or_default(),
        corner_points: corners,
        format: format.to_string(),
        raw_value: raw_value.map(str::to_string),
        raw_data: raw_data.map(str::to_string),
    }
}
