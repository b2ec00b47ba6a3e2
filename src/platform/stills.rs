//! Filesystem-backed platform: every camera is a directory of stills
//!
//! A device is a path given at construction. Opening it decodes every
//! image in the directory (sorted by file name), or the single file, and
//! the stream then shows one image per sampled frame in a loop.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use image::RgbaImage;

use super::{
    Capabilities, DeviceKind, MediaDeviceInfo, MediaStream, PhotoCapabilities, Platform,
    VideoConstraints, VideoTrack,
};
use crate::capture::qr::{QR_FORMAT, QrDetector};
use crate::error::{PlatformError, PlatformErrorKind};

/// Extensions recognized when scanning a device directory
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

/// Roughly one display refresh at 60 Hz
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Host made of image directories, decoding QR codes with `rqrr`
pub struct StillsPlatform {
    devices: Vec<PathBuf>,
    frame_interval: Duration,
}

impl StillsPlatform {
    pub fn new(devices: Vec<PathBuf>) -> Self {
        Self {
            devices,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    fn device_label(path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Decode the frames behind a device path
pub fn load_frames(path: &Path) -> Result<Vec<RgbaImage>> {
    let files = if path.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(path)
            .with_context(|| format!("Failed to read device directory: {}", path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| has_image_extension(p))
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    let mut frames = Vec::with_capacity(files.len());
    for file in &files {
        let frame = image::open(file)
            .with_context(|| format!("Failed to decode frame: {}", file.display()))?
            .to_rgba8();
        log::debug!(
            "Loaded frame {} ({}x{})",
            file.display(),
            frame.width(),
            frame.height()
        );
        frames.push(frame);
    }

    anyhow::ensure!(!frames.is_empty(), "No images found in {}", path.display());
    Ok(frames)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[derive(Clone, Debug)]
pub struct StillsTrack {
    live: Rc<Cell<bool>>,
}

impl VideoTrack for StillsTrack {
    fn stop(&self) {
        self.live.set(false);
    }

    fn is_live(&self) -> bool {
        self.live.get()
    }

    async fn photo_capabilities(&self) -> Result<PhotoCapabilities, PlatformError> {
        Ok(PhotoCapabilities::default())
    }

    async fn apply_torch(&self, _on: bool) -> Result<(), PlatformError> {
        Err(PlatformError::not_supported("Stills devices have no torch"))
    }
}

/// Looping playback over decoded stills
#[derive(Clone, Debug)]
pub struct StillsStream {
    id: String,
    frames: Rc<Vec<Rc<RgbaImage>>>,
    cursor: Rc<Cell<usize>>,
    track: StillsTrack,
}

impl StillsStream {
    pub fn new(id: impl Into<String>, frames: Vec<RgbaImage>) -> Self {
        Self {
            id: id.into(),
            frames: Rc::new(frames.into_iter().map(Rc::new).collect()),
            cursor: Rc::new(Cell::new(0)),
            track: StillsTrack {
                live: Rc::new(Cell::new(true)),
            },
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl MediaStream for StillsStream {
    type Track = StillsTrack;

    fn id(&self) -> &str {
        &self.id
    }

    fn video_tracks(&self) -> Vec<StillsTrack> {
        vec![self.track.clone()]
    }

    /// Shows the frame under the cursor and moves on to the next one
    fn current_frame(&self) -> Option<Rc<RgbaImage>> {
        if !self.track.is_live() || self.frames.is_empty() {
            return None;
        }
        let index = self.cursor.get();
        self.cursor.set((index + 1) % self.frames.len());
        self.frames.get(index).cloned()
    }
}

impl Platform for StillsPlatform {
    type Stream = StillsStream;
    type Detector = QrDetector;

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            barcode_detector: true,
            media_devices: true,
            image_capture: false,
        }
    }

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, PlatformError> {
        Ok(self
            .devices
            .iter()
            .filter(|path| path.exists())
            .map(|path| MediaDeviceInfo {
                device_id: path.display().to_string(),
                kind: DeviceKind::VideoInput,
                label: Self::device_label(path),
            })
            .collect())
    }

    async fn get_user_media(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<StillsStream, PlatformError> {
        let path = match &constraints.device_id {
            Some(id) => self
                .devices
                .iter()
                .find(|path| path.display().to_string() == *id)
                .cloned()
                .ok_or_else(|| {
                    PlatformError::new(
                        PlatformErrorKind::Overconstrained,
                        format!("No device matches id {id}"),
                    )
                })?,
            None => self
                .devices
                .iter()
                .find(|path| path.exists())
                .cloned()
                .ok_or_else(|| PlatformError::not_found("Requested device not found"))?,
        };

        log::info!(
            "Opening stills device {} (ideal {}x{} @ {} fps)",
            path.display(),
            constraints.width_ideal,
            constraints.height_ideal,
            constraints.frame_rate_ideal
        );

        let id = path.display().to_string();
        let frames = tokio::task::spawn_blocking(move || load_frames(&path))
            .await
            .map_err(|err| PlatformError::not_readable(err.to_string()))?
            .map_err(|err| PlatformError::not_readable(format!("{err:#}")))?;

        Ok(StillsStream::new(id, frames))
    }

    async fn supported_formats(&self) -> Result<Vec<String>, PlatformError> {
        Ok(vec![QR_FORMAT.to_string()])
    }

    fn barcode_detector(&self, formats: &[String]) -> Result<QrDetector, PlatformError> {
        QrDetector::new(formats)
    }

    async fn next_frame(&self) {
        tokio::time::sleep(self.frame_interval).await;
    }
}
