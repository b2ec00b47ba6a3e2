//! Camera acquisition with a single relaxed retry
//!
//! The acquirer owns the active stream. It fills the selection list,
//! opens the selected device (falling back to any device once), binds the
//! stream to the video surface and wires the torch toggle.

use std::rc::Rc;

use crate::config::ScanSettings;
use crate::error::{PlatformError, StartupError};
use crate::platform::{
    DeviceKind, MediaDeviceInfo, MediaStream, Platform, VideoConstraints, VideoTrack,
};
use crate::surface::{CameraSelect, FlashButton, SelectOption, VideoSurface};

type Track<P> = <<P as Platform>::Stream as MediaStream>::Track;

/// Frame-rate and resolution hints sent with every stream request
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamHints {
    pub frame_rate_ideal: f64,
    pub frame_rate_max: f64,
    pub width_ideal: u32,
    pub height_ideal: u32,
}

impl From<&ScanSettings> for StreamHints {
    fn from(settings: &ScanSettings) -> Self {
        Self {
            frame_rate_ideal: settings.video_frame_rate,
            frame_rate_max: settings.frame_rate_max(),
            width_ideal: settings.video_width,
            height_ideal: settings.video_height,
        }
    }
}

impl StreamHints {
    /// Constraints pinned to one device
    pub fn exact(&self, device_id: &str) -> VideoConstraints {
        VideoConstraints {
            device_id: Some(device_id.to_string()),
            ..self.emergency()
        }
    }

    /// Constraints letting the host pick any camera
    pub fn emergency(&self) -> VideoConstraints {
        VideoConstraints {
            device_id: None,
            frame_rate_ideal: self.frame_rate_ideal,
            frame_rate_max: self.frame_rate_max,
            width_ideal: self.width_ideal,
            height_ideal: self.height_ideal,
            audio: false,
        }
    }
}

/// Label shown for a device that reports no name
fn fallback_label(position: usize) -> String {
    format!("Camera {position}")
}

pub struct CameraAcquirer<P: Platform> {
    platform: Rc<P>,
    hints: StreamHints,
    select: CameraSelect,
    video: VideoSurface<P::Stream>,
    flash: Option<FlashButton>,
    /// Label of the flash button before any toggle relabelled it
    flash_label: String,
    active_stream: Option<P::Stream>,
    /// Track the torch is applied to, set only when torch is supported
    torch_track: Option<Track<P>>,
    flash_on: bool,
}

impl<P: Platform> CameraAcquirer<P> {
    pub fn new(
        platform: Rc<P>,
        hints: StreamHints,
        select: CameraSelect,
        video: VideoSurface<P::Stream>,
        flash: Option<FlashButton>,
    ) -> Self {
        let flash_label = flash.as_ref().map(FlashButton::label).unwrap_or_default();
        Self {
            platform,
            hints,
            select,
            video,
            flash,
            flash_label,
            active_stream: None,
            torch_track: None,
            flash_on: false,
        }
    }

    pub fn active_stream(&self) -> Option<&P::Stream> {
        self.active_stream.as_ref()
    }

    pub fn flash_on(&self) -> bool {
        self.flash_on
    }

    pub fn torch_available(&self) -> bool {
        self.torch_track.is_some()
    }

    /// Enumerate devices, then open the selected one
    pub async fn start(&mut self) -> Result<(), StartupError> {
        let devices = self
            .platform
            .enumerate_devices()
            .await
            .map_err(StartupError::CameraAccess)?;
        let listed = self.populate(&devices);
        log::info!("Found {} video input device(s)", listed);

        self.acquire_selected()
            .await
            .map_err(StartupError::CameraAccess)
    }

    /// Append one option per video input and select the last one
    pub fn populate(&self, devices: &[MediaDeviceInfo]) -> usize {
        let mut listed = 0;
        for device in devices.iter().filter(|d| d.kind == DeviceKind::VideoInput) {
            let text = if device.label.is_empty() {
                fallback_label(self.select.len() + 1)
            } else {
                device.label.clone()
            };
            self.select.push_option(SelectOption {
                value: device.device_id.clone(),
                text,
            });
            listed += 1;
        }

        if let Some(last) = self.select.options().last() {
            self.select.set_value(&last.value);
        }
        listed
    }

    /// Replace the active stream with one for the current selection
    ///
    /// A rejected exact-device request is retried once without the device
    /// requirement. When both fail the first rejection is returned.
    pub async fn acquire_selected(&mut self) -> Result<(), PlatformError> {
        if let Some(previous) = self.active_stream.take() {
            log::debug!("Stopping tracks of stream {}", previous.id());
            previous.stop_tracks();
        }
        self.torch_track = None;

        let device_id = self.select.value();
        let stream = match self.platform.get_user_media(&self.hints.exact(&device_id)).await {
            Ok(stream) => stream,
            Err(err) => {
                log::warn!(
                    "Could not open camera '{}' ({}), trying any camera",
                    device_id,
                    err
                );
                match self.platform.get_user_media(&self.hints.emergency()).await {
                    Ok(stream) => stream,
                    Err(fallback_err) => {
                        log::error!(
                            "Error authorizing access to emergency camera device: {}",
                            fallback_err
                        );
                        return Err(err);
                    }
                }
            }
        };

        self.bind(stream).await;
        Ok(())
    }

    async fn bind(&mut self, stream: P::Stream) {
        log::info!("Camera stream {} bound to video", stream.id());
        self.flash_on = false;
        self.video.set_src_object(Some(stream.clone()));
        self.wire_flash(&stream).await;
        self.active_stream = Some(stream);
    }

    async fn wire_flash(&mut self, stream: &P::Stream) {
        let Some(button) = self.flash.clone() else {
            return;
        };

        if !self.platform.capabilities().image_capture {
            log::info!("Flash not supported");
            button.set_visible(false);
            return;
        }
        button.set_visible(true);

        let Some(track) = stream.video_tracks().into_iter().next() else {
            button.set_visible(false);
            return;
        };

        match track.photo_capabilities().await {
            Ok(capabilities) if capabilities.torch_supported() => {
                button.set_disabled(false);
                self.torch_track = Some(track);
            }
            Ok(_) => {
                log::info!("Torch not available on stream {}", stream.id());
                button.set_visible(false);
            }
            Err(err) => {
                log::warn!("Flash support error: {}", err);
                button.set_visible(false);
            }
        }
    }

    /// Flip the torch on the active track
    ///
    /// The button is disabled and relabelled while the constraint is
    /// applied, then restored whether or not it took effect.
    pub async fn toggle_flash(&mut self) {
        let (Some(button), Some(track)) = (self.flash.clone(), self.torch_track.clone()) else {
            log::debug!("Flash toggle ignored: no torch-capable stream");
            return;
        };

        button.set_disabled(true);
        button.set_label(if self.flash_on {
            "Turning off..."
        } else {
            "Turning on..."
        });

        self.flash_on = !self.flash_on;
        if let Err(err) = track.apply_torch(self.flash_on).await {
            log::warn!("Error applying torch constraint: {}", err);
        }

        button.set_disabled(false);
        button.set_label(&self.flash_label);
    }
}
