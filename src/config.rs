//! Session configuration: plain settings plus the surfaces to drive

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::surface::{CameraSelect, FlashButton, RasterSurface, VideoSurface};

/// Symbologies requested when the caller names none
pub const DEFAULT_DETECT_FORMATS: &[&str] = &["qr_code", "ean_13"];

/// Tunable settings of a scan session, loadable from JSON
///
/// Keys use the camelCase names of the options; missing keys take their
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanSettings {
    /// Keep sampling after each cycle instead of running a single one
    #[serde(rename = "loop")]
    pub loop_enabled: bool,
    /// Pause the video once a cycle finds something
    pub pause_on_detect: bool,
    /// Detach the stream from the video while paused
    pub clear_video_on_pause: bool,
    /// Symbologies handed to the detector
    pub detect_formats: Vec<String>,
    /// Use every format the detector supports instead of `detect_formats`
    pub detect_formats_all: bool,
    pub video_frame_rate: f64,
    pub video_frame_rate_max: f64,
    pub video_width: u32,
    pub video_height: u32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            loop_enabled: true,
            pause_on_detect: true,
            clear_video_on_pause: false,
            detect_formats: DEFAULT_DETECT_FORMATS.iter().map(|f| f.to_string()).collect(),
            detect_formats_all: false,
            video_frame_rate: 32.0,
            video_frame_rate_max: 56.0,
            video_width: 1024,
            video_height: 768,
        }
    }
}

impl ScanSettings {
    pub const FILE_NAME: &'static str = "config.json";

    /// `$XDG_CONFIG_HOME/qbscan/config.json` or the platform equivalent
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("qbscan").join(Self::FILE_NAME))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load settings from disk, or return defaults if unavailable
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => settings,
                Err(err) => {
                    log::warn!(
                        "Error parsing config {}, using defaults: {}",
                        path.display(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Could not read config {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Upper frame-rate bound, never below the ideal rate
    pub fn frame_rate_max(&self) -> f64 {
        self.video_frame_rate_max.max(self.video_frame_rate)
    }

    /// Formats to construct the detector with
    pub fn formats_for(&self, supported: &[String]) -> Vec<String> {
        if self.detect_formats_all {
            supported.to_vec()
        } else {
            self.detect_formats.clone()
        }
    }
}

/// Everything a session is started with
///
/// Surfaces left as `None` are created fresh by the session; supply one
/// to observe or drive it from outside.
pub struct DetectionConfig<S> {
    pub settings: ScanSettings,
    pub image_canvas: Option<RasterSurface>,
    pub camera_select: Option<CameraSelect>,
    pub video: Option<VideoSurface<S>>,
    pub flash_button: Option<FlashButton>,
}

impl<S> Default for DetectionConfig<S> {
    fn default() -> Self {
        Self {
            settings: ScanSettings::default(),
            image_canvas: None,
            camera_select: None,
            video: None,
            flash_button: None,
        }
    }
}

impl<S> DetectionConfig<S> {
    pub fn new(settings: ScanSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn with_image_canvas(mut self, canvas: RasterSurface) -> Self {
        self.image_canvas = Some(canvas);
        self
    }

    pub fn with_camera_select(mut self, select: CameraSelect) -> Self {
        self.camera_select = Some(select);
        self
    }

    pub fn with_video(mut self, video: VideoSurface<S>) -> Self {
        self.video = Some(video);
        self
    }

    pub fn with_flash_button(mut self, button: FlashButton) -> Self {
        self.flash_button = Some(button);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = ScanSettings::default();
        assert!(settings.loop_enabled);
        assert!(settings.pause_on_detect);
        assert!(!settings.clear_video_on_pause);
        assert_eq!(settings.detect_formats, vec!["qr_code", "ean_13"]);
        assert!(!settings.detect_formats_all);
        assert_eq!(settings.video_frame_rate, 32.0);
        assert_eq!(settings.video_frame_rate_max, 56.0);
        assert_eq!((settings.video_width, settings.video_height), (1024, 768));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            ScanSettings::from_json(r#"{"loop": false, "detectFormats": ["qr_code"]}"#).unwrap();
        assert!(!settings.loop_enabled);
        assert_eq!(settings.detect_formats, vec!["qr_code"]);
        assert!(settings.pause_on_detect);
        assert_eq!(settings.video_width, 1024);
    }

    #[test]
    fn test_wrong_type_rejected() {
        assert!(ScanSettings::from_json(r#"{"loop": "yes"}"#).is_err());
    }

    #[test]
    fn test_serializes_loop_key() {
        let json = serde_json::to_value(ScanSettings::default()).unwrap();
        assert_eq!(json["loop"], true);
        assert_eq!(json["videoFrameRateMax"], 56.0);
    }

    #[test]
    fn test_frame_rate_max_coerced() {
        let settings = ScanSettings {
            video_frame_rate: 60.0,
            video_frame_rate_max: 30.0,
            ..Default::default()
        };
        assert_eq!(settings.frame_rate_max(), 60.0);
        assert_eq!(ScanSettings::default().frame_rate_max(), 56.0);
    }

    #[test]
    fn test_formats_for() {
        let supported = vec!["qr_code".to_string(), "code_39".to_string()];
        let mut settings = ScanSettings::default();
        assert_eq!(settings.formats_for(&supported), vec!["qr_code", "ean_13"]);
        settings.detect_formats_all = true;
        assert_eq!(settings.formats_for(&supported), supported);
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            ScanSettings::load(&dir.path().join("missing.json")),
            ScanSettings::default()
        );

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert_eq!(ScanSettings::load(&broken), ScanSettings::default());

        let good = dir.path().join("good.json");
        std::fs::write(&good, r#"{"videoWidth": 640, "videoHeight": 480}"#).unwrap();
        let settings = ScanSettings::load(&good);
        assert_eq!((settings.video_width, settings.video_height), (640, 480));
    }
}
