//! Result shapes handed to callers: per-cycle events and the startup summary

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use serde::Serialize;

use super::geometry::{Point, Rect};
use crate::error::{DetectionCycleError, StartupError};

/// A raw match as reported by a detector backend
///
/// Backends expose the decoded payload either as `raw_data` or as
/// `raw_value`; [`Detection`] normalizes the two.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectedBarcode {
    pub bounding_box: Rect,
    pub corner_points: Vec<Point>,
    pub format: String,
    pub raw_value: Option<String>,
    pub raw_data: Option<String>,
}

impl DetectedBarcode {
    /// Decoded payload, preferring `raw_data` when present
    pub fn payload(&self) -> String {
        self.raw_data
            .as_ref()
            .or(self.raw_value.as_ref())
            .cloned()
            .unwrap_or_default()
    }
}

/// One symbol found in a sampled frame
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub bounding_box: Rect,
    pub corner_points: Vec<Point>,
    pub format: String,
    pub raw_value: String,
}

impl From<DetectedBarcode> for Detection {
    fn from(barcode: DetectedBarcode) -> Self {
        let raw_value = barcode.payload();
        Self {
            bounding_box: barcode.bounding_box,
            corner_points: barcode.corner_points,
            format: barcode.format,
            raw_value,
        }
    }
}

/// Broken-down local wall-clock time of a resolved cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DetectedAt {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DetectedAt {
    fn from(time: DateTime<Tz>) -> Self {
        Self {
            day: time.day(),
            month: time.month(),
            year: time.year(),
            hour: time.hour(),
            minute: time.minute(),
            second: time.second(),
            // leap seconds report nanoseconds past 1e9
            millisecond: (time.nanosecond() / 1_000_000).min(999),
        }
    }
}

/// Outcome of one sampling cycle, passed to the detection callback
///
/// A failed event never carries detections.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionEvent {
    ok: bool,
    error_message: String,
    detected_at: Option<DetectedAt>,
    detections: Vec<Detection>,
}

impl DetectionEvent {
    /// A resolved cycle; `detections` may be empty
    pub fn resolved(detected_at: DetectedAt, detections: Vec<Detection>) -> Self {
        Self {
            ok: true,
            error_message: String::new(),
            detected_at: Some(detected_at),
            detections,
        }
    }

    /// A cycle whose detect call was rejected
    pub fn failed(err: &DetectionCycleError) -> Self {
        Self {
            ok: false,
            error_message: err.to_string(),
            detected_at: None,
            detections: Vec::new(),
        }
    }

    pub fn ok(&self) -> bool {
        self.ok
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn detected_at(&self) -> Option<DetectedAt> {
        self.detected_at
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Whether at least one symbol was reported
    pub fn found(&self) -> bool {
        !self.detections.is_empty()
    }
}

/// Summary of session startup, produced once
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupResult {
    pub ok: bool,
    pub supported_formats: Vec<String>,
    pub barcode_detector_supported: bool,
    pub camera_access_granted: bool,
    pub user_media_supported: bool,
    pub error_message: String,
}

impl Default for StartupResult {
    fn default() -> Self {
        Self {
            ok: true,
            supported_formats: Vec::new(),
            barcode_detector_supported: true,
            camera_access_granted: true,
            user_media_supported: true,
            error_message: String::new(),
        }
    }
}

impl StartupResult {
    /// Fold a startup failure into the flags and the message
    pub fn record_failure(&mut self, err: &StartupError) {
        use crate::error::Capability;

        self.ok = false;
        match err {
            StartupError::UnsupportedCapability(Capability::BarcodeDetector) => {
                self.barcode_detector_supported = false;
            }
            StartupError::UnsupportedCapability(Capability::UserMedia) => {
                self.user_media_supported = false;
            }
            StartupError::CameraAccess(_) => self.camera_access_granted = false,
            StartupError::Detector(_) => {}
        }
        self.error_message = err.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Capability, PlatformError};
    use chrono::{NaiveDate, Utc};

    fn barcode(raw_value: Option<&str>, raw_data: Option<&str>) -> DetectedBarcode {
        DetectedBarcode {
            format: "qr_code".to_string(),
            raw_value: raw_value.map(str::to_string),
            raw_data: raw_data.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_payload_prefers_raw_data() {
        assert_eq!(barcode(Some("value"), Some("data")).payload(), "data");
        assert_eq!(barcode(Some("value"), None).payload(), "value");
        assert_eq!(barcode(None, None).payload(), "");
    }

    #[test]
    fn test_detection_from_barcode() {
        let detection = Detection::from(barcode(None, Some("https://example.org")));
        assert_eq!(detection.format, "qr_code");
        assert_eq!(detection.raw_value, "https://example.org");
    }

    #[test]
    fn test_detected_at_fields() {
        let time = NaiveDate::from_ymd_opt(2022, 3, 7)
            .unwrap()
            .and_hms_milli_opt(14, 5, 9, 321)
            .unwrap()
            .and_utc();
        let at = DetectedAt::from(time);
        assert_eq!(
            at,
            DetectedAt {
                day: 7,
                month: 3,
                year: 2022,
                hour: 14,
                minute: 5,
                second: 9,
                millisecond: 321,
            }
        );
    }

    #[test]
    fn test_failed_event_is_empty() {
        let err = PlatformError::not_readable("detector crashed").into();
        let event = DetectionEvent::failed(&err);
        assert!(!event.ok());
        assert_eq!(event.error_message(), "detector crashed");
        assert!(event.detections().is_empty());
        assert!(event.detected_at().is_none());
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let event = DetectionEvent::resolved(
            DetectedAt::from(Utc::now()),
            vec![Detection::from(barcode(Some("abc"), None))],
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["errorMessage"], "");
        assert_eq!(json["detections"][0]["rawValue"], "abc");
        assert!(json["detections"][0]["boundingBox"].is_object());
        assert!(json["detectedAt"]["millisecond"].is_number());
    }

    #[test]
    fn test_record_failure_sets_flags() {
        let mut result = StartupResult::default();
        assert!(result.ok);

        result.record_failure(&StartupError::UnsupportedCapability(
            Capability::BarcodeDetector,
        ));
        assert!(!result.ok);
        assert!(!result.barcode_detector_supported);
        assert!(result.user_media_supported);
        assert_eq!(result.error_message, "BarcodeDetector is not supported");

        let mut result = StartupResult::default();
        result.record_failure(&StartupError::CameraAccess(PlatformError::not_found(
            "Requested device not found",
        )));
        assert!(!result.camera_access_granted);
        assert_eq!(result.error_message, "Requested device not found");
    }
}
