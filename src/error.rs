//! Error taxonomy for startup, camera acquisition and detection cycles

use std::fmt;

use thiserror::Error;

/// Host capability that startup depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Barcode detection backend
    BarcodeDetector,
    /// Device enumeration and stream acquisition
    UserMedia,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::BarcodeDetector => f.write_str("BarcodeDetector is not supported"),
            Capability::UserMedia => f.write_str(
                "The photo-taking function is not supported by your browser or there is no camera device",
            ),
        }
    }
}

/// Broad classification of a platform rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformErrorKind {
    /// The user or the host refused access
    NotAllowed,
    /// No device matched the request
    NotFound,
    /// The device exists but could not be read
    NotReadable,
    /// A hard constraint could not be satisfied
    Overconstrained,
    /// The operation is not available on this host
    NotSupported,
    Other,
}

/// Rejection reported by a platform collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PlatformError {
    pub kind: PlatformErrorKind,
    pub message: String,
}

impl PlatformError {
    pub fn new(kind: PlatformErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorKind::NotFound, message)
    }

    pub fn not_readable(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorKind::NotReadable, message)
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorKind::NotSupported, message)
    }
}

/// Fatal failure while arming the detection loop
#[derive(Debug, Clone, Error)]
pub enum StartupError {
    /// A required host capability is absent
    #[error("{0}")]
    UnsupportedCapability(Capability),
    /// Both the selected-device and the fallback stream requests were rejected
    #[error("{0}")]
    CameraAccess(#[source] PlatformError),
    /// The detector could not be constructed for the requested formats
    #[error("Could not create barcode detector: {0}")]
    Detector(#[source] PlatformError),
}

/// A single detect call was rejected; recovered by the next cycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DetectionCycleError {
    pub message: String,
}

impl From<PlatformError> for DetectionCycleError {
    fn from(err: PlatformError) -> Self {
        Self {
            message: err.message,
        }
    }
}
