//! Live QR code and barcode detection from a camera feed
//!
//! [`qbscan`] probes the host, opens a camera (falling back to any camera
//! once), then samples frames into a raster and hands them to a barcode
//! detector, reporting every cycle through a callback. The host is
//! abstracted by [`platform::Platform`]; [`platform::StillsPlatform`]
//! replays image directories as cameras and decodes QR codes with `rqrr`.
//!
//! Sessions are single-threaded and must be started inside a
//! [`tokio::task::LocalSet`].

pub mod capture;
pub mod config;
pub mod domain;
pub mod error;
pub mod platform;
pub mod scan;
pub mod surface;

pub use config::{DetectionConfig, ScanSettings};
pub use domain::{DetectedAt, Detection, DetectionEvent, Point, Rect, StartupResult};
pub use error::{Capability, DetectionCycleError, PlatformError, PlatformErrorKind, StartupError};
pub use scan::{DetectedCallback, ScanHandle, qbscan};
