//! Camera and frame capture
//!
//! This module consolidates:
//! - capability probing (probe.rs)
//! - camera acquisition and torch wiring (acquirer.rs)
//! - frame sampling into the raster surface (sampler.rs)
//! - the rqrr-backed QR detector (qr.rs)

pub mod acquirer;
pub mod probe;
pub mod qr;
pub mod sampler;

pub use acquirer::{CameraAcquirer, StreamHints};
pub use probe::{ensure_supported, probe};
pub use qr::QrDetector;
pub use sampler::{CycleSlot, FrameSampler, PLACEHOLDER_SIZE};
