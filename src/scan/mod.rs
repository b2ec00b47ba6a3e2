//! Detection loop and the session that drives it

pub mod controller;
mod session;

pub use controller::{DetectedCallback, DetectionLoop, LoopOptions, LoopPhase};
pub use session::{ScanHandle, qbscan};
