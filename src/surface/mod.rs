//! Caller-visible surfaces a scan session drives
//!
//! Each surface is a cheap cloneable handle over single-threaded shared
//! state, so the caller and the session observe the same object:
//! - raster the sampled frame is painted into (raster.rs)
//! - video display a stream is bound to (video.rs)
//! - camera selection list (select.rs)
//! - torch toggle (flash.rs)

pub mod flash;
pub mod raster;
pub mod select;
pub mod video;

pub use flash::FlashButton;
pub use raster::{RasterHandle, RasterSurface};
pub use select::{CameraSelect, SelectOption};
pub use video::VideoSurface;
