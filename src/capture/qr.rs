//! QR code detection backend using rqrr

use image::RgbaImage;

use crate::domain::{DetectedBarcode, Point, Rect};
use crate::error::PlatformError;
use crate::platform::BarcodeDetector;
use crate::surface::RasterHandle;

/// Symbology tag reported for QR matches
pub const QR_FORMAT: &str = "qr_code";

/// Frames larger than this are downsampled before grid detection
pub const DEFAULT_MAX_DIM: u32 = 1280;

/// Detector that understands only `qr_code`
#[derive(Clone, Debug)]
pub struct QrDetector {
    enabled: bool,
    max_dim: u32,
}

impl QrDetector {
    /// Build a detector for the requested formats
    ///
    /// An empty list is rejected. Formats other than `qr_code` are
    /// accepted but never reported.
    pub fn new(formats: &[String]) -> Result<Self, PlatformError> {
        if formats.is_empty() {
            return Err(PlatformError::not_supported(
                "Hint option provided, but is empty",
            ));
        }
        let enabled = formats.iter().any(|f| f == QR_FORMAT);
        for format in formats.iter().filter(|f| f.as_str() != QR_FORMAT) {
            log::warn!("Format {} is not supported and will be ignored", format);
        }
        Ok(Self {
            enabled,
            max_dim: DEFAULT_MAX_DIM,
        })
    }

    /// Set the downsampling threshold (0 = never downsample)
    pub fn with_max_dim(mut self, max_dim: u32) -> Self {
        self.max_dim = max_dim;
        self
    }
}

impl BarcodeDetector for QrDetector {
    async fn detect(&self, raster: &RasterHandle) -> Result<Vec<DetectedBarcode>, PlatformError> {
        if !self.enabled {
            return Ok(Vec::new());
        }
        let frame = raster.with_image(RgbaImage::clone);
        let max_dim = self.max_dim;
        // grid detection is CPU bound; keep it off the session thread
        tokio::task::spawn_blocking(move || detect_qr_codes(&frame, max_dim))
            .await
            .map_err(|err| PlatformError::not_readable(format!("QR decode task failed: {err}")))
    }
}

/// Detect QR codes in an image
/// max_dim: maximum dimension to downsample to (0 = no downsampling)
pub fn detect_qr_codes(img: &RgbaImage, max_dim: u32) -> Vec<DetectedBarcode> {
    use rqrr::PreparedImage;

    let (orig_w, orig_h) = (img.width(), img.height());
    if orig_w == 0 || orig_h == 0 {
        return Vec::new();
    }
    let downsample_factor = if max_dim > 0 && (orig_w > max_dim || orig_h > max_dim) {
        orig_w.max(orig_h) as f32 / max_dim as f32
    } else {
        1.0
    };

    let gray = if downsample_factor > 1.0 {
        let new_w = (orig_w as f32 / downsample_factor) as u32;
        let new_h = (orig_h as f32 / downsample_factor) as u32;
        let resized = image::imageops::resize(img, new_w, new_h, image::imageops::FilterType::Nearest);
        image::DynamicImage::ImageRgba8(resized).to_luma8()
    } else {
        image::DynamicImage::ImageRgba8(img.clone()).to_luma8()
    };

    let mut prepared = PreparedImage::prepare(gray);
    let grids = prepared.detect_grids();

    let scale = downsample_factor as f64;
    let mut results = Vec::new();
    for grid in grids {
        match grid.decode() {
            Ok((_, content)) => {
                let corner_points: Vec<Point> = grid
                    .bounds
                    .iter()
                    .map(|p| Point::new(p.x as f64 * scale, p.y as f64 * scale))
                    .collect();
                let bounding_box = Rect::enclosing(&corner_points).unwrap_or_default();
                results.push(DetectedBarcode {
                    bounding_box,
                    corner_points,
                    format: QR_FORMAT.to_string(),
                    raw_value: Some(content),
                    raw_data: None,
                });
            }
            Err(err) => log::debug!("QR grid found but not decodable: {:?}", err),
        }
    }

    results
}
