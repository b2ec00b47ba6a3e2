//! Session entry point: startup, then the event loop on the local set

use std::rc::Rc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::controller::{DetectedCallback, DetectionLoop, LoopOptions};
use crate::capture::{CameraAcquirer, FrameSampler, StreamHints, ensure_supported, probe};
use crate::config::DetectionConfig;
use crate::domain::StartupResult;
use crate::error::StartupError;
use crate::platform::Platform;
use crate::surface::{CameraSelect, FlashButton};

/// Handle to a running session
///
/// Dropping the handle leaves the session running; call
/// [`ScanHandle::stop`] to end it.
pub struct ScanHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ScanHandle {
    /// Ask the session to end after the cycle in progress
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    /// Wait for the session task to end
    pub async fn join(self) {
        if let Err(err) = self.task.await {
            log::error!("Scan session task failed: {}", err);
        }
    }
}

/// Start a scan session
///
/// Probes the host, opens a camera and builds the detector. On success
/// the session runs on the current [`tokio::task::LocalSet`] and a handle
/// is returned alongside the result; on failure no loop is scheduled.
///
/// # Panics
///
/// Panics when called outside a `LocalSet`.
pub async fn qbscan<P: Platform>(
    platform: P,
    config: DetectionConfig<P::Stream>,
    on_detected: Option<DetectedCallback>,
) -> (StartupResult, Option<ScanHandle>) {
    let mut result = StartupResult::default();
    match start(Rc::new(platform), config, on_detected, &mut result).await {
        Ok(handle) => (result, Some(handle)),
        Err(err) => {
            log::error!("Scanner startup failed: {}", err);
            result.record_failure(&err);
            (result, None)
        }
    }
}

async fn start<P: Platform>(
    platform: Rc<P>,
    config: DetectionConfig<P::Stream>,
    on_detected: Option<DetectedCallback>,
    result: &mut StartupResult,
) -> Result<ScanHandle, StartupError> {
    let DetectionConfig {
        settings,
        image_canvas,
        camera_select,
        video,
        flash_button,
    } = config;

    let video = video.unwrap_or_default();
    video.set_clear_on_pause(settings.clear_video_on_pause);
    let select = camera_select.unwrap_or_default();
    let canvas = image_canvas.unwrap_or_default();

    ensure_supported(&probe(platform.as_ref()))?;

    let mut acquirer = CameraAcquirer::new(
        Rc::clone(&platform),
        StreamHints::from(&settings),
        select.clone(),
        video.clone(),
        flash_button.clone(),
    );
    acquirer.start().await?;

    result.supported_formats = match platform.supported_formats().await {
        Ok(formats) => formats,
        Err(err) => {
            log::warn!("Could not query supported formats: {}", err);
            Vec::new()
        }
    };
    let formats = settings.formats_for(&result.supported_formats);
    log::info!("Detecting formats: {:?}", formats);
    let detector = platform
        .barcode_detector(&formats)
        .map_err(StartupError::Detector)?;

    let detection = DetectionLoop::new(
        Rc::clone(&platform),
        detector,
        FrameSampler::new(video.clone(), canvas),
        video,
        LoopOptions {
            loop_enabled: settings.loop_enabled,
            pause_on_detect: settings.pause_on_detect,
        },
        on_detected,
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::task::spawn_local(run_session(
        platform,
        detection,
        acquirer,
        select,
        flash_button,
        stop_rx,
    ));

    Ok(ScanHandle {
        stop: stop_tx,
        task,
    })
}

/// Multiplex frame ticks, camera changes, flash clicks and stop requests
async fn run_session<P: Platform>(
    platform: Rc<P>,
    mut detection: DetectionLoop<P>,
    mut acquirer: CameraAcquirer<P>,
    select: CameraSelect,
    flash: Option<FlashButton>,
    mut stop: watch::Receiver<bool>,
) {
    log::debug!("Scan session started");
    loop {
        let wants_frame = detection.wants_next_frame();
        tokio::select! {
            biased;
            _ = stop_requested(&mut stop) => break,
            _ = select.changed() => {
                log::info!("Camera selection changed to '{}'", select.value());
                if let Err(err) = acquirer.acquire_selected().await {
                    log::error!("Error in get stream function: {}", err);
                }
            }
            _ = flash_clicked(flash.as_ref()) => acquirer.toggle_flash().await,
            _ = platform.next_frame(), if wants_frame => detection.run_cycle().await,
        }
    }
    detection.stop();
    log::debug!("Scan session stopped");
}

async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    // a dropped handle never stops the session
    if stop.wait_for(|stopped| *stopped).await.is_err() {
        futures::future::pending::<()>().await;
    }
}

async fn flash_clicked(flash: Option<&FlashButton>) {
    match flash {
        Some(button) => button.clicked().await,
        None => futures::future::pending().await,
    }
}
