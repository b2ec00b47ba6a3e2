//! Detection loop controller: one sampling cycle at a time

use std::rc::Rc;

use crate::capture::{CycleSlot, FrameSampler};
use crate::domain::{DetectedAt, Detection, DetectionEvent};
use crate::error::DetectionCycleError;
use crate::platform::{BarcodeDetector, Platform};
use crate::surface::VideoSurface;

/// Callback receiving every cycle's event
pub type DetectedCallback = Box<dyn FnMut(DetectionEvent)>;

/// Where the controller is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Constructed, no cycle run yet
    Idle,
    Sampling,
    AwaitingDetection,
    /// A detection paused the video; the slot stays held until a later
    /// cycle sees the video playing again
    Paused,
    /// Waiting for the next frame
    Rescheduled,
    /// Single-shot mode finished its cycle
    Dormant,
    Stopped,
}

/// Settings the controller reads on every cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOptions {
    pub loop_enabled: bool,
    pub pause_on_detect: bool,
}

pub struct DetectionLoop<P: Platform> {
    platform: Rc<P>,
    detector: P::Detector,
    sampler: FrameSampler<P::Stream>,
    video: VideoSurface<P::Stream>,
    options: LoopOptions,
    slot: CycleSlot,
    phase: LoopPhase,
    on_detected: Option<DetectedCallback>,
}

impl<P: Platform> DetectionLoop<P> {
    pub fn new(
        platform: Rc<P>,
        detector: P::Detector,
        sampler: FrameSampler<P::Stream>,
        video: VideoSurface<P::Stream>,
        options: LoopOptions,
        on_detected: Option<DetectedCallback>,
    ) -> Self {
        Self {
            platform,
            detector,
            sampler,
            video,
            options,
            slot: CycleSlot::Free,
            phase: LoopPhase::Idle,
            on_detected,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Whether a sampled frame is still considered in flight
    pub fn is_detecting(&self) -> bool {
        self.slot.is_in_flight()
    }

    /// Whether another cycle should be scheduled
    pub fn wants_next_frame(&self) -> bool {
        match self.phase {
            LoopPhase::Dormant | LoopPhase::Stopped => false,
            LoopPhase::Idle => true,
            _ => self.options.loop_enabled,
        }
    }

    pub fn stop(&mut self) {
        self.phase = LoopPhase::Stopped;
    }

    /// Sample, detect, report
    ///
    /// The callback runs exactly once per cycle, after detection resolved
    /// or failed.
    pub async fn run_cycle(&mut self) {
        self.phase = LoopPhase::Sampling;
        let raster = self.sampler.sample(&mut self.slot);

        self.phase = LoopPhase::AwaitingDetection;
        let outcome = self
            .detector
            .detect(&raster)
            .await
            .map_err(DetectionCycleError::from);

        let mut found = false;
        let event = match outcome {
            Ok(barcodes) => {
                let mut detections = Vec::new();
                if !barcodes.is_empty() && !self.video.is_paused() {
                    if self.options.pause_on_detect {
                        found = true;
                        self.video.pause();
                    }
                    detections = barcodes.into_iter().map(Detection::from).collect();
                    log::info!("Detected {} symbol(s)", detections.len());
                }
                DetectionEvent::resolved(DetectedAt::from(self.platform.now()), detections)
            }
            Err(err) => {
                log::warn!("Detection cycle failed: {}", err);
                DetectionEvent::failed(&err)
            }
        };

        if let Some(callback) = self.on_detected.as_mut() {
            callback(event);
        }

        if !found && !self.video.is_paused() {
            self.slot.release();
        }

        self.phase = if found {
            LoopPhase::Paused
        } else if self.options.loop_enabled {
            LoopPhase::Rescheduled
        } else {
            LoopPhase::Dormant
        };
    }
}
