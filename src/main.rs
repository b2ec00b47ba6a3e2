use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::Notify;
use tokio::task::LocalSet;

use qbscan::platform::{StillsPlatform, StillsStream};
use qbscan::surface::{CameraSelect, VideoSurface};
use qbscan::{DetectionConfig, DetectionEvent, ScanSettings, qbscan};

/// Scan image directories for QR codes as if they were live cameras.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Device to switch to after startup (defaults to the last one)
    #[arg(long)]
    device: Option<String>,
    /// Run a single detection cycle and exit
    #[arg(long, default_value_t = false)]
    once: bool,
    /// Ideal frame rate hint, also the stills replay rate
    #[arg(long)]
    frame_rate: Option<f64>,
    /// Detect every supported format
    #[arg(long, default_value_t = false)]
    all_formats: bool,
    /// Resume playback this many milliseconds after a pause-on-detect
    #[arg(long)]
    resume_after: Option<u64>,
    /// Image directories or files acting as cameras
    #[arg(required = true)]
    devices: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    LocalSet::new().block_on(&runtime, run(args))
}

fn load_settings(args: &Args) -> ScanSettings {
    let mut settings = match args.config.clone().or_else(ScanSettings::default_path) {
        Some(path) if path.exists() || args.config.is_some() => ScanSettings::load(&path),
        _ => ScanSettings::default(),
    };
    if args.once {
        settings.loop_enabled = false;
    }
    if let Some(rate) = args.frame_rate {
        settings.video_frame_rate = rate;
    }
    if args.all_formats {
        settings.detect_formats_all = true;
    }
    settings
}

async fn run(args: Args) -> Result<()> {
    let settings = load_settings(&args);
    log::debug!("Settings: {:?}", settings);

    let video = VideoSurface::<StillsStream>::new();
    let select = CameraSelect::new();
    let done = Rc::new(Notify::new());

    let on_detected = {
        let video = video.clone();
        let done = Rc::clone(&done);
        let once = args.once;
        let resume_after = args.resume_after.map(Duration::from_millis);
        move |event: DetectionEvent| {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(err) => log::error!("Failed to serialize event: {}", err),
            }
            if once {
                done.notify_one();
            } else if let Some(delay) = resume_after.filter(|_| event.found() && video.is_paused()) {
                let video = video.clone();
                tokio::task::spawn_local(async move {
                    tokio::time::sleep(delay).await;
                    video.play();
                });
            }
        }
    };

    let mut platform = StillsPlatform::new(args.devices.clone());
    if let Some(rate) = args.frame_rate.filter(|rate| *rate > 0.0) {
        // stills have no native rate; replay them at the requested one
        platform = platform.with_frame_interval(Duration::from_secs_f64(1.0 / rate));
    }
    let config = DetectionConfig::new(settings)
        .with_video(video)
        .with_camera_select(select.clone());

    let (result, handle) = qbscan(platform, config, Some(Box::new(on_detected))).await;
    let Some(handle) = handle else {
        eprintln!("{}", serde_json::to_string_pretty(&result)?);
        anyhow::bail!("Scanner startup failed: {}", result.error_message);
    };
    log::info!("Scanner started, supported formats: {:?}", result.supported_formats);

    if let Some(device) = &args.device {
        if select.options().iter().any(|o| o.value == *device) {
            select.select(device);
        } else {
            log::warn!("Unknown device {}, keeping {}", device, select.value());
        }
    }

    tokio::select! {
        _ = done.notified() => {}
        signal = tokio::signal::ctrl_c() => signal.context("Failed to listen for ctrl-c")?,
    }

    handle.stop();
    handle.join().await;
    Ok(())
}
