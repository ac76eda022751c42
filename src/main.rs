//! Drowsiness monitoring application: webcam EAR tracking with a debounced alarm.

use anyhow::{Context, Result};
use clap::Parser;
use drowsy_watch::app::{DrowsyWatchApp, VideoSource};
use drowsy_watch::config::Config;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long, default_value = "0")]
    cam: i32,

    /// Video file to process instead of a camera
    #[arg(short, long)]
    video: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// EAR threshold below which eyes count as closed
    #[arg(long)]
    ear_threshold: Option<f64>,

    /// Consecutive closed-eye frames before the alarm triggers
    #[arg(long)]
    consec_frames: Option<u32>,

    /// Reset the closed-eye counter when no face is detected
    #[arg(long)]
    reset_on_lost_face: bool,

    /// Path to the alarm sound file
    #[arg(long)]
    alarm: Option<String>,

    /// Disable audible alarm playback
    #[arg(long)]
    no_audio: bool,

    /// Run without the display window
    #[arg(long)]
    no_gui: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Drowsiness Monitor");

    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {config_path}");
        Config::from_file(config_path).with_context(|| format!("failed to load config file {config_path}"))?
    } else {
        Config::default()
    };

    // Command line overrides
    if let Some(threshold) = args.ear_threshold {
        config.detection.ear_threshold = threshold;
    }
    if let Some(frames) = args.consec_frames {
        config.detection.consec_frames_threshold = frames;
    }
    if args.reset_on_lost_face {
        config.detection.reset_on_lost_face = true;
    }
    if let Some(alarm_path) = args.alarm {
        config.alarm.sound_path = alarm_path.into();
    }
    if args.no_audio {
        config.alarm.enabled = false;
    }
    if args.no_gui {
        config.display.gui = false;
    }

    let video_source = if let Some(video_path) = args.video {
        VideoSource::File(video_path)
    } else {
        VideoSource::Camera(args.cam)
    };

    let mut app = DrowsyWatchApp::new(config, video_source)?;
    app.run()?;

    Ok(())
}
