//! gif-animator - plays a GIF headlessly and logs every frame change

use anyhow::{Context, Result};
use clap::Parser;
use gif_animator::{AnimatedImageController, DisplayClock, LoadState, PlayerConfig, RepeatLimit};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "gif-animator", version, about = "Play a GIF against a display clock")]
struct Args {
    /// GIF file to play
    file: PathBuf,

    /// JSON player config; command-line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Display clock rate (0 = measure real intervals)
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Stop after this many seconds even if the animation loops forever
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,

    /// Number of leading frames to decode up front
    #[arg(long)]
    preload_window: Option<usize>,

    /// Passes to play (0 = forever); defaults to the file's loop count
    #[arg(long)]
    repeat: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read GIF: {}", args.file.display()))?;

    let mut controller = AnimatedImageController::new(config);
    controller.set_repaint_handler(|index| log::info!("Repaint: frame {}", index));
    controller
        .load(bytes)
        .with_context(|| format!("Failed to load GIF: {}", args.file.display()))?;

    if let Some((w, h)) = controller.dimensions() {
        log::info!(
            "Playing {}x{}, {} frames (preload window {})",
            w,
            h,
            controller.frame_count(),
            controller.config().preload_window
        );
    }

    let mut clock = DisplayClock::new(args.fps);
    let run_for = Duration::try_from_secs_f64(args.seconds.max(0.0))
        .with_context(|| format!("Invalid --seconds: {}", args.seconds))?;
    let deadline = Instant::now() + run_for;

    while Instant::now() < deadline {
        thread::sleep(clock.frame_interval());
        controller.tick_clock(clock.sample(Instant::now()));

        if let LoadState::Failed(msg) = controller.load_state() {
            anyhow::bail!("{}", msg);
        }
        if controller.is_finished() {
            break;
        }
    }

    println!(
        "frames: {}, passes completed: {}, finished: {}, loop duration: {}",
        controller.frame_count(),
        controller.repeats_completed(),
        controller.is_finished(),
        controller
            .loop_duration()
            .map(|d| format!("{:.3}s", d))
            .unwrap_or_else(|| "unknown".to_string())
    );
    Ok(())
}

fn load_config(args: &Args) -> Result<PlayerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            PlayerConfig::from_json(&json)
                .with_context(|| format!("Invalid config: {}", path.display()))?
        }
        None => PlayerConfig::default(),
    };

    if let Some(window) = args.preload_window {
        config.preload_window = window;
    }
    if let Some(repeat) = args.repeat {
        config.repeat_limit = Some(RepeatLimit(repeat));
    }
    Ok(config)
}
