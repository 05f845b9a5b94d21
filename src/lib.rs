use std::{
    fmt::Display,
    fs::File,
    path::PathBuf,
    time::{Duration, Instant},
};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};

pub mod app;
pub mod config;
pub mod controls;
pub mod core;
pub mod diorama;
pub mod error;
pub mod host;
pub mod loader;
pub mod pipeline;
pub mod util;

pub use config::DioramaConfig;
pub use core::Camera;
pub use core::Color;
pub use core::Scene;
pub use diorama::Diorama;
pub use error::{DioramaError, Result};
pub use util::format_mat4;

/// Log file used while the terminal itself is the drawing surface.
pub const LOG_FILE: &str = "orbit_diorama.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTarget {
    Terminal,
    Window,
}

/// Rolling frame timings, reported once per second.
pub struct FrameStats {
    pub frame_time: Duration,
    pub fps_counter: u32,
    pub fps_update_timer: Instant,
    pub current_fps: f32,
    pub frame_times: Vec<f32>,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            frame_time: Duration::from_secs_f32(1.0 / 60.0),
            fps_counter: 0,
            fps_update_timer: Instant::now(),
            current_fps: 0.0,
            frame_times: Vec::with_capacity(120),
        }
    }

    /// Record one frame. Returns true when a new once-per-second report is ready.
    pub fn update(&mut self, frame_delta: Duration) -> bool {
        self.fps_counter += 1;
        self.frame_times.push(frame_delta.as_secs_f32() * 1000.0);
        if self.frame_times.len() > 120 {
            self.frame_times.remove(0);
        }

        if self.fps_update_timer.elapsed() < Duration::from_secs(1) {
            return false;
        }
        self.current_fps = self.fps_counter as f32 / self.fps_update_timer.elapsed().as_secs_f32();
        self.fps_counter = 0;
        self.fps_update_timer = Instant::now();
        let avg = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        self.frame_time = Duration::from_secs_f32(avg / 1000.0);
        true
    }
}

impl Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FPS: {:.2} | Avg: {:.2}ms | Min: {:.2}ms | Max: {:.2}ms",
            self.current_fps,
            self.frame_time.as_secs_f32() * 1000.0,
            self.frame_times
                .iter()
                .copied()
                .reduce(f32::min)
                .unwrap_or(0.0),
            self.frame_times
                .iter()
                .copied()
                .reduce(f32::max)
                .unwrap_or(0.0)
        )
    }
}

pub static DEBUG_PIPELINE: std::sync::atomic::AtomicBool =
    std::sync::atomic::AtomicBool::new(false);

// Per-triangle and per-frame pipeline traces, off unless explicitly enabled
#[macro_export]
macro_rules! debug_print {
    ($($arg:tt)*) => {
        if $crate::DEBUG_PIPELINE.load(std::sync::atomic::Ordering::Relaxed) {
            log::trace!($($arg)*);
        }
    };
}

fn render_args() -> Vec<Arg> {
    vec![
        Arg::new("mode")
            .short('m')
            .long("mode")
            .value_name("MODE")
            .help("Where to draw: 'window', 'terminal', 'w' or 't'")
            .value_parser(["window", "terminal", "w", "t"]),
        Arg::new("width")
            .long("width")
            .value_name("PIXELS")
            .help("Initial window width")
            .value_parser(value_parser!(usize)),
        Arg::new("height")
            .long("height")
            .value_name("PIXELS")
            .help("Initial window height")
            .value_parser(value_parser!(usize)),
        Arg::new("assets")
            .short('a')
            .long("assets")
            .value_name("DIR")
            .help("Directory holding earthmap.jpg and moonmap.jpg"),
        Arg::new("seed")
            .long("seed")
            .value_name("N")
            .help("Seed the star field for a repeatable sky")
            .value_parser(value_parser!(u64)),
        Arg::new("round-star-count")
            .long("round-star-count")
            .help("Scatter exactly 10000 stars instead of 10001")
            .action(ArgAction::SetTrue),
        Arg::new("time-scaled")
            .long("time-scaled")
            .help("Advance the animation by elapsed time instead of once per frame")
            .action(ArgAction::SetTrue),
        Arg::new("log-level")
            .long("log-level")
            .value_name("LEVEL")
            .help("Log verbosity")
            .value_parser(["off", "error", "warn", "info", "debug", "trace"]),
    ]
}

pub fn create_clap_command() -> Command {
    Command::new("orbit_diorama")
        .about("Earth, Moon and a field of stars, drawn by a software renderer")
        .version("0.1")
        .args(render_args())
        .subcommand(
            Command::new("render")
                .about("Render the diorama in a window (using minifb) or the terminal")
                .args(render_args()),
        )
}

/// Build the configuration from parsed arguments. Options may be given either
/// at the top level or after the `render` subcommand.
pub fn handle_clap_matches(matches: &ArgMatches) -> DioramaConfig {
    let matches = match matches.subcommand() {
        Some(("render", sub_matches)) => sub_matches,
        _ => matches,
    };
    let mut config = DioramaConfig::default();

    if let Some(mode) = matches.get_one::<String>("mode") {
        config.host.target = match mode.as_str() {
            "terminal" | "t" => DisplayTarget::Terminal,
            _ => DisplayTarget::Window,
        };
    }
    if let Some(&width) = matches.get_one::<usize>("width") {
        config.renderer.width = width;
    }
    if let Some(&height) = matches.get_one::<usize>("height") {
        config.renderer.height = height;
    }
    if let Some(assets) = matches.get_one::<String>("assets") {
        config.host.assets = PathBuf::from(assets);
    }
    config.host.seed = matches.get_one::<u64>("seed").copied();
    if matches.get_flag("round-star-count") {
        config.stars.inclusive_bound = false;
    }
    if matches.get_flag("time-scaled") {
        config.clock = config::AnimationClock::Elapsed {
            reference_fps: config.host.target_fps as f32,
        };
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.host.log_level = level.parse().unwrap_or(LevelFilter::Info);
    }
    config
}

/// Log to the console in window mode; to [`LOG_FILE`] when the terminal is the canvas.
pub fn init_logging(target: DisplayTarget, level: LevelFilter) -> Result<()> {
    match target {
        DisplayTarget::Window => TermLogger::init(
            level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )?,
        DisplayTarget::Terminal => {
            WriteLogger::init(level, Config::default(), File::create(LOG_FILE)?)?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnimationClock;

    fn parse(args: &[&str]) -> DioramaConfig {
        handle_clap_matches(&create_clap_command().get_matches_from(args))
    }

    #[test]
    fn no_arguments_gives_the_defaults() {
        assert_eq!(parse(&["orbit_diorama"]), DioramaConfig::default());
    }

    #[test]
    fn render_subcommand_takes_the_same_options() {
        let cfg = parse(&[
            "orbit_diorama",
            "render",
            "--mode",
            "t",
            "--assets",
            "maps",
            "--seed",
            "9",
            "--round-star-count",
        ]);
        assert_eq!(cfg.host.target, DisplayTarget::Terminal);
        assert_eq!(cfg.host.assets, PathBuf::from("maps"));
        assert_eq!(cfg.host.seed, Some(9));
        assert_eq!(cfg.stars.point_count(), 10_000);
    }

    #[test]
    fn top_level_options_override_defaults() {
        let cfg = parse(&[
            "orbit_diorama",
            "--width",
            "640",
            "--height",
            "480",
            "--time-scaled",
            "--log-level",
            "debug",
        ]);
        assert_eq!((cfg.renderer.width, cfg.renderer.height), (640, 480));
        assert_eq!(
            cfg.clock,
            AnimationClock::Elapsed {
                reference_fps: 60.0
            }
        );
        assert_eq!(cfg.host.log_level, LevelFilter::Debug);
        assert_eq!(cfg.host.target, DisplayTarget::Window);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(create_clap_command()
            .try_get_matches_from(["orbit_diorama", "--mode", "video"])
            .is_err());
    }

    #[test]
    fn stats_report_at_most_once_per_second() {
        let mut stats = FrameStats::new();
        assert!(!stats.update(Duration::from_millis(16)));
        stats.fps_update_timer = Instant::now() - Duration::from_secs(2);
        assert!(stats.update(Duration::from_millis(20)));
        assert!(stats.current_fps > 0.0);
        assert!(stats.to_string().starts_with("FPS:"));
        assert!(!stats.update(Duration::from_millis(16)));
    }
}
