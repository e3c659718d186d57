// ABOUTME: Command-line flags for vector-crt.
// ABOUTME: Flags override values loaded from the TOML config.

use std::path::PathBuf;

use clap::Parser;
use vcrt_core::{Color, Config, DisplayMode, Motion, Resolution};

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "vector-crt")]
#[command(about = "Vector display emulator driven through a named pipe", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the user config dir, then built-in defaults)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Window size in logical pixels
    #[arg(long, num_args = 2, value_names = ["W", "H"])]
    pub window: Option<Vec<u32>>,

    #[arg(long)]
    pub fullscreen: bool,

    /// Simulated screen resolution
    #[arg(long, num_args = 2, value_names = ["W", "H"])]
    pub resolution: Option<Vec<u32>>,

    /// Background color as RRGGBB
    #[arg(long, value_name = "HEX")]
    pub primary: Option<Color>,

    /// Beam color as RRGGBB
    #[arg(long, value_name = "HEX")]
    pub secondary: Option<Color>,

    /// Line thickness in the legacy display
    #[arg(long, value_name = "N")]
    pub line_width: Option<f32>,

    /// Beam radius in pixels
    #[arg(long, value_name = "R")]
    pub radius: Option<f32>,

    /// Glow lost per frame by pixels the beam is not on
    #[arg(long, value_name = "F")]
    pub dim_factor: Option<f32>,

    #[arg(long, value_name = "N")]
    pub instructions_per_frame: Option<u32>,

    /// Target frame rate, 0 for uncapped
    #[arg(long, value_name = "N")]
    pub frame_rate: Option<u32>,

    /// Use the line-list display instead of the beam
    #[arg(long)]
    pub legacy: bool,

    /// Instruction pipe path
    #[arg(long, value_name = "PATH")]
    pub pipe: Option<PathBuf>,

    /// Write input and frame events to this pipe
    #[arg(long, value_name = "PATH")]
    pub event_pipe: Option<PathBuf>,

    /// Play a recorded instruction file instead of reading the pipe
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Move the beam at this many pixels per second instead of snapping
    #[arg(long, value_name = "S")]
    pub movement_speed: Option<f32>,

    /// Disable the CRT post-processing
    #[arg(long)]
    pub no_crt: bool,
}

impl Cli {
    /// Merge flags over a loaded config
    pub fn apply(&self, config: &mut Config) {
        if let Some(size) = pair(&self.window) {
            config.window = size;
        }
        if self.fullscreen {
            config.fullscreen = true;
        }
        if let Some(size) = pair(&self.resolution) {
            config.resolution = size;
        }
        if let Some(color) = self.primary {
            config.palette.primary = color;
        }
        if let Some(color) = self.secondary {
            config.palette.secondary = color;
        }
        if let Some(width) = self.line_width {
            config.line_width = width;
        }
        if let Some(radius) = self.radius {
            config.gun.radius = radius;
        }
        if let Some(dim) = self.dim_factor {
            config.gun.dim_factor = dim;
        }
        if let Some(n) = self.instructions_per_frame {
            config.executor.instructions_per_frame = n;
        }
        if let Some(rate) = self.frame_rate {
            config.executor.frame_rate = rate;
        }
        if self.legacy {
            config.mode = DisplayMode::Legacy;
        }
        if let Some(path) = &self.pipe {
            config.pipes.instructions = path.clone();
        }
        if let Some(path) = &self.event_pipe {
            config.pipes.events = Some(path.clone());
        }
        if let Some(speed) = self.movement_speed {
            config.gun.motion = Motion::RateLimited { speed };
        }
        if self.no_crt {
            config.effects.enabled = false;
        }
    }
}

// clap enforces exactly two values
fn pair(values: &Option<Vec<u32>>) -> Option<Resolution> {
    match values.as_deref() {
        Some(&[width, height]) => Some(Resolution::new(width, height)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vector-crt").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn no_flags_keep_config() {
        let mut config = Config::default();
        parse(&[]).apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn flags_override_config() {
        let cli = parse(&[
            "--resolution",
            "320",
            "200",
            "--window",
            "800",
            "600",
            "--secondary",
            "#FFB300",
            "--radius",
            "3.5",
            "--instructions-per-frame",
            "1000",
            "--frame-rate",
            "0",
            "--legacy",
            "--pipe",
            "/tmp/other_pipe",
            "--no-crt",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.resolution, Resolution::new(320, 200));
        assert_eq!(config.window, Resolution::new(800, 600));
        assert_eq!(config.palette.secondary, Color::AMBER);
        assert_eq!(config.gun.radius, 3.5);
        assert_eq!(config.executor.instructions_per_frame, 1000);
        assert_eq!(config.executor.frame_rate, 0);
        assert_eq!(config.mode, DisplayMode::Legacy);
        assert_eq!(config.pipes.instructions, PathBuf::from("/tmp/other_pipe"));
        assert!(!config.effects.enabled);
    }

    #[test]
    fn movement_speed_selects_rate_limited_motion() {
        let mut config = Config::default();
        parse(&["--movement-speed", "400"]).apply(&mut config);
        assert_eq!(config.gun.motion, Motion::RateLimited { speed: 400.0 });
    }

    #[test]
    fn bad_input_is_rejected() {
        assert!(Cli::try_parse_from(["vector-crt", "--resolution", "320"]).is_err());
        assert!(Cli::try_parse_from(["vector-crt", "--primary", "green"]).is_err());
        assert!(Cli::try_parse_from(["vector-crt", "--bogus"]).is_err());
    }
}
