// ABOUTME: Application configuration handling.
// ABOUTME: Loads settings from TOML config files and validates them before startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{EffectSettings, InstructionSet, Palette};

/// Width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Display mode, fixed for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Electron gun with afterglow accumulation
    #[default]
    Vector,
    /// Flat line list redrawn every frame
    Legacy,
}

impl DisplayMode {
    pub fn instruction_set(self) -> InstructionSet {
        match self {
            DisplayMode::Vector => InstructionSet::Vector,
            DisplayMode::Legacy => InstructionSet::Legacy,
        }
    }
}

/// How the beam travels from its position to its target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum Motion {
    /// Beam snaps to the target on every update
    #[default]
    Instant,
    /// Beam moves toward the target at `speed` pixels per second
    RateLimited { speed: f32 },
}

/// Electron gun settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GunSettings {
    /// Beam radius in pixels
    pub radius: f32,
    /// Glow lost per frame for pixels the beam is not on
    pub dim_factor: f32,
    pub motion: Motion,
}

impl Default for GunSettings {
    fn default() -> Self {
        Self {
            radius: 2.0,
            dim_factor: 0.08,
            motion: Motion::Instant,
        }
    }
}

/// Instruction execution settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorSettings {
    pub instructions_per_frame: u32,
    /// Target frame rate; 0 runs uncapped
    pub frame_rate: u32,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            instructions_per_frame: 500,
            frame_rate: 60,
        }
    }
}

/// Named pipe locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeSettings {
    /// Instructions are read from this FIFO
    pub instructions: PathBuf,
    /// Input and frame events are written to this FIFO when set
    pub events: Option<PathBuf>,
}

impl Default for PipeSettings {
    fn default() -> Self {
        Self {
            instructions: PathBuf::from("/tmp/vcrt_pipe"),
            events: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window dimensions
    pub window: Resolution,
    pub fullscreen: bool,

    /// Size of the simulated screen (accumulation buffers)
    pub resolution: Resolution,

    pub palette: Palette,
    pub gun: GunSettings,
    pub executor: ExecutorSettings,
    pub pipes: PipeSettings,
    pub mode: DisplayMode,

    /// Line width for the legacy display
    pub line_width: f32,

    /// CRT post-processing
    pub effects: EffectSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: Resolution::new(1280, 720),
            fullscreen: false,
            resolution: Resolution::new(640, 360),
            palette: Palette::default(),
            gun: GunSettings::default(),
            executor: ExecutorSettings::default(),
            pipes: PipeSettings::default(),
            mode: DisplayMode::default(),
            line_width: 2.0,
            effects: EffectSettings::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Get the default config file path (~/.config/vector-crt/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vector-crt").join("config.toml"))
    }

    /// Load config from a path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from the default path if a file exists there, otherwise defaults.
    /// A file that exists but fails to parse is an error.
    pub fn load_default_or_builtin() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings the display cannot run with.
    /// Degenerate beam settings (radius or dim factor <= 0) are allowed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution.width == 0 || self.resolution.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "resolution must be non-zero, got {}x{}",
                self.resolution.width, self.resolution.height
            )));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.executor.instructions_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "instructions per frame must be at least 1".to_string(),
            ));
        }
        if let Motion::RateLimited { speed } = self.gun.motion {
            if !(speed > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "movement speed must be positive, got {speed}"
                )));
            }
        }
        if !self.gun.radius.is_finite() || !self.gun.dim_factor.is_finite() {
            return Err(ConfigError::Invalid(
                "gun radius and dim factor must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = Config::default();
        config.palette.secondary = Color::AMBER;
        config.gun.motion = Motion::RateLimited { speed: 1500.0 };
        config.pipes.events = Some(PathBuf::from("/tmp/vcrt_events"));
        config.mode = DisplayMode::Legacy;

        let text = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let text = r##"
            mode = "legacy"

            [palette]
            secondary = "#FFB300"

            [gun]
            radius = 3.5
        "##;
        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(config.mode, DisplayMode::Legacy);
        assert_eq!(config.palette.secondary, Color::AMBER);
        assert_eq!(config.palette.primary, Color::SCREEN);
        assert_eq!(config.gun.radius, 3.5);
        assert_eq!(config.gun.dim_factor, GunSettings::default().dim_factor);
        assert_eq!(config.executor, ExecutorSettings::default());
    }

    #[test]
    fn rejects_zero_instructions_per_frame() {
        let mut config = Config::default();
        config.executor.instructions_per_frame = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_resolution() {
        let mut config = Config::default();
        config.resolution = Resolution::new(0, 10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn accepts_degenerate_beam() {
        let mut config = Config::default();
        config.gun.radius = 0.0;
        config.gun.dim_factor = -1.0;
        config.validate().unwrap();
    }

    #[test]
    fn rejects_non_positive_speed() {
        let mut config = Config::default();
        config.gun.motion = Motion::RateLimited { speed: 0.0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_file() {
        let path = std::env::temp_dir().join("vcrt_test_config.toml");
        std::fs::write(&path, "[executor]\nframe_rate = 0\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.executor.frame_rate, 0);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn mode_selects_instruction_set() {
        assert_eq!(DisplayMode::Vector.instruction_set(), InstructionSet::Vector);
        assert_eq!(DisplayMode::Legacy.instruction_set(), InstructionSet::Legacy);
    }
}
