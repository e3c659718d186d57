// ABOUTME: Shared types and configuration for vector-crt.
// ABOUTME: Defines points, colors, the instruction wire format, and config handling.

pub mod color;
pub mod config;
pub mod effects;
pub mod instruction;
pub mod point;

pub use color::{Color, Palette};
pub use config::{
    Config, ConfigError, DisplayMode, ExecutorSettings, GunSettings, Motion, PipeSettings, Resolution,
};
pub use effects::EffectSettings;
pub use instruction::{Command, Instruction, InstructionSet, INSTRUCTION_SIZE};
pub use point::Point;
