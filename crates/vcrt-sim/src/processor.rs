// ABOUTME: Per-tick instruction processing for both display modes.
// ABOUTME: Applies a drained batch to the gun/trace/accumulator or to the legacy line list.

use std::time::{Duration, Instant};

use vcrt_core::{Command, Config, DisplayMode, Instruction, InstructionSet, Point};

use crate::accumulator::FrameAccumulator;
use crate::gun::ElectronGun;
use crate::legacy::LegacyDisplay;
use crate::trace::PositionTrace;

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// Instructions applied
    pub executed: usize,
    /// Unknown instructions that were skipped
    pub skipped: usize,
    pub clears: usize,
    pub instruction_time: Duration,
    pub accumulate_time: Duration,
}

pub struct VectorProcessor {
    gun: ElectronGun,
    trace: PositionTrace,
    accumulator: FrameAccumulator,
}

impl VectorProcessor {
    pub fn new(config: &Config) -> Self {
        Self {
            gun: ElectronGun::new(&config.gun),
            trace: PositionTrace::new(config.executor.instructions_per_frame as usize),
            accumulator: FrameAccumulator::new(
                config.resolution.width as usize,
                config.resolution.height as usize,
                &config.palette,
            ),
        }
    }

    pub fn gun(&self) -> &ElectronGun {
        &self.gun
    }

    pub fn trace(&self) -> &PositionTrace {
        &self.trace
    }

    pub fn accumulator(&self) -> &FrameAccumulator {
        &self.accumulator
    }

    /// Apply a batch, then run one accumulation pass.
    /// Each instruction advances the gun by an equal share of `delta`.
    pub fn tick(&mut self, instructions: &[Instruction], delta: f32) -> TickReport {
        let mut report = TickReport::default();
        let started = Instant::now();

        self.trace.begin_tick();
        if instructions.is_empty() {
            self.gun.update(delta);
        } else {
            let step = delta / instructions.len() as f32;
            for &instruction in instructions {
                match InstructionSet::Vector.interpret(instruction) {
                    Command::Clear => {
                        self.accumulator.clear();
                        report.clears += 1;
                    }
                    Command::SetTarget { x, y } => self.gun.aim(Point::from((x, y))),
                    Command::PowerOn => self.gun.power_on(),
                    Command::PowerOff => self.gun.power_off(),
                    Command::Unknown { opcode } => {
                        tracing::warn!(opcode, data = instruction.data, "Skipping unknown instruction");
                        report.skipped += 1;
                        continue;
                    }
                    other => {
                        tracing::warn!(?other, "Instruction not valid in vector mode");
                        report.skipped += 1;
                        continue;
                    }
                }
                self.gun.update(step);
                self.trace.push(self.gun.sample());
                report.executed += 1;
                tracing::trace!(?instruction, position = ?self.gun.position(), "Applied instruction");
            }
        }
        report.instruction_time = started.elapsed();

        let started = Instant::now();
        self.accumulator.accumulate(&self.gun, &self.trace);
        report.accumulate_time = started.elapsed();

        report
    }
}

#[derive(Debug, Default)]
pub struct LegacyProcessor {
    display: LegacyDisplay,
}

impl LegacyProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(&self) -> &LegacyDisplay {
        &self.display
    }

    pub fn tick(&mut self, instructions: &[Instruction]) -> TickReport {
        let mut report = TickReport::default();
        let started = Instant::now();

        for &instruction in instructions {
            match InstructionSet::Legacy.interpret(instruction) {
                Command::Clear => {
                    self.display.clear();
                    report.clears += 1;
                }
                Command::SetPoint { x, y } => {
                    if !self.display.add_point(Point::from((x, y))) {
                        tracing::warn!(x, y, "Legacy point list full, dropping point");
                    }
                }
                other => {
                    tracing::warn!(?other, data = instruction.data, "Skipping unknown instruction");
                    report.skipped += 1;
                    continue;
                }
            }
            report.executed += 1;
        }

        report.instruction_time = started.elapsed();
        report
    }
}

/// The active display, chosen once at startup
pub enum Display {
    Vector(VectorProcessor),
    Legacy(LegacyProcessor),
}

impl Display {
    pub fn new(config: &Config) -> Self {
        match config.mode {
            DisplayMode::Vector => Display::Vector(VectorProcessor::new(config)),
            DisplayMode::Legacy => Display::Legacy(LegacyProcessor::new()),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        match self {
            Display::Vector(_) => DisplayMode::Vector,
            Display::Legacy(_) => DisplayMode::Legacy,
        }
    }

    pub fn tick(&mut self, instructions: &[Instruction], delta: f32) -> TickReport {
        match self {
            Display::Vector(processor) => processor.tick(instructions, delta),
            Display::Legacy(processor) => processor.tick(instructions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcrt_core::{Color, Resolution};

    fn config(radius: f32) -> Config {
        let mut config = Config::default();
        config.resolution = Resolution::new(64, 64);
        config.gun.radius = radius;
        config.gun.dim_factor = 0.1;
        config.palette.primary = Color::BLACK;
        config
    }

    #[test]
    fn unknown_opcode_is_skipped_without_side_effects() {
        let mut processor = VectorProcessor::new(&config(1.0));
        let report = processor.tick(&[Instruction::new(9, 0xDEAD_BEEF)], 0.016);

        assert_eq!(report.skipped, 1);
        assert_eq!(report.executed, 0);
        assert!(processor.trace().is_empty());
        assert_eq!(processor.gun().target(), Point::ZERO);
        assert!(!processor.gun().is_powered_on());
        assert_eq!(processor.accumulator().current_index(), 0);
    }

    #[test]
    fn one_sample_per_applied_instruction() {
        let mut processor = VectorProcessor::new(&config(1.0));
        let batch = [
            Instruction::set_target(1, 1),
            Instruction::new(200, 0),
            Instruction::power_on(),
            Instruction::set_target(5, 1),
        ];
        let report = processor.tick(&batch, 0.016);
        assert_eq!(report.executed, 3);
        assert_eq!(processor.trace().len(), 3);
    }

    #[test]
    fn trace_is_capped_by_instructions_per_frame() {
        let mut config = config(1.0);
        config.executor.instructions_per_frame = 4;
        let mut processor = VectorProcessor::new(&config);
        let batch: Vec<_> = (0..10).map(|i| Instruction::set_target(i, 0)).collect();
        processor.tick(&batch, 0.016);
        assert_eq!(processor.trace().len(), 4);
    }

    #[test]
    fn dark_screen_stays_at_floor() {
        let mut processor = VectorProcessor::new(&config(2.0));
        for _ in 0..100 {
            processor.tick(&[], 0.016);
        }
        let frame = processor.accumulator().current();
        assert!(frame.texels().iter().all(|t| t[3] == 0.0));
    }

    #[test]
    fn draws_a_powered_stroke() {
        let mut processor = VectorProcessor::new(&config(1.0));
        let batch = [
            Instruction::set_target(10, 10),
            Instruction::power_on(),
            Instruction::set_target(20, 10),
        ];
        processor.tick(&batch, 0.016);

        let frame = processor.accumulator().current();
        for x in 10..=20 {
            assert_eq!(frame.alpha(x, 10), 1.0, "x = {x}");
        }
        assert_eq!(frame.alpha(15, 50), 0.0);
    }

    #[test]
    fn three_clears_flip_parity() {
        let mut processor = VectorProcessor::new(&config(1.0));
        let initial = processor.accumulator().current_index();
        let batch = [Instruction::clear(); 3];
        let report = processor.tick(&batch, 0.016);

        assert_eq!(report.clears, 3);
        assert_eq!(processor.accumulator().current_index(), initial ^ 1);
        let buffers = processor.accumulator().buffers();
        assert!(!buffers.is_reset_pending(0));
        assert!(!buffers.is_reset_pending(1));
    }

    #[test]
    fn stroke_continues_across_ticks() {
        let mut processor = VectorProcessor::new(&config(1.0));
        processor.tick(
            &[
                Instruction::set_target(10, 30),
                Instruction::power_on(),
                Instruction::set_target(20, 30),
            ],
            0.016,
        );
        processor.tick(&[Instruction::set_target(40, 30)], 0.016);

        let frame = processor.accumulator().current();
        assert_eq!(frame.alpha(30, 30), 1.0);
    }

    #[test]
    fn rate_limited_gun_travels_over_the_tick() {
        let mut config = config(1.0);
        config.gun.motion = vcrt_core::Motion::RateLimited { speed: 100.0 };
        let mut processor = VectorProcessor::new(&config);

        processor.tick(&[Instruction::set_target(50, 0)], 0.1);
        assert!((processor.gun().position().x - 10.0).abs() < 1e-3);

        // No input still lets the beam keep moving
        processor.tick(&[], 0.1);
        assert!((processor.gun().position().x - 20.0).abs() < 1e-3);
    }

    #[test]
    fn legacy_processor_builds_line_list() {
        let mut processor = LegacyProcessor::new();
        let batch = [
            Instruction::set_target(0, 0),
            Instruction::set_target(10, 10),
            Instruction::power_on(),
        ];
        let report = processor.tick(&batch);
        assert_eq!(report.executed, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(processor.display().lines().count(), 1);

        processor.tick(&[Instruction::clear()]);
        assert!(processor.display().is_empty());
    }

    #[test]
    fn display_follows_mode() {
        let mut config = config(1.0);
        assert_eq!(Display::new(&config).mode(), DisplayMode::Vector);
        config.mode = DisplayMode::Legacy;
        assert_eq!(Display::new(&config).mode(), DisplayMode::Legacy);
    }
}
