// ABOUTME: Electron gun simulation and the afterglow frame accumulator.
// ABOUTME: Everything here runs on the render thread and needs no locking.

pub mod accumulator;
pub mod framebuffer;
pub mod gun;
pub mod legacy;
pub mod processor;
pub mod timing;
pub mod trace;

pub use accumulator::FrameAccumulator;
pub use framebuffer::{DoubleBuffer, FrameBuffer, Texel};
pub use gun::ElectronGun;
pub use legacy::LegacyDisplay;
pub use processor::{Display, LegacyProcessor, TickReport, VectorProcessor};
pub use timing::{FramePacer, FrameSample, FrameStats};
pub use trace::{PositionSample, PositionTrace};
