// ABOUTME: GPU presentation of the simulated screen.
// ABOUTME: Uploads the accumulated image or legacy lines and applies the CRT pass.

mod crt_pipeline;
mod gpu;
mod line_pipeline;
pub mod renderer;
mod scene;

pub use renderer::{RenderError, Renderer};
