// ABOUTME: Main GPU renderer using wgpu.
// ABOUTME: Presents the simulated screen through the CRT pass into the window surface.

use std::sync::Arc;
use std::time::Instant;
use winit::window::Window;

use vcrt_core::{Config, EffectSettings, Palette, Point};

use crate::crt_pipeline::CrtPipeline;
use crate::gpu::GpuState;
use crate::line_pipeline::LinePipeline;
use crate::scene::{SceneTexture, SCENE_FORMAT};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("No compatible GPU adapter found")]
    NoAdapter,

    #[error("Failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("Surface reports no supported formats")]
    IncompatibleSurface,

    #[error("Scene upload has {actual} bytes, expected {expected}")]
    SceneSize { expected: usize, actual: usize },
}

pub struct Renderer {
    gpu: GpuState,
    scene: SceneTexture,
    background: wgpu::Color,
    line_pipeline: LinePipeline,
    crt_pipeline: CrtPipeline,
    crt_bind_group: wgpu::BindGroup,
    effects: EffectSettings,
    draw_lines: bool,
    last_frame: Instant,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, config: &Config) -> Result<Self, RenderError> {
        let gpu = GpuState::new(window).await?;

        let scene = SceneTexture::new(
            &gpu.device,
            config.resolution.width,
            config.resolution.height,
        );
        let line_pipeline = LinePipeline::new(
            &gpu.device,
            SCENE_FORMAT,
            scene.size(),
            config.palette.secondary.to_f32(),
            config.line_width,
        );
        let crt_pipeline = CrtPipeline::new(&gpu.device, gpu.config.format);
        let crt_bind_group = crt_pipeline.create_bind_group(&gpu.device, scene.view());

        let (width, height) = scene.size();
        tracing::info!("Renderer initialized, scene {}x{}", width, height);

        Ok(Self {
            gpu,
            scene,
            background: background_color(&config.palette),
            line_pipeline,
            crt_pipeline,
            crt_bind_group,
            effects: config.effects,
            draw_lines: false,
            last_frame: Instant::now(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.gpu.size
    }

    pub fn scene_size(&self) -> (u32, u32) {
        self.scene.size()
    }

    /// Replace the scene with a composed RGBA8 image of the scene's size
    pub fn upload_scene(&mut self, rgba: &[u8]) -> Result<(), RenderError> {
        let expected = self.scene.byte_len();
        if rgba.len() != expected {
            return Err(RenderError::SceneSize {
                expected,
                actual: rgba.len(),
            });
        }
        self.scene.upload(&self.gpu.queue, rgba);
        self.draw_lines = false;
        Ok(())
    }

    /// Redraw the scene from a line list on the next `render`
    pub fn set_lines(&mut self, lines: impl Iterator<Item = (Point, Point)>) {
        self.line_pipeline.prepare(&self.gpu.queue, lines);
        self.draw_lines = true;
    }

    pub fn render(&mut self) -> Result<(), RenderError> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.crt_pipeline.update(
            &self.gpu.queue,
            self.gpu.size,
            self.scene.size(),
            dt,
            &self.effects,
        );

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("Surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let screen_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        if self.draw_lines {
            let mut pass = clear_pass(&mut encoder, "line pass", self.scene.view(), self.background);
            self.line_pipeline.render(&mut pass);
        }
        {
            let mut pass = clear_pass(&mut encoder, "crt pass", &screen_view, wgpu::Color::BLACK);
            self.crt_pipeline.render(&mut pass, &self.crt_bind_group);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// A single-attachment pass that starts from `clear`
fn clear_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
    clear: wgpu::Color,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
        })],
        ..Default::default()
    })
}

/// Palette background as a linear clear color for the sRGB scene texture
fn background_color(palette: &Palette) -> wgpu::Color {
    let [r, g, b] = palette.primary.to_f32().map(srgb_to_linear);
    wgpu::Color {
        r: f64::from(r),
        g: f64::from(g),
        b: f64::from(b),
        a: 1.0,
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcrt_core::Color;

    #[test]
    fn srgb_endpoints_are_fixed() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!(srgb_to_linear(0.5) < 0.5);
    }

    #[test]
    fn background_follows_primary() {
        let palette = Palette {
            primary: Color::WHITE,
            secondary: Color::GREEN,
        };
        let color = background_color(&palette);
        assert!((color.r - 1.0).abs() < 1e-6);
        assert_eq!(color.a, 1.0);
    }
}
