// ABOUTME: winit application driving the per-frame tick.
// ABOUTME: Drains the instruction queue, runs the display, renders, and reports events.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, MouseButton as WinitButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::platform::scancode::PhysicalKeyExtScancode;
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use vcrt_core::{Config, Instruction};
use vcrt_pipe::{Event, EventWriter, Ingest, InstructionQueue, MouseButton, Source};
use vcrt_renderer::Renderer;
use vcrt_sim::{Display, FramePacer, FrameSample, FrameStats};

const TITLE: &str = "vector-crt";

pub struct App {
    config: Config,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    display: Display,
    queue: InstructionQueue,
    ingest: Option<Ingest>,
    events: Option<EventWriter>,
    pacer: FramePacer,
    stats: FrameStats,
    batch: Vec<Instruction>,
    rgba: Vec<u8>,
    queue_was_empty: bool,
    failure: Option<anyhow::Error>,
}

impl App {
    /// Open the instruction source and event pipe, and start ingesting
    pub fn new(config: Config, replay: Option<&Path>) -> Result<Self> {
        let ipf = config.executor.instructions_per_frame as usize;
        let queue = InstructionQueue::for_frame_budget(ipf);

        let source = match replay {
            Some(path) => Source::replay(path)
                .with_context(|| format!("failed to open replay {}", path.display()))?,
            None => Source::pipe(&config.pipes.instructions).with_context(|| {
                format!(
                    "failed to create instruction pipe {}",
                    config.pipes.instructions.display()
                )
            })?,
        };

        let events = match &config.pipes.events {
            Some(path) => Some(
                EventWriter::create(path)
                    .with_context(|| format!("failed to create event pipe {}", path.display()))?,
            ),
            None => None,
        };

        let ingest = Ingest::spawn(source, queue.clone())?;

        Ok(Self {
            display: Display::new(&config),
            pacer: FramePacer::new(config.executor.frame_rate),
            stats: FrameStats::new(),
            batch: Vec::with_capacity(ipf),
            rgba: Vec::new(),
            window: None,
            renderer: None,
            queue,
            ingest: Some(ingest),
            events,
            queue_was_empty: true,
            failure: None,
            config,
        })
    }

    /// The error that ended the event loop, if any
    pub fn finish(mut self) -> Result<()> {
        self.shutdown();
        if let Some(events) = &self.events {
            if events.dropped() > 0 {
                tracing::info!("Dropped {} events with no reader attached", events.dropped());
            }
        }
        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{:#}", error);
        self.failure = Some(error);
        event_loop.exit();
    }

    fn shutdown(&mut self) {
        // The ingest thread must be joined before the queue goes away
        if let Some(ingest) = self.ingest.take() {
            if let Err(e) = ingest.stop() {
                tracing::error!("Ingest thread ended with error: {}", e);
            }
        }
    }

    fn frame(&mut self) -> Result<()> {
        let frame_start = Instant::now();
        let delta = self.pacer.tick_at(frame_start);

        self.batch.clear();
        self.queue.drain_into(
            self.config.executor.instructions_per_frame as usize,
            &mut self.batch,
        );
        let report = self.display.tick(&self.batch, delta);

        let render_start = Instant::now();
        if let Some(renderer) = &mut self.renderer {
            match &self.display {
                Display::Vector(processor) => {
                    processor
                        .accumulator()
                        .compose_rgba8(&self.config.palette, &mut self.rgba);
                    renderer.upload_scene(&self.rgba)?;
                }
                Display::Legacy(processor) => renderer.set_lines(processor.display().lines()),
            }
            renderer.render()?;
        }
        let render = render_start.elapsed();

        self.stats.record(FrameSample {
            total: frame_start.elapsed(),
            instructions: report.instruction_time,
            accumulate: report.accumulate_time,
            render,
            executed: report.executed,
        });
        if let Some(summary) = self.stats.summary_at(Instant::now()) {
            tracing::debug!("{}", summary);
            if let Some(window) = &self.window {
                window.set_title(&format!("{} | {}", TITLE, summary));
            }
        }

        self.report_frame();
        self.check_ingest()
    }

    fn report_frame(&mut self) {
        let empty = self.queue.is_empty();
        let became_empty = empty && !self.queue_was_empty;
        self.queue_was_empty = empty;

        if let Some(events) = &mut self.events {
            events.send(Event::frame_finished());
            if became_empty {
                events.send(Event::instruction_buffer_empty());
            }
        }
    }

    fn check_ingest(&mut self) -> Result<()> {
        let Some(ingest) = &mut self.ingest else {
            return Ok(());
        };
        match ingest.try_join() {
            None => Ok(()),
            Some(Ok(())) => {
                tracing::info!("Instruction source finished");
                self.ingest = None;
                Ok(())
            }
            Some(Err(e)) => {
                self.ingest = None;
                Err(anyhow::Error::new(e).context("instruction ingest failed"))
            }
        }
    }

    fn send_event(&mut self, event: Event) {
        if let Some(events) = &mut self.events {
            events.send(event);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let mut window_attrs = WindowAttributes::default()
            .with_title(TITLE)
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        if self.config.fullscreen {
            window_attrs = window_attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("failed to create window"));
                return;
            }
        };

        let renderer = match pollster::block_on(Renderer::new(Arc::clone(&window), &self.config)) {
            Ok(renderer) => renderer,
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("failed to create renderer"));
                return;
            }
        };

        let physical_size = window.inner_size();
        tracing::info!(
            "Window created: {}x{} physical pixels, scale factor: {}",
            physical_size.width,
            physical_size.height,
            window.scale_factor()
        );

        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.frame() {
                    self.fail(event_loop, e);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(renderer) = &self.renderer {
                    let (x, y) =
                        window_to_scene(position, renderer.window_size(), renderer.scene_size());
                    self.send_event(Event::mouse_moved(x, y));
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = mouse_button(button);
                self.send_event(match state {
                    ElementState::Pressed => Event::mouse_pressed(button),
                    ElementState::Released => Event::mouse_released(button),
                });
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                let Some(scancode) = event.physical_key.to_scancode() else {
                    tracing::trace!("Key without scancode: {:?}", event.physical_key);
                    return;
                };
                self.send_event(match event.state {
                    ElementState::Pressed => Event::key_pressed(scancode),
                    ElementState::Released => Event::key_released(scancode),
                });
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        match self.pacer.next_deadline() {
            Some(deadline) if Instant::now() < deadline => {
                event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
            }
            _ => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
                event_loop.set_control_flow(ControlFlow::Poll);
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

fn mouse_button(button: WinitButton) -> MouseButton {
    match button {
        WinitButton::Left => MouseButton::LEFT,
        WinitButton::Right => MouseButton::RIGHT,
        WinitButton::Middle => MouseButton::MIDDLE,
        WinitButton::Back => MouseButton::BACK,
        WinitButton::Forward => MouseButton::FORWARD,
        WinitButton::Other(code) => MouseButton(u64::from(code)),
    }
}

/// Map a window pixel to the scene pixel under it, following the aspect fit of the CRT pass
fn window_to_scene(
    position: PhysicalPosition<f64>,
    window: (u32, u32),
    scene: (u32, u32),
) -> (u32, u32) {
    let (ww, wh) = (f64::from(window.0.max(1)), f64::from(window.1.max(1)));
    let (sw, sh) = (f64::from(scene.0.max(1)), f64::from(scene.1.max(1)));
    let scale = (ww / sw).min(wh / sh);
    let offset_x = (ww - sw * scale) / 2.0;
    let offset_y = (wh - sh * scale) / 2.0;

    let x = ((position.x - offset_x) / scale).clamp(0.0, sw - 1.0);
    let y = ((position.y - offset_y) / scale).clamp(0.0, sh - 1.0);
    (x as u32, y as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_aspect_scales_directly() {
        let p = PhysicalPosition::new(640.0, 360.0);
        assert_eq!(window_to_scene(p, (1280, 720), (640, 360)), (320, 180));
    }

    #[test]
    fn letterbox_offset_is_removed() {
        // 4:3 scene in a 16:9 window: pillarboxed by 160px on each side
        let p = PhysicalPosition::new(160.0, 0.0);
        assert_eq!(window_to_scene(p, (1280, 720), (640, 480)), (0, 0));
        let p = PhysicalPosition::new(640.0, 360.0);
        assert_eq!(window_to_scene(p, (1280, 720), (640, 480)), (320, 240));
    }

    #[test]
    fn positions_outside_the_scene_clamp_to_the_edge() {
        let p = PhysicalPosition::new(-50.0, 5000.0);
        assert_eq!(window_to_scene(p, (1280, 720), (640, 360)), (0, 359));
    }

    #[test]
    fn other_buttons_keep_their_code() {
        assert_eq!(mouse_button(WinitButton::Left), MouseButton::LEFT);
        assert_eq!(mouse_button(WinitButton::Forward), MouseButton::FORWARD);
        assert_eq!(mouse_button(WinitButton::Other(9)), MouseButton(9));
    }
}
