use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use engine::{AudioTrack, EngineContext, SlotRole};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::gpu::{FrameRenderer, GpuContext, WgpuPrograms};
use crate::keyboard::LiveKeyboard;
use crate::status::{OverlayVisibility, StatusLine};
use crate::types::RendererConfig;

enum FrameStatus {
    Presented,
    Quit,
}

/// Editor window state. Field order is drop order: everything holding GPU
/// resources goes before the window the surface was created from.
struct EditorWindow<A: AudioTrack> {
    engine: EngineContext<WgpuPrograms, A>,
    frame: FrameRenderer,
    gpu: GpuContext,
    keyboard: LiveKeyboard,
    overlays: OverlayVisibility,
    status: StatusLine<std::io::Stdout>,
    cursor_x: f64,
    pending_seek: Option<f64>,
    last_frame_at: Instant,
    window: Arc<Window>,
}

impl<A: AudioTrack> EditorWindow<A> {
    fn new(window: Arc<Window>, config: &RendererConfig, audio: A) -> Result<Self> {
        let gpu = GpuContext::new(window.as_ref(), window.inner_size(), config.vsync)?;
        let programs = WgpuPrograms::new(&gpu.device, gpu.surface_format)
            .context("failed to prepare shader programs")?;
        let frame = FrameRenderer::new(&gpu, &programs);
        let now = Instant::now();
        let engine = EngineContext::bootstrap(programs, audio, config.engine.clone(), now)
            .context("startup shader compilation failed")?;
        let overlays = OverlayVisibility::new(config.engine.display.status_line);

        Ok(Self {
            engine,
            frame,
            gpu,
            keyboard: LiveKeyboard::new(),
            overlays,
            status: StatusLine::stdout(),
            cursor_x: 0.0,
            pending_seek: None,
            last_frame_at: now,
            window,
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        self.frame.resize(&self.gpu, self.engine.reload().compiler());
    }

    fn click(&mut self) {
        if let Some(fraction) = self.overlays.seek_target(self.cursor_x, self.gpu.size.width) {
            self.pending_seek = Some(fraction);
        }
    }

    fn render_frame(&mut self) -> Result<FrameStatus> {
        let now = Instant::now();
        if let Some(fraction) = self.pending_seek.take() {
            let position = self.engine.transport_mut().seek_fraction(fraction);
            tracing::debug!(fraction, position, "seek bar clicked");
        }
        let start = self.engine.begin_frame(&mut self.keyboard, now);
        if start.commands.quit {
            return Ok(FrameStatus::Quit);
        }
        let was_showing_stats = self.overlays.stats;
        self.overlays.apply(start.commands.ui);
        if was_showing_stats && !self.overlays.stats {
            self.status.finish()?;
        }

        let reload = self.engine.reload();
        let rendered = self.frame.render(
            &self.gpu,
            reload.compiler(),
            reload.active(SlotRole::Primary),
            reload.active(SlotRole::PostProcess),
            self.engine.transport().position(),
        );
        match rendered {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow!("surface out of memory"));
            }
            Err(err) => {
                tracing::warn!(error = %err, "surface error; retrying next frame");
            }
        }

        let frame_ms = now.saturating_duration_since(self.last_frame_at).as_millis();
        self.last_frame_at = now;
        let report = self.engine.end_frame(u32::try_from(frame_ms).unwrap_or(u32::MAX));
        if self.overlays.stats {
            self.status.show(&report)?;
        }
        Ok(FrameStatus::Presented)
    }

    fn shutdown(mut self) {
        if let Err(err) = self.status.finish() {
            tracing::debug!(error = %err, "failed to terminate status line");
        }
        let (programs, _audio) = self.engine.shutdown();
        tracing::info!(live_programs = programs.live_programs(), "editor shut down");
    }
}

/// Opens the editor window and drives the engine once per redraw until the
/// window closes or Escape is pressed.
pub(crate) fn run_window<A: AudioTrack>(config: RendererConfig, audio: A) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(PhysicalSize::new(config.surface_size.0, config.surface_size.1))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create editor window: {err}"))?;
    let window = Arc::new(window);

    let mut state = Some(EditorWindow::new(window, &config, audio)?);
    let mut result = Ok(());

    let run_result = event_loop.run(|event, elwt| {
        let Some(editor) = state.as_mut() else {
            return;
        };
        match event {
            Event::WindowEvent { window_id, event } if window_id == editor.window.id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        elwt.exit();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        editor.keyboard.handle_event(&event);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        editor.cursor_x = position.x;
                    }
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    } => {
                        editor.click();
                    }
                    WindowEvent::Focused(false) => {
                        editor.keyboard.reset();
                    }
                    WindowEvent::Resized(new_size) => {
                        editor.resize(new_size);
                    }
                    WindowEvent::RedrawRequested => match editor.render_frame() {
                        Ok(FrameStatus::Presented) => {}
                        Ok(FrameStatus::Quit) => {
                            tracing::info!("quit requested");
                            elwt.exit();
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "render loop failed");
                            result = Err(err);
                            elwt.exit();
                        }
                    },
                    _ => {}
                }
            }
            Event::AboutToWait => {
                editor.window.request_redraw();
                elwt.set_control_flow(ControlFlow::Poll);
            }
            Event::LoopExiting => {
                if let Some(editor) = state.take() {
                    editor.shutdown();
                }
            }
            _ => {}
        }
    });

    if let Err(err) = run_result {
        result = Err(anyhow!("window event loop error: {err}"));
    }
    if let Some(editor) = state.take() {
        editor.shutdown();
    }
    result
}
