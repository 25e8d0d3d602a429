use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::camera::CursorMode;
use crate::core::{App as CoreApp, AppControl, FrameCtx, StartCtx};
use crate::device::{Gpu, GpuInit};
use crate::frame::{FrameConfig, FrameOrchestrator, SurfaceBackend, SurfaceFrames};
use crate::input::platform::{translate_device_event, translate_window_event};
use crate::input::{InputFrame, InputSnapshot, InputState};
use crate::time::FrameClock;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "rigview".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Runtime context passed to the application.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn set_cursor_mode(&mut self, mode: CursorMode) {
        self.commands.push(Command::SetCursorMode(mode));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }
}

enum Command {
    SetCursorMode(CursorMode),
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, brings up the device and drives `app` until the
    /// window closes or the app asks to exit.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, frame_config: FrameConfig, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, frame_config, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,
    cursor_mode: CursorMode,

    window: Window,

    #[borrows(window)]
    #[covariant]
    frames: SurfaceFrames<'this>,
}

fn create_frames<'w>(window: &'w Window, gpu_init: GpuInit, config: FrameConfig) -> Result<SurfaceFrames<'w>> {
    let gpu = pollster::block_on(Gpu::new(window, gpu_init)).context("GPU initialization failed")?;
    Ok(FrameOrchestrator::new(SurfaceBackend::new(gpu), config))
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    frame_config: FrameConfig,
    app: A,

    entry: Option<WindowEntry>,
    exit_requested: bool,
    error: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, frame_config: FrameConfig, app: A) -> Self {
        Self {
            config,
            gpu_init,
            frame_config,
            app,
            entry: None,
            exit_requested: false,
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let frame_config = self.frame_config;

        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::default(),
            cursor_mode: CursorMode::Normal,
            window,
            frames_builder: |w| create_frames(w, gpu_init, frame_config),
        }
        .try_build()?;

        let app = &mut self.app;
        entry.with(|fields| {
            let mut ctx = StartCtx {
                window: fields.window,
                render: fields.frames.backend().render_ctx(),
            };
            app.on_start(&mut ctx)
        })?;

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        self.request_exit(event_loop);
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        self.shutdown();
        event_loop.exit();
    }

    /// Waits for the device, lets the app release its objects, then drops the
    /// surface before the window.
    fn shutdown(&mut self) {
        let Some(mut entry) = self.entry.take() else {
            return;
        };
        entry.with_frames_mut(|frames| {
            if let Err(e) = frames.wait_idle() {
                log::error!("wait for idle device failed: {e}");
            }
        });
        let app = &mut self.app;
        entry.with_frames(|frames| app.on_exit(&frames.backend().render_ctx()));
        drop(entry);
        log::info!("shut down");
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let mut runtime_ctx = RuntimeCtx::default();
        let app = &mut self.app;

        let control = entry.with_mut(|fields| {
            let time = fields.clock.tick();
            let input = InputSnapshot::capture(fields.input_state, fields.input_frame);

            let control = {
                let mut ctx = FrameCtx {
                    window: fields.window,
                    frames: fields.frames,
                    input: &input,
                    time,
                    runtime: &mut runtime_ctx,
                };
                app.on_frame(&mut ctx)
            };

            // Per-tick deltas are consumed by this frame.
            fields.input_frame.clear();
            control
        });

        if control == AppControl::Exit {
            runtime_ctx.exit();
        }
        self.apply_commands(event_loop, runtime_ctx);
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop, mut ctx: RuntimeCtx) {
        for cmd in ctx.commands.drain(..) {
            match cmd {
                Command::SetCursorMode(mode) => {
                    if let Some(entry) = self.entry.as_mut() {
                        entry.with_mut(|fields| {
                            if *fields.cursor_mode != mode {
                                apply_cursor_mode(fields.window, mode);
                                *fields.cursor_mode = mode;
                            }
                        });
                    }
                }
                Command::Exit => self.exit_requested = true,
            }
        }

        if self.exit_requested {
            self.request_exit(event_loop);
        }
    }
}

fn apply_cursor_mode(window: &Window, mode: CursorMode) {
    match mode {
        CursorMode::Locked => {
            // Locked is unsupported on some platforms (X11, Windows); confine instead.
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                log::warn!("cursor grab unavailable: {e}");
            }
            window.set_cursor_visible(false);
        }
        CursorMode::Normal => {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                log::warn!("cursor release failed: {e}");
            }
            window.set_cursor_visible(true);
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e.context("startup failed"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: the camera may move every tick.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return;
        };

        let control = entry.with_mut(|fields| {
            if let Some(ev) = translate_window_event(fields.window, &event) {
                fields.input_state.apply_event(fields.input_frame, ev);
            }
            app.on_window_event(&event)
        });

        if control == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.request_exit(event_loop),

            WindowEvent::Resized(size) => {
                entry.with_frames_mut(|frames| frames.resize(size.width, size.height));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = entry.with_window(|w| w.inner_size());
                entry.with_frames_mut(|frames| frames.resize(size.width, size.height));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::Focused(false) => {
                // Focus loss drops the grab at the OS level; keep our state in step.
                entry.with_mut(|fields| {
                    if *fields.cursor_mode == CursorMode::Locked {
                        apply_cursor_mode(fields.window, CursorMode::Normal);
                        *fields.cursor_mode = CursorMode::Normal;
                    }
                });
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        // Raw motion only feeds the camera while the pointer is captured.
        entry.with_mut(|fields| {
            if *fields.cursor_mode != CursorMode::Locked {
                return;
            }
            if let Some(ev) = translate_device_event(&event) {
                fields.input_state.apply_event(fields.input_frame, ev);
            }
        });
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}
