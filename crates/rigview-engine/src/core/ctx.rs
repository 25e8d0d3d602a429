use winit::window::Window;

use crate::camera::CursorMode;
use crate::frame::{FrameCommands, FrameError, SurfaceFrames};
use crate::input::InputSnapshot;
use crate::render::RenderCtx;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Context for [`App::on_start`](super::App::on_start).
pub struct StartCtx<'a> {
    pub window: &'a Window,
    pub render: RenderCtx<'a>,
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by the surface
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub frames: &'a mut SurfaceFrames<'w>,
    /// Input frozen at the start of this tick.
    pub input: &'a InputSnapshot,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_, '_> {
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        self.frames.backend().render_ctx()
    }

    /// Aspect ratio of the current swapchain.
    pub fn aspect_ratio(&self) -> f32 {
        self.render_ctx().aspect_ratio()
    }

    /// Requests a pointer mode; applied after the callback returns.
    pub fn set_cursor_mode(&mut self, mode: CursorMode) {
        self.runtime.set_cursor_mode(mode);
    }

    /// Runs one frame: begins it, calls `draw` with the render context and
    /// the frame's commands, then submits and presents.
    ///
    /// Skipped frames (minimized, stale swapchain, acquire timeout) never call
    /// `draw`. Unrecoverable frame errors return [`AppControl::Exit`].
    pub fn render<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut FrameCommands),
    {
        let mut frame = match self.frames.begin() {
            Ok(Some(frame)) => frame,
            Ok(None) => return AppControl::Continue,
            Err(e) => return frame_error(e),
        };

        {
            let rctx = self.frames.backend().render_ctx();
            draw(&rctx, frame.commands());
        }

        match self.frames.end(frame) {
            Ok(()) => AppControl::Continue,
            Err(e) => frame_error(e),
        }
    }
}

fn frame_error(err: FrameError) -> AppControl {
    if err.is_recoverable() {
        log::debug!("frame skipped: {err}");
        AppControl::Continue
    } else {
        log::error!("frame failed: {err}");
        AppControl::Exit
    }
}
