use winit::event::WindowEvent;

use super::ctx::{FrameCtx, StartCtx};
use crate::render::RenderCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by the runtime.
///
/// Callbacks run on the event loop thread in a fixed order: `on_start` once,
/// then `on_window_event` / `on_frame` interleaved, then `on_exit` once.
pub trait App {
    /// Called once the window and device are ready, before the first frame.
    /// An error aborts startup and is returned from `Runtime::run`.
    fn on_start(&mut self, ctx: &mut StartCtx<'_>) -> anyhow::Result<()>;

    /// Called for every window event, after input translation.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called after the device went idle, before it is torn down.
    fn on_exit(&mut self, ctx: &RenderCtx<'_>) {
        let _ = ctx;
    }
}
