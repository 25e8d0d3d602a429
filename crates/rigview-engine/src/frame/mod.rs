//! Frame orchestration.
//!
//! Each frame slot cycles `Idle -> Acquiring -> Recording -> Submitted ->
//! Presenting -> Idle`, slots taken round-robin. The state machine in
//! [`FrameOrchestrator`] is generic over a [`FrameBackend`]; the production
//! backend is [`SurfaceBackend`] on top of a wgpu surface.
//!
//! The per-slot fence wait before recording is the only back-pressure point:
//! at most `slot_count` frames are ever outstanding on the GPU.

mod backend;
mod orchestrator;
mod wgpu_backend;

pub use backend::{AcquiredImage, FrameBackend, FrameError, PresentOutcome, SlotState};
pub use orchestrator::{Frame, FrameConfig, FrameOrchestrator};
pub use wgpu_backend::{FrameCommands, SurfaceBackend, DEPTH_FORMAT};

/// Orchestrator over the window surface.
pub type SurfaceFrames<'w> = FrameOrchestrator<SurfaceBackend<'w>>;

/// Frame begun on the window surface.
pub type SurfaceFrame<'w> = Frame<SurfaceBackend<'w>>;
