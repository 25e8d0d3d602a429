use std::fmt;
use std::time::Duration;

/// Per-slot lifecycle, cycled round-robin by the orchestrator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum SlotState {
    #[default]
    Idle,
    Acquiring,
    Recording,
    Submitted,
    Presenting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// The swapchain no longer matches the surface and must be recreated.
    SwapchainStale,
    /// No image became available in time.
    Timeout,
    /// The slot's previous submission did not complete in time.
    FenceTimeout { slot: usize },
    OutOfMemory,
    DeviceLost(String),
    /// A slot was driven out of order.
    InvalidState { slot: usize, expected: SlotState, found: SlotState },
}

impl FrameError {
    /// Recoverable errors cost at most the current frame.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FrameError::SwapchainStale | FrameError::Timeout)
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SwapchainStale => write!(f, "swapchain is out of date"),
            Self::Timeout => write!(f, "timed out acquiring a swapchain image"),
            Self::FenceTimeout { slot } => write!(f, "timed out waiting for frame slot {slot}"),
            Self::OutOfMemory => write!(f, "out of GPU memory"),
            Self::DeviceLost(msg) => write!(f, "device lost: {msg}"),
            Self::InvalidState { slot, expected, found } => {
                write!(f, "frame slot {slot} is {found:?}, expected {expected:?}")
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// Image handed out by [`FrameBackend::acquire`].
#[derive(Debug)]
pub struct AcquiredImage<I> {
    pub image: I,
    /// Swapchain image index. Unrelated to the slot index. Backends that
    /// cannot query the presentation engine report a synthetic value.
    pub index: u32,
    /// Image is usable but the swapchain should be recreated afterwards.
    pub suboptimal: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresentOutcome {
    Optimal,
    Suboptimal,
}

/// Device-side primitives the frame cycle is built from.
///
/// One fence and one command recorder exist per slot. Implementations must
/// keep them separate so that waiting on slot `i` says nothing about slot `j`.
pub trait FrameBackend {
    type Image;
    type Commands;

    fn slot_count(&self) -> usize;

    /// Current swapchain extent.
    fn extent(&self) -> (u32, u32);

    /// Blocks until the next swapchain image is available.
    fn acquire(&mut self, slot: usize) -> Result<AcquiredImage<Self::Image>, FrameError>;

    /// Blocks until the last submission from `slot` has completed. `None`
    /// waits without bound.
    fn wait_fence(&mut self, slot: usize, timeout: Option<Duration>) -> Result<(), FrameError>;

    fn reset_fence(&mut self, slot: usize);

    fn begin_commands(&mut self, slot: usize, image: &Self::Image) -> Result<Self::Commands, FrameError>;

    /// Submits `commands`; the slot's fence signals on completion.
    fn submit(&mut self, slot: usize, commands: Self::Commands) -> Result<(), FrameError>;

    fn present(&mut self, slot: usize, image: Self::Image) -> Result<PresentOutcome, FrameError>;

    /// Rebuilds the swapchain and everything sized from it.
    fn recreate(&mut self, width: u32, height: u32) -> Result<(), FrameError>;

    fn wait_idle(&mut self) -> Result<(), FrameError>;
}
