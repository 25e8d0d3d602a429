use std::time::{Duration, Instant};

use super::backend::{FrameBackend, FrameError, PresentOutcome, SlotState};

/// Timeouts for the two blocking points of the frame cycle.
///
/// `None` blocks without bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Total budget for acquiring an image. Backend timeouts are retried until
    /// it runs out, then the frame is skipped.
    pub acquire_timeout: Option<Duration>,
    pub fence_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            acquire_timeout: Some(Duration::from_millis(250)),
            fence_timeout: None,
        }
    }
}

/// A frame between [`FrameOrchestrator::begin`] and [`FrameOrchestrator::end`].
pub struct Frame<B: FrameBackend> {
    slot: usize,
    image_index: u32,
    number: u64,
    image: B::Image,
    commands: B::Commands,
}

impl<B: FrameBackend> Frame<B> {
    /// Round-robin slot index.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Swapchain image index reported at acquisition.
    ///
    /// Under [`super::SurfaceBackend`] this is synthetic: wgpu hides the
    /// driver's index, so it is the acquisition count modulo the swapchain
    /// length. Use it to tell images apart, not to address driver images.
    pub fn image_index(&self) -> u32 {
        self.image_index
    }

    /// Monotonic count of frames begun.
    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn commands(&mut self) -> &mut B::Commands {
        &mut self.commands
    }
}

/// Drives N frame slots through acquire, record, submit and present.
pub struct FrameOrchestrator<B: FrameBackend> {
    backend: B,
    config: FrameConfig,
    states: Vec<SlotState>,
    current: usize,
    frames_begun: u64,
    extent: (u32, u32),
    needs_recreate: bool,
}

impl<B: FrameBackend> FrameOrchestrator<B> {
    pub fn new(backend: B, config: FrameConfig) -> Self {
        let slots = backend.slot_count().max(1);
        let extent = backend.extent();
        log::debug!("frame orchestrator: {slots} slot(s), extent {}x{}", extent.0, extent.1);
        Self {
            backend,
            config,
            states: vec![SlotState::Idle; slots],
            current: 0,
            frames_begun: 0,
            extent,
            needs_recreate: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> FrameConfig {
        self.config
    }

    pub fn slot_count(&self) -> usize {
        self.states.len()
    }

    pub fn slot_state(&self, slot: usize) -> Option<SlotState> {
        self.states.get(slot).copied()
    }

    /// Slot the next [`begin`](Self::begin) will use.
    pub fn current_slot(&self) -> usize {
        self.current
    }

    /// Latest requested extent. May be zero while minimized.
    pub fn extent(&self) -> (u32, u32) {
        self.extent
    }

    /// Records a new window extent. The swapchain is rebuilt on the next
    /// `begin`; a zero extent suspends rendering until a non-zero one arrives.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.extent == (width, height) {
            return;
        }
        self.extent = (width, height);
        self.needs_recreate = true;
    }

    /// Starts the next frame.
    ///
    /// Returns `Ok(None)` when the frame should be skipped: the window is
    /// minimized, the acquire budget ran out, or the swapchain was stale and
    /// has been rebuilt.
    pub fn begin(&mut self) -> Result<Option<Frame<B>>, FrameError> {
        if self.is_minimized() {
            return Ok(None);
        }
        if self.needs_recreate {
            self.recreate()?;
        }

        let slot = self.current;
        self.transition(slot, SlotState::Idle, SlotState::Acquiring)?;

        let acquired = match self.acquire(slot) {
            Ok(Some(acquired)) => acquired,
            Ok(None) => {
                self.states[slot] = SlotState::Idle;
                return Ok(None);
            }
            Err(FrameError::SwapchainStale) => {
                log::debug!("swapchain stale on acquire; recreating");
                self.states[slot] = SlotState::Idle;
                self.recreate()?;
                return Ok(None);
            }
            Err(e) => {
                self.states[slot] = SlotState::Idle;
                return Err(e);
            }
        };
        if acquired.suboptimal {
            self.needs_recreate = true;
        }

        // The slot's previous submission must retire before its recorder is reused.
        if let Err(e) = self.backend.wait_fence(slot, self.config.fence_timeout) {
            self.states[slot] = SlotState::Idle;
            return Err(e);
        }
        self.backend.reset_fence(slot);

        self.states[slot] = SlotState::Recording;
        let commands = match self.backend.begin_commands(slot, &acquired.image) {
            Ok(commands) => commands,
            Err(e) => {
                self.states[slot] = SlotState::Idle;
                return Err(e);
            }
        };

        self.frames_begun += 1;
        Ok(Some(Frame {
            slot,
            image_index: acquired.index,
            number: self.frames_begun,
            image: acquired.image,
            commands,
        }))
    }

    /// Submits and presents `frame`, then advances to the next slot.
    pub fn end(&mut self, frame: Frame<B>) -> Result<(), FrameError> {
        let Frame { slot, image, commands, .. } = frame;
        self.transition(slot, SlotState::Recording, SlotState::Submitted)?;

        let result = self
            .backend
            .submit(slot, commands)
            .and_then(|()| {
                self.states[slot] = SlotState::Presenting;
                self.backend.present(slot, image)
            });

        self.states[slot] = SlotState::Idle;
        self.current = (slot + 1) % self.states.len();

        match result {
            Ok(PresentOutcome::Optimal) => {}
            Ok(PresentOutcome::Suboptimal) | Err(FrameError::SwapchainStale) => {
                log::debug!("swapchain suboptimal on present; recreating next frame");
                self.needs_recreate = true;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Abandons a begun frame without submitting it.
    ///
    /// The slot's fence was already reset, so nothing is left pending on it.
    pub fn cancel(&mut self, frame: Frame<B>) {
        let slot = frame.slot;
        drop(frame);
        if let Some(state) = self.states.get_mut(slot) {
            *state = SlotState::Idle;
        }
    }

    /// Blocks until every submitted frame has completed.
    pub fn wait_idle(&mut self) -> Result<(), FrameError> {
        self.backend.wait_idle()?;
        self.states.fill(SlotState::Idle);
        Ok(())
    }

    fn is_minimized(&self) -> bool {
        self.extent.0 == 0 || self.extent.1 == 0
    }

    fn transition(&mut self, slot: usize, expected: SlotState, next: SlotState) -> Result<(), FrameError> {
        let found = self.states.get(slot).copied().ok_or(FrameError::InvalidState {
            slot,
            expected,
            found: SlotState::Idle,
        })?;
        if found != expected {
            return Err(FrameError::InvalidState { slot, expected, found });
        }
        self.states[slot] = next;
        Ok(())
    }

    fn acquire(&mut self, slot: usize) -> Result<Option<super::AcquiredImage<B::Image>>, FrameError> {
        let started = Instant::now();
        loop {
            match self.backend.acquire(slot) {
                Ok(acquired) => return Ok(Some(acquired)),
                Err(FrameError::Timeout) => {
                    if let Some(budget) = self.config.acquire_timeout {
                        if started.elapsed() >= budget {
                            log::warn!("no swapchain image within {budget:?}; skipping frame");
                            return Ok(None);
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn recreate(&mut self) -> Result<(), FrameError> {
        if self.is_minimized() {
            return Ok(());
        }
        // Rebuilding the swapchain while work is in flight would pull resources
        // out from under it.
        self.backend.wait_idle()?;
        self.states.fill(SlotState::Idle);
        let (width, height) = self.extent;
        self.backend.recreate(width, height)?;
        self.extent = self.backend.extent();
        self.needs_recreate = false;
        log::debug!("swapchain recreated at {}x{}", self.extent.0, self.extent.1);
        Ok(())
    }
}

impl<B: FrameBackend> Drop for FrameOrchestrator<B> {
    fn drop(&mut self) {
        if let Err(e) = self.backend.wait_idle() {
            log::error!("wait for idle device at shutdown failed: {e}");
        }
    }
}
