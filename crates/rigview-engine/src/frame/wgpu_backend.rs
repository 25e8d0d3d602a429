use std::time::Duration;

use crate::device::{Gpu, SurfaceErrorAction, classify_surface_error};
use crate::render::RenderCtx;

use super::backend::{AcquiredImage, FrameBackend, FrameError, PresentOutcome};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;
const CLEAR_DEPTH: f32 = 1.0;

/// Per-slot synchronization and the depth target sized to the swapchain.
struct SlotResources {
    /// Last submission from this slot; `None` once waited and reset.
    fence: Option<wgpu::SubmissionIndex>,
    depth: wgpu::TextureView,
}

/// [`FrameBackend`] over the window surface.
///
/// Semaphore ordering is implicit in the wgpu queue. The per-slot fence is
/// the submission index returned by `Queue::submit`.
pub struct SurfaceBackend<'w> {
    gpu: Gpu<'w>,
    slots: Vec<SlotResources>,
    acquisitions: u64,
}

impl<'w> SurfaceBackend<'w> {
    pub fn new(gpu: Gpu<'w>) -> Self {
        let count = gpu.frames_in_flight().max(1) as usize;
        let slots = (0..count)
            .map(|i| SlotResources { fence: None, depth: create_depth_view(&gpu, i) })
            .collect();
        Self { gpu, slots, acquisitions: 0 }
    }

    pub fn gpu(&self) -> &Gpu<'w> {
        &self.gpu
    }

    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            DEPTH_FORMAT,
            self.gpu.extent(),
        )
    }

    fn next_image_index(&mut self) -> u32 {
        let index = synthetic_image_index(self.acquisitions, self.slots.len());
        self.acquisitions = self.acquisitions.wrapping_add(1);
        index
    }

    fn poll(&self, submission_index: Option<wgpu::SubmissionIndex>, timeout: Option<Duration>) -> Result<(), wgpu::PollError> {
        self.gpu
            .device()
            .poll(wgpu::PollType::Wait { submission_index, timeout })
            .map(|_| ())
    }
}

fn create_depth_view(gpu: &Gpu<'_>, slot: usize) -> wgpu::TextureView {
    let (width, height) = gpu.extent();
    let label = format!("rigview depth {slot}");
    let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
        label: Some(&label),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// wgpu does not report the driver's image index. The swapchain holds
/// `latency + 1` images handed out in order, so the acquisition serial
/// stands in for it.
fn synthetic_image_index(serial: u64, slots: usize) -> u32 {
    let images = slots as u64 + 1;
    (serial % images) as u32
}

fn device_lost(err: wgpu::PollError) -> FrameError {
    FrameError::DeviceLost(err.to_string())
}

impl FrameBackend for SurfaceBackend<'_> {
    type Image = wgpu::SurfaceTexture;
    type Commands = FrameCommands;

    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn extent(&self) -> (u32, u32) {
        self.gpu.extent()
    }

    fn acquire(&mut self, _slot: usize) -> Result<AcquiredImage<Self::Image>, FrameError> {
        match self.gpu.acquire() {
            Ok(image) => {
                let suboptimal = image.suboptimal;
                let index = self.next_image_index();
                Ok(AcquiredImage { image, index, suboptimal })
            }
            Err(err) => Err(match classify_surface_error(&err) {
                SurfaceErrorAction::Reconfigure => FrameError::SwapchainStale,
                SurfaceErrorAction::SkipFrame => {
                    log::debug!("surface acquire: {err}");
                    FrameError::Timeout
                }
                SurfaceErrorAction::Fatal => FrameError::OutOfMemory,
            }),
        }
    }

    fn wait_fence(&mut self, slot: usize, timeout: Option<Duration>) -> Result<(), FrameError> {
        let Some(fence) = self.slots[slot].fence.clone() else {
            return Ok(());
        };
        match self.poll(Some(fence), timeout) {
            Ok(()) => Ok(()),
            Err(wgpu::PollError::Timeout) => Err(FrameError::FenceTimeout { slot }),
            Err(e) => Err(device_lost(e)),
        }
    }

    fn reset_fence(&mut self, slot: usize) {
        self.slots[slot].fence = None;
    }

    fn begin_commands(&mut self, slot: usize, image: &Self::Image) -> Result<FrameCommands, FrameError> {
        let color = image.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let label = format!("rigview frame {slot}");
        let encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(&label) });
        Ok(FrameCommands {
            encoder,
            color,
            depth: self.slots[slot].depth.clone(),
            cleared: false,
        })
    }

    fn submit(&mut self, slot: usize, mut commands: FrameCommands) -> Result<(), FrameError> {
        if !commands.cleared {
            // Nothing drawn; the image still has to leave in a defined state.
            drop(commands.main_pass());
        }
        let index = self.gpu.queue().submit(std::iter::once(commands.encoder.finish()));
        self.slots[slot].fence = Some(index);
        Ok(())
    }

    fn present(&mut self, _slot: usize, image: Self::Image) -> Result<PresentOutcome, FrameError> {
        let suboptimal = image.suboptimal;
        self.gpu.window().pre_present_notify();
        image.present();
        Ok(if suboptimal { PresentOutcome::Suboptimal } else { PresentOutcome::Optimal })
    }

    fn recreate(&mut self, width: u32, height: u32) -> Result<(), FrameError> {
        self.gpu.configure(width, height);
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.fence = None;
            slot.depth = create_depth_view(&self.gpu, i);
        }
        Ok(())
    }

    fn wait_idle(&mut self) -> Result<(), FrameError> {
        self.poll(None, None).map_err(device_lost)?;
        for slot in &mut self.slots {
            slot.fence = None;
        }
        Ok(())
    }
}

/// Command recording state for one frame.
pub struct FrameCommands {
    pub encoder: wgpu::CommandEncoder,
    color: wgpu::TextureView,
    depth: wgpu::TextureView,
    cleared: bool,
}

impl FrameCommands {
    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth
    }

    /// Begins a render pass on the swapchain image and depth target.
    ///
    /// The first pass of a frame clears to opaque black and depth 1.0; later
    /// passes load what is already there.
    pub fn main_pass(&mut self) -> wgpu::RenderPass<'_> {
        let (color_load, depth_load) = if self.cleared {
            (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
        } else {
            (wgpu::LoadOp::Clear(CLEAR_COLOR), wgpu::LoadOp::Clear(CLEAR_DEPTH))
        };
        self.cleared = true;

        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("rigview main pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color,
                resolve_target: None,
                ops: wgpu::Operations { load: color_load, store: wgpu::StoreOp::Store },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth,
                depth_ops: Some(wgpu::Operations { load: depth_load, store: wgpu::StoreOp::Store }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_index_cycles_over_one_more_image_than_slots() {
        let indices: Vec<u32> = (0..7).map(|serial| synthetic_image_index(serial, 2)).collect();
        assert_eq!(indices, [0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(synthetic_image_index(5, 1), 1);
        assert_eq!(synthetic_image_index(u64::MAX, 3), (u64::MAX % 4) as u32);
    }
}
