//! Swapchain selection helpers.
//!
//! Pure functions over the capability lists so they can be tested without
//! an adapter.

const SRGB_PREFERENCE: [wgpu::TextureFormat; 2] = [
    wgpu::TextureFormat::Bgra8UnormSrgb,
    wgpu::TextureFormat::Rgba8UnormSrgb,
];

pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        if let Some(f) = SRGB_PREFERENCE.iter().find(|f| formats.contains(f)) {
            return Some(*f);
        }
    }
    formats.first().copied()
}

pub(crate) fn choose_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| modes.contains(m))
        .or_else(|| modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Requested mode if supported, otherwise FIFO (always available).
pub(crate) fn choose_present_mode(
    modes: &[wgpu::PresentMode],
    requested: wgpu::PresentMode,
) -> wgpu::PresentMode {
    let auto = matches!(requested, wgpu::PresentMode::AutoVsync | wgpu::PresentMode::AutoNoVsync);
    if auto || modes.contains(&requested) {
        requested
    } else {
        wgpu::PresentMode::Fifo
    }
}

/// Number of frame slots kept in flight for a present mode.
///
/// Immediate never waits on the display, so one slot is enough; mailbox
/// wants a spare image to replace; FIFO double-buffers.
pub fn frames_in_flight(mode: wgpu::PresentMode) -> u32 {
    match mode {
        wgpu::PresentMode::Immediate => 1,
        wgpu::PresentMode::Mailbox | wgpu::PresentMode::AutoNoVsync => 3,
        wgpu::PresentMode::Fifo | wgpu::PresentMode::FifoRelaxed | wgpu::PresentMode::AutoVsync => 2,
    }
}

/// Surface extent; wgpu rejects zero-sized configurations.
pub(crate) fn clamp_extent(width: u32, height: u32) -> (u32, u32) {
    (width.max(1), height.max(1))
}
