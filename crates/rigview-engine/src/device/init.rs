/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Requested present mode. Falls back to FIFO when the surface does not
    /// support it.
    ///
    /// Also decides how many frames are kept in flight, see
    /// [`super::frames_in_flight`].
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference; unsupported values fall back to the
    /// first mode the surface reports.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Overrides the surface latency hint. `None` uses the frames-in-flight
    /// count.
    pub desired_maximum_frame_latency: Option<u32>,

    pub power_preference: wgpu::PowerPreference,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
        }
    }
}
