/// Renderer-facing context: device, queue and the formats of the current
/// render targets.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    /// Swapchain extent in physical pixels.
    pub extent: (u32, u32),
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        extent: (u32, u32),
    ) -> Self {
        Self { device, queue, surface_format, depth_format, extent }
    }

    /// Width over height, never zero or infinite.
    pub fn aspect_ratio(&self) -> f32 {
        crate::camera::aspect_ratio(self.extent.0, self.extent.1)
    }
}
