//! Argument checks done before anything reaches the device.

use super::DeviceError;

/// Rounds a buffer size up to `COPY_BUFFER_ALIGNMENT`.
pub(crate) fn aligned_buffer_size(label: &str, size: u64, max: u64) -> Result<u64, DeviceError> {
    if size == 0 {
        return Err(DeviceError::ZeroSized { label: label.to_string() });
    }
    let align = wgpu::COPY_BUFFER_ALIGNMENT;
    let aligned = size
        .checked_add(align - 1)
        .map(|s| s / align * align)
        .filter(|s| *s <= max)
        .ok_or_else(|| DeviceError::BufferTooLarge { label: label.to_string(), size, max })?;
    Ok(aligned)
}

/// Checks a `write_buffer` of `len` bytes at `offset` into a buffer of `size`.
pub fn check_upload_range(size: u64, offset: u64, len: u64) -> Result<(), DeviceError> {
    let align = wgpu::COPY_BUFFER_ALIGNMENT;
    if offset % align != 0 {
        return Err(DeviceError::Misaligned { what: "upload offset", value: offset, alignment: align });
    }
    if len % align != 0 {
        return Err(DeviceError::Misaligned { what: "upload length", value: len, alignment: align });
    }
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(DeviceError::OutOfRange { offset, len, size }),
    }
}

/// One level of an RGBA8 mip chain.
#[derive(Debug, Clone, Copy)]
pub struct MipLevel<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
}

/// Checks that `levels` is a well-formed RGBA8 mip chain: each level halves
/// the previous one (never below 1) and carries exactly `w * h * 4` bytes.
pub(crate) fn check_mip_chain(label: &str, levels: &[MipLevel<'_>], max: u32) -> Result<(), DeviceError> {
    let Some(base) = levels.first() else {
        return Err(DeviceError::ZeroSized { label: label.to_string() });
    };
    if base.width == 0 || base.height == 0 {
        return Err(DeviceError::ZeroSized { label: label.to_string() });
    }
    if base.width > max || base.height > max {
        return Err(DeviceError::TextureTooLarge {
            label: label.to_string(),
            width: base.width,
            height: base.height,
            max,
        });
    }

    let (mut w, mut h) = (base.width, base.height);
    for (i, level) in levels.iter().enumerate() {
        let bytes = w as usize * h as usize * 4;
        if (level.width, level.height, level.pixels.len()) != (w, h, bytes) {
            return Err(DeviceError::BadMipLevel {
                level: i as u32,
                expected: (w, h, bytes),
                found: (level.width, level.height, level.pixels.len()),
            });
        }
        w = (w / 2).max(1);
        h = (h / 2).max(1);
    }
    Ok(())
}
