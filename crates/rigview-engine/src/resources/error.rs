use std::fmt;

/// GPU object creation and upload failures.
///
/// None of these are expected mid-session; callers treat them as fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// Handle refers to an object that was destroyed.
    StaleHandle { kind: &'static str },
    ZeroSized { label: String },
    BufferTooLarge { label: String, size: u64, max: u64 },
    Misaligned { what: &'static str, value: u64, alignment: u64 },
    OutOfRange { offset: u64, len: u64, size: u64 },
    TextureTooLarge { label: String, width: u32, height: u32, max: u32 },
    /// A mip level's pixel data does not match its expected extent.
    BadMipLevel { level: u32, expected: (u32, u32, usize), found: (u32, u32, usize) },
    /// A texture is still referenced by a material.
    TextureInUse { label: String },
    /// The draw references an index range the buffer cannot hold.
    IndexCountTooLarge { count: u32, capacity: u64 },
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleHandle { kind } => write!(f, "{kind} handle refers to a destroyed object"),
            Self::ZeroSized { label } => write!(f, "'{label}' has zero size"),
            Self::BufferTooLarge { label, size, max } => {
                write!(f, "buffer '{label}' of {size} bytes exceeds the device limit of {max}")
            }
            Self::Misaligned { what, value, alignment } => {
                write!(f, "{what} {value} is not a multiple of {alignment}")
            }
            Self::OutOfRange { offset, len, size } => {
                write!(f, "write of {len} bytes at offset {offset} overruns buffer of {size} bytes")
            }
            Self::TextureTooLarge { label, width, height, max } => {
                write!(f, "texture '{label}' is {width}x{height}; device maximum is {max}")
            }
            Self::BadMipLevel { level, expected, found } => write!(
                f,
                "mip level {level}: expected {}x{} ({} bytes), got {}x{} ({} bytes)",
                expected.0, expected.1, expected.2, found.0, found.1, found.2
            ),
            Self::TextureInUse { label } => write!(f, "texture '{label}' is still bound by a material"),
            Self::IndexCountTooLarge { count, capacity } => {
                write!(f, "{count} indices requested; buffer holds {capacity}")
            }
        }
    }
}

impl std::error::Error for DeviceError {}
