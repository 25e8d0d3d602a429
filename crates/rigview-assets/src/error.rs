use std::fmt;

/// Failure to read or decode a resource.
///
/// Fatal at startup: callers abort initialization on any of these.
#[derive(Debug)]
pub enum ResourceError {
    /// No file exists at `path` (after extension fallbacks).
    NotFound { path: String },
    /// The file exists but could not be read.
    Io { path: String, source: std::io::Error },
    /// The bytes could not be decoded as an image.
    Decode { path: String, message: String },
    /// The document is structurally invalid.
    Malformed { path: String, message: String },
}

impl ResourceError {
    pub(crate) fn malformed(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Malformed { path: path.into(), message: message.to_string() }
    }

    /// Path of the resource this error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::Decode { path, .. }
            | Self::Malformed { path, .. } => path,
        }
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "resource not found: {path}"),
            Self::Io { path, source } => write!(f, "failed to read {path}: {source}"),
            Self::Decode { path, message } => write!(f, "failed to decode {path}: {message}"),
            Self::Malformed { path, message } => write!(f, "malformed {path}: {message}"),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Structural problems in a model description.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The document is not valid model JSON.
    Parse(String),
    /// Two bones share a name.
    DuplicateBone(String),
    /// A cuboid declares a negative extent.
    NegativeSize { bone: String, cuboid: usize },
    /// A bone names a parent that was never declared.
    UnknownParent { bone: String, parent: String },
    /// Following parent links from `bone` returns to `bone`.
    ParentCycle { bone: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "model parse error: {msg}"),
            Self::DuplicateBone(name) => write!(f, "duplicate bone name '{name}'"),
            Self::NegativeSize { bone, cuboid } => {
                write!(f, "bone '{bone}' cuboid #{cuboid} has a negative size")
            }
            Self::UnknownParent { bone, parent } => {
                write!(f, "bone '{bone}' references unknown parent '{parent}'")
            }
            Self::ParentCycle { bone } => write!(f, "bone '{bone}' is its own ancestor"),
        }
    }
}

impl std::error::Error for ModelError {}

/// Atlas packing failures.
///
/// Always surfaced as a value; packing never panics on overflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackingError {
    /// Nothing to pack.
    Empty,
    /// A holder with zero width or height.
    ZeroSized { name: String },
    /// Two holders share a name.
    DuplicateName { name: String },
    /// No slot fits the holder, even after growing the sheet.
    NoFit { name: String, width: u32, height: u32, sheet_size: u32 },
    /// Growing the sheet for `name` would exceed the configured maximum size.
    SheetTooLarge { name: String, required: u32, max: u32 },
}

impl fmt::Display for PackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no images to pack"),
            Self::ZeroSized { name } => write!(f, "image '{name}' has zero width or height"),
            Self::DuplicateName { name } => write!(f, "image '{name}' was added twice"),
            Self::NoFit { name, width, height, sheet_size } => write!(
                f,
                "no slot fits '{name}' ({width}x{height}) in a {sheet_size}x{sheet_size} sheet"
            ),
            Self::SheetTooLarge { name, required, max } => write!(
                f,
                "placing '{name}' needs a {required}x{required} sheet (max {max})"
            ),
        }
    }
}

impl std::error::Error for PackingError {}

/// Failures while building a texture atlas from its metadata.
#[derive(Debug)]
pub enum AtlasError {
    Resource(ResourceError),
    Packing(PackingError),
    /// An item references a texture path that did not end up on the sheet.
    MissingSprite { item: String, path: String },
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(e) => write!(f, "atlas resource error: {e}"),
            Self::Packing(e) => write!(f, "atlas packing error: {e}"),
            Self::MissingSprite { item, path } => {
                write!(f, "atlas item '{item}' references unpacked texture '{path}'")
            }
        }
    }
}

impl std::error::Error for AtlasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Resource(e) => Some(e),
            Self::Packing(e) => Some(e),
            Self::MissingSprite { .. } => None,
        }
    }
}

impl From<ResourceError> for AtlasError {
    fn from(e: ResourceError) -> Self {
        Self::Resource(e)
    }
}

impl From<PackingError> for AtlasError {
    fn from(e: PackingError) -> Self {
        Self::Packing(e)
    }
}
