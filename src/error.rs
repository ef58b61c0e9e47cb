use crate::Semantic;
use std::borrow::Cow;
use std::path::PathBuf;

/// A type alias for handling errors throughout meshpack
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The vertex element descriptors do not describe a valid layout.
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// The index or material id data is structurally unsound.
    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),

    /// A GPU buffer could not be allocated or filled.
    #[error("resource error: {0}")]
    Resource(Cow<'static, str>),

    /// No loader was able to handle the given path.
    #[error("path error: {0}")]
    Path(PathBuf),

    /// Generally, these errors correspond to bugs in this library.
    #[error("BUG: Please report this bug with a backtrace\n{0}")]
    Bug(String),
}

/// Coarse error category, as reported to callers of [`Mesh::update`](crate::Mesh::update).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Layout,
    Topology,
    Resource,
    Other,
}

impl Error {
    #[inline]
    pub(crate) fn resource(msg: &'static str) -> Self {
        Self::Resource(Cow::Borrowed(msg))
    }

    #[inline]
    pub(crate) fn resource_dynamic(msg: String) -> Self {
        Self::Resource(Cow::Owned(msg))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Layout(_) => ErrorKind::Layout,
            Self::Topology(_) => ErrorKind::Topology,
            Self::Resource(_) => ErrorKind::Resource,
            Self::Path(_) | Self::Bug(_) => ErrorKind::Other,
        }
    }
}

/// Rejections produced while resolving the canonical element layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("semantic {0:?} appears more than once")]
    DuplicateSemantic(Semantic),

    #[error("semantic {semantic:?} cannot have {count} components")]
    InvalidComponentCount { semantic: Semantic, count: u32 },

    #[error("position is required")]
    MissingPosition,

    /// Bitangents are always derived from the normal and tangent.
    #[error("bitangent cannot be supplied explicitly")]
    ExplicitBitangent,

    #[error("tangent requires a normal")]
    TangentWithoutNormal,
}

/// Rejections produced while validating indices and material ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("index count ({0}) must be divisible by 3")]
    IndexCountNotTriangles(usize),

    #[error("index {index} at position {position} must be less than vertex count ({vertex_count})")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("material id {value} at position {position} is smaller than its predecessor ({previous})")]
    MaterialIdsNotSorted {
        position: usize,
        value: usize,
        previous: usize,
    },

    #[error("material id {value} at position {position} exceeds triangle count ({triangle_count})")]
    MaterialIdOutOfRange {
        position: usize,
        value: usize,
        triangle_count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(
            Error::from(LayoutError::MissingPosition).kind(),
            ErrorKind::Layout
        );
        assert_eq!(
            Error::from(TopologyError::IndexCountNotTriangles(7)).kind(),
            ErrorKind::Topology
        );
        assert_eq!(Error::resource("oom").kind(), ErrorKind::Resource);
        assert_eq!(Error::Bug(String::new()).kind(), ErrorKind::Other);
    }

    #[test]
    fn display() {
        let err = Error::from(TopologyError::IndexCountNotTriangles(7));
        assert_eq!(
            err.to_string(),
            "invalid topology: index count (7) must be divisible by 3"
        );
    }
}
