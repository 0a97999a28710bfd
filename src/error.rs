//! Error type shared by every pixel operation.

/// Errors returned by buffer construction and the equalization filters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    /// The buffer is not laid out as 4-byte RGBA.
    #[error("expected 4-channel RGBA pixels, got {channels} channel(s)")]
    InvalidFormat { channels: usize },

    #[error("cannot equalize an image without pixels")]
    EmptyHistogram,

    /// Destination width/height differ from the source.
    #[error("destination dimensions {actual:?} differ from source {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("invalid buffer geometry: {0}")]
    InvalidGeometry(String),

    #[error("ndarray shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
