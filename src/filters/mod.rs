//! Filter modules for the intensity-transform pipeline.
//!
//! ## Supported Formats
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | RGBA8 | (H, W, 4) | u8 | Red, green, blue, alpha, 0-255 |
//!
//! Buffers with any other channel count are rejected with
//! [`FilterError::InvalidFormat`](crate::error::FilterError::InvalidFormat).
//!
//! ## Architecture
//!
//! - **Strided** - Filters read and write through `ndarray` views, so row padding is skipped
//! - **Alpha preservation** - Alpha is never modified
//! - **Sequential** - Every filter is a single pass over the buffer on the calling thread
//!
//! ## Filter Categories
//!
//! - **Grayscale**: is_grayscale, to_grayscale (in place)
//! - **Histogram**: build_histogram, histogram_stats
//! - **Equalization**: build_mapping, equalize (new buffer), equalize_into

pub mod grayscale;
pub mod histogram;
pub mod equalize;

pub use equalize::{build_mapping, equalize, equalize_into, IntensityMapping, LookupStrategy};
pub use grayscale::{is_grayscale, luma_u8, to_grayscale, GrayscaleStatus};
pub use histogram::{build_histogram, histogram_stats, Histogram, HistogramStats};
