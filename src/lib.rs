//! Histogram equalization for 8-bit RGBA images.
//!
//! Classifies an image as grayscale or color, reduces it to luma, counts
//! intensities into a 256-bin histogram and remaps them so the cumulative
//! distribution becomes roughly linear. Python bindings via PyO3 and WASM
//! bindings for JavaScript sit on top of the same filters.
//!
//! ## Image Format
//! Buffers are 4-channel RGBA, 8 bits per channel, with an explicit row
//! stride so decoder output with padded rows can be used without copying.
//! Any other layout is rejected.
//!
//! ## Pipeline
//! `PixelBuffer` -> `is_grayscale` -> `to_grayscale` (when needed) ->
//! `build_histogram` -> `build_mapping` -> `equalize`. Grayscale conversion
//! is in place; equalization always returns a new buffer.

pub mod buffer;
pub mod error;
pub mod filters;
pub mod pipeline;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use buffer::PixelBuffer;
pub use error::FilterError;
pub use pipeline::{EqualizationPipeline, EqualizationReport, PipelineConfig};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::buffer::PixelBuffer;
    use crate::error::FilterError;
    use crate::filters::equalize::{build_mapping, LookupStrategy};
    use crate::filters::grayscale::{is_grayscale as classify, to_grayscale};
    use crate::filters::histogram::build_histogram;
    use crate::pipeline::{EqualizationPipeline, PipelineConfig};

    impl From<FilterError> for PyErr {
        fn from(err: FilterError) -> Self {
            PyValueError::new_err(err.to_string())
        }
    }

    fn parse_lookup(lookup: &str) -> PyResult<LookupStrategy> {
        match lookup {
            "dense" => Ok(LookupStrategy::Dense),
            "sparse" => Ok(LookupStrategy::Sparse),
            other => Err(PyValueError::new_err(format!(
                "unknown lookup '{other}', expected 'dense' or 'sparse'"
            ))),
        }
    }

    // ========================================================================
    // Grayscale
    // ========================================================================

    /// Return True if every pixel of an RGBA u8 image has R == G == B.
    #[pyfunction]
    pub fn is_grayscale(image: PyReadonlyArray3<'_, u8>) -> PyResult<bool> {
        let buffer = PixelBuffer::from_array(image.as_array())?;
        Ok(classify(&buffer)?.is_grayscale())
    }

    /// Convert RGBA u8 image to grayscale luma.
    ///
    /// Output is RGBA with R=G=B=luma, alpha preserved.
    #[pyfunction]
    pub fn grayscale<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let mut buffer = PixelBuffer::from_array(image.as_array())?;
        to_grayscale(&mut buffer)?;
        Ok(buffer.to_array()?.into_pyarray(py))
    }

    // ========================================================================
    // Histogram
    // ========================================================================

    /// Red-channel histogram of an RGBA u8 image as (bins, total).
    #[pyfunction]
    pub fn histogram(image: PyReadonlyArray3<'_, u8>) -> PyResult<(Vec<u64>, u64)> {
        let buffer = PixelBuffer::from_array(image.as_array())?;
        let hist = build_histogram(&buffer)?;
        Ok((hist.bins().to_vec(), hist.total()))
    }

    /// Mean and standard deviation of the red-channel histogram.
    #[pyfunction]
    pub fn histogram_stats(image: PyReadonlyArray3<'_, u8>) -> PyResult<(f64, f64)> {
        let buffer = PixelBuffer::from_array(image.as_array())?;
        let stats = build_histogram(&buffer)?.stats();
        Ok((stats.mean, stats.stddev))
    }

    // ========================================================================
    // Equalization
    // ========================================================================

    /// Sparse (old, new) intensity pairs for a grayscale RGBA u8 image.
    #[pyfunction]
    pub fn equalization_mapping(image: PyReadonlyArray3<'_, u8>) -> PyResult<Vec<(u8, u8)>> {
        let buffer = PixelBuffer::from_array(image.as_array())?;
        let mapping = build_mapping(&build_histogram(&buffer)?)?;
        Ok(mapping.entries().to_vec())
    }

    /// Convert to grayscale if needed and histogram-equalize.
    ///
    /// # Arguments
    /// * `image` - RGBA u8 image (height, width, 4)
    /// * `lookup` - "dense" (default) or "sparse"
    #[pyfunction]
    #[pyo3(signature = (image, lookup="dense"))]
    pub fn equalize<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        lookup: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let buffer = PixelBuffer::from_array(image.as_array())?;
        let config = PipelineConfig {
            lookup: parse_lookup(lookup)?,
            ..PipelineConfig::default()
        };
        let report = EqualizationPipeline::new(config).run(buffer)?;
        Ok(report.equalized.to_array()?.into_pyarray(py))
    }

    /// Histogram equalization Rust extension module
    #[pymodule]
    pub fn histeq_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(is_grayscale, m)?)?;
        m.add_function(wrap_pyfunction!(grayscale, m)?)?;
        m.add_function(wrap_pyfunction!(histogram, m)?)?;
        m.add_function(wrap_pyfunction!(histogram_stats, m)?)?;
        m.add_function(wrap_pyfunction!(equalization_mapping, m)?)?;
        m.add_function(wrap_pyfunction!(equalize, m)?)?;
        Ok(())
    }
}
