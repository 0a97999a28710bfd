//! End-to-end equalization of a decoded image.
//!
//! Runs the filters in order: classify, convert when the image carries
//! color, build the histogram, derive the mapping, equalize. A failure at
//! any stage stops the run before later stages see the data.

use log::{debug, info};

use crate::buffer::PixelBuffer;
use crate::error::FilterError;
use crate::filters::equalize::{build_mapping, equalize_into, IntensityMapping, LookupStrategy};
use crate::filters::grayscale::{is_grayscale, to_grayscale, GrayscaleStatus};
use crate::filters::histogram::{build_histogram, Histogram, HistogramStats};

/// Configuration for the EqualizationPipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfig {
    pub lookup: LookupStrategy,
    /// Run the luma conversion even when the image is already grayscale.
    pub force_conversion: bool,
}

/// Everything the pipeline produced for one image.
///
/// `grayscale` is the input after conversion (or untouched when it was
/// already grayscale); `equalized` is a separate buffer so both can be shown
/// side by side.
#[derive(Debug, Clone)]
pub struct EqualizationReport {
    pub grayscale: PixelBuffer,
    pub equalized: PixelBuffer,
    pub histogram: Histogram,
    pub stats: HistogramStats,
    pub equalized_histogram: Histogram,
    pub equalized_stats: HistogramStats,
    pub mapping: IntensityMapping,
    /// True when the luma conversion ran.
    pub converted: bool,
}

pub struct EqualizationPipeline {
    config: PipelineConfig,
}

impl Default for EqualizationPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl EqualizationPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process one image, taking ownership of the decoded buffer.
    pub fn run(&self, mut image: PixelBuffer) -> Result<EqualizationReport, FilterError> {
        let status = is_grayscale(&image)?;
        let converted = self.config.force_conversion || status == GrayscaleStatus::NotGrayscale;
        if converted {
            to_grayscale(&mut image)?;
        }
        debug!("classified as {status:?}, converted: {converted}");

        let histogram = build_histogram(&image)?;
        let stats = histogram.stats();
        let mapping = build_mapping(&histogram)?;

        let mut equalized = PixelBuffer::new(image.width(), image.height())?;
        equalize_into(&image, &mapping, &mut equalized, self.config.lookup)?;

        let equalized_histogram = build_histogram(&equalized)?;
        let equalized_stats = equalized_histogram.stats();

        info!(
            "equalized {}x{} image: mean {:.2} -> {:.2}, stddev {:.2} -> {:.2}",
            image.width(),
            image.height(),
            stats.mean,
            equalized_stats.mean,
            stats.stddev,
            equalized_stats.stddev,
        );

        Ok(EqualizationReport {
            grayscale: image,
            equalized,
            histogram,
            stats,
            equalized_histogram,
            equalized_stats,
            mapping,
            converted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_image_is_converted() {
        let img = PixelBuffer::from_rgba8(2, 1, vec![100, 150, 200, 9, 0, 0, 0, 255]).unwrap();
        let report = EqualizationPipeline::default().run(img).unwrap();

        assert!(report.converted);
        assert_eq!(report.grayscale.pixel(0, 0), Some(&[143, 143, 143, 9][..]));
        assert_eq!(report.mapping.entries(), &[(0, 0), (143, 255)]);
        assert_eq!(report.equalized.pixel(0, 0), Some(&[255, 255, 255, 9][..]));
    }

    #[test]
    fn test_grayscale_input_untouched() {
        let bytes = vec![10, 10, 10, 255, 10, 10, 10, 255, 10, 10, 10, 255, 200, 200, 200, 255];
        let img = PixelBuffer::from_rgba8(2, 2, bytes).unwrap();
        let report = EqualizationPipeline::default().run(img.clone()).unwrap();

        assert!(!report.converted);
        assert_eq!(report.grayscale, img);
        assert_eq!(report.equalized_histogram.count(0), 3);
        assert_eq!(report.equalized_histogram.count(255), 1);
    }

    #[test]
    fn test_empty_image_fails() {
        let img = PixelBuffer::new(0, 0).unwrap();
        let err = EqualizationPipeline::default().run(img).unwrap_err();
        assert_eq!(err, FilterError::EmptyHistogram);
    }

    #[test]
    fn test_non_rgba_fails_before_conversion() {
        let img = PixelBuffer::from_raw(1, 1, 3, 3, vec![1, 2, 3]).unwrap();
        let err = EqualizationPipeline::default().run(img).unwrap_err();
        assert_eq!(err, FilterError::InvalidFormat { channels: 3 });
    }
}
