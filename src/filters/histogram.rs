//! Intensity histogram and its summary statistics.
//!
//! The histogram is a fixed 256-slot table indexed directly by intensity,
//! filled in a single pass. The red channel is taken as the intensity, which
//! is only meaningful once the image has been converted to grayscale.

use crate::buffer::PixelBuffer;
use crate::error::FilterError;

/// Number of intensity levels in an 8-bit channel.
pub const BINS: usize = 256;

/// Frequency table of 8-bit intensities.
///
/// `total` always equals the sum of `bins`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; BINS],
    total: u64,
}

/// Mean and standard deviation of a histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramStats {
    pub mean: f64,
    pub stddev: f64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            bins: [0; BINS],
            total: 0,
        }
    }
}

impl Histogram {
    /// Build a histogram from precomputed counts; the total is derived.
    pub fn from_bins(bins: [u64; BINS]) -> Self {
        let total = bins.iter().sum();
        Self { bins, total }
    }

    pub fn bins(&self) -> &[u64; BINS] {
        &self.bins
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn count(&self, intensity: u8) -> u64 {
        self.bins[intensity as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Intensities with a nonzero count, ascending.
    pub fn support(&self) -> impl Iterator<Item = u8> + '_ {
        self.bins
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(i, _)| i as u8)
    }

    pub fn min_intensity(&self) -> Option<u8> {
        self.support().next()
    }

    pub fn max_intensity(&self) -> Option<u8> {
        self.support().last()
    }

    pub fn stats(&self) -> HistogramStats {
        histogram_stats(self)
    }
}

/// Count the red-channel intensities of an RGBA buffer.
///
/// # Arguments
/// * `buffer` - RGBA pixel buffer, normally already grayscale
///
/// # Returns
/// 256-bin histogram whose total equals width * height
pub fn build_histogram(buffer: &PixelBuffer) -> Result<Histogram, FilterError> {
    let input = buffer.view()?;
    let (height, width, _) = input.dim();
    let mut hist = Histogram::default();

    for y in 0..height {
        for x in 0..width {
            hist.bins[input[[y, x, 0]] as usize] += 1;
        }
    }
    hist.total = (height * width) as u64;

    Ok(hist)
}

/// Compute mean and standard deviation of the intensity distribution.
///
/// An empty histogram yields zero for both.
pub fn histogram_stats(hist: &Histogram) -> HistogramStats {
    if hist.total == 0 {
        return HistogramStats {
            mean: 0.0,
            stddev: 0.0,
        };
    }

    let total = hist.total as f64;
    let mean = hist
        .bins
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum::<f64>()
        / total;

    let variance = hist
        .bins
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let d = i as f64 - mean;
            count as f64 * d * d
        })
        .sum::<f64>()
        / total;

    HistogramStats {
        mean,
        stddev: variance.max(0.0).sqrt(),
    }
}
