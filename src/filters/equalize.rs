//! Histogram equalization: mapping derivation and application.
//!
//! The mapping is built over the intensities that actually occur in the
//! image (the histogram support), not over all 256 levels:
//!
//! ```text
//! T(v) = round(255 * (cdf(v) - cdf_min) / (N - cdf_min))
//! ```
//!
//! where `cdf_min` is the cumulative count at the lowest occurring intensity
//! and `N` the pixel count. When every pixel shares the lowest intensity the
//! denominator is zero and the mapping degenerates to the identity.
//!
//! Application always writes a new buffer so callers can keep the source.
//! Two lookup strategies exist: a dense 256-entry table built once from the
//! sparse mapping, and a by-value search of the sparse entries per pixel.
//! They produce identical output.

use log::debug;

use crate::buffer::PixelBuffer;
use crate::error::FilterError;
use crate::filters::histogram::{Histogram, BINS};

/// Sparse old -> new intensity table, sorted by old intensity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntensityMapping {
    entries: Vec<(u8, u8)>,
}

/// How `equalize_into` looks intensities up in the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupStrategy {
    /// Densify into a 256-entry table once, then index per pixel.
    #[default]
    Dense,
    /// Search the sparse entries by value for every pixel.
    Sparse,
}

impl IntensityMapping {
    pub fn entries(&self) -> &[(u8, u8)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// New intensity for `old`, if `old` occurred in the source histogram.
    pub fn get(&self, old: u8) -> Option<u8> {
        self.entries
            .binary_search_by_key(&old, |&(from, _)| from)
            .ok()
            .map(|i| self.entries[i].1)
    }

    /// New intensity for `old`; intensities absent from the mapping pass through.
    pub fn map(&self, old: u8) -> u8 {
        self.get(old).unwrap_or(old)
    }

    /// Expand into a dense lookup table. Absent intensities map to themselves.
    pub fn to_lut(&self) -> [u8; BINS] {
        let mut lut = [0u8; BINS];
        for (i, slot) in lut.iter_mut().enumerate() {
            *slot = i as u8;
        }
        for &(old, new) in &self.entries {
            lut[old as usize] = new;
        }
        lut
    }
}

/// Derive the equalization mapping from a histogram.
///
/// # Arguments
/// * `hist` - Intensity histogram of the image to equalize
///
/// # Returns
/// One entry per occurring intensity, ascending; `EmptyHistogram` if the
/// histogram counts no pixels
pub fn build_mapping(hist: &Histogram) -> Result<IntensityMapping, FilterError> {
    let total = hist.total();
    if total == 0 {
        return Err(FilterError::EmptyHistogram);
    }

    let support: Vec<u8> = hist.support().collect();
    let cdf_min = hist.count(support[0]);

    if cdf_min == total {
        debug!("flat image at intensity {}, identity mapping", support[0]);
        return Ok(IntensityMapping {
            entries: support.iter().map(|&v| (v, v)).collect(),
        });
    }

    let range = (total - cdf_min) as f64;
    let mut cumulative = 0u64;
    let entries = support
        .iter()
        .map(|&v| {
            cumulative += hist.count(v);
            let scaled = (cumulative - cdf_min) as f64 / range * 255.0;
            (v, scaled.round().clamp(0.0, 255.0) as u8)
        })
        .collect();

    debug!("equalization mapping over {} intensities", support.len());
    Ok(IntensityMapping { entries })
}

/// Apply a mapping to every pixel, producing a new packed RGBA buffer.
///
/// Uses the dense lookup table.
pub fn equalize(source: &PixelBuffer, mapping: &IntensityMapping) -> Result<PixelBuffer, FilterError> {
    source.require_rgba()?;
    let mut output = PixelBuffer::new(source.width(), source.height())?;
    equalize_into(source, mapping, &mut output, LookupStrategy::Dense)?;
    Ok(output)
}

/// Apply a mapping into a caller-provided destination.
///
/// The source red channel is looked up and written to R, G and B of the
/// destination; alpha is copied unchanged. The destination may have a
/// different stride but must match the source width and height.
///
/// # Arguments
/// * `source` - RGBA pixel buffer, not modified
/// * `mapping` - Mapping built from the source histogram
/// * `dest` - RGBA buffer with the same dimensions as `source`
/// * `strategy` - Dense table or sparse by-value search
pub fn equalize_into(
    source: &PixelBuffer,
    mapping: &IntensityMapping,
    dest: &mut PixelBuffer,
    strategy: LookupStrategy,
) -> Result<(), FilterError> {
    let input = source.view()?;
    if !source.has_same_dimensions(dest) {
        return Err(FilterError::DimensionMismatch {
            expected: (source.width(), source.height()),
            actual: (dest.width(), dest.height()),
        });
    }
    let mut output = dest.view_mut()?;
    let (height, width, _) = input.dim();

    match strategy {
        LookupStrategy::Dense => {
            let lut = mapping.to_lut();
            for y in 0..height {
                for x in 0..width {
                    let v = lut[input[[y, x, 0]] as usize];
                    output[[y, x, 0]] = v;
                    output[[y, x, 1]] = v;
                    output[[y, x, 2]] = v;
                    output[[y, x, 3]] = input[[y, x, 3]];
                }
            }
        }
        LookupStrategy::Sparse => {
            for y in 0..height {
                for x in 0..width {
                    let v = mapping.map(input[[y, x, 0]]);
                    output[[y, x, 0]] = v;
                    output[[y, x, 1]] = v;
                    output[[y, x, 2]] = v;
                    output[[y, x, 3]] = input[[y, x, 3]];
                }
            }
        }
    }

    Ok(())
}
