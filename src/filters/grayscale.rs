//! Grayscale classification and conversion.
//!
//! Uses the 0.2125 / 0.7154 / 0.0721 luma weights. They are applied as
//! literal floating-point factors and rounded once at the 8-bit stage;
//! no renormalization happens even though they do not sum to exactly 1.0.
//!
//! ## Supported Formats
//!
//! - **RGBA8**: (height, width, 4) - the only accepted layout
//!
//! Any other channel count fails with [`FilterError::InvalidFormat`].

use log::debug;

use crate::buffer::PixelBuffer;
use crate::error::FilterError;

/// Luma coefficients
pub const LUMA_R: f64 = 0.2125;
pub const LUMA_G: f64 = 0.7154;
pub const LUMA_B: f64 = 0.0721;

/// Outcome of scanning a buffer for color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrayscaleStatus {
    /// Every pixel has R == G == B (vacuously true for zero-area buffers).
    Grayscale,
    NotGrayscale,
}

impl GrayscaleStatus {
    pub fn is_grayscale(self) -> bool {
        self == GrayscaleStatus::Grayscale
    }
}

/// Weighted luma of one RGB triple, rounded to the nearest 8-bit value.
#[inline]
pub fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    let y = LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64;
    y.round().clamp(0.0, 255.0) as u8
}

/// Check whether an RGBA buffer is already achromatic.
///
/// Stops at the first pixel whose R, G and B channels differ.
///
/// # Arguments
/// * `buffer` - RGBA pixel buffer
///
/// # Returns
/// `Grayscale` or `NotGrayscale`; `InvalidFormat` if the buffer is not RGBA
pub fn is_grayscale(buffer: &PixelBuffer) -> Result<GrayscaleStatus, FilterError> {
    let input = buffer.view()?;
    let (height, width, _) = input.dim();

    for y in 0..height {
        for x in 0..width {
            let r = input[[y, x, 0]];
            if r != input[[y, x, 1]] || r != input[[y, x, 2]] {
                debug!("pixel ({x}, {y}) carries color, image is not grayscale");
                return Ok(GrayscaleStatus::NotGrayscale);
            }
        }
    }

    Ok(GrayscaleStatus::Grayscale)
}

/// Convert an RGBA buffer to grayscale in place.
///
/// Writes the luma into R, G and B. Alpha and geometry are left untouched.
///
/// # Arguments
/// * `buffer` - RGBA pixel buffer, modified in place
pub fn to_grayscale(buffer: &mut PixelBuffer) -> Result<(), FilterError> {
    let mut pixels = buffer.view_mut()?;
    let (height, width, _) = pixels.dim();

    for y in 0..height {
        for x in 0..width {
            let gray = luma_u8(pixels[[y, x, 0]], pixels[[y, x, 1]], pixels[[y, x, 2]]);

            pixels[[y, x, 0]] = gray;
            pixels[[y, x, 1]] = gray;
            pixels[[y, x, 2]] = gray;
        }
    }

    Ok(())
}
