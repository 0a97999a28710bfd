//! WebAssembly exports for the equalization filters.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. All of them
//! take flat, tightly packed RGBA bytes (length = width * height * 4) and
//! report filter errors as a thrown string.

use wasm_bindgen::prelude::*;

use crate::buffer::PixelBuffer;
use crate::error::FilterError;
use crate::filters::grayscale::to_grayscale;
use crate::filters::histogram::build_histogram;
use crate::pipeline::EqualizationPipeline;

fn to_js(err: FilterError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn wrap(data: &[u8], width: u32, height: u32) -> Result<PixelBuffer, JsValue> {
    PixelBuffer::from_rgba8(width, height, data.to_vec()).map_err(to_js)
}

// ============================================================================
// Grayscale
// ============================================================================

/// Convert RGBA u8 image to grayscale luma.
///
/// # Returns
/// Flat array of RGBA bytes with R=G=B=luma, alpha preserved
#[wasm_bindgen]
pub fn grayscale_rgba_wasm(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    let mut buffer = wrap(data, width, height)?;
    to_grayscale(&mut buffer).map_err(to_js)?;
    Ok(buffer.into_raw())
}

// ============================================================================
// Histogram
// ============================================================================

/// 256 red-channel counts of an RGBA u8 image.
#[wasm_bindgen]
pub fn histogram_wasm(data: &[u8], width: u32, height: u32) -> Result<Vec<u64>, JsValue> {
    let buffer = wrap(data, width, height)?;
    let hist = build_histogram(&buffer).map_err(to_js)?;
    Ok(hist.bins().to_vec())
}

/// `[mean, stddev]` of the red-channel histogram.
#[wasm_bindgen]
pub fn histogram_stats_wasm(data: &[u8], width: u32, height: u32) -> Result<Vec<f64>, JsValue> {
    let buffer = wrap(data, width, height)?;
    let stats = build_histogram(&buffer).map_err(to_js)?.stats();
    Ok(vec![stats.mean, stats.stddev])
}

// ============================================================================
// Equalization
// ============================================================================

/// Convert to grayscale if needed and histogram-equalize.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Returns
/// Flat array of equalized RGBA bytes
#[wasm_bindgen]
pub fn equalize_rgba_wasm(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    let buffer = wrap(data, width, height)?;
    let report = EqualizationPipeline::default().run(buffer).map_err(to_js)?;
    Ok(report.equalized.into_raw())
}
