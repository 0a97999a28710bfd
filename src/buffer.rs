//! Strided pixel buffer handed to the filters by the image loader.
//!
//! A `PixelBuffer` owns raw bytes plus the geometry needed to address them:
//! rows start every `stride` bytes and may carry trailing padding, pixels are
//! `channels` bytes wide. The filters only accept 4-channel RGBA buffers; other
//! channel counts can still be wrapped so the caller gets a proper
//! [`FilterError::InvalidFormat`] back instead of garbage output.
//!
//! The filters never index the byte vector directly. They borrow it as an
//! `ndarray` view of shape `(height, width, 4)` whose row stride is the
//! buffer stride, so padding bytes are skipped without copying.

use ndarray::{Array3, ArrayView3, ArrayViewMut3, ShapeBuilder};

use crate::error::FilterError;

/// Bytes per pixel for RGBA data.
pub const RGBA: usize = 4;

/// Rectangular grid of pixels with an explicit row stride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: u32,
    channels: u8,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a zeroed, tightly packed RGBA buffer.
    pub fn new(width: u32, height: u32) -> Result<Self, FilterError> {
        let stride = row_bytes(width, RGBA)?;
        let len = checked_len(stride, height)?;
        Ok(Self {
            width,
            height,
            stride,
            channels: RGBA as u8,
            pixels: vec![0; len],
        })
    }

    /// Wrap tightly packed RGBA bytes (`width * 4` bytes per row).
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, FilterError> {
        let stride = row_bytes(width, RGBA)?;
        Self::from_raw(width, height, stride, RGBA as u8, pixels)
    }

    /// Wrap bytes with an arbitrary row stride and channel count.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `stride` - Bytes from the start of one row to the next (>= width * channels)
    /// * `channels` - Bytes per pixel (1-4)
    /// * `pixels` - Raw bytes, at least `stride * height` long
    pub fn from_raw(
        width: u32,
        height: u32,
        stride: u32,
        channels: u8,
        pixels: Vec<u8>,
    ) -> Result<Self, FilterError> {
        if !(1..=4).contains(&channels) {
            return Err(FilterError::InvalidGeometry(format!(
                "unsupported channel count {channels}"
            )));
        }
        let min_stride = row_bytes(width, channels as usize)?;
        if stride < min_stride {
            return Err(FilterError::InvalidGeometry(format!(
                "stride {stride} is smaller than {min_stride} bytes per row"
            )));
        }
        let needed = checked_len(stride, height)?;
        if pixels.len() < needed {
            return Err(FilterError::InvalidGeometry(format!(
                "buffer holds {} bytes, {needed} required",
                pixels.len()
            )));
        }

        Ok(Self {
            width,
            height,
            stride,
            channels,
            pixels,
        })
    }

    /// Copy an `ndarray` image of shape (height, width, channels) into a packed buffer.
    pub fn from_array(image: ArrayView3<u8>) -> Result<Self, FilterError> {
        let (height, width, channels) = image.dim();
        let width = u32::try_from(width)
            .map_err(|_| FilterError::InvalidGeometry(format!("width {width} overflows u32")))?;
        let height = u32::try_from(height)
            .map_err(|_| FilterError::InvalidGeometry(format!("height {height} overflows u32")))?;
        let channels = u8::try_from(channels).map_err(|_| {
            FilterError::InvalidGeometry(format!("unsupported channel count {channels}"))
        })?;

        // Logical iteration order is row-major regardless of the source layout.
        let pixels: Vec<u8> = image.iter().copied().collect();
        let stride = row_bytes(width, channels as usize)?;
        Self::from_raw(width, height, stride, channels, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn channels(&self) -> usize {
        self.channels as usize
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Raw bytes including any row padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    pub fn has_same_dimensions(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Bounds-checked access to the channel bytes of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        let start = self.pixel_offset(x, y)?;
        self.pixels.get(start..start + self.channels())
    }

    /// Bounds-checked mutable access to the channel bytes of one pixel.
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        let start = self.pixel_offset(x, y)?;
        let channels = self.channels();
        self.pixels.get_mut(start..start + channels)
    }

    fn pixel_offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.stride as usize + x as usize * self.channels())
    }

    /// Fail with `InvalidFormat` unless the layout is 4-byte RGBA.
    pub fn require_rgba(&self) -> Result<(), FilterError> {
        if self.channels() != RGBA {
            return Err(FilterError::InvalidFormat {
                channels: self.channels(),
            });
        }
        Ok(())
    }

    /// Borrow the pixels as an RGBA view of shape (height, width, 4).
    pub fn view(&self) -> Result<ArrayView3<'_, u8>, FilterError> {
        self.require_rgba()?;
        let (height, width) = (self.height as usize, self.width as usize);
        if height == 0 || width == 0 {
            return Ok(ArrayView3::from_shape((height, width, RGBA), &self.pixels[..0])?);
        }
        let shape = (height, width, RGBA).strides((self.stride as usize, RGBA, 1));
        Ok(ArrayView3::from_shape(shape, self.pixels.as_slice())?)
    }

    /// Mutably borrow the pixels as an RGBA view of shape (height, width, 4).
    pub fn view_mut(&mut self) -> Result<ArrayViewMut3<'_, u8>, FilterError> {
        self.require_rgba()?;
        let (height, width) = (self.height as usize, self.width as usize);
        if height == 0 || width == 0 {
            return Ok(ArrayViewMut3::from_shape((height, width, RGBA), &mut self.pixels[..0])?);
        }
        let shape = (height, width, RGBA).strides((self.stride as usize, RGBA, 1));
        Ok(ArrayViewMut3::from_shape(shape, self.pixels.as_mut_slice())?)
    }

    /// Copy the pixel bytes without row padding.
    pub fn to_packed_vec(&self) -> Vec<u8> {
        let row_len = self.width as usize * self.channels();
        if row_len == 0 || self.height == 0 {
            return Vec::new();
        }
        let mut packed = Vec::with_capacity(row_len * self.height as usize);
        for row in self.pixels.chunks(self.stride as usize).take(self.height as usize) {
            packed.extend_from_slice(&row[..row_len]);
        }
        packed
    }

    /// Copy into an owned array of shape (height, width, channels).
    pub fn to_array(&self) -> Result<Array3<u8>, FilterError> {
        let shape = (self.height as usize, self.width as usize, self.channels());
        Ok(Array3::from_shape_vec(shape, self.to_packed_vec())?)
    }
}

fn row_bytes(width: u32, channels: usize) -> Result<u32, FilterError> {
    width
        .checked_mul(channels as u32)
        .ok_or_else(|| FilterError::InvalidGeometry(format!("row of {width} pixels overflows u32")))
}

fn checked_len(stride: u32, height: u32) -> Result<usize, FilterError> {
    (stride as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| FilterError::InvalidGeometry(format!("{stride}x{height} bytes overflows usize")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded_2x2() -> PixelBuffer {
        // 2 pixels per row plus 3 bytes of padding
        let bytes = vec![
            1, 2, 3, 4, 5, 6, 7, 8, 0xAA, 0xAA, 0xAA, //
            9, 10, 11, 12, 13, 14, 15, 16, 0xBB, 0xBB, 0xBB,
        ];
        PixelBuffer::from_raw(2, 2, 11, 4, bytes).unwrap()
    }

    #[test]
    fn test_new_is_packed_and_zeroed() {
        let buf = PixelBuffer::new(3, 2).unwrap();
        assert_eq!(buf.stride(), 12);
        assert_eq!(buf.as_bytes().len(), 24);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_stride_too_small_rejected() {
        let err = PixelBuffer::from_raw(4, 1, 15, 4, vec![0; 16]).unwrap_err();
        assert!(matches!(err, FilterError::InvalidGeometry(_)));
    }

    #[test]
    fn test_short_buffer_rejected() {
        let err = PixelBuffer::from_rgba8(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, FilterError::InvalidGeometry(_)));
    }

    #[test]
    fn test_pixel_access_honours_stride() {
        let buf = padded_2x2();
        assert_eq!(buf.pixel(0, 0), Some(&[1, 2, 3, 4][..]));
        assert_eq!(buf.pixel(1, 1), Some(&[13, 14, 15, 16][..]));
        assert_eq!(buf.pixel(2, 0), None);
        assert_eq!(buf.pixel(0, 2), None);
    }

    #[test]
    fn test_view_skips_padding() {
        let buf = padded_2x2();
        let view = buf.view().unwrap();
        assert_eq!(view.dim(), (2, 2, 4));
        assert_eq!(view[[1, 0, 0]], 9);
        assert_eq!(view[[1, 1, 3]], 16);
        assert!(view.iter().all(|&b| b != 0xAA && b != 0xBB));
    }

    #[test]
    fn test_view_mut_writes_through() {
        let mut buf = padded_2x2();
        buf.view_mut().unwrap()[[1, 1, 0]] = 99;
        assert_eq!(buf.pixel(1, 1).unwrap()[0], 99);
        // padding untouched
        assert_eq!(buf.as_bytes()[19], 0xBB);
    }

    #[test]
    fn test_view_rejects_rgb() {
        let buf = PixelBuffer::from_raw(1, 1, 3, 3, vec![1, 2, 3]).unwrap();
        assert_eq!(buf.view().unwrap_err(), FilterError::InvalidFormat { channels: 3 });
    }

    #[test]
    fn test_zero_area_view() {
        let buf = PixelBuffer::new(0, 5).unwrap();
        assert_eq!(buf.view().unwrap().dim(), (5, 0, 4));
        assert_eq!(buf.pixel_count(), 0);
    }

    #[test]
    fn test_packed_roundtrip_through_array() {
        let buf = padded_2x2();
        let arr = buf.to_array().unwrap();
        let back = PixelBuffer::from_array(arr.view()).unwrap();
        assert_eq!(back.stride(), 8);
        assert_eq!(back.to_packed_vec(), buf.to_packed_vec());
        assert_eq!(back.to_packed_vec().len(), 16);
    }
}
