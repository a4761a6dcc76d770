//! Pixel grid container for single-channel high bit depth images.

use crate::constants::{MAXIMUM_BIT_DEPTH, MAXIMUM_DIMENSION, MINIMUM_BIT_DEPTH};
use crate::error::CodecError;

/// A single-channel image with 12-16 bits of precision per sample, stored
/// row-major. Samples always fit `u16`; values are checked against the
/// declared bit depth on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    bit_depth: u8,
    samples: Vec<u16>,
}

impl PixelGrid {
    pub fn new(
        width: usize,
        height: usize,
        bit_depth: u8,
        samples: Vec<u16>,
    ) -> Result<Self, CodecError> {
        if width == 0 || height == 0 || width > MAXIMUM_DIMENSION || height > MAXIMUM_DIMENSION {
            return Err(CodecError::InvalidDimensions { width, height });
        }
        if !(MINIMUM_BIT_DEPTH..=MAXIMUM_BIT_DEPTH).contains(&bit_depth) {
            return Err(CodecError::InvalidBitDepth(bit_depth));
        }
        if samples.len() != width * height {
            return Err(CodecError::InvalidDimensions { width, height });
        }
        let max_value = Self::max_value_for_depth(bit_depth);
        if let Some(&value) = samples.iter().find(|&&v| v > max_value) {
            return Err(CodecError::PixelOutOfRange { value, bit_depth });
        }
        Ok(Self {
            width,
            height,
            bit_depth,
            samples,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn max_value(&self) -> u16 {
        Self::max_value_for_depth(self.bit_depth)
    }

    fn max_value_for_depth(bit_depth: u8) -> u16 {
        (((1u32 << bit_depth) - 1) & 0xFFFF) as u16
    }

    /// Extends the grid on the right and bottom so both dimensions are
    /// multiples of `block_size`, replicating the last row/column. Returns
    /// the padded samples and the padded dimensions. The original dimensions
    /// travel in the container header, so cropping on decode is exact.
    pub fn pad_to_blocks(&self, block_size: usize) -> (Vec<u16>, usize, usize) {
        let padded_width = self.width.div_ceil(block_size) * block_size;
        let padded_height = self.height.div_ceil(block_size) * block_size;
        if padded_width == self.width && padded_height == self.height {
            return (self.samples.clone(), padded_width, padded_height);
        }

        let mut padded = vec![0u16; padded_width * padded_height];
        for y in 0..padded_height {
            let src_y = y.min(self.height - 1);
            let src_row = &self.samples[src_y * self.width..(src_y + 1) * self.width];
            let dst_row = &mut padded[y * padded_width..(y + 1) * padded_width];
            dst_row[..self.width].copy_from_slice(src_row);
            let edge = src_row[self.width - 1];
            for value in &mut dst_row[self.width..] {
                *value = edge;
            }
        }
        (padded, padded_width, padded_height)
    }

    /// Reads a raw little-endian u16 frame, the exchange format used by the
    /// CLI for uncompressed pixels.
    pub fn from_raw_le(
        data: &[u8],
        width: usize,
        height: usize,
        bit_depth: u8,
    ) -> Result<Self, CodecError> {
        if data.len() != width * height * 2 {
            return Err(CodecError::InvalidDimensions { width, height });
        }
        let samples = data
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::new(width, height, bit_depth, samples)
    }

    /// Serializes the samples as raw little-endian u16, the inverse of
    /// [`PixelGrid::from_raw_le`].
    pub fn to_raw_le(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.samples.len() * 2);
        for &value in &self.samples {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out
    }
}
