//! Quantization matrix derivation and coefficient quantization.

use crate::constants::{
    MAXIMUM_BIT_DEPTH, MAXIMUM_BLOCK_SIZE, MAXIMUM_QUALITY, MINIMUM_BIT_DEPTH, MINIMUM_BLOCK_SIZE,
    MINIMUM_QUALITY,
};
use crate::error::CodecError;

/// Standard JPEG luminance quantization table, the perceptual base weighting
/// for 8x8 blocks before quality and bit depth scaling.
pub const BASE_QUANT_TABLE_8: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, //
    12, 12, 14, 19, 26, 58, 60, 55, //
    14, 13, 16, 24, 40, 57, 69, 56, //
    14, 17, 22, 29, 51, 87, 80, 62, //
    18, 22, 37, 56, 68, 109, 103, 77, //
    24, 35, 55, 64, 81, 104, 113, 92, //
    49, 64, 78, 87, 103, 121, 120, 101, //
    72, 92, 95, 98, 112, 100, 103, 99,
];

pub fn validate_quality(quality: u8) -> Result<(), CodecError> {
    if !(MINIMUM_QUALITY..=MAXIMUM_QUALITY).contains(&quality) {
        return Err(CodecError::InvalidQuality(quality));
    }
    Ok(())
}

pub fn validate_bit_depth(bit_depth: u8) -> Result<(), CodecError> {
    if !(MINIMUM_BIT_DEPTH..=MAXIMUM_BIT_DEPTH).contains(&bit_depth) {
        return Err(CodecError::InvalidBitDepth(bit_depth));
    }
    Ok(())
}

pub fn validate_block_size(block_size: u8) -> Result<(), CodecError> {
    if block_size < MINIMUM_BLOCK_SIZE || block_size > MAXIMUM_BLOCK_SIZE || block_size % 2 != 0 {
        return Err(CodecError::InvalidBlockSize(block_size));
    }
    Ok(())
}

/// Base N*N weighting table. N = 8 is the standard table; other sizes sample
/// it nearest-neighbor, which keeps the increase-with-frequency shape.
fn base_table(block_size: usize) -> Vec<u16> {
    if block_size == 8 {
        return BASE_QUANT_TABLE_8.to_vec();
    }
    let mut table = vec![0u16; block_size * block_size];
    for i in 0..block_size {
        for j in 0..block_size {
            let si = i * 8 / block_size;
            let sj = j * 8 / block_size;
            table[i * block_size + j] = BASE_QUANT_TABLE_8[si * 8 + sj];
        }
    }
    table
}

/// Derives the quantization matrix for a (quality, bit depth, block size)
/// triple. Every cell lands in [1, 65535]; the floor of 1 rules out division
/// by zero downstream. Pure function, embedded verbatim in the container so
/// the decoder never recomputes it.
pub fn build_matrix(
    quality: u8,
    bit_depth: u8,
    block_size: u8,
) -> Result<Vec<u16>, CodecError> {
    validate_quality(quality)?;
    validate_bit_depth(bit_depth)?;
    validate_block_size(block_size)?;

    // Quality 100 lands on scale 0, which the clamp turns into an all-ones
    // matrix: near-lossless quantization.
    let scale: u64 = if quality < 50 {
        5000 / quality as u64
    } else {
        200 - 2 * quality as u64
    };
    let depth_scale = 1u64 << (bit_depth - 8);

    let table = base_table(block_size as usize);
    let matrix = table
        .iter()
        .map(|&base| {
            let value = (base as u64 * scale * depth_scale + 50) / 100;
            value.clamp(1, 65535) as u16
        })
        .collect();
    Ok(matrix)
}

/// Divides each coefficient by its matrix cell, rounding half away from
/// zero. This is the lossy step; everything else in the pipeline inverts
/// exactly.
pub fn quantize_block(coeffs: &[f64], matrix: &[u16], output: &mut [i32]) {
    debug_assert_eq!(coeffs.len(), matrix.len());
    debug_assert_eq!(coeffs.len(), output.len());
    for i in 0..coeffs.len() {
        output[i] = (coeffs[i] / matrix[i] as f64).round() as i32;
    }
}

/// Multiplies quantized symbols back by the matrix cells.
pub fn dequantize_block(symbols: &[i32], matrix: &[u16], output: &mut [f64]) {
    debug_assert_eq!(symbols.len(), matrix.len());
    debug_assert_eq!(symbols.len(), output.len());
    for i in 0..symbols.len() {
        output[i] = symbols[i] as f64 * matrix[i] as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_cells_in_range_for_every_quality_and_depth() {
        for quality in 1..=100u8 {
            for bit_depth in 12..=16u8 {
                let matrix = build_matrix(quality, bit_depth, 8).unwrap();
                assert_eq!(matrix.len(), 64);
                assert!(matrix.iter().all(|&q| (1..=65535).contains(&q)));
            }
        }
    }

    #[test]
    fn quality_100_is_near_lossless() {
        let matrix = build_matrix(100, 16, 8).unwrap();
        assert!(matrix.iter().all(|&q| q == 1));
    }

    #[test]
    fn higher_quality_never_coarsens_a_cell() {
        let coarse = build_matrix(30, 16, 8).unwrap();
        let fine = build_matrix(80, 16, 8).unwrap();
        for (c, f) in coarse.iter().zip(&fine) {
            assert!(f <= c);
        }
    }

    #[test]
    fn known_dc_cell_at_quality_50_depth_16() {
        // (16 * 100 * 256 + 50) / 100 = 4096
        let matrix = build_matrix(50, 16, 8).unwrap();
        assert_eq!(matrix[0], 4096);
    }

    #[test]
    fn nonstandard_block_sizes_produce_full_matrices() {
        for block_size in [2u8, 4, 16] {
            let matrix = build_matrix(75, 12, block_size).unwrap();
            assert_eq!(matrix.len(), block_size as usize * block_size as usize);
            assert!(matrix.iter().all(|&q| q >= 1));
        }
    }

    #[test]
    fn rejects_bad_parameters() {
        assert_eq!(build_matrix(0, 16, 8), Err(CodecError::InvalidQuality(0)));
        assert_eq!(
            build_matrix(101, 16, 8),
            Err(CodecError::InvalidQuality(101))
        );
        assert_eq!(build_matrix(75, 8, 8), Err(CodecError::InvalidBitDepth(8)));
        assert_eq!(
            build_matrix(75, 16, 7),
            Err(CodecError::InvalidBlockSize(7))
        );
        assert_eq!(
            build_matrix(75, 16, 0),
            Err(CodecError::InvalidBlockSize(0))
        );
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        let matrix = [2u16, 2, 2, 2];
        let coeffs = [3.0, -3.0, 2.9, -2.9];
        let mut out = [0i32; 4];
        quantize_block(&coeffs, &matrix, &mut out);
        assert_eq!(out, [2, -2, 1, -1]);
    }

    #[test]
    fn dequantize_inverts_scale() {
        let matrix = [3u16, 5, 7, 11];
        let symbols = [2i32, -4, 0, 1];
        let mut out = [0.0f64; 4];
        dequantize_block(&symbols, &matrix, &mut out);
        assert_eq!(out, [6.0, -20.0, 0.0, 11.0]);
    }
}
