//! Full-image decode pipeline.
//!
//! parse container -> Huffman decode the full symbol stream -> split into
//! N*N chunks in the same row-major block order the encoder used -> per
//! block inverse zigzag, dequantize, inverse DCT -> reassemble the padded
//! grid -> crop to the stored dimensions.

use log::debug;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::bit_io::BitReader;
use crate::container_reader;
use crate::dct::Dct;
use crate::error::CodecError;
use crate::huffman::CodeTable;
use crate::pixel_grid::PixelGrid;
use crate::quantization::dequantize_block;
use crate::zigzag;

/// Reconstructs a pixel grid from a compressed container.
pub fn decode(data: &[u8]) -> Result<PixelGrid, CodecError> {
    let parsed = container_reader::parse(data)?;
    let header = &parsed.header;

    let code_table = CodeTable::deserialize(parsed.code_table)?;

    let n = header.block_size as usize;
    let (padded_width, _) = header.padded_dimensions();
    let expected_symbols = header.symbol_count();
    debug!(
        "decoding {}x{} image, {} expected symbols",
        header.width, header.height, expected_symbols
    );

    let mut reader = BitReader::new(parsed.payload, parsed.valid_bits as u64);
    let symbols = code_table.decode_symbols(&mut reader, expected_symbols)?;

    let dct = Dct::new(n);
    let scan = zigzag::scan_order(n);
    let blocks_x = padded_width / n;
    let max_value = ((1u32 << header.bit_depth) - 1) as f64;

    let reconstruct_one = |chunk: &[i32]| -> Vec<u16> {
        let mut quantized = vec![0i32; n * n];
        zigzag::unflatten(chunk, &scan, &mut quantized);

        let mut coeffs = vec![0.0f64; n * n];
        dequantize_block(&quantized, &header.quant_matrix, &mut coeffs);

        let mut spatial = vec![0.0f64; n * n];
        dct.inverse(&coeffs, &mut spatial);

        spatial
            .iter()
            .map(|&v| v.round().clamp(0.0, max_value) as u16)
            .collect()
    };

    #[cfg(feature = "rayon")]
    let blocks: Vec<Vec<u16>> = symbols.par_chunks(n * n).map(reconstruct_one).collect();
    #[cfg(not(feature = "rayon"))]
    let blocks: Vec<Vec<u16>> = symbols.chunks(n * n).map(reconstruct_one).collect();

    // Reassemble the padded grid, then crop to the stored dimensions.
    let width = header.width as usize;
    let height = header.height as usize;
    let mut samples = vec![0u16; width * height];
    for (block_index, block) in blocks.iter().enumerate() {
        let by = block_index / blocks_x;
        let bx = block_index % blocks_x;
        for y in 0..n {
            let image_y = by * n + y;
            if image_y >= height {
                break;
            }
            for x in 0..n {
                let image_x = bx * n + x;
                if image_x >= width {
                    break;
                }
                samples[image_y * width + image_x] = block[y * n + x];
            }
        }
    }

    PixelGrid::new(width, height, header.bit_depth, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{EncodeOptions, encode};

    fn rmse(a: &PixelGrid, b: &PixelGrid) -> f64 {
        let sum: f64 = a
            .samples()
            .iter()
            .zip(b.samples())
            .map(|(&x, &y)| {
                let d = x as f64 - y as f64;
                d * d
            })
            .sum();
        (sum / a.samples().len() as f64).sqrt()
    }

    fn smooth_grid(width: usize, height: usize, bit_depth: u8) -> PixelGrid {
        let max = (1u32 << bit_depth) - 1;
        let samples: Vec<u16> = (0..width * height)
            .map(|i| {
                let x = (i % width) as f64 / width as f64;
                let y = (i / width) as f64 / height as f64;
                let v = (x * 0.6 + y * 0.4) * max as f64;
                v as u16
            })
            .collect();
        PixelGrid::new(width, height, bit_depth, samples).unwrap()
    }

    #[test]
    fn roundtrip_preserves_dimensions_and_depth() {
        let grid = smooth_grid(40, 24, 12);
        let data = encode(&grid, &EncodeOptions::default()).unwrap();
        let restored = decode(&data).unwrap();
        assert_eq!(restored.width(), 40);
        assert_eq!(restored.height(), 24);
        assert_eq!(restored.bit_depth(), 12);
    }

    #[test]
    fn roundtrip_of_non_block_aligned_image() {
        // 17x13 forces edge-replication padding on both axes.
        let grid = smooth_grid(17, 13, 16);
        let data = encode(&grid, &EncodeOptions::default()).unwrap();
        let restored = decode(&data).unwrap();
        assert_eq!(restored.width(), 17);
        assert_eq!(restored.height(), 13);
        assert!(rmse(&grid, &restored) < 300.0);
    }

    #[test]
    fn constant_image_is_exact_at_quality_100() {
        let grid = PixelGrid::new(16, 16, 16, vec![1000; 256]).unwrap();
        let data = encode(
            &grid,
            &EncodeOptions {
                quality: 100,
                block_size: 8,
            },
        )
        .unwrap();
        let restored = decode(&data).unwrap();
        assert_eq!(restored.samples(), grid.samples());
    }

    #[test]
    fn constant_image_on_dc_step_is_exact_at_quality_50() {
        // DC quantizer at quality 50 / depth 16 is 4096; a constant 1024
        // block has DC 8192 = 2 * 4096, which survives quantization exactly.
        let grid = PixelGrid::new(16, 16, 16, vec![1024; 256]).unwrap();
        let data = encode(
            &grid,
            &EncodeOptions {
                quality: 50,
                block_size: 8,
            },
        )
        .unwrap();
        let restored = decode(&data).unwrap();
        assert_eq!(restored.samples(), grid.samples());
    }

    #[test]
    fn constant_image_has_single_distinct_ac_symbol() {
        // Every AC coefficient of a constant image quantizes to zero, so the
        // compressed stream stays tiny at any quality.
        let grid = PixelGrid::new(64, 64, 16, vec![1000; 64 * 64]).unwrap();
        let data = encode(
            &grid,
            &EncodeOptions {
                quality: 50,
                block_size: 8,
            },
        )
        .unwrap();
        // Two distinct symbols (DC step and zero), one bit each: the payload
        // is one bit per coefficient plus the fixed header sections.
        assert!(data.len() < 800, "constant image grew to {} bytes", data.len());
        let restored = decode(&data).unwrap();
        // All blocks are identical, so all reconstructed samples match.
        let first = restored.samples()[0];
        assert!(restored.samples().iter().all(|&v| v == first));
    }

    #[test]
    fn rmse_decreases_with_quality() {
        let grid = smooth_grid(64, 64, 16);
        let mut errors = Vec::new();
        for quality in [10u8, 50, 90] {
            let data = encode(
                &grid,
                &EncodeOptions {
                    quality,
                    block_size: 8,
                },
            )
            .unwrap();
            let restored = decode(&data).unwrap();
            errors.push(rmse(&grid, &restored));
        }
        assert!(errors[1] <= errors[0], "rmse rose from q10 to q50: {errors:?}");
        assert!(errors[2] <= errors[1], "rmse rose from q50 to q90: {errors:?}");
    }

    #[test]
    fn decode_rejects_truncated_payload_section() {
        let grid = smooth_grid(16, 16, 16);
        let data = encode(&grid, &EncodeOptions::default()).unwrap();
        let result = decode(&data[..data.len() - 2]);
        assert!(matches!(
            result,
            Err(CodecError::MalformedContainer { .. })
        ));
    }

    #[test]
    fn works_with_nonstandard_block_sizes() {
        for block_size in [4u8, 16] {
            let grid = smooth_grid(32, 32, 16);
            let data = encode(
                &grid,
                &EncodeOptions {
                    quality: 80,
                    block_size,
                },
            )
            .unwrap();
            let restored = decode(&data).unwrap();
            assert_eq!(restored.width(), 32);
            assert!(rmse(&grid, &restored) < 500.0, "block size {block_size}");
        }
    }
}
