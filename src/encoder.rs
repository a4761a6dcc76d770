//! Full-image encode pipeline.
//!
//! pad -> per-block DCT + quantize + zigzag -> concatenate block symbol
//! streams in row-major block order -> frequency table -> Huffman encode ->
//! container assembly. The per-block stage has no inter-block dependency and
//! runs in parallel when the `rayon` feature is on; the frequency-table
//! reduction is the synchronization point before entropy coding.

use log::debug;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::bit_io::BitWriter;
use crate::constants::{DEFAULT_BLOCK_SIZE, DEFAULT_QUALITY};
use crate::container_writer::{ContainerHeader, write_container};
use crate::dct::Dct;
use crate::error::CodecError;
use crate::huffman::{CodeTable, count_frequencies};
use crate::pixel_grid::PixelGrid;
use crate::quantization::{self, quantize_block};
use crate::zigzag;

/// Tunable encode parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Quality 1-100; higher keeps more coefficient precision.
    pub quality: u8,
    /// Transform block size N; any even value >= 2.
    pub block_size: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

/// Compresses a pixel grid into a self-describing container.
pub fn encode(grid: &PixelGrid, options: &EncodeOptions) -> Result<Vec<u8>, CodecError> {
    let quant_matrix =
        quantization::build_matrix(options.quality, grid.bit_depth(), options.block_size)?;

    let n = options.block_size as usize;
    let (padded, padded_width, padded_height) = grid.pad_to_blocks(n);
    let blocks_x = padded_width / n;
    let blocks_y = padded_height / n;
    debug!(
        "encoding {}x{} image at quality {} ({}x{} blocks of {n})",
        grid.width(),
        grid.height(),
        options.quality,
        blocks_x,
        blocks_y
    );

    let dct = Dct::new(n);
    let scan = zigzag::scan_order(n);
    let symbols = transform_blocks(
        &padded,
        padded_width,
        blocks_x,
        blocks_y,
        &dct,
        &quant_matrix,
        &scan,
    );

    let frequencies = count_frequencies(&symbols);
    let code_table = CodeTable::from_frequencies(&frequencies)?;
    debug!(
        "{} symbols over {} distinct values",
        symbols.len(),
        code_table.len()
    );

    let mut writer = BitWriter::new();
    code_table.encode_symbols(&symbols, &mut writer)?;
    let (payload, valid_bits) = writer.finish();
    debug!("payload {} bytes ({valid_bits} bits)", payload.len());

    let header = ContainerHeader {
        width: grid.width() as u16,
        height: grid.height() as u16,
        bit_depth: grid.bit_depth(),
        block_size: options.block_size,
        quality: options.quality,
        quant_matrix,
    };
    write_container(&header, &code_table.serialize(), &payload, valid_bits)
}

/// Runs DCT, quantization, and zigzag over every block in row-major block
/// order and concatenates the per-block symbol sequences.
fn transform_blocks(
    padded: &[u16],
    padded_width: usize,
    blocks_x: usize,
    blocks_y: usize,
    dct: &Dct,
    quant_matrix: &[u16],
    scan: &[usize],
) -> Vec<i32> {
    let block_indices: Vec<usize> = (0..blocks_x * blocks_y).collect();

    let encode_one = |&block_index: &usize| -> Vec<i32> {
        let by = block_index / blocks_x;
        let bx = block_index % blocks_x;
        let n = dct.size();

        let mut block = vec![0.0f64; n * n];
        for y in 0..n {
            let row = (by * n + y) * padded_width + bx * n;
            for x in 0..n {
                block[y * n + x] = padded[row + x] as f64;
            }
        }

        let mut coeffs = vec![0.0f64; n * n];
        dct.forward(&block, &mut coeffs);

        let mut quantized = vec![0i32; n * n];
        quantize_block(&coeffs, quant_matrix, &mut quantized);

        let mut sequence = vec![0i32; n * n];
        zigzag::flatten(&quantized, scan, &mut sequence);
        sequence
    };

    #[cfg(feature = "rayon")]
    let per_block: Vec<Vec<i32>> = block_indices.par_iter().map(encode_one).collect();
    #[cfg(not(feature = "rayon"))]
    let per_block: Vec<Vec<i32>> = block_indices.iter().map(encode_one).collect();

    per_block.concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container_reader;

    fn gradient_grid(width: usize, height: usize) -> PixelGrid {
        let samples: Vec<u16> = (0..width * height)
            .map(|i| {
                let x = i % width;
                let y = i / width;
                ((x * 97 + y * 31) % 4096) as u16
            })
            .collect();
        PixelGrid::new(width, height, 16, samples).unwrap()
    }

    #[test]
    fn encoded_container_parses_back() {
        let grid = gradient_grid(24, 16);
        let data = encode(&grid, &EncodeOptions::default()).unwrap();
        let parsed = container_reader::parse(&data).unwrap();
        assert_eq!(parsed.header.width, 24);
        assert_eq!(parsed.header.height, 16);
        assert_eq!(parsed.header.bit_depth, 16);
        assert_eq!(parsed.header.block_size, 8);
        assert_eq!(parsed.header.quality, 75);
        assert_eq!(parsed.header.quant_matrix.len(), 64);
    }

    #[test]
    fn rejects_invalid_quality_before_processing() {
        let grid = gradient_grid(8, 8);
        let options = EncodeOptions {
            quality: 0,
            block_size: 8,
        };
        assert_eq!(encode(&grid, &options), Err(CodecError::InvalidQuality(0)));
    }

    #[test]
    fn rejects_odd_block_size() {
        let grid = gradient_grid(8, 8);
        let options = EncodeOptions {
            quality: 75,
            block_size: 5,
        };
        assert_eq!(
            encode(&grid, &options),
            Err(CodecError::InvalidBlockSize(5))
        );
    }

    #[test]
    fn higher_quality_does_not_shrink_output() {
        let grid = gradient_grid(32, 32);
        let low = encode(
            &grid,
            &EncodeOptions {
                quality: 10,
                block_size: 8,
            },
        )
        .unwrap();
        let high = encode(
            &grid,
            &EncodeOptions {
                quality: 95,
                block_size: 8,
            },
        )
        .unwrap();
        assert!(high.len() >= low.len());
    }
}
