//! Serialization of the compressed container.
//!
//! Layout (all multi-byte integers big-endian):
//!
//! | Field               | Size    |
//! |---------------------|---------|
//! | Magic `MEDC`        | 4 B     |
//! | Version             | 1 B     |
//! | Width               | 2 B     |
//! | Height              | 2 B     |
//! | Bit depth           | 1 B     |
//! | Block size          | 1 B     |
//! | Quality             | 1 B     |
//! | Quant element count | 2 B     |
//! | Quant matrix        | 2·N² B  |
//! | Code table size     | 2 B     |
//! | Code table          | var     |
//! | Valid bit count     | 4 B     |
//! | Payload byte size   | 4 B     |
//! | Payload             | var     |
//!
//! Every content-dependent decode parameter is embedded here; the decoder
//! needs no side channel.

use crate::constants::{CURRENT_VERSION, MAGIC, MAXIMUM_CODE_TABLE_SIZE};
use crate::error::CodecError;

/// The fixed decode parameters of one compressed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub width: u16,
    pub height: u16,
    pub bit_depth: u8,
    pub block_size: u8,
    pub quality: u8,
    pub quant_matrix: Vec<u16>,
}

impl ContainerHeader {
    /// Block grid implied by the header: padded dimensions are the smallest
    /// block multiples covering the image.
    pub fn padded_dimensions(&self) -> (usize, usize) {
        let n = self.block_size as usize;
        let padded_width = (self.width as usize).div_ceil(n) * n;
        let padded_height = (self.height as usize).div_ceil(n) * n;
        (padded_width, padded_height)
    }

    /// Total coefficient count of the padded image, the expected symbol
    /// count of the payload. Computable, so it is not a container field.
    pub fn symbol_count(&self) -> usize {
        let (padded_width, padded_height) = self.padded_dimensions();
        padded_width * padded_height
    }
}

/// Assembles the complete container from its finished sections.
pub fn write_container(
    header: &ContainerHeader,
    code_table: &[u8],
    payload: &[u8],
    valid_bits: u64,
) -> Result<Vec<u8>, CodecError> {
    let element_count = header.quant_matrix.len();
    debug_assert_eq!(
        element_count,
        header.block_size as usize * header.block_size as usize
    );

    if code_table.len() > MAXIMUM_CODE_TABLE_SIZE {
        return Err(CodecError::CodeTableTooLarge(code_table.len()));
    }
    if valid_bits > u32::MAX as u64 || payload.len() > u32::MAX as usize {
        return Err(CodecError::PayloadTooLarge(valid_bits));
    }

    let mut data = Vec::with_capacity(
        crate::constants::FIXED_HEADER_SIZE + element_count * 2 + 2 + code_table.len() + 8
            + payload.len(),
    );
    data.extend_from_slice(&MAGIC);
    data.push(CURRENT_VERSION as u8);
    data.extend_from_slice(&header.width.to_be_bytes());
    data.extend_from_slice(&header.height.to_be_bytes());
    data.push(header.bit_depth);
    data.push(header.block_size);
    data.push(header.quality);

    data.extend_from_slice(&(element_count as u16).to_be_bytes());
    for &cell in &header.quant_matrix {
        data.extend_from_slice(&cell.to_be_bytes());
    }

    data.extend_from_slice(&(code_table.len() as u16).to_be_bytes());
    data.extend_from_slice(code_table);

    data.extend_from_slice(&(valid_bits as u32).to_be_bytes());
    data.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    data.extend_from_slice(payload);

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> ContainerHeader {
        ContainerHeader {
            width: 17,
            height: 9,
            bit_depth: 16,
            block_size: 8,
            quality: 75,
            quant_matrix: vec![1; 64],
        }
    }

    #[test]
    fn emits_magic_version_and_fields_in_order() {
        let data = write_container(&sample_header(), &[0xAA, 0xBB], &[0xCC], 5).unwrap();
        assert_eq!(&data[0..4], b"MEDC");
        assert_eq!(data[4], 0x01);
        assert_eq!(&data[5..7], &17u16.to_be_bytes());
        assert_eq!(&data[7..9], &9u16.to_be_bytes());
        assert_eq!(data[9], 16); // bit depth
        assert_eq!(data[10], 8); // block size
        assert_eq!(data[11], 75); // quality
        assert_eq!(&data[12..14], &64u16.to_be_bytes());
        // 64 quant cells of value 1.
        let quant_end = 14 + 128;
        assert_eq!(&data[quant_end..quant_end + 2], &2u16.to_be_bytes());
        assert_eq!(&data[quant_end + 2..quant_end + 4], &[0xAA, 0xBB]);
        let bits_at = quant_end + 4;
        assert_eq!(&data[bits_at..bits_at + 4], &5u32.to_be_bytes());
        assert_eq!(&data[bits_at + 4..bits_at + 8], &1u32.to_be_bytes());
        assert_eq!(data[bits_at + 8], 0xCC);
        assert_eq!(data.len(), bits_at + 9);
    }

    #[test]
    fn padded_dimensions_round_up() {
        let header = sample_header();
        assert_eq!(header.padded_dimensions(), (24, 16));
        assert_eq!(header.symbol_count(), 24 * 16);
    }

    #[test]
    fn oversized_code_table_is_rejected() {
        let table = vec![0u8; MAXIMUM_CODE_TABLE_SIZE + 1];
        assert_eq!(
            write_container(&sample_header(), &table, &[], 0),
            Err(CodecError::CodeTableTooLarge(MAXIMUM_CODE_TABLE_SIZE + 1))
        );
    }
}
