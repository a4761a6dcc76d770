//! Parsing and validation of the compressed container.
//!
//! The reader validates the magic and version before touching anything
//! content-dependent, then consumes each length-prefixed section with bounds
//! checks. Nothing proportional to the payload is allocated here: the parsed
//! view borrows the payload and code table slices from the input buffer.

use num_enum::TryFromPrimitive;

use crate::constants::{
    ContainerVersion, FIXED_HEADER_SIZE, MAGIC, MAXIMUM_BIT_DEPTH, MAXIMUM_QUALITY,
    MINIMUM_BIT_DEPTH, MINIMUM_QUALITY,
};
use crate::container_writer::ContainerHeader;
use crate::error::CodecError;

/// Borrowed view of a parsed container.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedContainer<'a> {
    pub header: ContainerHeader,
    pub code_table: &'a [u8],
    pub valid_bits: u32,
    pub payload: &'a [u8],
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, count: usize, field: &'static str) -> Result<&'a [u8], CodecError> {
        if self.pos + count > self.data.len() {
            return Err(CodecError::MalformedContainer {
                reason: field,
                offset: self.pos,
            });
        }
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    fn read_u8(&mut self, field: &'static str) -> Result<u8, CodecError> {
        Ok(self.take(1, field)?[0])
    }

    fn read_u16(&mut self, field: &'static str) -> Result<u16, CodecError> {
        let bytes = self.take(2, field)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&mut self, field: &'static str) -> Result<u32, CodecError> {
        let bytes = self.take(4, field)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

/// Parses and validates a container, returning header fields plus borrowed
/// code table and payload sections.
pub fn parse(data: &[u8]) -> Result<ParsedContainer<'_>, CodecError> {
    let mut cursor = Cursor { data, pos: 0 };

    let magic = cursor.take(4, "truncated magic")?;
    if magic != MAGIC {
        return Err(CodecError::MalformedContainer {
            reason: "bad magic number",
            offset: 0,
        });
    }
    let version = cursor.read_u8("truncated version")?;
    ContainerVersion::try_from_primitive(version)
        .map_err(|_| CodecError::UnsupportedVersion(version))?;

    let width = cursor.read_u16("truncated width")?;
    let height = cursor.read_u16("truncated height")?;
    let bit_depth = cursor.read_u8("truncated bit depth")?;
    let block_size = cursor.read_u8("truncated block size")?;
    let quality = cursor.read_u8("truncated quality")?;

    if width == 0 || height == 0 {
        return Err(CodecError::MalformedContainer {
            reason: "zero image dimension",
            offset: 5,
        });
    }
    if !(MINIMUM_BIT_DEPTH..=MAXIMUM_BIT_DEPTH).contains(&bit_depth) {
        return Err(CodecError::MalformedContainer {
            reason: "bit depth out of range",
            offset: 9,
        });
    }
    if block_size < 2 || block_size % 2 != 0 {
        return Err(CodecError::MalformedContainer {
            reason: "invalid block size",
            offset: 10,
        });
    }
    if !(MINIMUM_QUALITY..=MAXIMUM_QUALITY).contains(&quality) {
        return Err(CodecError::MalformedContainer {
            reason: "quality out of range",
            offset: 11,
        });
    }

    let element_count = cursor.read_u16("truncated quant element count")? as usize;
    if element_count != block_size as usize * block_size as usize {
        return Err(CodecError::MalformedContainer {
            reason: "quant element count does not match block size",
            offset: FIXED_HEADER_SIZE - 2,
        });
    }
    let quant_bytes = cursor.take(element_count * 2, "truncated quant matrix")?;
    let quant_matrix: Vec<u16> = quant_bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    if quant_matrix.iter().any(|&cell| cell == 0) {
        return Err(CodecError::MalformedContainer {
            reason: "zero quantization divisor",
            offset: FIXED_HEADER_SIZE,
        });
    }

    let table_size = cursor.read_u16("truncated code table size")? as usize;
    let code_table = cursor.take(table_size, "truncated code table")?;

    let valid_bits = cursor.read_u32("truncated valid bit count")?;
    let payload_size = cursor.read_u32("truncated payload size")? as usize;
    let payload_offset = cursor.pos;
    let payload = cursor.take(payload_size, "truncated payload")?;

    // The valid bits must fit the payload bytes.
    if valid_bits as u64 > payload.len() as u64 * 8 {
        return Err(CodecError::MalformedContainer {
            reason: "valid bit count exceeds payload length",
            offset: payload_offset - 8,
        });
    }

    Ok(ParsedContainer {
        header: ContainerHeader {
            width,
            height,
            bit_depth,
            block_size,
            quality,
            quant_matrix,
        },
        code_table,
        valid_bits,
        payload,
    })
}
