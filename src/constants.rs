use num_enum::TryFromPrimitive;

/// Container magic tag, first four bytes of every compressed file.
pub const MAGIC: [u8; 4] = *b"MEDC";

/// Revisions of the container format. Exactly one exists today; the decoder
/// rejects anything else before reading further fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ContainerVersion {
    V1 = 0x01,
}

pub const CURRENT_VERSION: ContainerVersion = ContainerVersion::V1;

pub const MINIMUM_QUALITY: u8 = 1;
pub const MAXIMUM_QUALITY: u8 = 100;
pub const DEFAULT_QUALITY: u8 = 75;

pub const MINIMUM_BIT_DEPTH: u8 = 12;
pub const MAXIMUM_BIT_DEPTH: u8 = 16;

pub const MINIMUM_BLOCK_SIZE: u8 = 2;
// N * N must fit the u16 element-count field; 254 is the largest even N.
pub const MAXIMUM_BLOCK_SIZE: u8 = 254;
pub const DEFAULT_BLOCK_SIZE: u8 = 8;

// Width and Height are serialized as u16.
pub const MAXIMUM_DIMENSION: usize = u16::MAX as usize;

// The serialized code table is length-prefixed with a u16.
pub const MAXIMUM_CODE_TABLE_SIZE: usize = u16::MAX as usize;

// Longest Huffman code length accepted on decode.
pub const MAXIMUM_CODE_LENGTH: u8 = 64;

/// Container size up to the quantization matrix, i.e. the fixed header part.
pub const FIXED_HEADER_SIZE: usize = 4 + 1 + 2 + 2 + 1 + 1 + 1 + 2;
