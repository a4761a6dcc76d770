use thiserror::Error;

/// Errors reported by the codec. All of these are terminal: they indicate
/// either bad caller parameters or a corrupt container, never a transient
/// condition, so nothing is retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid quality {0}, expected 1-100")]
    InvalidQuality(u8),
    #[error("invalid bit depth {0}, expected 12-16")]
    InvalidBitDepth(u8),
    #[error("invalid block size {0}, expected an even value of at least 2")]
    InvalidBlockSize(u8),
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("pixel value {value} exceeds the {bit_depth}-bit range")]
    PixelOutOfRange { value: u16, bit_depth: u8 },

    #[error("malformed container: {reason} (offset {offset})")]
    MalformedContainer { reason: &'static str, offset: usize },
    #[error("unsupported container version {0}")]
    UnsupportedVersion(u8),

    #[error("corrupt code table: {0}")]
    CorruptCodeTable(&'static str),
    #[error("truncated symbol stream: decoded {decoded} of {expected} symbols")]
    TruncatedStream { decoded: usize, expected: usize },
    #[error("symbol frequency table is empty")]
    EmptyFrequencyTable,
    #[error("symbol {0} has no code in the table")]
    SymbolNotInTable(i32),

    #[error("serialized code table is {0} bytes, limit is 65535")]
    CodeTableTooLarge(usize),
    #[error("encoded payload of {0} bits exceeds the container limit")]
    PayloadTooLarge(u64),
}
