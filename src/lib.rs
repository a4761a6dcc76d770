//! medcodec-rs: block-DCT compression for high bit depth grayscale images.
//!
//! The pipeline decorrelates 8x8 (configurable) spatial blocks with an
//! orthonormal DCT, quantizes the coefficients under a quality-derived
//! matrix, reorders them in zigzag order, entropy-codes the resulting symbol
//! stream with a canonical Huffman code, and packs everything into a
//! self-describing `MEDC` container. Decoding reverses every stage using
//! only the container contents.
//!
//! Image file parsing (DICOM and friends), metrics, and plotting live with
//! the callers; this crate consumes and produces raw pixel grids.

pub mod bit_io;
pub mod constants;
pub mod container_reader;
pub mod container_writer;
pub mod dct;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod huffman;
pub mod pixel_grid;
pub mod quantization;
pub mod zigzag;

pub use decoder::decode;
pub use encoder::{EncodeOptions, encode};
pub use error::CodecError;
pub use pixel_grid::PixelGrid;
