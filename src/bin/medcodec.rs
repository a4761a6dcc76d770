//! medcodec CLI - compress and decompress high bit depth grayscale images.
//!
//! Uncompressed pixels are exchanged as raw little-endian u16 frames; the
//! compressed side is the self-describing MEDC container.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use medcodec_rs::{EncodeOptions, PixelGrid, container_reader, decode, encode};

/// Block-DCT codec for 12-16 bit grayscale medical images
#[derive(Parser)]
#[command(name = "medcodec")]
#[command(author = "medcodec-rs contributors")]
#[command(version)]
#[command(about = "Encode, decode, and inspect MEDC compressed images", long_about = None)]
#[command(after_help = "EXAMPLES:
    medcodec encode -i slice.raw -o slice.medc -w 512 -H 512 -q 80
    medcodec decode -i slice.medc -o slice.raw
    medcodec info -i slice.medc

Raw frames are unsigned 16-bit little-endian samples, row-major.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a raw pixel frame into a MEDC container
    #[command(visible_alias = "e")]
    Encode {
        /// Input raw pixel file (u16 little-endian)
        #[arg(short, long)]
        input: PathBuf,

        /// Output compressed file
        #[arg(short, long)]
        output: PathBuf,

        /// Image width in pixels
        #[arg(short, long)]
        width: usize,

        /// Image height in pixels
        #[arg(short = 'H', long)]
        height: usize,

        /// Bits of precision per sample (12-16)
        #[arg(short, long, default_value = "16")]
        bit_depth: u8,

        /// Quality level (1-100, higher keeps more detail)
        #[arg(short, long, default_value = "75")]
        quality: u8,

        /// Transform block size (even, >= 2)
        #[arg(long, default_value = "8")]
        block_size: u8,
    },

    /// Decode a MEDC container back to a raw pixel frame
    #[command(visible_alias = "d")]
    Decode {
        /// Input compressed file
        #[arg(short, long)]
        input: PathBuf,

        /// Output raw pixel file (u16 little-endian)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Display container header information without decoding the payload
    #[command(visible_alias = "i")]
    Info {
        /// Input compressed file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encode {
            input,
            output,
            width,
            height,
            bit_depth,
            quality,
            block_size,
        } => run_encode(&input, &output, width, height, bit_depth, quality, block_size),
        Commands::Decode { input, output } => run_decode(&input, &output),
        Commands::Info { input } => run_info(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_encode(
    input: &PathBuf,
    output: &PathBuf,
    width: usize,
    height: usize,
    bit_depth: u8,
    quality: u8,
    block_size: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = fs::read(input)?;
    let grid = PixelGrid::from_raw_le(&raw, width, height, bit_depth)?;

    let options = EncodeOptions {
        quality,
        block_size,
    };
    let compressed = encode(&grid, &options)?;
    fs::write(output, &compressed)?;

    let original_size = width * height * 2;
    let ratio = original_size as f64 / compressed.len() as f64;
    let bpp = (compressed.len() * 8) as f64 / (width * height) as f64;
    println!("Encoded {}x{} image ({} bits) to {:?}", width, height, bit_depth, output);
    println!("  Original:   {} bytes", original_size);
    println!("  Compressed: {} bytes", compressed.len());
    println!("  Ratio:      {:.2}:1", ratio);
    println!("  Rate:       {:.3} bpp", bpp);
    Ok(())
}

fn run_decode(input: &PathBuf, output: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let grid = decode(&data)?;
    fs::write(output, grid.to_raw_le())?;
    println!(
        "Decoded {}x{} image ({} bits) to {:?}",
        grid.width(),
        grid.height(),
        grid.bit_depth(),
        output
    );
    Ok(())
}

fn run_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let parsed = container_reader::parse(&data)?;
    let header = &parsed.header;

    println!("File: {:?}", input);
    println!("Size: {} bytes", data.len());
    println!();
    println!("Format: MEDC v1");
    println!("  Dimensions: {}x{}", header.width, header.height);
    println!("  Bit depth:  {} bits", header.bit_depth);
    println!("  Block size: {}", header.block_size);
    println!("  Quality:    {}", header.quality);
    println!("  Code table: {} bytes", parsed.code_table.len());
    println!(
        "  Payload:    {} bytes ({} valid bits)",
        parsed.payload.len(),
        parsed.valid_bits
    );
    Ok(())
}
