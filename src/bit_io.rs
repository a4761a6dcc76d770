//! Bit-level cursors over byte buffers, MSB first.
//!
//! The container stores an explicit valid-bit count because the payload is
//! padded to a byte boundary; the writer reports exactly how many bits it
//! produced and the reader refuses to serve padding bits.

/// Accumulates bits into a growing byte buffer.
pub struct BitWriter {
    data: Vec<u8>,
    bit_buffer: u8,
    bits_in_buffer: u8,
    total_bits: u64,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            bit_buffer: 0,
            bits_in_buffer: 0,
            total_bits: 0,
        }
    }

    pub fn write_bit(&mut self, bit: u8) {
        self.bit_buffer = (self.bit_buffer << 1) | (bit & 1);
        self.bits_in_buffer += 1;
        self.total_bits += 1;
        if self.bits_in_buffer == 8 {
            self.data.push(self.bit_buffer);
            self.bit_buffer = 0;
            self.bits_in_buffer = 0;
        }
    }

    /// Writes the low `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u64, count: u8) {
        for shift in (0..count).rev() {
            self.write_bit(((value >> shift) & 1) as u8);
        }
    }

    /// Number of meaningful bits written so far.
    pub fn bit_count(&self) -> u64 {
        self.total_bits
    }

    /// Flushes the final partial byte (zero padded) and returns the buffer
    /// together with the valid-bit count.
    pub fn finish(mut self) -> (Vec<u8>, u64) {
        if self.bits_in_buffer > 0 {
            self.bit_buffer <<= 8 - self.bits_in_buffer;
            self.data.push(self.bit_buffer);
        }
        (self.data, self.total_bits)
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Serves bits from a byte slice, bounded by a valid-bit budget.
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    bit_buffer: u8,
    bits_left: u8,
    remaining_bits: u64,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8], valid_bits: u64) -> Self {
        Self {
            data,
            pos: 0,
            bit_buffer: 0,
            bits_left: 0,
            remaining_bits: valid_bits,
        }
    }

    /// Next bit, or `None` once the valid bits (or the buffer) run out.
    pub fn read_bit(&mut self) -> Option<u8> {
        if self.remaining_bits == 0 {
            return None;
        }
        if self.bits_left == 0 {
            if self.pos >= self.data.len() {
                return None;
            }
            self.bit_buffer = self.data[self.pos];
            self.pos += 1;
            self.bits_left = 8;
        }
        let bit = (self.bit_buffer >> (self.bits_left - 1)) & 1;
        self.bits_left -= 1;
        self.remaining_bits -= 1;
        Some(bit)
    }

    pub fn remaining_bits(&self) -> u64 {
        self.remaining_bits
    }
}
