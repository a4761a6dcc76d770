//! Adaptive Huffman entropy coding over quantized coefficient symbols.
//!
//! The encoder builds a minimum-weight prefix tree from the per-image symbol
//! frequencies, then discards the tree shape and keeps only the code lengths:
//! the wire format is a canonical (symbol, length) list, from which both
//! sides derive identical codes. Tree topology is never part of the wire
//! contract.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use crate::bit_io::{BitReader, BitWriter};
use crate::constants::MAXIMUM_CODE_LENGTH;
use crate::error::CodecError;

/// Symbol occurrence counts for one image's coefficient stream. A BTreeMap
/// keeps iteration in symbol order, which the deterministic tie-breaking of
/// the tree build relies on.
pub type FrequencyTable = BTreeMap<i32, u64>;

pub fn count_frequencies(symbols: &[i32]) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for &symbol in symbols {
        *table.entry(symbol).or_insert(0) += 1;
    }
    table
}

/// One canonical code table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeEntry {
    pub symbol: i32,
    pub length: u8,
}

/// Size of one serialized entry: i32 symbol + u8 code length.
pub const SERIALIZED_ENTRY_SIZE: usize = 5;

// Arena node for the tree build; children address the arena by index.
struct Node {
    weight: u64,
    symbol: Option<i32>,
    children: Option<(usize, usize)>,
}

/// A canonical prefix code over i32 symbols.
///
/// Holds the encode map plus per-length decode tables in the
/// `min_code`/`max_code`/`val_ptr` style: canonical codes of one length are
/// consecutive integers, so a decoded prefix is resolved with one compare
/// and one subtraction per candidate length.
pub struct CodeTable {
    entries: Vec<CodeEntry>,
    encode_map: HashMap<i32, (u64, u8)>,
    max_length: u8,
    counts: [u32; MAXIMUM_CODE_LENGTH as usize + 1],
    min_code: [u64; MAXIMUM_CODE_LENGTH as usize + 1],
    max_code: [u64; MAXIMUM_CODE_LENGTH as usize + 1],
    val_ptr: [usize; MAXIMUM_CODE_LENGTH as usize + 1],
}

impl CodeTable {
    /// Builds the code table for a frequency table via the classic greedy
    /// merge. Ties on equal weight break on insertion sequence, with leaves
    /// seeded in ascending symbol order, so the result is deterministic.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self, CodecError> {
        if frequencies.is_empty() {
            return Err(CodecError::EmptyFrequencyTable);
        }

        let mut arena: Vec<Node> = frequencies
            .iter()
            .map(|(&symbol, &weight)| Node {
                weight,
                symbol: Some(symbol),
                children: None,
            })
            .collect();

        let mut heap: BinaryHeap<Reverse<(u64, usize)>> = arena
            .iter()
            .enumerate()
            .map(|(index, node)| Reverse((node.weight, index)))
            .collect();

        while heap.len() > 1 {
            let Reverse((left_weight, left)) = heap.pop().expect("heap len checked");
            let Reverse((right_weight, right)) = heap.pop().expect("heap len checked");
            let parent = arena.len();
            arena.push(Node {
                weight: left_weight + right_weight,
                symbol: None,
                children: Some((left, right)),
            });
            heap.push(Reverse((left_weight + right_weight, parent)));
        }

        let Reverse((_, root)) = heap.pop().expect("at least one node");

        // Code length = leaf depth, except a lone symbol still gets one bit
        // so the payload length encodes the symbol count.
        let mut entries = Vec::with_capacity(frequencies.len());
        let mut stack = vec![(root, 0u32)];
        while let Some((index, depth)) = stack.pop() {
            let node = &arena[index];
            match (node.symbol, node.children) {
                (Some(symbol), None) => {
                    let length = depth.max(1);
                    if length > MAXIMUM_CODE_LENGTH as u32 {
                        return Err(CodecError::CorruptCodeTable("code length exceeds 64 bits"));
                    }
                    entries.push(CodeEntry {
                        symbol,
                        length: length as u8,
                    });
                }
                (None, Some((left, right))) => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
                _ => unreachable!("arena nodes are either leaves or internal"),
            }
        }

        entries.sort_by_key(|entry| (entry.length, entry.symbol));
        Self::from_entries(entries)
    }

    /// Builds the table from an already canonical (length, symbol)-sorted
    /// entry list, validating everything the decoder depends on before any
    /// code assignment: ordering, duplicate symbols, length bounds, and
    /// Kraft over-subscription.
    pub fn from_entries(entries: Vec<CodeEntry>) -> Result<Self, CodecError> {
        if entries.is_empty() {
            return Err(CodecError::CorruptCodeTable("table has no symbols"));
        }

        let mut kraft: u128 = 0;
        for (i, entry) in entries.iter().enumerate() {
            if entry.length == 0 {
                return Err(CodecError::CorruptCodeTable("zero code length"));
            }
            if entry.length > MAXIMUM_CODE_LENGTH {
                return Err(CodecError::CorruptCodeTable("code length exceeds 64 bits"));
            }
            if i > 0 {
                let prev = &entries[i - 1];
                if (entry.length, entry.symbol) <= (prev.length, prev.symbol) {
                    return Err(CodecError::CorruptCodeTable(
                        "entries not in canonical order",
                    ));
                }
            }
            kraft += 1u128 << (MAXIMUM_CODE_LENGTH - entry.length);
        }
        if kraft > 1u128 << MAXIMUM_CODE_LENGTH {
            return Err(CodecError::CorruptCodeTable(
                "code lengths oversubscribe the prefix space",
            ));
        }

        // Canonical assignment: codes of each length are consecutive,
        // starting from the previous length's first free slot shifted up.
        let mut encode_map = HashMap::with_capacity(entries.len());
        let mut counts = [0u32; MAXIMUM_CODE_LENGTH as usize + 1];
        let mut min_code = [0u64; MAXIMUM_CODE_LENGTH as usize + 1];
        let mut max_code = [0u64; MAXIMUM_CODE_LENGTH as usize + 1];
        let mut val_ptr = [0usize; MAXIMUM_CODE_LENGTH as usize + 1];

        let mut code: u64 = 0;
        let mut previous_length: u8 = 0;
        for (index, entry) in entries.iter().enumerate() {
            let length = entry.length as usize;
            // The shift distance hits 64 only for a first entry of length 64,
            // where the code is still zero.
            code = code
                .checked_shl((entry.length - previous_length) as u32)
                .unwrap_or(0);
            previous_length = entry.length;

            if counts[length] == 0 {
                min_code[length] = code;
                val_ptr[length] = index;
            }
            max_code[length] = code;
            counts[length] += 1;
            encode_map.insert(entry.symbol, (code, entry.length));
            code += 1;
        }

        let max_length = entries.last().map(|e| e.length).unwrap_or(0);
        Ok(Self {
            entries,
            encode_map,
            max_length,
            counts,
            min_code,
            max_code,
            val_ptr,
        })
    }

    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The (bit pattern, length) pair assigned to a symbol, if present.
    pub fn code_for(&self, symbol: i32) -> Option<(u64, u8)> {
        self.encode_map.get(&symbol).copied()
    }

    /// Serialized form: u16 entry count, then per entry the symbol as a
    /// big-endian i32 followed by the code length byte.
    pub fn serialize(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(2 + self.entries.len() * SERIALIZED_ENTRY_SIZE);
        data.extend_from_slice(&(self.entries.len() as u16).to_be_bytes());
        for entry in &self.entries {
            data.extend_from_slice(&entry.symbol.to_be_bytes());
            data.push(entry.length);
        }
        data
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, CodecError> {
        if data.len() < 2 {
            return Err(CodecError::CorruptCodeTable("table shorter than its count"));
        }
        let count = u16::from_be_bytes([data[0], data[1]]) as usize;
        if data.len() != 2 + count * SERIALIZED_ENTRY_SIZE {
            return Err(CodecError::CorruptCodeTable(
                "table size does not match entry count",
            ));
        }
        let entries = data[2..]
            .chunks_exact(SERIALIZED_ENTRY_SIZE)
            .map(|chunk| CodeEntry {
                symbol: i32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]),
                length: chunk[4],
            })
            .collect();
        Self::from_entries(entries)
    }

    /// Concatenates each symbol's code into the bit stream.
    pub fn encode_symbols(
        &self,
        symbols: &[i32],
        writer: &mut BitWriter,
    ) -> Result<(), CodecError> {
        for &symbol in symbols {
            let (code, length) = self
                .code_for(symbol)
                .ok_or(CodecError::SymbolNotInTable(symbol))?;
            writer.write_bits(code, length);
        }
        Ok(())
    }

    /// Reads exactly `expected` symbols from the bit stream.
    pub fn decode_symbols(
        &self,
        reader: &mut BitReader,
        expected: usize,
    ) -> Result<Vec<i32>, CodecError> {
        let mut symbols = Vec::with_capacity(expected);
        while symbols.len() < expected {
            let symbol = self.decode_one(reader, symbols.len(), expected)?;
            symbols.push(symbol);
        }
        Ok(symbols)
    }

    fn decode_one(
        &self,
        reader: &mut BitReader,
        decoded: usize,
        expected: usize,
    ) -> Result<i32, CodecError> {
        let mut code: u64 = 0;
        for length in 1..=self.max_length as usize {
            let bit = reader.read_bit().ok_or(CodecError::TruncatedStream {
                decoded,
                expected,
            })?;
            code = (code << 1) | bit as u64;
            if self.counts[length] > 0 && code <= self.max_code[length] && code >= self.min_code[length] {
                let index = self.val_ptr[length] + (code - self.min_code[length]) as usize;
                return Ok(self.entries[index].symbol);
            }
        }
        Err(CodecError::CorruptCodeTable(
            "bit pattern matches no code in the table",
        ))
    }
}
