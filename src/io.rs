//! Bit and byte sinks and sources.
//!
//! Sources never fail: reads past the end of the input yield zero. Coders rely
//! on this to leave trailing zero bits implicit, at the price that a truncated
//! stream decodes to *something* instead of erroring.

/// Packs bits into bytes, least significant bit first.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    current: u8,
    used: u32,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one bit (`false` = 0).
    pub fn write_bit(&mut self, bit: bool) {
        if bit {
            self.current |= 1 << self.used;
        }
        self.used += 1;
        if self.used == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.used = 0;
        }
    }

    /// Append `bit` followed by `count` copies of its complement.
    pub fn write_bit_with_followers(&mut self, bit: bool, count: u64) {
        self.write_bit(bit);
        for _ in 0..count {
            self.write_bit(!bit);
        }
    }

    /// Number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.bytes.len() as u64 * 8 + u64::from(self.used)
    }

    /// Flush the partial byte, padding with zeros.
    pub fn finish(mut self) -> Vec<u8> {
        if self.used != 0 {
            self.bytes.push(self.current);
        }
        self.bytes
    }
}

/// Reads bits in the order [`BitWriter`] writes them.
#[derive(Debug)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    used: u32,
}

impl<'a> BitReader<'a> {
    /// Read from `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            used: 0,
        }
    }

    /// Next bit, or 0 past the end of input.
    pub fn read_bit(&mut self) -> u64 {
        let Some(&byte) = self.bytes.get(self.pos) else {
            return 0;
        };
        let bit = (byte >> self.used) & 1;
        self.used += 1;
        if self.used == 8 {
            self.used = 0;
            self.pos += 1;
        }
        u64::from(bit)
    }

    /// Read `n <= 64` bits, first bit read ends up most significant.
    pub fn read_bits(&mut self, n: u32) -> u64 {
        (0..n).fold(0, |acc, _| (acc << 1) | self.read_bit())
    }
}

/// Sequential byte source.
#[derive(Debug)]
pub struct ByteReader<'a> {
    bytes: std::slice::Iter<'a, u8>,
}

impl<'a> ByteReader<'a> {
    /// Read from `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes: bytes.iter(),
        }
    }

    /// Next byte, or 0 past the end of input.
    pub fn read_byte(&mut self) -> u8 {
        self.bytes.next().copied().unwrap_or(0)
    }

    /// Read `n <= 8` bytes big-endian.
    pub fn read_be(&mut self, n: u32) -> u64 {
        (0..n).fold(0, |acc, _| (acc << 8) | u64::from(self.read_byte()))
    }
}
