//! Bit-oriented arithmetic coding.
//!
//! The interval `[low, high]` lives on a `precision`-bit grid. Once it falls
//! entirely into the lower or upper half, the leading bit is settled and is
//! shifted out. When it straddles the midpoint while trapped inside the middle
//! half, no bit is settled yet; the interval is expanded around the midpoint and
//! the undecided bit is counted, to be emitted (inverted) right after the next
//! settled bit. This is the carry counter of Witten, Neal and Cleary.

use crate::error::{Error, Result};
use crate::interval::Interval;
use crate::io::{BitReader, BitWriter};
use crate::model::check_alphabet;
use crate::policy::{Consume, Emit, Renormalize};

/// Default grid resolution in bits.
pub const DEFAULT_PRECISION: u32 = 32;

/// What to do when the interval is trapped in the middle half.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnderflowMode {
    /// Expand around the midpoint and defer the bit with a counter.
    #[default]
    FollowBits,
    /// Give up the upper part of the interval (`high = half - 1`), which
    /// settles the next bit as 0 right away. Simpler, slightly less efficient.
    Clamp,
}

/// Arithmetic coder over a configurable bit grid.
#[derive(Debug, Clone, Copy)]
pub struct ArithmeticCoder {
    alphabet_size: usize,
    precision: u32,
    underflow: UnderflowMode,
}

impl ArithmeticCoder {
    /// Coder with the default 32-bit precision.
    ///
    /// # Errors
    /// Returns `Error::EmptyAlphabet`/`Error::AlphabetTooLarge` if
    /// `alphabet_size` is not in `[1, 2^30]`.
    pub fn new(alphabet_size: usize) -> Result<Self> {
        Self::with_precision(alphabet_size, DEFAULT_PRECISION)
    }

    /// Coder with `precision` bits, allowing alphabets up to `2^(precision - 2)`.
    ///
    /// # Errors
    /// Returns `Error::InvalidPrecision` outside `[2, 32]`, and the alphabet
    /// errors of [`ArithmeticCoder::new`].
    pub fn with_precision(alphabet_size: usize, precision: u32) -> Result<Self> {
        if !(2..=32).contains(&precision) {
            return Err(Error::InvalidPrecision(precision));
        }
        check_alphabet(alphabet_size, 1 << (precision - 2))?;
        Ok(Self {
            alphabet_size,
            precision,
            underflow: UnderflowMode::FollowBits,
        })
    }

    /// Switch the underflow handling.
    pub fn with_underflow(mut self, underflow: UnderflowMode) -> Self {
        self.underflow = underflow;
        self
    }

    /// Grid resolution in bits.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Underflow handling in use.
    pub fn underflow(&self) -> UnderflowMode {
        self.underflow
    }

    fn grid(&self) -> Grid {
        Grid {
            half: 1 << (self.precision - 1),
            qtr: 1 << (self.precision - 2),
            mask: (1 << self.precision) - 1,
            underflow: self.underflow,
        }
    }
}

/// Where the interval sits relative to the quarter boundaries.
enum Zone {
    Lower,
    Upper,
    Middle,
    Wide,
}

#[derive(Debug, Clone, Copy)]
struct Grid {
    half: u64,
    qtr: u64,
    mask: u64,
    underflow: UnderflowMode,
}

impl Grid {
    fn zone(&self, low: u64, high: u64) -> Zone {
        if high < self.half {
            Zone::Lower
        } else if low >= self.half {
            Zone::Upper
        } else if low >= self.qtr && high < self.half + self.qtr {
            Zone::Middle
        } else {
            Zone::Wide
        }
    }
}

/// Encoder state: the output bits and the count of deferred bits.
#[derive(Debug)]
pub struct BitEmitter {
    grid: Grid,
    pending: u64,
    out: BitWriter,
}

impl Emit for BitEmitter {
    fn renormalize(&mut self, interval: &mut Interval) {
        let Grid { half, qtr, .. } = self.grid;
        let (mut low, mut high) = (interval.low, interval.high());
        loop {
            match self.grid.zone(low, high) {
                Zone::Lower => {
                    self.out.write_bit_with_followers(false, self.pending);
                    self.pending = 0;
                }
                Zone::Upper => {
                    self.out.write_bit_with_followers(true, self.pending);
                    self.pending = 0;
                    low -= half;
                    high -= half;
                }
                Zone::Middle => match self.grid.underflow {
                    UnderflowMode::FollowBits => {
                        self.pending += 1;
                        low -= qtr;
                        high -= qtr;
                    }
                    UnderflowMode::Clamp => {
                        high = half - 1;
                        continue;
                    }
                },
                Zone::Wide => break,
            }
            low <<= 1;
            high = (high << 1) | 1;
        }
        *interval = Interval::new(low, high - low + 1);
    }

    fn finish(mut self, interval: Interval) -> Vec<u8> {
        // The interval covers the second or the third quarter entirely; two
        // bits (plus the deferred ones) name the start of that quarter.
        self.pending += 1;
        self.out
            .write_bit_with_followers(interval.low >= self.grid.qtr, self.pending);
        self.out.finish()
    }
}

/// Decoder state: a `precision`-bit window onto the stream.
#[derive(Debug)]
pub struct BitConsumer<'a> {
    grid: Grid,
    value: u64,
    bits: BitReader<'a>,
}

impl Consume for BitConsumer<'_> {
    fn offset(&self, interval: &Interval) -> u64 {
        self.value.wrapping_sub(interval.low) & self.grid.mask
    }

    fn renormalize(&mut self, interval: &mut Interval) {
        let Grid {
            half, qtr, mask, ..
        } = self.grid;
        let (mut low, mut high) = (interval.low, interval.high());
        loop {
            match self.grid.zone(low, high) {
                Zone::Lower => {}
                Zone::Upper => {
                    self.value = self.value.wrapping_sub(half) & mask;
                    low -= half;
                    high -= half;
                }
                Zone::Middle => match self.grid.underflow {
                    UnderflowMode::FollowBits => {
                        self.value = self.value.wrapping_sub(qtr) & mask;
                        low -= qtr;
                        high -= qtr;
                    }
                    UnderflowMode::Clamp => {
                        high = half - 1;
                        continue;
                    }
                },
                Zone::Wide => break,
            }
            low <<= 1;
            high = (high << 1) | 1;
            self.value = ((self.value << 1) | self.bits.read_bit()) & mask;
        }
        *interval = Interval::new(low, high - low + 1);
    }
}

impl Renormalize for ArithmeticCoder {
    type Emitter = BitEmitter;
    type Consumer<'a> = BitConsumer<'a>;

    fn name(&self) -> &'static str {
        match self.underflow {
            UnderflowMode::FollowBits => "arithmetic",
            UnderflowMode::Clamp => "arithmetic-clamp",
        }
    }

    fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    fn threshold(&self) -> u64 {
        1 << (self.precision - 2)
    }

    fn initial_interval(&self) -> Interval {
        Interval::new(0, 1 << self.precision)
    }

    fn emitter(&self) -> BitEmitter {
        BitEmitter {
            grid: self.grid(),
            pending: 0,
            out: BitWriter::new(),
        }
    }

    fn consumer<'a>(&self, bytes: &'a [u8]) -> BitConsumer<'a> {
        let mut bits = BitReader::new(bytes);
        let value = bits.read_bits(self.precision);
        BitConsumer {
            grid: self.grid(),
            value,
            bits,
        }
    }
}
