//! Carryless range coding (Subbotin).
//!
//! A byte-oriented range coder on a 32-bit register that never has to
//! propagate a carry into bytes it already wrote. It emits the top byte of
//! `low` as soon as `low` and `low + range - 1` agree on it. If the range drops
//! to the floor `MIN_RANGE` while they still disagree, the range is cut back to
//! end at the next multiple of `MIN_RANGE`, which makes the top byte agree by
//! force. Each cut throws away part of the interval, so the floor sits well
//! below the theoretical `2^24` to keep the loss small.

use crate::error::{Error, Result};
use crate::interval::Interval;
use crate::io::ByteReader;
use crate::model::check_alphabet;
use crate::policy::{Consume, Emit, Renormalize};

/// Default floor exponent: `2^(32 - 8 - 7)`.
pub const DEFAULT_MIN_RANGE_BITS: u32 = 17;

const WORD_MASK: u64 = u32::MAX as u64;
const TOP_SHIFT: u32 = 24;

/// Subbotin carryless range coder.
#[derive(Debug, Clone, Copy)]
pub struct CarrylessRangeCoder {
    alphabet_size: usize,
    min_range_bits: u32,
}

impl CarrylessRangeCoder {
    /// Coder with the default floor `2^17`.
    ///
    /// # Errors
    /// Returns `Error::EmptyAlphabet`/`Error::AlphabetTooLarge` if
    /// `alphabet_size` is not in `[1, 2^17]`.
    pub fn new(alphabet_size: usize) -> Result<Self> {
        Self::with_min_range_bits(alphabet_size, DEFAULT_MIN_RANGE_BITS)
    }

    /// Coder with floor `2^min_range_bits`.
    ///
    /// A higher floor gives finer probabilities but forces more range cuts.
    ///
    /// # Errors
    /// Returns `Error::InvalidMinRangeBits` outside `[8, 24]`, and
    /// `Error::AlphabetTooLarge` if the alphabet exceeds the floor.
    pub fn with_min_range_bits(alphabet_size: usize, min_range_bits: u32) -> Result<Self> {
        if !(8..=TOP_SHIFT).contains(&min_range_bits) {
            return Err(Error::InvalidMinRangeBits(min_range_bits));
        }
        check_alphabet(alphabet_size, 1 << min_range_bits)?;
        Ok(Self {
            alphabet_size,
            min_range_bits,
        })
    }

    /// Floor exponent in use.
    pub fn min_range_bits(&self) -> u32 {
        self.min_range_bits
    }

    fn min_range(&self) -> u64 {
        1 << self.min_range_bits
    }
}

/// Runs the renormalization loop, handing each settled top byte to `shift`.
///
/// Returns the number of forced range cuts.
fn renormalize_with(
    interval: &mut Interval,
    min_range: u64,
    mut shift: impl FnMut(u64),
) -> usize {
    let mut cuts = 0;
    loop {
        let settled = (interval.low ^ interval.high()) >> TOP_SHIFT == 0;
        if !settled {
            if interval.range > min_range {
                break;
            }
            interval.range = interval.low.wrapping_neg() & (min_range - 1);
            cuts += 1;
        }
        shift(interval.low >> TOP_SHIFT);
        interval.low = (interval.low << 8) & WORD_MASK;
        interval.range <<= 8;
    }
    debug_assert!(interval.low + interval.range <= 1 << 32);
    cuts
}

/// Encoder state.
#[derive(Debug)]
pub struct CarrylessEmitter {
    min_range: u64,
    out: Vec<u8>,
}

impl Emit for CarrylessEmitter {
    fn renormalize(&mut self, interval: &mut Interval) {
        let out = &mut self.out;
        let cuts = renormalize_with(interval, self.min_range, |byte| out.push(byte as u8));
        if cuts > 0 {
            log::trace!("range cut to {} at low {:#010x}", interval.range, interval.low);
        }
    }

    fn finish(mut self, interval: Interval) -> Vec<u8> {
        self.out
            .extend_from_slice(&(interval.low as u32).to_be_bytes());
        self.out
    }
}

/// Decoder state: a 32-bit window onto the stream.
#[derive(Debug)]
pub struct CarrylessConsumer<'a> {
    min_range: u64,
    value: u64,
    bytes: ByteReader<'a>,
}

impl Consume for CarrylessConsumer<'_> {
    fn offset(&self, interval: &Interval) -> u64 {
        self.value.wrapping_sub(interval.low) & WORD_MASK
    }

    fn renormalize(&mut self, interval: &mut Interval) {
        let (value, bytes) = (&mut self.value, &mut self.bytes);
        renormalize_with(interval, self.min_range, |_| {
            *value = ((*value << 8) | u64::from(bytes.read_byte())) & WORD_MASK;
        });
    }
}

impl Renormalize for CarrylessRangeCoder {
    type Emitter = CarrylessEmitter;
    type Consumer<'a> = CarrylessConsumer<'a>;

    fn name(&self) -> &'static str {
        "carryless-range"
    }

    fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    fn threshold(&self) -> u64 {
        self.min_range()
    }

    fn initial_interval(&self) -> Interval {
        Interval::new(0, 1 << 32)
    }

    fn emitter(&self) -> CarrylessEmitter {
        CarrylessEmitter {
            min_range: self.min_range(),
            out: Vec::new(),
        }
    }

    fn consumer<'a>(&self, bytes: &'a [u8]) -> CarrylessConsumer<'a> {
        let mut bytes = ByteReader::new(bytes);
        let value = bytes.read_be(4);
        CarrylessConsumer {
            min_range: self.min_range(),
            value,
            bytes,
        }
    }
}
