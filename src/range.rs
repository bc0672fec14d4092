//! Range coding with carry propagation.
//!
//! `low` is a 31-bit register whose bit 31 catches carries. The top byte of
//! `low` cannot be written as soon as it is shifted out, because a later
//! addition may still carry into it. The encoder therefore holds back one byte
//! (`cache`) plus a run of `0xFF` bytes behind it, any of which a carry would
//! turn into `cache + 1` followed by `0x00`s. As soon as `low` proves that no
//! carry can reach them, or that one already has, they are released.

use crate::error::Result;
use crate::interval::Interval;
use crate::io::ByteReader;
use crate::model::check_alphabet;
use crate::policy::{Consume, Emit, Renormalize};

const TOP: u64 = 1 << 31;
const LOW_MASK: u64 = TOP - 1;
/// Renormalization floor; also the largest table total.
pub const MIN_RANGE: u64 = TOP >> 8;
const CACHE_SHIFT: u32 = 23;

/// Carry-propagating range coder.
#[derive(Debug, Clone, Copy)]
pub struct RangeCoder {
    alphabet_size: usize,
}

impl RangeCoder {
    /// Coder over `alphabet_size` symbols.
    ///
    /// # Errors
    /// Returns `Error::EmptyAlphabet`/`Error::AlphabetTooLarge` if
    /// `alphabet_size` is not in `[1, 2^23]`.
    pub fn new(alphabet_size: usize) -> Result<Self> {
        check_alphabet(alphabet_size, MIN_RANGE)?;
        Ok(Self { alphabet_size })
    }
}

/// Encoder state: the held-back byte and the run of undetermined bytes behind it.
#[derive(Debug, Default)]
pub struct CarryEmitter {
    cache: Option<u8>,
    run: u64,
    out: Vec<u8>,
}

impl CarryEmitter {
    /// Write the cache and the run, adding `carry` to them.
    fn release(&mut self, carry: bool) {
        match self.cache {
            Some(byte) => {
                debug_assert!(!(carry && byte == 0xFF));
                self.out.push(byte.wrapping_add(u8::from(carry)));
            }
            // Nothing lies above the first byte to carry into.
            None => debug_assert!(!carry),
        }
        let fill = if carry { 0x00 } else { 0xFF };
        self.out.resize(self.out.len() + self.run as usize, fill);
        self.run = 0;
    }

    fn shift_low(&mut self, low: &mut u64) {
        if *low < TOP - MIN_RANGE {
            self.release(false);
            self.cache = Some((*low >> CACHE_SHIFT) as u8);
        } else if *low >= TOP {
            log::trace!("carry into cached byte over a run of {}", self.run);
            self.release(true);
            self.cache = Some((*low >> CACHE_SHIFT) as u8);
        } else {
            self.run += 1;
        }
        *low = (*low << 8) & LOW_MASK;
    }
}

impl Emit for CarryEmitter {
    fn renormalize(&mut self, interval: &mut Interval) {
        while interval.range <= MIN_RANGE {
            self.shift_low(&mut interval.low);
            interval.range <<= 8;
        }
    }

    fn finish(mut self, interval: Interval) -> Vec<u8> {
        // Round up to a multiple of the floor: still inside the interval
        // because range > MIN_RANGE, and every bit below the top byte is zero,
        // which the reader supplies by itself.
        let mut low = (interval.low + MIN_RANGE - 1) & !(MIN_RANGE - 1);
        debug_assert!(low < interval.low + interval.range);
        self.shift_low(&mut low);
        debug_assert_eq!(low, 0);
        self.release(false);
        self.out
    }
}

/// Decoder state: a 31-bit window onto the stream, which is offset by one bit
/// from the byte boundaries.
#[derive(Debug)]
pub struct CarryConsumer<'a> {
    value: u64,
    spill: u64,
    bytes: ByteReader<'a>,
}

impl Consume for CarryConsumer<'_> {
    fn offset(&self, interval: &Interval) -> u64 {
        self.value.wrapping_sub(interval.low) & LOW_MASK
    }

    fn renormalize(&mut self, interval: &mut Interval) {
        while interval.range <= MIN_RANGE {
            let next = u64::from(self.bytes.read_byte());
            self.value = ((self.value << 8) | (self.spill << 7) | (next >> 1)) & LOW_MASK;
            self.spill = next & 1;
            interval.low = (interval.low << 8) & LOW_MASK;
            interval.range <<= 8;
        }
    }
}

impl Renormalize for RangeCoder {
    type Emitter = CarryEmitter;
    type Consumer<'a> = CarryConsumer<'a>;

    fn name(&self) -> &'static str {
        "range"
    }

    fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    fn threshold(&self) -> u64 {
        MIN_RANGE
    }

    fn initial_interval(&self) -> Interval {
        Interval::new(0, TOP)
    }

    fn emitter(&self) -> CarryEmitter {
        CarryEmitter::default()
    }

    fn consumer<'a>(&self, bytes: &'a [u8]) -> CarryConsumer<'a> {
        let mut bytes = ByteReader::new(bytes);
        let head = bytes.read_be(4);
        CarryConsumer {
            value: head >> 1,
            spill: head & 1,
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::FrequencyTable;
    use proptest::prelude::*;

    #[test]
    fn test_alphabet_limit() {
        assert!(RangeCoder::new(1 << 23).is_ok());
        assert!(matches!(
            RangeCoder::new((1 << 23) + 1),
            Err(Error::AlphabetTooLarge { .. })
        ));
    }

    #[test]
    fn test_carry_rewrites_held_bytes() {
        let mut emitter = CarryEmitter::default();
        // Settled byte 0x12 goes to the cache.
        let mut low = 0x12u64 << CACHE_SHIFT;
        emitter.shift_low(&mut low);
        // Two ambiguous 0xFF bytes.
        let mut low = TOP - 1;
        emitter.shift_low(&mut low);
        let mut low = TOP - 1;
        emitter.shift_low(&mut low);
        assert_eq!(emitter.run, 2);
        assert!(emitter.out.is_empty());
        // A carry arrives.
        let mut low = TOP | (0x34 << CACHE_SHIFT);
        emitter.shift_low(&mut low);
        assert_eq!(emitter.out, vec![0x13, 0x00, 0x00]);
        assert_eq!(emitter.cache, Some(0x34));
        assert_eq!(emitter.run, 0);
    }

    #[test]
    fn test_no_carry_releases_ff_run() {
        let mut emitter = CarryEmitter::default();
        let mut low = 0x40u64 << CACHE_SHIFT;
        emitter.shift_low(&mut low);
        let mut low = TOP - MIN_RANGE;
        emitter.shift_low(&mut low);
        let mut low = 0x01u64 << CACHE_SHIFT;
        emitter.shift_low(&mut low);
        assert_eq!(emitter.out, vec![0x40, 0xFF]);
        assert_eq!(emitter.cache, Some(0x01));
    }

    #[test]
    fn test_leading_ambiguous_bytes_have_no_cache() {
        let mut emitter = CarryEmitter::default();
        let mut low = TOP - 1;
        emitter.shift_low(&mut low);
        let mut low = 0x05u64 << CACHE_SHIFT;
        emitter.shift_low(&mut low);
        assert_eq!(emitter.out, vec![0xFF]);
        assert_eq!(emitter.cache, Some(0x05));
    }

    #[test]
    fn test_skewed_message_roundtrip() {
        let coder = RangeCoder::new(4).unwrap();
        let message = [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3];
        let table = coder.count(&message).unwrap();
        let encoded = coder.encode(&table, &message).unwrap();
        assert_eq!(coder.decode(&table, &encoded, message.len()).unwrap(), message);
    }

    #[test]
    fn test_top_heavy_table_forces_carries() {
        // The last symbol owns almost the whole interval, so low keeps
        // creeping towards TOP and runs of 0xFF pile up.
        let coder = RangeCoder::new(3).unwrap();
        let table = FrequencyTable::from_frequencies(vec![1, 1, 4000], MIN_RANGE).unwrap();
        let mut message = vec![2u32; 5000];
        for i in (0..5000).step_by(97) {
            message[i] = (i % 2) as u32;
        }
        let encoded = coder.encode(&table, &message).unwrap();
        assert_eq!(coder.decode(&table, &encoded, message.len()).unwrap(), message);
    }

    #[test]
    fn test_short_message_without_renormalization() {
        let coder = RangeCoder::new(2).unwrap();
        let table = FrequencyTable::from_frequencies(vec![1, 1], MIN_RANGE).unwrap();
        let encoded = coder.encode(&table, &[1]).unwrap();
        assert_eq!(encoded, vec![0x80]);
        assert_eq!(coder.decode(&table, &encoded, 1).unwrap(), vec![1]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_roundtrip(
            alphabet in 1usize..=300,
            raw in prop::collection::vec(any::<u32>(), 0..800),
        ) {
            let coder = RangeCoder::new(alphabet).unwrap();
            let message: Vec<u32> = raw.iter().map(|&x| (x >> 7) % alphabet as u32).collect();
            let table = coder.count(&message).unwrap();
            let encoded = coder.encode(&table, &message).unwrap();
            prop_assert_eq!(coder.decode(&table, &encoded, message.len()).unwrap(), message);
        }

        #[test]
        fn prop_roundtrip_skewed_tables(
            freqs in prop::collection::vec(1u32..5000, 2..8),
            picks in prop::collection::vec(any::<prop::sample::Index>(), 1..2000),
        ) {
            let coder = RangeCoder::new(freqs.len()).unwrap();
            let table = FrequencyTable::from_frequencies(freqs.clone(), MIN_RANGE).unwrap();
            let message: Vec<u32> = picks.iter().map(|i| i.index(freqs.len()) as u32).collect();
            let encoded = coder.encode(&table, &message).unwrap();
            prop_assert_eq!(coder.decode(&table, &encoded, message.len()).unwrap(), message);
        }
    }
}
