//! Static frequency model.
//!
//! The model is built once from the whole message (two-pass coding) and must be
//! reproduced bit-for-bit on the decoding side: the encoded stream never carries it.

use crate::error::{Error, Result};

/// Index of a symbol in `[0, alphabet_size)`.
pub type SymbolId = u32;

/// Per-symbol frequencies, every entry at least 1, normalized under a precision threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencyTable {
    freqs: Vec<u32>,
}

impl FrequencyTable {
    /// Count symbol occurrences in `message` and normalize them so that the
    /// table sums to at most `threshold`.
    ///
    /// Raw tallies are halved whenever one of them reaches `threshold`, then
    /// shifted right until `total + alphabet_size` fits, and finally every zero
    /// is raised to one.
    ///
    /// # Errors
    /// Returns `Error::EmptyAlphabet` or `Error::AlphabetTooLarge` when
    /// `alphabet_size` is not in `[1, threshold]`, and `Error::SymbolOutOfRange`
    /// if the message contains a symbol outside the alphabet.
    pub fn count(alphabet_size: usize, message: &[SymbolId], threshold: u64) -> Result<Self> {
        check_alphabet(alphabet_size, threshold)?;

        let mut raw = vec![0u64; alphabet_size];
        for (index, &symbol) in message.iter().enumerate() {
            let tally = raw
                .get_mut(symbol as usize)
                .ok_or_else(|| Error::SymbolOutOfRange {
                    index,
                    symbol,
                    alphabet_size,
                })?;
            *tally += 1;
            if *tally == threshold {
                raw.iter_mut().for_each(|c| *c >>= 1);
            }
        }

        // Shrinking the estimate instead of the table overestimates the
        // post-shift total, so the final sum can only come out smaller.
        let mut total: u64 = raw.iter().sum();
        let mut shift = 0u32;
        while total + alphabet_size as u64 > threshold {
            total >>= 1;
            shift += 1;
        }

        let freqs: Vec<u32> = raw.iter().map(|&c| ((c >> shift) as u32).max(1)).collect();
        let table = Self { freqs };
        debug_assert!(table.total() <= threshold);

        log::debug!(
            "counted {} symbols over alphabet {}: total {} after shift {}",
            message.len(),
            alphabet_size,
            table.total(),
            shift
        );
        Ok(table)
    }

    /// Build a table from frequencies received out of band.
    ///
    /// # Errors
    /// Returns `Error::InvalidFrequency` for a zero entry and `Error::TableTooLarge`
    /// if the entries sum past `threshold`.
    pub fn from_frequencies(freqs: Vec<u32>, threshold: u64) -> Result<Self> {
        check_alphabet(freqs.len(), threshold)?;
        let table = Self { freqs };
        table.check_entries(threshold)?;
        Ok(table)
    }

    /// Number of symbols in the alphabet.
    pub fn alphabet_size(&self) -> usize {
        self.freqs.len()
    }

    /// Frequency of `symbol`.
    pub fn frequency(&self, symbol: SymbolId) -> u32 {
        self.freqs[symbol as usize]
    }

    /// All frequencies, indexed by symbol.
    pub fn frequencies(&self) -> &[u32] {
        &self.freqs
    }

    /// Sum of all frequencies.
    pub fn total(&self) -> u64 {
        self.freqs.iter().map(|&f| u64::from(f)).sum()
    }

    /// Prefix sums for coding with this table.
    pub fn cumulative(&self) -> CumulativeTable {
        CumulativeTable::new(self)
    }

    /// Check that this table can drive a coder over `alphabet_size` symbols
    /// whose totals are limited to `threshold`.
    pub(crate) fn check_compatible(&self, alphabet_size: usize, threshold: u64) -> Result<()> {
        if self.freqs.len() != alphabet_size {
            return Err(Error::TableMismatch {
                expected: alphabet_size,
                found: self.freqs.len(),
            });
        }
        self.check_entries(threshold)
    }

    fn check_entries(&self, threshold: u64) -> Result<()> {
        if let Some(symbol) = self.freqs.iter().position(|&f| f == 0) {
            return Err(Error::InvalidFrequency { symbol });
        }
        let total = self.total();
        if total > threshold {
            return Err(Error::TableTooLarge {
                total,
                max: threshold,
            });
        }
        Ok(())
    }
}

pub(crate) fn check_alphabet(alphabet_size: usize, threshold: u64) -> Result<()> {
    if alphabet_size == 0 {
        return Err(Error::EmptyAlphabet);
    }
    if alphabet_size as u64 > threshold {
        return Err(Error::AlphabetTooLarge {
            alphabet_size,
            max: threshold,
        });
    }
    Ok(())
}

/// Prefix sums over a [`FrequencyTable`].
///
/// `starts[s]` is the total frequency of all symbols below `s`; the last entry is the total.
#[derive(Debug, Clone)]
pub struct CumulativeTable {
    starts: Vec<u64>,
}

impl CumulativeTable {
    /// Compute prefix sums for `table`.
    pub fn new(table: &FrequencyTable) -> Self {
        let mut starts = Vec::with_capacity(table.alphabet_size() + 1);
        let mut acc = 0u64;
        starts.push(acc);
        for &f in table.frequencies() {
            acc += u64::from(f);
            starts.push(acc);
        }
        Self { starts }
    }

    /// Sum of all frequencies.
    pub fn total(&self) -> u64 {
        self.starts[self.starts.len() - 1]
    }

    /// Number of symbols covered.
    pub fn alphabet_size(&self) -> usize {
        self.starts.len() - 1
    }

    /// `(cumulative frequency, frequency)` of `symbol`.
    pub fn span(&self, symbol: SymbolId) -> (u64, u64) {
        let s = symbol as usize;
        (self.starts[s], self.starts[s + 1] - self.starts[s])
    }

    /// Smallest symbol whose span ends above `threshold`, or `None` if
    /// `threshold >= total`.
    pub fn find(&self, threshold: u64) -> Option<SymbolId> {
        let s = self.starts[1..].partition_point(|&end| end <= threshold);
        (s < self.alphabet_size()).then_some(s as SymbolId)
    }
}
