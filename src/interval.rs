//! The coding interval and the arithmetic shared by every renormalization policy.

/// Current coding interval `[low, low + range)`.
///
/// Registers are 64 bits wide so that the 32-bit working values can be
/// multiplied by a cumulative frequency without overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// Lower bound.
    pub low: u64,
    /// Width, always at least 1.
    pub range: u64,
}

impl Interval {
    /// Create an interval.
    pub fn new(low: u64, range: u64) -> Self {
        Self { low, range }
    }

    /// Inclusive upper bound.
    pub fn high(&self) -> u64 {
        self.low + self.range - 1
    }

    /// Narrow to the sub-interval assigned to a symbol occupying
    /// `[cum_freq, cum_freq + freq)` out of `total`.
    ///
    /// Requires `range >= total` and `freq >= 1`, which keeps the result non-empty.
    pub fn narrow(&mut self, cum_freq: u64, freq: u64, total: u64) {
        debug_assert!(freq >= 1);
        debug_assert!(self.range >= total, "range {} below total {}", self.range, total);

        let start = cum_freq * self.range / total;
        let end = (cum_freq + freq) * self.range / total;
        self.low += start;
        self.range = end - start;

        debug_assert!(self.range >= 1);
    }

    /// Map `offset = value - low` back to the frequency scale.
    ///
    /// The result lies in `[cum_freq, cum_freq + freq)` of exactly the symbol
    /// whose sub-interval [`Interval::narrow`] would place `value` in.
    pub fn threshold(&self, offset: u64, total: u64) -> u64 {
        ((offset + 1) * total - 1) / self.range
    }
}
