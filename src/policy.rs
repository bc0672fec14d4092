//! The generic interval coder.
//!
//! Every coder in this crate narrows the same [`Interval`] with the same
//! arithmetic and differs only in how it renormalizes: when it emits the
//! leading bits or bytes that have become fixed, how it rescales the interval,
//! and how it deals with carries into output that has already been produced.
//! [`Renormalize`] captures that difference; `encode` and `decode` are written
//! once on top of it.

use crate::error::{Error, Result};
use crate::interval::Interval;
use crate::model::{FrequencyTable, SymbolId};

/// Encoder half of a renormalization policy. Lives for one `encode` call.
pub trait Emit {
    /// Emit whatever the narrowed `interval` has settled and rescale it above
    /// the policy's floor.
    fn renormalize(&mut self, interval: &mut Interval);

    /// Write enough trailing output to identify a point inside `interval`.
    fn finish(self, interval: Interval) -> Vec<u8>;
}

/// Decoder half of a renormalization policy. Lives for one `decode` call.
pub trait Consume {
    /// Distance from `interval.low` to the code value, in the policy's working width.
    fn offset(&self, interval: &Interval) -> u64;

    /// Mirror [`Emit::renormalize`], shifting input into the code value.
    fn renormalize(&mut self, interval: &mut Interval);
}

/// A renormalization strategy, and the coder built on it.
///
/// The encoded stream is not self-describing: the alphabet size, the message
/// length, and the frequency table must all reach the decoder out of band.
pub trait Renormalize {
    /// Per-call encoder state.
    type Emitter: Emit;
    /// Per-call decoder state reading from a byte slice.
    type Consumer<'a>: Consume;

    /// Short name for reporting.
    fn name(&self) -> &'static str;

    /// Number of symbols in the alphabet.
    fn alphabet_size(&self) -> usize;

    /// Largest table total (and alphabet size) this coder's precision supports.
    fn threshold(&self) -> u64;

    /// Interval every stream starts from.
    fn initial_interval(&self) -> Interval;

    /// Fresh encoder state.
    fn emitter(&self) -> Self::Emitter;

    /// Fresh decoder state, primed with the first code value from `bytes`.
    fn consumer<'a>(&self, bytes: &'a [u8]) -> Self::Consumer<'a>;

    /// Build the frequency table for `message` under this coder's threshold.
    ///
    /// # Errors
    /// Returns `Error::SymbolOutOfRange` for a symbol outside the alphabet.
    fn count(&self, message: &[SymbolId]) -> Result<FrequencyTable> {
        FrequencyTable::count(self.alphabet_size(), message, self.threshold())
    }

    /// Encode `message` with `table`.
    ///
    /// An empty message encodes to an empty stream.
    ///
    /// # Errors
    /// Returns `Error::TableMismatch`/`Error::TableTooLarge`/`Error::InvalidFrequency`
    /// if `table` does not fit this coder, and `Error::SymbolOutOfRange` if the
    /// message holds a symbol outside the alphabet. Nothing is encoded on error.
    fn encode(&self, table: &FrequencyTable, message: &[SymbolId]) -> Result<Vec<u8>> {
        let alphabet_size = self.alphabet_size();
        table.check_compatible(alphabet_size, self.threshold())?;
        if let Some((index, &symbol)) = message
            .iter()
            .enumerate()
            .find(|&(_, &s)| s as usize >= alphabet_size)
        {
            return Err(Error::SymbolOutOfRange {
                index,
                symbol,
                alphabet_size,
            });
        }
        if message.is_empty() {
            return Ok(Vec::new());
        }

        let cumulative = table.cumulative();
        let total = cumulative.total();
        let mut interval = self.initial_interval();
        let mut emitter = self.emitter();
        for &symbol in message {
            let (cum_freq, freq) = cumulative.span(symbol);
            interval.narrow(cum_freq, freq, total);
            emitter.renormalize(&mut interval);
        }
        let bytes = emitter.finish(interval);

        log::debug!(
            "{}: encoded {} symbols into {} bytes",
            self.name(),
            message.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Decode `len` symbols from `bytes` with `table`.
    ///
    /// Input past the end of `bytes` reads as zero.
    ///
    /// # Errors
    /// Returns the table errors of [`Renormalize::encode`], and
    /// `Error::SymbolNotFound` when a corrupt stream maps outside the table.
    fn decode(&self, table: &FrequencyTable, bytes: &[u8], len: usize) -> Result<Vec<SymbolId>> {
        table.check_compatible(self.alphabet_size(), self.threshold())?;
        let mut message = Vec::with_capacity(len);
        if len == 0 {
            return Ok(message);
        }

        let cumulative = table.cumulative();
        let total = cumulative.total();
        let mut interval = self.initial_interval();
        let mut consumer = self.consumer(bytes);
        for position in 0..len {
            let threshold = interval.threshold(consumer.offset(&interval), total);
            let symbol = cumulative.find(threshold).ok_or(Error::SymbolNotFound {
                position,
                threshold,
                total,
            })?;
            let (cum_freq, freq) = cumulative.span(symbol);
            interval.narrow(cum_freq, freq, total);
            consumer.renormalize(&mut interval);
            message.push(symbol);
        }

        log::debug!(
            "{}: decoded {} symbols from {} bytes",
            self.name(),
            len,
            bytes.len()
        );
        Ok(message)
    }
}
