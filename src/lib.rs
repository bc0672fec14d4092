//! # Interval Coding
//!
//! *Static arithmetic and range coding with three interchangeable renormalization strategies.*
//!
//! ## Intuition First
//!
//! Pick a number between 0 and 1. To send the first symbol of a message, cut
//! `[0, 1)` into slices sized by symbol probability and keep only the slice of
//! that symbol. Cut the slice again for the second symbol, and so on. At the
//! end, any number inside the final, tiny slice identifies the whole message,
//! and a likely message leaves a wide slice that needs few digits to name.
//!
//! ## The Problem
//!
//! Real hardware has no infinite-precision reals. An interval coder keeps the
//! slice as a pair of fixed-width integers `(low, range)` and periodically
//! *renormalizes*: once the leading digits of every number in the slice agree,
//! it writes them out and scales the slice back up. The catch is that an
//! addition to `low` can ripple into digits that were already written out
//! (a *carry*). Every practical coder must decide how to handle that:
//!
//! - **Bit-oriented arithmetic coding** ([`arithmetic`]): emit single bits and
//!   count the bits whose value is still undecided.
//! - **Carryless range coding** ([`carryless`]): emit bytes, and shrink the
//!   range just enough that a carry can never happen.
//! - **Carry-propagating range coding** ([`range`]): emit bytes, but hold back
//!   the last one together with a run of `0xFF`s until the carry is resolved.
//!
//! ## Historical Context
//!
//! ```text
//! 1948  Shannon           Entropy as the fundamental limit
//! 1976  Rissanen, Pasco   Arithmetic coding with finite precision
//! 1979  Martin            Range coding: renormalize a byte at a time
//! 1987  Witten et al.     The classic integer arithmetic coder with follow bits
//! 1999  Subbotin          Carryless range coder
//! 2000s Schindler, LZMA   Cache byte plus 0xFF run for cheap carry handling
//! ```
//!
//! ## Mathematical Formulation
//!
//! With frequencies $f_s$, cumulative frequencies $F_s = \sum_{t < s} f_t$ and
//! total $T$, coding symbol $s$ narrows the interval to
//!
//! ```text
//! low'   = low + floor(F_s * range / T)
//! range' = floor((F_s + f_s) * range / T) - floor(F_s * range / T)
//! ```
//!
//! which stays non-empty as long as `range >= T`. The decoder inverts this with
//! `t = floor(((value - low + 1) * T - 1) / range)` and picks the symbol whose
//! cumulative span contains `t`.
//!
//! ## Failure Modes
//!
//! 1. **Model mismatch**: the stream carries no frequency table, alphabet size,
//!    or message length; decoding with anything else yields garbage or
//!    [`Error::SymbolNotFound`].
//! 2. **Truncation**: readers treat missing input as zeros, so a truncated
//!    stream decodes to *something* rather than failing.
//!
//! ## Usage
//!
//! ```
//! use rangecode::{Renormalize, RangeCoder};
//!
//! let coder = RangeCoder::new(4)?;
//! let message = [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3];
//! let table = coder.count(&message)?;
//! let bytes = coder.encode(&table, &message)?;
//! assert_eq!(coder.decode(&table, &bytes, message.len())?, message);
//! # Ok::<(), rangecode::Error>(())
//! ```
//!
//! ## References
//!
//! - Witten, I. H., Neal, R. M., Cleary, J. G. (1987). "Arithmetic coding for data compression."
//! - Martin, G. N. N. (1979). "Range encoding: an algorithm for removing redundancy from a digitised message."
//! - Subbotin, D. (1999). "Carryless rangecoder."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arithmetic;
pub mod carryless;
pub mod config;
pub mod error;
pub mod interval;
pub mod io;
pub mod model;
pub mod policy;
pub mod range;

pub use arithmetic::{ArithmeticCoder, UnderflowMode};
pub use carryless::CarrylessRangeCoder;
pub use config::{Codec, CoderConfig, PolicyKind};
pub use error::{Error, Result};
pub use interval::Interval;
pub use model::{CumulativeTable, FrequencyTable, SymbolId};
pub use policy::{Consume, Emit, Renormalize};
pub use range::RangeCoder;
