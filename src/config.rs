//! Coder selection.
//!
//! None of these settings travel with the encoded stream; encoder and decoder
//! must agree on them out of band.

use crate::arithmetic::{ArithmeticCoder, UnderflowMode, DEFAULT_PRECISION};
use crate::carryless::{CarrylessRangeCoder, DEFAULT_MIN_RANGE_BITS};
use crate::error::Result;
use crate::model::{FrequencyTable, SymbolId};
use crate::policy::Renormalize;
use crate::range::RangeCoder;

/// Which renormalization strategy to code with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PolicyKind {
    /// Bit-oriented arithmetic coding on a `precision`-bit grid.
    Arithmetic {
        /// Grid resolution, `2..=32`.
        precision: u32,
        /// Middle-half handling.
        underflow: UnderflowMode,
    },
    /// Carryless byte-oriented range coding with floor `2^min_range_bits`.
    Carryless {
        /// Floor exponent, `8..=24`.
        min_range_bits: u32,
    },
    /// Byte-oriented range coding with carry propagation.
    Range,
}

impl PolicyKind {
    /// Arithmetic coding with default precision and follow bits.
    pub fn arithmetic() -> Self {
        Self::Arithmetic {
            precision: DEFAULT_PRECISION,
            underflow: UnderflowMode::FollowBits,
        }
    }

    /// Carryless range coding with the default floor.
    pub fn carryless() -> Self {
        Self::Carryless {
            min_range_bits: DEFAULT_MIN_RANGE_BITS,
        }
    }
}

impl Default for PolicyKind {
    fn default() -> Self {
        Self::Range
    }
}

/// Alphabet size plus strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoderConfig {
    /// Number of symbols.
    pub alphabet_size: usize,
    /// Renormalization strategy.
    pub policy: PolicyKind,
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self {
            alphabet_size: 256,
            policy: PolicyKind::default(),
        }
    }
}

impl CoderConfig {
    /// Configuration for `alphabet_size` symbols coded with `policy`.
    pub fn new(alphabet_size: usize, policy: PolicyKind) -> Self {
        Self {
            alphabet_size,
            policy,
        }
    }

    /// Check the configuration without keeping the coder.
    ///
    /// # Errors
    /// Same as [`Codec::new`].
    pub fn validate(&self) -> Result<()> {
        Codec::new(self).map(drop)
    }
}

/// A coder chosen at runtime.
#[derive(Debug, Clone, Copy)]
pub enum Codec {
    /// See [`ArithmeticCoder`].
    Arithmetic(ArithmeticCoder),
    /// See [`CarrylessRangeCoder`].
    Carryless(CarrylessRangeCoder),
    /// See [`RangeCoder`].
    Range(RangeCoder),
}

macro_rules! dispatch {
    ($self:ident, $coder:ident => $body:expr) => {
        match $self {
            Codec::Arithmetic($coder) => $body,
            Codec::Carryless($coder) => $body,
            Codec::Range($coder) => $body,
        }
    };
}

impl Codec {
    /// Build the coder described by `config`.
    ///
    /// # Errors
    /// Returns `Error::EmptyAlphabet`, `Error::AlphabetTooLarge`,
    /// `Error::InvalidPrecision`, or `Error::InvalidMinRangeBits`.
    pub fn new(config: &CoderConfig) -> Result<Self> {
        let n = config.alphabet_size;
        Ok(match config.policy {
            PolicyKind::Arithmetic {
                precision,
                underflow,
            } => Self::Arithmetic(
                ArithmeticCoder::with_precision(n, precision)?.with_underflow(underflow),
            ),
            PolicyKind::Carryless { min_range_bits } => {
                Self::Carryless(CarrylessRangeCoder::with_min_range_bits(n, min_range_bits)?)
            }
            PolicyKind::Range => Self::Range(RangeCoder::new(n)?),
        })
    }

    /// Short name of the underlying coder.
    pub fn name(&self) -> &'static str {
        dispatch!(self, c => c.name())
    }

    /// Number of symbols in the alphabet.
    pub fn alphabet_size(&self) -> usize {
        dispatch!(self, c => c.alphabet_size())
    }

    /// Largest table total the coder supports.
    pub fn threshold(&self) -> u64 {
        dispatch!(self, c => c.threshold())
    }

    /// See [`Renormalize::count`].
    pub fn count(&self, message: &[SymbolId]) -> Result<FrequencyTable> {
        dispatch!(self, c => c.count(message))
    }

    /// See [`Renormalize::encode`].
    pub fn encode(&self, table: &FrequencyTable, message: &[SymbolId]) -> Result<Vec<u8>> {
        dispatch!(self, c => c.encode(table, message))
    }

    /// See [`Renormalize::decode`].
    pub fn decode(&self, table: &FrequencyTable, bytes: &[u8], len: usize) -> Result<Vec<SymbolId>> {
        dispatch!(self, c => c.decode(table, bytes, len))
    }
}
