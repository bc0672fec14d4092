//! Error types for interval coding.

use thiserror::Error;

/// Error variants for counting, encoding, and decoding.
#[derive(Debug, Error)]
pub enum Error {
    /// The alphabet has no symbols.
    #[error("alphabet must contain at least one symbol")]
    EmptyAlphabet,

    /// The alphabet is larger than the coder's precision can give one unit of mass each.
    #[error("alphabet of {alphabet_size} symbols exceeds the limit of {max}")]
    AlphabetTooLarge {
        /// Requested alphabet size.
        alphabet_size: usize,
        /// Largest alphabet the coder supports.
        max: u64,
    },

    /// Precision of the bit-oriented coder is outside `[2, 32]`.
    #[error("precision {0} is outside [2, 32]")]
    InvalidPrecision(u32),

    /// Carryless floor exponent is outside `[8, 24]`.
    #[error("minimum range exponent {0} is outside [8, 24]")]
    InvalidMinRangeBits(u32),

    /// A message symbol does not belong to the alphabet.
    #[error("symbol {symbol} at position {index} is outside alphabet of size {alphabet_size}")]
    SymbolOutOfRange {
        /// Position in the message.
        index: usize,
        /// Offending symbol.
        symbol: u32,
        /// Alphabet size of the coder.
        alphabet_size: usize,
    },

    /// A supplied frequency table gives a symbol zero mass.
    #[error("symbol {symbol} has zero frequency")]
    InvalidFrequency {
        /// Symbol with zero frequency.
        symbol: usize,
    },

    /// Frequencies sum past what the coder's interval can resolve.
    #[error("total frequency {total} exceeds the limit of {max}")]
    TableTooLarge {
        /// Sum of all frequencies.
        total: u64,
        /// Largest total the coder supports.
        max: u64,
    },

    /// A frequency table was built for a different alphabet.
    #[error("frequency table covers {found} symbols, coder expects {expected}")]
    TableMismatch {
        /// Alphabet size of the coder.
        expected: usize,
        /// Alphabet size of the table.
        found: usize,
    },

    /// The decoder's threshold fell past the end of the cumulative table.
    ///
    /// Only a corrupt or mismatched stream reaches this.
    #[error("no symbol covers threshold {threshold} (total {total}) at position {position}")]
    SymbolNotFound {
        /// Position in the decoded message.
        position: usize,
        /// Computed scaled threshold.
        threshold: u64,
        /// Total count of the table.
        total: u64,
    },

    /// An I/O error occurred while reading input.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for interval coding operations.
pub type Result<T> = std::result::Result<T, Error>;
