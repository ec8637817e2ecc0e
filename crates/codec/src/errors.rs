//! Error types for the `cards-codec` crate.

use crate::CardField;
use alloc::string::String;
use thiserror::Error;

/// A [Result] type alias where the error is [CodecError].
pub type CodecResult<T> = Result<T, CodecError>;

/// An error raised while packing, unpacking, or parsing card tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A field value does not fit its bit width.
    #[error("Card field `{field}` value {value} exceeds its maximum of {max}")]
    FieldOverflow {
        /// The offending field.
        field: CardField,
        /// The rejected value.
        value: u64,
        /// The largest value the field holds.
        max: u64,
    },
    /// A packed value carries an `eth` yield wider than 64 bits.
    #[error("Packed card token has an eth yield wider than 64 bits")]
    EthOverflow,
    /// A hash string could not be parsed as an integer.
    #[error("Invalid card hash {hash:?} in base {radix}")]
    InvalidHash {
        /// The rejected input.
        hash: String,
        /// The radix it was parsed with.
        radix: u64,
    },
    /// A pack hash contained no card hashes.
    #[error("Pack hash contains no cards")]
    EmptyPack,
}
