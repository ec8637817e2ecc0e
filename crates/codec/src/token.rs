//! The packed new-generation card token.

use crate::{CardField, CardFields, CodecError, CodecResult};
use alloc::{format, string::String};
use alloy_primitives::U256;
use core::{
    fmt::{self, Display},
    str::FromStr,
};

/// Returns a mask covering `width` bits starting at bit 0.
fn low_mask(width: usize) -> U256 {
    if width >= 256 {
        U256::MAX
    } else {
        (U256::from(1u8) << width) - U256::from(1u8)
    }
}

/// A new-generation card token id.
///
/// The token is a 256-bit word with the fields of [CardFields] packed at the offsets given by
/// [CardField::offset]:
///
/// `value = year | (gen << 4) | (rank << 10) | (issue << 20) | (gum << 32) | (eth << 42)`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CardToken(U256);

impl CardToken {
    /// Wraps an already-packed value.
    pub const fn from_value(value: U256) -> Self {
        Self(value)
    }

    /// Returns the packed value.
    pub const fn value(&self) -> U256 {
        self.0
    }

    /// Packs the given fields into a token.
    ///
    /// Fails with [CodecError::FieldOverflow] if any field is wider than its slot. Unchecked
    /// values would bleed into the neighbouring field.
    pub fn encode(fields: &CardFields) -> CodecResult<Self> {
        let mut value = U256::ZERO;
        for field in CardField::ALL {
            let raw = fields.get(field);
            if raw > field.max_value() {
                return Err(CodecError::FieldOverflow { field, value: raw, max: field.max_value() });
            }
            value |= U256::from(raw) << field.offset();
        }
        Ok(Self(value))
    }

    /// Unpacks the token into its fields.
    pub fn decode(&self) -> CodecResult<CardFields> {
        let mut fields = CardFields::default();
        for field in CardField::ALL {
            let raw = (self.0 >> field.offset()) & low_mask(field.width());
            if raw > U256::from(u64::MAX) {
                return Err(CodecError::EthOverflow);
            }
            fields.set(field, raw.as_limbs()[0]);
        }
        Ok(fields)
    }

    /// Returns the lowercase hex form of the token, without a `0x` prefix, left-padded with a
    /// zero to an even number of digits.
    pub fn to_hex(&self) -> String {
        let hex = format!("{:x}", self.0);
        if hex.len() % 2 == 0 {
            hex
        } else {
            format!("0{hex}")
        }
    }

    /// Parses a token from hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> CodecResult<Self> {
        crate::parse_hash(s, 16).map(Self)
    }
}

impl From<CardToken> for U256 {
    fn from(token: CardToken) -> Self {
        token.0
    }
}

impl Display for CardToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for CardToken {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
