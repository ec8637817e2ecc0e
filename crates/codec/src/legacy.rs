//! Decoding of legacy card hashes.

use crate::{CardFields, CardToken, CodecError, CodecResult};
use alloc::string::ToString;
use alloy_primitives::U256;

/// Bit offset of the rank inside a legacy card hash.
pub const LEGACY_RANK_OFFSET: usize = 22;
/// Width of the rank inside a legacy card hash.
pub const LEGACY_RANK_WIDTH: usize = 8;
/// Bit offset of the issue number inside a legacy card hash.
pub const LEGACY_ISSUE_OFFSET: usize = 0;
/// Width of the issue number inside a legacy card hash.
pub const LEGACY_ISSUE_WIDTH: usize = 22;

/// Reads `len` bits starting at bit `from`.
pub fn read_bits(value: U256, from: usize, len: usize) -> u64 {
    debug_assert!(len <= 64);
    let mask = (U256::from(1u8) << len) - U256::from(1u8);
    ((value >> from) & mask).as_limbs()[0]
}

/// Parses a hash string in the given radix. A `0x` prefix is accepted for base 16.
pub fn parse_hash(s: &str, radix: u64) -> CodecResult<U256> {
    let trimmed = s.trim();
    let digits = if radix == 16 {
        trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")).unwrap_or(trimmed)
    } else {
        trimmed
    };
    if digits.is_empty() {
        return Err(CodecError::InvalidHash { hash: s.to_string(), radix });
    }
    U256::from_str_radix(digits, radix)
        .map_err(|_| CodecError::InvalidHash { hash: s.to_string(), radix })
}

/// The fields recovered from a legacy card hash.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegacyCard {
    /// Rank, 8 bits at offset 22.
    pub rank: u64,
    /// Issue number, 22 bits at offset 0.
    pub issue: u64,
}

impl LegacyCard {
    /// Extracts rank and issue from a legacy card hash by bit-masking.
    pub fn from_hash(hash: U256) -> Self {
        Self {
            rank: read_bits(hash, LEGACY_RANK_OFFSET, LEGACY_RANK_WIDTH),
            issue: read_bits(hash, LEGACY_ISSUE_OFFSET, LEGACY_ISSUE_WIDTH),
        }
    }

    /// Builds the new-generation token for this card with the given gum yield.
    ///
    /// Year, generation and eth yield start at zero for migrated cards. The legacy issue field
    /// is wider than the new one, so large issue numbers are rejected here instead of being
    /// truncated.
    pub fn into_token(self, gum: u64) -> CodecResult<CardToken> {
        CardToken::encode(&CardFields {
            year: 0,
            gen: 0,
            rank: self.rank,
            issue: self.issue,
            gum,
            eth: 0,
        })
    }
}
