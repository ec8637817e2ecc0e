//! Pack hashes: dot-separated lists of card hashes.

use crate::{parse_hash, CardToken, CodecError, CodecResult};
use alloc::{string::String, vec::Vec};
use alloy_primitives::U256;

/// Separator between card hashes in a pack hash.
pub const PACK_SEPARATOR: char = '.';

/// Reserved leading segment of a new-generation pack hash.
pub const PACK_PREFIX: &str = "0";

/// Splits a legacy pack hash into its card hashes. Empty segments are ignored.
pub fn split_pack_hash(pack_hash: &str, radix: u64) -> CodecResult<Vec<U256>> {
    let cards = pack_hash
        .split(PACK_SEPARATOR)
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| parse_hash(segment, radix))
        .collect::<CodecResult<Vec<_>>>()?;
    if cards.is_empty() {
        return Err(CodecError::EmptyPack);
    }
    Ok(cards)
}

/// Joins converted cards into their dot-separated hex form.
pub fn join_cards(cards: &[CardToken]) -> String {
    let mut out = String::new();
    for (i, card) in cards.iter().enumerate() {
        if i > 0 {
            out.push(PACK_SEPARATOR);
        }
        out.push_str(&card.to_hex());
    }
    out
}

/// Builds the string passed to the new pack contract's mint call: `"0." + cards`.
pub fn pack_mint_hash(cards: &[CardToken]) -> String {
    let mut out = String::from(PACK_PREFIX);
    out.push(PACK_SEPARATOR);
    out.push_str(&join_cards(cards));
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{CardFields, LegacyCard};

    #[test]
    fn test_split_pack_hash() {
        let cards = split_pack_hash("1c00064.0x2000001.", 16).unwrap();
        assert_eq!(cards, vec![U256::from(0x1c00064u64), U256::from(0x2000001u64)]);
    }

    #[test]
    fn test_split_empty_pack_hash() {
        assert_eq!(split_pack_hash("", 16).unwrap_err(), CodecError::EmptyPack);
        assert_eq!(split_pack_hash("..", 16).unwrap_err(), CodecError::EmptyPack);
        assert!(split_pack_hash("1.zz", 16).is_err());
    }

    #[test]
    fn test_pack_mint_hash() {
        let a = LegacyCard { rank: 5, issue: 100 }.into_token(20).unwrap();
        let b = CardToken::encode(&CardFields { year: 1, ..Default::default() }).unwrap();
        assert_eq!(join_cards(&[a, b]), "1406401400.01");
        assert_eq!(pack_mint_hash(&[a, b]), "0.1406401400.01");
        assert_eq!(pack_mint_hash(&[]), "0.");
    }
}
