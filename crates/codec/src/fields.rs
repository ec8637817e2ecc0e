//! Field layout of a packed card token.

use core::fmt::{self, Display};

/// A named sub-field of a packed card token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardField {
    /// Release year of the card, bits 0-3.
    Year,
    /// Card generation, bits 4-9.
    Gen,
    /// Card rank, bits 10-19.
    Rank,
    /// Issue number within the rank, bits 20-31.
    Issue,
    /// Gum yield, bits 32-41.
    Gum,
    /// Eth yield, bits 42 and up.
    Eth,
}

impl CardField {
    /// All fields, ordered by bit offset.
    pub const ALL: [Self; 6] = [Self::Year, Self::Gen, Self::Rank, Self::Issue, Self::Gum, Self::Eth];

    /// Returns the bit offset of the field within the packed token.
    pub const fn offset(&self) -> usize {
        match self {
            Self::Year => 0,
            Self::Gen => 4,
            Self::Rank => 10,
            Self::Issue => 20,
            Self::Gum => 32,
            Self::Eth => 42,
        }
    }

    /// Returns the width of the field in bits.
    ///
    /// The `eth` field runs to the top of the 256-bit word, which is wider than the `u64` it is
    /// carried in, so it can never overflow on encode.
    pub const fn width(&self) -> usize {
        match self {
            Self::Year => 4,
            Self::Gen => 6,
            Self::Rank => 10,
            Self::Issue => 12,
            Self::Gum => 10,
            Self::Eth => 256 - 42,
        }
    }

    /// Returns the largest value the field can hold, saturated to `u64`.
    pub const fn max_value(&self) -> u64 {
        let width = self.width();
        if width >= 64 {
            u64::MAX
        } else {
            (1u64 << width) - 1
        }
    }
}

impl Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Year => "year",
            Self::Gen => "gen",
            Self::Rank => "rank",
            Self::Issue => "issue",
            Self::Gum => "gum",
            Self::Eth => "eth",
        };
        f.write_str(name)
    }
}

/// The semantic fields of a new-generation card.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardFields {
    /// Release year.
    pub year: u64,
    /// Generation.
    pub gen: u64,
    /// Rank.
    pub rank: u64,
    /// Issue number.
    pub issue: u64,
    /// Gum yield.
    pub gum: u64,
    /// Eth yield.
    pub eth: u64,
}

impl CardFields {
    /// Returns the value of the given field.
    pub const fn get(&self, field: CardField) -> u64 {
        match field {
            CardField::Year => self.year,
            CardField::Gen => self.gen,
            CardField::Rank => self.rank,
            CardField::Issue => self.issue,
            CardField::Gum => self.gum,
            CardField::Eth => self.eth,
        }
    }

    /// Sets the value of the given field.
    pub fn set(&mut self, field: CardField, value: u64) {
        match field {
            CardField::Year => self.year = value,
            CardField::Gen => self.gen = value,
            CardField::Rank => self.rank = value,
            CardField::Issue => self.issue = value,
            CardField::Gum => self.gum = value,
            CardField::Eth => self.eth = value,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fields_are_contiguous() {
        let mut next = 0;
        for field in CardField::ALL {
            assert_eq!(field.offset(), next, "{field} does not start where the previous ended");
            next = field.offset() + field.width();
        }
        assert_eq!(next, 256);
    }

    #[test]
    fn test_max_values() {
        assert_eq!(CardField::Year.max_value(), 15);
        assert_eq!(CardField::Gen.max_value(), 63);
        assert_eq!(CardField::Rank.max_value(), 1023);
        assert_eq!(CardField::Issue.max_value(), 4095);
        assert_eq!(CardField::Gum.max_value(), 1023);
        assert_eq!(CardField::Eth.max_value(), u64::MAX);
    }

    #[test]
    fn test_get_set() {
        let mut fields = CardFields::default();
        for (i, field) in CardField::ALL.into_iter().enumerate() {
            fields.set(field, i as u64 + 1);
        }
        assert_eq!(
            fields,
            CardFields { year: 1, gen: 2, rank: 3, issue: 4, gum: 5, eth: 6 }
        );
        assert_eq!(fields.get(CardField::Issue), 4);
    }
}
