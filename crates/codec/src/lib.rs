#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod errors;
pub use errors::{CodecError, CodecResult};

mod fields;
pub use fields::{CardField, CardFields};

mod token;
pub use token::CardToken;

mod legacy;
pub use legacy::{
    parse_hash, read_bits, LegacyCard, LEGACY_ISSUE_OFFSET, LEGACY_ISSUE_WIDTH,
    LEGACY_RANK_OFFSET, LEGACY_RANK_WIDTH,
};

mod pack;
pub use pack::{join_cards, pack_mint_hash, split_pack_hash, PACK_PREFIX, PACK_SEPARATOR};
