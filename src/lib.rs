//! A score map for selecting collective-operation implementations by
//! collective kind, memory kind and message size.
//!
//! A [`ScoreMap`] keeps, for every `(coll-kind, mem-kind)` pair, a sorted
//! list of disjoint message-size ranges each tagged with a [`Score`] and an
//! opaque implementation handle. Plugins build maps independently via
//! [`ScoreMap::build_default`] or [`alloc_from_str`], compose them with
//! [`merge`], and a user or higher layer can later tweak the result with
//! [`update`] or [`update_from_str`] without re-deriving the whole map.
#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, allow(unused_attributes))]
#![deny(missing_docs)]

#[cfg(all(not(feature = "std"), feature = "alloc"))]
extern crate alloc as std;

#[cfg(all(feature = "std", not(feature = "alloc")))]
extern crate std;

#[cfg(all(feature = "std", feature = "alloc"))]
extern crate std;

mod error;
mod merge;
mod parser;
mod range;
mod range_list;
mod score_map;
mod types;
mod update;

pub use error::{Error, Result};
pub use merge::{merge, merge_in};
pub use parser::{alloc_from_str, update_from_str, update_from_str_with_init};
pub use range::Range;
pub use range_list::RangeList;
pub use score_map::ScoreMap;
pub use types::{
  ilog2, ColType, InitFn, MemType, Score, TeamRef, COLL_TYPE_NUM, MEMORY_TYPE_LAST, MSG_MAX,
  SCORE_DISABLED, SCORE_MAX,
};
pub use update::update;
