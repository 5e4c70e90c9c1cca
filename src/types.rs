/// The total number of distinct collective kinds.
///
/// Kept in lock-step with [`ColType`]: every variant of that bitmask must
/// occupy one of the `COLL_TYPE_NUM` lowest bits, with no gaps, so that
/// [`ilog2`] can be used as a dense array index.
pub const COLL_TYPE_NUM: usize = 16;

/// One past the last valid [`MemType`] discriminant; also the width of a
/// score map's second dimension.
pub const MEMORY_TYPE_LAST: usize = 5;

/// An unsigned message-size boundary wide enough to stand in for "no
/// upper bound".
pub const MSG_MAX: usize = usize::MAX;

/// Priority carried by a [`Range`][crate::range::Range].
///
/// `0` is reserved: it never appears on a stored range (see
/// [`RangeList::add_range`][crate::range_list::RangeList::add_range]), a
/// score of `0` means "disabled" and the range is dropped instead of
/// stored. [`SCORE_MAX`] is the strongest possible preference.
///
/// The original C implementation also reserves a third sentinel,
/// `UCC_SCORE_INVALID`, meaning "not yet set" while a selection string is
/// being classified. Rust lets us express "not yet set" with `Option<Score>`
/// instead of stealing a bit pattern, so that sentinel has no direct
/// counterpart here; [`crate::parser`] uses `Option<Score>` throughout.
pub type Score = u32;

/// The strongest possible score: "use this implementation no matter what
/// else is registered".
pub const SCORE_MAX: Score = Score::MAX;

/// The score that marks a range as disabled.
pub const SCORE_DISABLED: Score = 0;

bitflags::bitflags! {
  /// The kind of collective operation a [`Range`][crate::range::Range] or
  /// a [`ScoreMap`][crate::score_map::ScoreMap] cell applies to.
  ///
  /// Represented as a bitmask of power-of-two values so that a single
  /// mask can address several collectives at once, e.g. in
  /// [`ScoreMap::build_default`][crate::score_map::ScoreMap::build_default]'s
  /// `coll_mask` or a parsed selection string's coll-kind list.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct ColType: u32 {
    /// Barrier synchronization.
    const BARRIER         = 1 << 0;
    /// Broadcast from a root to all members.
    const BCAST           = 1 << 1;
    /// All-reduce.
    const ALLREDUCE       = 1 << 2;
    /// Reduce to a root.
    const REDUCE          = 1 << 3;
    /// Allgather.
    const ALLGATHER       = 1 << 4;
    /// Allgather with per-rank counts.
    const ALLGATHERV      = 1 << 5;
    /// Gather to a root.
    const GATHER          = 1 << 6;
    /// Gather with per-rank counts.
    const GATHERV         = 1 << 7;
    /// Scatter from a root.
    const SCATTER         = 1 << 8;
    /// Scatter with per-rank counts.
    const SCATTERV        = 1 << 9;
    /// All-to-all.
    const ALLTOALL        = 1 << 10;
    /// All-to-all with per-rank counts.
    const ALLTOALLV       = 1 << 11;
    /// Reduce-scatter.
    const REDUCE_SCATTER  = 1 << 12;
    /// Reduce-scatter with per-rank counts.
    const REDUCE_SCATTERV = 1 << 13;
    /// Many-to-one gather-like collector used by hierarchical algorithms.
    const FANIN           = 1 << 14;
    /// One-to-many broadcaster used by hierarchical algorithms.
    const FANOUT          = 1 << 15;
  }
}

impl ColType {
  /// All individually-addressable collective kinds, lowest bit first.
  ///
  /// Used wherever a missing coll-kind list means "every coll-kind", e.g.
  /// [`crate::parser`] and
  /// [`ScoreMap::build_default`][crate::score_map::ScoreMap::build_default].
  pub const ALL: [ColType; COLL_TYPE_NUM] = [
    Self::BARRIER,
    Self::BCAST,
    Self::ALLREDUCE,
    Self::REDUCE,
    Self::ALLGATHER,
    Self::ALLGATHERV,
    Self::GATHER,
    Self::GATHERV,
    Self::SCATTER,
    Self::SCATTERV,
    Self::ALLTOALL,
    Self::ALLTOALLV,
    Self::REDUCE_SCATTER,
    Self::REDUCE_SCATTERV,
    Self::FANIN,
    Self::FANOUT,
  ];

  /// Parses a single, lowercase collective-kind name, e.g. `"allreduce"`.
  ///
  /// Returns `None` for anything that doesn't name exactly one collective;
  /// callers trying to classify a selection-string token should treat that
  /// as "this token is not a coll-kind list" and fall through to the next
  /// field grammar, per the parser's greedy classify-then-claim contract.
  pub fn from_name(name: &str) -> Option<ColType> {
    Some(match name {
      "barrier" => Self::BARRIER,
      "bcast" => Self::BCAST,
      "allreduce" => Self::ALLREDUCE,
      "reduce" => Self::REDUCE,
      "allgather" => Self::ALLGATHER,
      "allgatherv" => Self::ALLGATHERV,
      "gather" => Self::GATHER,
      "gatherv" => Self::GATHERV,
      "scatter" => Self::SCATTER,
      "scatterv" => Self::SCATTERV,
      "alltoall" => Self::ALLTOALL,
      "alltoallv" => Self::ALLTOALLV,
      "reduce_scatter" => Self::REDUCE_SCATTER,
      "reduce_scatterv" => Self::REDUCE_SCATTERV,
      "fanin" => Self::FANIN,
      "fanout" => Self::FANOUT,
      _ => return None,
    })
  }

  /// Iterates over each individually-set bit, lowest first.
  #[inline]
  pub fn iter_bits(self) -> impl Iterator<Item = ColType> {
    Self::ALL.into_iter().filter(move |bit| self.contains(*bit))
  }
}

/// Maps a single-bit [`ColType`] mask to a dense `0..COLL_TYPE_NUM` index.
///
/// Panics (in debug builds) if `bit` is empty or has more than one bit set;
/// the core only ever calls this on individual enumerants, never on a
/// caller-supplied union.
#[inline]
pub fn ilog2(bit: ColType) -> usize {
  debug_assert!(bit.bits().count_ones() == 1, "ilog2 expects a single bit");
  bit.bits().trailing_zeros() as usize
}

/// The memory domain a buffer lives in.
///
/// Unlike [`ColType`], a buffer has exactly one memory kind at a time, so
/// this is a plain enumeration rather than a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[non_exhaustive]
pub enum MemType {
  /// Ordinary host (CPU) memory.
  Host = 0,
  /// CUDA device memory.
  Cuda = 1,
  /// CUDA managed (unified) memory.
  CudaManaged = 2,
  /// ROCm device memory.
  Rocm = 3,
  /// ROCm managed (unified) memory.
  RocmManaged = 4,
}

impl MemType {
  /// Every memory kind, in ascending index order.
  pub const ALL: [MemType; MEMORY_TYPE_LAST] = [
    Self::Host,
    Self::Cuda,
    Self::CudaManaged,
    Self::Rocm,
    Self::RocmManaged,
  ];

  /// Parses a single, lowercase memory-kind name, e.g. `"cuda_managed"`.
  pub fn from_name(name: &str) -> Option<MemType> {
    Some(match name {
      "host" => Self::Host,
      "cuda" => Self::Cuda,
      "cuda_managed" => Self::CudaManaged,
      "rocm" => Self::Rocm,
      "rocm_managed" => Self::RocmManaged,
      _ => return None,
    })
  }

  /// The dense `0..MEMORY_TYPE_LAST` index of this memory kind.
  #[inline]
  pub const fn index(self) -> usize {
    self as usize
  }
}

/// An opaque, by-copy reference to the algorithm selected for a range.
///
/// The core never dereferences this; it only copies and compares it when
/// coalescing touching ranges that share the same `(score, init, team)`.
/// Transport plugins are expected to stash a pointer-width tag (a function
/// pointer, a small integer id, …) here.
pub type InitFn = usize;

/// An opaque, by-copy reference to the team context an [`InitFn`] applies
/// to. Same borrowing contract as [`InitFn`].
pub type TeamRef = usize;
