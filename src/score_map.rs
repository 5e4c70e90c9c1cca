use super::*;
use std::vec::Vec;

/// A 2-D table, indexed by `(coll-kind, mem-kind)`, of the message-size
/// ranges registered for each combination.
///
/// Created empty, populated via [`ScoreMap::add_range`],
/// [`ScoreMap::build_default`] or [`crate::parser::alloc_from_str`],
/// combined via [`crate::merge::merge`]/[`crate::update::update`], and
/// queried read-only via [`ScoreMap::lookup`]. An empty cell means no
/// implementation is registered for that `(coll, mem)` pair.
///
/// `Init` and `Team` are borrowed, by-copy handles the core never
/// dereferences; they default to the crate's opaque [`InitFn`]/[`TeamRef`]
/// pointer-width tags but any `Copy + Eq` type works.
#[derive(Debug, Clone)]
pub struct ScoreMap<Init = InitFn, Team = TeamRef> {
  cells: Vec<RangeList<Init, Team>>,
}

#[inline]
const fn cell_index(coll: ColType, mem: MemType) -> usize {
  ilog2(coll) * MEMORY_TYPE_LAST + mem.index()
}

impl<Init, Team> Default for ScoreMap<Init, Team> {
  #[inline]
  fn default() -> Self {
    let mut cells = Vec::with_capacity(COLL_TYPE_NUM * MEMORY_TYPE_LAST);
    cells.resize_with(COLL_TYPE_NUM * MEMORY_TYPE_LAST, RangeList::default);
    Self { cells }
  }
}

impl<Init, Team> ScoreMap<Init, Team> {
  /// Creates an empty score map, with every `(coll, mem)` cell empty.
  #[inline]
  pub fn new() -> Self {
    Self::default()
  }

  /// Borrows the range list registered for `(coll, mem)`.
  ///
  /// `coll` must be a single bit; looking it up with a union of several
  /// collective kinds is a caller error (debug-asserted in [`ilog2`]).
  #[inline]
  pub fn cell(&self, coll: ColType, mem: MemType) -> &RangeList<Init, Team> {
    &self.cells[cell_index(coll, mem)]
  }

  #[inline]
  pub(crate) fn cell_mut(&mut self, coll: ColType, mem: MemType) -> &mut RangeList<Init, Team> {
    &mut self.cells[cell_index(coll, mem)]
  }

  /// Resolves `(coll, mem, size)` to the range selected for it, if any.
  #[inline]
  pub fn lookup(&self, coll: ColType, mem: MemType, size: usize) -> Option<&Range<Init, Team>> {
    self.cell(coll, mem).lookup(size)
  }
}

impl<Init: Copy + Eq, Team: Copy + Eq> ScoreMap<Init, Team> {
  /// Inserts `[start, end)` into the `(coll, mem)` cell.
  pub fn add_range(
    &mut self,
    coll: ColType,
    mem: MemType,
    start: usize,
    end: usize,
    score: Score,
    init: Option<Init>,
    team: Option<Team>,
  ) -> Result<()> {
    self.cell_mut(coll, mem).add_range(start, end, score, init, team)
  }

  /// Builds a score map covering `[0, MSG_MAX)` with `default_score` and
  /// `default_init` for every collective kind set in `coll_mask`.
  ///
  /// When `mem_types` is `None`, every memory kind in
  /// `[0, MEMORY_TYPE_LAST)` is populated; otherwise only the listed
  /// kinds are.
  pub fn build_default(
    team: Option<Team>,
    default_score: Score,
    default_init: Option<Init>,
    coll_mask: ColType,
    mem_types: Option<&[MemType]>,
  ) -> Result<Self> {
    let mut map = Self::new();
    let mem_types: &[MemType] = mem_types.unwrap_or(&MemType::ALL);
    for coll in coll_mask.iter_bits() {
      for &mem in mem_types {
        map.add_range(coll, mem, 0, MSG_MAX, default_score, default_init, team)?;
      }
    }
    Ok(map)
  }
}
