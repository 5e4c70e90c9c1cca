//! Asymmetric overlay: `update(dest, src)` lets `src` override `dest`
//! wherever the two overlap, expressing the user's authority to tweak a
//! previously-built score map.

use super::*;
use super::range_list::try_reserve;
use std::vec::Vec;

/// Overlays `src` onto `dest`.
///
/// Walks both lists in lockstep, splitting `dest` ranges at `src`
/// boundaries and overwriting the score of whatever portion overlaps.
/// `src`'s `init`/`team` are never propagated into `dest` — only the
/// score changes; a higher-level caller that wants new implementations
/// attached goes through [`crate::parser::update_from_str`], which fills
/// `init`/`team` into the overlay before calling this.
pub(crate) fn update_one<Init: Copy + Eq, Team: Copy + Eq>(
  dest: &RangeList<Init, Team>,
  src: &RangeList<Init, Team>,
) -> Result<RangeList<Init, Team>> {
  if dest.ranges.is_empty() || src.ranges.is_empty() {
    let mut out: Vec<Range<Init, Team>> = Vec::new();
    try_reserve(&mut out, dest.ranges.len())?;
    out.extend_from_slice(&dest.ranges);
    return Ok(RangeList { ranges: out });
  }

  let mut out: Vec<Range<Init, Team>> = Vec::new();
  let mut s_idx = 0usize;
  let mut d_idx = 0usize;
  let mut rd = dest.ranges[0];

  loop {
    if s_idx >= src.ranges.len() || d_idx >= dest.ranges.len() {
      break;
    }
    let rs = src.ranges[s_idx];

    if rd.start >= rs.end {
      // No overlap; the src range is entirely to the left.
      s_idx += 1;
    } else if rd.end <= rs.start {
      // No overlap; the dest range is entirely to the left.
      try_reserve(&mut out, 1)?;
      out.push(rd);
      d_idx += 1;
      if d_idx < dest.ranges.len() {
        rd = dest.ranges[d_idx];
      }
    } else if rd.start < rs.start {
      // `rd` protrudes to the left of `rs`: split off the untouched prefix
      // and keep processing the remainder as the new `rd`.
      try_reserve(&mut out, 1)?;
      out.push(Range {
        end: rs.start,
        ..rd
      });
      rd.start = rs.start;
    } else if rd.end <= rs.end {
      // `rd` sits entirely inside `rs`: overwrite its score.
      try_reserve(&mut out, 1)?;
      out.push(Range {
        score: rs.score,
        ..rd
      });
      d_idx += 1;
      if d_idx < dest.ranges.len() {
        rd = dest.ranges[d_idx];
      }
    } else {
      // `rd` protrudes to the right of `rs`: the overlapping left part
      // gets `rs`'s score, the remainder keeps `rd`'s own attributes and
      // is processed against the next src range.
      try_reserve(&mut out, 1)?;
      out.push(Range {
        end: rs.end,
        score: rs.score,
        ..rd
      });
      rd.start = rs.end;
      s_idx += 1;
    }
  }

  if d_idx < dest.ranges.len() {
    let remainder = &dest.ranges[d_idx + 1..];
    try_reserve(&mut out, 1 + remainder.len())?;
    out.push(rd);
    out.extend_from_slice(remainder);
  }

  let mut result = RangeList { ranges: out };
  result.retain_enabled();
  result.coalesce();
  Ok(result)
}

/// Overlays `src` onto `dest` in place, cell by cell.
///
/// On failure `dest` is left as it was before the call for every cell
/// already processed; the caller should treat `dest` as poisoned and drop
/// it, matching the all-or-nothing contract `merge`/`update` share.
pub fn update<Init: Copy + Eq, Team: Copy + Eq>(
  dest: &mut ScoreMap<Init, Team>,
  src: &ScoreMap<Init, Team>,
) -> Result<()> {
  #[cfg(feature = "tracing")]
  tracing::trace!("applying overlay to score map");

  for coll in ColType::ALL {
    for mem in MemType::ALL {
      let updated = update_one(dest.cell(coll, mem), src.cell(coll, mem))?;
      *dest.cell_mut(coll, mem) = updated;
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn map_with(entries: &[(usize, usize, Score)]) -> ScoreMap {
    let mut m = ScoreMap::new();
    for &(start, end, score) in entries {
      m.add_range(ColType::ALLREDUCE, MemType::Host, start, end, score, None, None)
        .unwrap();
    }
    m
  }

  fn ranges(m: &ScoreMap) -> Vec<(usize, usize, Score)> {
    m.cell(ColType::ALLREDUCE, MemType::Host)
      .iter()
      .map(|r| (r.start, r.end, r.score))
      .collect()
  }

  #[test]
  fn update_with_empty_overlay_is_noop() {
    let mut dest = map_with(&[(0, 100, 5)]);
    let before = ranges(&dest);
    let overlay = ScoreMap::new();
    update(&mut dest, &overlay).unwrap();
    assert_eq!(ranges(&dest), before);
  }

  #[test]
  fn update_disables_a_sub_range() {
    let mut dest = ScoreMap::new();
    dest
      .add_range(ColType::ALLREDUCE, MemType::Host, 0, MSG_MAX, 5, None, None)
      .unwrap();
    let mut overlay = ScoreMap::new();
    overlay
      .add_range(ColType::ALLREDUCE, MemType::Host, 100, 200, 0, None, None)
      .unwrap();
    // add_range silently drops score == 0, so build the overlay range list
    // directly to express "this sub-range is disabled".
    let raw = overlay.cell_mut(ColType::ALLREDUCE, MemType::Host);
    raw.ranges.push(Range {
      start: 100,
      end: 200,
      score: 0,
      init: None,
      team: None,
    });

    update(&mut dest, &overlay).unwrap();
    assert_eq!(ranges(&dest), std::vec![(0, 100, 5), (200, MSG_MAX, 5)]);
  }

  #[test]
  fn update_overwrites_contained_range() {
    let mut dest = map_with(&[(0, 100, 5)]);
    let mut overlay = ScoreMap::new();
    overlay
      .add_range(ColType::ALLREDUCE, MemType::Host, 20, 40, 9, None, None)
      .unwrap();
    update(&mut dest, &overlay).unwrap();
    assert_eq!(ranges(&dest), std::vec![(0, 20, 5), (20, 40, 9), (40, 100, 5)]);
  }

  #[test]
  fn update_split_left_protrusion_then_right_protrusion() {
    let mut dest = map_with(&[(0, 300, 5)]);
    let mut overlay = ScoreMap::new();
    overlay
      .add_range(ColType::ALLREDUCE, MemType::Host, 100, 200, 9, None, None)
      .unwrap();
    update(&mut dest, &overlay).unwrap();
    assert_eq!(
      ranges(&dest),
      std::vec![(0, 100, 5), (100, 200, 9), (200, 300, 5)]
    );
  }

  fn random_disjoint_list(span: usize, max_ranges: usize, allow_disabled: bool) -> RangeList {
    let mut list = RangeList::new();
    let mut cursor = 0usize;
    for _ in 0..max_ranges {
      if cursor >= span {
        break;
      }
      let gap: usize = rand::random::<usize>() % (span / max_ranges + 1);
      let start = cursor + gap;
      if start >= span {
        break;
      }
      let len = 1 + rand::random::<usize>() % (span / max_ranges + 1);
      let end = (start + len).min(span);
      let score = if allow_disabled && rand::random::<bool>() {
        0
      } else {
        1 + rand::random::<Score>() % 8
      };
      if score == 0 {
        // `add_range` silently drops disabled ranges; push directly so the
        // overlay can actually carry a disable, mirroring
        // `update_disables_a_sub_range` above.
        list.ranges.push(Range {
          start,
          end,
          score,
          init: None,
          team: None,
        });
      } else {
        list.add_range(start, end, score, None, None).unwrap();
      }
      cursor = end;
    }
    list
  }

  #[test]
  fn randomized_update_upholds_range_list_invariants() {
    for _ in 0..200 {
      let dest = random_disjoint_list(1000, 6, false);
      let src = random_disjoint_list(1000, 6, true);
      let updated = update_one(&dest, &src).unwrap();
      updated.assert_invariants();
    }
  }

  #[test]
  fn randomized_update_never_overrides_outside_src_coverage() {
    for _ in 0..200 {
      let dest = random_disjoint_list(1000, 6, false);
      let src = random_disjoint_list(1000, 6, false);
      let updated = update_one(&dest, &src).unwrap();
      for size in (0..1000).step_by(17) {
        let covered_by_src = src.lookup(size).is_some();
        if !covered_by_src {
          assert_eq!(
            updated.lookup(size).map(|r| r.score),
            dest.lookup(size).map(|r| r.score),
            "size {size} outside every src range changed score"
          );
        }
      }
    }
  }
}
