//! Binary merge of two score maps: on overlap the higher score wins, on
//! tie the left operand wins; disjoint ranges from both operands survive.

use super::*;
use super::range_list::try_reserve;
use std::collections::VecDeque;
use std::vec::Vec;

/// Combines two range lists.
///
/// Processes working copies of both inputs left-to-right; `a` and `b`
/// themselves are never mutated. See [`crate::score_map::merge`] for the
/// map-level operation this backs.
pub(crate) fn merge_one<Init: Copy + Eq, Team: Copy + Eq>(
  a: &RangeList<Init, Team>,
  b: &RangeList<Init, Team>,
) -> Result<RangeList<Init, Team>> {
  let mut lst1: VecDeque<_> = a.ranges.iter().copied().collect();
  let mut lst2: VecDeque<_> = b.ranges.iter().copied().collect();
  let mut out: Vec<Range<Init, Team>> = Vec::new();

  while !(lst1.is_empty() && lst2.is_empty()) {
    if lst1.is_empty() {
      try_reserve(&mut out, 1)?;
      out.push(lst2.pop_front().expect("lst2 non-empty"));
      continue;
    }
    if lst2.is_empty() {
      try_reserve(&mut out, 1)?;
      out.push(lst1.pop_front().expect("lst1 non-empty"));
      continue;
    }

    let r1 = lst1[0];
    let r2 = lst2[0];

    if r1.start == r2.start && r1.end == r2.end {
      // Identical extents: higher score wins; ties keep r1 (first operand
      // wins).
      let best = if r2.score > r1.score { r2 } else { r1 };
      lst1.pop_front();
      lst2.pop_front();
      try_reserve(&mut out, 1)?;
      out.push(best);
      continue;
    }

    let left_is_1 = if r1.start != r2.start {
      r1.start < r2.start
    } else {
      r1.end < r2.end
    };
    let (left, right) = if left_is_1 { (r1, r2) } else { (r2, r1) };

    try_reserve(&mut out, 1)?;
    if left.end <= right.start {
      // Disjoint: emit `left` unchanged and advance past it.
      if left_is_1 {
        lst1.pop_front();
      } else {
        lst2.pop_front();
      }
      out.push(left);
    } else if left.end < right.end {
      // Partial overlap, `left` ends first.
      if left.score >= right.score {
        if left_is_1 {
          lst1.pop_front();
          lst2[0].start = left.end;
        } else {
          lst2.pop_front();
          lst1[0].start = left.end;
        }
        out.push(left);
      } else {
        if left_is_1 {
          lst1.pop_front();
        } else {
          lst2.pop_front();
        }
        if right.start > left.start {
          out.push(Range {
            end: right.start,
            ..left
          });
        }
      }
    } else {
      // `left` contains `right` (or matches its end exactly).
      if left.score >= right.score {
        if left_is_1 {
          lst2.pop_front();
        } else {
          lst1.pop_front();
        }
      } else {
        if right.start > left.start {
          out.push(Range {
            end: right.start,
            ..left
          });
          try_reserve(&mut out, 1)?;
        }
        out.push(right);
        if left_is_1 {
          lst2.pop_front();
          lst1[0].start = right.end;
        } else {
          lst1.pop_front();
          lst2[0].start = right.end;
        }
      }
    }
  }

  let mut result = RangeList { ranges: out };
  result.coalesce();
  Ok(result)
}

/// Combines two score maps cell-by-cell.
///
/// `a` and `b` are left untouched; the result is a freshly allocated map.
/// On failure (allocation failure in a cell), the partially-built result is
/// dropped and the inputs remain valid.
pub fn merge<Init: Copy + Eq, Team: Copy + Eq>(
  a: &ScoreMap<Init, Team>,
  b: &ScoreMap<Init, Team>,
) -> Result<ScoreMap<Init, Team>> {
  #[cfg(feature = "tracing")]
  tracing::trace!("merging two score maps");

  let mut out = ScoreMap::new();
  for coll in ColType::ALL {
    for mem in MemType::ALL {
      let merged = merge_one(a.cell(coll, mem), b.cell(coll, mem))?;
      *out.cell_mut(coll, mem) = merged;
    }
  }
  Ok(out)
}

/// Replaces `a` with `merge(&a, &b)`, consuming both inputs.
///
/// A convenience for the common case of folding a stream of per-plugin
/// score maps into one composite without keeping every intermediate map
/// alive.
pub fn merge_in<Init: Copy + Eq, Team: Copy + Eq>(
  a: ScoreMap<Init, Team>,
  b: ScoreMap<Init, Team>,
) -> Result<ScoreMap<Init, Team>> {
  merge(&a, &b)
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
  fn disjoint_merge_keeps_both() {
    let a = map_with(&[(0, 10, 5)]);
    let b = map_with(&[(20, 30, 5)]);
    let c = merge(&a, &b).unwrap();
    assert_eq!(ranges(&c), std::vec![(0, 10, 5), (20, 30, 5)]);
  }

  #[test]
  fn touching_identical_ranges_coalesce() {
    let a = map_with(&[(0, 10, 5)]);
    let b = map_with(&[(10, 20, 5)]);
    let c = merge(&a, &b).unwrap();
    assert_eq!(ranges(&c), std::vec![(0, 20, 5)]);
  }

  #[test]
  fn overlap_higher_score_wins_and_trims() {
    let a = map_with(&[(0, 100, 7)]);
    let b = map_with(&[(50, 150, 3)]);
    let c = merge(&a, &b).unwrap();
    assert_eq!(ranges(&c), std::vec![(0, 100, 7), (100, 150, 3)]);
  }

  #[test]
  fn contained_overlap_outer_wins() {
    let a = map_with(&[(0, 100, 9)]);
    let b = map_with(&[(20, 40, 1)]);
    let c = merge(&a, &b).unwrap();
    assert_eq!(ranges(&c), std::vec![(0, 100, 9)]);
  }

  #[test]
  fn contained_overlap_inner_wins_splits_outer() {
    let a = map_with(&[(0, 100, 1)]);
    let b = map_with(&[(20, 40, 9)]);
    let c = merge(&a, &b).unwrap();
    assert_eq!(ranges(&c), std::vec![(0, 20, 1), (20, 40, 9), (40, 100, 1)]);
  }

  #[test]
  fn merge_with_empty_is_identity() {
    let a = map_with(&[(0, 10, 5), (20, 30, 3)]);
    let empty = ScoreMap::new();
    let c = merge(&a, &empty).unwrap();
    assert_eq!(ranges(&c), ranges(&a));
    let c = merge(&empty, &a).unwrap();
    assert_eq!(ranges(&c), ranges(&a));
  }

  #[test]
  fn equal_score_tie_keeps_first_operand() {
    let a = map_with(&[(0, 100, 5)]);
    let mut b = ScoreMap::new();
    b.add_range(ColType::ALLREDUCE, MemType::Host, 0, 100, 5, Some(42), None)
      .unwrap();
    let c = merge(&a, &b).unwrap();
    let cell = c.cell(ColType::ALLREDUCE, MemType::Host);
    assert_eq!(cell.len(), 1);
    assert_eq!(cell.iter().next().unwrap().init, None);
  }

  /// Builds a random list of disjoint ranges over `[0, span)`, scored
  /// `1..=8` so ties between the two random operands are exercised too.
  fn random_disjoint_list(span: usize, max_ranges: usize) -> RangeList {
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
      let score = 1 + rand::random::<Score>() % 8;
      list.add_range(start, end, score, None, None).unwrap();
      cursor = end;
    }
    list
  }

  #[test]
  fn randomized_merge_upholds_range_list_invariants() {
    for _ in 0..200 {
      let a = random_disjoint_list(1000, 6);
      let b = random_disjoint_list(1000, 6);
      let merged = merge_one(&a, &b).unwrap();
      merged.assert_invariants();
    }
  }

  #[test]
  fn randomized_merge_never_drops_a_disjoint_range() {
    // Every range that does not overlap anything in the other operand
    // must survive the merge untouched (possibly coalesced with a
    // touching neighbor of the same score, which `random_disjoint_list`
    // never produces since scores are independent draws).
    for _ in 0..200 {
      let a = random_disjoint_list(1000, 6);
      let b = random_disjoint_list(1000, 6);
      let merged = merge_one(&a, &b).unwrap();
      for r in a.iter().chain(b.iter()) {
        let overlaps_other = a
          .iter()
          .chain(b.iter())
          .filter(|o| !std::ptr::eq(*o, r))
          .any(|o| o.start < r.end && r.start < o.end);
        if !overlaps_other {
          assert!(
            merged.iter().any(|m| m.start <= r.start && r.end <= m.end),
            "range {r:?} vanished from the merge result"
          );
        }
      }
    }
  }
}
