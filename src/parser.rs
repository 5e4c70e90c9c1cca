//! The selection-string grammar: converts a user-supplied string into
//! `add_range` calls (for [`alloc_from_str`]) or into an overlay applied
//! via [`crate::update::update`] (for [`update_from_str`]).
//!
//! ```text
//! entry     := field (':' field)*        // fields in any order
//! field     := coll_list | mem_list | score | msg_list
//! coll_list := coll_name (',' coll_name)*
//! mem_list  := mem_name (',' mem_name)*
//! score     := 'inf' | DECIMAL
//! msg_list  := range (',' range)*
//! range     := memunits '-' memunits
//! memunits  := DECIMAL [ 'K' | 'M' | 'G' ] [ 'b' | 'B' ]
//! string    := entry ('#' entry)*
//! ```

use super::*;
use std::string::String;
use std::vec::Vec;

/// Parses a `memunits` literal: a decimal integer with an optional binary
/// `K`/`M`/`G` multiplier and an optional, purely cosmetic `b`/`B` unit
/// suffix. The multiplier suffix is case-sensitive, matching the grammar.
fn parse_memunits(token: &str) -> Option<usize> {
  let mut rest = token;
  rest = rest.strip_suffix('b').or_else(|| rest.strip_suffix('B')).unwrap_or(rest);

  let (digits, multiplier) = if let Some(d) = rest.strip_suffix('K') {
    (d, 1usize << 10)
  } else if let Some(d) = rest.strip_suffix('M') {
    (d, 1usize << 20)
  } else if let Some(d) = rest.strip_suffix('G') {
    (d, 1usize << 30)
  } else {
    (rest, 1usize)
  };

  if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  digits.parse::<usize>().ok()?.checked_mul(multiplier)
}

fn try_coll_list(token: &str) -> Option<ColType> {
  let mut result = ColType::empty();
  for name in token.split(',') {
    result |= ColType::from_name(name)?;
  }
  Some(result)
}

fn try_mem_list(token: &str) -> Option<Vec<MemType>> {
  let mut result = Vec::new();
  for name in token.split(',') {
    result.push(MemType::from_name(name)?);
  }
  Some(result)
}

fn try_score(token: &str) -> Option<Score> {
  if token == "inf" {
    return Some(SCORE_MAX);
  }
  if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  token.parse::<Score>().ok()
}

fn try_msg_list(token: &str) -> Option<Vec<(usize, usize)>> {
  let mut result = Vec::new();
  for part in token.split(',') {
    let mut halves = part.splitn(2, '-');
    let lo = halves.next()?;
    let hi = halves.next()?;
    result.push((parse_memunits(lo)?, parse_memunits(hi)?));
  }
  Some(result)
}

/// The fields successfully classified out of one `:`-separated entry.
#[derive(Debug, Default)]
struct EntryFields {
  coll: Option<ColType>,
  mem: Option<Vec<MemType>>,
  score: Option<Score>,
  msg: Option<Vec<(usize, usize)>>,
}

/// Classifies every `:`-separated token of `entry`, greedily trying
/// coll-kind list, then mem-kind list, then score, then message-range
/// list. A field that has already been claimed is not tried
/// again; a token matching none of the four fails the whole entry.
fn classify_entry(entry: &str) -> Result<EntryFields> {
  let mut fields = EntryFields::default();
  for token in entry.split(':') {
    if fields.coll.is_none() {
      if let Some(c) = try_coll_list(token) {
        fields.coll = Some(c);
        continue;
      }
    }
    if fields.mem.is_none() {
      if let Some(m) = try_mem_list(token) {
        fields.mem = Some(m);
        continue;
      }
    }
    if fields.score.is_none() {
      if let Some(s) = try_score(token) {
        fields.score = Some(s);
        continue;
      }
    }
    if fields.msg.is_none() {
      if let Some(r) = try_msg_list(token) {
        fields.msg = Some(r);
        continue;
      }
    }
    return Err(Error::invalid_param(std::format!(
      "token {token:?} does not match any of coll-kind list, mem-kind list, score or message-range list"
    )));
  }
  Ok(fields)
}

/// Applies one entry's classified fields to `map` as the Cartesian
/// product of coll-kinds, mem-kinds and message ranges. A score
/// missing entirely makes the whole entry a no-op.
fn apply_entry<Init: Copy + Eq, Team: Copy + Eq>(
  map: &mut ScoreMap<Init, Team>,
  fields: EntryFields,
) -> Result<()> {
  let score = match fields.score {
    Some(s) => s,
    None => return Ok(()),
  };
  let colls = fields.coll.unwrap_or_else(ColType::all);
  let default_mems = MemType::ALL;
  let mems: &[MemType] = fields.mem.as_deref().unwrap_or(&default_mems);
  let default_ranges = [(0usize, MSG_MAX)];
  let ranges: &[(usize, usize)] = fields.msg.as_deref().unwrap_or(&default_ranges);

  for coll in colls.iter_bits() {
    for &mem in mems {
      for &(start, end) in ranges {
        map.add_range(coll, mem, start, end, score, None, None)?;
      }
    }
  }
  Ok(())
}

fn parse_entry<Init: Copy + Eq, Team: Copy + Eq>(
  map: &mut ScoreMap<Init, Team>,
  entry: &str,
) -> Result<()> {
  let fields = classify_entry(entry)?;
  apply_entry(map, fields)
}

/// Allocates a fresh [`ScoreMap`] and parses `selection` into it.
///
/// `selection` is a `#`-separated list of entries; each is parsed
/// independently and applied via `add_range`, so later entries never
/// overwrite earlier ones — they fail with [`Error::InvalidParam`] if they
/// overlap with something an earlier entry already registered.
///
/// `team_size` is accepted for interface parity with the caller's team
/// surface but unused by the grammar above — team-size ranges would be a
/// fifth field grammar, not yet implemented.
pub fn alloc_from_str<Init: Copy + Eq, Team: Copy + Eq>(
  selection: &str,
  team_size: usize,
) -> Result<ScoreMap<Init, Team>> {
  let _ = team_size;
  #[cfg(feature = "tracing")]
  tracing::debug!(selection, "parsing score selection string");

  let mut map = ScoreMap::new();
  for (idx, entry) in selection.split('#').enumerate() {
    parse_entry(&mut map, entry).map_err(|source| Error::parse(idx, entry, source))?;
  }
  Ok(map)
}

/// Parses `selection` into a fresh map and overlays it onto `dest` via
/// [`crate::update::update`]. The temporary overlay map is
/// dropped once applied.
pub fn update_from_str<Init: Copy + Eq, Team: Copy + Eq>(
  dest: &mut ScoreMap<Init, Team>,
  selection: &str,
  team_size: usize,
) -> Result<()> {
  let overlay = alloc_from_str(selection, team_size)?;
  update(dest, &overlay)
}

/// The team-surface form of [`update_from_str`]: resolves an algorithm
/// reference for every score-only range the parser produced (those have
/// `init: None`, since the grammar itself never names an implementation)
/// before overlaying onto `dest`.
///
/// `id_to_init` is tried first, keyed on the range's parsed score;
/// `default_init` is the fallback when it returns `None`. `default_score`
/// is accepted for parity with the team layer's API but is not consumed
/// here: every entry the grammar accepts already carries an explicit
/// score (a missing score makes the whole entry a no-op rather than
/// falling back to a default).
#[allow(clippy::too_many_arguments)]
pub fn update_from_str_with_init<Init, Team>(
  dest: &mut ScoreMap<Init, Team>,
  selection: &str,
  team_size: usize,
  default_init: Option<Init>,
  team: Option<Team>,
  default_score: Score,
  id_to_init: impl Fn(Score) -> Option<Init>,
) -> Result<()>
where
  Init: Copy + Eq,
  Team: Copy + Eq,
{
  let _ = default_score;
  let mut overlay = alloc_from_str(selection, team_size)?;
  for coll in ColType::ALL {
    for mem in MemType::ALL {
      for r in overlay.cell_mut(coll, mem).ranges.iter_mut() {
        if r.init.is_none() {
          r.init = id_to_init(r.score).or(default_init);
          r.team = team;
        }
      }
    }
  }
  update(dest, &overlay)
}
