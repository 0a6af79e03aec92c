use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use gmq_core::errors::{config_error, ErrorInfo, GmqError};
use gmq_core::BASIS;

/// Largest coefficient magnitude accepted on any axis.
pub const MAX_AXIS_MAGNITUDE: i64 = 1 << 40;

/// Default upper bound on the number of triples a single search may visit.
pub const DEFAULT_MAX_VOLUME: u64 = 8_000_000;

/// Inclusive integer range `[lo, hi]`. Empty when `lo > hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisRange {
    /// Lower bound (inclusive).
    pub lo: i64,
    /// Upper bound (inclusive).
    pub hi: i64,
}

impl AxisRange {
    /// Creates a range.
    pub const fn new(lo: i64, hi: i64) -> Self {
        Self { lo, hi }
    }

    /// Range `[-radius, radius]`.
    pub const fn symmetric(radius: i64) -> Self {
        Self {
            lo: -radius,
            hi: radius,
        }
    }

    /// Number of integers in the range.
    pub fn len(&self) -> u64 {
        if self.lo > self.hi {
            0
        } else {
            u64::try_from(i128::from(self.hi) - i128::from(self.lo) + 1).unwrap_or(u64::MAX)
        }
    }

    /// Returns true when the range holds no integers.
    pub fn is_empty(&self) -> bool {
        self.lo > self.hi
    }

    /// Returns true when `value` lies inside the range.
    pub fn contains(&self, value: i64) -> bool {
        self.lo <= value && value <= self.hi
    }

    fn clamp(&self, value: i128) -> i64 {
        value.clamp(i128::from(self.lo), i128::from(self.hi)) as i64
    }
}

/// Inclusive box of `(a, b, c)` coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchBox {
    /// Range of the coefficient on 8.
    pub a: AxisRange,
    /// Range of the coefficient on 15.
    pub b: AxisRange,
    /// Range of the coefficient on 24.
    pub c: AxisRange,
}

impl SearchBox {
    /// Creates a box from three axis ranges.
    pub const fn new(a: AxisRange, b: AxisRange, c: AxisRange) -> Self {
        Self { a, b, c }
    }

    /// Cube `[-radius, radius]^3`.
    pub const fn cube(radius: i64) -> Self {
        let axis = AxisRange::symmetric(radius);
        Self::new(axis, axis, axis)
    }

    /// Number of triples in the box, saturating at `u64::MAX`.
    pub fn volume(&self) -> u64 {
        self.a
            .len()
            .saturating_mul(self.b.len())
            .saturating_mul(self.c.len())
    }

    /// Returns true when the triple lies inside the box.
    pub fn contains(&self, triple: &BasisTriple) -> bool {
        self.a.contains(triple.a) && self.b.contains(triple.b) && self.c.contains(triple.c)
    }

    /// Rejects axis bounds beyond [`MAX_AXIS_MAGNITUDE`].
    pub fn check_magnitude(&self) -> Result<(), GmqError> {
        for (axis, range) in [("a", self.a), ("b", self.b), ("c", self.c)] {
            if range.lo.abs() > MAX_AXIS_MAGNITUDE || range.hi.abs() > MAX_AXIS_MAGNITUDE {
                return Err(GmqError::Config(
                    ErrorInfo::new("decomp_axis_magnitude", "axis bound too large")
                        .with_context("axis", axis)
                        .with_context("lo", range.lo.to_string())
                        .with_context("hi", range.hi.to_string()),
                ));
            }
        }
        Ok(())
    }
}

impl Default for SearchBox {
    fn default() -> Self {
        Self::new(
            AxisRange::symmetric(30),
            AxisRange::symmetric(20),
            AxisRange::symmetric(10),
        )
    }
}

/// Integer coefficients `(a, b, c)` on the basis `[8, 15, 24]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BasisTriple {
    /// Coefficient on 8.
    pub a: i64,
    /// Coefficient on 15.
    pub b: i64,
    /// Coefficient on 24.
    pub c: i64,
}

impl BasisTriple {
    /// Creates a triple.
    pub const fn new(a: i64, b: i64, c: i64) -> Self {
        Self { a, b, c }
    }

    /// `8a + 15b + 24c`.
    pub fn value(&self) -> i64 {
        BASIS[0] * self.a + BASIS[1] * self.b + BASIS[2] * self.c
    }

    /// `|a| + |b| + |c|`.
    pub fn l1(&self) -> u64 {
        self.a.unsigned_abs() + self.b.unsigned_abs() + self.c.unsigned_abs()
    }
}

/// Search mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SearchMode {
    /// Only triples with `8a + 15b + 24c == q`.
    Exact,
    /// Triples minimising `|8a + 15b + 24c + d - q|` with `d` in `offset`.
    BestFit {
        /// Allowed range of the constant offset `d`.
        offset: AxisRange,
    },
}

impl Default for SearchMode {
    fn default() -> Self {
        SearchMode::Exact
    }
}

/// One decomposition candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecompositionHit {
    /// Coefficients.
    pub triple: BasisTriple,
    /// Offset `d` (always zero in exact mode).
    pub offset: i64,
    /// `8a + 15b + 24c`.
    pub value: i64,
    /// `|value + d - q|`.
    pub residual: u64,
}

impl DecompositionHit {
    fn rank_key(&self) -> (u64, u64, u64) {
        (self.residual, self.triple.l1(), self.offset.unsigned_abs())
    }
}

/// Hit ordering: residual, then `|a|+|b|+|c|`, then `|d|`, then `(a, b, c)`.
pub fn compare_hits(lhs: &DecompositionHit, rhs: &DecompositionHit) -> Ordering {
    lhs.rank_key()
        .cmp(&rhs.rank_key())
        .then_with(|| lhs.triple.cmp(&rhs.triple))
}

/// Options for [`decompose`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecomposeOpts {
    /// Coefficient box.
    #[serde(default, rename = "box")]
    pub search_box: SearchBox,
    /// Exact or best-fit search.
    #[serde(default)]
    pub mode: SearchMode,
    /// Maximum number of hits reported; `None` reports all.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Turn an empty result into [`GmqError::EmptySearchResult`].
    #[serde(default)]
    pub require_solution: bool,
    /// Largest box volume accepted.
    #[serde(default = "default_max_volume")]
    pub max_volume: u64,
}

fn default_max_volume() -> u64 {
    DEFAULT_MAX_VOLUME
}

impl Default for DecomposeOpts {
    fn default() -> Self {
        Self {
            search_box: SearchBox::default(),
            mode: SearchMode::Exact,
            limit: None,
            require_solution: false,
            max_volume: default_max_volume(),
        }
    }
}

impl DecomposeOpts {
    /// Exact search over `search_box` with every other knob at its default.
    pub fn exact(search_box: SearchBox) -> Self {
        Self {
            search_box,
            ..Self::default()
        }
    }

    /// Best-fit search over `search_box` with offsets drawn from `offset`.
    pub fn best_fit(search_box: SearchBox, offset: AxisRange) -> Self {
        Self {
            search_box,
            mode: SearchMode::BestFit { offset },
            ..Self::default()
        }
    }
}

/// Result of one search. `hits` is sorted by [`compare_hits`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    /// Target code.
    pub q: i64,
    /// Box searched.
    #[serde(rename = "box")]
    pub search_box: SearchBox,
    /// Mode used.
    pub mode: SearchMode,
    /// Best hits, truncated to the configured limit.
    pub hits: Vec<DecompositionHit>,
    /// Number of hits before truncation.
    pub total_hits: u64,
    /// False when more than one hit shares the best residual, L1 norm and offset.
    pub unique: bool,
}

impl Decomposition {
    /// The preferred hit, if any.
    pub fn best(&self) -> Option<&DecompositionHit> {
        self.hits.first()
    }

    /// Returns true when nothing was found.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

#[derive(Debug, Default)]
struct SliceHits {
    residual: Option<u64>,
    count: u64,
    hits: Vec<DecompositionHit>,
}

impl SliceHits {
    fn push(&mut self, hit: DecompositionHit, keep: usize) {
        match self.residual {
            Some(best) if hit.residual > best => return,
            Some(best) if hit.residual < best => {
                self.hits.clear();
                self.count = 0;
            }
            _ => {}
        }
        self.residual = Some(hit.residual);
        self.count += 1;
        self.hits.push(hit);
        if self.hits.len() > keep.saturating_mul(2).max(64) {
            self.trim(keep);
        }
    }

    fn trim(&mut self, keep: usize) {
        self.hits.sort_by(compare_hits);
        self.hits.truncate(keep);
    }

    fn merge(mut self, other: SliceHits, keep: usize) -> SliceHits {
        match (self.residual, other.residual) {
            (_, None) => self,
            (None, Some(_)) => other,
            (Some(lhs), Some(rhs)) if rhs < lhs => other,
            (Some(lhs), Some(rhs)) if lhs < rhs => self,
            _ => {
                self.count += other.count;
                self.hits.extend(other.hits);
                self.trim(keep);
                self
            }
        }
    }
}

fn scan_slice(a: i64, q: i64, search_box: &SearchBox, mode: &SearchMode, keep: usize) -> SliceHits {
    let mut slice = SliceHits::default();
    let offset = match mode {
        SearchMode::Exact => AxisRange::new(0, 0),
        SearchMode::BestFit { offset } => *offset,
    };
    for b in search_box.b.lo..=search_box.b.hi {
        for c in search_box.c.lo..=search_box.c.hi {
            let triple = BasisTriple::new(a, b, c);
            let value = triple.value();
            let d = offset.clamp(i128::from(q) - i128::from(value));
            let miss = i128::from(value) + i128::from(d) - i128::from(q);
            let residual = u64::try_from(miss.unsigned_abs()).unwrap_or(u64::MAX);
            if matches!(mode, SearchMode::Exact) && residual != 0 {
                continue;
            }
            slice.push(
                DecompositionHit {
                    triple,
                    offset: d,
                    value,
                    residual,
                },
                keep,
            );
        }
    }
    slice
}

/// Searches the box for decompositions of `q`.
///
/// The `a` axis is scanned in parallel; hits are sorted afterwards so the
/// result never depends on scheduling. In best-fit mode only the hits sharing
/// the minimal residual are kept.
pub fn decompose(q: i64, opts: &DecomposeOpts) -> Result<Decomposition, GmqError> {
    let search_box = opts.search_box;
    search_box.check_magnitude()?;
    if let SearchMode::BestFit { offset } = opts.mode {
        if offset.is_empty() {
            return Err(config_error(
                "decomp_offset_empty",
                "best-fit offset range must contain at least one value",
            ));
        }
    }
    let volume = search_box.volume();
    if volume > opts.max_volume {
        return Err(GmqError::Config(
            ErrorInfo::new("decomp_box_volume", "search box exceeds the volume limit")
                .with_context("volume", volume.to_string())
                .with_context("max_volume", opts.max_volume.to_string())
                .with_hint("shrink the box or raise `max_volume`"),
        ));
    }

    // Keep two hits even under `limit = 1` so ties remain visible.
    let keep = opts.limit.unwrap_or(usize::MAX).max(2);
    let merged = if search_box.b.is_empty() || search_box.c.is_empty() {
        SliceHits::default()
    } else {
        (search_box.a.lo..=search_box.a.hi)
            .into_par_iter()
            .map(|a| scan_slice(a, q, &search_box, &opts.mode, keep))
            .reduce(SliceHits::default, |lhs, rhs| lhs.merge(rhs, keep))
    };

    let mut hits = merged.hits;
    hits.sort_by(compare_hits);
    let unique = match hits.as_slice() {
        [first, second, ..] => first.rank_key() != second.rank_key(),
        _ => true,
    };
    if merged.count == 0 && opts.require_solution {
        return Err(GmqError::EmptySearchResult(
            ErrorInfo::new("decomp_empty", "no decomposition found in the search box")
                .with_context("q", q.to_string())
                .with_context("volume", volume.to_string()),
        ));
    }
    if let Some(limit) = opts.limit {
        hits.truncate(limit);
    }

    Ok(Decomposition {
        q,
        search_box,
        mode: opts.mode,
        hits,
        total_hits: merged.count,
        unique,
    })
}
