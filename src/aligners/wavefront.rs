//! Gap-affine two-piece wavefront alignment.
//!
//! Fronts are indexed by score `s`. Each front covers a range of diagonals
//! `k = i - j`, where `i` indexes the target and `j` the query, and stores per
//! diagonal the furthest reached target offset `i` in five layers:
//! `M` (match/mismatch), `I1`/`D1` (first gap piece) and `I2`/`D2` (second gap
//! piece). An insertion consumes the query and moves to diagonal `k - 1`, a
//! deletion consumes the target and moves to diagonal `k + 1`.
//!
//! All fronts are kept until the end so the alignment can be traced back.
use std::cmp::{max, min};

use log::trace;

use crate::{
    cost_model::{Cost, ScoringConfig},
    error::{Error, Result},
    Seq,
};

type Offset = i32;

/// An unreachable cell. Far enough from `i32::MIN` that adding small values
/// does not overflow.
const NONE: Offset = Offset::MIN / 2;

const M: usize = 0;
const I1: usize = 1;
const D1: usize = 2;
const I2: usize = 3;
const D2: usize = 4;

/// Heuristic pruning of the fronts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Heuristic {
    /// Exact alignment.
    #[default]
    None,
    WfAdaptive(WfAdaptive),
}

/// Drop diagonals that lag far behind the leading one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WfAdaptive {
    /// Fronts with fewer diagonals are never cut.
    pub min_wavefront_length: i32,
    /// Diagonals whose remaining distance exceeds the best one by more than
    /// this are dropped.
    pub max_distance_threshold: i32,
    /// Cut every this many scores.
    pub steps_between_cutoffs: i32,
}

impl Default for WfAdaptive {
    fn default() -> Self {
        Self {
            min_wavefront_length: 10,
            max_distance_threshold: 50,
            steps_between_cutoffs: 1,
        }
    }
}

/// The diagonals `lo..=hi` of a single score.
struct Front {
    lo: i32,
    hi: i32,
    /// The diagonal stored at index 0 of each layer. Cutoffs move `lo` and
    /// `hi` but never reallocate.
    base: i32,
    layers: [Vec<Offset>; 5],
}

impl Front {
    fn new(lo: i32, hi: i32) -> Self {
        let len = (hi - lo + 1) as usize;
        Front {
            lo,
            hi,
            base: lo,
            layers: std::array::from_fn(|_| vec![NONE; len]),
        }
    }

    fn get(&self, layer: usize, k: i32) -> Offset {
        if k < self.lo || k > self.hi {
            NONE
        } else {
            self.layers[layer][(k - self.base) as usize]
        }
    }

    fn set(&mut self, layer: usize, k: i32, off: Offset) {
        self.layers[layer][(k - self.base) as usize] = off;
    }

    fn len(&self) -> i32 {
        self.hi - self.lo + 1
    }
}

/// A wavefront aligner for one configuration.
///
/// A new aligner starts without fronts; `align` fills them and leaves the
/// score and operations for `score` and `ops` to read.
pub struct WavefrontAligner {
    name: &'static str,
    cm: ScoringConfig,
    heuristic: Heuristic,
    fronts: Vec<Option<Front>>,
    score: Option<Cost>,
    ops: Vec<u8>,
}

impl WavefrontAligner {
    /// `name` is the back end reported in errors.
    ///
    /// Wavefronts only advance when every non-match step costs something, so
    /// the mismatch and both extend penalties must be positive.
    pub fn new(name: &'static str, cm: &ScoringConfig, heuristic: Heuristic) -> Result<Self> {
        let fail = |reason: String| Error::Backend {
            backend: name,
            reason,
        };
        cm.validate()?;
        if cm.mismatch <= 0 || cm.gap_extend1 <= 0 || cm.gap_extend2 <= 0 {
            return Err(fail(format!(
                "mismatch and gap extension penalties must be positive, got {cm:?}"
            )));
        }
        if let Heuristic::WfAdaptive(p) = heuristic {
            if p.steps_between_cutoffs <= 0
                || p.min_wavefront_length < 0
                || p.max_distance_threshold < 0
            {
                return Err(fail(format!("invalid wf-adaptive parameters {p:?}")));
            }
        }
        Ok(WavefrontAligner {
            name,
            cm: *cm,
            heuristic,
            fronts: vec![],
            score: None,
            ops: vec![],
        })
    }

    pub fn score(&self) -> Option<Cost> {
        self.score
    }

    /// The unpacked operations of the last alignment.
    pub fn ops(&self) -> &[u8] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<u8> {
        self.ops
    }

    /// Number of fronts computed by the last alignment, i.e. its score plus one.
    pub fn num_fronts(&self) -> usize {
        self.fronts.len()
    }

    fn fail(&self, reason: impl Into<String>) -> Error {
        Error::Backend {
            backend: self.name,
            reason: reason.into(),
        }
    }

    /// End-to-end alignment of `a` (target) and `b` (query).
    pub fn align(&mut self, a: Seq, b: Seq) -> Result<()> {
        self.fronts.clear();
        self.ops.clear();
        self.score = None;

        let n = a.len() as i32;
        let m = b.len() as i32;
        let k_end = n - m;
        let max_step = self.cm.max_step();

        let mut s: Cost = 0;
        let mut empty = 0;
        loop {
            let front = if s == 0 {
                let mut f = Front::new(0, 0);
                f.set(M, 0, 0);
                Some(f)
            } else {
                self.next_front(s, n, m)
            };
            let Some(mut front) = front else {
                empty += 1;
                if empty > max_step {
                    return Err(self.fail(format!("no wavefront left at score {s}")));
                }
                self.fronts.push(None);
                s += 1;
                continue;
            };
            empty = 0;
            extend(&mut front, a, b);
            if front.get(M, k_end) == n {
                self.fronts.push(Some(front));
                break;
            }
            self.cutoff(s, &mut front, n, m);
            self.fronts.push(Some(front));
            s += 1;
        }
        trace!("{} reached the end at score {s}", self.name);

        self.ops = self.traceback(n, m, s)?;
        self.score = Some(s);
        Ok(())
    }

    fn front(&self, s: Cost) -> Option<&Front> {
        if s < 0 {
            return None;
        }
        self.fronts.get(s as usize).and_then(Option::as_ref)
    }

    fn get(&self, s: Cost, layer: usize, k: i32) -> Offset {
        self.front(s).map_or(NONE, |f| f.get(layer, k))
    }

    /// The offsets reaching diagonal `k` at score `s`, before extension.
    /// Index `M` holds the mismatch candidate, the other indices the gap layers.
    fn sources(&self, s: Cost, k: i32, n: i32, m: i32) -> [Offset; 5] {
        let cm = &self.cm;
        let valid = |off: Offset| {
            if off >= 0 && off <= n && off - k >= 0 && off - k <= m {
                off
            } else {
                NONE
            }
        };
        let open1 = s - cm.gap_open1 - cm.gap_extend1;
        let open2 = s - cm.gap_open2 - cm.gap_extend2;
        let ext1 = s - cm.gap_extend1;
        let ext2 = s - cm.gap_extend2;

        let mut src = [NONE; 5];
        src[M] = valid(self.get(s - cm.mismatch, M, k) + 1);
        src[I1] = valid(max(self.get(open1, M, k + 1), self.get(ext1, I1, k + 1)));
        src[D1] = valid(max(self.get(open1, M, k - 1), self.get(ext1, D1, k - 1)) + 1);
        src[I2] = valid(max(self.get(open2, M, k + 1), self.get(ext2, I2, k + 1)));
        src[D2] = valid(max(self.get(open2, M, k - 1), self.get(ext2, D2, k - 1)) + 1);
        src
    }

    fn next_front(&self, s: Cost, n: i32, m: i32) -> Option<Front> {
        let cm = &self.cm;
        let (lo, hi) = [
            s - cm.mismatch,
            s - cm.gap_open1 - cm.gap_extend1,
            s - cm.gap_extend1,
            s - cm.gap_open2 - cm.gap_extend2,
            s - cm.gap_extend2,
        ]
        .into_iter()
        .filter_map(|s| self.front(s))
        .fold((i32::MAX, i32::MIN), |(lo, hi), f| {
            (min(lo, f.lo - 1), max(hi, f.hi + 1))
        });
        if lo > hi {
            return None;
        }
        let (lo, hi) = (max(lo, -m), min(hi, n));

        let mut front = Front::new(lo, hi);
        for k in lo..=hi {
            let src = self.sources(s, k, n, m);
            for layer in [I1, D1, I2, D2] {
                front.set(layer, k, src[layer]);
            }
            front.set(M, k, src.into_iter().max().unwrap_or(NONE));
        }
        Some(front)
    }

    /// The wf-adaptive cutoff: drop lagging diagonals from both ends.
    fn cutoff(&self, s: Cost, front: &mut Front, n: i32, m: i32) {
        let Heuristic::WfAdaptive(p) = self.heuristic else {
            return;
        };
        if s % p.steps_between_cutoffs != 0 || front.len() < p.min_wavefront_length {
            return;
        }
        let f: &Front = front;
        let Some(best) = (f.lo..=f.hi).filter_map(|k| distance(f, k, n, m)).min() else {
            return;
        };
        let lags = |f: &Front, k: i32| {
            distance(f, k, n, m).map_or(true, |d| d - best > p.max_distance_threshold)
        };
        let len = front.len();
        while front.lo < front.hi && lags(&*front, front.lo) {
            front.lo += 1;
        }
        while front.hi > front.lo && lags(&*front, front.hi) {
            front.hi -= 1;
        }
        if front.len() < len {
            trace!(
                "score {s}: cut front from {len} to {} diagonals",
                front.len()
            );
        }
    }

    fn traceback(&self, n: i32, m: i32, score: Cost) -> Result<Vec<u8>> {
        let cm = &self.cm;
        let piece = |layer: usize| match layer {
            I1 | D1 => (cm.gap_open1, cm.gap_extend1),
            _ => (cm.gap_open2, cm.gap_extend2),
        };

        let mut ops = Vec::with_capacity((n + m) as usize);
        let (mut s, mut k, mut off) = (score, n - m, n);
        let mut layer = M;
        loop {
            match layer {
                M => {
                    if s == 0 {
                        if k != 0 || off < 0 {
                            return Err(self.fail("traceback did not end at the origin"));
                        }
                        ops.extend(std::iter::repeat(b'M').take(off as usize));
                        break;
                    }
                    let src = self.sources(s, k, n, m);
                    let pre = src.into_iter().max().unwrap_or(NONE);
                    if pre < 0 || pre > off {
                        return Err(self.fail(format!("traceback lost the path at score {s}")));
                    }
                    ops.extend(std::iter::repeat(b'M').take((off - pre) as usize));
                    off = pre;
                    layer = [M, D1, I1, D2, I2]
                        .into_iter()
                        .find(|&l| src[l] == pre)
                        .unwrap_or(M);
                    if layer == M {
                        ops.push(b'X');
                        s -= cm.mismatch;
                        off -= 1;
                    }
                }
                D1 | D2 => {
                    let (o, e) = piece(layer);
                    ops.push(b'D');
                    if self.get(s - o - e, M, k - 1) + 1 == off {
                        layer = M;
                        s -= o + e;
                    } else {
                        s -= e;
                    }
                    k -= 1;
                    off -= 1;
                }
                _ => {
                    let (o, e) = piece(layer);
                    ops.push(b'I');
                    if self.get(s - o - e, M, k + 1) == off {
                        layer = M;
                        s -= o + e;
                    } else {
                        s -= e;
                    }
                    k += 1;
                }
            }
            if s < 0 {
                return Err(self.fail("traceback went below score 0"));
            }
        }
        ops.reverse();
        Ok(ops)
    }
}

/// Greedily follow matches along each diagonal of the `M` layer.
fn extend(front: &mut Front, a: Seq, b: Seq) {
    for k in front.lo..=front.hi {
        let idx = (k - front.base) as usize;
        let mut i = front.layers[M][idx];
        if i < 0 {
            continue;
        }
        let mut j = i - k;
        while (i as usize) < a.len() && (j as usize) < b.len() && a[i as usize] == b[j as usize] {
            i += 1;
            j += 1;
        }
        front.layers[M][idx] = i;
    }
}

/// Remaining distance to the end of diagonal `k`, if it was reached.
fn distance(front: &Front, k: i32, n: i32, m: i32) -> Option<i32> {
    let i = front.get(M, k);
    (i >= 0).then(|| max(n - i, m - (i - k)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn align(a: &[u8], b: &[u8], cm: &ScoringConfig) -> (Cost, String) {
        let mut wf = WavefrontAligner::new("test", cm, Heuristic::None).unwrap();
        wf.align(a, b).unwrap();
        (
            wf.score().unwrap(),
            String::from_utf8(wf.ops().to_vec()).unwrap(),
        )
    }

    #[test]
    fn identical() {
        let cm = ScoringConfig::default();
        assert_eq!(align(b"ACGTACGT", b"ACGTACGT", &cm), (0, "MMMMMMMM".into()));
        assert_eq!(align(b"", b"", &cm), (0, "".into()));
    }

    #[test]
    fn single_edits() {
        let cm = ScoringConfig::default();
        assert_eq!(align(b"ACGTACGT", b"ACGAACGT", &cm), (4, "MMMXMMMM".into()));
        assert_eq!(align(b"AACCGGTT", b"AACCGTT", &cm).0, 8);
        assert_eq!(align(b"AACCGTT", b"AACCGGTT", &cm).0, 8);
        assert_eq!(align(b"", b"ACG", &cm), (12, "III".into()));
        assert_eq!(align(b"ACG", b"", &cm), (12, "DDD".into()));
    }

    #[test]
    fn long_gap_uses_second_piece() {
        let cm = ScoringConfig::default();
        let a = b"ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT".to_vec();
        let mut b = a[..10].to_vec();
        b.extend_from_slice(&a[40..]);
        // 30 deletions: min(6 + 60, 24 + 30)
        let (score, ops) = align(&a, &b, &cm);
        assert_eq!(score, 54);
        assert_eq!(ops.bytes().filter(|&c| c == b'D').count(), 30);
    }

    #[test]
    fn zero_penalties_are_rejected() {
        for cm in [
            ScoringConfig::new(0, 6, 2, 24, 1).unwrap(),
            ScoringConfig::new(4, 6, 0, 24, 1).unwrap(),
            ScoringConfig::new(4, 6, 2, 24, 0).unwrap(),
        ] {
            assert!(matches!(
                WavefrontAligner::new("test", &cm, Heuristic::None),
                Err(Error::Backend { backend: "test", .. })
            ));
        }
    }

    #[test]
    fn adaptive_cuts_fronts() {
        let cm = ScoringConfig::default();
        let a = b"ACGTTGCAACGTTGCAACGTTGCA".repeat(20);
        let mut b = a.clone();
        b[100] = b'A';
        b.insert(200, b'C');
        let mut wf = WavefrontAligner::new(
            "test",
            &cm,
            Heuristic::WfAdaptive(WfAdaptive::default()),
        )
        .unwrap();
        wf.align(&a, &b).unwrap();
        assert!(wf.score().unwrap() >= align(&a, &b, &cm).0);
        assert_eq!(wf.num_fronts() as Cost, wf.score().unwrap() + 1);
    }
}
