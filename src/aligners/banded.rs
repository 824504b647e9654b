//! Banded two-piece affine DP with traceback, in the style of `ksw_extd2`.
//!
//! `H[i][j]` is the cost of aligning `a[..i]` (target) to `b[..j]` (query).
//! `E1`/`E2` hold deletions (consuming the target, moving down a row),
//! `F1`/`F2` insertions (consuming the query, moving right). Only cells with
//! `|j - i| <= w` are computed. Mismatches and matches are both reported as
//! `M`.
use std::cmp::{max, min};

use log::debug;

use super::{AlignmentOutcome, Aligner};
use crate::{
    cost_model::{Cost, ScoringConfig},
    error::{Error, Result},
    Seq,
};

pub const NAME: &str = "Banded-DP";

/// Band width used when none is given.
pub const DEFAULT_BANDWIDTH: usize = 500;

const INF: Cost = Cost::MAX / 4;

// Traceback byte layout: the low 3 bits say where H came from, the high bits
// whether each gap layer was extended from the cell before.
const FROM_DIAG: u8 = 0;
const FROM_E1: u8 = 1;
const FROM_E2: u8 = 2;
const FROM_F1: u8 = 3;
const FROM_F2: u8 = 4;
const EXT_E1: u8 = 1 << 3;
const EXT_E2: u8 = 1 << 4;
const EXT_F1: u8 = 1 << 5;
const EXT_F2: u8 = 1 << 6;

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    H,
    E1,
    E2,
    F1,
    F2,
}

/// The traceback bytes of all band cells, row by row.
struct Traceback {
    /// First column of each row.
    lo: Vec<usize>,
    /// Start of each row in `cells`.
    start: Vec<usize>,
    cells: Vec<u8>,
}

impl Traceback {
    fn get(&self, i: usize, j: usize) -> u8 {
        self.cells[self.start[i] + j - self.lo[i]]
    }
}

/// `min` of a gap open and a gap extend, and whether the extend won.
fn gap(open: Cost, extend: Cost) -> (Cost, bool) {
    if extend < open {
        (extend, true)
    } else {
        (open, false)
    }
}

/// Global alignment of `a` (target) and `b` (query) within band `w`, which
/// is widened to `|n - m|` so that the end cell is reachable.
pub fn banded_align(a: Seq, b: Seq, cm: &ScoringConfig, w: usize) -> Result<(Cost, Vec<u8>)> {
    cm.validate()?;
    let (n, m) = (a.len(), b.len());
    let w = max(w, n.abs_diff(m));
    let (oe1, oe2) = (cm.gap_open1 + cm.gap_extend1, cm.gap_open2 + cm.gap_extend2);
    let (e1, e2) = (cm.gap_extend1, cm.gap_extend2);

    let mut h = [vec![INF; m + 1], vec![INF; m + 1]];
    let mut de1 = [vec![INF; m + 1], vec![INF; m + 1]];
    let mut de2 = [vec![INF; m + 1], vec![INF; m + 1]];

    let band_cells = (0..=n)
        .map(|i| min(m, i + w) + 1 - i.saturating_sub(w).min(m + 1))
        .sum::<usize>();
    let mut tb = Traceback {
        lo: Vec::with_capacity(n + 1),
        start: Vec::with_capacity(n + 1),
        cells: Vec::with_capacity(band_cells),
    };

    for i in 0..=n {
        let (cur, prev) = (i % 2, (i + 1) % 2);
        let lo = i.saturating_sub(w);
        let hi = min(m, i + w);
        tb.lo.push(lo);
        tb.start.push(tb.cells.len());
        if lo > hi {
            continue;
        }

        let (mut f1, mut f2) = (INF, INF);
        for j in lo..=hi {
            let mut t = 0u8;

            // Deletions, from the row above.
            let (ve1, ve2) = if i > 0 {
                let (x1, ext1) = gap(h[prev][j] + oe1, de1[prev][j] + e1);
                let (x2, ext2) = gap(h[prev][j] + oe2, de2[prev][j] + e2);
                if ext1 {
                    t |= EXT_E1;
                }
                if ext2 {
                    t |= EXT_E2;
                }
                (min(x1, INF), min(x2, INF))
            } else {
                (INF, INF)
            };

            // Insertions, from the cell to the left.
            if j > lo {
                let (x1, ext1) = gap(h[cur][j - 1] + oe1, f1 + e1);
                let (x2, ext2) = gap(h[cur][j - 1] + oe2, f2 + e2);
                if ext1 {
                    t |= EXT_F1;
                }
                if ext2 {
                    t |= EXT_F2;
                }
                f1 = min(x1, INF);
                f2 = min(x2, INF);
            }

            let diag = if i > 0 && j > 0 {
                h[prev][j - 1] + if a[i - 1] == b[j - 1] { 0 } else { cm.mismatch }
            } else if i == 0 && j == 0 {
                0
            } else {
                INF
            };

            let (best, from) = [
                (diag, FROM_DIAG),
                (ve1, FROM_E1),
                (ve2, FROM_E2),
                (f1, FROM_F1),
                (f2, FROM_F2),
            ]
            .into_iter()
            .fold((INF, FROM_DIAG), |acc, x| if x.0 < acc.0 { x } else { acc });

            h[cur][j] = min(best, INF);
            de1[cur][j] = ve1;
            de2[cur][j] = ve2;
            tb.cells.push(t | from);
        }
        // The next row may read one column past either end of this band.
        for j in [lo.checked_sub(1), Some(hi + 1)].into_iter().flatten() {
            if j <= m {
                h[cur][j] = INF;
                de1[cur][j] = INF;
                de2[cur][j] = INF;
            }
        }
    }

    let score = h[n % 2][m];
    if score >= INF {
        return Err(Error::Backend {
            backend: NAME,
            reason: format!("cost of aligning lengths {n} and {m} exceeds {INF}"),
        });
    }
    Ok((score, traceback(&tb, n, m)))
}

fn traceback(tb: &Traceback, n: usize, m: usize) -> Vec<u8> {
    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (n, m);
    let mut state = State::H;
    while i > 0 || j > 0 {
        let t = tb.get(i, j);
        match state {
            State::H => match t & 7 {
                FROM_E1 => state = State::E1,
                FROM_E2 => state = State::E2,
                FROM_F1 => state = State::F1,
                FROM_F2 => state = State::F2,
                _ => {
                    ops.push(b'M');
                    i -= 1;
                    j -= 1;
                }
            },
            State::E1 | State::E2 => {
                let ext = if state == State::E1 { EXT_E1 } else { EXT_E2 };
                ops.push(b'D');
                if t & ext == 0 {
                    state = State::H;
                }
                i -= 1;
            }
            State::F1 | State::F2 => {
                let ext = if state == State::F1 { EXT_F1 } else { EXT_F2 };
                ops.push(b'I');
                if t & ext == 0 {
                    state = State::H;
                }
                j -= 1;
            }
        }
    }
    ops.reverse();
    ops
}

/// KSW2-style banded aligner.
#[derive(Clone, Copy, Debug)]
pub struct BandedDp {
    pub bandwidth: usize,
}

impl Default for BandedDp {
    fn default() -> Self {
        Self {
            bandwidth: DEFAULT_BANDWIDTH,
        }
    }
}

impl Aligner for BandedDp {
    fn name(&self) -> &'static str {
        NAME
    }

    fn align_global(
        &mut self,
        target: Seq,
        query: Seq,
        cm: &ScoringConfig,
    ) -> Result<AlignmentOutcome> {
        let (score, ops) = banded_align(target, query, cm, self.bandwidth)?;
        if target.len().abs_diff(query.len()) > self.bandwidth {
            debug!(
                "{NAME}: band widened to {} for lengths {} and {}",
                target.len().abs_diff(query.len()),
                target.len(),
                query.len()
            );
        }
        Ok(AlignmentOutcome {
            ops,
            score: Some(score),
        })
    }
}
