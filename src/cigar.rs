//! Run-length compression of unpacked alignment operations.
//!
//! Aligners report one operation per aligned column (`MMMXMMID...`). The
//! benchmark compresses these into a CIGAR like `3=1X2=1I1D`. The libraries
//! being compared do not agree on whether `M` means "aligned" or "aligned and
//! equal", so every run of `M` is printed as `=`. This is a display policy, not
//! a correctness check.
use std::{fmt, str::FromStr};

use itertools::Itertools;

use crate::error::{Error, Result};

/// One SAM CIGAR operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CigarOp {
    /// `M`: aligned, equality not asserted.
    Match,
    /// `I`: consumes the query only.
    Ins,
    /// `D`: consumes the target only.
    Del,
    /// `N`: skipped target region.
    Skip,
    /// `S`: soft clip.
    SoftClip,
    /// `H`: hard clip.
    HardClip,
    /// `P`: padding.
    Pad,
    /// `=`: aligned and equal.
    Equal,
    /// `X`: aligned and different.
    Sub,
}

impl CigarOp {
    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            b'M' => CigarOp::Match,
            b'I' => CigarOp::Ins,
            b'D' => CigarOp::Del,
            b'N' => CigarOp::Skip,
            b'S' => CigarOp::SoftClip,
            b'H' => CigarOp::HardClip,
            b'P' => CigarOp::Pad,
            b'=' => CigarOp::Equal,
            b'X' => CigarOp::Sub,
            _ => return None,
        })
    }

    pub fn to_byte(self) -> u8 {
        match self {
            CigarOp::Match => b'M',
            CigarOp::Ins => b'I',
            CigarOp::Del => b'D',
            CigarOp::Skip => b'N',
            CigarOp::SoftClip => b'S',
            CigarOp::HardClip => b'H',
            CigarOp::Pad => b'P',
            CigarOp::Equal => b'=',
            CigarOp::Sub => b'X',
        }
    }

    pub fn consumes_target(self) -> bool {
        matches!(
            self,
            CigarOp::Match | CigarOp::Del | CigarOp::Skip | CigarOp::Equal | CigarOp::Sub
        )
    }

    pub fn consumes_query(self) -> bool {
        matches!(
            self,
            CigarOp::Match | CigarOp::Ins | CigarOp::SoftClip | CigarOp::Equal | CigarOp::Sub
        )
    }

    /// The operation as it is written to a compressed CIGAR.
    fn display(self) -> Self {
        match self {
            CigarOp::Match => CigarOp::Equal,
            op => op,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CigarElem {
    pub op: CigarOp,
    pub cnt: u32,
}

/// A run-length encoded alignment. Adjacent elements may share an operation
/// only when the unpacked input mixed `M` and `=`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompressedCigar {
    ops: Vec<CigarElem>,
}

/// Compresses an unpacked operation string.
///
/// Equal neighbouring symbols are counted into a run; a run is flushed when
/// the symbol changes and at the end, mapping `M` to `=` on flush. The input
/// holds exactly one operation per column, so a digit anywhere means the
/// caller handed over something else, and is an error. Empty input gives an
/// empty CIGAR.
pub fn compress(unpacked: &[u8]) -> Result<CompressedCigar> {
    let malformed = || Error::MalformedCigar(String::from_utf8_lossy(unpacked).into_owned());

    let mut ops = Vec::new();
    let Some((&first, rest)) = unpacked.split_first() else {
        return Ok(CompressedCigar { ops });
    };
    let parse = |b: u8| {
        if b.is_ascii_digit() {
            return None;
        }
        CigarOp::from_byte(b)
    };

    let mut cur = parse(first).ok_or_else(malformed)?;
    let mut cnt = 1;
    for &b in rest {
        let op = parse(b).ok_or_else(malformed)?;
        if op == cur {
            cnt += 1;
        } else {
            ops.push(CigarElem {
                op: cur.display(),
                cnt,
            });
            cur = op;
            cnt = 1;
        }
    }
    ops.push(CigarElem {
        op: cur.display(),
        cnt,
    });
    Ok(CompressedCigar { ops })
}

impl CompressedCigar {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn elems(&self) -> &[CigarElem] {
        &self.ops
    }

    /// Expands back to one operation per column.
    pub fn unpack(&self) -> Vec<u8> {
        self.ops
            .iter()
            .flat_map(|e| std::iter::repeat(e.op.to_byte()).take(e.cnt as usize))
            .collect()
    }

    /// Number of target characters covered.
    pub fn ref_len(&self) -> usize {
        self.ops
            .iter()
            .filter(|e| e.op.consumes_target())
            .map(|e| e.cnt as usize)
            .sum()
    }

    /// Number of query characters covered.
    pub fn query_len(&self) -> usize {
        self.ops
            .iter()
            .filter(|e| e.op.consumes_query())
            .map(|e| e.cnt as usize)
            .sum()
    }

    /// Length of the printed CIGAR, without building the string.
    pub fn char_len(&self) -> usize {
        self.ops
            .iter()
            .map(|e| e.cnt.to_string().len() + 1)
            .sum()
    }
}

impl fmt::Display for CompressedCigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.ops
                .iter()
                .map(|e| format!("{}{}", e.cnt, e.op.to_byte() as char))
                .join("")
        )
    }
}

/// Parses a compressed CIGAR such as `4=2I2D`. Operations are kept as
/// written; no `M` mapping is applied.
impl FromStr for CompressedCigar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::MalformedCigar(s.to_string());
        let mut ops = Vec::new();
        let mut cnt: Option<u32> = None;
        for c in s.bytes() {
            if c.is_ascii_digit() {
                let digit = (c - b'0') as u32;
                cnt = Some(
                    cnt.unwrap_or(0)
                        .checked_mul(10)
                        .and_then(|x| x.checked_add(digit))
                        .ok_or_else(malformed)?,
                );
                continue;
            }
            let op = CigarOp::from_byte(c).ok_or_else(malformed)?;
            match cnt.take() {
                Some(cnt) if cnt > 0 => ops.push(CigarElem { op, cnt }),
                _ => return Err(malformed()),
            }
        }
        if cnt.is_some() {
            return Err(malformed());
        }
        Ok(CompressedCigar { ops })
    }
}
