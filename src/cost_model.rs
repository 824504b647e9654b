//! This module contains the two-piece affine `ScoringConfig` shared by all aligners.
use std::cmp::min;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Type for storing costs.
///
/// Signed, so that the wavefront code can use negative sentinels without
/// extra casts.
pub type Cost = i32;

/// Largest accepted penalty. Keeps sums of a cost and a few penalties far
/// from `Cost::MAX` in every aligner.
pub const MAX_PENALTY: Cost = 1 << 16;

/// Penalties for a two-piece affine gap cost model.
///
/// Matches are free. A mismatch costs `mismatch`, and a gap of length `l > 0`
/// costs `min(gap_open1 + l * gap_extend1, gap_open2 + l * gap_extend2)`, so
/// that short indels follow the first piece and long indels the second.
///
/// One instance is built per run and handed unchanged to every aligner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub mismatch: Cost,
    pub gap_open1: Cost,
    pub gap_extend1: Cost,
    pub gap_open2: Cost,
    pub gap_extend2: Cost,
}

/// Penalties typical for long-read alignment.
impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mismatch: 4,
            gap_open1: 6,
            gap_extend1: 2,
            gap_open2: 24,
            gap_extend2: 1,
        }
    }
}

impl ScoringConfig {
    pub fn new(
        mismatch: Cost,
        gap_open1: Cost,
        gap_extend1: Cost,
        gap_open2: Cost,
        gap_extend2: Cost,
    ) -> Result<Self> {
        let cm = Self {
            mismatch,
            gap_open1,
            gap_extend1,
            gap_open2,
            gap_extend2,
        };
        cm.validate()?;
        Ok(cm)
    }

    /// Edit distance: every mismatch and every indel costs 1.
    pub fn unit() -> Self {
        Self {
            mismatch: 1,
            gap_open1: 0,
            gap_extend1: 1,
            gap_open2: 0,
            gap_extend2: 1,
        }
    }

    /// All penalties must be in `0..=MAX_PENALTY`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("mismatch", self.mismatch),
            ("gap_open1", self.gap_open1),
            ("gap_extend1", self.gap_extend1),
            ("gap_open2", self.gap_open2),
            ("gap_extend2", self.gap_extend2),
        ] {
            if value < 0 {
                return Err(Error::Scoring(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
            if value > MAX_PENALTY {
                return Err(Error::Scoring(format!(
                    "{name} must be at most {MAX_PENALTY}, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// The cost of a single gap of length `len`, saturating at `Cost::MAX`.
    pub fn gap_cost(&self, len: Cost) -> Cost {
        if len == 0 {
            return 0;
        }
        let piece = |open: Cost, extend: Cost| open.saturating_add(len.saturating_mul(extend));
        min(
            piece(self.gap_open1, self.gap_extend1),
            piece(self.gap_open2, self.gap_extend2),
        )
    }

    /// The cost of a gap of size 1 in either piece, i.e. the maximal
    /// distance a new front looks back.
    pub(crate) fn max_step(&self) -> Cost {
        self.mismatch
            .max(self.gap_open1 + self.gap_extend1)
            .max(self.gap_open2 + self.gap_extend2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_cost_switches_piece() {
        let cm = ScoringConfig::default();
        assert_eq!(cm.gap_cost(0), 0);
        // 6 + 2 = 8 < 24 + 1
        assert_eq!(cm.gap_cost(1), 8);
        // 6 + 2*18 = 42 == 24 + 18
        assert_eq!(cm.gap_cost(18), 42);
        // 6 + 2*100 = 206 > 24 + 100
        assert_eq!(cm.gap_cost(100), 124);
    }

    #[test]
    fn unit_is_edit_distance() {
        let cm = ScoringConfig::unit();
        assert_eq!(cm.mismatch, 1);
        assert_eq!(cm.gap_cost(5), 5);
    }

    #[test]
    fn negative_penalty_is_rejected() {
        assert!(ScoringConfig::new(4, 6, 2, 24, 1).is_ok());
        assert!(ScoringConfig::new(0, 0, 0, 0, 0).is_ok());
        let err = ScoringConfig::new(4, -1, 2, 24, 1).unwrap_err();
        assert!(matches!(err, Error::Scoring(_)));
        assert!(err.to_string().contains("gap_open1"));
    }

    #[test]
    fn huge_penalty_is_rejected() {
        let max = MAX_PENALTY;
        assert!(ScoringConfig::new(max, max, max, max, max).is_ok());
        for cm in [
            (Cost::MAX, 6, 2, 24, 1),
            (4, Cost::MAX, 2, 24, 1),
            (4, 6, 2, 24, MAX_PENALTY + 1),
        ] {
            let err = ScoringConfig::new(cm.0, cm.1, cm.2, cm.3, cm.4).unwrap_err();
            assert!(matches!(err, Error::Scoring(_)), "{cm:?}");
            assert!(err.to_string().contains("at most"), "{err}");
        }
    }

    #[test]
    fn gap_cost_saturates() {
        let cm = ScoringConfig {
            gap_extend1: MAX_PENALTY,
            gap_extend2: MAX_PENALTY,
            ..ScoringConfig::default()
        };
        assert_eq!(cm.gap_cost(Cost::MAX), Cost::MAX);
    }
}
