//! Two front ends to the wavefront engine with a WFA2-lib shaped interface.
//!
//! `Wfa2Native` fills in an attribute struct and calls one end-to-end
//! function. `Wfa2Object` builds an aligner object for each pair, aligns with
//! it and reads the score and CIGAR back from the object.
use log::trace;

use super::{
    wavefront::{Heuristic, WavefrontAligner, WfAdaptive},
    AlignmentOutcome, Aligner,
};
use crate::{cost_model::ScoringConfig, error::Result, Seq};

pub const NATIVE_NAME: &str = "WFA2-native";
pub const OBJECT_NAME: &str = "WFA2-object";

/// Configuration of a wavefront aligner, filled before each alignment.
///
/// All fronts are kept for the traceback, as in WFA2's high memory mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    pub heuristic: Heuristic,
}

impl Attributes {
    pub fn with_adaptive(adaptive: bool) -> Self {
        Attributes {
            heuristic: if adaptive {
                Heuristic::WfAdaptive(WfAdaptive::default())
            } else {
                Heuristic::None
            },
        }
    }
}

/// End-to-end alignment under `attributes`.
pub fn align_end2end(
    attributes: &Attributes,
    target: Seq,
    query: Seq,
    cm: &ScoringConfig,
) -> Result<AlignmentOutcome> {
    let mut wf = WavefrontAligner::new(NATIVE_NAME, cm, attributes.heuristic)?;
    wf.align(target, query)?;
    let score = wf.score();
    Ok(AlignmentOutcome {
        ops: wf.into_ops(),
        score,
    })
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Wfa2Native {
    pub attributes: Attributes,
}

impl Wfa2Native {
    pub fn new(adaptive: bool) -> Self {
        Wfa2Native {
            attributes: Attributes::with_adaptive(adaptive),
        }
    }
}

impl Aligner for Wfa2Native {
    fn name(&self) -> &'static str {
        NATIVE_NAME
    }

    fn align_global(
        &mut self,
        target: Seq,
        query: Seq,
        cm: &ScoringConfig,
    ) -> Result<AlignmentOutcome> {
        align_end2end(&self.attributes, target, query, cm)
    }
}

/// Builds a fresh aligner object for every pair and drops it before
/// returning, so nothing is held between calls.
#[derive(Clone, Copy, Debug, Default)]
pub struct Wfa2Object {
    attributes: Attributes,
}

impl Wfa2Object {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Aligner for Wfa2Object {
    fn name(&self) -> &'static str {
        OBJECT_NAME
    }

    fn align_global(
        &mut self,
        target: Seq,
        query: Seq,
        cm: &ScoringConfig,
    ) -> Result<AlignmentOutcome> {
        let mut wf = WavefrontAligner::new(OBJECT_NAME, cm, self.attributes.heuristic)?;
        wf.align(target, query)?;
        trace!("{OBJECT_NAME}: {} fronts", wf.num_fronts());
        let score = wf.score();
        Ok(AlignmentOutcome {
            ops: wf.into_ops(),
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes() {
        assert_eq!(Attributes::with_adaptive(false), Attributes::default());
        assert_eq!(
            Wfa2Native::new(true).attributes.heuristic,
            Heuristic::WfAdaptive(WfAdaptive::default())
        );
        assert_eq!(Wfa2Object::new().attributes, Attributes::default());
    }

    /// Only types without owned heap memory can be `Copy`.
    fn holds_no_heap_memory<T: Copy>(_: &T) {}

    #[test]
    fn object_holds_nothing_between_pairs() {
        let cm = ScoringConfig::default();
        let mut object = Wfa2Object::new();
        let outcome = object.align_global(b"ACGTACGT", b"ACGAACGT", &cm).unwrap();
        assert_eq!(outcome.score, Some(4));
        holds_no_heap_memory(&object);
        assert_eq!(
            std::mem::size_of::<Wfa2Object>(),
            std::mem::size_of::<Attributes>()
        );
    }
}
