//! Minimal wavefront aligner: a single function call per pair, no options.
use super::{
    wavefront::{Heuristic, WavefrontAligner},
    AlignmentOutcome, Aligner,
};
use crate::{
    cost_model::{Cost, ScoringConfig},
    error::Result,
    Seq,
};

pub const NAME: &str = "MiniWFA";

/// Aligns `target` and `query` end to end and returns the score with the
/// unpacked operations. All memory is dropped before returning.
pub fn mwf_align(target: Seq, query: Seq, cm: &ScoringConfig) -> Result<(Cost, Vec<u8>)> {
    let mut wf = WavefrontAligner::new(NAME, cm, Heuristic::None)?;
    wf.align(target, query)?;
    let score = wf.score().unwrap_or_default();
    Ok((score, wf.into_ops()))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MiniWfa;

impl Aligner for MiniWfa {
    fn name(&self) -> &'static str {
        NAME
    }

    fn align_global(
        &mut self,
        target: Seq,
        query: Seq,
        cm: &ScoringConfig,
    ) -> Result<AlignmentOutcome> {
        let (score, ops) = mwf_align(target, query, cm)?;
        Ok(AlignmentOutcome {
            ops,
            score: Some(score),
        })
    }
}
