//! This module contains the aligners that are benchmarked against each other.
//!
//! The set of back ends is closed: `AlignerType` names them and builds a
//! `Backend`, which dispatches to the concrete aligner.

use serde::Serialize;

use crate::{
    cost_model::{Cost, ScoringConfig},
    error::Result,
    Seq,
};

pub mod banded;
pub mod miniwfa;
pub mod wavefront;
pub mod wfa2;


use banded::BandedDp;
use miniwfa::MiniWfa;
use wfa2::{Wfa2Native, Wfa2Object};

/// The result of aligning one pair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlignmentOutcome {
    /// One operation per aligned column, from `M`, `X`, `I` and `D`.
    /// `I` consumes the query only, `D` the target only.
    pub ops: Vec<u8>,
    /// The penalty of the alignment, if the aligner reports it.
    pub score: Option<Cost>,
}

/// An aligner computes an end-to-end alignment of `target` and `query`.
///
/// The scoring is passed on every call and is the same for every call of a run.
pub trait Aligner {
    /// The name used in logs and results.
    fn name(&self) -> &'static str;

    fn align_global(
        &mut self,
        target: Seq,
        query: Seq,
        cm: &ScoringConfig,
    ) -> Result<AlignmentOutcome>;
}

/// Options for building back ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackendParams {
    /// Use the wf-adaptive heuristic for WFA2-native.
    pub adaptive: bool,
    /// Band width for Banded-DP.
    pub bandwidth: usize,
}

impl Default for BackendParams {
    fn default() -> Self {
        Self {
            adaptive: false,
            bandwidth: banded::DEFAULT_BANDWIDTH,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AlignerType {
    MiniWfa,
    Wfa2Native,
    Wfa2Object,
    BandedDp,
}

impl AlignerType {
    /// All back ends, in the order they are benchmarked.
    pub const ALL: [AlignerType; 4] = [
        AlignerType::MiniWfa,
        AlignerType::Wfa2Native,
        AlignerType::Wfa2Object,
        AlignerType::BandedDp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AlignerType::MiniWfa => miniwfa::NAME,
            AlignerType::Wfa2Native => wfa2::NATIVE_NAME,
            AlignerType::Wfa2Object => wfa2::OBJECT_NAME,
            AlignerType::BandedDp => banded::NAME,
        }
    }

    /// Whether the alignment is guaranteed optimal under `params`.
    pub fn is_exact(&self, params: &BackendParams) -> bool {
        match self {
            AlignerType::Wfa2Native => !params.adaptive,
            AlignerType::BandedDp => false,
            _ => true,
        }
    }

    pub fn build(&self, params: &BackendParams) -> Backend {
        match self {
            AlignerType::MiniWfa => Backend::MiniWfa(MiniWfa),
            AlignerType::Wfa2Native => Backend::Wfa2Native(Wfa2Native::new(params.adaptive)),
            AlignerType::Wfa2Object => Backend::Wfa2Object(Wfa2Object::new()),
            AlignerType::BandedDp => Backend::BandedDp(BandedDp {
                bandwidth: params.bandwidth,
            }),
        }
    }
}

/// A constructed back end.
pub enum Backend {
    MiniWfa(MiniWfa),
    Wfa2Native(Wfa2Native),
    Wfa2Object(Wfa2Object),
    BandedDp(BandedDp),
}

impl Aligner for Backend {
    fn name(&self) -> &'static str {
        match self {
            Backend::MiniWfa(a) => a.name(),
            Backend::Wfa2Native(a) => a.name(),
            Backend::Wfa2Object(a) => a.name(),
            Backend::BandedDp(a) => a.name(),
        }
    }

    fn align_global(
        &mut self,
        target: Seq,
        query: Seq,
        cm: &ScoringConfig,
    ) -> Result<AlignmentOutcome> {
        match self {
            Backend::MiniWfa(a) => a.align_global(target, query, cm),
            Backend::Wfa2Native(a) => a.align_global(target, query, cm),
            Backend::Wfa2Object(a) => a.align_global(target, query, cm),
            Backend::BandedDp(a) => a.align_global(target, query, cm),
        }
    }
}
