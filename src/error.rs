//! Error types for the solver core.
//!
//! The core has no recoverable-error taxonomy: it is a deterministic
//! stencil integrator over statically-sized fields. Every variant here is
//! either a structural configuration fault (malformed grid hierarchy) or
//! numerical divergence, and all of them are terminal for the run.

use thiserror::Error;

/// Fatal conditions surfaced by the solver core.
#[derive(Debug, Error)]
pub enum LbmError {
    /// A refinement region index does not map to an owned child grid.
    #[error("no child grid registered for level {level} region {region}")]
    MissingChildGrid { level: usize, region: usize },

    /// The coarse window of a child grid does not satisfy the exact 2:1
    /// index mapping required by explode/coalesce.
    #[error(
        "coarse window of level {level} region {region} does not align with \
         the 2:1 refinement ratio"
    )]
    MisalignedWindow { level: usize, region: usize },

    /// Non-finite density detected by the periodic finiteness check.
    #[error("simulation diverged on level {level} at step {step}")]
    Diverged { level: usize, step: u64 },

    /// Immersed-boundary coupling was requested on a refined level.
    ///
    /// The predictor-corrector cycle is only defined on the coarsest grid;
    /// this is an enforced precondition rather than a silent guard.
    #[error("immersed-boundary coupling is restricted to level 0, got level {level}")]
    IbmOnRefinedLevel { level: usize },
}
