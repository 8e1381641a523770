//! Site classification and small shared types.
//!
//! Every stage of the kernel branches on the per-site classification, so
//! it is a closed enum matched exhaustively rather than raw integer
//! codes. Illegal states are unrepresentable and the compiler checks
//! each stage handles every kind.

/// Per-lattice-site category.
///
/// Immutable during time stepping; only a refinement-topology change
/// (outside this core) may rewrite it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SiteKind {
    /// Solid obstacle or wall site. No-slip by convention: macroscopic
    /// recovery forces density 1 and zero velocity.
    Solid,
    /// Ordinary fluid site.
    Fluid,
    /// Refined-away site: fully covered by a child grid. Never written by
    /// collision or streaming on its own level.
    Refined,
    /// Fine-side transition site: the interface band on a *fine* grid that
    /// receives exploded coarse populations.
    TransitionToCoarse,
    /// Coarse-side transition site: the interface band on a *coarse* grid
    /// overlapping the edge of a child region. Source of explode, target
    /// of coalesce.
    TransitionToFine,
    /// Solid site inside a refined region. Treated as solid by macroscopic
    /// recovery and participates in coalesce.
    RefinedSolid,
    /// Inlet site under regularised treatment.
    Inlet,
    /// Do-nothing inlet: streaming neither propagates from nor overwrites
    /// this site.
    InletDoNothing,
    /// Receive-halo site populated by a neighbouring process in a
    /// distributed build.
    PeriodicRecv,
}

impl SiteKind {
    /// True for either solid variant.
    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(self, SiteKind::Solid | SiteKind::RefinedSolid)
    }

    /// True if collision and streaming are handled entirely on the child
    /// level for this site.
    #[inline]
    pub fn is_refined_away(self) -> bool {
        matches!(self, SiteKind::Refined)
    }
}

/// Number of independent second-moment velocity products for `dims`
/// dimensions: the upper-triangular set including the diagonal.
///
/// 3 terms in 2D (uu, uv, vv), 6 in 3D.
#[inline]
pub const fn second_moment_terms(dims: usize) -> usize {
    dims + dims * (dims - 1) / 2
}
