//! External collaborator contracts.
//!
//! The core drives these through narrow call interfaces and never looks
//! inside: the immersed-boundary collaborator owns marker geometry and
//! the force-spreading mathematics, the transport collaborator owns the
//! halo pack/exchange/unpack mechanics.

use crate::grid::Grid;

/// Immersed-boundary force coupling.
///
/// Called exactly once per coarsest-level predictor-corrector cycle. The
/// core only reads back the mutated Cartesian force field.
pub trait BodyCoupling {
    /// Compute restorative forces from the grid's predicted velocity
    /// field and add them into `grid.force_cart`.
    fn apply_forcing(&mut self, grid: &mut Grid);

    /// Advance body marker positions after a completed
    /// predictor-corrector pair.
    fn move_bodies(&mut self, grid: &mut Grid);
}

/// Distributed halo-exchange transport.
///
/// A blocking call; on return the halo layers of the named grid are
/// consistent with its neighbouring processes.
pub trait Transport {
    /// Exchange boundary-layer data for the grid at `(level, region)`.
    fn exchange_halos(&mut self, level: usize, region: usize);
}
