//! Guo forcing stage.
//!
//! Converts the Cartesian body-force field (externally supplied IBM
//! forces plus configured gravity) into per-direction contributions that
//! collision adds to the populations:
//!
//! ```text
//! beta_v   = (1/cs²) (c_v · u)
//! lambda_v = (1 − ω/2) w_v / cs²
//! F_v      = lambda_v Σ_d F_d (c_dv (1 + beta_v) − u_d)
//! ```
//!
//! The per-direction field is fully recomputed from the current velocity
//! every sub-step, never cached. Gravity enters the computation as
//! `ρ·g` along the configured axis but is never written back into the
//! stored Cartesian field, which holds exactly what the body collaborator
//! deposited.

use crate::config::SolverConfig;
use crate::grid::{Grid, VectorField};

/// Effective Cartesian force component `d` at a site: the stored
/// (IBM-deposited) force plus the gravitational contribution.
#[inline]
pub(crate) fn effective_force(
    config: &SolverConfig,
    force_cart: &VectorField,
    rho: f64,
    idx: usize,
    d: usize,
) -> f64 {
    let mut force = force_cart.get(idx, d);
    if let Some(gravity) = config.gravity
        && gravity.axis == d
    {
        force += rho * gravity.magnitude;
    }
    force
}

/// Populate per-direction forces from the Cartesian force field, or reset
/// both force fields when `reset_only` is set.
///
/// The reset form runs at the top of every coarsest-level step (and again
/// before the IBM force-application point) to avoid accumulating stale
/// immersed-boundary forces.
pub fn compute_forces(grid: &mut Grid, config: &SolverConfig, reset_only: bool) {
    if reset_only {
        grid.force_dir.clear();
        grid.force_cart.clear();
        return;
    }

    let n = grid.n_sites();
    let Grid {
        lattice,
        site,
        force_dir,
        force_cart,
        rho,
        u,
        omega,
        ..
    } = grid;
    let dims = lattice.dims;
    let cs_sq = lattice.cs_sq();

    // Overwrite, never accumulate: stale directions from the previous
    // sub-step carry an extra lambda factor.
    force_dir.clear();

    for idx in 0..n {
        if site[idx].is_solid() {
            continue;
        }
        let rho_site = rho.data[idx];

        for v in 0..lattice.q {
            let lambda = (1.0 - 0.5 * *omega) * lattice.w(v) / cs_sq;

            let mut beta = 0.0;
            for d in 0..dims {
                beta += lattice.c(d, v) * u.get(idx, d);
            }
            beta /= cs_sq;

            let mut f_v = 0.0;
            for d in 0..dims {
                let f_d = effective_force(config, force_cart, rho_site, idx, d);
                f_v += f_d * (lattice.c(d, v) * (1.0 + beta) - u.get(idx, d));
            }
            force_dir.set(idx, v, lambda * f_v);
        }
    }
}
