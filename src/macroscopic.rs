//! Macroscopic recovery and running time averages.
//!
//! Density is the zeroth moment of the populations, momentum the first,
//! with a half-step force correction scaled by the level's effective time
//! step. Refined-away sites have no physical meaning on their own level
//! and read zero; solid sites read unit density and zero velocity by
//! convention.
//!
//! Every full-grid update also advances the running time averages with
//! the incremental-mean recurrence `avg' = (avg·t + new)/(t + 1)`, where
//! `t` is the completed step count before this step's increment.

use crate::config::SolverConfig;
use crate::forcing::effective_force;
use crate::grid::{Grid, PopulationField, ScalarField, VectorField};
use crate::lattice::VelocitySet;
use crate::types::SiteKind;

/// Recover density and velocity for a single site.
#[allow(clippy::too_many_arguments)]
fn recover_site(
    lattice: &VelocitySet,
    config: &SolverConfig,
    kind: SiteKind,
    dt: f64,
    f: &PopulationField,
    force_cart: &VectorField,
    rho: &mut ScalarField,
    u: &mut VectorField,
    idx: usize,
) {
    let dims = lattice.dims;
    match kind {
        SiteKind::Refined => {
            // Handled purely on the child level this sub-step.
            rho.data[idx] = 0.0;
            for d in 0..dims {
                u.set(idx, d, 0.0);
            }
        }
        kind if kind.is_solid() => {
            // No-slip by convention rather than by streaming.
            rho.data[idx] = 1.0;
            for d in 0..dims {
                u.set(idx, d, 0.0);
            }
        }
        _ => {
            let mut rho_site = 0.0;
            let mut momentum = [0.0_f64; 3];
            for v in 0..lattice.q {
                let f_v = f.get(idx, v);
                rho_site += f_v;
                for d in 0..dims {
                    momentum[d] += lattice.c(d, v) * f_v;
                }
            }
            rho.data[idx] = rho_site;

            // Half-step force correction (Guo), scaled by the level's
            // effective time step.
            for d in 0..dims {
                let f_d = effective_force(config, force_cart, rho_site, idx, d);
                momentum[d] += rho_site * dt * 0.5 * f_d;
                u.set(idx, d, momentum[d] / rho_site);
            }
        }
    }
}

/// Recover density and velocity on every site and update the running
/// time averages.
///
/// The averaging denominator uses the step counter *before* the
/// orchestrator increments it for this sub-step.
pub fn update_macroscopic(grid: &mut Grid, config: &SolverConfig) {
    let n = grid.n_sites();
    let dt = grid.dt();
    let t = grid.t as f64;

    let Grid {
        lattice,
        site,
        f,
        force_cart,
        rho,
        u,
        rho_avg,
        u_avg,
        uu_avg,
        ..
    } = grid;
    let dims = lattice.dims;

    for idx in 0..n {
        recover_site(lattice, config, site[idx], dt, f, force_cart, rho, u, idx);

        // Incremental means: multiply back to a sum, add, re-divide.
        rho_avg.data[idx] = (rho_avg.data[idx] * t + rho.data[idx]) / (t + 1.0);

        let mut term = 0;
        for p in 0..dims {
            let u_p = u.get(idx, p);
            u_avg.set(idx, p, (u_avg.get(idx, p) * t + u_p) / (t + 1.0));
            for q in p..dims {
                let prod = u_p * u.get(idx, q);
                uu_avg.set(idx, term, (uu_avg.get(idx, term) * t + prod) / (t + 1.0));
                term += 1;
            }
        }
    }
}

/// Recover density and velocity for one site only, without touching the
/// time averages.
///
/// Used to refresh a boundary-adjacent site after cross-process halo data
/// arrives, ready for the next collision.
pub fn refresh_site(grid: &mut Grid, config: &SolverConfig, i: usize, j: usize, k: usize) {
    let idx = grid.idx(i, j, k);
    let dt = grid.dt();
    let Grid {
        lattice,
        site,
        f,
        force_cart,
        rho,
        u,
        ..
    } = grid;
    recover_site(lattice, config, site[idx], dt, f, force_cart, rho, u, idx);
}
