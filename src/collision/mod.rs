//! Collision stage.
//!
//! Two interchangeable strategies, fixed per grid at setup and never
//! mixed: single-relaxation-time BGK and multiple-relaxation-time MRT
//! (moment-space relaxation). Both read a pre-collision copy of `f` so
//! that every site and direction sees pre-collision values, and both skip
//! sites owned by a child level.

mod bgk;
mod mrt;

pub use mrt::MrtOperator;

use crate::grid::Grid;
use crate::types::SiteKind;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Collision strategy for one grid.
pub enum CollisionModel {
    /// Single-relaxation-time BGK.
    Bgk,
    /// Multiple-relaxation-time collision with precomputed moment
    /// transforms.
    Mrt(MrtOperator),
}

/// True if collision (and the equilibrium refresh) skips this site:
/// refined-away sites and the fine-side transition band are owned by the
/// child level.
#[inline]
fn skip_collision(kind: SiteKind) -> bool {
    matches!(kind, SiteKind::Refined | SiteKind::TransitionToCoarse)
}

/// Relax all populations toward equilibrium.
///
/// Writes post-collision populations into a scratch buffer seeded with
/// the pre-collision values and swaps it in at the end, so skipped sites
/// keep their populations and no site reads another site's post-collision
/// state.
pub fn collide(grid: &mut Grid) {
    let n = grid.n_sites();
    let mut f_new = grid.f.clone();

    {
        let Grid {
            lattice,
            site,
            f,
            feq,
            force_dir,
            rho,
            u,
            omega,
            collision,
            ..
        } = grid;

        for idx in 0..n {
            if skip_collision(site[idx]) {
                continue;
            }
            let mut u_site = [0.0; 3];
            for d in 0..lattice.dims {
                u_site[d] = u.get(idx, d);
            }
            match collision {
                CollisionModel::Bgk => bgk::relax_site(
                    lattice,
                    *omega,
                    rho.data[idx],
                    &u_site,
                    f.site(idx),
                    feq.site_mut(idx),
                    force_dir.site(idx),
                    f_new.site_mut(idx),
                ),
                CollisionModel::Mrt(op) => op.relax_site(
                    lattice,
                    rho.data[idx],
                    &u_site,
                    f.site(idx),
                    feq.site_mut(idx),
                    force_dir.site(idx),
                    f_new.site_mut(idx),
                ),
            }
        }
    }

    std::mem::swap(&mut grid.f, &mut f_new);
}

/// Parallel variant of [`collide`]: sites are independent, so the
/// per-site kernels run over rayon chunks.
#[cfg(feature = "parallel")]
pub fn collide_parallel(grid: &mut Grid) {
    let q = grid.lattice.q;
    let mut f_new = grid.f.clone();

    {
        let Grid {
            lattice,
            site,
            f,
            feq,
            force_dir,
            rho,
            u,
            omega,
            collision,
            ..
        } = grid;
        let lattice = &**lattice;
        let omega = *omega;
        // Shared immutable reborrows for the worker threads.
        let (site, f, force_dir, rho, u, collision) =
            (&*site, &*f, &*force_dir, &*rho, &*u, &*collision);

        f_new
            .data
            .par_chunks_mut(q)
            .zip(feq.data.par_chunks_mut(q))
            .enumerate()
            .for_each(|(idx, (f_new_site, feq_site))| {
                if skip_collision(site[idx]) {
                    return;
                }
                let mut u_site = [0.0; 3];
                for d in 0..lattice.dims {
                    u_site[d] = u.get(idx, d);
                }
                match collision {
                    CollisionModel::Bgk => bgk::relax_site(
                        lattice,
                        omega,
                        rho.data[idx],
                        &u_site,
                        f.site(idx),
                        feq_site,
                        force_dir.site(idx),
                        f_new_site,
                    ),
                    CollisionModel::Mrt(op) => op.relax_site(
                        lattice,
                        rho.data[idx],
                        &u_site,
                        f.site(idx),
                        feq_site,
                        force_dir.site(idx),
                        f_new_site,
                    ),
                }
            });
    }

    std::mem::swap(&mut grid.f, &mut f_new);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::D2Q9;

    fn uniform_grid() -> Grid {
        Grid::new(0, 0, 4, 4, 1, &D2Q9, 1.0, CollisionModel::Bgk)
    }

    #[test]
    fn test_collision_fixed_point_at_equilibrium() {
        // A grid already at equilibrium is unchanged by collision.
        let mut grid = uniform_grid();
        let before = grid.f.data.clone();
        collide(&mut grid);
        for (a, b) in grid.f.data.iter().zip(before.iter()) {
            assert!((a - b).abs() < 1e-14);
        }
    }

    #[test]
    fn test_collision_conserves_mass() {
        let mut grid = uniform_grid();
        // Perturb one site away from equilibrium, keeping its mass.
        let idx = grid.idx(1, 2, 0);
        let site = grid.f.site_mut(idx);
        site[1] += 0.01;
        site[2] -= 0.01;
        // Macroscopic fields must match the perturbed populations.
        crate::macroscopic::update_macroscopic(&mut grid, &crate::config::SolverConfig::default());
        grid.t = 0;

        let mass_before = grid.mass();
        collide(&mut grid);
        assert!((grid.mass() - mass_before).abs() < 1e-12);
    }

    #[test]
    fn test_refined_sites_untouched() {
        let mut grid = uniform_grid();
        let idx = grid.idx(2, 2, 0);
        grid.site[idx] = SiteKind::Refined;
        grid.f.site_mut(idx).fill(0.25);

        collide(&mut grid);
        for v in 0..grid.lattice.q {
            assert!((grid.f.get(idx, v) - 0.25).abs() < 1e-14);
        }
    }
}
