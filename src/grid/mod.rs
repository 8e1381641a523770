//! Grid hierarchy and per-grid state.
//!
//! A [`Grid`] is one refinement level over one sub-region: the population
//! field, its macroscopic companions, the site classification and the
//! relaxation parameters. Children are *owned* (an explicit tree rather
//! than a process-wide registry), and each child records the coarse
//! index-space window it overlaps.

mod field;

pub use field::{PopulationField, ScalarField, VectorField};

use crate::collision::CollisionModel;
use crate::error::LbmError;
use crate::lattice::{VelocitySet, equilibrium};
use crate::types::{SiteKind, second_moment_terms};

/// Halo-layer masks for a distributed build.
///
/// Explicit per-site masks filled in by the (out-of-scope) decomposition
/// layer at setup; streaming consults them, it never derives layer
/// membership from positions.
#[derive(Clone, Debug)]
pub struct HaloLayout {
    /// Site is in a receive-halo layer.
    pub recv: Vec<bool>,
    /// Site is in a send layer.
    pub send: Vec<bool>,
    /// Site's halo layer wraps a periodic neighbour rank.
    pub periodic: Vec<bool>,
}

impl HaloLayout {
    /// Allocate all-false masks for `n_sites` sites.
    pub fn new(n_sites: usize) -> Self {
        Self {
            recv: vec![false; n_sites],
            send: vec![false; n_sites],
            periodic: vec![false; n_sites],
        }
    }
}

/// One grid of the refinement hierarchy.
pub struct Grid {
    /// Refinement level (0 = coarsest).
    pub level: usize,
    /// Region id within the parent level.
    pub region: usize,
    /// Site counts per axis (`nz = 1` in 2D).
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    /// Shared, read-only discrete velocity set.
    pub lattice: &'static VelocitySet,
    /// Per-site classification.
    pub site: Vec<SiteKind>,
    /// Population field; the authoritative evolving state.
    pub f: PopulationField,
    /// Equilibrium scratch, recomputed each collision.
    pub feq: PopulationField,
    /// Per-direction Guo force contributions.
    pub force_dir: PopulationField,
    /// Density per site.
    pub rho: ScalarField,
    /// Velocity per site.
    pub u: VectorField,
    /// Cartesian body-force field (IBM deposits here).
    pub force_cart: VectorField,
    /// Running mean density.
    pub rho_avg: ScalarField,
    /// Running mean velocity components.
    pub u_avg: VectorField,
    /// Running mean velocity second moments (upper-triangular products).
    pub uu_avg: VectorField,
    /// Single relaxation rate (BGK; also feeds the MRT shear moments).
    pub omega: f64,
    /// Collision strategy, fixed at setup.
    pub collision: CollisionModel,
    /// Completed sub-steps at this level's cadence.
    pub t: u64,
    /// Coarse index window this grid overlaps on its parent, inclusive,
    /// `[[x0, x1], [y0, y1], [z0, z1]]`. Meaningful for level > 0.
    pub coarse_lims: [[usize; 2]; 3],
    /// Owned finer child grids, one per refined sub-region.
    pub children: Vec<Grid>,
    /// Halo masks for distributed builds.
    pub halo: Option<HaloLayout>,
}

impl Grid {
    /// Allocate a grid with all sites fluid, unit density and zero
    /// velocity, populations at equilibrium.
    pub fn new(
        level: usize,
        region: usize,
        nx: usize,
        ny: usize,
        nz: usize,
        lattice: &'static VelocitySet,
        omega: f64,
        collision: CollisionModel,
    ) -> Self {
        let n = nx * ny * nz;
        let q = lattice.q;
        let dims = lattice.dims;
        let mut grid = Self {
            level,
            region,
            nx,
            ny,
            nz,
            lattice,
            site: vec![SiteKind::Fluid; n],
            f: PopulationField::zeros(n, q),
            feq: PopulationField::zeros(n, q),
            force_dir: PopulationField::zeros(n, q),
            rho: ScalarField::zeros(n),
            u: VectorField::zeros(n, dims),
            force_cart: VectorField::zeros(n, dims),
            rho_avg: ScalarField::zeros(n),
            u_avg: VectorField::zeros(n, dims),
            uu_avg: VectorField::zeros(n, second_moment_terms(dims)),
            omega,
            collision,
            t: 0,
            coarse_lims: [[0, 0]; 3],
            children: Vec::new(),
            halo: None,
        };
        grid.initialise_uniform(1.0, [0.0; 3]);
        grid
    }

    /// Number of lattice sites.
    #[inline]
    pub fn n_sites(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Spatial dimensionality of the lattice.
    #[inline]
    pub fn dims(&self) -> usize {
        self.lattice.dims
    }

    /// Linear site index for `(i, j, k)`.
    #[inline]
    pub fn idx(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.ny + j) * self.nz + k
    }

    /// Effective time step of this level relative to the coarsest,
    /// `2^(−level)`.
    #[inline]
    pub fn dt(&self) -> f64 {
        0.5_f64.powi(self.level as i32)
    }

    /// Reset density, velocity and populations to a uniform equilibrium
    /// state. Time averages and the step counter are untouched.
    pub fn initialise_uniform(&mut self, rho0: f64, u0: [f64; 3]) {
        self.rho.fill(rho0);
        for idx in 0..self.n_sites() {
            for d in 0..self.dims() {
                self.u.set(idx, d, u0[d]);
            }
            for v in 0..self.lattice.q {
                let feq = equilibrium(self.lattice, rho0, &u0, v);
                self.f.set(idx, v, feq);
                self.feq.set(idx, v, feq);
            }
        }
    }

    /// Attach a child grid covering the given inclusive coarse window.
    ///
    /// The child's region id is its index in the children vector.
    pub fn attach_child(&mut self, mut child: Grid, coarse_lims: [[usize; 2]; 3]) {
        child.region = self.children.len();
        child.coarse_lims = coarse_lims;
        self.children.push(child);
    }

    /// Borrow the child grid for `region`, failing with the hierarchy
    /// configuration fault.
    pub fn child_mut(&mut self, region: usize) -> Result<&mut Grid, LbmError> {
        let level = self.level;
        self.children
            .get_mut(region)
            .ok_or(LbmError::MissingChildGrid { level, region })
    }

    /// Total mass: sum of all populations over the grid.
    pub fn mass(&self) -> f64 {
        self.f.total()
    }

    /// Surface divergence as an error if any density is non-finite.
    pub fn check_finite(&self) -> Result<(), LbmError> {
        if self.rho.data.iter().all(|r| r.is_finite()) {
            Ok(())
        } else {
            Err(LbmError::Diverged {
                level: self.level,
                step: self.t,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionModel;
    use crate::lattice::D2Q9;

    fn test_grid() -> Grid {
        Grid::new(0, 0, 4, 3, 1, &D2Q9, 1.0, CollisionModel::Bgk)
    }

    #[test]
    fn test_indexing() {
        let grid = test_grid();
        assert_eq!(grid.n_sites(), 12);
        assert_eq!(grid.idx(0, 0, 0), 0);
        assert_eq!(grid.idx(1, 0, 0), 3);
        assert_eq!(grid.idx(3, 2, 0), 11);
    }

    #[test]
    fn test_uniform_init_mass() {
        let grid = test_grid();
        // Unit density on every site: total mass is the site count.
        assert!((grid.mass() - 12.0).abs() < 1e-12);
        // Density sums hold per site.
        for idx in 0..grid.n_sites() {
            assert!((grid.f.site_sum(idx) - 1.0).abs() < 1e-14);
        }
    }

    #[test]
    fn test_attach_and_lookup_child() {
        let mut grid = test_grid();
        let child = Grid::new(1, 0, 4, 4, 1, &D2Q9, 1.2, CollisionModel::Bgk);
        grid.attach_child(child, [[1, 2], [0, 1], [0, 0]]);

        assert!(grid.child_mut(0).is_ok());
        assert!(matches!(
            grid.child_mut(1),
            Err(LbmError::MissingChildGrid { level: 0, region: 1 })
        ));
    }

    #[test]
    fn test_check_finite() {
        let mut grid = test_grid();
        assert!(grid.check_finite().is_ok());
        grid.rho.data[5] = f64::NAN;
        assert!(matches!(
            grid.check_finite(),
            Err(LbmError::Diverged { level: 0, .. })
        ));
    }

    #[test]
    fn test_dt_scaling() {
        let grid = test_grid();
        assert!((grid.dt() - 1.0).abs() < 1e-14);
        let fine = Grid::new(2, 0, 4, 4, 1, &D2Q9, 1.0, CollisionModel::Bgk);
        assert!((fine.dt() - 0.25).abs() < 1e-14);
    }
}
