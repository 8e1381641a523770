//! Discrete velocity sets.
//!
//! A [`VelocitySet`] bundles the direction vectors, quadrature weights,
//! lattice sound speed and opposite-direction map for one lattice
//! stencil. Two sets are provided, one per dimensionality: D2Q9 and
//! D3Q19. Both are shared, read-only statics; grids hold a reference.

mod d2q9;
mod d3q19;

pub use d2q9::D2Q9;
pub use d3q19::D3Q19;

/// A discrete velocity set (lattice stencil).
///
/// Direction vectors are stored column-per-direction as `c[v] = [cx, cy,
/// cz]` with the z component zero in 2D.
#[derive(Debug)]
pub struct VelocitySet {
    /// Spatial dimensionality (2 or 3).
    pub dims: usize,
    /// Number of discrete directions.
    pub q: usize,
    /// Direction vectors.
    c: &'static [[i32; 3]],
    /// Direction weights (sum to 1).
    w: &'static [f64],
    /// Opposite-direction map: `c[opposite(v)] = -c[v]`.
    opp: &'static [usize],
}

impl VelocitySet {
    /// Lattice sound speed `cs = 1/sqrt(3)`.
    #[inline]
    pub fn cs(&self) -> f64 {
        self.cs_sq().sqrt()
    }

    /// Squared lattice sound speed `cs² = 1/3`.
    #[inline]
    pub fn cs_sq(&self) -> f64 {
        1.0 / 3.0
    }

    /// Component `d` of direction vector `v`.
    #[inline]
    pub fn c(&self, d: usize, v: usize) -> f64 {
        self.c[v][d] as f64
    }

    /// Integer component `d` of direction vector `v` (for index offsets).
    #[inline]
    pub fn c_i(&self, d: usize, v: usize) -> i64 {
        self.c[v][d] as i64
    }

    /// Weight of direction `v`.
    #[inline]
    pub fn w(&self, v: usize) -> f64 {
        self.w[v]
    }

    /// Index of the direction opposite to `v`.
    #[inline]
    pub fn opposite(&self, v: usize) -> usize {
        self.opp[v]
    }

    /// Dot product of direction `v` with a velocity vector.
    #[inline]
    pub fn c_dot(&self, v: usize, u: &[f64; 3]) -> f64 {
        let mut dot = 0.0;
        for d in 0..self.dims {
            dot += self.c(d, v) * u[d];
        }
        dot
    }
}

/// Maxwell-Boltzmann equilibrium distribution, truncated to second order.
///
/// `feq = rho * w_v * (1 + A/cs² + B/(2 cs⁴))` with
/// `A = c_v · u` and `B = Σ_d (c_d² − cs²) u_d² + 2 Σ_{d<d'} c_d c_d' u_d u_d'`
/// (the quadratic form `Q_ab u_a u_b` with `Q_ab = c_a c_b − cs² δ_ab`).
#[inline]
pub fn equilibrium(lattice: &VelocitySet, rho: f64, u: &[f64; 3], v: usize) -> f64 {
    let cs_sq = lattice.cs_sq();

    let mut a = 0.0;
    let mut b = 0.0;
    for d in 0..lattice.dims {
        let c_d = lattice.c(d, v);
        a += c_d * u[d];
        b += (c_d * c_d - cs_sq) * u[d] * u[d];
        for e in (d + 1)..lattice.dims {
            b += 2.0 * c_d * lattice.c(e, v) * u[d] * u[e];
        }
    }

    rho * lattice.w(v) * (1.0 + a / cs_sq + b / (2.0 * cs_sq * cs_sq))
}
