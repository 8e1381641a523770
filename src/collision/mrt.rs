//! Multiple-relaxation-time (MRT) collision kernel.
//!
//! Populations and equilibria are mapped to moment space with a fixed,
//! lattice-specific transform `M`, each moment is relaxed independently
//! with its own rate, and the result is mapped back with `M⁻¹`:
//!
//! ```text
//! m = M f,  meq = M feq
//! m'_q = m_q − s_q (m_q − meq_q)
//! f' = M⁻¹ m' + F
//! ```
//!
//! The moment bases are the standard Gram-Schmidt sets: Lallemand-Luo for
//! D2Q9 and d'Humières for D3Q19, generated here by evaluating the row
//! polynomials at each direction so the matrix follows whatever direction
//! ordering the [`VelocitySet`] uses. The inverse is computed once at
//! construction by LU solve; `M⁻¹ M = I` holds to machine precision.

use faer::{Mat, linalg::solvers::Solve};

use crate::lattice::{VelocitySet, equilibrium};

/// Precomputed moment transform, inverse and relaxation-rate vector.
pub struct MrtOperator {
    m: Mat<f64>,
    m_inv: Mat<f64>,
    s: Vec<f64>,
}

impl MrtOperator {
    /// Build the operator for a velocity set.
    ///
    /// `omega` feeds the shear-viscosity moments; the remaining rates use
    /// the customary tuned constants.
    ///
    /// # Panics
    ///
    /// Panics if the set is neither D2Q9 nor D3Q19.
    pub fn new(lattice: &VelocitySet, omega: f64) -> Self {
        let (m, s) = match (lattice.dims, lattice.q) {
            (2, 9) => (moment_matrix_d2q9(lattice), rates_d2q9(omega)),
            (3, 19) => (moment_matrix_d3q19(lattice), rates_d3q19(omega)),
            (dims, q) => panic!("no MRT basis for a {dims}D {q}-velocity set"),
        };
        let m_inv = invert(&m);
        Self { m, m_inv, s }
    }

    /// Forward transform matrix `M`.
    pub fn forward(&self) -> &Mat<f64> {
        &self.m
    }

    /// Inverse transform matrix `M⁻¹`.
    pub fn inverse(&self) -> &Mat<f64> {
        &self.m_inv
    }

    /// Per-moment relaxation rates.
    pub fn rates(&self) -> &[f64] {
        &self.s
    }

    /// Relax one site in moment space.
    ///
    /// Refreshes the equilibrium scratch for the site as a side effect;
    /// the Guo force contribution is added after the back-transform,
    /// mirroring its position in the BGK update.
    pub(crate) fn relax_site(
        &self,
        lattice: &VelocitySet,
        rho: f64,
        u: &[f64; 3],
        f: &[f64],
        feq: &mut [f64],
        force: &[f64],
        f_new: &mut [f64],
    ) {
        let q = lattice.q;
        debug_assert_eq!(q, self.s.len());

        for v in 0..q {
            feq[v] = equilibrium(lattice, rho, u, v);
        }

        // Forward transform of populations and equilibria, then relax
        // each moment independently.
        let mut m_relaxed = [0.0_f64; 27];
        for p in 0..q {
            let mut m_p = 0.0;
            let mut meq_p = 0.0;
            for vq in 0..q {
                m_p += self.m[(p, vq)] * f[vq];
                meq_p += self.m[(p, vq)] * feq[vq];
            }
            m_relaxed[p] = m_p - self.s[p] * (m_p - meq_p);
        }

        // Back to velocity space.
        for p in 0..q {
            let mut f_p = 0.0;
            for vq in 0..q {
                f_p += self.m_inv[(p, vq)] * m_relaxed[vq];
            }
            f_new[p] = f_p + force[p];
        }
    }
}

/// Invert a square matrix by LU solve against identity columns.
fn invert(m: &Mat<f64>) -> Mat<f64> {
    let n = m.nrows();
    let lu = m.as_ref().full_piv_lu();
    let mut inv = Mat::zeros(n, n);
    for j in 0..n {
        let mut rhs = Mat::zeros(n, 1);
        rhs[(j, 0)] = 1.0;
        let col = lu.solve(&rhs);
        for i in 0..n {
            inv[(i, j)] = col[(i, 0)];
        }
    }
    inv
}

/// Lallemand-Luo moment basis for D2Q9:
/// (rho, e, eps, jx, qx, jy, qy, pxx, pxy).
fn moment_matrix_d2q9(lattice: &VelocitySet) -> Mat<f64> {
    let q = lattice.q;
    let mut m = Mat::zeros(q, q);
    for v in 0..q {
        let cx = lattice.c(0, v);
        let cy = lattice.c(1, v);
        let c2 = cx * cx + cy * cy;
        m[(0, v)] = 1.0;
        m[(1, v)] = -4.0 + 3.0 * c2;
        m[(2, v)] = 4.0 - 10.5 * c2 + 4.5 * c2 * c2;
        m[(3, v)] = cx;
        m[(4, v)] = (-5.0 + 3.0 * c2) * cx;
        m[(5, v)] = cy;
        m[(6, v)] = (-5.0 + 3.0 * c2) * cy;
        m[(7, v)] = cx * cx - cy * cy;
        m[(8, v)] = cx * cy;
    }
    m
}

/// Relaxation rates for the D2Q9 basis. Conserved moments (rho, jx, jy)
/// are left untouched; pxx and pxy carry the shear viscosity.
fn rates_d2q9(omega: f64) -> Vec<f64> {
    vec![0.0, 1.4, 1.4, 0.0, 1.2, 0.0, 1.2, omega, omega]
}

/// d'Humières moment basis for D3Q19:
/// (rho, e, eps, jx, qx, jy, qy, jz, qz,
///  3pxx, 3πxx, pww, πww, pxy, pyz, pxz, mx, my, mz).
fn moment_matrix_d3q19(lattice: &VelocitySet) -> Mat<f64> {
    let q = lattice.q;
    let mut m = Mat::zeros(q, q);
    for v in 0..q {
        let cx = lattice.c(0, v);
        let cy = lattice.c(1, v);
        let cz = lattice.c(2, v);
        let c2 = cx * cx + cy * cy + cz * cz;
        m[(0, v)] = 1.0;
        m[(1, v)] = 19.0 * c2 - 30.0;
        m[(2, v)] = (21.0 * c2 * c2 - 53.0 * c2 + 24.0) / 2.0;
        m[(3, v)] = cx;
        m[(4, v)] = (5.0 * c2 - 9.0) * cx;
        m[(5, v)] = cy;
        m[(6, v)] = (5.0 * c2 - 9.0) * cy;
        m[(7, v)] = cz;
        m[(8, v)] = (5.0 * c2 - 9.0) * cz;
        m[(9, v)] = 3.0 * cx * cx - c2;
        m[(10, v)] = (3.0 * c2 - 5.0) * (3.0 * cx * cx - c2);
        m[(11, v)] = cy * cy - cz * cz;
        m[(12, v)] = (3.0 * c2 - 5.0) * (cy * cy - cz * cz);
        m[(13, v)] = cx * cy;
        m[(14, v)] = cy * cz;
        m[(15, v)] = cx * cz;
        m[(16, v)] = (cy * cy - cz * cz) * cx;
        m[(17, v)] = (cz * cz - cx * cx) * cy;
        m[(18, v)] = (cx * cx - cy * cy) * cz;
    }
    m
}

/// Relaxation rates for the D3Q19 basis.
fn rates_d3q19(omega: f64) -> Vec<f64> {
    vec![
        0.0, 1.19, 1.4, 0.0, 1.2, 0.0, 1.2, 0.0, 1.2, omega, 1.4, omega, 1.4, omega, omega, omega,
        1.98, 1.98, 1.98,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{D2Q9, D3Q19};

    fn roundtrip_error(op: &MrtOperator, q: usize) -> f64 {
        // max |(M⁻¹ M)_ij − δ_ij|
        let mut max_err: f64 = 0.0;
        for i in 0..q {
            for j in 0..q {
                let mut prod = 0.0;
                for k in 0..q {
                    prod += op.m_inv[(i, k)] * op.m[(k, j)];
                }
                let expected = if i == j { 1.0 } else { 0.0 };
                max_err = max_err.max((prod - expected).abs());
            }
        }
        max_err
    }

    #[test]
    fn test_d2q9_roundtrip_identity() {
        let op = MrtOperator::new(&D2Q9, 1.0);
        assert!(roundtrip_error(&op, 9) < 1e-12);
    }

    #[test]
    fn test_d3q19_roundtrip_identity() {
        let op = MrtOperator::new(&D3Q19, 1.3);
        assert!(roundtrip_error(&op, 19) < 1e-12);
    }

    #[test]
    fn test_population_roundtrip() {
        // M⁻¹ (M f) reproduces an arbitrary population vector.
        let op = MrtOperator::new(&D2Q9, 0.9);
        let f: Vec<f64> = (0..9).map(|v| 0.1 + 0.037 * v as f64).collect();

        let mut m = [0.0; 9];
        for p in 0..9 {
            for q in 0..9 {
                m[p] += op.m[(p, q)] * f[q];
            }
        }
        for p in 0..9 {
            let mut back = 0.0;
            for q in 0..9 {
                back += op.m_inv[(p, q)] * m[q];
            }
            assert!((back - f[p]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_conserved_moments_unrelaxed() {
        let op = MrtOperator::new(&D2Q9, 1.0);
        assert_eq!(op.rates()[0], 0.0); // rho
        assert_eq!(op.rates()[3], 0.0); // jx
        assert_eq!(op.rates()[5], 0.0); // jy
    }

    #[test]
    fn test_mrt_matches_bgk_at_equilibrium() {
        // At equilibrium every moment equals its target, so the update
        // is the identity regardless of the rates.
        let op = MrtOperator::new(&D2Q9, 1.0);
        let rho = 1.05;
        let u = [0.02, 0.01, 0.0];
        let f: Vec<f64> = (0..9).map(|v| equilibrium(&D2Q9, rho, &u, v)).collect();
        let force = [0.0; 9];
        let mut feq = [0.0; 9];
        let mut f_new = [0.0; 9];

        op.relax_site(&D2Q9, rho, &u, &f, &mut feq, &force, &mut f_new);
        for v in 0..9 {
            assert!((f_new[v] - f[v]).abs() < 1e-12);
        }
    }
}
