//! Single-relaxation-time (BGK) collision kernel.

use crate::lattice::{VelocitySet, equilibrium};

/// Relax one site: `f' = f − ω(f − feq) + F_i`.
///
/// Refreshes the equilibrium scratch for the site as a side effect.
#[inline]
pub(crate) fn relax_site(
    lattice: &VelocitySet,
    omega: f64,
    rho: f64,
    u: &[f64; 3],
    f: &[f64],
    feq: &mut [f64],
    force: &[f64],
    f_new: &mut [f64],
) {
    for v in 0..lattice.q {
        let feq_v = equilibrium(lattice, rho, u, v);
        feq[v] = feq_v;
        f_new[v] = f[v] - omega * (f[v] - feq_v) + force[v];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::D2Q9;

    #[test]
    fn test_full_relaxation_reaches_equilibrium() {
        // With omega = 1 the post-collision state is exactly feq + F.
        let rho = 1.1;
        let u = [0.03, -0.01, 0.0];
        let f: Vec<f64> = (0..9).map(|v| 0.1 + 0.01 * v as f64).collect();
        let force = [0.0; 9];
        let mut feq = [0.0; 9];
        let mut f_new = [0.0; 9];

        relax_site(&D2Q9, 1.0, rho, &u, &f, &mut feq, &force, &mut f_new);
        for v in 0..9 {
            assert!((f_new[v] - feq[v]).abs() < 1e-14);
            assert!((feq[v] - equilibrium(&D2Q9, rho, &u, v)).abs() < 1e-14);
        }
    }

    #[test]
    fn test_force_contribution_added() {
        let rho = 1.0;
        let u = [0.0; 3];
        let f: Vec<f64> = (0..9).map(|v| equilibrium(&D2Q9, rho, &u, v)).collect();
        let force = [0.002; 9];
        let mut feq = [0.0; 9];
        let mut f_new = [0.0; 9];

        relax_site(&D2Q9, 0.8, rho, &u, &f, &mut feq, &force, &mut f_new);
        for v in 0..9 {
            assert!((f_new[v] - (f[v] + 0.002)).abs() < 1e-14);
        }
    }
}
