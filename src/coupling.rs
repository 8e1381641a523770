//! Level coupling: explode (coarse → fine) and coalesce (fine → coarse).
//!
//! Both operators walk the coarse index window a child covers and map
//! each coarse site to its 4 (2D) or 8 (3D) covering fine sites through
//! the exact 2:1 index relation `fine = 2 · (coarse − window_start)`.
//! A window that cannot hold that relation is a structural configuration
//! fault and is surfaced immediately.

use crate::error::LbmError;
use crate::grid::Grid;
use crate::types::SiteKind;

/// Offsets of the fine sites covering one coarse site: the unit cube
/// corners restricted to the lattice dimensionality.
fn fine_offsets(dims: usize) -> &'static [[usize; 3]] {
    const OFFSETS_2D: [[usize; 3]; 4] = [[0, 0, 0], [1, 0, 0], [0, 1, 0], [1, 1, 0]];
    const OFFSETS_3D: [[usize; 3]; 8] = [
        [0, 0, 0],
        [1, 0, 0],
        [0, 1, 0],
        [1, 1, 0],
        [0, 0, 1],
        [1, 0, 1],
        [0, 1, 1],
        [1, 1, 1],
    ];
    if dims == 3 { &OFFSETS_3D } else { &OFFSETS_2D }
}

/// Verify the child's fine extents can hold the 2:1 image of its coarse
/// window.
fn check_alignment(parent_level: usize, child: &Grid) -> Result<(), LbmError> {
    let fine_extent = [child.nx, child.ny, child.nz];
    let axes = if child.dims() == 3 { 3 } else { 2 };
    for axis in 0..axes {
        let [lo, hi] = child.coarse_lims[axis];
        if hi < lo || 2 * (hi - lo + 1) > fine_extent[axis] {
            return Err(LbmError::MisalignedWindow {
                level: parent_level,
                region: child.region,
            });
        }
    }
    Ok(())
}

/// Seed fine-grid boundary populations from coarse data.
///
/// For every coarse site in the window tagged as the coarse-side
/// transition layer whose mapped fine site is a genuine fine-side
/// transition site, copy each directional population unchanged into all
/// covering fine sites. Runs before recursing into the child.
pub fn explode(grid: &mut Grid, region: usize) -> Result<(), LbmError> {
    let level = grid.level;
    let Grid {
        f,
        site,
        children,
        lattice,
        ny,
        nz,
        ..
    } = grid;
    let child = children
        .get_mut(region)
        .ok_or(LbmError::MissingChildGrid { level, region })?;
    check_alignment(level, child)?;

    let q = lattice.q;
    let offsets = fine_offsets(lattice.dims);
    let [xw, yw, zw] = child.coarse_lims;
    let coarse_idx = |i: usize, j: usize, k: usize| (i * *ny + j) * *nz + k;

    for i in xw[0]..=xw[1] {
        for j in yw[0]..=yw[1] {
            for k in zw[0]..=zw[1] {
                let coarse = coarse_idx(i, j, k);
                if site[coarse] != SiteKind::TransitionToFine {
                    continue;
                }

                let fi = 2 * (i - xw[0]);
                let fj = 2 * (j - yw[0]);
                let fk = 2 * (k - zw[0]);

                // Only pass information down if the fine grid expects it
                // (not a domain boundary artifact).
                let fine_base = child.idx(fi, fj, fk);
                if child.site[fine_base] != SiteKind::TransitionToCoarse {
                    continue;
                }

                for v in 0..q {
                    let coarse_f = f.get(coarse, v);
                    for off in offsets {
                        let fine = child.idx(fi + off[0], fj + off[1], fk + off[2]);
                        child.f.set(fine, v, coarse_f);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Feed refined-region physics back up to the coarse grid.
///
/// For every coarse transition site in the window, each direction whose
/// coarse population is exactly zero (left unresolved by the coarse
/// stream) is overwritten with the arithmetic mean of the covering fine
/// values. Runs after the child finishes its two sub-steps.
pub fn coalesce(grid: &mut Grid, region: usize) -> Result<(), LbmError> {
    let level = grid.level;
    let Grid {
        f,
        site,
        children,
        lattice,
        ny,
        nz,
        ..
    } = grid;
    let child = children
        .get_mut(region)
        .ok_or(LbmError::MissingChildGrid { level, region })?;
    check_alignment(level, child)?;

    let q = lattice.q;
    let offsets = fine_offsets(lattice.dims);
    let inv_count = 1.0 / offsets.len() as f64;
    let [xw, yw, zw] = child.coarse_lims;
    let coarse_idx = |i: usize, j: usize, k: usize| (i * *ny + j) * *nz + k;

    for i in xw[0]..=xw[1] {
        for j in yw[0]..=yw[1] {
            for k in zw[0]..=zw[1] {
                let coarse = coarse_idx(i, j, k);
                if !matches!(
                    site[coarse],
                    SiteKind::TransitionToFine | SiteKind::RefinedSolid
                ) {
                    continue;
                }

                let fi = 2 * (i - xw[0]);
                let fj = 2 * (j - yw[0]);
                let fk = 2 * (k - zw[0]);

                for v in 0..q {
                    if f.get(coarse, v) != 0.0 {
                        continue;
                    }
                    let mut sum = 0.0;
                    for off in offsets {
                        let fine = child.idx(fi + off[0], fj + off[1], fk + off[2]);
                        sum += child.f.get(fine, v);
                    }
                    f.set(coarse, v, sum * inv_count);
                }
            }
        }
    }
    Ok(())
}
