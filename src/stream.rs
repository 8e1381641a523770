//! Streaming stage.
//!
//! Propagates populations one site along each discrete direction, with a
//! fixed precedence of exclusions:
//!
//! 1. Source exclusions: refined-away sites stream nothing (handled on
//!    the child level); do-nothing inlets copy their own value unchanged.
//! 2. Off-grid destinations: wrap periodically at the coarsest level
//!    between ordinary fluid sites, otherwise retain the incoming value
//!    already present along the opposite direction (nothing enters from
//!    off-grid).
//! 3. Distributed guard: a stream from a receive-halo site into a send
//!    layer is only legal when that layer pairing wraps a periodic
//!    neighbour and periodicity is enabled.
//! 4. Destination exclusions: coarse-side transition pairs are resolved
//!    on the child level; do-nothing inlets are never overwritten.
//!
//! Streaming always writes into a fresh zero-initialised buffer that
//! replaces `f` at the end of the stage. The zero initialisation is
//! load-bearing: directions at transition sites that receive no stream
//! must read exactly 0.0 so coalesce can recognise them as unresolved.

use crate::config::SolverConfig;
use crate::grid::{Grid, PopulationField};
use crate::types::SiteKind;

/// Stream all populations to their neighbouring sites.
pub fn stream(grid: &mut Grid, config: &SolverConfig) {
    let (nx, ny, nz) = (grid.nx as i64, grid.ny as i64, grid.nz as i64);
    let q = grid.lattice.q;
    let mut f_new = PopulationField::zeros(grid.n_sites(), q);

    {
        let Grid {
            lattice,
            site,
            f,
            halo,
            level,
            ..
        } = grid;
        let coarsest = *level == 0;
        let idx =
            |i: i64, j: i64, k: i64| ((i * ny + j) * nz + k) as usize;

        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let src = idx(i, j, k);

                    for v in 0..q {
                        // Source exclusions.
                        match site[src] {
                            SiteKind::Refined => break,
                            SiteKind::InletDoNothing => {
                                f_new.set(src, v, f.get(src, v));
                                continue;
                            }
                            _ => {}
                        }

                        let di = i + lattice.c_i(0, v);
                        let dj = j + lattice.c_i(1, v);
                        let dk = k + lattice.c_i(2, v);
                        let off_grid =
                            di < 0 || di >= nx || dj < 0 || dj >= ny || dk < 0 || dk >= nz;

                        if off_grid {
                            // Periodic wraparound: coarsest level only,
                            // fluid to fluid, and never in a distributed
                            // build (halos carry periodicity there).
                            if config.periodic && coarsest && !config.distributed {
                                let dst =
                                    idx((di + nx) % nx, (dj + ny) % ny, (dk + nz) % nz);
                                if site[src] == SiteKind::Fluid && site[dst] == SiteKind::Fluid
                                {
                                    f_new.set(dst, v, f.get(src, v));
                                    continue;
                                }
                            }
                            // No update arrives from off-grid: retain the
                            // incoming value along the opposite direction.
                            let v_opp = lattice.opposite(v);
                            f_new.set(src, v_opp, f.get(src, v_opp));
                            continue;
                        }

                        let dst = idx(di, dj, dk);

                        // Distributed guard: recv-layer -> send-layer is
                        // only a legal stream across a periodic wrap.
                        if config.distributed
                            && let Some(halo) = halo
                            && halo.recv[src]
                            && halo.send[dst]
                            && halo.periodic[src]
                        {
                            if config.periodic
                                && site[src] == SiteKind::Fluid
                                && site[dst] == SiteKind::Fluid
                            {
                                f_new.set(dst, v, f.get(src, v));
                            } else {
                                f_new.set(dst, v, f.get(dst, v));
                            }
                            continue;
                        }

                        // Destination exclusions.
                        if site[src] == SiteKind::TransitionToFine
                            && site[dst] == SiteKind::TransitionToFine
                        {
                            continue;
                        }
                        if site[dst] == SiteKind::InletDoNothing {
                            continue;
                        }

                        f_new.set(dst, v, f.get(src, v));
                    }
                }
            }
        }
    }

    std::mem::swap(&mut grid.f, &mut f_new);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionModel;
    use crate::grid::HaloLayout;
    use crate::lattice::D2Q9;

    fn periodic_grid(nx: usize, ny: usize) -> (Grid, SolverConfig) {
        let grid = Grid::new(0, 0, nx, ny, 1, &D2Q9, 1.0, CollisionModel::Bgk);
        let config = SolverConfig::default().with_periodic();
        (grid, config)
    }

    #[test]
    fn test_periodic_stream_wraps_to_index_zero() {
        // A site at the rightmost index streaming in +x lands at index 0.
        let (mut grid, config) = periodic_grid(4, 3);
        let src = grid.idx(3, 1, 0);
        // Direction 1 is +x in the D2Q9 ordering.
        grid.f.set(src, 1, 0.7);

        stream(&mut grid, &config);
        let wrapped = grid.idx(0, 1, 0);
        assert!((grid.f.get(wrapped, 1) - 0.7).abs() < 1e-14);
    }

    #[test]
    fn test_streaming_is_mass_preserving_on_periodic_fluid() {
        let (mut grid, config) = periodic_grid(5, 5);
        // Arbitrary non-uniform populations.
        for (n, x) in grid.f.data.iter_mut().enumerate() {
            *x = 0.01 + 0.001 * (n % 17) as f64;
        }
        let mass = grid.mass();
        stream(&mut grid, &config);
        assert!((grid.mass() - mass).abs() < 1e-12);
    }

    #[test]
    fn test_non_periodic_edge_retains_incoming() {
        // Without periodicity, a +x stream off the right edge leaves the
        // source's incoming (-x) value in place.
        let (mut grid, _) = periodic_grid(3, 3);
        let config = SolverConfig::default();
        let src = grid.idx(2, 1, 0);
        let incoming = grid.f.get(src, 2); // -x direction
        grid.f.set(src, 1, 0.9); // +x heads off-grid

        stream(&mut grid, &config);
        assert!((grid.f.get(src, 2) - incoming).abs() < 1e-14);
        // And nothing wrapped around to the left edge.
        let left_edge = grid.idx(0, 1, 0);
        assert!((grid.f.get(left_edge, 1) - 0.9).abs() > 1e-6);
    }

    #[test]
    fn test_refined_source_streams_nothing() {
        let (mut grid, config) = periodic_grid(4, 4);
        let refined = grid.idx(1, 1, 0);
        grid.site[refined] = SiteKind::Refined;
        grid.f.site_mut(refined).fill(9.0);

        stream(&mut grid, &config);
        // The +x neighbour never received the refined site's value; the
        // direction reads exactly zero from the fresh buffer.
        let neighbour = grid.idx(2, 1, 0);
        assert_eq!(grid.f.get(neighbour, 1), 0.0);
    }

    #[test]
    fn test_do_nothing_inlet_never_altered() {
        let (mut grid, config) = periodic_grid(4, 4);
        let inlet = grid.idx(0, 2, 0);
        grid.site[inlet] = SiteKind::InletDoNothing;
        let before: Vec<f64> = grid.f.site(inlet).to_vec();

        stream(&mut grid, &config);
        for v in 0..grid.lattice.q {
            assert!((grid.f.get(inlet, v) - before[v]).abs() < 1e-14);
        }
    }

    #[test]
    fn test_transition_pair_skipped() {
        let (mut grid, config) = periodic_grid(4, 4);
        let a = grid.idx(1, 1, 0);
        let b = grid.idx(2, 1, 0);
        grid.site[a] = SiteKind::TransitionToFine;
        grid.site[b] = SiteKind::TransitionToFine;
        grid.f.set(a, 1, 0.9); // +x from a would land on b

        stream(&mut grid, &config);
        // Left exactly zero: resolved on the child level.
        assert_eq!(grid.f.get(b, 1), 0.0);
    }

    #[test]
    fn test_illegal_cross_rank_periodic_stream_blocked() {
        let (mut grid, _) = periodic_grid(4, 4);
        let config = SolverConfig::default().with_distributed(); // periodicity off
        let mut halo = HaloLayout::new(grid.n_sites());
        let src = grid.idx(0, 1, 0);
        let dst = grid.idx(1, 1, 0);
        halo.recv[src] = true;
        halo.send[dst] = true;
        halo.periodic[src] = true;
        grid.halo = Some(halo);

        let dst_incumbent = grid.f.get(dst, 1);
        grid.f.set(src, 1, 0.42);

        stream(&mut grid, &config);
        // Guard retained the destination's pre-stream value.
        assert!((grid.f.get(dst, 1) - dst_incumbent).abs() < 1e-14);
    }
}
