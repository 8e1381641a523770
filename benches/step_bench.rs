//! Benchmarks for the solver's hot stages.
//!
//! Run with: `cargo bench --bench step_bench`
//!
//! Compares the per-stage cost of collision and streaming against a full
//! orchestrated step on a 64x64 D2Q9 grid.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use lbm_rs::{
    CollisionModel, D2Q9, Grid, MrtOperator, SolverConfig, StepContext, advance, collide, stream,
};

/// A periodic grid with a mild shear perturbation so collision has work
/// to do.
fn perturbed_grid(n: usize, collision: CollisionModel) -> Grid {
    let mut grid = Grid::new(0, 0, n, n, 1, &D2Q9, 1.0, collision);
    for i in 0..n {
        for j in 0..n {
            let idx = grid.idx(i, j, 0);
            let shear = 0.02 * (j as f64 / n as f64 - 0.5);
            let site = grid.f.site_mut(idx);
            site[1] += shear;
            site[2] -= shear;
        }
    }
    lbm_rs::update_macroscopic(&mut grid, &SolverConfig::default());
    grid.t = 0;
    grid
}

fn bench_collision(c: &mut Criterion) {
    let mut group = c.benchmark_group("collision");

    for (name, model) in [
        ("bgk", CollisionModel::Bgk),
        ("mrt", CollisionModel::Mrt(MrtOperator::new(&D2Q9, 1.0))),
    ] {
        let mut grid = perturbed_grid(64, model);
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                collide(black_box(&mut grid));
            })
        });
    }

    group.finish();
}

fn bench_streaming(c: &mut Criterion) {
    let mut grid = perturbed_grid(64, CollisionModel::Bgk);
    let config = SolverConfig::default().with_periodic();

    c.bench_function("stream_64x64", |b| {
        b.iter(|| {
            stream(black_box(&mut grid), black_box(&config));
        })
    });
}

fn bench_full_step(c: &mut Criterion) {
    let mut grid = perturbed_grid(64, CollisionModel::Bgk);
    let config = SolverConfig::default()
        .with_periodic()
        .with_check_interval(None);

    c.bench_function("advance_64x64", |b| {
        b.iter(|| {
            let mut ctx = StepContext::new(&config);
            advance(black_box(&mut grid), &mut ctx).unwrap();
        })
    });
}

criterion_group!(benches, bench_collision, bench_streaming, bench_full_step);
criterion_main!(benches);
