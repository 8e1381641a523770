//! Multi-grid time-step orchestration.
//!
//! [`advance`] takes the coarsest grid through one full step. Refined
//! levels run two sub-steps per parent step, each wrapped by the
//! explode/coalesce coupling pair, so the whole hierarchy advances by the
//! same physical time. With immersed-boundary coupling enabled, the
//! coarsest step becomes a predictor-corrector pair: the predicted
//! velocity field feeds the body collaborator, the grid rolls back, and
//! the step repeats with the restorative forces in place.

use log::{debug, info};

use crate::boundary;
use crate::collaborators::{BodyCoupling, Transport};
use crate::config::{InletTreatment, SolverConfig};
use crate::coupling;
use crate::error::LbmError;
use crate::forcing;
use crate::grid::Grid;
use crate::macroscopic;
use crate::stream;

/// Per-step collaborators handed to the orchestrator.
pub struct StepContext<'a> {
    /// Run configuration, shared by every stage.
    pub config: &'a SolverConfig,
    /// Immersed-boundary collaborator; required when the configuration
    /// enables IBM coupling.
    pub body: Option<&'a mut dyn BodyCoupling>,
    /// Halo-exchange transport; consulted only in distributed builds.
    pub transport: Option<&'a mut dyn Transport>,
}

impl<'a> StepContext<'a> {
    /// Context with no collaborators attached.
    pub fn new(config: &'a SolverConfig) -> Self {
        Self {
            config,
            body: None,
            transport: None,
        }
    }

    /// Attach an immersed-boundary collaborator.
    pub fn with_body(mut self, body: &'a mut dyn BodyCoupling) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a halo-exchange transport.
    pub fn with_transport(mut self, transport: &'a mut dyn Transport) -> Self {
        self.transport = Some(transport);
        self
    }
}

/// Pre-step state retained for the corrector rollback.
struct Snapshot {
    f: crate::grid::PopulationField,
    rho: crate::grid::ScalarField,
    u: crate::grid::VectorField,
}

impl Snapshot {
    fn take(grid: &Grid) -> Self {
        Self {
            f: grid.f.clone(),
            rho: grid.rho.clone(),
            u: grid.u.clone(),
        }
    }

    fn restore(self, grid: &mut Grid) {
        grid.f = self.f;
        grid.rho = self.rho;
        grid.u = self.u;
    }
}

/// Advance the hierarchy rooted at `grid` by one coarsest-level step.
///
/// Must be called on the coarsest grid; immersed-boundary coupling is a
/// coarsest-level mechanism and is rejected elsewhere.
pub fn advance(grid: &mut Grid, ctx: &mut StepContext<'_>) -> Result<(), LbmError> {
    if ctx.config.ibm {
        if grid.level != 0 {
            return Err(LbmError::IbmOnRefinedLevel { level: grid.level });
        }
        predictor_corrector(grid, ctx)
    } else {
        kernel(grid, ctx, true)
    }
}

/// Predictor-corrector cycle for immersed-boundary coupling.
///
/// The predictor advances the grid normally, the body collaborator reads
/// the predicted velocities and deposits restorative forces, then the
/// populations and macroscopic fields roll back and the step repeats
/// without clearing those forces. The pair nets exactly one step.
fn predictor_corrector(grid: &mut Grid, ctx: &mut StepContext<'_>) -> Result<(), LbmError> {
    debug!("prediction step at t = {}", grid.t);
    let snapshot = Snapshot::take(grid);
    kernel(grid, ctx, true)?;

    // Clear predictor-stage forces so the deposit starts from zero.
    forcing::compute_forces(grid, ctx.config, true);
    if let Some(body) = ctx.body.as_deref_mut() {
        body.apply_forcing(grid);
    }

    snapshot.restore(grid);
    grid.t -= 1;

    debug!("correction step at t = {}", grid.t);
    kernel(grid, ctx, false)?;
    if let Some(body) = ctx.body.as_deref_mut() {
        body.move_bodies(grid);
    }
    Ok(())
}

/// One grid's step: a single sub-step at the coarsest level, two on every
/// refined level.
fn kernel(grid: &mut Grid, ctx: &mut StepContext<'_>, reset_forces: bool) -> Result<(), LbmError> {
    if reset_forces {
        forcing::compute_forces(grid, ctx.config, true);
    }

    let sub_steps = if grid.level == 0 { 1 } else { 2 };
    for _ in 0..sub_steps {
        if let InletTreatment::Regularised(u_in) = ctx.config.inlet {
            // Pins inlet populations before they feed the collision.
            boundary::apply_regularised_inlet(grid, &u_in);
        }

        forcing::compute_forces(grid, ctx.config, false);
        collide_dispatch(grid);

        for region in 0..grid.children.len() {
            coupling::explode(grid, region)?;
            let reset_child = !ctx.config.ibm;
            kernel(grid.child_mut(region)?, ctx, reset_child)?;
        }

        boundary::apply_bounce_back(grid);
        stream::stream(grid, ctx.config);

        for region in 0..grid.children.len() {
            coupling::coalesce(grid, region)?;
        }

        macroscopic::update_macroscopic(grid, ctx.config);
        grid.t += 1;

        if let Some(every) = ctx.config.check_interval
            && every > 0
            && grid.t % every == 0
        {
            grid.check_finite()?;
        }
        if ctx.config.verbose && grid.level == 0 {
            info!("step {} complete, mass = {:.6}", grid.t, grid.mass());
        }
    }

    if ctx.config.distributed
        && let Some(transport) = ctx.transport.as_deref_mut()
    {
        transport.exchange_halos(grid.level, grid.region);
    }
    Ok(())
}

#[cfg(feature = "parallel")]
fn collide_dispatch(grid: &mut Grid) {
    crate::collision::collide_parallel(grid);
}

#[cfg(not(feature = "parallel"))]
fn collide_dispatch(grid: &mut Grid) {
    crate::collision::collide(grid);
}
