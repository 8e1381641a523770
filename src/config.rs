//! Runtime solver configuration.
//!
//! All run-mode switches live in a plain configuration struct fixed for
//! the duration of a run. The hot loops branch on a handful of booleans
//! that never change mid-simulation.

/// Gravitational body force along a single axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gravity {
    /// Axis index (0 = x, 1 = y, 2 = z).
    pub axis: usize,
    /// Force magnitude per unit density, in lattice units.
    pub magnitude: f64,
}

impl Gravity {
    /// Create a gravitational force along `axis`.
    pub fn new(axis: usize, magnitude: f64) -> Self {
        Self { axis, magnitude }
    }
}

/// Inlet treatment applied by the orchestrator's boundary passes.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum InletTreatment {
    /// No inlet handling.
    #[default]
    None,
    /// Do-nothing inlet: sites tagged [`SiteKind::InletDoNothing`] keep
    /// their populations through streaming (handled by stream exclusions).
    ///
    /// [`SiteKind::InletDoNothing`]: crate::types::SiteKind::InletDoNothing
    DoNothing,
    /// Regularised inlet: populations at [`SiteKind::Inlet`] sites are
    /// replaced by the equilibrium at the imposed velocity before each
    /// collision.
    ///
    /// [`SiteKind::Inlet`]: crate::types::SiteKind::Inlet
    Regularised([f64; 3]),
}

/// Configuration for a solver run.
///
/// Constructed once at setup and shared read-only by every stage.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Wrap streaming at the coarsest-level domain edges.
    pub periodic: bool,
    /// Optional gravitational body force.
    pub gravity: Option<Gravity>,
    /// Inlet treatment.
    pub inlet: InletTreatment,
    /// Run the immersed-boundary predictor-corrector cycle.
    pub ibm: bool,
    /// Distributed (halo-exchange) build.
    pub distributed: bool,
    /// Check density fields for non-finite values every N steps.
    pub check_interval: Option<u64>,
    /// Whether to log per-step progress.
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            periodic: false,
            gravity: None,
            inlet: InletTreatment::None,
            ibm: false,
            distributed: false,
            check_interval: Some(100),
            verbose: false,
        }
    }
}

impl SolverConfig {
    /// Enable periodic boundaries at the coarsest level.
    pub fn with_periodic(mut self) -> Self {
        self.periodic = true;
        self
    }

    /// Add a gravitational body force.
    pub fn with_gravity(mut self, axis: usize, magnitude: f64) -> Self {
        self.gravity = Some(Gravity::new(axis, magnitude));
        self
    }

    /// Select an inlet treatment.
    pub fn with_inlet(mut self, inlet: InletTreatment) -> Self {
        self.inlet = inlet;
        self
    }

    /// Enable immersed-boundary coupling.
    pub fn with_ibm(mut self) -> Self {
        self.ibm = true;
        self
    }

    /// Enable the distributed streaming rules and halo-exchange trigger.
    pub fn with_distributed(mut self) -> Self {
        self.distributed = true;
        self
    }

    /// Set the divergence-check interval (`None` disables the check).
    pub fn with_check_interval(mut self, every: Option<u64>) -> Self {
        self.check_interval = every;
        self
    }

    /// Enable progress logging.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}
