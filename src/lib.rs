//! # lbm-rs
//!
//! A multi-resolution lattice Boltzmann solver core.
//!
//! This crate provides the building blocks of the method:
//! - Discrete velocity sets (D2Q9, D3Q19) and the shared equilibrium
//! - Site classification over a nested 2:1 grid hierarchy
//! - Guo body forcing with optional gravity
//! - BGK and moment-space (MRT) collision
//! - Streaming with refinement, inlet and distributed-halo exclusions
//! - Macroscopic recovery with running time averages
//! - Explode/coalesce coupling between refinement levels
//! - A multi-grid orchestrator with immersed-boundary
//!   predictor-corrector support

pub mod boundary;
pub mod collaborators;
pub mod collision;
pub mod config;
pub mod coupling;
pub mod error;
pub mod forcing;
pub mod grid;
pub mod lattice;
pub mod macroscopic;
pub mod stepper;
pub mod stream;
pub mod types;

// Re-export main types for convenience
pub use collaborators::{BodyCoupling, Transport};
pub use collision::{CollisionModel, MrtOperator, collide};
#[cfg(feature = "parallel")]
pub use collision::collide_parallel;
pub use config::{Gravity, InletTreatment, SolverConfig};
pub use error::LbmError;
pub use grid::{Grid, HaloLayout, PopulationField, ScalarField, VectorField};
pub use lattice::{D2Q9, D3Q19, VelocitySet, equilibrium};
pub use macroscopic::{refresh_site, update_macroscopic};
pub use stepper::{StepContext, advance};
pub use stream::stream;
pub use types::SiteKind;
