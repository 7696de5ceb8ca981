#![warn(missing_docs)]
//! Core library for the medcost insurance cost estimator.

pub mod config;
pub mod error;
pub mod features;
pub mod inference;
pub mod model;
pub mod page;
pub mod report;
pub mod scaler;
pub mod server;
pub mod simulation;

pub use config::{ArtifactArgs, ServerCli, SimulationSettings};
pub use error::{MedcostError, Result};
pub use features::{FeatureVector, FormInput, Region, Sex, Smoker, COLUMNS, N_FEATURES};
pub use inference::Predictor;
pub use model::{Estimator, VotingRegressor};
pub use report::{format_currency, Advisory, Report};
pub use scaler::StandardScaler;
pub use server::{router, AppState};
pub use simulation::SimulatedDistribution;

/// Installs the `tracing` subscriber used by every binary.
///
/// Honors `RUST_LOG`, falling back to `info`. Logs go to stderr; stdout is
/// reserved for CLI output.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
