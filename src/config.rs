//! Runtime settings shared by the server and CLI binaries.

use clap::{Args, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Parameters of the decorative cost distribution.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationSettings {
    seed: u64,
    mean: f64,
    std_dev: f64,
    samples: usize,
    bins: usize,
}

impl SimulationSettings {
    /// Constructs a new set of simulation settings.
    pub fn new(seed: u64, mean: f64, std_dev: f64, samples: usize, bins: usize) -> Self {
        Self {
            seed,
            mean,
            std_dev,
            samples,
            bins,
        }
    }

    /// Returns a copy with a different RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// RNG seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Distribution mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Distribution standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Number of samples drawn.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Histogram bin count.
    pub fn bins(&self) -> usize {
        self.bins
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            mean: 5000.0,
            std_dev: 2000.0,
            samples: 1000,
            bins: 30,
        }
    }
}

/// Artifact locations shared by binaries that load the predictor.
#[derive(Args, Debug, Clone)]
pub struct ArtifactArgs {
    /// Fitted scaler artifact (JSON)
    #[arg(
        long,
        env = "MEDCOST_SCALER_PATH",
        default_value = "artifacts/scaler_no_log.json"
    )]
    pub scaler_path: PathBuf,

    /// Fitted voting regressor artifact (JSON)
    #[arg(
        long,
        env = "MEDCOST_MODEL_PATH",
        default_value = "artifacts/voting_regressor_no_log.json"
    )]
    pub model_path: PathBuf,
}

/// Command-line interface for the estimator web server.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "medcost-server",
    about = "Web form that estimates medical insurance cost from six attributes"
)]
pub struct ServerCli {
    /// Address to bind the HTTP server to (host:port)
    #[arg(long, env = "MEDCOST_BIND", default_value = "127.0.0.1:8501")]
    pub bind: String,

    /// Artifact locations
    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    /// Milliseconds the page waits before showing a result (0 disables)
    #[arg(long, env = "MEDCOST_PROCESSING_DELAY_MS", default_value_t = 2000)]
    pub processing_delay_ms: u64,

    /// Seed for the simulated cost distribution
    #[arg(long, env = "MEDCOST_SIMULATION_SEED", default_value_t = 42)]
    pub simulation_seed: u64,

    /// Number of simulated samples
    #[arg(long, default_value_t = 1000)]
    pub simulation_samples: usize,

    /// Histogram bins for the simulated distribution
    #[arg(long, default_value_t = 30)]
    pub histogram_bins: usize,
}

impl ServerCli {
    /// Converts the parsed CLI into `SimulationSettings`.
    pub fn build_simulation(&self) -> SimulationSettings {
        let defaults = SimulationSettings::default();
        SimulationSettings::new(
            self.simulation_seed,
            defaults.mean(),
            defaults.std_dev(),
            self.simulation_samples.max(1),
            self.histogram_bins.max(1),
        )
    }

    /// Returns the cosmetic processing delay.
    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }
}
