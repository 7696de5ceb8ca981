//! Synthetic cost distribution drawn for the decorative histogram.
//!
//! The samples are not derived from the model or any dataset; they come from
//! a seeded normal distribution so the chart is identical on every run.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use statrs::statistics::Statistics;

use crate::config::SimulationSettings;
use crate::error::{MedcostError, Result};

const KDE_POINTS: usize = 200;

/// Draws the seeded normal samples.
pub fn simulate_costs(settings: &SimulationSettings) -> Result<Vec<f64>> {
    if !settings.mean().is_finite() {
        return Err(MedcostError::InvalidSimulation(format!(
            "mean must be finite, got {}",
            settings.mean()
        )));
    }
    if !(settings.std_dev().is_finite() && settings.std_dev() > 0.0) {
        return Err(MedcostError::InvalidSimulation(format!(
            "standard deviation must be positive and finite, got {}",
            settings.std_dev()
        )));
    }
    if settings.samples() == 0 {
        return Err(MedcostError::InvalidSimulation(
            "sample count must be at least 1".to_string(),
        ));
    }
    let normal = Normal::new(settings.mean(), settings.std_dev())
        .map_err(|err| MedcostError::InvalidSimulation(err.to_string()))?;
    let mut rng = StdRng::seed_from_u64(settings.seed());
    Ok((0..settings.samples())
        .map(|_| normal.sample(&mut rng))
        .collect())
}

/// Equal-width histogram; the last bin is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` edges in ascending order.
    pub edges: Vec<f64>,
    /// Sample count per bin.
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bins `samples` into `bins` equal-width buckets spanning their range.
    pub fn from_samples(samples: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let (mut lo, mut hi) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                (lo.min(*x), hi.max(*x))
            });
        if samples.is_empty() {
            lo = 0.0;
            hi = 1.0;
        } else if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|idx| lo + width * idx as f64).collect();
        let mut counts = vec![0usize; bins];
        for sample in samples {
            let idx = (((sample - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Self { edges, counts }
    }

    /// Width shared by every bin.
    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(first), Some(last)) if !self.counts.is_empty() => {
                (last - first) / self.counts.len() as f64
            }
            _ => 0.0,
        }
    }

    /// Tallest bin.
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// One point on the smoothed density curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KdePoint {
    /// Cost value.
    pub x: f64,
    /// Density scaled to histogram counts.
    pub y: f64,
}

/// Gaussian kernel density estimate with Scott's bandwidth, evaluated over the
/// sample range and scaled so it overlays a count histogram of `bin_width`.
pub fn kde_curve(samples: &[f64], bin_width: f64) -> Vec<KdePoint> {
    let n = samples.len();
    if n < 2 {
        return Vec::new();
    }
    let bandwidth = samples.std_dev() * (n as f64).powf(-0.2);
    if bandwidth <= 0.0 || !bandwidth.is_finite() {
        return Vec::new();
    }
    let lo = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let step = (hi - lo) / (KDE_POINTS - 1) as f64;
    (0..KDE_POINTS)
        .map(|idx| {
            let x = lo + step * idx as f64;
            let density: f64 = samples
                .iter()
                .map(|sample| {
                    let z = (x - sample) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            KdePoint {
                x,
                y: density * n as f64 * bin_width,
            }
        })
        .collect()
}

/// Precomputed chart data; built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedDistribution {
    #[serde(skip)]
    samples: Vec<f64>,
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// Binned counts.
    pub histogram: Histogram,
    /// Smoothed overlay.
    pub kde: Vec<KdePoint>,
}

impl SimulatedDistribution {
    /// Draws samples and derives the histogram and density overlay.
    pub fn generate(settings: &SimulationSettings) -> Result<Self> {
        let samples = simulate_costs(settings)?;
        let histogram = Histogram::from_samples(&samples, settings.bins());
        let kde = kde_curve(&samples, histogram.bin_width());
        let mean = samples.iter().mean();
        // n - 1 denominator; a single draw has no spread.
        let std_dev = if samples.len() > 1 {
            samples.iter().std_dev()
        } else {
            0.0
        };
        Ok(Self {
            samples,
            mean,
            std_dev,
            histogram,
            kde,
        })
    }

    /// Raw samples.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}
