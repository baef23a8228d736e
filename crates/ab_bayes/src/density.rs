//! Gaussian kernel density estimation over a fixed grid, for plotting posteriors.
//!
//! The bandwidth is `bandwidth_factor` times a rule computed from the sample standard deviation
//! `s` (with `n - 1` in the denominator):
//! - [`BandwidthMethod::ScaledScott`]: `factor * n^(-1/5) * s`
//! - [`BandwidthMethod::SampleStd`]: `factor * s`
//!
//! The default factor of 0.4 is tuned for presentation, not for inference. Plots produced with
//! `gaussian_kde(bw_method=0.4)` in earlier tooling correspond to [`BandwidthMethod::SampleStd`];
//! the default [`BandwidthMethod::ScaledScott`] additionally shrinks the bandwidth with `n`.

use std::f64::consts::PI;

use ab_bayes_config::config::{BandwidthMethod, DensityConfig};
use ab_bayes_types::errors::EstimationError;
use ab_bayes_types::posterior::PosteriorData;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "density_test.rs"]
mod density_test;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityPoint {
    pub x: f64,
    pub density: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DensityEstimator {
    config: DensityConfig,
}

impl DensityEstimator {
    pub fn new(config: DensityConfig) -> Self {
        Self { config }
    }

    pub fn bandwidth(&self, posterior: &PosteriorData) -> Result<f64, EstimationError> {
        ensure_not_degenerate(posterior)?;
        let points = posterior.points();
        let n_samples = as_f64(points.len());
        let mean = points.iter().sum::<f64>() / n_samples;
        let variance =
            points.iter().map(|point| (point - mean).powi(2)).sum::<f64>() / (n_samples - 1.0);
        let rule = match self.config.bandwidth_method {
            BandwidthMethod::ScaledScott => n_samples.powf(-0.2) * variance.sqrt(),
            BandwidthMethod::SampleStd => variance.sqrt(),
        };
        let bandwidth = self.config.bandwidth_factor * rule;
        if !bandwidth.is_finite() || bandwidth <= 0.0 {
            return Err(EstimationError::InvalidBandwidth(bandwidth));
        }
        Ok(bandwidth)
    }

    /// Lazily evaluates the density on `resolution` evenly spaced points spanning
    /// `[min(points), max(points)]`. The returned curve can be cloned and re-iterated; every pass
    /// yields the same sequence.
    pub fn estimate<'a>(
        &self,
        posterior: &'a PosteriorData,
    ) -> Result<DensityCurve<'a>, EstimationError> {
        if self.config.resolution < 2 {
            return Err(EstimationError::InvalidResolution(self.config.resolution));
        }
        let bandwidth = self.bandwidth(posterior)?;

        let (lower, upper) = (posterior.min(), posterior.max());
        Ok(DensityCurve {
            samples: posterior.points(),
            bandwidth,
            lower,
            upper,
            step: (upper - lower) / as_f64(self.config.resolution - 1),
            resolution: self.config.resolution,
            next_index: 0,
        })
    }
}

/// Finite, restartable sequence of [`DensityPoint`]s.
#[derive(Clone, Debug)]
pub struct DensityCurve<'a> {
    samples: &'a [f64],
    bandwidth: f64,
    lower: f64,
    upper: f64,
    step: f64,
    resolution: usize,
    next_index: usize,
}

impl DensityCurve<'_> {
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    fn grid_point(&self, index: usize) -> f64 {
        // The last grid point is pinned to the maximum to avoid accumulated rounding.
        if index + 1 == self.resolution {
            self.upper
        } else {
            self.lower + as_f64(index) * self.step
        }
    }

    fn density_at(&self, x: f64) -> f64 {
        let normalization = as_f64(self.samples.len()) * self.bandwidth * (2.0 * PI).sqrt();
        let kernel_sum: f64 = self
            .samples
            .iter()
            .map(|sample| {
                let z = (x - sample) / self.bandwidth;
                (-0.5 * z * z).exp()
            })
            .sum();
        kernel_sum / normalization
    }
}

impl Iterator for DensityCurve<'_> {
    type Item = DensityPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.resolution {
            return None;
        }
        let x = self.grid_point(self.next_index);
        self.next_index += 1;
        Some(DensityPoint { x, density: self.density_at(x) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.resolution - self.next_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DensityCurve<'_> {}

fn ensure_not_degenerate(posterior: &PosteriorData) -> Result<(), EstimationError> {
    // Samples are finite, so fewer than two distinct values means min == max.
    if posterior.min() == posterior.max() {
        return Err(EstimationError::DegenerateSamples { label: posterior.label().to_string() });
    }
    Ok(())
}

#[allow(clippy::as_conversions)]
fn as_f64(value: usize) -> f64 {
    value as f64
}
