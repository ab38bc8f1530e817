//! Per-pixel camera ray sampling.
//!
//! A [`Sampler`] owns the camera geometry and the sampling policy. For every
//! pixel it hands out a [`PixelSampler`], a small state machine that yields
//! jittered camera rays until its policy says stop:
//!
//! ```text
//! while ps.has_next_sample() {
//!     let ray = ps.next_sample(rng);
//!     ps.add_sample(trace(ray));
//! }
//! ```
//!
//! The fixed policy always draws the full budget. The adaptive policy keeps
//! running per-channel statistics and stops once the confidence interval of
//! every channel's mean is tight enough.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use rand::RngCore;
use umbra_core::Color;
use umbra_math::Ray;

use crate::camera::{Camera, Viewport};
use crate::error::{RenderError, RenderResult};

/// Stopping-rule parameters for adaptive sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveConfig {
    /// Samples always drawn before the first convergence check
    pub burn_in: u32,
    /// Convergence is only tested when the sample count is a multiple of this
    pub check_every: u32,
    /// Maximum accepted relative half-width of the confidence interval
    pub tolerance: f64,
    /// z-score of the confidence interval (1.96 for 95%)
    pub critical_value: f64,
    /// Means below this are never considered converged
    pub epsilon: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            burn_in: 64,
            check_every: 64,
            tolerance: 0.05,
            critical_value: 1.96,
            epsilon: 1e-16,
        }
    }
}

impl AdaptiveConfig {
    pub fn with_burn_in(mut self, burn_in: u32) -> Self {
        self.burn_in = burn_in;
        self
    }

    pub fn with_check_every(mut self, check_every: u32) -> Self {
        self.check_every = check_every;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_critical_value(mut self, critical_value: f64) -> Self {
        self.critical_value = critical_value;
        self
    }
}

/// Sampling policy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SamplerKind {
    /// Exactly `samples_per_pixel` samples for every pixel
    #[default]
    Fixed,
    /// Stop early once the pixel has converged
    Adaptive(AdaptiveConfig),
}

impl FromStr for SamplerKind {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" | "random" => Ok(SamplerKind::Fixed),
            "adaptive" => Ok(SamplerKind::Adaptive(AdaptiveConfig::default())),
            _ => Err(RenderError::UnknownSampler(s.to_string())),
        }
    }
}

impl fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplerKind::Fixed => write!(f, "fixed"),
            SamplerKind::Adaptive(_) => write!(f, "adaptive"),
        }
    }
}

/// Sample budget plus policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig {
    /// Maximum samples for any pixel
    pub samples_per_pixel: u32,
    pub kind: SamplerKind,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            kind: SamplerKind::Fixed,
        }
    }
}

impl SamplerConfig {
    pub fn fixed(samples_per_pixel: u32) -> Self {
        Self {
            samples_per_pixel,
            kind: SamplerKind::Fixed,
        }
    }

    pub fn adaptive(samples_per_pixel: u32, adaptive: AdaptiveConfig) -> Self {
        Self {
            samples_per_pixel,
            kind: SamplerKind::Adaptive(adaptive),
        }
    }

    /// Check the configuration for values that would make sampling
    /// meaningless.
    pub fn validate(&self) -> RenderResult<()> {
        if self.samples_per_pixel == 0 {
            return Err(RenderError::ZeroSampleBudget);
        }

        if let SamplerKind::Adaptive(adaptive) = &self.kind {
            if adaptive.check_every == 0 {
                return Err(RenderError::ZeroCheckInterval);
            }
            if adaptive.burn_in > self.samples_per_pixel {
                return Err(RenderError::BurnInExceedsBudget {
                    burn_in: adaptive.burn_in,
                    budget: self.samples_per_pixel,
                });
            }
            if adaptive.tolerance.is_nan() || adaptive.tolerance <= 0.0 {
                return Err(RenderError::InvalidTolerance(adaptive.tolerance));
            }
        }

        Ok(())
    }
}

/// Camera geometry plus a validated sampling policy.
#[derive(Debug, Clone)]
pub struct Sampler {
    viewport: Viewport,
    config: SamplerConfig,
}

impl Sampler {
    pub fn new(viewport: Viewport, config: SamplerConfig) -> RenderResult<Self> {
        config.validate()?;
        Ok(Self { viewport, config })
    }

    /// Validate `camera` and build a sampler over its viewport.
    pub fn from_camera(camera: &Camera, config: SamplerConfig) -> RenderResult<Self> {
        Self::new(camera.viewport()?, config)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn image_width(&self) -> u32 {
        self.viewport.image_width()
    }

    pub fn image_height(&self) -> u32 {
        self.viewport.image_height()
    }

    /// Fresh sampling state for pixel (i, j).
    pub fn pixel_sampler(&self, i: u32, j: u32) -> PixelSampler<'_> {
        PixelSampler {
            sampler: self,
            i,
            j,
            samples: 0,
            sum: DVec3::ZERO,
            sum_sq: DVec3::ZERO,
        }
    }
}

/// Sampling state of a single pixel.
#[derive(Debug, Clone)]
pub struct PixelSampler<'s> {
    sampler: &'s Sampler,
    i: u32,
    j: u32,
    samples: u32,
    /// Per-channel running sum
    sum: DVec3,
    /// Per-channel running sum of squares
    sum_sq: DVec3,
}

impl<'s> PixelSampler<'s> {
    pub fn pixel(&self) -> (u32, u32) {
        (self.i, self.j)
    }

    /// Whether the policy wants another sample.
    pub fn has_next_sample(&self) -> bool {
        if self.samples >= self.max_samples() {
            return false;
        }

        match &self.sampler.config.kind {
            SamplerKind::Fixed => true,
            SamplerKind::Adaptive(adaptive) => !self.has_converged(adaptive),
        }
    }

    /// Draw the next camera ray through this pixel.
    pub fn next_sample(&mut self, rng: &mut dyn RngCore) -> Ray {
        self.samples += 1;
        self.sampler.viewport.get_ray(self.i, self.j, rng)
    }

    /// Report the colour obtained for the last sample.
    pub fn add_sample(&mut self, colour: Color) {
        let c = colour.as_dvec3();
        self.sum += c;
        self.sum_sq += c * c;
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn max_samples(&self) -> u32 {
        self.sampler.config.samples_per_pixel
    }

    /// Fraction of the budget actually used, in `[0, 1]`.
    pub fn sampling_density(&self) -> f32 {
        self.samples as f32 / self.max_samples() as f32
    }

    /// Running mean of the reported colours.
    pub fn mean(&self) -> Option<DVec3> {
        (self.samples > 0).then(|| self.sum / self.samples as f64)
    }

    /// Unbiased running variance of the reported colours.
    pub fn variance(&self) -> Option<DVec3> {
        if self.samples < 2 {
            return None;
        }
        let n = self.samples as f64;
        let var = (self.sum_sq - self.sum * self.sum / n) / (n - 1.0);
        // Cancellation can push a zero variance slightly negative
        Some(var.max(DVec3::ZERO))
    }

    fn has_converged(&self, adaptive: &AdaptiveConfig) -> bool {
        let n = self.samples;
        if n < adaptive.burn_in || n % adaptive.check_every != 0 {
            return false;
        }

        let (Some(mean), Some(variance)) = (self.mean(), self.variance()) else {
            return false;
        };

        let n = n as f64;
        (0..3).all(|c| {
            if mean[c] < adaptive.epsilon {
                return false;
            }
            let relative_error = (variance[c] / n).sqrt() * adaptive.critical_value / mean[c];
            relative_error <= adaptive.tolerance
        })
    }
}
