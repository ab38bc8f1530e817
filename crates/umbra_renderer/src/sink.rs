//! Per-pixel output accumulators.
//!
//! The render driver feeds every traced sample to each requested sink and
//! asks it for the final pixel value once the pixel sampler is done.

use std::fmt;
use std::str::FromStr;

use umbra_core::Color;
use umbra_math::Ray;

use crate::error::RenderError;
use crate::sampler::PixelSampler;

/// Receives the samples of one pixel at a time.
pub trait PixelSink: Send {
    /// Reset state for pixel (i, j).
    fn start_pixel(&mut self, i: u32, j: u32);

    /// Accumulate one traced sample.
    fn process_sample(&mut self, ray: &Ray, colour: Color);

    /// Produce the output value for the current pixel.
    fn finish_pixel(&mut self, sampler: &PixelSampler<'_>) -> Color;
}

/// Box-filtered average of the sample colours.
#[derive(Debug, Clone, Default)]
pub struct ColourSink {
    sum: Color,
    count: u32,
}

impl ColourSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PixelSink for ColourSink {
    fn start_pixel(&mut self, _i: u32, _j: u32) {
        self.sum = Color::ZERO;
        self.count = 0;
    }

    fn process_sample(&mut self, _ray: &Ray, colour: Color) {
        self.sum += colour;
        self.count += 1;
    }

    fn finish_pixel(&mut self, _sampler: &PixelSampler<'_>) -> Color {
        if self.count == 0 {
            return Color::ZERO;
        }
        self.sum / self.count as f32
    }
}

/// Visualises how much of the sample budget each pixel used:
/// blue for few samples, red for the full budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct DensitySink;

impl PixelSink for DensitySink {
    fn start_pixel(&mut self, _i: u32, _j: u32) {}

    fn process_sample(&mut self, _ray: &Ray, _colour: Color) {}

    fn finish_pixel(&mut self, sampler: &PixelSampler<'_>) -> Color {
        let d = sampler.sampling_density().clamp(0.0, 1.0);
        Color::new(d, 0.0, 1.0 - d)
    }
}

/// The outputs a render can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputKind {
    /// Averaged radiance
    Colour,
    /// Sampling density map
    Density,
}

impl OutputKind {
    /// A fresh sink for this output.
    pub fn create_sink(&self) -> Box<dyn PixelSink> {
        match self {
            OutputKind::Colour => Box::new(ColourSink::new()),
            OutputKind::Density => Box::new(DensitySink),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Colour => write!(f, "colour"),
            OutputKind::Density => write!(f, "density"),
        }
    }
}

impl FromStr for OutputKind {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "colour" | "color" => Ok(OutputKind::Colour),
            "density" => Ok(OutputKind::Density),
            _ => Err(RenderError::UnknownOutput(s.to_string())),
        }
    }
}
