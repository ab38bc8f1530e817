//! Error types for the renderer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Unknown sampler kind: {0} (expected 'fixed' or 'adaptive')")]
    UnknownSampler(String),

    #[error("Unknown output kind: {0} (expected 'colour' or 'density')")]
    UnknownOutput(String),

    #[error("Sample budget must be at least 1")]
    ZeroSampleBudget,

    #[error("Adaptive check interval must be at least 1")]
    ZeroCheckInterval,

    #[error("Burn-in of {burn_in} samples exceeds the budget of {budget}")]
    BurnInExceedsBudget { burn_in: u32, budget: u32 },

    #[error("Adaptive tolerance must be positive, got {0}")]
    InvalidTolerance(f64),

    #[error("Camera error: {0}")]
    Camera(String),

    #[error("Thread count must be at least 1")]
    ZeroThreads,

    #[error("No render outputs requested")]
    NoOutputs,

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Render cancelled")]
    Cancelled,
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;
