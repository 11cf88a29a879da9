//! Randomized hyperparameter search
//!
//! Provides:
//! - Search space over the GLM hyperparameters (penalty + family)
//! - Random sampling behind a `Sampler` trait
//! - The trial-budgeted `SearchDriver` and its `Study` of trial records

mod driver;
mod sampler;
mod space;

pub use driver::{SearchConfig, SearchDriver, Study, TrialRecord};
pub use sampler::{RandomSampler, Sampler};
pub use space::{Assignment, PenaltyRange, SearchSpace};
