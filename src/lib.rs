//! glmtune - Hyperparameter search for regularized GLMs
//!
//! This crate tunes the hyperparameters of an L2-regularized
//! generalized linear model (penalty strength and link-function family)
//! by randomized, trial-budgeted search:
//!
//! - [`dataset`] - Dataset container, train/test splitting, synthetic data
//! - [`glm`] - Link families and the `GlmRegressor` model fitter
//! - [`metrics`] - Mean squared error evaluator
//! - [`search`] - Search space, samplers, and the trial-budgeted driver
//! - [`objective`] - Objective binding a data split to the fitter
//!
//! # Example
//!
//! ```no_run
//! use glmtune::prelude::*;
//!
//! # fn main() -> glmtune::Result<()> {
//! let data = make_regression(1000, 10, 0.5, Some(42))?;
//! let split = train_test_split(&data, 0.25, Some(42))?;
//! let objective = GlmObjective::new(&split);
//!
//! let config = SearchConfig::new().with_n_trials(50).with_seed(42);
//! let mut driver = SearchDriver::new(config, SearchSpace::new())?;
//! let study = driver.run(|a| objective.evaluate(a))?;
//!
//! let best = study.best_trial().expect("at least one successful trial");
//! println!("best: {:?} -> {:.6}", best.assignment, best.score);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod dataset;
pub mod error;
pub mod glm;
pub mod metrics;
pub mod objective;
pub mod search;

pub use error::{Result, TuneError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::dataset::{make_regression, train_test_split, Dataset, TrainTestSplit};
    pub use crate::error::{Result, TuneError};
    pub use crate::glm::{Family, GlmRegressor};
    pub use crate::metrics::mean_squared_error;
    pub use crate::objective::GlmObjective;
    pub use crate::search::{
        Assignment, RandomSampler, Sampler, SearchConfig, SearchDriver, SearchSpace, Study,
        TrialRecord,
    };
}
