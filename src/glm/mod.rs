//! Regularized generalized linear models
//!
//! Provides the model-fitting side of the search:
//! - Link-function families (identity, log)
//! - `GlmRegressor` with L2 regularization, fit by closed-form ridge
//!   (identity) or IRLS (log)

mod family;
mod model;

pub use family::Family;
pub use model::GlmRegressor;
