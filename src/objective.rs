//! Objective function binding a train/test split to the GLM fitter

use crate::dataset::TrainTestSplit;
use crate::error::Result;
use crate::glm::GlmRegressor;
use crate::metrics::mean_squared_error;
use crate::search::Assignment;

/// Maps a hyperparameter assignment to a test-set MSE.
///
/// Each evaluation fits a fresh model; nothing is shared between calls,
/// so the same objective may be evaluated concurrently with distinct
/// assignments.
pub struct GlmObjective<'a> {
    split: &'a TrainTestSplit,
}

impl<'a> GlmObjective<'a> {
    /// Bind an objective to a train/test split
    pub fn new(split: &'a TrainTestSplit) -> Self {
        Self { split }
    }

    /// Fit on the training partition, score on the test partition
    pub fn evaluate(&self, assignment: &Assignment) -> Result<f64> {
        let mut model =
            GlmRegressor::new(assignment.family).with_penalty(assignment.penalty);
        model.fit(&self.split.x_train, &self.split.y_train)?;
        let predictions = model.predict(&self.split.x_test)?;
        mean_squared_error(&self.split.y_test, &predictions)
    }

    /// Refit the model for a final assignment and return it with its
    /// test-set score. Deterministic: reproduces the trial score exactly.
    pub fn refit(&self, assignment: &Assignment) -> Result<(GlmRegressor, f64)> {
        let mut model =
            GlmRegressor::new(assignment.family).with_penalty(assignment.penalty);
        model.fit(&self.split.x_train, &self.split.y_train)?;
        let predictions = model.predict(&self.split.x_test)?;
        let score = mean_squared_error(&self.split.y_test, &predictions)?;
        Ok((model, score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{make_regression, train_test_split};
    use crate::glm::Family;

    #[test]
    fn test_objective_returns_finite_score() {
        let data = make_regression(200, 5, 0.2, Some(21)).unwrap();
        let split = train_test_split(&data, 0.25, Some(21)).unwrap();
        let objective = GlmObjective::new(&split);

        let assignment = Assignment {
            penalty: 1.05,
            family: Family::Identity,
        };
        let score = objective.evaluate(&assignment).unwrap();
        assert!(score.is_finite());
        assert!(score >= 0.0);
    }

    #[test]
    fn test_refit_reproduces_trial_score() {
        let data = make_regression(150, 4, 0.3, Some(8)).unwrap();
        let split = train_test_split(&data, 0.2, Some(8)).unwrap();
        let objective = GlmObjective::new(&split);

        let assignment = Assignment {
            penalty: 0.5,
            family: Family::Identity,
        };
        let trial_score = objective.evaluate(&assignment).unwrap();
        let (_, refit_score) = objective.refit(&assignment).unwrap();
        assert_eq!(trial_score, refit_score);
    }
}
