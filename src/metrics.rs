//! Evaluation metrics

use crate::error::{Result, TuneError};
use ndarray::Array1;

/// Mean squared error between true and predicted targets.
///
/// Non-negative, zero only for a perfect match. Mismatched lengths are
/// an evaluation error rather than a panic.
pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(TuneError::Evaluation(format!(
            "length mismatch: {} true targets vs {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(TuneError::Evaluation("empty target vector".to_string()));
    }

    let sum: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p) * (t - p))
        .sum();

    Ok(sum / y_true.len() as f64)
}
