//! L2-regularized GLM regressor

use crate::error::{Result, TuneError};
use crate::glm::Family;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

// Linear predictor clamp for the log family; exp(30) ~ 1e13 keeps the
// working weights finite without distorting any reasonable fit.
const ETA_CLAMP: f64 = 30.0;

/// Solve the symmetric positive-definite system Ax = b by Cholesky
/// decomposition. Returns None when A is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // A = L L^T
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, i]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Solve Ax = b, retrying with a small diagonal jitter when the plain
/// Cholesky factorization fails on a near-singular system.
fn solve_spd(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    if let Some(x) = cholesky_solve(a, b) {
        return Ok(x);
    }

    let n = a.nrows();
    let mut jittered = a.clone();
    let jitter = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>().max(1.0) / n as f64;
    for i in 0..n {
        jittered[[i, i]] += jitter;
    }

    cholesky_solve(&jittered, b).ok_or_else(|| {
        TuneError::FitFailure("normal-equation matrix is singular".to_string())
    })
}

/// L2-regularized generalized linear model.
///
/// The identity family is fit in closed form (ridge normal equations);
/// the log family by iteratively reweighted least squares. The fit is
/// deterministic: identical inputs produce identical coefficients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlmRegressor {
    /// Link-function family
    pub family: Family,
    /// L2 regularization strength (never applied to the intercept)
    pub penalty: f64,
    /// Whether to fit an intercept
    pub fit_intercept: bool,
    /// Maximum IRLS iterations (log family only)
    pub max_iter: usize,
    /// IRLS convergence tolerance on the coefficient step
    pub tol: f64,
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Whether the model is fitted
    pub is_fitted: bool,
}

impl GlmRegressor {
    /// Create a new regressor for the given family
    pub fn new(family: Family) -> Self {
        Self {
            family,
            penalty: 0.0,
            fit_intercept: true,
            max_iter: 100,
            tol: 1e-8,
            coefficients: None,
            intercept: None,
            is_fitted: false,
        }
    }

    /// Set the L2 regularization strength
    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    /// Enable/disable fitting an intercept
    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Set the maximum IRLS iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Fit the model to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        if x.nrows() != y.len() {
            return Err(TuneError::Shape {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(TuneError::FitFailure("empty training set".to_string()));
        }
        if !self.penalty.is_finite() || self.penalty < 0.0 {
            return Err(TuneError::InvalidAssignment {
                name: "penalty".to_string(),
                value: format!("{}", self.penalty),
                reason: "must be a finite non-negative number".to_string(),
            });
        }

        let (coefficients, intercept) = match self.family {
            Family::Identity => self.fit_identity(x, y)?,
            Family::Log => self.fit_log(x, y)?,
        };

        if coefficients.iter().any(|v| !v.is_finite()) || !intercept.is_finite() {
            return Err(TuneError::FitFailure(
                "fit produced non-finite coefficients".to_string(),
            ));
        }

        self.coefficients = Some(coefficients);
        self.intercept = Some(intercept);
        self.is_fitted = true;

        Ok(self)
    }

    /// Closed-form ridge on centered data
    fn fit_identity(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(Array1<f64>, f64)> {
        let n_features = x.ncols();

        let (x_centered, y_centered, x_mean, y_mean) = if self.fit_intercept {
            let x_mean = x.mean_axis(Axis(0)).ok_or_else(|| {
                TuneError::FitFailure("empty training set".to_string())
            })?;
            let y_mean = y.mean().unwrap_or(0.0);
            let x_centered = x - &x_mean.clone().insert_axis(Axis(0));
            let y_centered = y - y_mean;
            (x_centered, y_centered, Some(x_mean), y_mean)
        } else {
            (x.clone(), y.clone(), None, 0.0)
        };

        // (X^T X + alpha I) w = X^T y
        let mut xtx = x_centered.t().dot(&x_centered);
        for i in 0..n_features {
            xtx[[i, i]] += self.penalty;
        }
        let xty = x_centered.t().dot(&y_centered);

        let coefficients = solve_spd(&xtx, &xty)?;

        let intercept = match x_mean {
            Some(x_mean) => y_mean - coefficients.dot(&x_mean),
            None => 0.0,
        };

        Ok((coefficients, intercept))
    }

    /// IRLS for the log link on an intercept-augmented design.
    /// The intercept column carries no penalty.
    fn fit_log(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(Array1<f64>, f64)> {
        if y.iter().any(|&v| v < 0.0) {
            return Err(TuneError::FitFailure(
                "log family requires non-negative targets".to_string(),
            ));
        }

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let n_cols = n_features + 1;

        // Augmented design [1 | X]
        let mut z = Array2::<f64>::ones((n_samples, n_cols));
        z.slice_mut(ndarray::s![.., 1..]).assign(x);

        // Start at a constant mean on the link scale
        let y_mean = y.mean().unwrap_or(1.0).max(1e-4);
        let mut beta = Array1::<f64>::zeros(n_cols);
        beta[0] = y_mean.ln();

        for _ in 0..self.max_iter {
            let eta = z.dot(&beta).mapv(|v| v.clamp(-ETA_CLAMP, ETA_CLAMP));
            let mu = eta.mapv(f64::exp);

            // Working response and weights for the canonical log link
            let working = &eta + &((y - &mu) / &mu);

            // Z^T W Z + alpha P, with P zero on the intercept
            let mut ztwz = Array2::<f64>::zeros((n_cols, n_cols));
            let mut ztwr = Array1::<f64>::zeros(n_cols);
            for i in 0..n_samples {
                let w = mu[i];
                for a in 0..n_cols {
                    let za = z[[i, a]] * w;
                    ztwr[a] += za * working[i];
                    for b in a..n_cols {
                        ztwz[[a, b]] += za * z[[i, b]];
                    }
                }
            }
            for a in 0..n_cols {
                for b in 0..a {
                    ztwz[[a, b]] = ztwz[[b, a]];
                }
            }
            for i in 1..n_cols {
                ztwz[[i, i]] += self.penalty;
            }

            let beta_new = solve_spd(&ztwz, &ztwr)?;
            if beta_new.iter().any(|v| !v.is_finite()) {
                return Err(TuneError::FitFailure(
                    "IRLS produced non-finite coefficients".to_string(),
                ));
            }

            let step = beta_new
                .iter()
                .zip(beta.iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            beta = beta_new;

            if step < self.tol {
                let intercept = beta[0];
                let coefficients = beta.slice(ndarray::s![1..]).to_owned();
                return Ok((coefficients, intercept));
            }
        }

        Err(TuneError::Convergence {
            iterations: self.max_iter,
        })
    }

    /// Predict expected targets for new inputs
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(TuneError::ModelNotFitted);
        }

        let coefficients = self.coefficients.as_ref().ok_or(TuneError::ModelNotFitted)?;
        if x.ncols() != coefficients.len() {
            return Err(TuneError::Shape {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        let intercept = self.intercept.unwrap_or(0.0);

        let eta = x.dot(coefficients) + intercept;
        let predictions = match self.family {
            Family::Identity => eta,
            Family::Log => eta.mapv(|v| v.clamp(-ETA_CLAMP, ETA_CLAMP).exp()),
        };

        Ok(predictions)
    }
}
