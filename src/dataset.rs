//! Dataset container, train/test splitting, and synthetic data generation

use crate::error::{Result, TuneError};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// A regression dataset: feature matrix plus parallel target vector.
///
/// Immutable once constructed; row counts are validated up front.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature matrix (rows = samples, columns = features)
    pub x: Array2<f64>,
    /// Target vector, one entry per row of `x`
    pub y: Array1<f64>,
}

impl Dataset {
    /// Create a dataset, validating that features and targets are parallel
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(TuneError::Shape {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        Ok(Self { x, y })
    }

    /// Number of samples
    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    /// Number of features
    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}

/// Disjoint train/test partitions of a dataset
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub x_test: Array2<f64>,
    pub y_test: Array1<f64>,
}

impl TrainTestSplit {
    /// Number of training samples
    pub fn n_train(&self) -> usize {
        self.x_train.nrows()
    }

    /// Number of test samples
    pub fn n_test(&self) -> usize {
        self.x_test.nrows()
    }
}

/// Split a dataset into disjoint train and test partitions.
///
/// Rows are shuffled with a seeded RNG, then the first `test_fraction`
/// share becomes the test partition. Every row lands in exactly one
/// partition.
pub fn train_test_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: Option<u64>,
) -> Result<TrainTestSplit> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(TuneError::Config(format!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let n_samples = dataset.n_samples();
    let n_test = ((n_samples as f64) * test_fraction).round() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(TuneError::Config(format!(
            "test_fraction {} leaves an empty partition for {} samples",
            test_fraction, n_samples
        )));
    }

    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut indices: Vec<usize> = (0..n_samples).collect();
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);

    Ok(TrainTestSplit {
        x_train: dataset.x.select(Axis(0), train_idx),
        y_train: dataset.y.select(Axis(0), train_idx),
        x_test: dataset.x.select(Axis(0), test_idx),
        y_test: dataset.y.select(Axis(0), test_idx),
    })
}

/// Generate a synthetic regression dataset with Gaussian noise.
///
/// Features are standard normal; targets are a fixed random linear
/// combination plus noise, shifted so every target is positive and the
/// log family remains fittable on the same data as the identity family.
pub fn make_regression(
    n_samples: usize,
    n_features: usize,
    noise: f64,
    seed: Option<u64>,
) -> Result<Dataset> {
    if n_samples == 0 || n_features == 0 {
        return Err(TuneError::Config(format!(
            "dataset must be non-empty, got {} samples x {} features",
            n_samples, n_features
        )));
    }

    let mut rng = match seed {
        Some(s) => Xoshiro256PlusPlus::seed_from_u64(s),
        None => Xoshiro256PlusPlus::from_entropy(),
    };

    let mut x = Array2::zeros((n_samples, n_features));
    for val in x.iter_mut() {
        *val = sample_standard_normal(&mut rng);
    }

    // Ground-truth coefficients in [-1, 1]
    let coef: Array1<f64> = (0..n_features)
        .map(|_| rng.gen::<f64>() * 2.0 - 1.0)
        .collect();

    let mut y = x.dot(&coef);
    for val in y.iter_mut() {
        *val += noise * sample_standard_normal(&mut rng);
    }

    // Shift targets above zero
    let y_min = y.iter().cloned().fold(f64::INFINITY, f64::min);
    if y_min <= 0.0 {
        y += 1.0 - y_min;
    }

    Dataset::new(x, y)
}

/// Draw a standard normal via the Box-Muller transform
fn sample_standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
