//! Hyperparameter search space and assignments

use crate::error::{Result, TuneError};
use crate::glm::Family;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One candidate hyperparameter assignment: a concrete penalty and
/// family. Created fresh per trial, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// L2 regularization strength
    pub penalty: f64,
    /// Link-function family
    pub family: Family,
}

/// Sampling range for the continuous penalty hyperparameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyRange {
    pub low: f64,
    pub high: f64,
    /// Sample uniformly in log-space, then exponentiate. Penalty effects
    /// are multiplicative across orders of magnitude; linear sampling
    /// would spend most of the budget in the large-value regime.
    pub log_scale: bool,
}

impl PenaltyRange {
    fn validate(&self) -> Result<()> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low >= self.high {
            return Err(TuneError::InvalidAssignment {
                name: "penalty".to_string(),
                value: format!("[{}, {}]", self.low, self.high),
                reason: "range bounds must be finite with low < high".to_string(),
            });
        }
        if self.log_scale && self.low <= 0.0 {
            return Err(TuneError::InvalidAssignment {
                name: "penalty".to_string(),
                value: format!("{}", self.low),
                reason: "log-scale sampling requires a positive lower bound".to_string(),
            });
        }
        if self.low < 0.0 {
            return Err(TuneError::InvalidAssignment {
                name: "penalty".to_string(),
                value: format!("{}", self.low),
                reason: "penalty must be non-negative".to_string(),
            });
        }
        Ok(())
    }

    fn sample(&self, rng: &mut impl Rng) -> f64 {
        if self.log_scale {
            let log_low = self.low.ln();
            let log_high = self.high.ln();
            (rng.gen::<f64>() * (log_high - log_low) + log_low).exp()
        } else {
            rng.gen::<f64>() * (self.high - self.low) + self.low
        }
    }

    fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.low && value <= self.high
    }
}

/// Search space: penalty range plus the candidate family set.
///
/// Validated at construction so sampled assignments are in-domain by
/// construction; `sample` re-checks defensively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSpace {
    penalty: PenaltyRange,
    families: Vec<Family>,
}

impl SearchSpace {
    /// Default space: penalty log-uniform over [1e-4, 10.0], both families
    pub fn new() -> Self {
        Self {
            penalty: PenaltyRange {
                low: 1e-4,
                high: 10.0,
                log_scale: true,
            },
            families: Family::all().to_vec(),
        }
    }

    /// Set a log-uniform penalty range
    pub fn with_log_penalty(mut self, low: f64, high: f64) -> Self {
        self.penalty = PenaltyRange {
            low,
            high,
            log_scale: true,
        };
        self
    }

    /// Set a linear-uniform penalty range
    pub fn with_linear_penalty(mut self, low: f64, high: f64) -> Self {
        self.penalty = PenaltyRange {
            low,
            high,
            log_scale: false,
        };
        self
    }

    /// Restrict the candidate family set
    pub fn with_families(mut self, families: &[Family]) -> Self {
        self.families = families.to_vec();
        self
    }

    /// Validate ranges and candidate sets
    pub fn validate(&self) -> Result<()> {
        self.penalty.validate()?;
        if self.families.is_empty() {
            return Err(TuneError::InvalidAssignment {
                name: "family".to_string(),
                value: "[]".to_string(),
                reason: "candidate set must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Penalty sampling range
    pub fn penalty(&self) -> &PenaltyRange {
        &self.penalty
    }

    /// Candidate families
    pub fn families(&self) -> &[Family] {
        &self.families
    }

    /// Sample a fresh assignment. Draw order is fixed (penalty, then
    /// family) so a seeded RNG reproduces the same sequence.
    pub fn sample(&self, rng: &mut impl Rng) -> Result<Assignment> {
        let penalty = self.penalty.sample(rng);
        let family = self.families[rng.gen_range(0..self.families.len())];

        // Should hold by construction; checked anyway
        if !self.penalty.contains(penalty) {
            return Err(TuneError::InvalidAssignment {
                name: "penalty".to_string(),
                value: format!("{}", penalty),
                reason: format!(
                    "outside declared range [{}, {}]",
                    self.penalty.low, self.penalty.high
                ),
            });
        }

        Ok(Assignment { penalty, family })
    }
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self::new()
    }
}
