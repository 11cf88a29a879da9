//! Link-function families for the GLM

use crate::error::TuneError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distributional family of the GLM, identified by its link function.
///
/// A closed set: anything outside it is rejected at the string boundary
/// rather than silently falling through to an unset family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// Identity link: E[y] = Xw + b (Gaussian errors)
    Identity,
    /// Log link: E[y] = exp(Xw + b) (Poisson-style errors)
    Log,
}

impl Family {
    /// Map the linear predictor to the target's expected value
    pub fn inverse_link(&self, eta: f64) -> f64 {
        match self {
            Family::Identity => eta,
            Family::Log => eta.exp(),
        }
    }

    /// Map a mean value back to the linear-predictor scale
    pub fn link(&self, mu: f64) -> f64 {
        match self {
            Family::Identity => mu,
            Family::Log => mu.ln(),
        }
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Identity => "identity",
            Family::Log => "log",
        }
    }

    /// All supported families
    pub fn all() -> &'static [Family] {
        &[Family::Log, Family::Identity]
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Family {
    type Err = TuneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identity" => Ok(Family::Identity),
            "log" => Ok(Family::Log),
            other => Err(TuneError::UnsupportedFamily(other.to_string())),
        }
    }
}
