//! Trial-budgeted search driver

use crate::error::{Result, TuneError};
use crate::search::sampler::{RandomSampler, Sampler};
use crate::search::space::{Assignment, SearchSpace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Configuration for a search run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of trials to run
    pub n_trials: usize,
    /// Random seed; same seed reproduces the same trial sequence
    pub seed: Option<u64>,
    /// Worker threads for trial evaluation; 1 = sequential
    pub n_jobs: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            n_trials: 50,
            seed: Some(42),
            n_jobs: 1,
        }
    }
}

impl SearchConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the trial budget
    pub fn with_n_trials(mut self, n: usize) -> Self {
        self.n_trials = n;
        self
    }

    /// Builder method to set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method to enable parallel trial evaluation
    pub fn with_n_jobs(mut self, n: usize) -> Self {
        self.n_jobs = n;
        self
    }
}

/// JSON mapping for trial scores. serde_json writes non-finite floats
/// as `null`, which cannot be read back as `f64`; failed trials carry
/// `f64::INFINITY`, so their scores are stored as strings instead.
mod score_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if score.is_finite() {
            serializer.serialize_f64(*score)
        } else if score.is_nan() {
            serializer.serialize_str("nan")
        } else if *score > 0.0 {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(f64),
            Text(String),
            // Files written before scores were stringified hold null
            Null,
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(v) => Ok(v),
            Raw::Text(t) => match t.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(serde::de::Error::custom(format!(
                    "invalid score value: {:?}",
                    other
                ))),
            },
            Raw::Null => Ok(f64::INFINITY),
        }
    }
}

/// Outcome of a single trial: the proposed assignment paired with its
/// score. Failed trials carry an infinite score and the `failed` flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Trial number, 0-based in proposal order
    pub trial_id: usize,
    /// The assignment that was evaluated
    pub assignment: Assignment,
    /// Objective value (mean squared error); infinite when failed
    #[serde(with = "score_serde")]
    pub score: f64,
    /// Whether the objective failed for this assignment
    pub failed: bool,
    /// Trial duration in seconds
    pub duration_secs: f64,
}

/// Full history of a search run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Study {
    /// All trial records, in proposal order
    pub trials: Vec<TrialRecord>,
    /// Index of the best successful trial
    pub best_trial_idx: Option<usize>,
    /// Total wall-clock duration
    pub total_duration_secs: f64,
}

impl Study {
    /// Create an empty study
    pub fn new() -> Self {
        Self {
            trials: Vec::new(),
            best_trial_idx: None,
            total_duration_secs: 0.0,
        }
    }

    /// Get the best trial. Tolerates an out-of-range index, which a
    /// hand-edited study file can carry through `load`.
    pub fn best_trial(&self) -> Option<&TrialRecord> {
        self.best_trial_idx.and_then(|idx| self.trials.get(idx))
    }

    /// Get the best score
    pub fn best_score(&self) -> Option<f64> {
        self.best_trial().map(|t| t.score)
    }

    /// Get the best assignment
    pub fn best_assignment(&self) -> Option<Assignment> {
        self.best_trial().map(|t| t.assignment)
    }

    /// Number of failed trials
    pub fn n_failed(&self) -> usize {
        self.trials.iter().filter(|t| t.failed).count()
    }

    /// Append a trial record, updating the best index on a strictly
    /// lower score. Ties keep the earlier trial.
    pub fn add_trial(&mut self, record: TrialRecord) {
        let idx = self.trials.len();

        let is_better = match self.best_trial_idx {
            None => !record.failed,
            Some(best_idx) => !record.failed && record.score < self.trials[best_idx].score,
        };
        if is_better {
            self.best_trial_idx = Some(idx);
        }

        self.trials.push(record);
    }

    /// Save the study as JSON
    pub fn save(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a study from JSON
    pub fn load(path: &str) -> Result<Study> {
        let json = std::fs::read_to_string(path)?;
        let study: Study = serde_json::from_str(&json)?;
        Ok(study)
    }
}

impl Default for Study {
    fn default() -> Self {
        Self::new()
    }
}

/// Randomized hyperparameter search driver.
///
/// Proposes assignments from the search space, evaluates them through a
/// caller-supplied objective, and records every outcome. Runs exactly
/// `n_trials` trials; a failing trial is recorded with an infinite score
/// and never aborts the search.
pub struct SearchDriver {
    config: SearchConfig,
    space: SearchSpace,
    sampler: Box<dyn Sampler>,
    study: Study,
}

impl SearchDriver {
    /// Create a driver with the default random sampler
    pub fn new(config: SearchConfig, space: SearchSpace) -> Result<Self> {
        if config.n_trials == 0 {
            return Err(TuneError::Config(
                "n_trials must be at least 1".to_string(),
            ));
        }
        space.validate()?;

        let sampler = Box::new(RandomSampler::new(config.seed));
        Ok(Self {
            config,
            space,
            sampler,
            study: Study::new(),
        })
    }

    /// Replace the sampling strategy
    pub fn with_sampler(mut self, sampler: Box<dyn Sampler>) -> Self {
        self.sampler = sampler;
        self
    }

    /// Run the search to completion.
    ///
    /// The objective maps an assignment to a score to minimize. Any
    /// objective error, and any non-finite score, marks that trial
    /// failed; the remaining budget still runs. Fails with
    /// `NoSuccessfulTrial` when every trial failed.
    pub fn run<F>(&mut self, objective: F) -> Result<&Study>
    where
        F: Fn(&Assignment) -> Result<f64> + Sync,
    {
        let start = Instant::now();

        if self.config.n_jobs > 1 {
            self.run_parallel(&objective)?;
        } else {
            self.run_sequential(&objective)?;
        }

        self.study.total_duration_secs = start.elapsed().as_secs_f64();
        info!(
            trials = self.study.trials.len(),
            failed = self.study.n_failed(),
            best_score = self.study.best_score(),
            "search finished"
        );

        if self.study.best_trial_idx.is_none() {
            return Err(TuneError::NoSuccessfulTrial);
        }
        Ok(&self.study)
    }

    fn run_sequential<F>(&mut self, objective: &F) -> Result<()>
    where
        F: Fn(&Assignment) -> Result<f64> + Sync,
    {
        let mut history: Vec<(Assignment, f64)> = Vec::new();

        for trial_id in 0..self.config.n_trials {
            let assignment = self.sampler.sample(&self.space, &history)?;
            let trial_start = Instant::now();
            let outcome = objective(&assignment);
            let record = Self::make_record(
                trial_id,
                assignment,
                outcome,
                trial_start.elapsed().as_secs_f64(),
            );

            if !record.failed {
                history.push((assignment, record.score));
            }
            self.study.add_trial(record);
        }

        Ok(())
    }

    /// Parallel evaluation on a pool of `n_jobs` workers: assignments
    /// are pre-sampled sequentially from the seeded RNG and records are
    /// committed in trial order, so results are identical to a
    /// sequential run for a deterministic objective.
    fn run_parallel<F>(&mut self, objective: &F) -> Result<()>
    where
        F: Fn(&Assignment) -> Result<f64> + Sync,
    {
        let mut assignments = Vec::with_capacity(self.config.n_trials);
        for _ in 0..self.config.n_trials {
            assignments.push(self.sampler.sample(&self.space, &[])?);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.n_jobs)
            .build()
            .map_err(|e| TuneError::Config(format!("thread pool: {}", e)))?;

        let records: Vec<TrialRecord> = pool.install(|| {
            assignments
                .into_par_iter()
                .enumerate()
                .map(|(trial_id, assignment)| {
                    let trial_start = Instant::now();
                    let outcome = objective(&assignment);
                    Self::make_record(
                        trial_id,
                        assignment,
                        outcome,
                        trial_start.elapsed().as_secs_f64(),
                    )
                })
                .collect()
        });

        for record in records {
            self.study.add_trial(record);
        }

        Ok(())
    }

    fn make_record(
        trial_id: usize,
        assignment: Assignment,
        outcome: Result<f64>,
        duration_secs: f64,
    ) -> TrialRecord {
        match outcome {
            // A NaN score would never order below the current best and
            // would vanish from the search; record it as a failure.
            Ok(score) if score.is_finite() => {
                debug!(
                    trial_id,
                    penalty = assignment.penalty,
                    family = %assignment.family,
                    score,
                    "trial complete"
                );
                TrialRecord {
                    trial_id,
                    assignment,
                    score,
                    failed: false,
                    duration_secs,
                }
            }
            Ok(score) => {
                warn!(
                    trial_id,
                    penalty = assignment.penalty,
                    family = %assignment.family,
                    score,
                    "trial produced non-finite score"
                );
                TrialRecord {
                    trial_id,
                    assignment,
                    score: f64::INFINITY,
                    failed: true,
                    duration_secs,
                }
            }
            Err(err) => {
                warn!(
                    trial_id,
                    penalty = assignment.penalty,
                    family = %assignment.family,
                    error = %err,
                    "trial failed"
                );
                TrialRecord {
                    trial_id,
                    assignment,
                    score: f64::INFINITY,
                    failed: true,
                    duration_secs,
                }
            }
        }
    }

    /// The study accumulated so far
    pub fn study(&self) -> &Study {
        &self.study
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glm::Family;

    fn quadratic_objective(a: &Assignment) -> Result<f64> {
        // Minimum at penalty = 1.0
        Ok((a.penalty - 1.0) * (a.penalty - 1.0))
    }

    #[test]
    fn test_driver_rejects_zero_budget() {
        let config = SearchConfig::new().with_n_trials(0);
        assert!(SearchDriver::new(config, SearchSpace::new()).is_err());
    }

    #[test]
    fn test_exact_trial_count() {
        for n in [1, 2, 17] {
            let config = SearchConfig::new().with_n_trials(n).with_seed(3);
            let mut driver = SearchDriver::new(config, SearchSpace::new()).unwrap();
            let study = driver.run(quadratic_objective).unwrap();
            assert_eq!(study.trials.len(), n);
        }
    }

    #[test]
    fn test_best_is_minimum_of_successes() {
        let config = SearchConfig::new().with_n_trials(30).with_seed(5);
        let mut driver = SearchDriver::new(config, SearchSpace::new()).unwrap();
        let study = driver.run(quadratic_objective).unwrap();

        let best = study.best_score().unwrap();
        for trial in &study.trials {
            if !trial.failed {
                assert!(best <= trial.score);
            }
        }
    }

    #[test]
    fn test_failed_trials_recorded_not_fatal() {
        // Fail every log-family trial
        let objective = |a: &Assignment| -> Result<f64> {
            match a.family {
                Family::Log => Err(TuneError::FitFailure("synthetic failure".to_string())),
                Family::Identity => Ok(a.penalty),
            }
        };

        let config = SearchConfig::new().with_n_trials(40).with_seed(9);
        let mut driver = SearchDriver::new(config, SearchSpace::new()).unwrap();
        let study = driver.run(objective).unwrap();

        assert_eq!(study.trials.len(), 40);
        assert!(study.n_failed() > 0, "seed 9 should sample the log family");
        for trial in &study.trials {
            if trial.failed {
                assert_eq!(trial.score, f64::INFINITY);
            }
        }
        let best = study.best_trial().unwrap();
        assert!(!best.failed);
        assert_eq!(best.assignment.family, Family::Identity);
    }

    #[test]
    fn test_all_failures_is_an_error() {
        let objective =
            |_: &Assignment| -> Result<f64> { Err(TuneError::FitFailure("always".to_string())) };

        let config = SearchConfig::new().with_n_trials(5).with_seed(1);
        let mut driver = SearchDriver::new(config, SearchSpace::new()).unwrap();
        let result = driver.run(objective);
        assert!(matches!(result, Err(TuneError::NoSuccessfulTrial)));
        // History is still retained
        assert_eq!(driver.study().trials.len(), 5);
    }

    #[test]
    fn test_nan_score_treated_as_failure() {
        let objective = |_: &Assignment| -> Result<f64> { Ok(f64::NAN) };

        let config = SearchConfig::new().with_n_trials(3).with_seed(2);
        let mut driver = SearchDriver::new(config, SearchSpace::new()).unwrap();
        let result = driver.run(objective);
        assert!(matches!(result, Err(TuneError::NoSuccessfulTrial)));
        assert!(driver.study().trials.iter().all(|t| t.failed));
    }

    #[test]
    fn test_seeded_runs_identical() {
        let run = || {
            let config = SearchConfig::new().with_n_trials(25).with_seed(77);
            let mut driver = SearchDriver::new(config, SearchSpace::new()).unwrap();
            driver.run(quadratic_objective).unwrap().clone()
        };

        let a = run();
        let b = run();
        assert_eq!(a.best_trial_idx, b.best_trial_idx);
        for (ta, tb) in a.trials.iter().zip(b.trials.iter()) {
            assert_eq!(ta.assignment, tb.assignment);
            assert_eq!(ta.score, tb.score);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let seq = {
            let config = SearchConfig::new().with_n_trials(20).with_seed(13);
            let mut driver = SearchDriver::new(config, SearchSpace::new()).unwrap();
            driver.run(quadratic_objective).unwrap().clone()
        };
        let par = {
            let config = SearchConfig::new()
                .with_n_trials(20)
                .with_seed(13)
                .with_n_jobs(4);
            let mut driver = SearchDriver::new(config, SearchSpace::new()).unwrap();
            driver.run(quadratic_objective).unwrap().clone()
        };

        assert_eq!(seq.best_trial_idx, par.best_trial_idx);
        for (ts, tp) in seq.trials.iter().zip(par.trials.iter()) {
            assert_eq!(ts.trial_id, tp.trial_id);
            assert_eq!(ts.assignment, tp.assignment);
            assert_eq!(ts.score, tp.score);
        }
    }

    #[test]
    fn test_failed_trial_score_survives_json() {
        let mut study = Study::new();
        study.add_trial(TrialRecord {
            trial_id: 0,
            assignment: Assignment {
                penalty: 0.5,
                family: Family::Identity,
            },
            score: 0.25,
            failed: false,
            duration_secs: 0.01,
        });
        study.add_trial(TrialRecord {
            trial_id: 1,
            assignment: Assignment {
                penalty: 2.0,
                family: Family::Log,
            },
            score: f64::INFINITY,
            failed: true,
            duration_secs: 0.01,
        });

        let json = serde_json::to_string(&study).unwrap();
        let loaded: Study = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.trials.len(), 2);
        assert_eq!(loaded.trials[0].score, 0.25);
        assert_eq!(loaded.trials[1].score, f64::INFINITY);
        assert!(loaded.trials[1].failed);
        assert_eq!(loaded.best_trial_idx, Some(0));
    }

    #[test]
    fn test_legacy_null_score_reads_as_failure_sentinel() {
        // Older study files hold null where a failed trial's score was
        let json = r#"{
            "trials": [{
                "trial_id": 0,
                "assignment": {"penalty": 1.0, "family": "log"},
                "score": null,
                "failed": true,
                "duration_secs": 0.0
            }],
            "best_trial_idx": null,
            "total_duration_secs": 0.0
        }"#;
        let study: Study = serde_json::from_str(json).unwrap();
        assert_eq!(study.trials[0].score, f64::INFINITY);
    }

    #[test]
    fn test_best_trial_tolerates_out_of_range_index() {
        let study = Study {
            trials: Vec::new(),
            best_trial_idx: Some(5),
            total_duration_secs: 0.0,
        };
        assert!(study.best_trial().is_none());
        assert!(study.best_score().is_none());
    }

    #[test]
    fn test_tie_keeps_first_trial() {
        let objective = |_: &Assignment| -> Result<f64> { Ok(1.0) };

        let config = SearchConfig::new().with_n_trials(10).with_seed(4);
        let mut driver = SearchDriver::new(config, SearchSpace::new()).unwrap();
        let study = driver.run(objective).unwrap();
        assert_eq!(study.best_trial_idx, Some(0));
    }
}
