//! glmtune CLI module
//!
//! Command-line interface for running a hyperparameter search over a
//! synthetic regression dataset.

use clap::{Parser, Subcommand};

use crate::dataset::{make_regression, train_test_split};
use crate::error::Result;
use crate::objective::GlmObjective;
use crate::search::{SearchConfig, SearchDriver, SearchSpace};

#[derive(Parser)]
#[command(name = "glmtune")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hyperparameter search for regularized GLMs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Tune penalty and family on a synthetic regression dataset
    Tune {
        /// Number of samples to generate
        #[arg(long, default_value = "1000")]
        samples: usize,

        /// Number of features to generate
        #[arg(long, default_value = "10")]
        features: usize,

        /// Noise level of the synthetic targets
        #[arg(long, default_value = "0.5")]
        noise: f64,

        /// Fraction of rows held out for testing
        #[arg(long, default_value = "0.25")]
        test_fraction: f64,

        /// Number of search trials
        #[arg(short = 'n', long, default_value = "50")]
        trials: usize,

        /// Random seed for data, split, and sampling
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Worker threads for trial evaluation (1 = sequential)
        #[arg(short, long, default_value = "1")]
        jobs: usize,

        /// Write the full trial history as JSON
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Run the tune subcommand: generate, split, search, refit, report
#[allow(clippy::too_many_arguments)]
pub fn cmd_tune(
    samples: usize,
    features: usize,
    noise: f64,
    test_fraction: f64,
    trials: usize,
    seed: u64,
    jobs: usize,
    output: Option<&str>,
) -> Result<()> {
    let data = make_regression(samples, features, noise, Some(seed))?;
    let split = train_test_split(&data, test_fraction, Some(seed))?;
    println!(
        "Dataset: {} samples x {} features ({} train / {} test)",
        data.n_samples(),
        data.n_features(),
        split.n_train(),
        split.n_test()
    );

    let objective = GlmObjective::new(&split);
    let config = SearchConfig::new()
        .with_n_trials(trials)
        .with_seed(seed)
        .with_n_jobs(jobs);
    let mut driver = SearchDriver::new(config, SearchSpace::new())?;

    println!("Running {} trials...", trials);
    let run_result = driver.run(|a| objective.evaluate(a));
    let study = match run_result {
        Ok(study) => study,
        Err(err) => {
            if let Some(path) = output {
                driver.study().save(path)?;
            }
            return Err(err);
        }
    };

    println!(
        "Search complete: {} trials, {} failed, {:.3}s",
        study.trials.len(),
        study.n_failed(),
        study.total_duration_secs
    );

    if let Some(best) = study.best_trial() {
        println!(
            "Best trial #{}: penalty={:.6}, family={}, mse={:.6}",
            best.trial_id, best.assignment.penalty, best.assignment.family, best.score
        );

        // Final refit on the winning assignment
        let (_, final_score) = objective.refit(&best.assignment)?;
        println!("Refit score: {:.6}", final_score);
    }

    if let Some(path) = output {
        study.save(path)?;
        println!("Trial history written to {}", path);
    }

    Ok(())
}
