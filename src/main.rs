//! glmtune - Main entry point

use clap::Parser;
use glmtune::cli::{cmd_tune, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glmtune=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tune {
            samples,
            features,
            noise,
            test_fraction,
            trials,
            seed,
            jobs,
            output,
        } => {
            cmd_tune(
                samples,
                features,
                noise,
                test_fraction,
                trials,
                seed,
                jobs,
                output.as_deref(),
            )?;
        }
    }

    Ok(())
}
