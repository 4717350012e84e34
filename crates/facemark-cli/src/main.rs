use anyhow::{bail, Context, Result};
use clap::Parser;
use facemark_core::backends::Suite;
use facemark_core::verify::CommandVerifier;
use facemark_harness::{BenchmarkOrchestrator, OrchestratorError, RunContext};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

/// Default external verification command; receives
/// `<image_a> <image_b> <detector> <model>` and prints a JSON verdict.
const DEFAULT_VERIFY_COMMAND: &str = "python3 verify_face.py";

#[derive(Parser)]
#[command(name = "facemark", about = "Face recognition benchmarking tool", version)]
struct Cli {
    /// Directory containing one subdirectory of images per identity
    #[arg(long)]
    test_dir: PathBuf,

    /// Directory for benchmark artifacts
    #[arg(long, default_value = "benchmark_results")]
    output_dir: PathBuf,

    /// Detector backends to test (default: the suite's detectors)
    #[arg(long, num_args = 1..)]
    detectors: Option<Vec<String>>,

    /// Recognition models to test (default: the suite's models)
    #[arg(long, num_args = 1..)]
    models: Option<Vec<String>>,

    /// Named suite: full, quick, performance, speed or accuracy
    #[arg(long, default_value = "full")]
    suite: String,

    /// Run the quick 3x3 benchmark (shorthand for --suite quick)
    #[arg(long, conflicts_with = "suite")]
    quick: bool,

    /// External verification command line
    #[arg(long, default_value = DEFAULT_VERIFY_COMMAND)]
    verify_command: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        match err.downcast_ref::<OrchestratorError>() {
            Some(OrchestratorError::Interrupted) => {
                tracing::warn!("benchmark interrupted by user");
            }
            _ => tracing::error!(error = format!("{err:#}"), "benchmark failed"),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if !cli.test_dir.exists() {
        bail!("test directory not found: {}", cli.test_dir.display());
    }

    let suite: Suite = if cli.quick {
        Suite::Quick
    } else {
        cli.suite
            .parse()
            .with_context(|| format!("invalid --suite {}", cli.suite))?
    };

    let detectors: Vec<String> = cli.detectors.unwrap_or_else(|| {
        suite
            .detectors()
            .iter()
            .map(|d| d.as_str().to_string())
            .collect()
    });
    let models: Vec<String> = cli.models.unwrap_or_else(|| {
        suite
            .models()
            .iter()
            .map(|m| m.as_str().to_string())
            .collect()
    });

    tracing::info!(
        test_dir = %cli.test_dir.display(),
        output_dir = %cli.output_dir.display(),
        detectors = detectors.len(),
        models = models.len(),
        "starting benchmark"
    );

    let context = RunContext::new(&cli.output_dir)?;

    let interrupt = context.interrupt_flag();
    ctrlc::set_handler(move || {
        interrupt.store(true, Ordering::SeqCst);
    })
    .context("failed to install interrupt handler")?;

    let mut verifier = CommandVerifier::from_command_line(&cli.verify_command)
        .context("invalid --verify-command")?;

    let mut orchestrator = BenchmarkOrchestrator::new(&context, &mut verifier);
    let run = orchestrator.run(&detectors, &models, &cli.test_dir)?;

    tracing::info!(
        scored = run.results.len(),
        failed = run.failures.len(),
        output_dir = %cli.output_dir.display(),
        "benchmark completed successfully"
    );
    Ok(())
}
