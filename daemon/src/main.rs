//! blinkgate daemon: runs scripted liveness verification sessions.

mod script;

use std::path::PathBuf;
use std::sync::Arc;

use blinkgate_node::{
    init_logging, Callbacks, Orchestrator, VerificationEvent, VerificationOutcome,
    VerificationRequest, VerifierConfig,
};
use blinkgate_types::TrialScope;
use clap::Parser;

use crate::script::SimulationScript;

#[derive(Parser)]
#[command(name = "blinkgate", about = "Blink-based liveness verification")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "BLINKGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Detection period in milliseconds.
    #[arg(long, env = "BLINKGATE_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// Countdown lines shown after the camera is acquired.
    #[arg(long, env = "BLINKGATE_COUNTDOWN_TICKS")]
    countdown_ticks: Option<u32>,

    /// Trials before a tick without a face fails the session.
    #[arg(long, env = "BLINKGATE_MAX_TRIALS")]
    max_trials: Option<u32>,

    /// Blink threshold as a fraction of the baseline eye opening.
    #[arg(long, env = "BLINKGATE_BLINK_RATIO")]
    blink_ratio: Option<f32>,

    /// Trial scope: "cumulative" or "per_session".
    #[arg(long, env = "BLINKGATE_TRIAL_SCOPE")]
    trial_scope: Option<TrialScope>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BLINKGATE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BLINKGATE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run verification sessions against scripted capabilities.
    Simulate {
        /// TOML simulation script.
        #[arg(long)]
        script: PathBuf,

        /// Print Prometheus metrics after the run.
        #[arg(long)]
        metrics: bool,
    },
    /// Print the effective configuration as TOML.
    PrintConfig,
}

/// File config (or defaults) overridden by CLI flags and env vars.
fn load_config(cli: &Cli) -> anyhow::Result<VerifierConfig> {
    let base = match &cli.config {
        Some(path) => VerifierConfig::from_toml_file(path)?,
        None => VerifierConfig::default(),
    };

    let config = VerifierConfig {
        poll_interval_ms: cli.poll_interval_ms.unwrap_or(base.poll_interval_ms),
        countdown_ticks: cli.countdown_ticks.unwrap_or(base.countdown_ticks),
        max_trials: cli.max_trials.unwrap_or(base.max_trials),
        blink_ratio: cli.blink_ratio.unwrap_or(base.blink_ratio),
        trial_scope: cli.trial_scope.unwrap_or(base.trial_scope),
        log_format: cli.log_format.clone().unwrap_or(base.log_format.clone()),
        log_level: cli.log_level.clone().unwrap_or(base.log_level.clone()),
        ..base
    };
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            blinkgate_utils::init_tracing();
            tracing::error!("invalid configuration: {e:#}");
            return Err(e);
        }
    };
    init_logging(config.log_format()?, &config.log_level)?;

    match cli.command {
        Command::PrintConfig => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Simulate { script, metrics } => {
            let script = SimulationScript::from_file(&script)?;
            simulate(config, &script, metrics).await?;
        }
    }

    Ok(())
}

async fn simulate(
    config: VerifierConfig,
    script: &SimulationScript,
    print_metrics: bool,
) -> anyhow::Result<()> {
    let surface = script.surface();
    let mut orchestrator = Orchestrator::new(
        config,
        script.detector(),
        script.camera(),
        script.decoder(),
        Arc::new(surface.clone()),
    )?;

    let mut events = orchestrator.subscribe();
    let event_log = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                VerificationEvent::SessionStarted { trial } => {
                    tracing::info!(trial, "session started")
                }
                VerificationEvent::FaceDetected => tracing::info!("face detected"),
                VerificationEvent::NoDetection { trial } => {
                    tracing::info!(trial, "no face detected")
                }
                VerificationEvent::Verified => tracing::info!("verified"),
                VerificationEvent::Failed { reason } => tracing::info!(?reason, "failed"),
            }
        }
    });

    for session in 1..=script.sessions {
        let started = tokio::time::Instant::now();
        let callbacks = Callbacks::new()
            .on_no_detection(move || tracing::debug!(session, "no-detection callback"));
        let result = orchestrator
            .verify(VerificationRequest::new().with_callbacks(callbacks))
            .await;
        let elapsed = blinkgate_utils::format_millis(started.elapsed().as_millis() as u64);

        match result {
            Ok(VerificationOutcome::Verified(artifacts)) => println!(
                "session {session}: verified in {elapsed} (video {} bytes, still {}x{} png {} bytes, source {})",
                artifacts.video().len(),
                artifacts.image().width,
                artifacts.image().height,
                artifacts.image().bytes.len(),
                artifacts.image().source,
            ),
            Ok(VerificationOutcome::Failed { trials }) => {
                println!("session {session}: failed after {elapsed} (trial {trials})")
            }
            Ok(VerificationOutcome::NotStarted) => {
                println!("session {session}: dismissed before the camera started")
            }
            Err(e) => println!("session {session}: error after {elapsed}: {e}"),
        }
        if let Some(status) = surface.last_status() {
            println!("  status: {status}");
        }
    }

    if print_metrics {
        print!("{}", orchestrator.metrics().encode()?);
    }

    drop(orchestrator);
    let _ = event_log.await;
    Ok(())
}
