//! # MorningPost — daily digest mailer
//!
//! Fetches the day's quote, picture, poem and wallpaper, adds each
//! recipient's local weather, and mails one HTML page per recipient.
//!
//! Usage:
//!   morningpost                          # Run per config (cron or once)
//!   morningpost --config ./mp.toml       # Custom config file
//!   morningpost --preview                # Render once, print, send nothing
//!   morningpost --once                   # Ignore the cron schedule

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use morningpost_core::traits::Notifier;
use morningpost_core::{CycleController, CycleOutcome, MorningPostConfig, RecipientPipeline};
use morningpost_mail::{ConsoleNotifier, SmtpNotifier};
use morningpost_scheduler::Schedule;
use morningpost_sources::HttpFetcher;
use tracing_subscriber::EnvFilter;

const DEFAULT_TEMPLATE: &str = include_str!("../templates/greeting.html");

#[derive(Parser)]
#[command(
    name = "morningpost",
    version,
    about = "☀️ MorningPost — daily digest mailer"
)]
struct Cli {
    /// Config file (default: ~/.morningpost/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Render one message and print it instead of sending
    #[arg(long)]
    preview: bool,

    /// Run a single cycle even if a cron schedule is configured
    #[arg(long)]
    once: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    json: bool,
}

fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

fn init_logging(cli: &Cli) {
    let filter = if cli.verbose {
        "morningpost=debug,morningpost_core=debug,morningpost_sources=debug,morningpost_mail=debug,morningpost_scheduler=debug"
    } else {
        "morningpost=info,morningpost_core=info,morningpost_sources=info,morningpost_mail=info,morningpost_scheduler=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(cli: &Cli) -> Result<MorningPostConfig> {
    let mut config = match &cli.config {
        Some(path) => MorningPostConfig::load_from(&expand_path(path))?,
        None => MorningPostConfig::load()?,
    };
    config.apply_env()?;
    if cli.preview {
        config.force_preview();
    }
    config.validate()?;
    Ok(config)
}

fn load_template(config: &MorningPostConfig) -> Result<Arc<str>> {
    if config.template_path.trim().is_empty() {
        return Ok(Arc::from(DEFAULT_TEMPLATE));
    }
    let path = expand_path(&config.template_path);
    let template = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    tracing::info!("📄 Using template {}", path.display());
    Ok(Arc::from(template))
}

/// Log the outcome; the preview HTML goes to stdout.
fn report(outcome: CycleOutcome) {
    match outcome {
        CycleOutcome::Skipped => {}
        CycleOutcome::Preview(html) => println!("{html}"),
        CycleOutcome::Delivered(report) => {
            for (to, reason) in &report.failed {
                tracing::warn!("⚠️ Not delivered to {to}: {reason}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = load_config(&cli)?;
    let preview = config.mode.is_preview();

    tracing::info!("☀️ MorningPost v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "   Mode: {} | Recipients: {} | Sources: {}",
        if preview { "preview" } else { "production" },
        config.recipients.len(),
        config.sources.enabled.join(", ")
    );

    let http = HttpFetcher::from_config(&config.sources)?;
    let sources = morningpost_sources::build_sources(&config.sources, &http)?;
    let weather = morningpost_sources::weather_source(&http);

    let notifier: Arc<dyn Notifier> = if preview || config.recipients.is_empty() {
        Arc::new(ConsoleNotifier::stdout())
    } else {
        Arc::new(SmtpNotifier::from_config(&config.smtp)?)
    };

    let pipeline = RecipientPipeline::new(load_template(&config)?, weather, notifier)
        .with_max_concurrent(config.delivery.max_concurrent)
        .with_fail_fast(config.delivery.fail_fast);
    let controller =
        CycleController::new(sources, pipeline, config.recipients.clone()).with_preview(preview);

    let schedule = if cli.once || preview {
        None
    } else {
        Schedule::from_config(&config.schedule)?
    };

    match schedule {
        None => report(controller.run_cycle().await?),
        Some(schedule) => {
            let controller = &controller;
            schedule
                .run(move || async move {
                    report(controller.run_cycle().await?);
                    Ok(())
                })
                .await?;
        }
    }
    Ok(())
}
