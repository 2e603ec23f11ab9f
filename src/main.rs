use anyhow::Context;
use clap::Parser;
use dllwatch::config::Cli;
use dllwatch::Config;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli).context("invalid configuration")?;
    let once = config.once;
    let pairs_file = config.pairs_file.clone();

    // Cycles run on this thread; the runtime only provides the sleep and Ctrl-C.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let pending = runtime
        .block_on(dllwatch::commands::watch::run(config))
        .with_context(|| format!("cannot watch pairs from {}", pairs_file.display()))?;

    if once && pending > 0 {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
