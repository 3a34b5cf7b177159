mod cli;
mod error;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use failover_core::Controller;

use crate::cli::{Cli, LogFormat};
use crate::error::{CliError, exit_code};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_format);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
    std::process::exit(exit_code::SUCCESS);
}

fn init_tracing(verbosity: u8, format: LogFormat) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = failover_config::load(cli.config.as_deref())?;
    config.dry_run = cli.dry_run;

    info!(
        appliances = config.appliances().len(),
        mode = if config.appliances().len() == 3 { "3-way" } else { "2-way" },
        "configuration loaded"
    );

    let mut controller = Controller::pihole(&config)?;

    if cli.once {
        controller.run_cycle().await;
        controller.release_sessions().await;
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("signal received, finishing current cycle");
        trigger.cancel();
    });

    controller.run(shutdown).await;
    Ok(())
}

/// Resolve on SIGINT or (on Unix) SIGTERM, whichever comes first.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
                return;
            }
            Err(e) => warn!(error = %e, "cannot listen for SIGTERM, falling back to Ctrl-C only"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
