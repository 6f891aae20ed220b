mod app;
mod error;
mod model;
mod platform;
mod provision;
mod resolver;
mod sequencer;

use std::process::ExitCode;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use app::App;
use model::config::AppConfig;
use sequencer::ExitSignal;

fn main() -> ExitCode {
    // Initialize logging to file (stdout is for progress lines)
    let log_dir = directories::ProjectDirs::from("", "", "winstrap")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("winstrap"));
    let _guard = match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let file_appender = tracing_appender::rolling::daily(&log_dir, "winstrap.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_env_filter(
                    EnvFilter::try_from_env("WINSTRAP_LOG")
                        .unwrap_or_else(|_| EnvFilter::new("winstrap=info")),
                )
                .init();
            Some(guard)
        }
        Err(err) => {
            eprintln!("winstrap: logging disabled ({}: {err})", log_dir.display());
            None
        }
    };

    tracing::info!("winstrap starting");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("winstrap error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = AppConfig::load()?;
    let app = App::new(config);

    let outcome = app.run()?;

    match &outcome.signal {
        ExitSignal::Relaunched(receipt) => println!(
            "requested elevated launch via {} ({}); continuing in the new window",
            receipt.host.program(),
            receipt.script.display()
        ),
        ExitSignal::Executed => println!("payload finished"),
    }
    for warning in outcome.provision.warnings() {
        println!("warning: {warning}");
    }

    tracing::info!(
        fallback = outcome.locator.is_fallback(),
        "run complete (locator: {}, provision: {:?})",
        outcome.locator.url,
        outcome.provision
    );
    Ok(())
}
