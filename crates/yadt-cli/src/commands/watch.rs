//! Watch command
//!
//! Usage: yadt watch [FILES...] [--no-status] [--no-meta] [--section <NAME>]...

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Args;
use yadt_core::logging_facility::{init, Profile};
use yadt_core::{ChangeStyle, DiffEngine};
use yadt_engine::{
    run_loop, spawn_sources, ChangeSource, ErrorPolicy, ReaderSource, StopReason,
};

use crate::config::{ColorChoice, Config};

/// How long to wait for producer threads once the loop is done
const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Files with JSON objects, lists or watch events (`-` or none for stdin)
    pub files: Vec<PathBuf>,

    /// Ignore the status section when comparing
    #[arg(long)]
    pub no_status: bool,

    /// Ignore metadata other than name and namespace when comparing
    #[arg(long)]
    pub no_meta: bool,

    /// Top-level section to diff; repeat to diff several (default: spec, status)
    #[arg(long = "section", value_name = "NAME")]
    pub sections: Vec<String>,

    /// Never prefix headers with a timestamp
    #[arg(long)]
    pub no_timestamp: bool,

    /// When to use colors
    #[arg(long, value_enum)]
    pub color: Option<ColorChoice>,

    /// Print scalar changes as one `~ path: old -> new` line
    #[arg(long)]
    pub combined: bool,

    /// Bound of the delivery channel between readers and the differ
    #[arg(long, value_name = "N")]
    pub channel_capacity: Option<usize>,

    /// Stop at the first output or source failure
    #[arg(long, conflicts_with = "keep_going")]
    pub fail_fast: bool,

    /// Report failures and keep watching (default)
    #[arg(long)]
    pub keep_going: bool,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Human-readable debug logs on stderr
    #[arg(long)]
    pub debug: bool,
}

/// Apply command-line flags on top of the file configuration
pub fn merge(mut config: Config, args: &WatchArgs) -> Config {
    if args.no_status {
        config.diff.filter.ignore_status = true;
    }
    if args.no_meta {
        config.diff.filter.ignore_meta = true;
    }
    if !args.sections.is_empty() {
        config.diff.sections = args.sections.clone();
    }
    if args.no_timestamp {
        config.diff.render.show_timestamp = false;
    }
    if args.combined {
        config.diff.render.change_style = ChangeStyle::Combined;
    }
    if let Some(color) = args.color {
        config.color = color;
    }
    if let Some(capacity) = args.channel_capacity {
        config.channel_capacity = capacity.max(1);
    }
    if args.fail_fast {
        config.fail_fast = true;
    }
    if args.keep_going {
        config.fail_fast = false;
    }
    config
}

fn open_sources(files: &[PathBuf]) -> anyhow::Result<Vec<Box<dyn ChangeSource>>> {
    if files.is_empty() {
        return Ok(vec![Box::new(ReaderSource::stdin())]);
    }

    files
        .iter()
        .map(|path| -> anyhow::Result<Box<dyn ChangeSource>> {
            if path.as_os_str() == "-" {
                Ok(Box::new(ReaderSource::stdin()))
            } else {
                Ok(Box::new(ReaderSource::open(path)?))
            }
        })
        .collect()
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, stopping after the current event");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, stopping after the current event");
        }
    }
}

/// Execute watch command
pub fn execute(args: WatchArgs) -> anyhow::Result<()> {
    init(Profile::from_debug_flag(args.debug));

    let file_config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let mut config = merge(file_config, &args);

    config.diff.render.color = config.color.enabled();
    if config.diff.render.color {
        colored::control::set_override(true);
    }

    let sources = open_sources(&args.files)?;
    let policy = if config.fail_fast {
        ErrorPolicy::Abort
    } else {
        ErrorPolicy::Continue
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let result = runtime.block_on(async {
        let mut engine = DiffEngine::new(config.diff.clone(), std::io::stdout());
        let (rx, producers) = spawn_sources(sources, config.channel_capacity);

        let report = run_loop(&mut engine, rx, shutdown_signal(), policy).await;
        tracing::debug!(?report, "watch finished");

        if let Some(err) = report.error {
            bail!(err);
        }
        if report.stop != StopReason::SourcesExhausted {
            producers.abort_all();
            return Ok(());
        }

        let failed: Vec<_> = producers
            .join()
            .await
            .into_iter()
            .filter_map(|exit| exit.result.err())
            .collect();
        for err in &failed {
            eprintln!("Error: {}", err);
        }
        if config.fail_fast && !failed.is_empty() {
            bail!("{} source(s) failed", failed.len());
        }
        Ok(())
    });

    // Readers blocked on stdin never return on their own.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}
