//! docsync CLI
//!
//! Downloads files from, and uploads files to, a SharePoint document library.
//!
//! Exit status: `0` on success, `1` when the configuration cannot be loaded
//! or SharePoint cannot be reached, `2` when a transfer fails.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use core_runtime::config::{resolve_config_path, ConfigFile};
use core_runtime::logging::{init_logging, LoggingConfig};
use core_service::{
    CoreError, CoreService, EXIT_CONNECTION_FAILURE, EXIT_SUCCESS, EXIT_TRANSFER_FAILURE,
};
use core_sync::{DownloadSelector, FailurePolicy, TransferReport, UploadFilter};
use std::path::Path;
use tracing::{error, info, warn};

use cli::{Cli, Commands, TransferOptions};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(EXIT_CONNECTION_FAILURE);
    }

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{:#}", e), "docsync failed");
            exit_code(&e)
        }
    };

    std::process::exit(code);
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let mut config = LoggingConfig::default().with_level(cli.log_level);
    if let Some(format) = cli.log_format {
        config = config.with_format(format);
    }
    if let Some(path) = &cli.log_file {
        config = config.with_log_file(path);
    }

    init_logging(config).context("initializing logging")
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<CoreError>()
        .map(CoreError::exit_code)
        .unwrap_or(EXIT_CONNECTION_FAILURE)
}

async fn run(cli: Cli) -> Result<i32> {
    let path = resolve_config_path(cli.config);
    let config = ConfigFile::load(&path)
        .map_err(CoreError::from)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    let core = CoreService::from_config(&config)?;

    match cli.command {
        Commands::Download {
            remote_folder,
            local_dest,
            file,
            pattern,
            options,
        } => {
            let selector = DownloadSelector::from_parts(file.as_deref(), pattern.as_deref())
                .map_err(CoreError::from)?;
            let engine = core.sync_engine(failure_policy(&options));
            let result = engine.download(&remote_folder, &local_dest, &selector).await;

            let title = format!("docsync download {}", remote_folder);
            finish_transfer(&core, &options, &title, result).await
        }
        Commands::Upload {
            local_dir,
            remote_folder,
            pattern,
            options,
        } => {
            let filter = UploadFilter::parse(pattern.as_deref()).map_err(CoreError::from)?;
            let engine = core.sync_engine(failure_policy(&options));
            let result = engine.upload(&local_dir, &remote_folder, &filter).await;

            let title = format!("docsync upload {}", display_name(&local_dir));
            finish_transfer(&core, &options, &title, result).await
        }
        Commands::List { remote_folder } => {
            for file in core.list_remote(&remote_folder).await? {
                println!("{}", file.name);
            }
            Ok(EXIT_SUCCESS)
        }
    }
}

fn failure_policy(options: &TransferOptions) -> FailurePolicy {
    if options.continue_on_error {
        FailurePolicy::ContinueOnFailure
    } else {
        FailurePolicy::AbortOnFirstFailure
    }
}

/// Notify if asked, then turn the batch outcome into an exit status.
async fn finish_transfer(
    core: &CoreService,
    options: &TransferOptions,
    title: &str,
    result: core_sync::Result<TransferReport>,
) -> Result<i32> {
    let message = match &result {
        Ok(report) => describe(report),
        Err(e) => format!("failed: {}", e),
    };

    if options.notify {
        notify(core, title, &message).await;
    }

    let report = result.map_err(CoreError::from)?;
    info!("{}", message);

    if report.is_success() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_TRANSFER_FAILURE)
    }
}

fn describe(report: &TransferReport) -> String {
    let mut message = report.summary();
    for failed in &report.failed {
        message.push_str(&format!("\n{}: {}", failed.name, failed.error));
    }
    message
}

async fn notify(core: &CoreService, title: &str, message: &str) {
    match core.notifier() {
        Some(notifier) => {
            if let Err(e) = notifier.send(title, message).await {
                warn!(error = %e, "Could not post Teams notification");
            }
        }
        None => warn!("--notify given but no MSTeams section is configured"),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
