//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use core_runtime::config::CONFIG_PATH_ENV;
use core_runtime::logging::{LogFormat, LogLevel};
use std::path::PathBuf;

/// Synchronize files between a local directory and a SharePoint document library
#[derive(Parser, Debug)]
#[command(name = "docsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file [default: config/config.json]
    #[arg(long, global = true, env = CONFIG_PATH_ENV)]
    pub config: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", value_parser = parse_level)]
    pub log_level: LogLevel,

    /// Console log format (pretty, json, compact)
    #[arg(long, global = true, value_parser = parse_format)]
    pub log_format: Option<LogFormat>,

    /// Also append logs to this file; its directory must exist
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Download files from a library folder into an existing local directory
    ///
    /// Examples:
    ///   docsync download Tableau/Workbooks ./workbooks --pattern PrEP
    ///   docsync download Extracts ./data --file monthly.csv
    Download {
        /// Library folder, e.g. "Tableau/Workbooks"
        remote_folder: String,

        /// Existing local directory
        local_dest: PathBuf,

        /// Download exactly this file; takes precedence over --pattern
        #[arg(long)]
        file: Option<String>,

        /// Download files whose name contains a match for this regex
        #[arg(long)]
        pattern: Option<String>,

        #[command(flatten)]
        options: TransferOptions,
    },

    /// Upload regular files from a local directory into an existing library folder
    ///
    /// Examples:
    ///   docsync upload ./logs logs --pattern main.log
    ///   docsync upload ./extracts Extracts --pattern None
    Upload {
        /// Local directory; sub-directories are not uploaded
        local_dir: PathBuf,

        /// Existing library folder
        remote_folder: String,

        /// Upload files whose name contains a match for this regex ("None" uploads all)
        #[arg(long)]
        pattern: Option<String>,

        #[command(flatten)]
        options: TransferOptions,
    },

    /// Print the names of the files in a library folder
    List {
        /// Library folder
        remote_folder: String,
    },
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    /// Keep going after a file fails and report every failure at the end
    #[arg(long)]
    pub continue_on_error: bool,

    /// Post a summary to the configured Teams channel
    #[arg(long)]
    pub notify: bool,
}

fn parse_level(value: &str) -> Result<LogLevel, String> {
    LogLevel::parse(value).ok_or_else(|| format!("unknown log level '{}'", value))
}

fn parse_format(value: &str) -> Result<LogFormat, String> {
    LogFormat::parse(value).ok_or_else(|| format!("unknown log format '{}'", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_download_args() {
        let cli = Cli::parse_from([
            "docsync",
            "--log-level",
            "debug",
            "download",
            "Tableau/Workbooks",
            "./workbooks",
            "--pattern",
            "PrEP",
            "--continue-on-error",
        ]);

        assert_eq!(cli.log_level, LogLevel::Debug);
        match cli.command {
            Commands::Download {
                remote_folder,
                file,
                pattern,
                options,
                ..
            } => {
                assert_eq!(remote_folder, "Tableau/Workbooks");
                assert_eq!(file, None);
                assert_eq!(pattern.as_deref(), Some("PrEP"));
                assert!(options.continue_on_error);
                assert!(!options.notify);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_upload_none_pattern_passes_through() {
        let cli = Cli::parse_from(["docsync", "upload", "./logs", "logs", "--pattern", "None"]);

        assert!(matches!(
            cli.command,
            Commands::Upload { ref pattern, .. } if pattern.as_deref() == Some("None")
        ));
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(Cli::try_parse_from(["docsync", "--log-level", "loud", "list", "x"]).is_err());
    }
}
