//! CLI command definitions and execution
//!
//! This module contains all CLI commands and their implementations.
//! Configuration is loaded once here and handed to each command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cdeploy_core::{AwsSettings, Config, ConfigManager};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

pub mod completions;
pub mod deploy;
mod distributions;
mod resolve;
mod site;

/// cdeploy - deploy a local tree to S3 and invalidate CloudFront
///
/// Syncs a directory into a bucket, works out which objects changed from the
/// sync report and invalidates exactly those paths on the distribution.
#[derive(Parser, Debug)]
#[command(name = "cdeploy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinner
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// Directory holding config.toml
    #[arg(long, global = true, env = "CDEPLOY_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync a directory to a bucket and invalidate the changed paths
    Deploy(deploy::DeployArgs),

    /// Print the distribution id serving a hostname
    Resolve(resolve::ResolveArgs),

    /// List distributions and their aliases
    Distributions(distributions::DistributionsArgs),

    /// Manage named deployment sites
    #[command(subcommand)]
    Site(site::SiteCommands),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Provider options shared by commands that talk to AWS
#[derive(Args, Debug, Clone, Default)]
pub struct AwsArgs {
    /// AWS credentials profile (overrides config)
    #[arg(long)]
    pub profile: Option<String>,

    /// AWS region (overrides config)
    #[arg(long)]
    pub region: Option<String>,
}

impl AwsArgs {
    /// Settings to hand to the adapters: flags over config file values
    pub fn settings(&self, config: &Config) -> AwsSettings {
        config
            .aws
            .merged(self.profile.clone(), self.region.clone())
    }
}

/// Loaded configuration plus output settings, shared by commands
pub struct Context {
    pub config_manager: ConfigManager,
    pub config: Config,
    pub output: OutputConfig,
}

impl Context {
    pub fn formatter(&self) -> Formatter {
        Formatter::new(self.output.clone())
    }
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    let command = match cli.command {
        Commands::Completions(args) => return completions::execute(args),
        command => command,
    };

    let formatter = Formatter::new(output_config.clone());
    let config_manager = match cli.config_dir {
        Some(dir) => ConfigManager::in_dir(dir),
        None => match ConfigManager::new() {
            Ok(manager) => manager,
            Err(e) => {
                formatter.error(&e.to_string());
                return ExitCode::from_error(&e);
            }
        },
    };

    let config = match config_manager.load() {
        Ok(config) => config,
        Err(e) => {
            formatter.error(&format!(
                "Failed to load {}: {e}",
                config_manager.config_path().display()
            ));
            return ExitCode::from_error(&e);
        }
    };

    let ctx = Context {
        output: output_config.with_defaults(&config.defaults),
        config_manager,
        config,
    };

    match command {
        Commands::Deploy(args) => deploy::execute(args, &ctx).await,
        Commands::Resolve(args) => resolve::execute(args, &ctx).await,
        Commands::Distributions(args) => distributions::execute(args, &ctx).await,
        Commands::Site(cmd) => site::execute(cmd, &ctx),
        Commands::Completions(args) => completions::execute(args),
    }
}
