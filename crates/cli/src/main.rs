//! cdeploy - deploy a static site to S3 and invalidate CloudFront
//!
//! Syncs a local directory into a bucket, derives the changed paths from the
//! sync transcript and submits one invalidation for them.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cdeploy::commands::{self, Cli};
use cdeploy::exit_code::ExitCode;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("cdeploy=debug,cdeploy_core=debug,cdeploy_aws=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = tokio::select! {
        code = commands::execute(cli) => code,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted, stopping");
            ExitCode::Interrupted
        }
    };

    std::process::exit(exit_code.as_i32());
}
