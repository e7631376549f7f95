//! deploy command - Sync and invalidate
//!
//! Syncs a local directory into a bucket target, then invalidates the paths the
//! sync reported as changed on the distribution in front of it.

use std::path::PathBuf;

use cdeploy_aws::{AwsCliSync, CloudFrontClient, S3BucketProbe, load_sdk_config};
use cdeploy_core::{
    BatchLimits, BucketProbe as _, BucketTarget, Deployer, DeploymentReport, DeploymentRequest,
    DistributionRef, Error, InvalidationOutcome, InvalidationPath, Result, Site, SiteManager,
    SyncRequest,
};
use clap::Args;

use super::{AwsArgs, Context};
use crate::exit_code::ExitCode;
use crate::output::ProgressBar;

/// Sync a directory and invalidate what changed
#[derive(Args, Debug, Default)]
pub struct DeployArgs {
    /// Named site to deploy (see `cdeploy site`)
    pub site: Option<String>,

    /// Local directory to upload
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Bucket target (s3://bucket[/prefix])
    #[arg(long)]
    pub target: Option<String>,

    /// Distribution id or alias (hostname)
    #[arg(long)]
    pub distribution: Option<String>,

    /// Remove remote objects that no longer exist locally
    #[arg(long)]
    pub delete: bool,

    /// Exclude pattern passed to the sync (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Extra path to invalidate, e.g. "/*" (repeatable)
    #[arg(long = "path", value_name = "PATH")]
    pub paths: Vec<String>,

    /// Report planned changes without uploading or invalidating
    #[arg(long)]
    pub dry_run: bool,

    /// Do not check that the bucket exists before syncing
    #[arg(long)]
    pub skip_bucket_check: bool,

    /// Path count above which a warning is shown (overrides config)
    #[arg(long)]
    pub warn_threshold: Option<usize>,

    /// Maximum paths in one invalidation (overrides config)
    #[arg(long)]
    pub max_paths: Option<usize>,

    /// AWS CLI executable used for the sync
    #[arg(long, default_value = "aws")]
    pub aws_cli: PathBuf,

    #[command(flatten)]
    pub aws: AwsArgs,
}

/// Execute the deploy command
pub async fn execute(args: DeployArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    match run(args, ctx).await {
        Ok(report) => {
            for warning in &report.warnings {
                formatter.warning(&warning.to_string());
            }

            if formatter.is_json() {
                formatter.json(&report);
            } else {
                let summary = render_summary(&report);
                let mut lines = summary.lines();
                if let Some(headline) = lines.next() {
                    formatter.success(headline);
                }
                for line in lines {
                    formatter.println(line);
                }
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from_error(&e)
        }
    }
}

async fn run(args: DeployArgs, ctx: &Context) -> Result<DeploymentReport> {
    let site = match &args.site {
        Some(name) => Some(SiteManager::with_config_manager(ctx.config_manager.clone()).get(name)?),
        None => None,
    };

    let request = build_request(&args, site.as_ref())?;
    if !request.sync.source.is_dir() {
        return Err(Error::InvalidTarget(format!(
            "Source is not a directory: {}",
            request.sync.source.display()
        )));
    }

    let limits = batch_limits(&args, &ctx.config.invalidation);
    let settings = args.aws.settings(&ctx.config);
    let sdk_config = load_sdk_config(&settings).await;

    let bucket = &request.sync.target.bucket;
    if args.skip_bucket_check {
        tracing::debug!(bucket = %bucket, "bucket check skipped");
    } else if !S3BucketProbe::new(&sdk_config).bucket_exists(bucket).await? {
        return Err(Error::BucketNotFound(bucket.clone()));
    }

    let sync = AwsCliSync::new(settings).with_program(&args.aws_cli);
    let cdn = CloudFrontClient::new(&sdk_config);

    let spinner = ProgressBar::spinner(
        &ctx.output,
        &format!(
            "Deploying {} to {}",
            request.sync.source.display(),
            request.sync.target
        ),
    );
    let result = Deployer::new(&sync, &cdn)
        .with_limits(limits)
        .run(request)
        .await;
    spinner.finish_and_clear();

    result
}

/// Combine flags with an optional stored site; flags win
pub fn build_request(args: &DeployArgs, site: Option<&Site>) -> Result<DeploymentRequest> {
    let source = args
        .source
        .clone()
        .or_else(|| site.map(|s| PathBuf::from(&s.source)))
        .ok_or_else(|| missing("source directory", "--source"))?;
    let target = args
        .target
        .as_deref()
        .or(site.map(|s| s.target.as_str()))
        .ok_or_else(|| missing("bucket target", "--target"))?;
    let distribution = args
        .distribution
        .as_deref()
        .or(site.map(|s| s.distribution.as_str()))
        .ok_or_else(|| missing("distribution", "--distribution"))?;

    let mut exclude = site.map(|s| s.exclude.clone()).unwrap_or_default();
    exclude.extend(args.exclude.iter().cloned());

    let extra_paths = args
        .paths
        .iter()
        .map(|p| InvalidationPath::new(p.clone()))
        .collect::<Result<Vec<_>>>()?;

    Ok(DeploymentRequest {
        sync: SyncRequest {
            source,
            target: BucketTarget::parse(target)?,
            delete: args.delete || site.is_some_and(|s| s.delete),
            exclude,
            dry_run: args.dry_run,
        },
        distribution: DistributionRef::parse(distribution)?,
        extra_paths,
    })
}

fn missing(what: &str, flag: &str) -> Error {
    Error::InvalidTarget(format!("No {what} given. Pass {flag} or a site name"))
}

/// Config file limits with command line overrides
pub fn batch_limits(args: &DeployArgs, configured: &BatchLimits) -> BatchLimits {
    BatchLimits {
        warn_threshold: args.warn_threshold.unwrap_or(configured.warn_threshold),
        max_paths: args.max_paths.unwrap_or(configured.max_paths),
    }
}

/// Human-readable report, headline first
pub fn render_summary(report: &DeploymentReport) -> String {
    let count = report.paths.len();
    let dist = &report.distribution_id;

    let mut lines = Vec::new();
    match &report.invalidation {
        InvalidationOutcome::DryRun => {
            lines.push(format!(
                "Dry run: {} planned change(s) for {}",
                report.events, report.target
            ));
            lines.push(format!("Would invalidate {count} path(s) on {dist}:"));
            lines.extend(report.paths.iter().map(|p| format!("  {p}")));
        }
        InvalidationOutcome::Skipped => {
            lines.push(format!(
                "Synced {} change(s) to {}",
                report.events, report.target
            ));
            lines.push("No changed paths, invalidation skipped".to_string());
        }
        InvalidationOutcome::Submitted { id, state } => {
            lines.push(format!(
                "Synced {} change(s) to {}",
                report.events, report.target
            ));
            let state = state
                .as_deref()
                .map(|s| format!(" ({s})"))
                .unwrap_or_default();
            lines.push(format!(
                "Invalidation {id}{state} created on {dist} for {count} path(s)"
            ));
        }
        InvalidationOutcome::SubmittedUnconfirmed => {
            lines.push(format!(
                "Synced {} change(s) to {}",
                report.events, report.target
            ));
            lines.push(format!(
                "Invalidation created on {dist} for {count} path(s), request id unavailable"
            ));
        }
    }
    lines.join("\n")
}
