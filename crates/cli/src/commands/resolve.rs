//! resolve command - Look up the distribution serving a hostname

use cdeploy_aws::{CloudFrontClient, load_sdk_config};
use cdeploy_core::DistributionResolver;
use clap::Args;
use serde::Serialize;

use super::{AwsArgs, Context};
use crate::exit_code::ExitCode;

/// Arguments for the `resolve` command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Alternate domain name (CNAME) of the distribution
    pub alias: String,

    #[command(flatten)]
    pub aws: AwsArgs,
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    alias: &'a str,
    distribution_id: &'a str,
}

/// Execute the resolve command
pub async fn execute(args: ResolveArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let sdk_config = load_sdk_config(&args.aws.settings(&ctx.config)).await;
    let cdn = CloudFrontClient::new(&sdk_config);

    match DistributionResolver::new(&cdn)
        .resolve_by_alias(&args.alias)
        .await
    {
        Ok(id) => {
            if formatter.is_json() {
                formatter.json(&ResolveOutput {
                    alias: &args.alias,
                    distribution_id: &id,
                });
            } else {
                formatter.println(&id);
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from_error(&e)
        }
    }
}
