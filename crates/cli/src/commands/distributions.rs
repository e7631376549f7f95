//! distributions command - List distributions and their aliases

use cdeploy_aws::{CloudFrontClient, load_sdk_config};
use cdeploy_core::{CdnControlPlane as _, Distribution};
use clap::Args;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use super::{AwsArgs, Context};
use crate::exit_code::ExitCode;

/// Arguments for the `distributions` command
#[derive(Args, Debug)]
pub struct DistributionsArgs {
    /// Only show distributions serving this alias
    #[arg(long)]
    pub alias: Option<String>,

    #[command(flatten)]
    pub aws: AwsArgs,
}

#[derive(Serialize)]
struct DistributionsOutput<'a> {
    distributions: &'a [Distribution],
}

/// Execute the distributions command
pub async fn execute(args: DistributionsArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let sdk_config = load_sdk_config(&args.aws.settings(&ctx.config)).await;
    let cdn = CloudFrontClient::new(&sdk_config);

    let mut distributions = match cdn.list_distributions().await {
        Ok(list) => list,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };
    if let Some(alias) = &args.alias {
        distributions.retain(|d| d.serves(alias));
    }

    if formatter.is_json() {
        formatter.json(&DistributionsOutput {
            distributions: &distributions,
        });
    } else if distributions.is_empty() {
        formatter.println("No distributions found.");
    } else {
        formatter.println(&render_table(&distributions, formatter.colors_enabled()).to_string());
    }

    ExitCode::Success
}

fn render_table(distributions: &[Distribution], styled: bool) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Domain", "Status", "Aliases"]);
    if !styled {
        table.force_no_tty();
    }

    for d in distributions {
        let status = if d.enabled {
            d.status.clone()
        } else {
            format!("{} (disabled)", d.status)
        };
        table.add_row(vec![
            d.id.clone(),
            d.domain_name.clone(),
            status,
            d.aliases.join("\n"),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table() {
        let mut disabled = Distribution::new("E3OLDDIST0001", &[]);
        disabled.enabled = false;
        disabled.status = "Deployed".into();
        let table = render_table(
            &[
                Distribution::new("E2QWRUHAPOMQZL", &["www.example.com", "example.com"]),
                disabled,
            ],
            false,
        );

        let text = table.to_string();
        assert!(text.contains("E2QWRUHAPOMQZL"));
        assert!(text.contains("www.example.com"));
        assert!(text.contains("Deployed (disabled)"));
        assert_eq!(table.row_count(), 2);
    }
}
