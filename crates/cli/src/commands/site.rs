//! Site management commands
//!
//! Sites are named deployment recipes stored in the config file, so a deploy
//! can be run as `cdeploy deploy <site>`.

use clap::Subcommand;
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;
use cdeploy_core::{Site, SiteManager};

/// Site subcommands
#[derive(Subcommand, Debug)]
pub enum SiteCommands {
    /// Add or update a site
    Set(SetArgs),

    /// List all configured sites
    List(ListArgs),

    /// Remove a site
    Remove(RemoveArgs),
}

/// Arguments for the `site set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Site name (e.g., "blog", "docs-staging")
    pub name: String,

    /// Local directory to deploy
    pub source: String,

    /// Bucket target (s3://bucket[/prefix])
    pub target: String,

    /// Distribution id or alias
    pub distribution: String,

    /// Remove remote objects missing locally on every deploy
    #[arg(long, default_value = "false")]
    pub delete: bool,

    /// Exclude pattern for the sync (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,
}

/// Arguments for the `site list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show sync options as well
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `site remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the site to remove
    pub name: String,
}

#[derive(Serialize)]
struct SiteListOutput {
    sites: Vec<Site>,
}

#[derive(Serialize)]
struct SiteOperationOutput {
    success: bool,
    site: String,
    message: String,
}

/// Execute a site subcommand
pub fn execute(cmd: SiteCommands, ctx: &Context) -> ExitCode {
    let manager = SiteManager::with_config_manager(ctx.config_manager.clone());

    match cmd {
        SiteCommands::Set(args) => execute_set(args, &manager, ctx),
        SiteCommands::List(args) => execute_list(args, &manager, ctx),
        SiteCommands::Remove(args) => execute_remove(args, &manager, ctx),
    }
}

fn execute_set(args: SetArgs, manager: &SiteManager, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let mut site = Site::new(&args.name, args.source, args.target, args.distribution);
    site.delete = args.delete;
    site.exclude = args.exclude;

    let existed = match manager.exists(&args.name) {
        Ok(existed) => existed,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };
    if let Err(e) = manager.set(site) {
        formatter.error(&e.to_string());
        return ExitCode::from_error(&e);
    }

    let message = if existed {
        format!("Site '{}' updated", args.name)
    } else {
        format!("Site '{}' added", args.name)
    };

    if formatter.is_json() {
        formatter.json(&SiteOperationOutput {
            success: true,
            site: args.name,
            message,
        });
    } else {
        formatter.success(&message);
    }
    ExitCode::Success
}

fn execute_list(args: ListArgs, manager: &SiteManager, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let sites = match manager.list() {
        Ok(sites) => sites,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&SiteListOutput { sites });
        return ExitCode::Success;
    }

    if sites.is_empty() {
        formatter.println("No sites configured.");
        return ExitCode::Success;
    }

    for site in &sites {
        formatter.println(&format!(
            "{:<12} {} -> {} ({})",
            site.name, site.source, site.target, site.distribution
        ));
        if args.long {
            let mut options = Vec::new();
            if site.delete {
                options.push("--delete".to_string());
            }
            options.extend(site.exclude.iter().map(|p| format!("--exclude {p}")));
            if !options.is_empty() {
                formatter.println(&format!("{:<12} {}", "", options.join(" ")));
            }
        }
    }
    ExitCode::Success
}

fn execute_remove(args: RemoveArgs, manager: &SiteManager, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    if let Err(e) = manager.remove(&args.name) {
        formatter.error(&e.to_string());
        return ExitCode::from_error(&e);
    }

    let message = format!("Site '{}' removed", args.name);
    if formatter.is_json() {
        formatter.json(&SiteOperationOutput {
            success: true,
            site: args.name,
            message,
        });
    } else {
        formatter.success(&message);
    }
    ExitCode::Success
}
