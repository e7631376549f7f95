//! Shell completion generation
//!
//! Scripts for any shell clap_complete supports, written to stdout.

use clap::CommandFactory;
use clap_complete::{Generator, Shell};

use super::Cli;
use crate::exit_code::ExitCode;

/// Arguments for the completions command
#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Generate shell completions and print to stdout
pub fn execute(args: CompletionsArgs) -> ExitCode {
    let mut cmd = Cli::command();
    print_completions(args.shell, &mut cmd);
    ExitCode::Success
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    clap_complete::generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut std::io::stdout(),
    );
}
