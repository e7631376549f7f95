//! Bulk sync through the AWS CLI
//!
//! Runs `aws s3 sync` and hands back its merged output as the transcript. The
//! sync algorithm itself stays opaque; only the exit status and the transcript
//! are interpreted, by cdeploy-core.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use cdeploy_core::{
    AwsSettings, Error, ExternalOperation, Result, SyncOutcome, SyncRequest, SyncRunner,
};
use tokio::process::Command;

/// Default name of the AWS CLI executable
pub const DEFAULT_PROGRAM: &str = "aws";

/// `SyncRunner` backed by `aws s3 sync`
#[derive(Debug, Clone)]
pub struct AwsCliSync {
    program: PathBuf,
    settings: AwsSettings,
}

impl AwsCliSync {
    pub fn new(settings: AwsSettings) -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            settings,
        }
    }

    /// Use a specific AWS CLI executable
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments passed to the AWS CLI for a request
    pub fn command_args(&self, request: &SyncRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "s3".into(),
            "sync".into(),
            request.source.clone().into_os_string(),
            request.target.to_locator().into(),
            "--no-progress".into(),
        ];

        if request.delete {
            args.push("--delete".into());
        }
        for pattern in &request.exclude {
            args.push("--exclude".into());
            args.push(pattern.into());
        }
        if request.dry_run {
            args.push("--dryrun".into());
        }
        if let Some(profile) = &self.settings.profile {
            args.push("--profile".into());
            args.push(profile.into());
        }
        if let Some(region) = &self.settings.region {
            args.push("--region".into());
            args.push(region.into());
        }

        args
    }
}

#[async_trait]
impl SyncRunner for AwsCliSync {
    async fn sync(&self, request: &SyncRequest) -> Result<SyncOutcome> {
        let args = self.command_args(request);
        tracing::debug!(program = %self.program.display(), ?args, "running sync");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                Error::external(
                    ExternalOperation::Sync,
                    format!("failed to launch {}: {e}", self.program.display()),
                )
            })?;

        let transcript = merge_output(&output.stdout, &output.stderr);
        for line in String::from_utf8_lossy(&transcript).lines() {
            tracing::trace!("{line}");
        }

        Ok(SyncOutcome {
            success: output.status.success(),
            status_code: output.status.code(),
            transcript,
        })
    }
}

/// Join stdout and stderr into one transcript, stdout first
///
/// Bytes are kept as the tool wrote them; decoding happens per line in the parser.
fn merge_output(stdout: &[u8], stderr: &[u8]) -> Vec<u8> {
    let mut transcript = stdout.to_vec();
    if !stderr.is_empty() {
        if transcript.last().is_some_and(|byte| *byte != b'\n') {
            transcript.push(b'\n');
        }
        transcript.extend_from_slice(stderr);
    }
    transcript
}
