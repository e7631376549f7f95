//! Sync transcript parsing
//!
//! A bulk sync reports each object it changed as one line:
//!
//! ```text
//! upload: ./index.html to s3://bucket/site/index.html
//! copy: s3://bucket/a.css to s3://bucket/site/a.css
//! delete: s3://bucket/site/old.html
//! ```
//!
//! Dry runs put `(dryrun) ` in front of the tag. Every other line is progress or
//! informational output and is skipped. A line that carries a tag but no usable
//! remote locator is an error: dropping it would leave a changed object cached.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::path::{RemoteLocator, S3_SCHEME};

/// Marker the sync tool prints in front of planned operations
const DRYRUN_MARKER: &str = "(dryrun)";

/// Separator between source and destination in upload/copy lines
const TO_SEPARATOR: &str = " to ";

/// Kind of mutation a transcript line reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferOperation {
    Upload,
    Copy,
    Delete,
}

impl TransferOperation {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "upload" => Some(Self::Upload),
            "copy" => Some(Self::Copy),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for TransferOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Upload => "upload",
            Self::Copy => "copy",
            Self::Delete => "delete",
        };
        f.write_str(tag)
    }
}

/// One object the sync created, overwrote or removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub operation: TransferOperation,
    /// Remote object affected by the operation
    pub target: RemoteLocator,
    /// Reported by a dry run, nothing was changed
    pub planned: bool,
}

/// Parse a full transcript into transfer events, lazily and in line order
///
/// Lines are split on `\n` and on `\r`, since progress output rewrites the
/// terminal line with carriage returns. Line numbers in errors are 1-based and
/// count `\n`-separated lines.
///
/// Each line is decoded on its own. A line that is not valid UTF-8 is skipped
/// when it is noise and rejected when it reports a transfer, since its key could
/// not be reproduced exactly.
pub fn parse_transcript(transcript: &[u8]) -> impl Iterator<Item = Result<TransferEvent>> + '_ {
    transcript
        .split(|byte| *byte == b'\n')
        .enumerate()
        .flat_map(|(index, line)| {
            line.split(|byte| *byte == b'\r')
                .map(move |segment| (index + 1, segment))
        })
        .filter_map(|(number, segment)| decode_line(number, segment).transpose())
}

fn decode_line(number: usize, bytes: &[u8]) -> Result<Option<TransferEvent>> {
    match std::str::from_utf8(bytes) {
        Ok(line) => parse_line(number, line),
        Err(_) => {
            let lossy = String::from_utf8_lossy(bytes);
            match split_tag(&lossy) {
                Some(_) => Err(Error::MalformedTranscriptLine {
                    line: number,
                    content: lossy.trim_start().to_string(),
                }),
                None => Ok(None),
            }
        }
    }
}

/// Parse a single transcript line
///
/// Returns `Ok(None)` for lines that do not report a mutation. Only the leading
/// indent is dropped: keys may end in whitespace and are kept as printed.
pub fn parse_line(number: usize, line: &str) -> Result<Option<TransferEvent>> {
    let Some((planned, operation, rest)) = split_tag(line) else {
        return Ok(None);
    };

    let locator = match operation {
        TransferOperation::Upload | TransferOperation::Copy => destination_of(rest),
        TransferOperation::Delete => Some(rest.trim_start()),
    };

    let target = locator
        .and_then(RemoteLocator::parse)
        .ok_or_else(|| Error::MalformedTranscriptLine {
            line: number,
            content: line.trim_start().to_string(),
        })?;

    tracing::debug!(%operation, %target, planned, "transfer event");

    Ok(Some(TransferEvent {
        operation,
        target,
        planned,
    }))
}

/// Dry-run flag, operation and the text after the tag
fn split_tag(line: &str) -> Option<(bool, TransferOperation, &str)> {
    let line = line.trim_start();
    let (planned, body) = match line.strip_prefix(DRYRUN_MARKER) {
        Some(rest) => (true, rest.trim_start()),
        None => (false, line),
    };

    let (tag, rest) = body.split_once(':')?;
    let operation = TransferOperation::from_tag(tag)?;
    Some((planned, operation, rest))
}

/// Remote destination of an upload/copy line: the locator after `" to "`
fn destination_of(rest: &str) -> Option<&str> {
    let needle = format!("{TO_SEPARATOR}{S3_SCHEME}");
    rest.find(&needle)
        .map(|index| &rest[index + TO_SEPARATOR.len()..])
}
