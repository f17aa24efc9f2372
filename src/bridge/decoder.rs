use super::channel::ResultChannel;
use crate::core::{ComputationResult, ResultDocument};

/// Why a finished engine run yielded no usable document.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeFailure {
    /// Nothing in the channel and nothing parseable on stdout.
    Missing { stdout: String },
    /// A document was found but could not be parsed.
    Malformed { message: String, raw: String },
}

/// Decode the result of a completed engine run.
///
/// The channel file is the primary source. When the engine never wrote it,
/// standard output is searched for a JSON document instead. The channel is
/// released on every path.
pub async fn decode(
    channel: &mut ResultChannel,
    stdout: &[u8],
) -> Result<ComputationResult, DecodeFailure> {
    let contents = channel.take_contents().await;
    match contents {
        Ok(Some(bytes)) => parse_document(&bytes).map(ComputationResult::from),
        Ok(None) => {
            log::debug!(
                "Result channel {} was never written, falling back to stdout",
                channel.path().display()
            );
            decode_stdout(stdout)
        }
        Err(e) => Err(DecodeFailure::Malformed {
            message: format!("failed to read result channel: {}", e),
            raw: String::new(),
        }),
    }
}

/// Parse one result document.
pub fn parse_document(bytes: &[u8]) -> Result<ResultDocument, DecodeFailure> {
    serde_json::from_slice(bytes).map_err(|e| DecodeFailure::Malformed {
        message: e.to_string(),
        raw: String::from_utf8_lossy(bytes).into_owned(),
    })
}

/// Degraded path: stdout may hold the document alongside progress chatter.
///
/// The whole output is tried first, then each line that looks like a JSON
/// object, newest first.
pub fn decode_stdout(stdout: &[u8]) -> Result<ComputationResult, DecodeFailure> {
    let text = String::from_utf8_lossy(stdout);
    let trimmed = text.trim();

    if trimmed.starts_with('{') {
        if let Ok(document) = serde_json::from_str::<ResultDocument>(trimmed) {
            return Ok(document.into());
        }
    }

    let candidate = trimmed
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .find_map(|line| serde_json::from_str::<ResultDocument>(line).ok());

    match candidate {
        Some(document) => Ok(document.into()),
        None => Err(DecodeFailure::Missing {
            stdout: trimmed.to_string(),
        }),
    }
}
