use super::decoder::DecodeFailure;
use super::supervisor::ProcessOutcome;
use crate::config::ENV_ENGINE;
use crate::core::{ComputationResult, ResultDocument};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for engine invocations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Every way an engine invocation can fail, as seen by callers.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The invocation could not be started
    #[error("Failed to launch engine '{program}' while {stage}: {source}")]
    LaunchFailed {
        program: String,
        stage: LaunchStage,
        #[source]
        source: io::Error,
    },

    /// Engine crashed or was ended by a signal
    #[error("Engine exited abnormally ({}): {stderr_tail}", describe_code(.code))]
    NonZeroExit {
        code: Option<i32>,
        stderr_tail: String,
    },

    /// Engine exceeded the wall-clock limit and was killed
    #[error("Engine timed out after {:.0}s and was terminated", .after.as_secs_f64())]
    Timeout { after: Duration },

    /// Engine exited cleanly but produced nothing parseable
    #[error("Engine exited without producing a result")]
    NoResult { stdout: String },

    /// Engine produced a document that is not valid JSON
    #[error("Failed to parse engine result: {message}")]
    DecodeError { message: String, raw: String },

    /// Engine ran and reported `success: false`
    #[error("{0}")]
    BusinessFailure(String),
}

/// Step of starting an invocation that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchStage {
    /// Encoding the request into the engine argument
    Encode,
    /// Creating the result channel in this directory
    Channel(PathBuf),
    /// Starting the engine process
    Spawn,
}

impl fmt::Display for LaunchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchStage::Encode => write!(f, "encoding the request"),
            LaunchStage::Channel(dir) => {
                write!(f, "creating the result channel in {}", dir.display())
            }
            LaunchStage::Spawn => write!(f, "starting the process"),
        }
    }
}

/// Discriminant of an invocation outcome, including success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    Success,
    LaunchFailed,
    NonZeroExit,
    Timeout,
    NoResult,
    DecodeError,
    BusinessFailure,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 7] = [
        OutcomeKind::Success,
        OutcomeKind::LaunchFailed,
        OutcomeKind::NonZeroExit,
        OutcomeKind::Timeout,
        OutcomeKind::NoResult,
        OutcomeKind::DecodeError,
        OutcomeKind::BusinessFailure,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl BridgeError {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            BridgeError::LaunchFailed { .. } => OutcomeKind::LaunchFailed,
            BridgeError::NonZeroExit { .. } => OutcomeKind::NonZeroExit,
            BridgeError::Timeout { .. } => OutcomeKind::Timeout,
            BridgeError::NoResult { .. } => OutcomeKind::NoResult,
            BridgeError::DecodeError { .. } => OutcomeKind::DecodeError,
            BridgeError::BusinessFailure(_) => OutcomeKind::BusinessFailure,
        }
    }

    /// Only a timeout may succeed on a plain re-run. The bridge itself never
    /// retries; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BridgeError::Timeout { .. })
    }

    /// Operator-facing hint on how to fix the failure, if there is one.
    pub fn remediation(&self) -> Option<String> {
        match self {
            BridgeError::LaunchFailed { program, stage, .. } => Some(match stage {
                LaunchStage::Spawn => format!(
                    "Make sure '{}' is installed and on PATH, or point {} at the engine",
                    program, ENV_ENGINE
                ),
                LaunchStage::Channel(dir) => format!(
                    "Make sure {} is a writable directory, or set channel_dir in the bridge config",
                    dir.display()
                ),
                LaunchStage::Encode => {
                    "Request parameters must be plain numbers, strings or booleans".to_string()
                }
            }),
            BridgeError::Timeout { .. } => {
                Some("The engine may still be warming up; try again".to_string())
            }
            BridgeError::NonZeroExit { .. } => {
                Some("Check the engine's diagnostic output above".to_string())
            }
            BridgeError::NoResult { .. } | BridgeError::DecodeError { .. } => Some(
                "The engine script does not follow the result contract; check its version"
                    .to_string(),
            ),
            BridgeError::BusinessFailure(_) => None,
        }
    }

    /// Message plus remediation, as shown to the operator.
    pub fn user_message(&self) -> String {
        match self.remediation() {
            Some(hint) => format!("{}\n{}", self, hint),
            None => self.to_string(),
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Keep the last `max_lines` non-empty lines of a diagnostic stream.
pub fn tail_lines(bytes: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

/// Map a process outcome, and the decode of its result when the process
/// exited cleanly, onto the caller-facing taxonomy.
pub fn classify(
    program: &str,
    outcome: ProcessOutcome,
    decoded: Option<Result<ComputationResult, DecodeFailure>>,
    stderr_tail_lines: usize,
) -> BridgeResult<ResultDocument> {
    match outcome {
        ProcessOutcome::LaunchFailed(source) => Err(BridgeError::LaunchFailed {
            program: program.to_string(),
            stage: LaunchStage::Spawn,
            source,
        }),
        ProcessOutcome::Lost(e) => Err(BridgeError::NonZeroExit {
            code: None,
            stderr_tail: format!("failed to observe engine exit: {}", e),
        }),
        ProcessOutcome::TimedOut { elapsed } => Err(BridgeError::Timeout { after: elapsed }),
        ProcessOutcome::Exited { code, stderr, .. } if code != Some(0) => {
            Err(BridgeError::NonZeroExit {
                code,
                stderr_tail: tail_lines(&stderr, stderr_tail_lines),
            })
        }
        ProcessOutcome::Exited { stdout, .. } => match decoded {
            Some(Ok(ComputationResult::Success(document))) => Ok(*document),
            Some(Ok(ComputationResult::Failure { message })) => {
                Err(BridgeError::BusinessFailure(message))
            }
            Some(Err(DecodeFailure::Malformed { message, raw })) => {
                Err(BridgeError::DecodeError { message, raw })
            }
            Some(Err(DecodeFailure::Missing { stdout })) => Err(BridgeError::NoResult { stdout }),
            None => Err(BridgeError::NoResult {
                stdout: String::from_utf8_lossy(&stdout).trim().to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exited(code: Option<i32>, stderr: &str) -> ProcessOutcome {
        ProcessOutcome::Exited {
            code,
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_non_zero_exit_ignores_result_document() {
        let decoded = Some(Ok(ComputationResult::Success(Box::default())));
        let err = classify("engine", exited(Some(2), "a\nb\nc\n"), decoded, 2).unwrap_err();

        match err {
            BridgeError::NonZeroExit { code, stderr_tail } => {
                assert_eq!(code, Some(2));
                assert_eq!(stderr_tail, "b\nc");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_signal_exit_has_no_code() {
        let err = classify("engine", exited(None, ""), None, 20).unwrap_err();
        assert!(err.to_string().contains("terminated by signal"));
        assert_eq!(err.kind(), OutcomeKind::NonZeroExit);
    }

    #[test]
    fn test_clean_exit_maps_decode_outcomes() {
        let business = classify(
            "engine",
            exited(Some(0), ""),
            Some(Ok(ComputationResult::Failure { message: "bad rate".into() })),
            20,
        )
        .unwrap_err();
        assert_eq!(business.to_string(), "bad rate");
        assert!(!business.is_retryable());
        assert!(business.remediation().is_none());

        let malformed = classify(
            "engine",
            exited(Some(0), ""),
            Some(Err(DecodeFailure::Malformed {
                message: "EOF".into(),
                raw: "{".into(),
            })),
            20,
        )
        .unwrap_err();
        assert!(matches!(malformed, BridgeError::DecodeError { ref raw, .. } if raw == "{"));

        let missing = classify("engine", exited(Some(0), ""), None, 20).unwrap_err();
        assert_eq!(missing.kind(), OutcomeKind::NoResult);
    }

    #[test]
    fn test_launch_failure_has_remediation() {
        let outcome = ProcessOutcome::LaunchFailed(io::Error::from(io::ErrorKind::NotFound));
        let err = classify("python3", outcome, None, 20).unwrap_err();

        assert_eq!(err.kind(), OutcomeKind::LaunchFailed);
        assert!(err.user_message().contains("python3"));
        assert!(err.user_message().contains(ENV_ENGINE));
    }

    #[test]
    fn test_channel_launch_failure_names_directory() {
        let err = BridgeError::LaunchFailed {
            program: "python3".to_string(),
            stage: LaunchStage::Channel(PathBuf::from("/var/engine-results")),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };

        assert!(err.to_string().contains("result channel in /var/engine-results"));
        let hint = err.remediation().unwrap();
        assert!(hint.contains("/var/engine-results"));
        assert!(!hint.contains(ENV_ENGINE));
    }

    #[test]
    fn test_timeout_is_retryable() {
        let outcome = ProcessOutcome::TimedOut {
            elapsed: Duration::from_secs(180),
        };
        let err = classify("engine", outcome, None, 20).unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Engine timed out after 180s and was terminated");
    }

    #[test]
    fn test_tail_lines_skips_blank_lines() {
        assert_eq!(tail_lines(b"one\n\n two\nthree\n\n", 2), " two\nthree");
        assert_eq!(tail_lines(b"", 5), "");
    }
}
