//! Operator-facing commands, one per action the shell exposes.
//!
//! Handlers never return `Err`: failures are folded into a
//! [`CommandResponse`] so the UI layer can render them directly.

pub mod analysis;
pub mod engine;

pub use analysis::analyze;
pub use engine::{generate_fft, run_simulation, test_connection};

use crate::bridge::{BridgeError, OutcomeKind};
use serde::Serialize;

/// Envelope returned to the UI for every command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure category, for UIs that style errors differently.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<OutcomeKind>,
    pub retryable: bool,
}

impl<T> CommandResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            kind: None,
            retryable: false,
        }
    }

    pub fn from_bridge_error(error: &BridgeError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.user_message()),
            kind: Some(error.kind()),
            retryable: error.is_retryable(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            kind: None,
            retryable: false,
        }
    }
}
