//! Offloads computation to the external engine process.
//!
//! A call encodes the request, reserves a [`ResultChannel`], runs the engine
//! under a [`ProcessSupervisor`], decodes whatever the engine left behind and
//! classifies the outcome into a [`BridgeError`] or a [`ResultDocument`].
//!
//! [`ResultDocument`]: crate::core::ResultDocument

pub mod channel;
pub mod decoder;
pub mod error;
pub mod service;
pub mod supervisor;

pub use channel::ResultChannel;
pub use decoder::{decode, DecodeFailure};
pub use error::{classify, BridgeError, BridgeResult, LaunchStage, OutcomeKind};
pub use service::{ComputationBackend, EngineBridge};
pub use supervisor::{ProcessOutcome, ProcessSupervisor};
