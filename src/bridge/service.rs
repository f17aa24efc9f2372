use super::channel::ResultChannel;
use super::decoder;
use super::error::{classify, BridgeError, BridgeResult, LaunchStage, OutcomeKind};
use super::supervisor::{ProcessOutcome, ProcessSupervisor};
use crate::config::BridgeConfig;
use crate::core::{ComputationRequest, ResultDocument};
use crate::observability::BridgeMetrics;
use async_trait::async_trait;
use std::io;
use std::sync::Arc;

/// Anything that can turn a request into an engine result document.
#[async_trait]
pub trait ComputationBackend: Send + Sync {
    async fn compute(&self, request: &ComputationRequest) -> BridgeResult<ResultDocument>;
}

/// Drives the external engine: one subprocess and one result channel per call.
///
/// Holds only configuration and counters, so a single instance built at
/// startup can be shared by reference across concurrent invocations.
pub struct EngineBridge {
    config: BridgeConfig,
    supervisor: ProcessSupervisor,
    metrics: Arc<BridgeMetrics>,
}

impl EngineBridge {
    pub fn new(config: BridgeConfig) -> Self {
        let supervisor = ProcessSupervisor::new(config.program.clone(), config.leading_args());
        Self {
            config,
            supervisor,
            metrics: Arc::new(BridgeMetrics::new()),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<BridgeMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run the engine once for `request`.
    pub async fn invoke(&self, request: &ComputationRequest) -> BridgeResult<ResultDocument> {
        let start = self.metrics.start_invocation();
        let result = self.run_once(request).await;

        let kind = match &result {
            Ok(_) => OutcomeKind::Success,
            Err(e) => e.kind(),
        };
        self.metrics.finish_invocation(start, kind);

        match &result {
            Ok(_) => log::info!(
                "Engine run succeeded in {:.2}s",
                start.elapsed().as_secs_f64()
            ),
            Err(e) => log::warn!("Engine run failed ({:?}): {}", kind, e),
        }
        result
    }

    async fn run_once(&self, request: &ComputationRequest) -> BridgeResult<ResultDocument> {
        let program = self.config.program.display().to_string();

        let encoded = request.encode().map_err(|e| BridgeError::LaunchFailed {
            program: program.clone(),
            stage: LaunchStage::Encode,
            source: io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
        })?;

        let channel_dir = self.config.channel_dir();
        let mut channel =
            ResultChannel::create(&channel_dir).map_err(|source| BridgeError::LaunchFailed {
                program: program.clone(),
                stage: LaunchStage::Channel(channel_dir.clone()),
                source,
            })?;
        log::info!(
            "Invoking engine {} with {} parameters, channel {}",
            program,
            request.len(),
            channel.path().display()
        );

        let outcome = self
            .supervisor
            .run(&encoded, channel.path(), self.config.timeout())
            .await;

        let decoded = match &outcome {
            ProcessOutcome::Exited {
                code: Some(0),
                stdout,
                ..
            } => Some(decoder::decode(&mut channel, stdout).await),
            _ => None,
        };
        channel.release();

        classify(&program, outcome, decoded, self.config.stderr_tail_lines)
    }
}

#[async_trait]
impl ComputationBackend for EngineBridge {
    async fn compute(&self, request: &ComputationRequest) -> BridgeResult<ResultDocument> {
        self.invoke(request).await
    }
}
