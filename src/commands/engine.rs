use super::CommandResponse;
use crate::bridge::ComputationBackend;
use crate::core::{ComputationRequest, ResultDocument, DEFAULT_FFT, TASK_TYPE_KEY};
use serde_json::Value;

/// Task routed to by the simulation engine script when none is given.
pub const DEFAULT_SIMULATION_TASK: &str = "ccsds_tm";

/// Run the FFT task with operator-supplied parameters.
pub async fn generate_fft(
    backend: &dyn ComputationBackend,
    params: Value,
) -> CommandResponse<ResultDocument> {
    let request = match ComputationRequest::from_json(params) {
        Ok(request) => request,
        Err(e) => return CommandResponse::invalid(e.to_string()),
    };
    log::info!("FFT generation requested with {} parameters", request.len());
    execute(backend, &request).await
}

/// Check that the engine can be reached by running the FFT task with the
/// built-in default parameters.
pub async fn test_connection(backend: &dyn ComputationBackend) -> CommandResponse<ResultDocument> {
    log::info!("Testing engine connection");
    execute(backend, &DEFAULT_FFT.to_request()).await
}

/// Run the modulation/channel simulation task.
///
/// Requests without a `taskType` are routed to the CCSDS TM task.
pub async fn run_simulation(
    backend: &dyn ComputationBackend,
    params: Value,
) -> CommandResponse<ResultDocument> {
    let mut request = match ComputationRequest::from_json(params) {
        Ok(request) => request,
        Err(e) => return CommandResponse::invalid(e.to_string()),
    };
    if !request.contains_key(TASK_TYPE_KEY) {
        request.set(TASK_TYPE_KEY, DEFAULT_SIMULATION_TASK);
    }
    log::info!(
        "Simulation requested: modType={}",
        request
            .get("modType")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    );
    execute(backend, &request).await
}

async fn execute(
    backend: &dyn ComputationBackend,
    request: &ComputationRequest,
) -> CommandResponse<ResultDocument> {
    match backend.compute(request).await {
        Ok(document) => CommandResponse::ok(document),
        Err(e) => {
            log::error!("Engine command failed: {}", e);
            CommandResponse::from_bridge_error(&e)
        }
    }
}
