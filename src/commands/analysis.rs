use super::CommandResponse;
use crate::config::SpectralTuning;
use crate::core::{ComputationRequest, ResultDocument};
use crate::spectral::AnalysisView;

/// Derive the plot data for a successful result.
pub fn analyze(
    document: &ResultDocument,
    request: Option<&ComputationRequest>,
    tuning: &SpectralTuning,
) -> CommandResponse<AnalysisView> {
    if !document.success {
        return CommandResponse::invalid("Cannot analyze a failed result");
    }
    CommandResponse::ok(AnalysisView::build(document, request, tuning))
}
