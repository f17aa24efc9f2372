//! Post-processing of the arrays the engine returns.

pub mod analysis;
pub mod centroid;
pub mod normalize;
pub mod ranking;

pub use analysis::{AnalysisView, ConstellationView, FftTrace, ImageInfo, SpectrumView};
pub use centroid::{center_frequency, center_frequency_with_window};
pub use normalize::{flatten, flatten_opt};
pub use ranking::{peak, rank_components, rank_components_with_floor, RankedFrequencyComponent};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpectralError {
    #[error("Spectrum is empty")]
    Empty,

    #[error("Parallel arrays differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

fn check_parallel(left: &[f64], right: &[f64]) -> Result<(), SpectralError> {
    if left.len() != right.len() {
        return Err(SpectralError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    if left.is_empty() {
        return Err(SpectralError::Empty);
    }
    Ok(())
}
