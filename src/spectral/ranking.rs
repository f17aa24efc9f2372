use super::SpectralError;
use crate::config::DEFAULT_RANKING_FLOOR_PERCENT;
use serde::{Deserialize, Serialize};

/// One spectral line, relative to the strongest line in the same result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedFrequencyComponent {
    pub frequency: f64,
    pub amplitude: f64,
    /// Amplitude as a percentage of the peak amplitude.
    pub relative_percent: f64,
}

/// Strongest components first, dropping those below 1% of the peak.
pub fn rank_components(
    frequencies: &[f64],
    amplitudes: &[f64],
) -> Result<Vec<RankedFrequencyComponent>, SpectralError> {
    rank_components_with_floor(frequencies, amplitudes, DEFAULT_RANKING_FLOOR_PERCENT)
}

/// Strongest components first, keeping those at or above `floor_percent`
/// of the peak amplitude.
///
/// Without a positive peak there is nothing to be relative to: every
/// component is kept with a relative strength of 0.
pub fn rank_components_with_floor(
    frequencies: &[f64],
    amplitudes: &[f64],
    floor_percent: f64,
) -> Result<Vec<RankedFrequencyComponent>, SpectralError> {
    if frequencies.len() != amplitudes.len() {
        return Err(SpectralError::LengthMismatch {
            left: frequencies.len(),
            right: amplitudes.len(),
        });
    }

    let max = amplitudes.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut components: Vec<RankedFrequencyComponent> = frequencies
        .iter()
        .zip(amplitudes)
        .map(|(&frequency, &amplitude)| RankedFrequencyComponent {
            frequency,
            amplitude,
            relative_percent: if max > 0.0 {
                amplitude / max * 100.0
            } else {
                0.0
            },
        })
        .filter(|c| max <= 0.0 || c.relative_percent >= floor_percent)
        .collect();

    components.sort_by(|a, b| b.amplitude.total_cmp(&a.amplitude));
    Ok(components)
}

/// Frequency and amplitude of the first maximum, if any.
pub fn peak(frequencies: &[f64], amplitudes: &[f64]) -> Option<(f64, f64)> {
    let mut best: Option<(f64, f64)> = None;
    for (&f, &a) in frequencies.iter().zip(amplitudes) {
        if best.map_or(!a.is_nan(), |(_, b)| a > b) {
            best = Some((f, a));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_peak_keeps_components() {
        let ranked = rank_components(&[1.0, 2.0], &[0.0, 0.0]).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].frequency, 1.0);

        let kept = rank_components_with_floor(&[1.0, 2.0], &[0.0, 0.0], 0.0).unwrap();
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|c| c.relative_percent == 0.0));
    }

    #[test]
    fn test_relative_is_ratio_then_percent() {
        // 0.69 / 69 * 100 lands just under 1%.
        let ranked = rank_components(&[1.0, 2.0], &[69.0, 0.69]).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].frequency, 1.0);
    }

    #[test]
    fn test_sorted_descending() {
        let ranked = rank_components(&[10.0, 20.0, 30.0], &[0.3, 0.9, 0.6]).unwrap();
        let order: Vec<f64> = ranked.iter().map(|c| c.frequency).collect();
        assert_eq!(order, vec![20.0, 30.0, 10.0]);
        assert_eq!(ranked[0].relative_percent, 100.0);
    }

    #[test]
    fn test_peak_picks_first_maximum() {
        assert_eq!(peak(&[1.0, 2.0, 3.0], &[0.5, 2.0, 2.0]), Some((2.0, 2.0)));
        assert_eq!(peak(&[], &[]), None);
        assert_eq!(peak(&[1.0, 2.0], &[f64::NAN, 0.1]), Some((2.0, 0.1)));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(rank_components(&[1.0], &[]).is_err());
    }
}
