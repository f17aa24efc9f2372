use super::SpectralError;
use crate::config::DEFAULT_CENTROID_WINDOW_DB;

/// Energy-weighted center frequency of a power spectrum in dB.
///
/// Uses the default 15 dB window below the peak. See
/// [`center_frequency_with_window`].
pub fn center_frequency(frequencies: &[f64], powers_db: &[f64]) -> Result<f64, SpectralError> {
    center_frequency_with_window(frequencies, powers_db, DEFAULT_CENTROID_WINDOW_DB)
}

/// Energy-weighted center frequency over samples within `window_db` of the peak.
///
/// Each included sample contributes with its linear power `10^(dB/10)`, so
/// the skirts of the spectrum pull the estimate in proportion to their
/// energy rather than their count. Powers are taken relative to the peak
/// before conversion, which leaves the ratio unchanged and keeps very high
/// levels from overflowing. Falls back to the peak frequency when no energy
/// accumulates or the estimate is not finite.
pub fn center_frequency_with_window(
    frequencies: &[f64],
    powers_db: &[f64],
    window_db: f64,
) -> Result<f64, SpectralError> {
    super::check_parallel(frequencies, powers_db)?;

    let (peak_index, peak_db) = peak_of(powers_db);
    let threshold = peak_db - window_db;

    let mut weighted_sum = 0.0;
    let mut energy_sum = 0.0;
    for (&freq, &power_db) in frequencies.iter().zip(powers_db) {
        if power_db > threshold {
            let energy = 10f64.powf((power_db - peak_db) / 10.0);
            weighted_sum += freq * energy;
            energy_sum += energy;
        }
    }

    let centroid = weighted_sum / energy_sum;
    if energy_sum == 0.0 || !centroid.is_finite() {
        return Ok(frequencies[peak_index]);
    }
    Ok(centroid)
}

/// Index and value of the first maximum, ignoring NaN.
fn peak_of(values: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, &v) in values.iter().enumerate() {
        if v > best.1 {
            best = (i, v);
        }
    }
    best
}
