use super::{center_frequency_with_window, flatten, flatten_opt, peak, rank_components_with_floor};
use super::RankedFrequencyComponent;
use crate::config::SpectralTuning;
use crate::core::{ComputationRequest, Constellation, EngineStats, FftData, ResultDocument};
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine as _;
use serde::Serialize;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// One amplitude spectrum from the FFT task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FftTrace {
    pub name: String,
    pub frequencies: Vec<f64>,
    pub amplitudes: Vec<f64>,
    /// (frequency, amplitude) of the strongest bin.
    pub peak: Option<(f64, f64)>,
    pub components: Vec<RankedFrequencyComponent>,
}

/// Transmit/receive power spectral density from the simulation task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectrumView {
    pub frequencies: Vec<f64>,
    pub rx_db: Vec<f64>,
    pub tx_db: Vec<f64>,
    pub rx_center_hz: Option<f64>,
    pub tx_center_hz: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstellationView {
    pub i: Vec<f64>,
    pub q: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub name: String,
    /// Decoded size, or `None` when the payload is not valid base64.
    pub byte_len: Option<usize>,
    pub is_png: bool,
}

/// Everything the plots need, derived from one result document.
///
/// Recomputed from scratch for each result; sections the engine did not
/// send are `None` or empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisView {
    pub sample_rate: Option<f64>,
    pub nyquist_hz: Option<f64>,
    pub fft: Vec<FftTrace>,
    pub spectrum: Option<SpectrumView>,
    pub constellation_raw: Option<ConstellationView>,
    pub constellation_synced: Option<ConstellationView>,
    pub images: Vec<ImageInfo>,
    pub ber: Option<f64>,
    pub stats: Option<EngineStats>,
}

impl AnalysisView {
    pub fn build(
        document: &ResultDocument,
        request: Option<&ComputationRequest>,
        tuning: &SpectralTuning,
    ) -> Self {
        let sample_rate = resolve_sample_rate(document, request);

        Self {
            sample_rate,
            nyquist_hz: sample_rate.map(|fs| fs / 2.0),
            fft: document
                .fft_data
                .as_ref()
                .map(|data| fft_traces(data, tuning))
                .unwrap_or_default(),
            spectrum: document.spectrum.as_ref().map(|s| {
                let frequencies = flatten(&s.f);
                let rx_db = flatten(&s.p_rx);
                let tx_db = flatten(&s.p_tx);
                let window = tuning.centroid_window_db;
                SpectrumView {
                    rx_center_hz: center_frequency_with_window(&frequencies, &rx_db, window).ok(),
                    tx_center_hz: center_frequency_with_window(&frequencies, &tx_db, window).ok(),
                    frequencies,
                    rx_db,
                    tx_db,
                }
            }),
            constellation_raw: document.constellation_raw.as_ref().map(constellation_view),
            constellation_synced: document.constellation_synced.as_ref().map(constellation_view),
            images: document
                .images
                .iter()
                .flatten()
                .map(|(name, encoded)| image_info(name, encoded))
                .collect(),
            ber: document.ber,
            stats: document.stats.clone(),
        }
    }
}

fn resolve_sample_rate(document: &ResultDocument, request: Option<&ComputationRequest>) -> Option<f64> {
    document
        .stats
        .as_ref()
        .and_then(|s| s.sample_rate)
        .or_else(|| {
            document
                .parameters
                .as_ref()
                .and_then(|p| p.get("fs").or_else(|| p.get("Fs")))
                .and_then(|v| v.as_f64())
        })
        .or_else(|| request.and_then(ComputationRequest::sample_rate))
        .filter(|fs| fs.is_finite() && *fs > 0.0)
}

fn fft_traces(data: &FftData, tuning: &SpectralTuning) -> Vec<FftTrace> {
    let mut traces = vec![fft_trace("fft1", flatten(&data.f1), flatten(&data.mag1), tuning)];
    if data.f2.is_some() || data.mag2.is_some() {
        traces.push(fft_trace(
            "fft2",
            flatten_opt(data.f2.as_ref()),
            flatten_opt(data.mag2.as_ref()),
            tuning,
        ));
    }
    traces
}

fn fft_trace(name: &str, frequencies: Vec<f64>, amplitudes: Vec<f64>, tuning: &SpectralTuning) -> FftTrace {
    let components =
        match rank_components_with_floor(&frequencies, &amplitudes, tuning.ranking_floor_percent) {
            Ok(components) => components,
            Err(e) => {
                log::warn!("Skipping component ranking for {}: {}", name, e);
                Vec::new()
            }
        };

    FftTrace {
        name: name.to_string(),
        peak: peak(&frequencies, &amplitudes),
        components,
        frequencies,
        amplitudes,
    }
}

fn constellation_view(c: &Constellation) -> ConstellationView {
    ConstellationView {
        i: flatten(&c.i),
        q: flatten(&c.q),
    }
}

fn image_info(name: &str, encoded: &str) -> ImageInfo {
    match BASE64_ENGINE.decode(encoded.trim()) {
        Ok(bytes) => ImageInfo {
            name: name.to_string(),
            byte_len: Some(bytes.len()),
            is_png: bytes.starts_with(&PNG_SIGNATURE),
        },
        Err(e) => {
            log::warn!("Image '{}' is not valid base64: {}", name, e);
            ImageInfo {
                name: name.to_string(),
                byte_len: None,
                is_png: false,
            }
        }
    }
}
