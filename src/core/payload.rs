use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Numeric array as the engine emits it: either a flat row or a column
/// vector serialized as single-element rows.
///
/// Consumers go through [`crate::spectral::flatten`] rather than matching on
/// the variants.
///
/// The engine encodes NaN and infinities as `null`; those elements decode
/// to `f64::NAN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NumericSeries {
    Flat(Vec<f64>),
    Nested(Vec<Vec<f64>>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireSeries {
    Flat(Vec<Option<f64>>),
    Nested(Vec<Vec<Option<f64>>>),
}

fn or_nan(values: Vec<Option<f64>>) -> Vec<f64> {
    values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

impl<'de> Deserialize<'de> for NumericSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match WireSeries::deserialize(deserializer)? {
            WireSeries::Flat(values) => NumericSeries::Flat(or_nan(values)),
            WireSeries::Nested(rows) => {
                NumericSeries::Nested(rows.into_iter().map(or_nan).collect())
            }
        })
    }
}

impl Default for NumericSeries {
    fn default() -> Self {
        NumericSeries::Flat(Vec::new())
    }
}

impl From<Vec<f64>> for NumericSeries {
    fn from(values: Vec<f64>) -> Self {
        NumericSeries::Flat(values)
    }
}

impl From<Vec<Vec<f64>>> for NumericSeries {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        NumericSeries::Nested(rows)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FftData {
    #[serde(default)]
    pub f1: NumericSeries,
    #[serde(default)]
    pub mag1: NumericSeries,
    #[serde(default)]
    pub f2: Option<NumericSeries>,
    #[serde(default)]
    pub mag2: Option<NumericSeries>,
}

/// Power spectral density of the transmitted and received signal, in dB.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectrumData {
    #[serde(default)]
    pub f: NumericSeries,
    #[serde(default)]
    pub p_rx: NumericSeries,
    #[serde(default)]
    pub p_tx: NumericSeries,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constellation {
    #[serde(default)]
    pub i: NumericSeries,
    #[serde(default)]
    pub q: NumericSeries,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    #[serde(rename = "Fs", default)]
    pub sample_rate: Option<f64>,
    #[serde(rename = "CodeRate", default)]
    pub code_rate: Option<f64>,
    #[serde(rename = "ElapsedTime", default)]
    pub elapsed_time: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The JSON document an engine run produces, either in the result channel
/// or on standard output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// Base64-encoded PNG figures keyed by name.
    #[serde(default)]
    pub images: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub fft_data: Option<FftData>,
    #[serde(default)]
    pub spectrum: Option<SpectrumData>,
    #[serde(default)]
    pub constellation_raw: Option<Constellation>,
    #[serde(default)]
    pub constellation_synced: Option<Constellation>,
    #[serde(default)]
    pub stats: Option<EngineStats>,
    #[serde(default)]
    pub ber: Option<f64>,
    /// Echo of the parameters the engine actually used.
    #[serde(default)]
    pub parameters: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of one engine run as declared by the engine itself.
#[derive(Debug, Clone, PartialEq)]
pub enum ComputationResult {
    Success(Box<ResultDocument>),
    Failure { message: String },
}

pub const UNSPECIFIED_FAILURE: &str = "Engine reported failure without a message";

impl From<ResultDocument> for ComputationResult {
    fn from(document: ResultDocument) -> Self {
        if document.success {
            ComputationResult::Success(Box::new(document))
        } else {
            let message = document
                .error
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| UNSPECIFIED_FAILURE.to_string());
            ComputationResult::Failure { message }
        }
    }
}

impl ComputationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ComputationResult::Success(_))
    }
}
