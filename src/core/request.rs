use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Key used by the engine script to route a request to a task.
pub const TASK_TYPE_KEY: &str = "taskType";

/// Flat parameter set sent to the computation engine.
///
/// Values are restricted to scalars (numbers, strings, booleans, null), so the
/// encoded document is always a single-level JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ComputationRequest {
    params: BTreeMap<String, Value>,
}

impl ComputationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. Non-scalar values are silently replaced by null;
    /// use [`ComputationRequest::from_json`] when the input is untrusted.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        let value = if is_scalar(&value) { value } else { Value::Null };
        self.params.insert(key.into(), value);
    }

    /// Build a request from an arbitrary JSON value, rejecting anything that
    /// is not a flat object of scalars.
    pub fn from_json(value: Value) -> Result<Self> {
        let object = match value {
            Value::Object(object) => object,
            other => bail!("Request must be a JSON object, got {}", type_name(&other)),
        };

        let mut params = BTreeMap::new();
        for (key, value) in object {
            if !is_scalar(&value) {
                bail!(
                    "Parameter '{}' must be a scalar, got {}",
                    key,
                    type_name(&value)
                );
            }
            params.insert(key, value);
        }

        Ok(Self { params })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.params.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Sample rate under either of the names the engine tasks use.
    pub fn sample_rate(&self) -> Option<f64> {
        self.get_f64("fs").or_else(|| self.get_f64("Fs"))
    }

    /// Serialize into the engine's command-line argument form.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.params)?)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<String, Value>>(),
        )
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_is_flat_object() {
        let request = ComputationRequest::new()
            .with("fs", 100)
            .with("modType", "QPSK")
            .with("amp1", 0.5);

        let encoded = request.encode().unwrap();
        let decoded: Value = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, json!({"fs": 100, "modType": "QPSK", "amp1": 0.5}));
    }

    #[test]
    fn test_from_json_rejects_nested_values() {
        let err = ComputationRequest::from_json(json!({"fs": 100, "taps": [1, 2]})).unwrap_err();
        assert!(err.to_string().contains("taps"));

        let err = ComputationRequest::from_json(json!([1, 2, 3])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_with_drops_non_scalars() {
        let request = ComputationRequest::new().with("bad", json!({"a": 1}));
        assert_eq!(request.get("bad"), Some(&Value::Null));
    }

    #[test]
    fn test_sample_rate_accepts_both_spellings() {
        let fft = ComputationRequest::new().with("fs", 44100);
        assert_eq!(fft.sample_rate(), Some(44100.0));

        let sim = ComputationRequest::new().with("Fs", "2000");
        assert_eq!(sim.sample_rate(), Some(2000.0));

        assert_eq!(ComputationRequest::new().sample_rate(), None);
    }
}
