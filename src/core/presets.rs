use super::ComputationRequest;

/// A named FFT parameter set offered to the operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FftPreset {
    pub name: &'static str,
    pub fs: f64,
    pub n: u32,
    pub freq1: f64,
    pub freq2: f64,
    pub amp1: f64,
    pub amp2: f64,
}

impl FftPreset {
    pub fn to_request(&self) -> ComputationRequest {
        ComputationRequest::new()
            .with("fs", self.fs)
            .with("n", self.n)
            .with("freq1", self.freq1)
            .with("freq2", self.freq2)
            .with("amp1", self.amp1)
            .with("amp2", self.amp2)
    }
}

/// Parameters used for the connection self-test.
pub const DEFAULT_FFT: FftPreset = FftPreset {
    name: "default",
    fs: 100.0,
    n: 1024,
    freq1: 50.0,
    freq2: 120.0,
    amp1: 1.0,
    amp2: 0.5,
};

pub const PRESETS: &[FftPreset] = &[
    FftPreset {
        name: "audio",
        fs: 44100.0,
        n: 2048,
        freq1: 440.0,
        freq2: 880.0,
        amp1: 1.0,
        amp2: 0.7,
    },
    FftPreset {
        name: "vibration",
        fs: 1000.0,
        n: 1024,
        freq1: 10.0,
        freq2: 50.0,
        amp1: 1.0,
        amp2: 0.3,
    },
    FftPreset {
        name: "communication",
        fs: 10000.0,
        n: 4096,
        freq1: 1000.0,
        freq2: 3000.0,
        amp1: 1.0,
        amp2: 0.5,
    },
];

pub fn find_preset(name: &str) -> Option<&'static FftPreset> {
    if name.eq_ignore_ascii_case(DEFAULT_FFT.name) {
        return Some(&DEFAULT_FFT);
    }
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_preset_is_case_insensitive() {
        let preset = find_preset("Vibration").unwrap();
        assert_eq!(preset.fs, 1000.0);
        assert_eq!(preset.amp2, 0.3);
        assert!(find_preset("seismic").is_none());
    }

    #[test]
    fn test_preset_request_carries_all_fields() {
        let request = find_preset("audio").unwrap().to_request();
        assert_eq!(request.len(), 6);
        assert_eq!(request.sample_rate(), Some(44100.0));
        assert_eq!(request.get_f64("freq2"), Some(880.0));
    }
}
