pub mod payload;
pub mod presets;
pub mod request;

pub use payload::{
    ComputationResult, Constellation, EngineStats, FftData, NumericSeries, ResultDocument,
    SpectrumData,
};
pub use presets::{find_preset, FftPreset, DEFAULT_FFT, PRESETS};
pub use request::{ComputationRequest, TASK_TYPE_KEY};
