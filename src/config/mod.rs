pub mod store;

pub use store::ConfigStore;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: f64 = 180.0;
pub const DEFAULT_STDERR_TAIL_LINES: usize = 20;
pub const DEFAULT_CENTROID_WINDOW_DB: f64 = 15.0;
pub const DEFAULT_RANKING_FLOOR_PERCENT: f64 = 1.0;

pub const ENV_ENGINE: &str = "MODEMSCOPE_ENGINE";
pub const ENV_SCRIPT: &str = "MODEMSCOPE_SCRIPT";
pub const ENV_TIMEOUT_SECS: &str = "MODEMSCOPE_TIMEOUT_SECS";

/// Tunable constants of the spectral post-processing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralTuning {
    /// Samples within this many dB of the peak contribute to the centroid.
    pub centroid_window_db: f64,
    /// Ranked components weaker than this share of the peak are dropped.
    pub ranking_floor_percent: f64,
}

impl Default for SpectralTuning {
    fn default() -> Self {
        Self {
            centroid_window_db: DEFAULT_CENTROID_WINDOW_DB,
            ranking_floor_percent: DEFAULT_RANKING_FLOOR_PERCENT,
        }
    }
}

/// How to reach the external computation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Engine binary, or the interpreter when `script` is set.
    pub program: PathBuf,
    /// Engine script passed to `program` ahead of the request argument.
    pub script: Option<PathBuf>,
    /// Extra arguments placed between `script` and the request argument.
    pub extra_args: Vec<String>,
    /// Wall-clock limit for one engine run, measured from spawn.
    pub timeout_secs: f64,
    /// Where result channel files are created. System temp dir when unset.
    pub channel_dir: Option<PathBuf>,
    pub stderr_tail_lines: usize,
    pub spectral: SpectralTuning,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            script: None,
            extra_args: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            channel_dir: None,
            stderr_tail_lines: DEFAULT_STDERR_TAIL_LINES,
            spectral: SpectralTuning::default(),
        }
    }
}

impl BridgeConfig {
    /// Config for an engine that is itself an executable.
    pub fn for_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn with_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.script = Some(script.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs_f64();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs.max(0.0))
    }

    pub fn channel_dir(&self) -> PathBuf {
        self.channel_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Arguments that precede the request and channel path.
    pub fn leading_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.extra_args.len() + 1);
        if let Some(script) = &self.script {
            args.push(script.to_string_lossy().into_owned());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Apply `MODEMSCOPE_*` environment overrides.
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(program) = std::env::var(ENV_ENGINE) {
            self.program = PathBuf::from(program);
        }
        if let Ok(script) = std::env::var(ENV_SCRIPT) {
            self.script = if script.is_empty() {
                None
            } else {
                Some(PathBuf::from(script))
            };
        }
        if let Ok(secs) = std::env::var(ENV_TIMEOUT_SECS) {
            let parsed: f64 = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: '{}'", ENV_TIMEOUT_SECS, secs))?;
            if !parsed.is_finite() || parsed <= 0.0 {
                bail!("{} must be a positive number of seconds", ENV_TIMEOUT_SECS);
            }
            self.timeout_secs = parsed;
        }
        Ok(self)
    }
}

fn default_program() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("python")
    } else {
        PathBuf::from("python3")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(180));
        assert_eq!(config.stderr_tail_lines, 20);
        assert_eq!(config.spectral.centroid_window_db, 15.0);
        assert_eq!(config.spectral.ranking_floor_percent, 1.0);
        assert!(config.leading_args().is_empty());
    }

    #[test]
    fn test_leading_args_order() {
        let mut config = BridgeConfig::for_program("python3").with_script("/opt/engine/bridge.py");
        config.extra_args = vec!["-u".to_string()];
        assert_eq!(config.leading_args(), vec!["/opt/engine/bridge.py", "-u"]);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"program": "/usr/bin/engine", "spectral": {"centroid_window_db": 10}}"#)
                .unwrap();
        assert_eq!(config.program, PathBuf::from("/usr/bin/engine"));
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.spectral.centroid_window_db, 10.0);
        assert_eq!(config.spectral.ranking_floor_percent, 1.0);
    }
}
