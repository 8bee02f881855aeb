// Mode and ProcessedConfig — how a directory of archives becomes a dataset

use std::fmt;

use crate::error::{DataError, Result};
use crate::normalize::DEFAULT_EPSILON;

/// How archives are turned into samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Split every archive into fixed-length windows.
    #[default]
    Train,
    /// One sample per archive, full length.
    Eval,
}

impl From<&str> for Mode {
    /// `"train"` selects [`Mode::Train`]; any other string is evaluation.
    fn from(s: &str) -> Self {
        if s == "train" {
            Mode::Train
        } else {
            Mode::Eval
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Train => write!(f, "train"),
            Mode::Eval => write!(f, "eval"),
        }
    }
}

/// Configuration for loading a directory of processed archives.
#[derive(Debug, Clone)]
pub struct ProcessedConfig {
    /// Window length in timesteps (train mode).
    pub temporal_len: usize,
    /// Train (windowed) or eval (whole archive).
    pub mode: Mode,
    /// Archive file extension, without the dot (default: `npz`).
    pub extension: String,
    /// Name of the feature array inside each archive (default: `x`).
    pub x_key: String,
    /// Name of the label array inside each archive (default: `y`).
    pub y_key: String,
    /// Added to the channel norm before dividing (default: `1e-2`).
    pub epsilon: f64,
}

impl Default for ProcessedConfig {
    fn default() -> Self {
        Self {
            temporal_len: 10,
            mode: Mode::Train,
            extension: "npz".to_string(),
            x_key: "x".to_string(),
            y_key: "y".to_string(),
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl ProcessedConfig {
    pub fn temporal_len(mut self, len: usize) -> Self {
        self.temporal_len = len;
        self
    }
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = ext.into();
        self
    }
    pub fn x_key(mut self, key: impl Into<String>) -> Self {
        self.x_key = key.into();
        self
    }
    pub fn y_key(mut self, key: impl Into<String>) -> Self {
        self.y_key = key.into();
        self
    }
    pub fn epsilon(mut self, eps: f64) -> Self {
        self.epsilon = eps;
        self
    }

    /// Reject values that would make windowing or normalization undefined.
    pub fn validate(&self) -> Result<()> {
        if self.temporal_len == 0 {
            return Err(DataError::InvalidTemporalLen(self.temporal_len));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(DataError::InvalidConfig(format!(
                "epsilon must be finite and non-negative, got {}",
                self.epsilon
            )));
        }
        if self.x_key.is_empty() || self.y_key.is_empty() {
            return Err(DataError::InvalidConfig(
                "array keys must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_str() {
        assert_eq!(Mode::from("train"), Mode::Train);
        assert_eq!(Mode::from("eval"), Mode::Eval);
        assert_eq!(Mode::from("test"), Mode::Eval);
        assert_eq!(Mode::from("Train"), Mode::Eval);
    }

    #[test]
    fn defaults_validate() {
        let config = ProcessedConfig::default();
        assert_eq!(config.temporal_len, 10);
        assert_eq!(config.mode, Mode::Train);
        assert_eq!(config.extension, "npz");
        assert_eq!(config.epsilon, DEFAULT_EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_temporal_len_rejected() {
        let config = ProcessedConfig::default().temporal_len(0);
        assert!(matches!(
            config.validate(),
            Err(DataError::InvalidTemporalLen(0))
        ));
        let eval = ProcessedConfig::default().temporal_len(0).mode(Mode::Eval);
        assert!(eval.validate().is_err());
    }

    #[test]
    fn bad_epsilon_rejected() {
        assert!(ProcessedConfig::default().epsilon(-1.0).validate().is_err());
        assert!(ProcessedConfig::default()
            .epsilon(f64::NAN)
            .validate()
            .is_err());
        assert!(ProcessedConfig::default().epsilon(0.0).validate().is_ok());
    }
}
