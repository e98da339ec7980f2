use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Distribution a timed transition draws its firing delay from.
///
/// Samples of `Normal` and `LogNormal` are clamped to zero. `Unsupported` keeps the name of a
/// distribution the engine does not know; sampling from it fails.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution", rename_all = "snake_case")]
pub enum DelaySpec {
    Exponential { rate: f64 },
    Normal { mean: f64, std_dev: f64 },
    #[serde(rename = "lognormal")]
    LogNormal { mu: f64, sigma: f64 },
    Fixed { value: f64 },
    Unsupported { kind: String },
}

impl Default for DelaySpec {
    fn default() -> Self {
        DelaySpec::Exponential { rate: 1.0 }
    }
}

impl DelaySpec {
    pub fn kind(&self) -> &str {
        match self {
            DelaySpec::Exponential { .. } => "exponential",
            DelaySpec::Normal { .. } => "normal",
            DelaySpec::LogNormal { .. } => "lognormal",
            DelaySpec::Fixed { .. } => "fixed",
            DelaySpec::Unsupported { kind } => kind,
        }
    }

    /// True if sampling never touches the random source.
    pub fn is_deterministic(&self) -> bool {
        matches!(self, DelaySpec::Fixed { .. })
    }
}

impl Display for DelaySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DelaySpec::Exponential { rate } => write!(f, "Exp(rate={})", rate),
            DelaySpec::Normal { mean, std_dev } => write!(f, "N(mean={}, sd={})", mean, std_dev),
            DelaySpec::LogNormal { mu, sigma } => write!(f, "LogN(mu={}, sigma={})", mu, sigma),
            DelaySpec::Fixed { value } => write!(f, "Fixed({})", value),
            DelaySpec::Unsupported { kind } => write!(f, "Unsupported({})", kind),
        }
    }
}
