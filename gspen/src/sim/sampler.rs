use rand::Rng;
use rand_distr::{Distribution, Exp, LogNormal, Normal};

use crate::error::{PetriError, Result};
use crate::net::DelaySpec;

fn invalid(spec: &DelaySpec, reason: impl std::fmt::Display) -> PetriError {
    PetriError::ConfigError(format!("Invalid delay distribution {spec}: {reason}"))
}

/// Draw one non-negative delay from `spec`.
///
/// `Fixed` returns its value without touching `rng`. Normal and log-normal samples are clamped
/// to zero. Parameters are checked on every call, an unusable distribution or a non-finite
/// sample is a [`PetriError::ConfigError`].
pub fn sample_delay<R: Rng + ?Sized>(spec: &DelaySpec, rng: &mut R) -> Result<f64> {
    let delay = match spec {
        DelaySpec::Exponential { rate } => {
            if !(rate.is_finite() && *rate > 0.0) {
                return Err(invalid(spec, "rate must be positive"));
            }
            Exp::new(*rate).map_err(|err| invalid(spec, err))?.sample(rng)
        }
        DelaySpec::Normal { mean, std_dev } => {
            if !mean.is_finite() {
                return Err(invalid(spec, "mean must be finite"));
            }
            if !(std_dev.is_finite() && *std_dev >= 0.0) {
                return Err(invalid(spec, "std_dev must be a non-negative number"));
            }
            Normal::new(*mean, *std_dev).map_err(|err| invalid(spec, err))?.sample(rng).max(0.0)
        }
        DelaySpec::LogNormal { mu, sigma } => {
            if !mu.is_finite() {
                return Err(invalid(spec, "mu must be finite"));
            }
            if !(sigma.is_finite() && *sigma >= 0.0) {
                return Err(invalid(spec, "sigma must be a non-negative number"));
            }
            LogNormal::new(*mu, *sigma).map_err(|err| invalid(spec, err))?.sample(rng).max(0.0)
        }
        DelaySpec::Fixed { value } => {
            if !(value.is_finite() && *value >= 0.0) {
                return Err(invalid(spec, "value must be a non-negative number"));
            }
            *value
        }
        DelaySpec::Unsupported { kind } => {
            return Err(PetriError::ConfigError(format!("Unsupported distribution type: {kind}")));
        }
    };
    if !delay.is_finite() {
        return Err(invalid(spec, "sampled delay is not finite"));
    }
    Ok(delay)
}
