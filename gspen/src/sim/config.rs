use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{PetriError, Result};

/// How a scheduling step picks the transitions to fire.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SchedulingMode {
    /// Immediate transitions by priority first, then stochastic, then fixed delay batches.
    #[default]
    Classed,
    /// One uniformly chosen enabled transition per step regardless of class, the clock moves
    /// by `step` after each firing. Priorities and delays are ignored.
    Uniform {
        #[serde(default = "unit_step")]
        step: f64,
    },
}

fn unit_step() -> f64 {
    1.0
}

impl SchedulingMode {
    pub fn uniform() -> Self {
        SchedulingMode::Uniform { step: unit_step() }
    }
}

/// Which sampled delay of a stochastic batch the clock advances by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayAggregation {
    /// Wait for the slowest member of the batch.
    #[default]
    Max,
    /// Wait for the fastest member of the batch.
    Min,
}

#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct SchedulingPolicy {
    #[builder(default)]
    pub mode: SchedulingMode,
    /// Maximum number of stochastic transitions fired together.
    #[builder(default = "2")]
    pub stochastic_batch_cap: usize,
    /// Maximum number of fixed delay transitions fired together.
    #[builder(default = "2")]
    pub fixed_batch_cap: usize,
    #[builder(default)]
    pub stochastic_delay: DelayAggregation,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        SchedulingPolicy {
            mode: SchedulingMode::default(),
            stochastic_batch_cap: 2,
            fixed_batch_cap: 2,
            stochastic_delay: DelayAggregation::default(),
        }
    }
}

fn check_policy(
    mode: Option<&SchedulingMode>,
    stochastic_batch_cap: Option<usize>,
    fixed_batch_cap: Option<usize>,
) -> std::result::Result<(), String> {
    if stochastic_batch_cap == Some(0) {
        return Err("stochastic_batch_cap must be at least 1".into());
    }
    if fixed_batch_cap == Some(0) {
        return Err("fixed_batch_cap must be at least 1".into());
    }
    if let Some(SchedulingMode::Uniform { step }) = mode {
        if !(step.is_finite() && *step > 0.0) {
            return Err(format!("uniform step must be positive and finite, got {step}"));
        }
    }
    Ok(())
}

impl SchedulingPolicyBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        check_policy(self.mode.as_ref(), self.stochastic_batch_cap, self.fixed_batch_cap)
    }
}

impl SchedulingPolicy {
    /// Checks a policy that did not come from the builder, e.g. a deserialized one.
    pub fn validate(&self) -> Result<()> {
        check_policy(Some(&self.mode), Some(self.stochastic_batch_cap), Some(self.fixed_batch_cap))
            .map_err(PetriError::ConfigError)
    }
}

#[derive(Builder, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed of the run's random source.
    #[builder(default)]
    pub seed: u64,
    /// Stop after this many firings, even if transitions are still enabled.
    #[builder(setter(into, strip_option), default)]
    pub max_steps: Option<usize>,
    #[builder(default)]
    pub policy: SchedulingPolicy,
}
