mod config;
mod driver;
mod marking;
mod sampler;
mod scheduler;
mod trace;

pub use config::{
    DelayAggregation, SchedulingMode, SchedulingPolicy, SchedulingPolicyBuilder,
    SchedulingPolicyBuilderError, SimulationConfig, SimulationConfigBuilder,
    SimulationConfigBuilderError,
};
pub use driver::{run, run_with_policy, Simulation, SimulationResult, Termination};
pub use marking::MarkingStore;
pub use sampler::sample_delay;
pub use scheduler::{Clock, Scheduler, SchedulerState, StepOutcome};
pub use trace::{FiringRecord, FiringTrace, StepRecord};
