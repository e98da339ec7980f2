use indexmap::IndexMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::net::{Marking, PetriNet};

use super::{
    Clock, FiringTrace, MarkingStore, Scheduler, SchedulingPolicy, SimulationConfig, StepOutcome,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// No transition was enabled anymore.
    Terminal,
    /// The firing budget ran out while transitions were still enabled.
    StepBudgetExhausted,
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationResult {
    pub termination: Termination,
    pub final_marking: Marking,
    pub trace: FiringTrace,
    /// Clock value when the run stopped.
    pub end_time: f64,
    /// Total number of firings.
    pub firings: usize,
}

impl SimulationResult {
    pub fn first_firing_times(&self) -> IndexMap<String, f64> {
        self.trace.first_firing_times()
    }

    pub fn is_terminal(&self) -> bool {
        self.termination == Termination::Terminal
    }
}

/// Simulate `net` from `initial_marking` with the default scheduling policy.
///
/// `max_steps` bounds the number of firings. The run stops early with
/// [`Termination::Terminal`] once nothing is enabled.
pub fn run<R: Rng + ?Sized>(
    net: &PetriNet,
    initial_marking: &Marking,
    rng: &mut R,
    max_steps: Option<usize>,
) -> Result<SimulationResult> {
    run_with_policy(net, initial_marking, rng, max_steps, &SchedulingPolicy::default())
}

#[tracing::instrument(
    level = "info",
    skip_all,
    fields(places = net.place_count(), transitions = net.transition_count(), max_steps = ?max_steps)
)]
pub fn run_with_policy<R: Rng + ?Sized>(
    net: &PetriNet,
    initial_marking: &Marking,
    rng: &mut R,
    max_steps: Option<usize>,
    policy: &SchedulingPolicy,
) -> Result<SimulationResult> {
    policy.validate()?;
    let mut marking = MarkingStore::new(net, initial_marking)?;
    let mut trace = FiringTrace::new();
    let mut clock = Clock::new();
    let mut scheduler = Scheduler::new(net, policy.clone());
    let mut firings = 0;

    let termination = loop {
        let remaining = max_steps.map(|max| max.saturating_sub(firings));
        if remaining == Some(0) {
            if scheduler.any_enabled(&marking) {
                warn!(firings, time = clock.now(), "Step budget exhausted, transitions still enabled.");
                break Termination::StepBudgetExhausted;
            }
            break Termination::Terminal;
        }
        match scheduler.step(&mut marking, &mut trace, &mut clock, rng, remaining)? {
            StepOutcome::Fired(count) => firings += count,
            StepOutcome::Terminal => break Termination::Terminal,
        }
    };

    let final_marking = marking.snapshot();
    info!(?termination, firings, steps = scheduler.steps(), end_time = clock.now(), "Simulation finished.");
    Ok(SimulationResult { termination, final_marking, trace, end_time: clock.now(), firings })
}

/// A net bound to a validated configuration. Runs are seeded from the configuration and
/// therefore reproducible.
pub struct Simulation<'a> {
    net: &'a PetriNet,
    config: SimulationConfig,
}

impl<'a> Simulation<'a> {
    pub fn new(net: &'a PetriNet, config: SimulationConfig) -> Result<Self> {
        config.policy.validate()?;
        Ok(Self { net, config })
    }

    pub fn net(&self) -> &'a PetriNet {
        self.net
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[tracing::instrument(level = "info", skip_all, fields(seed = self.config.seed))]
    pub fn run(&self, initial_marking: &Marking) -> Result<SimulationResult> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.run_with_rng(initial_marking, &mut rng)
    }

    /// Run with an external random source. The configured seed is ignored.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        initial_marking: &Marking,
        rng: &mut R,
    ) -> Result<SimulationResult> {
        run_with_policy(self.net, initial_marking, rng, self.config.max_steps, &self.config.policy)
    }
}
