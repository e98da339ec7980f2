use rand::{seq::index, seq::SliceRandom, Rng};
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::Result;
use crate::net::{PetriNet, TransitionClass, TransitionId};

use super::{
    sample_delay, DelayAggregation, FiringTrace, MarkingStore, SchedulingMode, SchedulingPolicy,
    StepRecord,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// Looking for enabled immediate transitions. Every step starts here.
    SelectingImmediate,
    /// No immediate transition was enabled, the last step fired timed transitions.
    SelectingTimed,
    /// Nothing was enabled. Further steps do nothing.
    Terminal,
}

/// Simulated time of a run. Only moves forward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Clock {
    now: f64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub(crate) fn advance(&mut self, delay: f64) {
        debug_assert!(delay >= 0.0, "clock cannot go backwards");
        self.now += delay;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Number of transitions fired by the step.
    Fired(usize),
    Terminal,
}

/// Selected batch of one step.
struct Decision {
    class: TransitionClass,
    batch: Vec<TransitionId>,
    /// Clock advance before firing.
    delay: f64,
    /// Clock advance after firing, only used by uniform scheduling.
    settle: f64,
}

/// Decides which transitions fire next and when.
///
/// Each step picks one class. Enabled immediate transitions of the highest priority win and
/// fire at the current time. Otherwise a random subset of the enabled stochastic transitions
/// fires after the aggregated sampled delay, or failing that a random subset of the enabled
/// fixed delay transitions fires after the delay of the first one selected.
///
/// Members of a batch are admitted in selection order by reserving their input tokens from the
/// marking at decision time. A member whose inputs are already reserved by an earlier member is
/// left out, so firing the whole batch can never drive a count below zero.
pub struct Scheduler<'a> {
    net: &'a PetriNet,
    policy: SchedulingPolicy,
    state: SchedulerState,
    steps: usize,
}

impl<'a> Scheduler<'a> {
    pub fn new(net: &'a PetriNet, policy: SchedulingPolicy) -> Self {
        Self { net, policy, state: SchedulerState::SelectingImmediate, steps: 0 }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Number of steps that fired something.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    pub fn any_enabled(&self, marking: &MarkingStore) -> bool {
        self.net.transitions().any(|(tr_id, _)| marking.is_enabled(tr_id))
    }

    /// Every enabled transition of any class, in net order.
    pub fn all_enabled(&self, marking: &MarkingStore) -> Vec<TransitionId> {
        self.net.transitions().map(|(tr_id, _)| tr_id).filter(|&tr_id| marking.is_enabled(tr_id)).collect()
    }

    /// Run one scheduling step: decide a batch, advance the clock and fire the batch.
    ///
    /// `limit` caps the number of firings of this step. Delays are only sampled for transitions
    /// that actually fire.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        marking: &mut MarkingStore,
        firings: &mut FiringTrace,
        clock: &mut Clock,
        rng: &mut R,
        limit: Option<usize>,
    ) -> Result<StepOutcome> {
        if self.state == SchedulerState::Terminal {
            return Ok(StepOutcome::Terminal);
        }
        let enabled = self.all_enabled(marking);
        let decision = match self.policy.mode {
            SchedulingMode::Classed => self.decide_classed(marking, rng, limit)?,
            SchedulingMode::Uniform { step } => self.decide_uniform(&enabled, rng, step),
        };
        let Some(decision) = decision else {
            self.state = SchedulerState::Terminal;
            debug!(time = clock.now(), "No transition enabled.");
            return Ok(StepOutcome::Terminal);
        };

        clock.advance(decision.delay);
        let now = clock.now();
        for &tr_id in &decision.batch {
            marking.apply(tr_id);
            let name = self.net.transition(tr_id).name();
            firings.record(name, now);
            debug!(transition = name, time = now, marking = %marking.snapshot(), "Fired.");
        }
        let names = |ids: &[TransitionId]| {
            ids.iter().map(|&tr_id| self.net.transition(tr_id).name().to_string()).collect()
        };
        firings.record_step(StepRecord {
            step: self.steps,
            time: now,
            class: decision.class,
            delay: decision.delay,
            enabled: names(&enabled),
            fired: names(&decision.batch),
        });
        self.steps += 1;
        if decision.settle > 0.0 && self.any_enabled(marking) {
            clock.advance(decision.settle);
        }
        Ok(StepOutcome::Fired(decision.batch.len()))
    }

    fn decide_classed<R: Rng + ?Sized>(
        &mut self,
        marking: &MarkingStore,
        rng: &mut R,
        limit: Option<usize>,
    ) -> Result<Option<Decision>> {
        let limit = limit.unwrap_or(usize::MAX);
        let immediate = marking.enabled(self.net.transitions_of(TransitionClass::Immediate));
        if let Some(top) = immediate.iter().map(|&tr_id| self.net.transition(tr_id).priority()).max()
        {
            self.state = SchedulerState::SelectingImmediate;
            trace!(enabled = immediate.len(), priority = top, "Immediate transitions enabled.");
            let candidates = immediate
                .iter()
                .copied()
                .filter(|&tr_id| self.net.transition(tr_id).priority() == top);
            let batch = self.reserve(marking, candidates, limit);
            return Ok(Some(Decision {
                class: TransitionClass::Immediate,
                batch,
                delay: 0.0,
                settle: 0.0,
            }));
        }

        self.state = SchedulerState::SelectingTimed;
        for class in TransitionClass::SCHEDULING_ORDER.into_iter().filter(|cl| cl.is_timed()) {
            let enabled = marking.enabled(self.net.transitions_of(class));
            if enabled.is_empty() {
                continue;
            }
            let cap = match class {
                TransitionClass::Stochastic => self.policy.stochastic_batch_cap,
                _ => self.policy.fixed_batch_cap,
            };
            let amount = cap.min(limit).min(enabled.len());
            trace!(%class, enabled = enabled.len(), amount, "Timed transitions enabled.");
            let selected = index::sample(rng, enabled.len(), amount).into_iter().map(|idx| enabled[idx]);
            let batch = self.reserve(marking, selected, limit);
            let delay = match class {
                TransitionClass::Stochastic => {
                    let mut delays = Vec::with_capacity(batch.len());
                    for &tr_id in &batch {
                        delays.push(sample_delay(self.net.transition(tr_id).delay(), rng)?);
                    }
                    self.aggregate(&delays)
                }
                _ => match batch.first() {
                    Some(&tr_id) => sample_delay(self.net.transition(tr_id).delay(), rng)?,
                    None => 0.0,
                },
            };
            return Ok(Some(Decision { class, batch, delay, settle: 0.0 }));
        }
        Ok(None)
    }

    fn decide_uniform<R: Rng + ?Sized>(
        &mut self,
        enabled: &[TransitionId],
        rng: &mut R,
        step: f64,
    ) -> Option<Decision> {
        let chosen = *enabled.choose(rng)?;
        self.state = SchedulerState::SelectingTimed;
        Some(Decision {
            class: self.net.transition(chosen).class(),
            batch: vec![chosen],
            delay: 0.0,
            settle: step,
        })
    }

    fn aggregate(&self, delays: &[f64]) -> f64 {
        let folded = match self.policy.stochastic_delay {
            DelayAggregation::Max => delays.iter().copied().reduce(f64::max),
            DelayAggregation::Min => delays.iter().copied().reduce(f64::min),
        };
        folded.unwrap_or(0.0)
    }

    /// Admit candidates in order while their inputs can still be covered by the tokens not
    /// reserved by earlier members.
    fn reserve(
        &self,
        marking: &MarkingStore,
        candidates: impl IntoIterator<Item = TransitionId>,
        limit: usize,
    ) -> Vec<TransitionId> {
        let mut available = marking.counts().to_vec();
        let mut batch = Vec::new();
        for tr_id in candidates {
            if batch.len() >= limit {
                break;
            }
            let inputs = self.net.inputs(tr_id);
            if inputs.iter().all(|&(pl_id, weight)| available[pl_id.0] >= weight) {
                for &(pl_id, weight) in inputs {
                    available[pl_id.0] -= weight;
                }
                batch.push(tr_id);
            } else {
                trace!(transition = self.net.transition(tr_id).name(), "Left out of batch, inputs already reserved.");
            }
        }
        batch
    }
}
