use indexmap::IndexMap;
use serde::Serialize;

use crate::net::TransitionClass;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FiringRecord {
    pub transition: String,
    pub time: f64,
}

/// Audit entry of one scheduling step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepRecord {
    /// Zero based index of the step within its run.
    pub step: usize,
    /// Clock value at which the fired transitions were recorded.
    pub time: f64,
    pub class: TransitionClass,
    /// Amount the clock advanced before firing.
    pub delay: f64,
    /// Transitions of any class enabled when the step was decided.
    pub enabled: Vec<String>,
    pub fired: Vec<String>,
}

/// Append only log of all firings of a run.
///
/// Records arrive in firing order with non-decreasing times. Members of one batch share the
/// same time.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FiringTrace {
    sequence: Vec<FiringRecord>,
    history: IndexMap<String, Vec<f64>>,
    steps: Vec<StepRecord>,
}

impl FiringTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, transition: &str, time: f64) {
        debug_assert!(
            self.sequence.last().map_or(true, |last| last.time <= time),
            "firing times must not decrease"
        );
        self.sequence.push(FiringRecord { transition: transition.to_string(), time });
        self.history.entry(transition.to_string()).or_default().push(time);
    }

    pub fn record_step(&mut self, step: StepRecord) {
        self.steps.push(step);
    }

    /// Time of the first firing of each transition that fired, in order of first firing.
    pub fn first_firing_times(&self) -> IndexMap<String, f64> {
        self.history
            .iter()
            .filter_map(|(name, times)| times.first().map(|&time| (name.clone(), time)))
            .collect()
    }

    pub fn full_sequence(&self) -> &[FiringRecord] {
        &self.sequence
    }

    pub fn transition_sequence(&self) -> impl Iterator<Item = &str> {
        self.sequence.iter().map(|rec| rec.transition.as_str())
    }

    /// All firing times of one transition. Empty if it never fired.
    pub fn history(&self, transition: &str) -> &[f64] {
        self.history.get(transition).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.sequence.last().map(|rec| rec.time)
    }
}
