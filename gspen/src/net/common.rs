use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::DelaySpec;

#[derive(Eq, PartialEq, Clone, Copy, PartialOrd, Ord, Hash, Debug)]
pub struct PlaceId(pub usize);
#[derive(Eq, PartialEq, Clone, Copy, PartialOrd, Ord, Hash, Debug)]
pub struct TransitionId(pub usize);

/// Either side of an arc, as resolved from a name.
#[derive(Eq, PartialEq, Clone, Copy, Hash, Debug)]
pub enum Node {
    Place(PlaceId),
    Transition(TransitionId),
}

#[derive(Clone, Debug)]
pub struct Place {
    name: String,
}

impl Place {
    pub fn new(name: impl Into<String>) -> Self {
        Place { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionClass {
    Immediate,
    #[serde(alias = "fixed")]
    FixedDelay,
    Stochastic,
}

impl TransitionClass {
    /// Order in which the classes are considered by the scheduler.
    pub const SCHEDULING_ORDER: [TransitionClass; 3] =
        [Self::Immediate, Self::Stochastic, Self::FixedDelay];

    /// True for classes that advance the clock (FixedDelay | Stochastic)
    pub fn is_timed(&self) -> bool {
        !matches!(self, Self::Immediate)
    }
}

impl Display for TransitionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionClass::Immediate => write!(f, "immediate"),
            TransitionClass::FixedDelay => write!(f, "fixed"),
            TransitionClass::Stochastic => write!(f, "stochastic"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Transition {
    name: String,
    label: Option<String>,
    class: TransitionClass,
    priority: i64,
    delay: DelaySpec,
    pub(super) inputs: Vec<(PlaceId, u64)>,
    pub(super) outputs: Vec<(PlaceId, u64)>,
}

impl Transition {
    pub fn new(
        name: impl Into<String>,
        class: TransitionClass,
        priority: i64,
        delay: DelaySpec,
    ) -> Self {
        Transition {
            name: name.into(),
            label: None,
            class,
            priority,
            delay,
            inputs: Default::default(),
            outputs: Default::default(),
        }
    }

    pub fn immediate(name: impl Into<String>, priority: i64) -> Self {
        Self::new(name, TransitionClass::Immediate, priority, DelaySpec::Fixed { value: 0.0 })
    }

    pub fn fixed_delay(name: impl Into<String>, delay: f64) -> Self {
        Self::new(name, TransitionClass::FixedDelay, 0, DelaySpec::Fixed { value: delay })
    }

    pub fn stochastic(name: impl Into<String>, delay: DelaySpec) -> Self {
        Self::new(name, TransitionClass::Stochastic, 0, delay)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn class(&self) -> TransitionClass {
        self.class
    }

    /// Only meaningful among immediate transitions.
    pub fn priority(&self) -> i64 {
        self.priority
    }

    /// Only meaningful for timed transitions.
    pub fn delay(&self) -> &DelaySpec {
        &self.delay
    }

    /// Input places with arc weights, in arc insertion order.
    pub fn inputs(&self) -> &[(PlaceId, u64)] {
        &self.inputs
    }

    /// Output places with arc weights, in arc insertion order.
    pub fn outputs(&self) -> &[(PlaceId, u64)] {
        &self.outputs
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Arc {
    source: String,
    target: String,
    weight: i64,
}

impl Arc {
    pub fn new(source: impl Into<String>, target: impl Into<String>, weight: i64) -> Self {
        Arc { source: source.into(), target: target.into(), weight }
    }

    /// Arc with weight 1
    pub fn unit(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(source, target, 1)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn weight(&self) -> i64 {
        self.weight
    }
}

/// Token count per place name.
///
/// Places that are not listed hold no tokens. Equality ignores the order of entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marking(IndexMap<String, u64>);

impl Marking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, place: impl Into<String>, tokens: u64) -> Option<u64> {
        self.0.insert(place.into(), tokens)
    }

    pub fn with(mut self, place: impl Into<String>, tokens: u64) -> Self {
        self.set(place, tokens);
        self
    }

    pub fn get(&self, place: &str) -> u64 {
        self.0.get(place).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, &tokens)| (name.as_str(), tokens))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Marking {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Marking(iter.into_iter().map(|(name, tokens)| (name.into(), tokens)).collect())
    }
}

impl Display for Marking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (idx, (name, tokens)) in self.iter().enumerate() {
            if idx == 0 {
                write!(f, "{}: {}", name, tokens)?;
            } else {
                write!(f, ", {}: {}", name, tokens)?;
            }
        }
        write!(f, "}}")?;
        Ok(())
    }
}
