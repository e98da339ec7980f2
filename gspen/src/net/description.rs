//! Serializable description of a net and its initial marking.
//!
//! This is the format external loaders hand to the engine. Converting it into a
//! [`PetriNetBuilder`] is a pure mapping; all structural checks happen in the builder.
//!
//! ```json
//! {
//!   "places": [{ "name": "P1", "tokens": 1 }, { "name": "P2" }],
//!   "transitions": [
//!     { "name": "T1", "type": "immediate", "priority": 2, "input": ["P1"], "output": ["P2"] },
//!     { "name": "T2", "type": "stochastic", "distribution": "normal",
//!       "params": { "mean": 3.0, "std_dev": 0.5 },
//!       "input": [{ "place": "P2", "weight": 2 }], "output": [] }
//!   ]
//! }
//! ```
use std::{
    collections::{BTreeMap, HashSet},
    fs::File,
    io::{BufReader, BufWriter, Read},
    path::Path,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{PetriError, Result};

use super::{Arc, DelaySpec, Marking, PetriNet, PetriNetBuilder, Place, Transition, TransitionClass};

const DEFAULT_PRIORITY: i64 = 1;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub places: Vec<PlaceDescription>,
    #[serde(default)]
    pub transitions: Vec<TransitionDescription>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceDescription {
    pub name: String,
    #[serde(default)]
    pub tokens: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionDescription {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", alias = "class")]
    pub class: TransitionClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_time: Option<f64>,
    #[serde(default, alias = "inputs")]
    pub input: Vec<ArcDescription>,
    #[serde(default, alias = "outputs")]
    pub output: Vec<ArcDescription>,
}

/// An arc given either as bare place name (weight 1) or with an explicit weight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArcDescription {
    Place(String),
    Weighted {
        place: String,
        #[serde(default = "unit_weight")]
        weight: i64,
    },
}

fn unit_weight() -> i64 {
    1
}

impl ArcDescription {
    pub fn place(&self) -> &str {
        match self {
            ArcDescription::Place(place) => place,
            ArcDescription::Weighted { place, .. } => place,
        }
    }

    pub fn weight(&self) -> i64 {
        match self {
            ArcDescription::Place(_) => 1,
            ArcDescription::Weighted { weight, .. } => *weight,
        }
    }

    fn new(place: &str, weight: i64) -> Self {
        if weight == 1 {
            ArcDescription::Place(place.to_string())
        } else {
            ArcDescription::Weighted { place: place.to_string(), weight }
        }
    }
}

impl TransitionDescription {
    /// Delay distribution, filling in the defaults of missing parameters.
    ///
    /// Without an explicit distribution, fixed delay transitions wait `fixed_time` and all
    /// others draw from an exponential distribution.
    pub fn delay_spec(&self) -> DelaySpec {
        let param = |key: &str, default: f64| self.params.get(key).copied().unwrap_or(default);
        let rate = || self.rate.unwrap_or_else(|| param("rate", 1.0));
        let fixed_time = || self.fixed_time.unwrap_or_else(|| param("value", 0.0));
        match self.distribution.as_deref() {
            None if self.class == TransitionClass::FixedDelay => {
                DelaySpec::Fixed { value: fixed_time() }
            }
            None | Some("exponential") => DelaySpec::Exponential { rate: rate() },
            Some("normal") => {
                DelaySpec::Normal { mean: param("mean", 1.0), std_dev: param("std_dev", 0.1) }
            }
            Some("lognormal") => {
                DelaySpec::LogNormal { mu: param("mu", 0.0), sigma: param("sigma", 1.0) }
            }
            Some("fixed") => DelaySpec::Fixed { value: fixed_time() },
            Some(other) => DelaySpec::Unsupported { kind: other.to_string() },
        }
    }

    fn to_transition(&self) -> Transition {
        let priority = self.priority.unwrap_or(DEFAULT_PRIORITY);
        let transition = Transition::new(&self.name, self.class, priority, self.delay_spec());
        match &self.label {
            Some(label) => transition.with_label(label),
            None => transition,
        }
    }

    fn from_transition(transition: &Transition) -> Self {
        let mut result = TransitionDescription {
            name: transition.name().to_string(),
            label: transition.label().map(str::to_string),
            class: transition.class(),
            priority: None,
            distribution: None,
            params: Default::default(),
            rate: None,
            fixed_time: None,
            input: Default::default(),
            output: Default::default(),
        };
        if !transition.class().is_timed() {
            result.priority = Some(transition.priority());
            return result;
        }
        result.distribution = Some(transition.delay().kind().to_string());
        match transition.delay() {
            DelaySpec::Exponential { rate } => {
                result.params.insert("rate".into(), *rate);
            }
            DelaySpec::Normal { mean, std_dev } => {
                result.params.insert("mean".into(), *mean);
                result.params.insert("std_dev".into(), *std_dev);
            }
            DelaySpec::LogNormal { mu, sigma } => {
                result.params.insert("mu".into(), *mu);
                result.params.insert("sigma".into(), *sigma);
            }
            DelaySpec::Fixed { value } => result.fixed_time = Some(*value),
            DelaySpec::Unsupported { .. } => {}
        }
        result
    }
}

impl NetDescription {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), self)?;
        Ok(())
    }

    /// Map the description onto a net builder and the initial marking.
    pub fn into_parts(self) -> Result<(PetriNetBuilder, Marking)> {
        let mut builder = PetriNetBuilder::default();
        let mut marking = Marking::new();
        let mut seen = HashSet::new();
        for place in &self.places {
            if !seen.insert(place.name.as_str()) {
                return Err(PetriError::StructureError(format!(
                    "Place '{}' is declared more than once.",
                    place.name
                )));
            }
            builder.insert_place(Place::new(&place.name));
            marking.set(&place.name, place.tokens);
        }
        for transition in &self.transitions {
            if !seen.insert(transition.name.as_str()) {
                return Err(PetriError::StructureError(format!(
                    "Transition '{}' is declared more than once or shares its name with a place.",
                    transition.name
                )));
            }
            builder.insert_transition(transition.to_transition());
        }
        // A place listed more than once contributes once per entry.
        let mut arcs: IndexMap<(&str, &str), i64> = IndexMap::new();
        for transition in &self.transitions {
            let name = transition.name.as_str();
            let inputs = transition.input.iter().map(|arc| ((arc.place(), name), arc.weight()));
            let outputs = transition.output.iter().map(|arc| ((name, arc.place()), arc.weight()));
            for ((source, target), weight) in inputs.chain(outputs) {
                if weight <= 0 {
                    return Err(PetriError::StructureError(format!(
                        "Arc '{source}' -> '{target}' cannot be added, weight {weight} is not positive."
                    )));
                }
                *arcs.entry((source, target)).or_default() += weight;
            }
        }
        for ((source, target), weight) in arcs {
            builder.insert_arc(Arc::new(source, target, weight))?;
        }
        Ok((builder, marking))
    }

    /// Build the net right away.
    pub fn into_net(self) -> Result<(PetriNet, Marking)> {
        let (builder, marking) = self.into_parts()?;
        Ok((builder.build()?, marking))
    }

    /// Describe an existing builder. Places missing from `initial_marking` get no tokens.
    pub fn from_builder(builder: &PetriNetBuilder, initial_marking: &Marking) -> Self {
        let places = builder
            .places()
            .keys()
            .map(|name| PlaceDescription { name: name.clone(), tokens: initial_marking.get(name) })
            .collect();
        let mut transitions: IndexMap<&str, TransitionDescription> = builder
            .transitions()
            .iter()
            .map(|(name, tr)| (name.as_str(), TransitionDescription::from_transition(tr)))
            .collect();
        for ((source, target), arc) in builder.arcs() {
            // Note: arcs in a builder are validated, exactly one side is a transition.
            if let Some(tr) = transitions.get_mut(target.as_str()) {
                tr.input.push(ArcDescription::new(source, arc.weight()));
            } else if let Some(tr) = transitions.get_mut(source.as_str()) {
                tr.output.push(ArcDescription::new(target, arc.weight()));
            }
        }
        NetDescription { name: None, places, transitions: transitions.into_values().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GSPN_JSON: &str = r#"{
        "places": [
            { "name": "P1", "tokens": 1 },
            { "name": "P2", "tokens": 1 },
            { "name": "P3" },
            { "name": "P4" }
        ],
        "transitions": [
            { "name": "T1", "type": "immediate", "priority": 2, "input": ["P1", "P2"], "output": ["P3"] },
            { "name": "T2", "type": "stochastic", "rate": 2.0, "input": ["P3"], "output": [{ "place": "P4", "weight": 2 }] },
            { "name": "T3", "type": "fixed", "fixed_time": 4.5, "input": [{ "place": "P4", "weight": 2 }], "output": [] }
        ]
    }"#;

    #[test]
    fn parses_type_tagged_transition_layout() {
        let (net, marking) = NetDescription::from_json_str(GSPN_JSON).unwrap().into_net().unwrap();
        assert_eq!(marking, Marking::new().with("P1", 1).with("P2", 1).with("P3", 0).with("P4", 0));

        let t1 = net.transition_by_name("T1").unwrap();
        assert_eq!(t1.class(), TransitionClass::Immediate);
        assert_eq!(t1.priority(), 2);
        assert_eq!(t1.inputs().len(), 2);

        let t2 = net.transition_by_name("T2").unwrap();
        assert_eq!(t2.delay(), &DelaySpec::Exponential { rate: 2.0 });
        assert_eq!(t2.outputs(), &[(net.place_id("P4").unwrap(), 2)]);

        let t3 = net.transition_by_name("T3").unwrap();
        assert_eq!(t3.class(), TransitionClass::FixedDelay);
        assert_eq!(t3.delay(), &DelaySpec::Fixed { value: 4.5 });
    }

    #[test]
    fn distribution_parameters_fall_back_to_defaults() {
        let tr: TransitionDescription = serde_json::from_str(
            r#"{ "name": "t", "type": "stochastic", "distribution": "normal", "params": { "mean": 3.0 } }"#,
        )
        .unwrap();
        assert_eq!(tr.delay_spec(), DelaySpec::Normal { mean: 3.0, std_dev: 0.1 });

        let tr: TransitionDescription =
            serde_json::from_str(r#"{ "name": "t", "type": "stochastic", "distribution": "lognormal" }"#)
                .unwrap();
        assert_eq!(tr.delay_spec(), DelaySpec::LogNormal { mu: 0.0, sigma: 1.0 });

        let tr: TransitionDescription =
            serde_json::from_str(r#"{ "name": "t", "type": "stochastic" }"#).unwrap();
        assert_eq!(tr.delay_spec(), DelaySpec::default());
        assert_eq!(tr.to_transition().priority(), DEFAULT_PRIORITY);
    }

    #[test]
    fn unknown_distribution_is_kept_for_the_sampler() {
        let tr: TransitionDescription = serde_json::from_str(
            r#"{ "name": "t", "type": "stochastic", "distribution": "weibull" }"#,
        )
        .unwrap();
        assert_eq!(tr.delay_spec(), DelaySpec::Unsupported { kind: "weibull".into() });
    }

    #[test]
    fn duplicate_declarations_are_structure_errors() {
        let desc = NetDescription::from_json_str(
            r#"{ "places": [{ "name": "a" }], "transitions": [{ "name": "a", "type": "immediate" }] }"#,
        )
        .unwrap();
        assert!(matches!(desc.into_parts(), Err(PetriError::StructureError(_))));
    }

    #[test]
    fn negative_arc_weight_is_a_structure_error() {
        let desc = NetDescription::from_json_str(
            r#"{ "places": [{ "name": "a" }],
                 "transitions": [{ "name": "t", "type": "immediate", "input": [{ "place": "a", "weight": -1 }] }] }"#,
        )
        .unwrap();
        assert!(matches!(desc.into_parts(), Err(PetriError::StructureError(_))));
    }

    #[test]
    fn repeated_places_add_up_their_weights() {
        let (net, _) = NetDescription::from_json_str(
            r#"{ "places": [{ "name": "P1", "tokens": 1 }, { "name": "P2" }],
                 "transitions": [{ "name": "T", "type": "immediate",
                                   "input": ["P1", { "place": "P1", "weight": 2 }],
                                   "output": ["P2", "P2"] }] }"#,
        )
        .unwrap()
        .into_net()
        .unwrap();
        let t = net.transition_by_name("T").unwrap();
        assert_eq!(t.inputs(), &[(net.place_id("P1").unwrap(), 3)]);
        assert_eq!(t.outputs(), &[(net.place_id("P2").unwrap(), 2)]);
    }

    #[test]
    fn repeated_negative_entries_still_fail() {
        let desc = NetDescription::from_json_str(
            r#"{ "places": [{ "name": "a" }],
                 "transitions": [{ "name": "t", "type": "immediate",
                                   "input": [{ "place": "a", "weight": 3 }, { "place": "a", "weight": -1 }] }] }"#,
        )
        .unwrap();
        assert!(matches!(desc.into_parts(), Err(PetriError::StructureError(_))));
    }

    #[test]
    fn builder_description_survives_a_file_round_trip() {
        let (builder, marking) =
            NetDescription::from_json_str(GSPN_JSON).unwrap().into_parts().unwrap();
        let path = std::env::temp_dir().join(format!("gspen-desc-{}.json", std::process::id()));
        builder.save(&path, &marking).unwrap();
        let (loaded, loaded_marking) = PetriNetBuilder::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded_marking, marking);
        assert_eq!(loaded.arcs(), builder.arcs());
        let t2 = &loaded.transitions()["T2"];
        assert_eq!(t2.delay(), &DelaySpec::Exponential { rate: 2.0 });
        assert_eq!(loaded.transitions()["T1"].priority(), 2);
    }
}
