use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{PetriError, Result};

use super::{
    description::NetDescription, Arc, Marking, Node, PetriNet, Place, PlaceId, Transition,
    TransitionId,
};

#[derive(Default, Clone)]
pub struct PetriNetBuilder {
    places: IndexMap<String, Place>,
    transitions: IndexMap<String, Transition>,
    arcs: IndexMap<(String, String), Arc>, // key: (source name, target name)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Place,
    Transition,
}

impl NodeKind {
    fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Place => "place",
            NodeKind::Transition => "transition",
        }
    }
}

impl PetriNetBuilder {
    /// Load a net and its initial marking from a json net description.
    pub fn load(path: &Path) -> Result<(PetriNetBuilder, Marking)> {
        NetDescription::load(path)?.into_parts()
    }

    /// Store this net and the given initial marking as a json net description.
    pub fn save(&self, path: &Path, initial_marking: &Marking) -> Result<()> {
        NetDescription::from_builder(self, initial_marking).save(path)
    }

    pub fn transitions(&self) -> &IndexMap<String, Transition> {
        &self.transitions
    }

    pub fn places(&self) -> &IndexMap<String, Place> {
        &self.places
    }

    pub fn arcs(&self) -> &IndexMap<(String, String), Arc> {
        &self.arcs
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty() && self.transitions.is_empty() && self.arcs.is_empty()
    }

    /// Insert place into this petri net.
    ///
    /// Returns the existing place for this name, or None if the name is not in use.
    pub fn insert_place(&mut self, place: Place) -> Option<Place> {
        self.places.insert(place.name().to_string(), place)
    }

    /// Insert transition into this petri net.
    ///
    /// Returns the existing transition for this name, or None if the name is not in use.
    pub fn insert_transition(&mut self, transition: Transition) -> Option<Transition> {
        self.transitions.insert(transition.name().to_string(), transition)
    }

    /// Insert arc into this petri net.
    ///
    /// Both ends must already exist and the arc must connect a place with a transition.
    /// Returns the existing arc between the same source and target, or None.
    pub fn insert_arc(&mut self, arc: Arc) -> Result<Option<Arc>> {
        self.check_arc(&arc)?;
        let key = (arc.source().to_string(), arc.target().to_string());
        Ok(self.arcs.insert(key, arc))
    }

    fn resolve(&self, name: &str) -> Result<NodeKind> {
        match (self.places.contains_key(name), self.transitions.contains_key(name)) {
            (true, false) => Ok(NodeKind::Place),
            (false, true) => Ok(NodeKind::Transition),
            (true, true) => Err(PetriError::StructureError(format!(
                "'{name}' is used as place and as transition name."
            ))),
            (false, false) => Err(PetriError::StructureError(format!(
                "'{name}' is neither a place nor a transition."
            ))),
        }
    }

    fn check_arc(&self, arc: &Arc) -> Result<u64> {
        let source = arc.source();
        let target = arc.target();
        let weight = arc.weight();
        if weight <= 0 {
            return Err(PetriError::StructureError(format!(
                "Arc '{source}' -> '{target}' cannot be added, weight {weight} is not positive."
            )));
        }
        let source_kind = self.resolve(source)?;
        let target_kind = self.resolve(target)?;
        if source_kind == target_kind {
            let kind = source_kind.as_str();
            return Err(PetriError::StructureError(format!(
                "Arc '{source}' -> '{target}' cannot be added, it connects {kind} to {kind}."
            )));
        }
        Ok(weight as u64)
    }

    /// Build the immutable PetriNet
    ///
    /// Ids are assigned in insertion order. Arcs are validated again, since places or
    /// transitions may have been replaced after the arc was inserted.
    pub fn build(&self) -> Result<PetriNet> {
        if let Some(name) = self.places.keys().find(|name| self.transitions.contains_key(*name)) {
            return Err(PetriError::StructureError(format!(
                "'{name}' is used as place and as transition name."
            )));
        }
        let mut net = PetriNet::default();
        for (pl_name, pl_data) in &self.places {
            net.place_index.insert(pl_name.clone(), PlaceId(net.places.len()));
            net.places.push(pl_data.clone());
        }
        for (tr_name, tr_data) in &self.transitions {
            let tr_id = TransitionId(net.transitions.len());
            let mut transition = tr_data.clone();
            transition.inputs.clear();
            transition.outputs.clear();
            net.transition_index.insert(tr_name.clone(), tr_id);
            net.by_class.entry(transition.class()).or_default().push(tr_id);
            net.transitions.push(transition);
        }
        for ((source, target), arc) in &self.arcs {
            let weight = self.check_arc(arc)?;
            match (net.node(source), net.node(target)) {
                (Some(Node::Place(pl_id)), Some(Node::Transition(tr_id))) => {
                    net.transitions[tr_id.0].inputs.push((pl_id, weight));
                }
                (Some(Node::Transition(tr_id)), Some(Node::Place(pl_id))) => {
                    net.transitions[tr_id.0].outputs.push((pl_id, weight));
                }
                _ => {
                    return Err(PetriError::StructureError(format!(
                        "Arc '{source}' -> '{target}' does not connect a place with a transition."
                    )));
                }
            }
        }
        let places = net.places.len();
        let transitions = net.transitions.len();
        let arcs = self.arcs.len();
        debug!(places, transitions, arcs, "Constructed net.");
        Ok(net)
    }
}
