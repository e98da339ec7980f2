use std::collections::HashMap;

use super::{Node, Place, PlaceId, Transition, TransitionClass, TransitionId};

/// Immutable structure of a petri net, created by [`super::PetriNetBuilder::build`].
///
/// Ids are indices into this net. Accessors taking an id panic on ids from another net.
#[derive(Default, Debug)]
pub struct PetriNet {
    pub(super) places: Vec<Place>,
    pub(super) transitions: Vec<Transition>,
    pub(super) place_index: HashMap<String, PlaceId>,
    pub(super) transition_index: HashMap<String, TransitionId>,
    pub(super) by_class: HashMap<TransitionClass, Vec<TransitionId>>,
}

impl PetriNet {
    pub fn places(&self) -> impl ExactSizeIterator<Item = (PlaceId, &Place)> {
        self.places.iter().enumerate().map(|(idx, pl)| (PlaceId(idx), pl))
    }

    pub fn transitions(&self) -> impl ExactSizeIterator<Item = (TransitionId, &Transition)> {
        self.transitions.iter().enumerate().map(|(idx, tr)| (TransitionId(idx), tr))
    }

    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn place(&self, pl_id: PlaceId) -> &Place {
        &self.places[pl_id.0]
    }

    pub fn transition(&self, tr_id: TransitionId) -> &Transition {
        &self.transitions[tr_id.0]
    }

    pub fn place_id(&self, name: &str) -> Option<PlaceId> {
        self.place_index.get(name).copied()
    }

    pub fn transition_id(&self, name: &str) -> Option<TransitionId> {
        self.transition_index.get(name).copied()
    }

    pub fn transition_by_name(&self, name: &str) -> Option<&Transition> {
        self.transition_id(name).map(|tr_id| self.transition(tr_id))
    }

    /// First transition, in insertion order, carrying the given display label.
    pub fn transition_by_label(&self, label: &str) -> Option<&Transition> {
        self.transitions.iter().find(|tr| tr.label() == Some(label))
    }

    /// Look up a place or transition by name.
    pub fn node(&self, name: &str) -> Option<Node> {
        self.place_id(name)
            .map(Node::Place)
            .or_else(|| self.transition_id(name).map(Node::Transition))
    }

    /// All transitions of the given class, in insertion order.
    pub fn transitions_of(&self, class: TransitionClass) -> &[TransitionId] {
        self.by_class.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ordered input arcs of a transition as (place, weight).
    pub fn inputs(&self, tr_id: TransitionId) -> &[(PlaceId, u64)] {
        self.transition(tr_id).inputs()
    }

    /// Ordered output arcs of a transition as (place, weight).
    pub fn outputs(&self, tr_id: TransitionId) -> &[(PlaceId, u64)] {
        self.transition(tr_id).outputs()
    }
}
