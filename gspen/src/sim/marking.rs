use crate::error::{PetriError, Result};
use crate::net::{Marking, PetriNet, PlaceId, TransitionId};

/// Token counts of one simulation run, indexed by place id.
///
/// Owned by a single run. Firing is atomic: a transition either consumes all of its inputs and
/// produces all of its outputs, or the store is left untouched.
#[derive(Clone, Debug)]
pub struct MarkingStore<'a> {
    net: &'a PetriNet,
    tokens: Vec<u64>,
}

impl<'a> MarkingStore<'a> {
    /// Places missing from `initial` start empty. Names that are not places of `net` are
    /// rejected.
    pub fn new(net: &'a PetriNet, initial: &Marking) -> Result<Self> {
        let mut tokens = vec![0; net.place_count()];
        for (name, count) in initial.iter() {
            let pl_id = net.place_id(name).ok_or_else(|| {
                PetriError::ValueError(format!("Initial marking refers to unknown place '{name}'."))
            })?;
            tokens[pl_id.0] = count;
        }
        Ok(Self { net, tokens })
    }

    pub fn net(&self) -> &'a PetriNet {
        self.net
    }

    pub fn tokens(&self, pl_id: PlaceId) -> u64 {
        self.tokens[pl_id.0]
    }

    pub fn total_tokens(&self) -> u64 {
        self.tokens.iter().sum()
    }

    pub(crate) fn counts(&self) -> &[u64] {
        &self.tokens
    }

    pub fn is_enabled(&self, tr_id: TransitionId) -> bool {
        self.net.inputs(tr_id).iter().all(|&(pl_id, weight)| self.tokens[pl_id.0] >= weight)
    }

    /// Enabled members of `candidates`, keeping their order.
    pub fn enabled(&self, candidates: &[TransitionId]) -> Vec<TransitionId> {
        candidates.iter().copied().filter(|&tr_id| self.is_enabled(tr_id)).collect()
    }

    /// Fire a transition: remove input tokens, then add output tokens.
    ///
    /// Panics if the transition is not enabled or an output count would exceed `u64::MAX`. The
    /// scheduler only fires enabled transitions.
    pub fn apply(&mut self, tr_id: TransitionId) {
        let net = self.net;
        let name = net.transition(tr_id).name();
        assert!(self.is_enabled(tr_id), "Transition '{name}' fired while not enabled.");
        for &(pl_id, weight) in net.outputs(tr_id) {
            let consumed =
                net.inputs(tr_id).iter().find(|(input, _)| *input == pl_id).map_or(0, |&(_, w)| w);
            assert!(
                (self.tokens[pl_id.0] - consumed).checked_add(weight).is_some(),
                "Transition '{name}' overflows the token count of place '{}'.",
                net.place(pl_id).name()
            );
        }
        for &(pl_id, weight) in net.inputs(tr_id) {
            self.tokens[pl_id.0] -= weight;
        }
        for &(pl_id, weight) in net.outputs(tr_id) {
            self.tokens[pl_id.0] += weight;
        }
    }

    /// Copy of the current counts for every place, in place order.
    pub fn snapshot(&self) -> Marking {
        self.net
            .places()
            .map(|(pl_id, place)| (place.name(), self.tokens[pl_id.0]))
            .collect()
    }
}
