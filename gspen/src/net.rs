mod builder;
mod common;
mod delay;
pub mod description;
mod net_state;

pub use builder::PetriNetBuilder;
pub use common::{Arc, Marking, Node, Place, PlaceId, Transition, TransitionClass, TransitionId};
pub use delay::DelaySpec;
pub use description::NetDescription;
pub use net_state::PetriNet;
