//! Discrete-event simulation of generalized stochastic petri nets.
//!
//! A net is assembled with [`net::PetriNetBuilder`] (or loaded from a json description) and
//! simulated with [`sim::Simulation`] or [`sim::run`]. Runs are driven by an explicit random
//! source and are reproducible for a given seed.
pub mod error;
pub mod net;
pub mod sim;

pub use error::{PetriError, Result};
