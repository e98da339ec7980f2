#![allow(dead_code)]
use gspen::net::{Arc, PetriNet, PetriNetBuilder, Place, Transition};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .compact()
        .with_env_filter(EnvFilter::try_new("warn,gspen=debug").unwrap())
        .try_init();
}

/// Assemble a net from places, transitions and weighted arcs.
pub fn build_net(places: &[&str], transitions: Vec<Transition>, arcs: &[(&str, &str, i64)]) -> PetriNet {
    let mut net = PetriNetBuilder::default();
    for pl in places {
        net.insert_place(Place::new(*pl));
    }
    for tr in transitions {
        net.insert_transition(tr);
    }
    for (source, target, weight) in arcs {
        net.insert_arc(Arc::new(*source, *target, *weight)).unwrap();
    }
    net.build().unwrap()
}
