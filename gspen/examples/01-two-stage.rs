use gspen::{
    error::Result as PetriResult,
    net::{Arc, DelaySpec, Marking, PetriNetBuilder, Place, Transition},
    sim::{SimulationConfigBuilder, Simulation},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tracing::instrument(level = "info")]
fn run() -> PetriResult<()> {
    // two tokens are merged immediately, the result leaves after a random delay
    let mut net = PetriNetBuilder::default();
    net.insert_place(Place::new("P1"));
    net.insert_place(Place::new("P2"));
    net.insert_place(Place::new("P3"));
    net.insert_place(Place::new("P4"));
    net.insert_transition(Transition::immediate("T1", 1).with_label("merge"));
    net.insert_transition(
        Transition::stochastic("T2", DelaySpec::Exponential { rate: 2.0 }).with_label("leave"),
    );
    net.insert_arc(Arc::unit("P1", "T1"))?;
    net.insert_arc(Arc::unit("P2", "T1"))?;
    net.insert_arc(Arc::unit("T1", "P3"))?;
    net.insert_arc(Arc::unit("P3", "T2"))?;
    net.insert_arc(Arc::unit("T2", "P4"))?;
    let net = net.build()?;

    let config = SimulationConfigBuilder::default().seed(2024u64).build()?;
    let simulation = Simulation::new(&net, config)?;
    let result = simulation.run(&Marking::new().with("P1", 1).with("P2", 1))?;

    for (transition, time) in result.first_firing_times() {
        info!(transition = %transition, time, "First firing.");
    }
    info!(termination = ?result.termination, marking = %result.final_marking, "Done.");
    Ok(())
}

fn main() -> PetriResult<()> {
    // set up logging
    tracing_subscriber::fmt()
        .with_span_events(
            tracing_subscriber::fmt::format::FmtSpan::CLOSE
                | tracing_subscriber::fmt::format::FmtSpan::NEW,
        )
        .compact()
        .with_env_filter(EnvFilter::try_new("info,gspen=debug").unwrap())
        .init();

    run()
}
