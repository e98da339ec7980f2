//! Simulate a net from a json description.
//!
//! Usage: `cargo run --example 02-from-json -- [path] [seed] [max_steps]`
use std::path::PathBuf;

use gspen::{
    error::{PetriError, Result as PetriResult},
    net::PetriNetBuilder,
    sim::{SimulationConfigBuilder, Simulation},
};
use tracing_subscriber::EnvFilter;

fn parse<T: std::str::FromStr>(arg: Option<String>, what: &str) -> PetriResult<Option<T>> {
    arg.map(|value| {
        value
            .parse()
            .map_err(|_| PetriError::ValueError(format!("'{value}' is not a valid {what}.")))
    })
    .transpose()
}

#[tracing::instrument(level = "info")]
fn run(path: PathBuf, seed: u64, max_steps: Option<usize>) -> PetriResult<()> {
    let (builder, initial) = PetriNetBuilder::load(&path)?;
    let net = builder.build()?;

    let mut config = SimulationConfigBuilder::default();
    config.seed(seed);
    if let Some(max_steps) = max_steps {
        config.max_steps(max_steps);
    }
    let result = Simulation::new(&net, config.build()?)?.run(&initial)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn main() -> PetriResult<()> {
    // set up logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .compact()
        .with_env_filter(EnvFilter::try_new("info,gspen=debug").unwrap())
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().map(PathBuf::from).unwrap_or_else(|| {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/two_stage.json")
    });
    let seed = parse(args.next(), "seed")?.unwrap_or(0);
    let max_steps = parse(args.next(), "step budget")?;
    run(path, seed, max_steps)
}
