use gspen::net::{
    Arc, DelaySpec, Marking, PetriNet, PetriNetBuilder, Place, Transition, TransitionClass,
};
use gspen::sim::{Simulation, SimulationConfigBuilder, SimulationResult, Termination};
use proptest::collection::vec;
use proptest::prelude::*;

const BUDGET: usize = 60;

#[derive(Clone, Debug)]
struct TransitionShape {
    class: u8,
    priority: i64,
    delay: f64,
    inputs: Vec<(usize, i64)>,
    outputs: Vec<(usize, i64)>,
}

#[derive(Clone, Debug)]
struct NetShape {
    places: usize,
    transitions: Vec<TransitionShape>,
    tokens: Vec<u64>,
}

fn arcs(places: usize) -> impl Strategy<Value = Vec<(usize, i64)>> {
    vec((0..places, 1i64..3), 0..3)
}

fn net_shape() -> impl Strategy<Value = NetShape> {
    (1usize..5)
        .prop_flat_map(|places| {
            let transition = (0u8..3, 0i64..3, 0.1f64..4.0, arcs(places), arcs(places)).prop_map(
                |(class, priority, delay, inputs, outputs)| TransitionShape {
                    class,
                    priority,
                    delay,
                    inputs,
                    outputs,
                },
            );
            (Just(places), vec(transition, 1..6), vec(0u64..4, places))
        })
        .prop_map(|(places, transitions, tokens)| NetShape { places, transitions, tokens })
}

/// Like `net_shape`, but every transition consumes and nothing is produced.
fn draining_shape() -> impl Strategy<Value = NetShape> {
    net_shape().prop_map(|mut shape| {
        for tr in &mut shape.transitions {
            tr.outputs.clear();
            if tr.inputs.is_empty() {
                tr.inputs.push((0, 1));
            }
        }
        shape
    })
}

fn build(shape: &NetShape) -> (PetriNet, Marking) {
    let mut builder = PetriNetBuilder::default();
    for idx in 0..shape.places {
        builder.insert_place(Place::new(format!("p{idx}")));
    }
    for (idx, tr) in shape.transitions.iter().enumerate() {
        let name = format!("t{idx}");
        let transition = match tr.class {
            0 => Transition::immediate(&name, tr.priority),
            1 => Transition::fixed_delay(&name, tr.delay),
            _ => Transition::stochastic(&name, DelaySpec::Exponential { rate: tr.delay }),
        };
        builder.insert_transition(transition);
        for &(pl, weight) in &tr.inputs {
            builder.insert_arc(Arc::new(format!("p{pl}"), &name, weight)).unwrap();
        }
        for &(pl, weight) in &tr.outputs {
            builder.insert_arc(Arc::new(&name, format!("p{pl}"), weight)).unwrap();
        }
    }
    let marking = shape.tokens.iter().enumerate().map(|(idx, &count)| (format!("p{idx}"), count)).collect();
    (builder.build().unwrap(), marking)
}

fn simulate(net: &PetriNet, initial: &Marking, seed: u64, max_steps: Option<usize>) -> SimulationResult {
    let mut config = SimulationConfigBuilder::default();
    config.seed(seed);
    if let Some(max_steps) = max_steps {
        config.max_steps(max_steps);
    }
    Simulation::new(net, config.build().unwrap()).unwrap().run(initial).unwrap()
}

/// Replays a run step by step against the net structure and checks the scheduling rules.
struct Replay<'a> {
    net: &'a PetriNet,
    tokens: Vec<i64>,
}

impl<'a> Replay<'a> {
    fn new(net: &'a PetriNet, initial: &Marking) -> Self {
        let tokens = net.places().map(|(_, pl)| initial.get(pl.name()) as i64).collect();
        Replay { net, tokens }
    }

    fn is_enabled(&self, name: &str) -> bool {
        let tr = self.net.transition_by_name(name).unwrap();
        tr.inputs().iter().all(|&(pl, weight)| self.tokens[pl.0] >= weight as i64)
    }

    fn enabled_immediate(&self) -> Vec<&'a Transition> {
        let net = self.net;
        net.transitions_of(TransitionClass::Immediate)
            .iter()
            .map(|&id| net.transition(id))
            .filter(|tr| self.is_enabled(tr.name()))
            .collect()
    }

    fn fire(&mut self, name: &str) {
        assert!(self.is_enabled(name), "{name} fired while disabled");
        let tr = self.net.transition_by_name(name).unwrap();
        let before: i64 = self.tokens.iter().sum();
        let consumed: i64 = tr.inputs().iter().map(|&(_, w)| w as i64).sum();
        let produced: i64 = tr.outputs().iter().map(|&(_, w)| w as i64).sum();
        for &(pl, weight) in tr.inputs() {
            self.tokens[pl.0] -= weight as i64;
        }
        for &(pl, weight) in tr.outputs() {
            self.tokens[pl.0] += weight as i64;
        }
        assert!(self.tokens.iter().all(|&count| count >= 0));
        assert_eq!(self.tokens.iter().sum::<i64>(), before - consumed + produced);
    }

    fn marking(&self) -> Marking {
        self.net.places().map(|(id, pl)| (pl.name(), self.tokens[id.0] as u64)).collect()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn replayed_firings_stay_consistent(shape in net_shape(), seed in any::<u64>()) {
        let (net, initial) = build(&shape);
        let res = simulate(&net, &initial, seed, Some(BUDGET));
        let mut replay = Replay::new(&net, &initial);
        let mut last_time = 0.0;
        for step in res.trace.steps() {
            prop_assert!(step.time >= last_time);
            last_time = step.time;
            let enabled = net
                .transitions()
                .map(|(_, tr)| tr.name().to_string())
                .filter(|name| replay.is_enabled(name))
                .collect::<Vec<_>>();
            prop_assert_eq!(&step.enabled, &enabled);
            let immediate = replay.enabled_immediate();
            if let Some(top) = immediate.iter().map(|tr| tr.priority()).max() {
                prop_assert_eq!(step.class, TransitionClass::Immediate);
                prop_assert_eq!(step.delay, 0.0);
                for name in &step.fired {
                    prop_assert_eq!(net.transition_by_name(name).unwrap().priority(), top);
                }
            } else {
                prop_assert!(step.class.is_timed());
            }
            for name in &step.fired {
                replay.fire(name);
            }
        }
        prop_assert_eq!(replay.marking(), res.final_marking.clone());
        prop_assert!(res.firings <= BUDGET);
        prop_assert_eq!(res.firings, res.trace.len());
        if res.termination == Termination::Terminal {
            prop_assert!(net.transitions().all(|(_, tr)| !replay.is_enabled(tr.name())));
        }
    }

    #[test]
    fn same_seed_same_run(shape in net_shape(), seed in any::<u64>()) {
        let (net, initial) = build(&shape);
        let a = simulate(&net, &initial, seed, Some(BUDGET));
        let b = simulate(&net, &initial, seed, Some(BUDGET));
        prop_assert_eq!(a.trace.full_sequence(), b.trace.full_sequence());
        prop_assert_eq!(a.final_marking, b.final_marking);
        prop_assert_eq!(a.termination, b.termination);
        prop_assert_eq!(a.end_time, b.end_time);
    }

    #[test]
    fn draining_nets_terminate(shape in draining_shape(), seed in any::<u64>()) {
        let (net, initial) = build(&shape);
        let res = simulate(&net, &initial, seed, None);
        prop_assert_eq!(res.termination, Termination::Terminal);
        prop_assert!(res.firings as u64 <= initial.total());
    }
}
