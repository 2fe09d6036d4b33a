//! Integration tests for the execution machine.

use approx::assert_relative_eq;
use ndgraph::{
    DType, Graph, GraphError, Initializer, Machine, MachineConfig, MachineState, NodeId, NodeOpts,
    Value,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `s = sum(a + b)` with `a` initialized to zeros and `b` drawn from N(0, 1).
fn noisy_sum() -> (Graph, NodeId, NodeId, NodeId) {
    let mut g = Graph::new();
    let a = g
        .new_vector(
            DType::Float64,
            NodeOpts::new().with_name("a").with_shape(10).with_init(Initializer::Zeroes),
        )
        .unwrap();
    let b = g.gaussian_random_node(DType::Float64, 0.0, 1.0, 10).unwrap();
    let c = g.add(a, b).unwrap();
    let s = g.sum(c).unwrap();
    (g, a, b, s)
}

#[test]
fn test_random_leaf_redrawn_each_run() {
    init_logger();
    let (g, a, b, s) = noisy_sum();
    let mut m = Machine::with_config(g, MachineConfig::default().with_seed(3));

    m.run_all().unwrap();
    let a1 = m.value(a).cloned().unwrap();
    let b1 = m.value(b).cloned().unwrap();
    let s1 = m.value(s).unwrap().scalar::<f64>().unwrap();
    assert_eq!(a1.to_vec::<f64>().unwrap(), vec![0.0; 10]);
    assert_relative_eq!(s1, b1.to_vec::<f64>().unwrap().iter().sum::<f64>(), epsilon = 1e-12);

    m.run_all().unwrap();
    let b2 = m.value(b).cloned().unwrap();
    let s2 = m.value(s).unwrap().scalar::<f64>().unwrap();
    assert_eq!(m.value(a), Some(&a1));
    assert_ne!(b1, b2);
    assert_relative_eq!(s2, b2.to_vec::<f64>().unwrap().iter().sum::<f64>(), epsilon = 1e-12);
}

#[test]
fn test_seeded_runs_reproducible() {
    let draw = |seed: u64| {
        let (g, _, b, _) = noisy_sum();
        let mut m = Machine::with_config(g, MachineConfig::default().with_seed(seed));
        m.run_all().unwrap();
        m.value(b).cloned().unwrap()
    };
    assert_eq!(draw(11), draw(11));
    assert_ne!(draw(11), draw(12));
}

#[test]
fn test_explicit_rng() {
    let (g, _, b, _) = noisy_sum();
    let mut m = Machine::with_rng(g, StdRng::seed_from_u64(11), MachineConfig::default());
    m.run_all().unwrap();
    let explicit = m.value(b).cloned().unwrap();

    let (g, _, b, _) = noisy_sum();
    let mut m = Machine::with_config(g, MachineConfig::default().with_seed(11));
    m.run_all().unwrap();
    assert_eq!(m.value(b), Some(&explicit));
}

#[test]
fn test_forward_evaluates_only_what_is_needed() {
    init_logger();
    let mut g = Graph::new();
    let x = g.new_scalar(DType::Float64, NodeOpts::new().with_value(2.0f64)).unwrap();
    let unbound = g.new_scalar(DType::Float64, NodeOpts::new().with_name("unbound")).unwrap();
    let y = g.square(x).unwrap();
    let z = g.add(y, unbound).unwrap();

    let mut m = Machine::with_config(g, MachineConfig::default().with_seed(0));
    m.forward(&[y]).unwrap();
    assert_eq!(m.value(y), Some(&Value::from(4.0f64)));
    assert!(m.value(z).is_none());

    let err = m.run_all().unwrap_err();
    assert!(matches!(err, GraphError::GraphNotReady(ref msg) if msg.contains("unbound")));
    assert_eq!(m.state(), MachineState::Built);
    assert!(m.value(y).is_none());
}

#[test]
fn test_cycle_not_ready() {
    let mut g = Graph::new();
    let x = g.new_scalar(DType::Float64, NodeOpts::new().with_value(1.0f64)).unwrap();
    let a = g.neg(x).unwrap();
    let b = g.square(a).unwrap();
    assert_eq!(g.rewire(a, 0, b).unwrap_err(), GraphError::Cycle { parent: a, child: b });
    g.rewire_unchecked(a, 0, b).unwrap();

    let mut m = Machine::with_config(g, MachineConfig::default().with_seed(0));
    assert!(matches!(m.forward(&[b]), Err(GraphError::GraphNotReady(_))));
    assert_eq!(m.state(), MachineState::Built);
    m.forward(&[x]).unwrap();
}

#[test]
fn test_bind_makes_gradients_stale() {
    let mut g = Graph::new();
    let x = g.new_scalar(DType::Float64, NodeOpts::new().with_value(1.0f64)).unwrap();
    let l = g.square(x).unwrap();
    let mut m = Machine::with_config(g, MachineConfig::default().with_seed(0).with_loss(l, &[x]));

    m.run_all().unwrap();
    assert_eq!(m.gradient(x), Some(&Value::from(2.0f64)));

    m.bind(x, 4.0f64).unwrap();
    assert_eq!(m.state(), MachineState::Built);
    assert!(m.gradient(x).is_none());
    assert!(matches!(m.backward(l, &[x]), Err(GraphError::StaleGraph(_))));

    m.run_all().unwrap();
    assert_eq!(m.gradient(x), Some(&Value::from(8.0f64)));
    assert!(matches!(m.bind(l, 1.0f64), Err(GraphError::NotBindable { .. })));
}

#[test]
fn test_cancellation_from_another_thread() {
    init_logger();
    let flag = Arc::new(AtomicBool::new(false));
    let (g, _, _, s) = noisy_sum();
    let config = MachineConfig::default().with_seed(0).with_cancel_flag(flag.clone());
    let mut m = Machine::with_config(g, config);

    std::thread::spawn({
        let flag = flag.clone();
        move || flag.store(true, Ordering::SeqCst)
    })
    .join()
    .unwrap();

    assert_eq!(m.run_all().unwrap_err(), GraphError::Cancelled);
    assert_eq!(m.state(), MachineState::Built);
    assert!(m.value(s).is_none());

    flag.store(false, Ordering::SeqCst);
    m.run_all().unwrap();
    assert_eq!(m.state(), MachineState::Evaluated);
}

#[test]
fn test_into_graph_keeps_values() {
    let mut g = Graph::new();
    let c = g.new_constant(Value::from_vec(vec![1i32, 2, 3], 3).unwrap(), NodeOpts::new()).unwrap();
    let t = g.sum(c).unwrap();
    let mut m = Machine::with_config(g, MachineConfig::default().with_seed(0));
    m.run_all().unwrap();

    let g = m.into_graph();
    assert_eq!(g.value(t), Some(&Value::from(6i32)));
    assert_eq!(g.len(), 2);
}

#[test]
fn test_integer_overflow_wraps_during_forward() {
    let mut g = Graph::new();
    let max = g.new_constant(i32::MAX, NodeOpts::new()).unwrap();
    let one = g.new_constant(1i32, NodeOpts::new()).unwrap();
    let s = g.add(max, one).unwrap();

    let big = g
        .new_constant(Value::from_vec(vec![i64::MAX, 1], 2).unwrap(), NodeOpts::new())
        .unwrap();
    let t = g.sum(big).unwrap();

    let mut m = Machine::with_config(g, MachineConfig::default().with_seed(0));
    m.forward(&[s, t]).unwrap();
    assert_eq!(m.state(), MachineState::Evaluated);
    assert_eq!(m.value(s), Some(&Value::from(i32::MIN)));
    assert_eq!(m.value(t), Some(&Value::from(i64::MIN)));
}
