//! Integration tests for graph construction.
//!
//! Covers literal conversion, constructor type inference and the guarantee
//! that a rejected construction leaves the graph untouched.

use ndgraph::{
    DType, DenseTensor, Distribution, Graph, GraphError, Initializer, NodeOpts, Shape, Tensor,
    Type, Value,
};

#[test]
fn test_node_from_any_scalars() {
    let mut g = Graph::new();
    let cases = [
        (g.node_from_any(&1.5f32, NodeOpts::new()).unwrap(), DType::Float32),
        (g.node_from_any(&3.14f64, NodeOpts::new()).unwrap(), DType::Float64),
        (g.node_from_any(&7isize, NodeOpts::new()).unwrap(), DType::Int),
        (g.node_from_any(&7i32, NodeOpts::new()).unwrap(), DType::Int32),
        (g.node_from_any(&7i64, NodeOpts::new()).unwrap(), DType::Int64),
        (g.node_from_any(&false, NodeOpts::new()).unwrap(), DType::Bool),
    ];
    for (id, dtype) in cases {
        let node = g.node(id).unwrap();
        assert_eq!(node.ty(), &Type::Scalar(dtype));
        assert!(node.shape().is_scalar());
        assert!(node.is_constant());
    }
    assert_eq!(g.len(), 6);
}

#[test]
fn test_node_from_any_tensors() {
    let mut g = Graph::new();
    let m: DenseTensor<f64> = Tensor::from_vec((0..9).map(f64::from).collect(), &[3, 3]).unwrap();
    let id = g.node_from_any(&m, NodeOpts::new().with_name("m")).unwrap();
    let node = g.node(id).unwrap();
    assert_eq!(node.ty().to_string(), "Tensor-2 float64");
    assert_eq!(node.shape(), &Shape::from((3, 3)));
    assert_eq!(node.name(), Some("m"));

    let v: DenseTensor<i32> = Tensor::zeros(&[4]);
    let id = g.node_from_any(&v, NodeOpts::new()).unwrap();
    assert_eq!(g.node(id).unwrap().ty(), &Type::tensor(1, DType::Int32));

    let existing = Value::from(2.0f32);
    let id = g.node_from_any(&existing, NodeOpts::new()).unwrap();
    assert_eq!(g.value(id), Some(&existing));
}

#[test]
fn test_node_from_any_unsupported() {
    let mut g = Graph::new();
    let err = g.node_from_any(&"text", NodeOpts::new()).unwrap_err();
    assert!(matches!(err, GraphError::UnsupportedValueKind { .. }));
    let err = g.node_from_any(&vec![1u8, 2], NodeOpts::new()).unwrap_err();
    assert!(matches!(err, GraphError::UnsupportedValueKind { .. }));
    assert!(g.is_empty());
}

#[test]
fn test_one_hot_vector() {
    let mut g = Graph::new();
    let id = g.one_hot_vector(6, 10, DType::Float64, NodeOpts::new()).unwrap();
    let node = g.node(id).unwrap();
    assert_eq!(node.ty(), &Type::tensor(1, DType::Float64));
    let data = node.value().unwrap().to_vec::<f64>().unwrap();
    assert_eq!(data.len(), 10);
    assert_eq!(data.iter().filter(|&&x| x == 1.0).count(), 1);
    assert_eq!(data[6], 1.0);

    let id = g.one_hot_vector(0, 3, DType::Int, NodeOpts::new()).unwrap();
    assert_eq!(g.value(id).unwrap().to_vec::<isize>().unwrap(), vec![1, 0, 0]);

    let before = g.len();
    assert!(matches!(
        g.one_hot_vector(10, 10, DType::Float64, NodeOpts::new()),
        Err(GraphError::IndexOutOfRange { index: 10, length: 10 })
    ));
    assert!(g.one_hot_vector(-1, 10, DType::Float64, NodeOpts::new()).is_err());
    assert_eq!(g.len(), before);
}

#[test]
fn test_variables_with_initializers() {
    let mut g = Graph::new();
    let a = g
        .new_vector(
            DType::Float64,
            NodeOpts::new().with_name("a").with_shape(10).with_init(Initializer::Zeroes),
        )
        .unwrap();
    let w = g
        .new_matrix(
            DType::Float32,
            NodeOpts::new()
                .with_shape((4, 3))
                .with_init(Initializer::GlorotUniform { gain: 1.0 }),
        )
        .unwrap();
    assert!(g.value(a).is_none());
    assert_eq!(g.node(w).unwrap().ty(), &Type::tensor(2, DType::Float32));
    assert!(matches!(
        g.node(a).unwrap().kind(),
        ndgraph::NodeKind::Variable { init: Some(Initializer::Zeroes) }
    ));
}

#[test]
fn test_derived_type_and_shape_inference() {
    let mut g = Graph::new();
    let a = g.new_vector(DType::Float64, NodeOpts::new().with_shape(5)).unwrap();
    let k = g.new_constant(2.0f64, NodeOpts::new()).unwrap();
    let scaled = g.mul(k, a).unwrap();
    assert_eq!(g.node(scaled).unwrap().ty(), &Type::tensor(1, DType::Float64));
    assert_eq!(g.node(scaled).unwrap().shape(), &Shape::from(5));

    let m = g.new_matrix(DType::Float64, NodeOpts::new().with_shape((2, 5))).unwrap();
    let rows = g.sum_along(m, &[1]).unwrap();
    assert_eq!(g.node(rows).unwrap().shape(), &Shape::from(2));
    let total = g.sum(m).unwrap();
    assert_eq!(g.node(total).unwrap().ty(), &Type::Scalar(DType::Float64));
    let avg = g.mean(m).unwrap();
    assert_eq!(g.node(avg).unwrap().to_string(), format!("{avg} :: float64 () = mean({m})"));
}

#[test]
fn test_mismatched_add_leaves_graph_unchanged() {
    let mut g = Graph::new();
    let a = g.new_vector(DType::Float64, NodeOpts::new().with_shape(5)).unwrap();
    let b = g.new_vector(DType::Float64, NodeOpts::new().with_shape(6)).unwrap();
    let before = g.len();

    let err = g.add(a, b).unwrap_err();
    assert!(matches!(err, GraphError::ShapeMismatch { .. }));
    assert_eq!(g.len(), before);

    let flag = g.new_constant(true, NodeOpts::new()).unwrap();
    assert!(matches!(g.neg(flag), Err(GraphError::UnsupportedDType { .. })));
    assert!(matches!(
        g.sum_along(a, &[1]),
        Err(GraphError::InvalidAxis { axis: 1, rank: 1 })
    ));
    assert_eq!(g.len(), before + 1);
}

#[test]
fn test_mean_of_empty_tensor_rejected() {
    let mut g = Graph::new();
    let empty = g
        .new_constant(Value::from_vec(Vec::<f64>::new(), 0).unwrap(), NodeOpts::new())
        .unwrap();
    let before = g.len();
    assert_eq!(
        g.mean(empty).unwrap_err(),
        GraphError::EmptyReduction { op: "mean".into() }
    );
    assert_eq!(g.len(), before);
    assert!(g.sum(empty).is_ok());
}

#[test]
fn test_random_nodes() {
    let mut g = Graph::new();
    let n = g.gaussian_random_node(DType::Float32, 0.0, 1.0, (2, 2)).unwrap();
    let u = g.uniform_random_node(DType::Float64, -1.0, 1.0, 8).unwrap();
    let b = g.binomial_random_node(DType::Int64, 10, 0.5, 3).unwrap();
    assert_eq!(g.node(n).unwrap().ty(), &Type::tensor(2, DType::Float32));
    assert_eq!(g.node(u).unwrap().shape(), &Shape::from(8));
    assert_eq!(g.node(b).unwrap().dtype(), Some(DType::Int64));
    assert!(g.nodes().iter().all(|node| node.is_random() && node.value().is_none()));

    assert!(matches!(
        g.uniform_random_node(DType::Float64, 1.0, 0.0, 8),
        Err(GraphError::InvalidDistribution(_))
    ));
    assert!(g
        .random_node(
            Distribution::Binomial { trials: 4, prob: 1.5 },
            DType::Int,
            Shape::scalar(),
            NodeOpts::new(),
        )
        .is_err());
    assert_eq!(g.len(), 3);
}
