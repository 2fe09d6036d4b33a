//! Node constructors and graph mutation.

use super::{Graph, Node, NodeId, NodeKind, NodeOpts};
use crate::dtype::DType;
use crate::error::GraphError;
use crate::init::Initializer;
use crate::op::{Add, Mean, Mul, Neg, Operation, Square, Sub, Sum, check_arity};
use crate::random::Distribution;
use crate::shape::Shape;
use crate::types::{Type, unify};
use crate::value::Value;
use log::trace;
use rand::Rng;
use std::any::Any;

/// Check a value against a declared type and shape.
fn check_value(context: &str, ty: &Type, shape: &Shape, value: &Value) -> Result<Type, GraphError> {
    let resolved = unify(ty, &value.type_of())
        .map_err(|_| GraphError::type_mismatch(context, ty, &value.type_of()))?;
    if &value.shape() != shape {
        return Err(GraphError::shape_mismatch(context, shape, &value.shape()));
    }
    Ok(resolved)
}

/// Shape for a variable constructor: the explicit shape, else the initial
/// value's shape.
fn declared_shape(context: &str, dims: usize, opts: &NodeOpts) -> Result<Shape, GraphError> {
    let shape = match (&opts.shape, &opts.value) {
        (Some(shape), _) => shape.clone(),
        (None, Some(value)) => value.shape(),
        (None, None) if dims == 0 => Shape::scalar(),
        (None, None) => {
            return Err(GraphError::RankMismatch {
                context: format!("{context}: no shape given"),
                expected: dims,
                shape: Shape::scalar(),
            });
        }
    };
    if shape.rank() != dims {
        return Err(GraphError::RankMismatch {
            context: context.to_string(),
            expected: dims,
            shape,
        });
    }
    Ok(shape)
}

impl Graph {
    /// Add a constant leaf bound to `value`.
    ///
    /// Its type and shape are inferred from the value. A shape in `opts` must
    /// agree with it.
    ///
    /// ```
    /// use ndgraph::{DType, Graph, NodeOpts, Type};
    ///
    /// let mut g = Graph::new();
    /// let c = g.new_constant(3.14f64, NodeOpts::new().with_name("pi")).unwrap();
    /// assert_eq!(g.node(c).unwrap().ty(), &Type::Scalar(DType::Float64));
    /// assert!(g.node(c).unwrap().shape().is_scalar());
    /// ```
    pub fn new_constant(&mut self, value: impl Into<Value>, opts: NodeOpts) -> Result<NodeId, GraphError> {
        let value = value.into();
        let shape = value.shape();
        if let Some(declared) = &opts.shape {
            if declared != &shape {
                return Err(GraphError::shape_mismatch("new_constant", declared, &shape));
            }
        }
        let ty = value.type_of();
        Ok(self.push(|id| Node {
            id,
            name: opts.name,
            ty,
            shape,
            kind: NodeKind::Constant,
            children: Vec::new(),
            value: Some(value),
        }))
    }

    /// Add a constant from any supported literal.
    ///
    /// See [`Value::from_any`] for what is accepted.
    pub fn node_from_any<T: Any>(&mut self, literal: &T, opts: NodeOpts) -> Result<NodeId, GraphError> {
        let value = Value::from_any(literal)?;
        self.new_constant(value, opts)
    }

    /// Add a variable leaf with a declared type and shape.
    ///
    /// The node has no value unless `opts` carries one; an initializer in
    /// `opts` fills it on [`Graph::initialize`] or at the first run.
    pub fn new_variable(
        &mut self,
        ty: Type,
        shape: impl Into<Shape>,
        opts: NodeOpts,
    ) -> Result<NodeId, GraphError> {
        let shape = shape.into();
        ty.check_shape("new_variable", &shape)?;
        if let Some(declared) = &opts.shape {
            if declared != &shape {
                return Err(GraphError::shape_mismatch("new_variable", declared, &shape));
            }
        }
        let ty = match &opts.value {
            Some(value) => check_value("new_variable", &ty, &shape, value)?,
            None => ty,
        };
        if let (Some(init), Some(dtype)) = (opts.init, ty.dtype()) {
            match init {
                Initializer::Gaussian { mean, stddev } => {
                    Distribution::Gaussian { mean, stddev }.validate(dtype)?
                }
                Initializer::Uniform { low, high } => Distribution::Uniform { low, high }.validate(dtype)?,
                _ => {}
            }
        }
        Ok(self.push(|id| Node {
            id,
            name: opts.name,
            ty,
            shape,
            kind: NodeKind::Variable { init: opts.init },
            children: Vec::new(),
            value: opts.value,
        }))
    }

    /// Scalar variable.
    pub fn new_scalar(&mut self, dtype: DType, opts: NodeOpts) -> Result<NodeId, GraphError> {
        self.new_tensor(dtype, 0, opts)
    }

    /// Rank-1 variable; the shape comes from `opts`.
    ///
    /// ```
    /// use ndgraph::{DType, Graph, Initializer, NodeOpts};
    ///
    /// let mut g = Graph::new();
    /// let a = g
    ///     .new_vector(DType::Float64, NodeOpts::new().with_shape(10).with_init(Initializer::Zeroes))
    ///     .unwrap();
    /// assert_eq!(g.node(a).unwrap().shape().dims(), &[10]);
    /// ```
    pub fn new_vector(&mut self, dtype: DType, opts: NodeOpts) -> Result<NodeId, GraphError> {
        self.new_tensor(dtype, 1, opts)
    }

    /// Rank-2 variable; the shape comes from `opts`.
    pub fn new_matrix(&mut self, dtype: DType, opts: NodeOpts) -> Result<NodeId, GraphError> {
        self.new_tensor(dtype, 2, opts)
    }

    /// Variable of rank `dims`; the shape comes from `opts`.
    pub fn new_tensor(&mut self, dtype: DType, dims: usize, opts: NodeOpts) -> Result<NodeId, GraphError> {
        let shape = declared_shape("new_tensor", dims, &opts)?;
        self.new_variable(Type::tensor(dims, dtype), shape, opts)
    }

    /// Add a random source: a leaf redrawn from `distribution` on every
    /// evaluation.
    pub fn random_node(
        &mut self,
        distribution: Distribution,
        dtype: DType,
        shape: impl Into<Shape>,
        opts: NodeOpts,
    ) -> Result<NodeId, GraphError> {
        let shape = shape.into();
        distribution.validate(dtype)?;
        let ty = Type::of(dtype, &shape);
        Ok(self.push(|id| Node {
            id,
            name: opts.name,
            ty,
            shape,
            kind: NodeKind::Random(distribution),
            children: Vec::new(),
            value: None,
        }))
    }

    /// Random source drawing from a normal distribution.
    pub fn gaussian_random_node(
        &mut self,
        dtype: DType,
        mean: f64,
        stddev: f64,
        shape: impl Into<Shape>,
    ) -> Result<NodeId, GraphError> {
        self.random_node(Distribution::Gaussian { mean, stddev }, dtype, shape, NodeOpts::new())
    }

    /// Random source drawing uniformly from `[low, high)`.
    pub fn uniform_random_node(
        &mut self,
        dtype: DType,
        low: f64,
        high: f64,
        shape: impl Into<Shape>,
    ) -> Result<NodeId, GraphError> {
        self.random_node(Distribution::Uniform { low, high }, dtype, shape, NodeOpts::new())
    }

    /// Random source drawing binomial counts.
    pub fn binomial_random_node(
        &mut self,
        dtype: DType,
        trials: u64,
        prob: f64,
        shape: impl Into<Shape>,
    ) -> Result<NodeId, GraphError> {
        self.random_node(Distribution::Binomial { trials, prob }, dtype, shape, NodeOpts::new())
    }

    /// Constant one-hot vector.
    pub fn one_hot_vector(
        &mut self,
        index: isize,
        length: usize,
        dtype: DType,
        opts: NodeOpts,
    ) -> Result<NodeId, GraphError> {
        let value = Value::one_hot(index, length, dtype)?;
        self.new_constant(value, opts)
    }

    /// Apply `op` to `children`.
    pub fn apply(&mut self, op: impl Operation + 'static, children: &[NodeId]) -> Result<NodeId, GraphError> {
        self.apply_with(op, children, NodeOpts::new())
    }

    /// Apply `op` to `children`, with a name or other options.
    ///
    /// Arity, types and shapes are all checked before the node is added.
    pub fn apply_with(
        &mut self,
        op: impl Operation + 'static,
        children: &[NodeId],
        opts: NodeOpts,
    ) -> Result<NodeId, GraphError> {
        let (ty, shape) = self.infer(&op, children)?;
        if let Some(declared) = &opts.shape {
            if declared != &shape {
                return Err(GraphError::shape_mismatch(op.name(), declared, &shape));
            }
        }
        trace!("apply {} to {:?} -> {} {}", op.name(), children, ty, shape);
        Ok(self.push(|id| Node {
            id,
            name: opts.name,
            ty,
            shape,
            kind: NodeKind::Derived(Box::new(op)),
            children: children.to_vec(),
            value: None,
        }))
    }

    fn infer(&self, op: &dyn Operation, children: &[NodeId]) -> Result<(Type, Shape), GraphError> {
        let nodes = children
            .iter()
            .map(|&c| self.node(c))
            .collect::<Result<Vec<_>, _>>()?;
        check_arity(op, &nodes)?;

        let types: Vec<Type> = nodes.iter().map(|n| n.ty.clone()).collect();
        let ty = op.infer_type(&types)?;
        let shapes: Vec<&Shape> = nodes.iter().map(|n| &n.shape).collect();
        let shape = op.infer_shape(&shapes)?;
        ty.check_shape(op.name(), &shape)?;
        Ok((ty, shape))
    }

    pub fn add(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.apply(Add, &[a, b])
    }

    pub fn sub(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.apply(Sub, &[a, b])
    }

    /// Element-wise product.
    pub fn mul(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.apply(Mul, &[a, b])
    }

    pub fn neg(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.apply(Neg, &[x])
    }

    pub fn square(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.apply(Square, &[x])
    }

    /// Sum of every element.
    pub fn sum(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.apply(Sum::all(), &[x])
    }

    /// Sum along `axes`.
    pub fn sum_along(&mut self, x: NodeId, axes: &[usize]) -> Result<NodeId, GraphError> {
        self.apply(Sum::along(axes), &[x])
    }

    pub fn mean(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.apply(Mean, &[x])
    }

    /// Rebind a variable's value.
    ///
    /// A variable of unresolved type takes the value's type.
    ///
    /// # Errors
    ///
    /// `NotBindable` for constants, random sources and derived nodes;
    /// `TypeMismatch`/`ShapeMismatch` if the value does not fit.
    pub fn bind(&mut self, id: NodeId, value: impl Into<Value>) -> Result<(), GraphError> {
        let value = value.into();
        let node = self.node(id)?;
        let reason = match node.kind {
            NodeKind::Variable { .. } => None,
            NodeKind::Constant => Some("constants never change"),
            NodeKind::Random(_) => Some("random sources are redrawn on evaluation"),
            NodeKind::Derived(_) => Some("derived values come from their operation"),
        };
        if let Some(reason) = reason {
            return Err(GraphError::NotBindable { node: id, reason });
        }
        let ty = check_value(&format!("bind {}", node.label()), &node.ty, &node.shape, &value)?;

        let node = self.node_mut(id)?;
        node.ty = ty;
        node.value = Some(value);
        Ok(())
    }

    /// Replace operand `slot` of derived node `parent` with `child`.
    ///
    /// The new operand must leave the node's type and shape unchanged. The
    /// parent's cached value is dropped.
    ///
    /// # Errors
    ///
    /// `Cycle` if `child` depends on `parent`.
    pub fn rewire(&mut self, parent: NodeId, slot: usize, child: NodeId) -> Result<(), GraphError> {
        self.check_slot(parent, slot)?;
        self.node(child)?;
        if self.depends_on(child, parent)? {
            return Err(GraphError::Cycle { parent, child });
        }

        let node = self.node(parent)?;
        let mut children = node.children.clone();
        children[slot] = child;
        let op = node.op().ok_or(GraphError::NotBindable {
            node: parent,
            reason: "only derived nodes have operands",
        })?;
        let (ty, shape) = self.infer(op, &children)?;
        if ty != node.ty {
            return Err(GraphError::type_mismatch("rewire", &node.ty, &ty));
        }
        if shape != node.shape {
            return Err(GraphError::shape_mismatch("rewire", &node.shape, &shape));
        }

        let node = self.node_mut(parent)?;
        node.children = children;
        node.value = None;
        Ok(())
    }

    /// Replace operand `slot` without type, shape or cycle checks.
    ///
    /// The graph may become unrunnable; the machine reports that with
    /// `GraphNotReady`.
    pub fn rewire_unchecked(&mut self, parent: NodeId, slot: usize, child: NodeId) -> Result<(), GraphError> {
        self.check_slot(parent, slot)?;
        self.node(child)?;
        let node = self.node_mut(parent)?;
        node.children[slot] = child;
        node.value = None;
        Ok(())
    }

    fn check_slot(&self, parent: NodeId, slot: usize) -> Result<(), GraphError> {
        let node = self.node(parent)?;
        if node.is_leaf() {
            return Err(GraphError::NotBindable {
                node: parent,
                reason: "only derived nodes have operands",
            });
        }
        if slot >= node.children.len() {
            return Err(GraphError::IndexOutOfRange {
                index: isize::try_from(slot).unwrap_or(isize::MAX),
                length: node.children.len(),
            });
        }
        Ok(())
    }

    /// Fill every unbound variable that has an initializer.
    pub fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GraphError> {
        for node in &mut self.nodes {
            if node.value.is_some() {
                continue;
            }
            if let (NodeKind::Variable { init: Some(init) }, Some(dtype)) = (&node.kind, node.ty.dtype()) {
                trace!("initialize {} with {}", node.label(), init);
                node.value = Some(init.materialize(dtype, &node.shape, rng)?);
            }
        }
        Ok(())
    }
}
