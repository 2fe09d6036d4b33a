//! Graph nodes and their construction options.

use crate::dtype::DType;
use crate::init::Initializer;
use crate::op::Operation;
use crate::random::Distribution;
use crate::shape::Shape;
use crate::types::Type;
use crate::value::Value;
use std::fmt;

/// Handle to a node: its index in the owning graph's node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Get the internal index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// What a node is.
#[derive(Debug)]
pub enum NodeKind {
    /// Leaf bound to a fixed value.
    Constant,
    /// Leaf whose value is supplied by `bind` or by its initializer.
    Variable { init: Option<Initializer> },
    /// Leaf redrawn from the distribution on every evaluation.
    Random(Distribution),
    /// Output of an operation over the node's children.
    Derived(Box<dyn Operation>),
}

/// A vertex of the computation graph.
#[derive(Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: Option<String>,
    pub(crate) ty: Type,
    pub(crate) shape: Shape,
    pub(crate) kind: NodeKind,
    pub(crate) children: Vec<NodeId>,
    pub(crate) value: Option<Value>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Diagnostic name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn dtype(&self) -> Option<DType> {
        self.ty.dtype()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The operation of a derived node; `None` for leaves.
    pub fn op(&self) -> Option<&dyn Operation> {
        match &self.kind {
            NodeKind::Derived(op) => Some(op.as_ref()),
            _ => None,
        }
    }

    /// Operands in argument order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The cached value, present once evaluated or bound.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self.kind, NodeKind::Derived(_))
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, NodeKind::Constant)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, NodeKind::Variable { .. })
    }

    pub fn is_random(&self) -> bool {
        matches!(self.kind, NodeKind::Random(_))
    }

    /// Name if present, handle otherwise.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :: {} {}", self.label(), self.ty, self.shape)?;
        if let Some(op) = self.op() {
            write!(f, " = {}(", op.name())?;
            for (i, c) in self.children.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{c}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// Optional settings accepted by every node constructor.
///
/// ```
/// use ndgraph::{Initializer, NodeOpts};
///
/// let opts = NodeOpts::new()
///     .with_name("a")
///     .with_shape(10)
///     .with_init(Initializer::Zeroes);
/// assert_eq!(opts.name(), Some("a"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NodeOpts {
    pub(crate) name: Option<String>,
    pub(crate) shape: Option<Shape>,
    pub(crate) init: Option<Initializer>,
    pub(crate) value: Option<Value>,
}

impl NodeOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_shape(mut self, shape: impl Into<Shape>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    pub fn with_init(mut self, init: Initializer) -> Self {
        self.init = Some(init);
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
