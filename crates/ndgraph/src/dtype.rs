//! Element data types.

use std::fmt;

/// Runtime tag for the element type of a value.
///
/// Every node type, value and tensor carries one of these. Operations never
/// convert between them implicitly: two operands with different dtypes are a
/// type error, not a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit IEEE float (`f32`).
    Float32,
    /// 64-bit IEEE float (`f64`).
    Float64,
    /// Machine-width signed integer (`isize`).
    Int,
    /// 32-bit signed integer (`i32`).
    Int32,
    /// 64-bit signed integer (`i64`).
    Int64,
    /// Boolean (`bool`).
    Bool,
}

impl DType {
    /// All supported dtypes, in declaration order.
    pub const ALL: [DType; 6] = [
        DType::Float32,
        DType::Float64,
        DType::Int,
        DType::Int32,
        DType::Int64,
        DType::Bool,
    ];

    /// Size of one element in bytes.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DType::Float32 | DType::Int32 => 4,
            DType::Float64 | DType::Int64 => 8,
            DType::Int => std::mem::size_of::<isize>(),
            DType::Bool => 1,
        }
    }

    /// Whether this is a floating-point dtype (required for differentiation).
    pub fn is_float(&self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    /// Whether this is a signed integer dtype.
    pub fn is_int(&self) -> bool {
        matches!(self, DType::Int | DType::Int32 | DType::Int64)
    }

    /// Whether arithmetic is defined for this dtype.
    pub fn is_numeric(&self) -> bool {
        self.is_float() || self.is_int()
    }

    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Int => "int",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Bool => "bool",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
