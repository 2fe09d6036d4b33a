//! Tensor shapes.

use smallvec::SmallVec;
use std::fmt;

/// Ordered list of dimension sizes. The empty shape is the scalar shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape(SmallVec<[usize; 4]>);

impl Shape {
    /// The scalar (rank 0) shape.
    pub fn scalar() -> Self {
        Shape(SmallVec::new())
    }

    pub fn new(dims: &[usize]) -> Self {
        Shape(SmallVec::from_slice(dims))
    }

    pub fn is_scalar(&self) -> bool {
        self.0.is_empty()
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Number of elements; `1` for the scalar shape.
    pub fn elem_count(&self) -> usize {
        self.0.iter().product()
    }

    /// The shape left after removing `axes`.
    ///
    /// Axes must be valid and sorted; callers check with [`Shape::check_axes`].
    pub(crate) fn without_axes(&self, axes: &[usize]) -> Shape {
        Shape(
            self.0
                .iter()
                .enumerate()
                .filter(|(i, _)| !axes.contains(i))
                .map(|(_, &d)| d)
                .collect(),
        )
    }

    /// Validate reduction axes against this shape's rank.
    pub(crate) fn check_axes(&self, axes: &[usize]) -> Result<(), crate::GraphError> {
        for &axis in axes {
            if axis >= self.rank() {
                return Err(crate::GraphError::InvalidAxis {
                    axis,
                    rank: self.rank(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{d}")?;
        }
        f.write_str(")")
    }
}

impl std::ops::Deref for Shape {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<()> for Shape {
    fn from(_: ()) -> Self {
        Shape::scalar()
    }
}

impl From<usize> for Shape {
    fn from(d: usize) -> Self {
        Shape::new(&[d])
    }
}

impl From<(usize, usize)> for Shape {
    fn from((a, b): (usize, usize)) -> Self {
        Shape::new(&[a, b])
    }
}

impl From<(usize, usize, usize)> for Shape {
    fn from((a, b, c): (usize, usize, usize)) -> Self {
        Shape::new(&[a, b, c])
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Shape::new(&dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims)
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape(SmallVec::from_vec(dims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shape() {
        let s = Shape::scalar();
        assert!(s.is_scalar());
        assert_eq!(s.rank(), 0);
        assert_eq!(s.elem_count(), 1);
        assert_eq!(s, Shape::from(()));
        assert_eq!(s.to_string(), "()");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Shape::from(10).dims(), &[10]);
        assert_eq!(Shape::from((2, 3)).dims(), &[2, 3]);
        assert_eq!(Shape::from([2, 3, 4]).dims(), &[2, 3, 4]);
        assert_eq!(Shape::from(vec![5, 1]).rank(), 2);
        assert_eq!(Shape::from(&[3usize][..]).elem_count(), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::from((2, 3)).to_string(), "(2, 3)");
    }

    #[test]
    fn test_without_axes() {
        let s = Shape::from([2, 3, 4]);
        assert_eq!(s.without_axes(&[1]), Shape::from((2, 4)));
        assert_eq!(s.without_axes(&[0, 1, 2]), Shape::scalar());
        assert!(s.check_axes(&[3]).is_err());
    }
}
