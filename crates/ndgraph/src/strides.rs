//! Stride computation utilities.
//!
//! Uses row-major (C) order: the last dimension is contiguous.

/// Compute row-major strides from shape.
///
/// For shape [d0, d1, d2], returns strides [d1*d2, d2, 1].
///
/// # Examples
///
/// ```
/// use ndgraph::strides::compute_strides;
///
/// assert_eq!(compute_strides(&[3, 4, 5]), vec![20, 5, 1]);
/// assert_eq!(compute_strides(&[2, 3]), vec![3, 1]);
/// assert_eq!(compute_strides(&[5]), vec![1]);
/// assert_eq!(compute_strides(&[]), Vec::<usize>::new());
/// ```
pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut stride = 1;

    for (i, &dim) in shape.iter().enumerate().rev() {
        strides[i] = stride;
        stride *= dim;
    }

    strides
}

/// Convert cartesian indices to a linear index.
#[inline]
pub fn cartesian_to_linear(indices: &[usize], strides: &[usize]) -> usize {
    indices
        .iter()
        .zip(strides.iter())
        .map(|(&idx, &stride)| idx * stride)
        .sum()
}

/// Convert a linear index to cartesian indices using row-major order.
pub fn linear_to_cartesian(mut linear: usize, shape: &[usize]) -> Vec<usize> {
    let mut indices = vec![0; shape.len()];

    for (i, &dim) in shape.iter().enumerate().rev() {
        if dim == 0 {
            continue;
        }
        indices[i] = linear % dim;
        linear /= dim;
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_strides_3d() {
        assert_eq!(compute_strides(&[3, 4, 5]), vec![20, 5, 1]);
    }

    #[test]
    fn test_compute_strides_empty() {
        assert!(compute_strides(&[]).is_empty());
    }

    #[test]
    fn test_cartesian_to_linear() {
        let strides = compute_strides(&[3, 4, 5]);
        // index [i, j, k] -> 20*i + 5*j + k
        assert_eq!(cartesian_to_linear(&[0, 0, 0], &strides), 0);
        assert_eq!(cartesian_to_linear(&[0, 0, 1], &strides), 1);
        assert_eq!(cartesian_to_linear(&[0, 1, 0], &strides), 5);
        assert_eq!(cartesian_to_linear(&[1, 0, 0], &strides), 20);
        assert_eq!(cartesian_to_linear(&[2, 3, 4], &strides), 59);
    }

    #[test]
    fn test_linear_to_cartesian() {
        let shape = [3, 4, 5];
        assert_eq!(linear_to_cartesian(0, &shape), vec![0, 0, 0]);
        assert_eq!(linear_to_cartesian(1, &shape), vec![0, 0, 1]);
        assert_eq!(linear_to_cartesian(5, &shape), vec![0, 1, 0]);
        assert_eq!(linear_to_cartesian(20, &shape), vec![1, 0, 0]);
    }

    #[test]
    fn test_roundtrip() {
        let shape = [3, 4, 5];
        let strides = compute_strides(&shape);
        let total: usize = shape.iter().product();

        for linear in 0..total {
            let cartesian = linear_to_cartesian(linear, &shape);
            assert_eq!(linear, cartesian_to_linear(&cartesian, &strides));
        }
    }
}
