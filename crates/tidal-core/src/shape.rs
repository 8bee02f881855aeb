use std::fmt;

// Shape — N-dimensional shape representation
//
// A Shape describes the size of each dimension of a tensor. For processed
// recordings the interesting ones are:
//   - Archive features:  Shape([T, C, F])     — timesteps × channels × features
//   - Sample features:   Shape([L, F, C])     — a window, feature-major
//   - Labels:            Shape([L]) or Shape([L, K])
//   - Batches:           Shape([B, L, F, C])  — a leading batch axis
//
// Zero-sized dimensions are legal (an archive with no timesteps), in which
// case the element count is 0.

/// N-dimensional shape of a tensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Create a new shape from a vector of dimension sizes.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape(dims)
    }

    /// The dimension sizes as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of dimensions (0 for scalar, 1 for vector, 2 for matrix, etc.).
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements (product of all dimensions).
    /// A scalar shape [] has 1 element; any zero-sized dim gives 0.
    pub fn elem_count(&self) -> usize {
        self.0.iter().product::<usize>()
    }

    /// Compute the contiguous (row-major / C-order) strides for this shape.
    ///
    /// For shape [2, 3, 4], strides are [12, 4, 1].
    pub fn stride_contiguous(&self) -> Vec<usize> {
        let mut strides = vec![0usize; self.rank()];
        if self.rank() > 0 {
            strides[self.rank() - 1] = 1;
            for i in (0..self.rank() - 1).rev() {
                strides[i] = strides[i + 1] * self.0[i + 1];
            }
        }
        strides
    }

    /// Size of a specific dimension.
    pub fn dim(&self, d: usize) -> crate::Result<usize> {
        self.0.get(d).copied().ok_or(crate::Error::DimOutOfRange {
            dim: d,
            rank: self.rank(),
        })
    }

    /// Row-major offset of a multi-dimensional index.
    pub fn flat_index(&self, index: &[usize]) -> crate::Result<usize> {
        if index.len() != self.rank() {
            return Err(crate::Error::RankMismatch {
                expected: self.rank(),
                got: index.len(),
            });
        }
        if index.iter().zip(&self.0).any(|(&i, &d)| i >= d) {
            return Err(crate::Error::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.clone(),
            });
        }
        Ok(index
            .iter()
            .zip(self.stride_contiguous())
            .map(|(&i, s)| i * s)
            .sum())
    }

    /// Prepend a new leading dimension (e.g. a batch axis).
    pub fn prepend(&self, len: usize) -> Shape {
        let mut dims = Vec::with_capacity(self.rank() + 1);
        dims.push(len);
        dims.extend_from_slice(&self.0);
        Shape(dims)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

// Convenient From implementations
// These let you write: Shape::from((10, 2, 3)) instead of Shape::new(vec![10, 2, 3])

impl From<()> for Shape {
    /// Scalar shape (0 dimensions).
    fn from(_: ()) -> Self {
        Shape(vec![])
    }
}

impl From<usize> for Shape {
    /// 1-D shape.
    fn from(d: usize) -> Self {
        Shape(vec![d])
    }
}

impl From<(usize, usize)> for Shape {
    fn from((d0, d1): (usize, usize)) -> Self {
        Shape(vec![d0, d1])
    }
}

impl From<(usize, usize, usize)> for Shape {
    fn from((d0, d1, d2): (usize, usize, usize)) -> Self {
        Shape(vec![d0, d1, d2])
    }
}

impl From<(usize, usize, usize, usize)> for Shape {
    fn from((d0, d1, d2, d3): (usize, usize, usize, usize)) -> Self {
        Shape(vec![d0, d1, d2, d3])
    }
}

impl From<Vec<usize>> for Shape {
    fn from(v: Vec<usize>) -> Self {
        Shape(v)
    }
}

impl From<&[usize]> for Shape {
    fn from(s: &[usize]) -> Self {
        Shape(s.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shape() {
        let s = Shape::from(());
        assert_eq!(s.rank(), 0);
        assert_eq!(s.elem_count(), 1);
        assert_eq!(s.stride_contiguous(), Vec::<usize>::new());
    }

    #[test]
    fn test_empty_leading_dim() {
        let s = Shape::from((0, 2, 3));
        assert_eq!(s.elem_count(), 0);
    }

    #[test]
    fn test_3d_strides() {
        let s = Shape::from((2, 3, 4));
        assert_eq!(s.stride_contiguous(), vec![12, 4, 1]);
        assert_eq!(s.elem_count(), 24);
    }

    #[test]
    fn test_flat_index() {
        let s = Shape::from((2, 3, 4));
        assert_eq!(s.flat_index(&[0, 0, 0]).unwrap(), 0);
        assert_eq!(s.flat_index(&[1, 2, 3]).unwrap(), 23);
        assert!(matches!(
            s.flat_index(&[2, 0, 0]),
            Err(crate::Error::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            s.flat_index(&[0, 0]),
            Err(crate::Error::RankMismatch { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn test_prepend() {
        let s = Shape::from((25, 2, 3));
        assert_eq!(s.prepend(4).dims(), &[4, 25, 2, 3]);
    }

    #[test]
    fn test_display() {
        let s = Shape::from((10, 2, 3));
        assert_eq!(format!("{}", s), "[10, 2, 3]");
    }
}
