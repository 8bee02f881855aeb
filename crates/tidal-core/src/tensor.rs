use std::sync::Arc;

use crate::dtype::{DType, WithDType};
use crate::error::{Error, Result};
use crate::shape::Shape;

// Tensor — owned host array handed to training code
//
// A Tensor is a contiguous, row-major n-dimensional array of one element type.
// Samples carry `Tensor<f32>` features and `Tensor<i64>` labels.
//
// MEMORY MODEL:
//
//   The element buffer lives behind an Arc, and a tensor is (buffer, offset,
//   shape). Cloning a tensor only bumps the refcount. Narrowing along the
//   leading axis produces a view into the same buffer, which is how temporal
//   windows share one archive's storage instead of copying it L-sized piece
//   by piece. Narrowing any other axis materializes a new buffer.
//
//   Buffers are never mutated after construction, so tensors are freely
//   shared across reader threads.

/// An n-dimensional, immutable, host-resident array.
///
/// # Example
/// ```ignore
/// use tidal_core::Tensor;
///
/// let t = Tensor::from_vec(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], (3, 2))?;
/// let head = t.narrow(0, 0, 2)?; // [[1, 2], [3, 4]], no copy
/// ```
#[derive(Clone)]
pub struct Tensor<T: WithDType> {
    storage: Arc<Vec<T>>,
    offset: usize,
    shape: Shape,
}

impl<T: WithDType> std::fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tensor(shape={}, dtype={})", self.shape, T::DTYPE)
    }
}

impl<T: WithDType> PartialEq for Tensor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.as_slice() == other.as_slice()
    }
}

impl<T: WithDType> Tensor<T> {
    // Creation methods

    /// Create a tensor from a flat row-major buffer.
    pub fn from_vec(data: Vec<T>, shape: impl Into<Shape>) -> Result<Self> {
        let shape = shape.into();
        if data.len() != shape.elem_count() {
            return Err(Error::ElementCountMismatch {
                expected: shape.elem_count(),
                got: data.len(),
                shape,
            });
        }
        Ok(Tensor {
            storage: Arc::new(data),
            offset: 0,
            shape,
        })
    }

    /// Create a tensor filled with zeros.
    pub fn zeros(shape: impl Into<Shape>) -> Self {
        let shape = shape.into();
        Tensor {
            storage: Arc::new(vec![T::zero(); shape.elem_count()]),
            offset: 0,
            shape,
        }
    }

    // Accessors

    /// The shape of this tensor.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The dimensions as a slice (shortcut for shape().dims()).
    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    /// Number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Total number of elements.
    pub fn elem_count(&self) -> usize {
        self.shape.elem_count()
    }

    /// Data type of the elements.
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// The elements in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.storage[self.offset..self.offset + self.elem_count()]
    }

    /// Copy the elements out into a new Vec.
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }

    /// Read a single element at a multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Result<T> {
        let flat = self.shape.flat_index(index)?;
        Ok(self.storage[self.offset + flat])
    }

    /// Whether two tensors are views into the same buffer.
    pub fn shares_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    /// Smallest and largest element, or `None` for an empty tensor.
    pub fn min_max(&self) -> Option<(T, T)> {
        let mut it = self.as_slice().iter().copied();
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| {
            (
                if v < lo { v } else { lo },
                if v > hi { v } else { hi },
            )
        }))
    }

    // Shape manipulation

    /// Narrow (slice) `len` entries starting at `start` along `dim`.
    ///
    /// Along dim 0 this is a view sharing the buffer; other dims copy.
    pub fn narrow(&self, dim: usize, start: usize, len: usize) -> Result<Self> {
        let dim_size = self.shape.dim(dim)?;
        if start + len > dim_size {
            return Err(Error::NarrowOutOfBounds {
                dim,
                start,
                len,
                dim_size,
            });
        }

        let dims = self.dims();
        let inner: usize = dims[dim + 1..].iter().product();
        let mut new_dims = dims.to_vec();
        new_dims[dim] = len;

        if dim == 0 {
            return Ok(Tensor {
                storage: Arc::clone(&self.storage),
                offset: self.offset + start * inner,
                shape: Shape::new(new_dims),
            });
        }

        let outer: usize = dims[..dim].iter().product();
        let src = self.as_slice();
        let mut data = Vec::with_capacity(outer * len * inner);
        for o in 0..outer {
            let base = o * dim_size * inner + start * inner;
            data.extend_from_slice(&src[base..base + len * inner]);
        }
        Self::from_vec(data, new_dims)
    }

    /// Stack equally-shaped tensors along a new leading axis.
    ///
    /// `[a, b, c]` each of shape `[L, F, C]` becomes `[3, L, F, C]`.
    pub fn stack(tensors: &[Tensor<T>]) -> Result<Self> {
        let first = match tensors.first() {
            Some(t) => t,
            None => return Err(Error::msg("stack requires at least one tensor")),
        };
        let mut data = Vec::with_capacity(tensors.len() * first.elem_count());
        for t in tensors {
            if t.shape != first.shape {
                return Err(Error::ShapeMismatch {
                    expected: first.shape.clone(),
                    got: t.shape.clone(),
                });
            }
            data.extend_from_slice(t.as_slice());
        }
        Self::from_vec(data, first.shape.prepend(tensors.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arange(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32).collect()
    }

    #[test]
    fn test_from_vec_count_mismatch() {
        let r = Tensor::from_vec(vec![1.0f32, 2.0, 3.0], (2, 2));
        assert!(matches!(
            r,
            Err(Error::ElementCountMismatch {
                expected: 4,
                got: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_get() {
        let t = Tensor::from_vec(arange(24), (2, 3, 4)).unwrap();
        assert_eq!(t.get(&[1, 2, 3]).unwrap(), 23.0);
        assert_eq!(t.get(&[0, 1, 0]).unwrap(), 4.0);
        assert!(t.get(&[2, 0, 0]).is_err());
    }

    #[test]
    fn test_narrow_leading_is_view() {
        let t = Tensor::from_vec(arange(12), (6, 2)).unwrap();
        let w = t.narrow(0, 2, 2).unwrap();
        assert_eq!(w.dims(), &[2, 2]);
        assert_eq!(w.as_slice(), &[4.0, 5.0, 6.0, 7.0]);
        assert!(w.shares_storage(&t));
        assert_eq!(w.get(&[1, 1]).unwrap(), 7.0);
    }

    #[test]
    fn test_narrow_inner_copies() {
        let t = Tensor::from_vec(arange(12), (2, 3, 2)).unwrap();
        let n = t.narrow(1, 1, 2).unwrap();
        assert_eq!(n.dims(), &[2, 2, 2]);
        assert_eq!(n.to_vec(), vec![2.0, 3.0, 4.0, 5.0, 8.0, 9.0, 10.0, 11.0]);
        assert!(!n.shares_storage(&t));
    }

    #[test]
    fn test_narrow_out_of_bounds() {
        let t = Tensor::from_vec(arange(6), (3, 2)).unwrap();
        assert!(matches!(
            t.narrow(0, 2, 2),
            Err(Error::NarrowOutOfBounds { dim_size: 3, .. })
        ));
    }

    #[test]
    fn test_stack() {
        let a = Tensor::from_vec(vec![1i64, 2], 2).unwrap();
        let b = Tensor::from_vec(vec![3i64, 4], 2).unwrap();
        let s = Tensor::stack(&[a, b]).unwrap();
        assert_eq!(s.dims(), &[2, 2]);
        assert_eq!(s.to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_stack_shape_mismatch() {
        let a = Tensor::<f32>::zeros((2, 3));
        let b = Tensor::<f32>::zeros((3, 3));
        assert!(matches!(
            Tensor::stack(&[a, b]),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(Tensor::<f32>::stack(&[]).is_err());
    }

    #[test]
    fn test_min_max() {
        let t = Tensor::from_vec(vec![3i64, -1, 7, 0], 4).unwrap();
        assert_eq!(t.min_max(), Some((-1, 7)));
        assert_eq!(Tensor::<i64>::zeros(0).min_max(), None);
    }
}
