// Dataset trait — unified interface for any data source

use std::sync::Arc;

use tidal_core::Tensor;

use crate::error::Result;

/// A single sample: a pair of (features, labels).
///
/// Features are float tensors and labels integer tensors, ready to be
/// stacked into batches. Both share their buffers with the dataset they came
/// from, so cloning a sample is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Feature tensor, `[L, F, C]` for a processed window.
    pub x: Tensor<f32>,
    /// Label tensor, `[L, ...]`, aligned with `x` on the leading axis.
    pub y: Tensor<i64>,
}

impl Sample {
    /// Number of timesteps in this sample (leading dimension of `x`).
    pub fn timesteps(&self) -> usize {
        self.x.dims().first().copied().unwrap_or(0)
    }
}

/// A dataset is an indexed collection of samples.
///
/// Implementations must be `Send + Sync` so DataLoader can read from multiple
/// threads when parallel fetching is enabled.
pub trait Dataset: Send + Sync {
    /// Total number of samples in the dataset.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieve the sample at position `index`.
    ///
    /// Fails with [`DataError::IndexOutOfRange`](crate::DataError::IndexOutOfRange)
    /// when `index >= self.len()`.
    fn get(&self, index: usize) -> Result<Sample>;

    /// Optional human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }
}

impl<D: Dataset + ?Sized> Dataset for Arc<D> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        (**self).get(index)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<D: Dataset + ?Sized> Dataset for Box<D> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        (**self).get(index)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
