// Dataset Combinators — subset and concatenate datasets

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::dataset::{Dataset, Sample};
use crate::error::{DataError, Result};

// SubsetDataset — view of selected indices

/// A dataset that exposes only the samples at the given indices.
///
/// This is useful for train/validation splitting of windows.
pub struct SubsetDataset<D: Dataset> {
    inner: D,
    indices: Vec<usize>,
}

impl<D: Dataset> SubsetDataset<D> {
    /// Create a subset of `inner` containing only the samples at `indices`.
    ///
    /// Indices are not checked up front; a stale one surfaces as
    /// `IndexOutOfRange` from the inner dataset at `get` time.
    pub fn new(inner: D, indices: Vec<usize>) -> Self {
        Self { inner, indices }
    }

    /// Indices into the inner dataset, in subset order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl<D: Dataset> Dataset for SubsetDataset<D> {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let inner_index = self
            .indices
            .get(index)
            .copied()
            .ok_or(DataError::IndexOutOfRange {
                index,
                len: self.indices.len(),
            })?;
        self.inner.get(inner_index)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

// ConcatDataset — concatenate multiple datasets

/// Concatenate datasets end-to-end, e.g. several recording directories.
pub struct ConcatDataset {
    datasets: Vec<Box<dyn Dataset>>,
    cumulative_sizes: Vec<usize>,
}

impl ConcatDataset {
    /// Create a concatenation of the given datasets, in order.
    pub fn new(datasets: Vec<Box<dyn Dataset>>) -> Self {
        let mut cumulative_sizes = Vec::with_capacity(datasets.len());
        let mut total = 0;
        for ds in &datasets {
            total += ds.len();
            cumulative_sizes.push(total);
        }

        Self {
            datasets,
            cumulative_sizes,
        }
    }

    /// Locate which dataset and local index a global index maps to.
    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        let ds_idx = self.cumulative_sizes.partition_point(|&cum| cum <= index);
        if ds_idx == self.datasets.len() {
            return None;
        }
        let offset = if ds_idx == 0 {
            0
        } else {
            self.cumulative_sizes[ds_idx - 1]
        };
        Some((ds_idx, index - offset))
    }
}

impl Dataset for ConcatDataset {
    fn len(&self) -> usize {
        self.cumulative_sizes.last().copied().unwrap_or(0)
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let (ds_idx, local_idx) = self.locate(index).ok_or(DataError::IndexOutOfRange {
            index,
            len: self.len(),
        })?;
        self.datasets[ds_idx].get(local_idx)
    }

    fn name(&self) -> &str {
        "concat"
    }
}

// Train / Validation Split

/// Split a dataset into (train, val) or (train, val, test) subsets.
///
/// Returns `SubsetDataset` views over the original dataset. Wrap a large
/// dataset in an `Arc` first so the views share it instead of cloning it.
///
/// # Arguments
/// * `dataset` — the source dataset
/// * `ratios` — slice of 2 or 3 floats that sum to 1.0, e.g. `[0.8, 0.2]`
///   or `[0.7, 0.15, 0.15]`
/// * `seed` — random seed for reproducible shuffling of indices
pub fn train_test_split<D>(dataset: D, ratios: &[f64], seed: u64) -> Result<Vec<SubsetDataset<D>>>
where
    D: Dataset + Clone,
{
    if ratios.len() < 2 || ratios.len() > 3 {
        return Err(DataError::InvalidConfig(format!(
            "train_test_split: ratios must have 2 or 3 elements, got {}",
            ratios.len()
        )));
    }
    let sum: f64 = ratios.iter().sum();
    if (sum - 1.0).abs() > 1e-6 || ratios.iter().any(|r| *r < 0.0) {
        return Err(DataError::InvalidConfig(format!(
            "train_test_split: ratios must be non-negative and sum to 1.0, got {:?}",
            ratios
        )));
    }

    let n = dataset.len();
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut splits = Vec::with_capacity(ratios.len());
    let mut offset = 0;
    for (i, &ratio) in ratios.iter().enumerate() {
        let count = if i == ratios.len() - 1 {
            n - offset // give remainder to last split
        } else {
            (n as f64 * ratio).round() as usize
        };
        let end = (offset + count).min(n);
        splits.push(SubsetDataset::new(
            dataset.clone(),
            indices[offset..end].to_vec(),
        ));
        offset = end;
    }

    Ok(splits)
}

// Tests
