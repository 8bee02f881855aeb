// DataLoader — batching, shuffling, iteration

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use rayon::prelude::*;

use tidal_core::Tensor;

use crate::dataset::{Dataset, Sample};
use crate::error::{DataError, Result};

/// Configuration for the DataLoader.
#[derive(Debug, Clone)]
pub struct DataLoaderConfig {
    /// Number of samples per batch.
    pub batch_size: usize,
    /// Whether to shuffle indices each epoch.
    pub shuffle: bool,
    /// Whether to drop the last incomplete batch.
    pub drop_last: bool,
    /// Number of parallel workers for sample fetching (0 = sequential).
    pub num_workers: usize,
    /// Optional random seed for reproducible shuffling.
    pub seed: Option<u64>,
}

impl Default for DataLoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            shuffle: true,
            drop_last: false,
            num_workers: 0,
            seed: None,
        }
    }
}

impl DataLoaderConfig {
    pub fn batch_size(mut self, bs: usize) -> Self {
        self.batch_size = bs;
        self
    }

    pub fn shuffle(mut self, s: bool) -> Self {
        self.shuffle = s;
        self
    }

    pub fn drop_last(mut self, d: bool) -> Self {
        self.drop_last = d;
        self
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = Some(s);
        self
    }
}

/// A batch of stacked samples.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Features, `[B, ...sample x shape]`.
    pub x: Tensor<f32>,
    /// Labels, `[B, ...sample y shape]`.
    pub y: Tensor<i64>,
    /// Dataset indices the batch was drawn from, in batch order.
    pub indices: Vec<usize>,
}

impl Batch {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// A DataLoader wraps a Dataset and produces batches of tensors.
///
/// All samples in a batch must share a shape. Train-mode windows always do;
/// eval-mode samples are whole recordings of varying length, so load those
/// with `batch_size(1)`.
pub struct DataLoader<'a> {
    dataset: &'a dyn Dataset,
    config: DataLoaderConfig,
    indices: Vec<usize>,
    rng: StdRng,
}

impl<'a> DataLoader<'a> {
    /// Create a new DataLoader over a dataset.
    pub fn new(dataset: &'a dyn Dataset, config: DataLoaderConfig) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(DataError::InvalidConfig(
                "batch_size must be positive".to_string(),
            ));
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let indices: Vec<usize> = (0..dataset.len()).collect();
        Ok(Self {
            dataset,
            config,
            indices,
            rng,
        })
    }

    /// The number of batches per epoch.
    pub fn num_batches(&self) -> usize {
        if self.config.drop_last {
            self.dataset.len() / self.config.batch_size
        } else {
            self.dataset.len().div_ceil(self.config.batch_size)
        }
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Reshuffle indices (call at the start of each epoch).
    pub fn reshuffle(&mut self) {
        if self.config.shuffle {
            self.indices.shuffle(&mut self.rng);
        }
    }

    /// Fetch a slice of samples, optionally in parallel via rayon.
    fn fetch_samples(&self, indices: &[usize]) -> Result<Vec<Sample>> {
        if self.config.num_workers > 0 && indices.len() > 1 {
            indices.par_iter().map(|&i| self.dataset.get(i)).collect()
        } else {
            indices.iter().map(|&i| self.dataset.get(i)).collect()
        }
    }

    /// Build batch number `batch_idx` of the current epoch order.
    fn batch(&self, batch_idx: usize) -> Option<Result<Batch>> {
        let bs = self.config.batch_size;
        let n = self.indices.len();
        let start = batch_idx * bs;

        if start >= n {
            return None;
        }
        if self.config.drop_last && start + bs > n {
            return None;
        }

        let end = (start + bs).min(n);
        let batch_indices = self.indices[start..end].to_vec();
        Some(self.collate(batch_indices))
    }

    fn collate(&self, indices: Vec<usize>) -> Result<Batch> {
        let samples = self.fetch_samples(&indices)?;
        let (xs, ys): (Vec<_>, Vec<_>) = samples.into_iter().map(|s| (s.x, s.y)).unzip();
        Ok(Batch {
            x: Tensor::stack(&xs)?,
            y: Tensor::stack(&ys)?,
            indices,
        })
    }

    /// Produce all batches for one epoch.
    pub fn epoch_batches(&mut self) -> Result<Vec<Batch>> {
        self.iter_batches().collect()
    }

    /// Iterate over batches one at a time (lower memory than `epoch_batches`).
    pub fn iter_batches(&mut self) -> BatchIterator<'_, 'a> {
        self.reshuffle();
        BatchIterator {
            loader: self,
            batch_idx: 0,
        }
    }
}

/// Iterator that yields one batch at a time.
pub struct BatchIterator<'l, 'a> {
    loader: &'l DataLoader<'a>,
    batch_idx: usize,
}

impl<'l, 'a> Iterator for BatchIterator<'l, 'a> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch = self.loader.batch(self.batch_idx)?;
        self.batch_idx += 1;
        Some(batch)
    }
}
