//! # tidal-data
//!
//! Datasets of processed, windowed recordings for training loops.
//!
//! This crate provides:
//! - [`Dataset`] trait — indexed access to [`Sample`]s (`x: f32`, `y: i64` tensors)
//! - [`ProcessedDataset`] — loads a directory of `.npz` archives, normalizes
//!   each recording over its channel axis and, in [`Mode::Train`], cuts it into
//!   fixed-length temporal windows
//! - [`DataLoader`] — batching and shuffling over any Dataset
//! - Dataset combinators — SubsetDataset, ConcatDataset, train_test_split
//
//   Building blocks are public too: archive discovery/reading, channel
//   normalization and windowing can be used on their own.

pub mod archive;
pub mod combinators;
pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod processed;
pub mod window;

pub use archive::{discover_archives, Archive};
pub use combinators::{train_test_split, ConcatDataset, SubsetDataset};
pub use config::{Mode, ProcessedConfig};
pub use dataset::{Dataset, Sample};
pub use error::{DataError, Result};
pub use loader::{Batch, BatchIterator, DataLoader, DataLoaderConfig};
pub use normalize::{normalize_channels, DEFAULT_EPSILON};
pub use processed::{ArchiveSummary, ProcessedDataset};
pub use window::{feature_major, label_tensor, split_windows, window_count};
