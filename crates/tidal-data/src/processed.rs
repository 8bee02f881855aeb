// ProcessedDataset — windowed, normalized recordings from a directory of archives
//
// Construction is eager and sequential:
//
//   1. list <base_dir>/*.<ext>, sorted by file name
//   2. for each archive: read x [T, C, F] and y [T, ...]
//   3. normalize x over the channel axis
//   4. transpose x to [T, F, C]
//   5. train: cut x and y into floor(T / L) windows of L timesteps
//      eval:  keep the whole archive as one sample
//   6. append to one flat sample list, archive order then window order
//
// Afterwards the dataset is read-only; samples share their archive's buffers.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use tidal_core::DType;

use crate::archive::{discover_archives, Archive};
use crate::config::{Mode, ProcessedConfig};
use crate::dataset::{Dataset, Sample};
use crate::error::{DataError, Result};
use crate::normalize::normalize_channels;
use crate::window::{feature_major, label_tensor, split_windows};

/// What one archive contributed to the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Where the archive was read from.
    pub path: PathBuf,
    /// Timesteps `T` before windowing.
    pub timesteps: usize,
    /// Channel count `C`.
    pub channels: usize,
    /// Feature count `F`.
    pub features: usize,
    /// Stored element type of `x`.
    pub x_dtype: DType,
    /// Stored element type of `y`.
    pub y_dtype: DType,
    /// Number of samples this archive added.
    pub samples: usize,
}

/// A fully materialized dataset of processed recordings.
///
/// In [`Mode::Train`] every sample is a window of `temporal_len` timesteps;
/// in [`Mode::Eval`] every sample is a whole archive.
///
/// # Example
/// ```ignore
/// let ds = ProcessedDataset::new("data/physionet_processed/train", 10, Mode::Train)?;
/// for i in 0..ds.len() {
///     let sample = ds.get(i)?;
///     println!("{:?} {:?}", sample.x.dims(), sample.y.dims());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ProcessedDataset {
    samples: Vec<Sample>,
    archives: Vec<ArchiveSummary>,
    config: ProcessedConfig,
}

impl ProcessedDataset {
    /// Load every archive under `base_dir` with default keys and epsilon.
    pub fn new(base_dir: impl AsRef<Path>, temporal_len: usize, mode: Mode) -> Result<Self> {
        let config = ProcessedConfig::default()
            .temporal_len(temporal_len)
            .mode(mode);
        Self::load(base_dir, config)
    }

    /// Load every archive under `base_dir` as described by `config`.
    pub fn load(base_dir: impl AsRef<Path>, config: ProcessedConfig) -> Result<Self> {
        config.validate()?;
        let base_dir = base_dir.as_ref();
        let paths = discover_archives(base_dir, &config.extension)?;
        debug!(
            "found {} .{} archive(s) in {:?}",
            paths.len(),
            config.extension,
            base_dir
        );

        let mut dataset = Self::empty(config);
        for path in paths {
            let archive = Archive::open(&path, &dataset.config.x_key, &dataset.config.y_key)?;
            dataset.ingest(archive)?;
        }
        dataset.log_summary();
        Ok(dataset)
    }

    /// Build from archives already in memory, in the given order.
    pub fn from_archives(
        archives: impl IntoIterator<Item = Archive>,
        config: ProcessedConfig,
    ) -> Result<Self> {
        config.validate()?;
        let mut dataset = Self::empty(config);
        for archive in archives {
            dataset.ingest(archive)?;
        }
        dataset.log_summary();
        Ok(dataset)
    }

    fn empty(config: ProcessedConfig) -> Self {
        Self {
            samples: Vec::new(),
            archives: Vec::new(),
            config,
        }
    }

    fn ingest(&mut self, archive: Archive) -> Result<()> {
        let path = archive.path().to_path_buf();
        let (x_dtype, y_dtype) = (archive.x_dtype(), archive.y_dtype());
        let (x, y) = archive.into_arrays();
        let (timesteps, channels, features) = x.dim();

        let x = feature_major(&normalize_channels(&x, self.config.epsilon))?;
        let y = label_tensor(&y)?;

        let before = self.samples.len();
        match self.config.mode {
            Mode::Train => {
                let xs = split_windows(&x, self.config.temporal_len)?;
                let ys = split_windows(&y, self.config.temporal_len)?;
                self.samples
                    .extend(xs.into_iter().zip(ys).map(|(x, y)| Sample { x, y }));
            }
            Mode::Eval => self.samples.push(Sample { x, y }),
        }
        let added = self.samples.len() - before;

        if added == 0 {
            warn!(
                "{:?}: {} timesteps is shorter than temporal_len {}, no samples",
                path, timesteps, self.config.temporal_len
            );
        } else {
            debug!(
                "{:?}: x [{}, {}, {}] {} / y {} -> {} sample(s)",
                path, timesteps, channels, features, x_dtype, y_dtype, added
            );
        }

        self.archives.push(ArchiveSummary {
            path,
            timesteps,
            channels,
            features,
            x_dtype,
            y_dtype,
            samples: added,
        });
        Ok(())
    }

    fn log_summary(&self) {
        info!(
            "{} dataset: {} sample(s) from {} archive(s), temporal_len {}",
            self.config.mode,
            self.samples.len(),
            self.archives.len(),
            self.config.temporal_len
        );
    }

    /// Train or eval.
    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Window length used in train mode.
    pub fn temporal_len(&self) -> usize {
        self.config.temporal_len
    }

    /// The configuration this dataset was built with.
    pub fn config(&self) -> &ProcessedConfig {
        &self.config
    }

    /// Per-archive summaries, in load order.
    pub fn archives(&self) -> &[ArchiveSummary] {
        &self.archives
    }

    /// All samples, in dataset order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Smallest and largest label across every sample, `None` if there are
    /// no labels at all.
    pub fn label_range(&self) -> Option<(i64, i64)> {
        self.samples
            .iter()
            .filter_map(|s| s.y.min_max())
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    }
}

impl Dataset for ProcessedDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        self.samples
            .get(index)
            .cloned()
            .ok_or(DataError::IndexOutOfRange {
                index,
                len: self.samples.len(),
            })
    }

    fn name(&self) -> &str {
        match self.config.mode {
            Mode::Train => "processed-train",
            Mode::Eval => "processed-eval",
        }
    }
}
