// DataError — everything that can go wrong while building or reading a dataset

use std::path::PathBuf;

use ndarray_npy::ReadNpzError;

/// Errors from loading processed archives and serving samples.
///
/// Construction errors carry the path of the offending archive. All of them
/// abort construction; no partial dataset is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The base directory does not exist or is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A file or directory could not be read.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The archive container or one of its arrays is malformed.
    #[error("failed to read archive {}: {source}", .path.display())]
    Npz { path: PathBuf, source: ReadNpzError },

    /// A required array is not present in the archive.
    #[error("{}: missing field '{field}'", .path.display())]
    MissingField { path: PathBuf, field: String },

    /// The array's element type cannot be converted (e.g. complex or string).
    #[error("{}: field '{field}' has an unsupported element type", .path.display())]
    UnsupportedDType { path: PathBuf, field: String },

    /// An unsigned label does not fit in i64.
    #[error("{}: field '{field}' holds {value}, which does not fit in i64", .path.display())]
    LabelOverflow {
        path: PathBuf,
        field: String,
        value: u64,
    },

    /// The array has the wrong number of dimensions.
    #[error("{}: field '{field}' has rank {got}, expected {expected}", .path.display())]
    BadRank {
        path: PathBuf,
        field: String,
        expected: String,
        got: usize,
    },

    /// `x` and `y` disagree on the number of timesteps.
    #[error("{}: x has {x_len} timesteps but y has {y_len}", .path.display())]
    LengthMismatch {
        path: PathBuf,
        x_len: usize,
        y_len: usize,
    },

    /// Window length must be at least one timestep.
    #[error("temporal_len must be positive, got {0}")]
    InvalidTemporalLen(usize),

    /// Any other invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sample index outside `[0, len)`.
    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Tensor-level failure (stacking, narrowing).
    #[error(transparent)]
    Core(#[from] tidal_core::Error),
}

/// Convenience Result type for the data crate.
pub type Result<T> = std::result::Result<T, DataError>;
