// Archive — one processed recording on disk
//
// Each archive is a numpy `.npz` file (a zip of `.npy` arrays) holding:
//   x: float[T, C, F]   timesteps × channels × features
//   y: int[T, ...]      labels aligned with x on the leading axis
//
// numpy's `savez` stores an array named "x" as the zip entry "x.npy"; writers
// that already append the suffix, or don't, both appear in the wild, so
// lookups accept either form.
//
// Features may be stored as f32 or f64 and are read into f64 for the
// normalization math. Labels may use any fixed-width integer type (or bool)
// and are widened to i64; u64 labels past i64::MAX are rejected.

use std::fs::File;
use std::path::{Path, PathBuf};

use ndarray::{Array3, ArrayD, Ix3, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpyError, ReadNpzError};
use walkdir::WalkDir;

use tidal_core::DType;

use crate::error::{DataError, Result};

/// A loaded archive: validated `x`/`y` arrays plus where they came from.
#[derive(Debug, Clone)]
pub struct Archive {
    path: PathBuf,
    x: Array3<f64>,
    y: ArrayD<i64>,
    x_dtype: DType,
    y_dtype: DType,
}

impl Archive {
    /// Wrap in-memory arrays as an archive.
    ///
    /// `path` is only used to label errors and summaries. Fails if `y` is a
    /// scalar or its leading dimension differs from `x`'s.
    pub fn new(path: impl Into<PathBuf>, x: Array3<f64>, y: ArrayD<i64>) -> Result<Self> {
        Self::checked(path.into(), x, y, DType::F64, DType::I64, "y")
    }

    /// Read `x_key` and `y_key` from the `.npz` file at `path`.
    pub fn open(path: impl AsRef<Path>, x_key: &str, y_key: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut npz = NpzReader::new(file).map_err(|source| DataError::Npz {
            path: path.to_path_buf(),
            source,
        })?;
        let names = npz.names().map_err(|source| DataError::Npz {
            path: path.to_path_buf(),
            source,
        })?;

        let x_entry = resolve_entry(&names, x_key).ok_or_else(|| DataError::MissingField {
            path: path.to_path_buf(),
            field: x_key.to_string(),
        })?;
        let y_entry = resolve_entry(&names, y_key).ok_or_else(|| DataError::MissingField {
            path: path.to_path_buf(),
            field: y_key.to_string(),
        })?;

        let (x, x_dtype) = read_features(&mut npz, path, x_key, x_entry)?;
        let (y, y_dtype) = read_labels(&mut npz, path, y_key, y_entry)?;

        let got = x.ndim();
        let x = x
            .into_dimensionality::<Ix3>()
            .map_err(|_| DataError::BadRank {
                path: path.to_path_buf(),
                field: x_key.to_string(),
                expected: "3 ([T, C, F])".to_string(),
                got,
            })?;

        Self::checked(path.to_path_buf(), x, y, x_dtype, y_dtype, y_key)
    }

    fn checked(
        path: PathBuf,
        x: Array3<f64>,
        y: ArrayD<i64>,
        x_dtype: DType,
        y_dtype: DType,
        y_key: &str,
    ) -> Result<Self> {
        if y.ndim() == 0 {
            return Err(DataError::BadRank {
                path,
                field: y_key.to_string(),
                expected: "at least 1 ([T, ...])".to_string(),
                got: 0,
            });
        }
        let x_len = x.shape()[0];
        let y_len = y.shape()[0];
        if x_len != y_len {
            return Err(DataError::LengthMismatch { path, x_len, y_len });
        }
        Ok(Self {
            path,
            x,
            y,
            x_dtype,
            y_dtype,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw features, `[T, C, F]`.
    pub fn x(&self) -> &Array3<f64> {
        &self.x
    }

    /// Raw labels, `[T, ...]`.
    pub fn y(&self) -> &ArrayD<i64> {
        &self.y
    }

    /// Number of timesteps `T`.
    pub fn timesteps(&self) -> usize {
        self.x.shape()[0]
    }

    /// Element type `x` was stored with.
    pub fn x_dtype(&self) -> DType {
        self.x_dtype
    }

    /// Element type `y` was stored with.
    pub fn y_dtype(&self) -> DType {
        self.y_dtype
    }

    /// Take the arrays out, consuming the archive.
    pub fn into_arrays(self) -> (Array3<f64>, ArrayD<i64>) {
        (self.x, self.y)
    }
}

/// List the archives directly inside `base_dir` with the given extension.
///
/// Hidden entries and subdirectories are skipped. Results are sorted by file
/// name so repeated loads see the same order. A directory with no matches
/// yields an empty list.
pub fn discover_archives(base_dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let base_dir = base_dir.as_ref();
    if !base_dir.is_dir() {
        return Err(DataError::NotADirectory(base_dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(base_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !entry.file_name().as_encoded_bytes().starts_with(b".")
        })
    {
        let entry = entry.map_err(|e| DataError::Io {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| base_dir.to_path_buf()),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if path.extension().and_then(|e| e.to_str()) == Some(extension) {
            paths.push(path);
        }
    }
    Ok(paths)
}

fn resolve_entry<'a>(names: &'a [String], key: &str) -> Option<&'a str> {
    let with_suffix = format!("{key}.npy");
    names
        .iter()
        .find(|n| n.as_str() == key)
        .or_else(|| names.iter().find(|n| **n == with_suffix))
        .map(String::as_str)
}

fn is_wrong_dtype(e: &ReadNpzError) -> bool {
    matches!(e, ReadNpzError::Npy(ReadNpyError::WrongDescriptor(_)))
}

// Try each element type in turn; a descriptor mismatch moves on to the next,
// any other failure is final.
macro_rules! read_as {
    ($npz:expr, $path:expr, $entry:expr, $ty:ty, $dtype:expr, $conv:expr) => {
        match $npz.by_name::<OwnedRepr<$ty>, IxDyn>($entry) {
            Ok(a) => return Ok((a.mapv($conv), $dtype)),
            Err(e) if is_wrong_dtype(&e) => {}
            Err(source) => {
                return Err(DataError::Npz {
                    path: $path.to_path_buf(),
                    source,
                })
            }
        }
    };
}

fn read_features(
    npz: &mut NpzReader<File>,
    path: &Path,
    field: &str,
    entry: &str,
) -> Result<(ArrayD<f64>, DType)> {
    read_as!(npz, path, entry, f32, DType::F32, f64::from);
    read_as!(npz, path, entry, f64, DType::F64, |v: f64| v);
    Err(DataError::UnsupportedDType {
        path: path.to_path_buf(),
        field: field.to_string(),
    })
}

fn read_labels(
    npz: &mut NpzReader<File>,
    path: &Path,
    field: &str,
    entry: &str,
) -> Result<(ArrayD<i64>, DType)> {
    read_as!(npz, path, entry, i64, DType::I64, |v: i64| v);
    read_as!(npz, path, entry, i32, DType::I32, i64::from);
    read_as!(npz, path, entry, i16, DType::I16, i64::from);
    read_as!(npz, path, entry, i8, DType::I8, i64::from);
    read_as!(npz, path, entry, u8, DType::U8, i64::from);
    read_as!(npz, path, entry, u16, DType::U16, i64::from);
    read_as!(npz, path, entry, u32, DType::U32, i64::from);
    read_as!(npz, path, entry, bool, DType::Bool, i64::from);

    match npz.by_name::<OwnedRepr<u64>, IxDyn>(entry) {
        Ok(a) => {
            if let Some(&value) = a.iter().find(|&&v| i64::try_from(v).is_err()) {
                return Err(DataError::LabelOverflow {
                    path: path.to_path_buf(),
                    field: field.to_string(),
                    value,
                });
            }
            Ok((a.mapv(|v| v as i64), DType::U64))
        }
        Err(e) if is_wrong_dtype(&e) => Err(DataError::UnsupportedDType {
            path: path.to_path_buf(),
            field: field.to_string(),
        }),
        Err(source) => Err(DataError::Npz {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Array1};
    use ndarray_npy::NpzWriter;

    fn write_npz(path: &Path, x: &ArrayD<f32>, y: &Array1<i32>) {
        let mut npz = NpzWriter::new(File::create(path).unwrap());
        npz.add_array("x", x).unwrap();
        npz.add_array("y", y).unwrap();
        npz.finish().unwrap();
    }

    #[test]
    fn resolve_entry_accepts_both_forms() {
        let names = vec!["x.npy".to_string(), "y".to_string()];
        assert_eq!(resolve_entry(&names, "x"), Some("x.npy"));
        assert_eq!(resolve_entry(&names, "y"), Some("y"));
        assert_eq!(resolve_entry(&names, "z"), None);
    }

    #[test]
    fn open_widens_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.npz");
        let x = Array::from_shape_fn(IxDyn(&[4, 3, 2]), |d| (d[0] + d[1] + d[2]) as f32);
        let y = Array1::from(vec![0i32, 1, 2, 3]);
        write_npz(&path, &x, &y);

        let archive = Archive::open(&path, "x", "y").unwrap();
        assert_eq!(archive.timesteps(), 4);
        assert_eq!(archive.x().shape(), &[4, 3, 2]);
        assert_eq!(archive.x_dtype(), DType::F32);
        assert_eq!(archive.y_dtype(), DType::I32);
        assert_eq!(archive.x()[[3, 2, 1]], 6.0);
        assert_eq!(archive.y().as_slice().unwrap(), &[0, 1, 2, 3]);
    }

    #[test]
    fn open_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.npz");
        let x = Array::zeros(IxDyn(&[2, 1, 1]));
        let y = Array1::from(vec![0i32, 1]);
        write_npz(&path, &x, &y);

        let err = Archive::open(&path, "x", "labels").unwrap_err();
        assert!(matches!(err, DataError::MissingField { ref field, .. } if field == "labels"));
    }

    #[test]
    fn open_wrong_rank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.npz");
        let x = Array::zeros(IxDyn(&[2, 3]));
        let y = Array1::from(vec![0i32, 1]);
        write_npz(&path, &x, &y);

        let err = Archive::open(&path, "x", "y").unwrap_err();
        assert!(matches!(err, DataError::BadRank { got: 2, .. }));
    }

    #[test]
    fn open_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.npz");
        let x = Array::zeros(IxDyn(&[3, 1, 1]));
        let y = Array1::from(vec![0i32, 1]);
        write_npz(&path, &x, &y);

        let err = Archive::open(&path, "x", "y").unwrap_err();
        assert!(matches!(
            err,
            DataError::LengthMismatch {
                x_len: 3,
                y_len: 2,
                ..
            }
        ));
    }

    #[test]
    fn open_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.npz");
        std::fs::write(&path, b"definitely not a zip").unwrap();
        assert!(matches!(
            Archive::open(&path, "x", "y"),
            Err(DataError::Npz { .. })
        ));
    }

    #[test]
    fn new_rejects_scalar_labels() {
        let x = Array3::<f64>::zeros((1, 1, 1));
        let y = ArrayD::<i64>::zeros(IxDyn(&[]));
        assert!(matches!(
            Archive::new("mem", x, y),
            Err(DataError::BadRank { got: 0, .. })
        ));
    }

    #[test]
    fn discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.npz", "a.npz", "c.txt", ".hidden.npz"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.npz")).unwrap();

        let found = discover_archives(dir.path(), "npz").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.npz", "b.npz"]);
    }

    #[cfg(unix)]
    #[test]
    fn discover_keeps_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let odd = dir.path().join(OsStr::from_bytes(b"rec\xff.npz"));
        std::fs::write(&odd, b"").unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b".\xff.npz")), b"").unwrap();

        let found = discover_archives(dir.path(), "npz").unwrap();
        assert_eq!(found, vec![odd]);
    }

    #[test]
    fn open_rejects_u64_labels_past_i64() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.npz");
        let x = Array::<f32, _>::zeros(IxDyn(&[2, 1, 1]));
        let y = Array1::from(vec![1u64, u64::MAX]);
        let mut npz = NpzWriter::new(File::create(&path).unwrap());
        npz.add_array("x", &x).unwrap();
        npz.add_array("y", &y).unwrap();
        npz.finish().unwrap();

        let err = Archive::open(&path, "x", "y").unwrap_err();
        assert!(matches!(
            err,
            DataError::LabelOverflow { value, ref field, .. } if value == u64::MAX && field == "y"
        ));
    }

    #[test]
    fn open_accepts_u64_labels_in_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.npz");
        let x = Array::<f32, _>::zeros(IxDyn(&[2, 1, 1]));
        let y = Array1::from(vec![3u64, i64::MAX as u64]);
        let mut npz = NpzWriter::new(File::create(&path).unwrap());
        npz.add_array("x", &x).unwrap();
        npz.add_array("y", &y).unwrap();
        npz.finish().unwrap();

        let archive = Archive::open(&path, "x", "y").unwrap();
        assert_eq!(archive.y_dtype(), DType::U64);
        assert_eq!(archive.y().as_slice().unwrap(), &[3, i64::MAX]);
    }

    #[test]
    fn discover_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            discover_archives(&missing, "npz"),
            Err(DataError::NotADirectory(_))
        ));
    }
}
