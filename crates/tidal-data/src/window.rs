// Temporal windowing
//
// A processed archive with T timesteps is cut into floor(T / L) contiguous,
// non-overlapping windows of exactly L timesteps. The tail remainder
// (T mod L timesteps) is dropped, never padded:
//
//   T = 25, L = 10:   [0..10) [10..20) | 20..25 dropped
//
// Windows are views into the archive's tensor, so splitting costs no copies.

use ndarray::{Array3, ArrayD};

use tidal_core::{Tensor, WithDType};

use crate::error::{DataError, Result};

/// Number of full windows of `temporal_len` in `timesteps`.
pub fn window_count(timesteps: usize, temporal_len: usize) -> usize {
    if temporal_len == 0 {
        0
    } else {
        timesteps / temporal_len
    }
}

/// Split a tensor along its leading (time) axis into full windows.
///
/// Windows come back in time order; any remainder is discarded.
pub fn split_windows<T: WithDType>(t: &Tensor<T>, temporal_len: usize) -> Result<Vec<Tensor<T>>> {
    if temporal_len == 0 {
        return Err(DataError::InvalidTemporalLen(temporal_len));
    }
    let timesteps = t.dims().first().copied().unwrap_or(0);
    (0..window_count(timesteps, temporal_len))
        .map(|i| {
            t.narrow(0, i * temporal_len, temporal_len)
                .map_err(DataError::from)
        })
        .collect()
}

/// Swap the channel and feature axes, `[T, C, F]` → `[T, F, C]`, and convert
/// to a float tensor.
pub fn feature_major(x: &Array3<f64>) -> Result<Tensor<f32>> {
    let transposed = x.view().permuted_axes([0, 2, 1]);
    let data: Vec<f32> = transposed.iter().map(|&v| v as f32).collect();
    Ok(Tensor::from_vec(data, transposed.shape())?)
}

/// Convert a label array into an integer tensor of the same shape.
pub fn label_tensor(y: &ArrayD<i64>) -> Result<Tensor<i64>> {
    Ok(Tensor::from_vec(y.iter().copied().collect(), y.shape())?)
}
