// Channel-axis normalization
//
// For x of shape [T, C, F], every (t, f) pair owns a channel vector
// x[t, :, f] of length C. Each such vector is centered to zero mean and then
// divided by its Euclidean norm plus a small epsilon:
//
//   v' = (v - mean(v)) / (||v - mean(v)||₂ + eps)
//
// This is norm scaling, not variance scaling: a centered vector with norm
// much larger than eps ends up with norm ≈ 1, and a constant vector (all
// channels equal, including all zero) ends up all zeros.

use ndarray::{Array3, Axis};

/// Default stabilizer added to the channel norm.
pub const DEFAULT_EPSILON: f64 = 1e-2;

/// Center and norm-scale every channel vector of a `[T, C, F]` array.
///
/// An array with no channels is returned unchanged.
pub fn normalize_channels(x: &Array3<f64>, epsilon: f64) -> Array3<f64> {
    let mean = match x.mean_axis(Axis(1)) {
        Some(m) => m.insert_axis(Axis(1)),
        None => return x.clone(),
    };
    let centered = x - &mean;
    let norm = centered
        .mapv(|v| v * v)
        .sum_axis(Axis(1))
        .mapv(f64::sqrt)
        .insert_axis(Axis(1));
    centered / &(norm + epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, Array};

    fn channel_norm(x: &Array3<f64>, t: usize, f: usize) -> f64 {
        x.slice(s![t, .., f]).mapv(|v| v * v).sum().sqrt()
    }

    #[test]
    fn centers_and_scales() {
        // One timestep, three channels, one feature: [1, 2, 3]
        let x = Array::from_shape_vec((1, 3, 1), vec![1.0, 2.0, 3.0]).unwrap();
        let out = normalize_channels(&x, DEFAULT_EPSILON);

        let norm = 2.0f64.sqrt();
        let denom = norm + DEFAULT_EPSILON;
        assert!((out[[0, 0, 0]] + 1.0 / denom).abs() < 1e-12);
        assert!(out[[0, 1, 0]].abs() < 1e-12);
        assert!((out[[0, 2, 0]] - 1.0 / denom).abs() < 1e-12);

        let mean: f64 = out.slice(s![0, .., 0]).sum() / 3.0;
        assert!(mean.abs() < 1e-12);
        assert!((channel_norm(&out, 0, 0) - norm / denom).abs() < 1e-12);
    }

    #[test]
    fn large_vectors_reach_unit_norm() {
        let x = Array::from_shape_fn((5, 4, 3), |(t, c, f)| {
            ((t * 31 + c * 17 + f * 7) % 11) as f64 * 100.0 + c as f64 * 50.0
        });
        let out = normalize_channels(&x, DEFAULT_EPSILON);
        for t in 0..5 {
            for f in 0..3 {
                let n = channel_norm(&out, t, f);
                assert!((n - 1.0).abs() < 1e-3, "norm at ({t}, {f}) was {n}");
            }
        }
    }

    #[test]
    fn constant_vectors_become_zero() {
        let mut x = Array3::<f64>::zeros((2, 3, 2));
        x.slice_mut(s![1, .., 1]).fill(7.5);
        let out = normalize_channels(&x, DEFAULT_EPSILON);
        assert!(out.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn features_are_independent() {
        // Feature 0 varies across channels, feature 1 is constant.
        let x = Array::from_shape_vec((1, 2, 2), vec![0.0, 5.0, 10.0, 5.0]).unwrap();
        let out = normalize_channels(&x, DEFAULT_EPSILON);
        assert!(out[[0, 0, 0]] < 0.0 && out[[0, 1, 0]] > 0.0);
        assert_eq!(out[[0, 0, 1]], 0.0);
        assert_eq!(out[[0, 1, 1]], 0.0);
    }

    #[test]
    fn shape_is_preserved() {
        let x = Array3::<f64>::ones((7, 3, 2));
        assert_eq!(normalize_channels(&x, DEFAULT_EPSILON).shape(), &[7, 3, 2]);
        let empty = Array3::<f64>::zeros((0, 3, 2));
        assert_eq!(normalize_channels(&empty, DEFAULT_EPSILON).shape(), &[0, 3, 2]);
        let no_channels = Array3::<f64>::zeros((4, 0, 2));
        assert_eq!(
            normalize_channels(&no_channels, DEFAULT_EPSILON).shape(),
            &[4, 0, 2]
        );
    }
}
