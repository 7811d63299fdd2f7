//! Batch Normalization over `(N, C, *spatial)` arrays.
//!
//! # Formula
//!
//! ```text
//! inv  = 1 / sqrt(variance + eps) [* scale]
//! bias = offset - mean * inv      (or -mean * inv)
//! y    = x * inv + bias
//! ```
//!
//! # Design
//!
//! - The channel axis is moved last (`(N, C, *S) -> (N, *S, C)`) so the
//!   per-channel statistics broadcast against the trailing axis, then moved
//!   back. Both permutations are stride-only views.
//! - `inv` and `bias` are computed in `f64` and narrowed to the element type
//!   before the multiply-add, which then rounds once per operation.
//! - Training mode recomputes mean and population variance per channel with
//!   Welford's algorithm.

use log::debug;
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Zip};

use crate::error::{shape, Result};
use crate::kernel_types::BatchNormConfig;
use crate::scalar_ops::{batch_norm_affine, welford_mean_var};
use crate::tensor::{broadcast_shape, broadcast_to};
use crate::traits::Element;

/// Per-channel mean and population variance of `x`, reducing every axis
/// except axis 1.
///
/// # Returns
///
/// Tuple of (mean, variance), each of shape `[C]`.
pub fn batch_norm_stats<T: Element>(x: ArrayViewD<'_, T>) -> Result<(ArrayD<f64>, ArrayD<f64>)> {
    if x.ndim() < 2 {
        return Err(shape(format!(
            "batch_norm expects (N, C, *spatial) input, got shape {:?}",
            x.shape()
        )));
    }
    let channels = x.len_of(Axis(1));
    let mut mean = ArrayD::zeros(IxDyn(&[channels]));
    let mut variance = ArrayD::zeros(IxDyn(&[channels]));
    for (c, lane) in x.axis_iter(Axis(1)).enumerate() {
        let (m, v) = welford_mean_var(lane.iter().map(|&e| e.to_f64()));
        mean[[c]] = m;
        variance[[c]] = v;
    }
    Ok((mean, variance))
}

/// Batch Normalization forward pass.
///
/// # Arguments
///
/// * `x` - Input `[N, C, *spatial]`
/// * `mean` - Per-channel mean, broadcastable to `[C]` on the trailing axis
/// * `variance` - Per-channel variance, same layout as `mean`
/// * `scale` - Optional per-channel gamma
/// * `offset` - Optional per-channel beta
/// * `config` - Training flag and epsilon
///
/// In training mode `mean` and `variance` are ignored and recomputed from
/// `x` for this call only.
///
/// `inv` and `bias` are derived in `f64` and narrowed to `T`; the
/// multiply-add itself runs through [`Element::affine`], so integer inputs
/// are never widened to `f64`.
///
/// # Errors
///
/// `Shape` if `x` has fewer than two axes, `Broadcast` if the statistics do
/// not broadcast against the channel-last layout.
pub fn batch_norm<T: Element>(
    x: ArrayViewD<'_, T>,
    mean: ArrayViewD<'_, f64>,
    variance: ArrayViewD<'_, f64>,
    scale: Option<ArrayViewD<'_, f64>>,
    offset: Option<ArrayViewD<'_, f64>>,
    config: &BatchNormConfig,
) -> Result<ArrayD<T>> {
    let nd = x.ndim();
    if nd < 2 {
        return Err(shape(format!(
            "batch_norm expects (N, C, *spatial) input, got shape {:?}",
            x.shape()
        )));
    }

    let batch_stats;
    let (mean, variance) = if config.training {
        debug!(
            "batch_norm: recomputing statistics for {} channels over shape {:?}",
            x.len_of(Axis(1)),
            x.shape()
        );
        batch_stats = batch_norm_stats(x.view())?;
        (batch_stats.0.view(), batch_stats.1.view())
    } else {
        (mean.reborrow(), variance.reborrow())
    };

    let (inv, bias) = affine_params::<T>(mean, variance, scale, offset, config.eps)?;

    // (N, C, *S) -> (N, *S, C)
    let mut perm: Vec<usize> = Vec::with_capacity(nd);
    perm.push(0);
    perm.extend(2..nd);
    perm.push(1);
    let xt = x.permuted_axes(IxDyn(&perm));

    let inv_view = inv.view();
    let bias_view = bias.view();
    let inv_b = broadcast_to(&inv_view, xt.shape())?;
    let bias_b = broadcast_to(&bias_view, xt.shape())?;

    let yt = Zip::from(&xt).and(&inv_b).and(&bias_b).map_collect(|&v, &i, &b| v.affine(i, b));

    // (N, *S, C) -> (N, C, *S)
    let mut back: Vec<usize> = Vec::with_capacity(nd);
    back.push(0);
    back.push(nd - 1);
    back.extend(1..nd - 1);
    let y = yt.permuted_axes(IxDyn(&back));
    Ok(y.as_standard_layout().into_owned())
}

/// Broadcast the statistics jointly and factor them into `(inv, bias)`,
/// narrowed to `T`.
fn affine_params<T: Element>(
    mean: ArrayViewD<'_, f64>,
    variance: ArrayViewD<'_, f64>,
    scale: Option<ArrayViewD<'_, f64>>,
    offset: Option<ArrayViewD<'_, f64>>,
    eps: f64,
) -> Result<(ArrayD<T>, ArrayD<T>)> {
    let mut dims = broadcast_shape(mean.shape(), variance.shape())?;
    if let Some(s) = &scale {
        dims = broadcast_shape(&dims, s.shape())?;
    }
    if let Some(o) = &offset {
        dims = broadcast_shape(&dims, o.shape())?;
    }

    let one = ArrayD::from_elem(IxDyn(&[]), 1.0f64);
    let zero = ArrayD::from_elem(IxDyn(&[]), 0.0f64);
    let has_scale = scale.is_some();
    let has_offset = offset.is_some();
    let scale = scale.map(|s| s.reborrow()).unwrap_or_else(|| one.view());
    let offset = offset.map(|o| o.reborrow()).unwrap_or_else(|| zero.view());

    let mean_b = broadcast_to(&mean, &dims)?;
    let var_b = broadcast_to(&variance, &dims)?;
    let scale_b = broadcast_to(&scale, &dims)?;
    let offset_b = broadcast_to(&offset, &dims)?;

    let mut inv = ArrayD::from_elem(IxDyn(&dims), T::ZERO);
    let mut bias = ArrayD::from_elem(IxDyn(&dims), T::ZERO);
    Zip::from(&mut inv)
        .and(&mut bias)
        .and(&mean_b)
        .and(&var_b)
        .and(&scale_b)
        .and(&offset_b)
        .for_each(|inv, bias, &m, &v, &s, &o| {
            let (i, b) = batch_norm_affine(
                m,
                v,
                has_scale.then_some(s),
                has_offset.then_some(o),
                eps,
            );
            *inv = T::from_f64(i);
            *bias = T::from_f64(b);
        });
    Ok((inv, bias))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use approx::assert_abs_diff_eq;
    use half::f16;
    use ndarray::{arr1, ArrayD};

    const EPS: f64 = 1e-6;

    fn ramp(shape: &[usize]) -> ArrayD<f64> {
        let n: usize = shape.iter().product();
        let data: Vec<f64> = (0..n).map(|i| ((i * 7) % 13) as f64 * 0.5 - 2.0).collect();
        ArrayD::from_shape_vec(IxDyn(shape), data).unwrap()
    }

    #[test]
    fn test_inference_reduces_to_standardization() {
        let x = ramp(&[2, 3, 4, 4]);
        let mean = arr1(&[0.5, -1.0, 2.0]).into_dyn();
        let var = arr1(&[4.0, 0.25, 1.0]).into_dyn();
        let cfg = BatchNormConfig::default().with_eps(0.0);

        let y = batch_norm(x.view(), mean.view(), var.view(), None, None, &cfg).unwrap();
        assert_eq!(y.shape(), x.shape());
        for ((n, c, h, w), &v) in x.clone().into_dimensionality::<ndarray::Ix4>().unwrap().indexed_iter() {
            let expected = (v - mean[[c]]) / var[[c]].sqrt();
            assert_abs_diff_eq!(y[[n, c, h, w]], expected, epsilon = EPS);
        }
    }

    #[test]
    fn test_scale_and_offset() {
        let x = ramp(&[2, 2, 3]);
        let mean = arr1(&[1.0, -1.0]).into_dyn();
        let var = arr1(&[1.0, 4.0]).into_dyn();
        let scale = arr1(&[2.0, 0.5]).into_dyn();
        let offset = arr1(&[10.0, -10.0]).into_dyn();
        let cfg = BatchNormConfig::default().with_eps(0.0);

        let y = batch_norm(
            x.view(),
            mean.view(),
            var.view(),
            Some(scale.view()),
            Some(offset.view()),
            &cfg,
        )
        .unwrap();
        for n in 0..2 {
            for c in 0..2 {
                for s in 0..3 {
                    let expected =
                        (x[[n, c, s]] - mean[[c]]) / var[[c]].sqrt() * scale[[c]] + offset[[c]];
                    assert_abs_diff_eq!(y[[n, c, s]], expected, epsilon = EPS);
                }
            }
        }
    }

    #[test]
    fn test_training_normalizes_each_channel() {
        let x = ramp(&[4, 3, 5, 2]);
        let unused = arr1(&[100.0, 100.0, 100.0]).into_dyn();
        let cfg = BatchNormConfig::default().training().with_eps(0.0);

        let y = batch_norm(x.view(), unused.view(), unused.view(), None, None, &cfg).unwrap();
        let (mean, var) = batch_norm_stats(y.view()).unwrap();
        for c in 0..3 {
            assert_abs_diff_eq!(mean[[c]], 0.0, epsilon = EPS);
            assert_abs_diff_eq!(var[[c]], 1.0, epsilon = EPS);
        }
    }

    #[test]
    fn test_two_dimensional_input() {
        let x = ndarray::arr2(&[[1.0f32, 10.0], [3.0, 30.0]]).into_dyn();
        let cfg = BatchNormConfig::default().training().with_eps(0.0);
        let none = ArrayD::<f64>::zeros(IxDyn(&[2]));
        let y = batch_norm(x.view(), none.view(), none.view(), None, None, &cfg).unwrap();
        assert_eq!(y, ndarray::arr2(&[[-1.0f32, -1.0], [1.0, 1.0]]).into_dyn());
    }

    #[test]
    fn test_preserves_half_dtype() {
        let x = ArrayD::from_elem(IxDyn(&[1, 2, 2]), f16::from_f32(3.0));
        let mean = arr1(&[1.0, 3.0]).into_dyn();
        let var = arr1(&[4.0, 1.0]).into_dyn();
        let cfg = BatchNormConfig::default().with_eps(0.0);
        let y: ArrayD<f16> = batch_norm(x.view(), mean.view(), var.view(), None, None, &cfg).unwrap();
        assert_eq!(y[[0, 0, 0]], f16::from_f32(1.0));
        assert_eq!(y[[0, 1, 1]], f16::ZERO);
    }

    #[test]
    fn test_identity_keeps_large_i64_exact() {
        let big = (1i64 << 53) + 1;
        let x = ArrayD::from_shape_vec(IxDyn(&[1, 2]), vec![big, -big]).unwrap();
        let zeros = arr1(&[0.0, 0.0]).into_dyn();
        let ones = arr1(&[1.0, 1.0]).into_dyn();
        let cfg = BatchNormConfig::default().with_eps(0.0);
        let y = batch_norm(x.view(), zeros.view(), ones.view(), None, None, &cfg).unwrap();
        assert_eq!(y, x);

        // inv = 2, bias = 1: exact in i64
        let two = arr1(&[2.0, 2.0]).into_dyn();
        let y = batch_norm(
            x.view(),
            zeros.view(),
            ones.view(),
            Some(two.view()),
            Some(ones.view()),
            &cfg,
        )
        .unwrap();
        assert_eq!(y[[0, 0]], 2 * big + 1);
        assert_eq!(y[[0, 1]], -2 * big + 1);
    }

    #[test]
    fn test_channel_mismatch_is_broadcast_error() {
        let x = ramp(&[2, 3, 4]);
        let mean = arr1(&[0.0, 0.0]).into_dyn();
        let cfg = BatchNormConfig::default();
        let err = batch_norm(x.view(), mean.view(), mean.view(), None, None, &cfg).unwrap_err();
        assert!(matches!(err, KernelError::Broadcast { .. }));
    }

    #[test]
    fn test_rejects_one_dimensional_input() {
        let x = arr1(&[1.0, 2.0]).into_dyn();
        let cfg = BatchNormConfig::default();
        let err = batch_norm(x.view(), x.view(), x.view(), None, None, &cfg).unwrap_err();
        assert!(matches!(err, KernelError::Shape(_)));
        assert!(batch_norm_stats(x.view()).is_err());
    }

    #[test]
    fn test_zero_variance_guarded_by_eps() {
        let x = ArrayD::from_elem(IxDyn(&[3, 2]), 5.0f64);
        let cfg = BatchNormConfig::default().training();
        let none = ArrayD::<f64>::zeros(IxDyn(&[2]));
        let y = batch_norm(x.view(), none.view(), none.view(), None, None, &cfg).unwrap();
        assert!(y.iter().all(|&v| v == 0.0));
    }
}
