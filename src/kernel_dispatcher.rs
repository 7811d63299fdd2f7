//! Dtype dispatcher over [`Tensor`].
//!
//! Each entry point matches on the tensor's dtype once and runs the
//! monomorphized kernel from [`crate::ops`]; the result keeps the input's
//! dtype. Kernels whose [`KernelKind::supports_out`] is set also have an
//! `_into` form that overwrites a caller-owned buffer and hands the same
//! buffer back.

use log::{debug, warn};
use ndarray::ArrayD;

use crate::error::{KernelError, Result};
use crate::kernel_types::{BatchNormConfig, KernelKind, Scalar};
use crate::ops;
use crate::tensor::Tensor;
use crate::traits::Element;
use crate::with_tensor;

// ============================================================================
// Output buffer
// ============================================================================

/// Overwrite `out` with `result`, coercing to `out`'s dtype.
///
/// The cast happens after the kernel computed `result` in its own dtype.
/// `result` is broadcast to `out`'s shape; on failure `out` is untouched.
pub fn write_into<'a>(result: &Tensor, out: &'a mut Tensor) -> Result<&'a mut Tensor> {
    let (from, to) = (result.dtype(), out.dtype());
    if from != to {
        if from.is_float() && !to.is_float() {
            warn!("output buffer narrows {from} result to {to}");
        } else {
            debug!("output buffer coerces {from} result to {to}");
        }
    }
    let src = result.cast_cow(to);
    with_tensor!(&mut *out, dst => assign(dst, &src)?);
    Ok(out)
}

/// [`write_into`] for a kernel's result, refused unless
/// [`KernelKind::supports_out`] holds for `kind`.
fn write_kernel_output<'a>(
    kind: KernelKind,
    result: &Tensor,
    out: &'a mut Tensor,
) -> Result<&'a mut Tensor> {
    if !kind.supports_out() {
        return Err(KernelError::NoOutputBuffer { kernel: kind.name() });
    }
    write_into(result, out)
}

fn assign<T: Element>(dst: &mut ArrayD<T>, src: &Tensor) -> Result<()> {
    let src = T::peek(src)
        .ok_or(KernelError::DTypeMismatch { expected: T::DTYPE, found: src.dtype() })?;
    let view = src.broadcast(dst.raw_dim()).ok_or_else(|| KernelError::Broadcast {
        lhs: src.shape().to_vec(),
        rhs: dst.shape().to_vec(),
    })?;
    dst.assign(&view);
    Ok(())
}

// ============================================================================
// Logit
// ============================================================================

/// Logit over any dtype. See [`ops::logit`].
///
/// Without `eps`, out-of-domain elements silently become NaN (they are not
/// reported as errors). A zero-dimensional input yields a zero-dimensional
/// tensor.
pub fn logit(x: &Tensor, eps: Option<f64>) -> Result<Tensor> {
    KernelKind::Logit.check_dtype(x.dtype())?;
    Ok(with_tensor!(x, a => Element::wrap(ops::logit(a.view(), eps))))
}

// ============================================================================
// Thresholded ReLU
// ============================================================================

fn thresholded_relu_typed<T: Element>(a: &ArrayD<T>, threshold: Scalar) -> Tensor {
    T::wrap(ops::thresholded_relu(a.view(), T::from_scalar(threshold)))
}

/// Thresholded ReLU. `x` and `threshold` are first promoted to a common
/// dtype (see [`crate::DType::promote_with_scalar`]); the result has that
/// dtype.
pub fn thresholded_relu(x: &Tensor, threshold: impl Into<Scalar>) -> Result<Tensor> {
    KernelKind::ThresholdedRelu.check_dtype(x.dtype())?;
    let threshold = threshold.into();
    let promoted = x.dtype().promote_with_scalar(threshold);
    let x = x.cast_cow(promoted);
    Ok(with_tensor!(x.as_ref(), a => thresholded_relu_typed(a, threshold)))
}

/// [`thresholded_relu`] written into `out`.
pub fn thresholded_relu_into<'a>(
    x: &Tensor,
    threshold: impl Into<Scalar>,
    out: &'a mut Tensor,
) -> Result<&'a mut Tensor> {
    let result = thresholded_relu(x, threshold)?;
    write_kernel_output(KernelKind::ThresholdedRelu, &result, out)
}

// ============================================================================
// ReLU6
// ============================================================================

/// ReLU6 in the input dtype.
pub fn relu6(x: &Tensor) -> Result<Tensor> {
    KernelKind::Relu6.check_dtype(x.dtype())?;
    Ok(with_tensor!(x, a => Element::wrap(ops::relu6(a.view()))))
}

/// [`relu6`] written into `out`.
pub fn relu6_into<'a>(x: &Tensor, out: &'a mut Tensor) -> Result<&'a mut Tensor> {
    let result = relu6(x)?;
    write_kernel_output(KernelKind::Relu6, &result, out)
}

// ============================================================================
// LogSigmoid
// ============================================================================

/// LogSigmoid. Bool tensors are rejected with
/// [`KernelError::UnsupportedDtype`] instead of being coerced.
pub fn logsigmoid(x: &Tensor) -> Result<Tensor> {
    KernelKind::LogSigmoid.check_dtype(x.dtype())?;
    Ok(with_tensor!(x, a => Element::wrap(ops::logsigmoid(a.view()))))
}

// ============================================================================
// SELU
// ============================================================================

/// SELU in the input dtype.
pub fn selu(x: &Tensor) -> Result<Tensor> {
    KernelKind::Selu.check_dtype(x.dtype())?;
    Ok(with_tensor!(x, a => Element::wrap(ops::selu(a.view()))))
}

/// [`selu`] written into `out`. The returned tensor is `out` itself and
/// therefore carries `out`'s dtype.
pub fn selu_into<'a>(x: &Tensor, out: &'a mut Tensor) -> Result<&'a mut Tensor> {
    let result = selu(x)?;
    write_kernel_output(KernelKind::Selu, &result, out)
}

// ============================================================================
// Batch Normalization
// ============================================================================

/// Batch normalization of `x` shaped `(N, C, *spatial)`.
///
/// Statistics and affine parameters may be any dtype; they are read as
/// `f64`. In training mode `mean` and `variance` are not read at all.
pub fn batch_norm(
    x: &Tensor,
    mean: &Tensor,
    variance: &Tensor,
    scale: Option<&Tensor>,
    offset: Option<&Tensor>,
    config: &BatchNormConfig,
) -> Result<Tensor> {
    KernelKind::BatchNorm.check_dtype(x.dtype())?;
    let (mean, variance) = if config.training {
        let empty = ArrayD::zeros(ndarray::IxDyn(&[0]));
        (empty.clone(), empty)
    } else {
        (mean.to_f64(), variance.to_f64())
    };
    let scale = scale.map(Tensor::to_f64);
    let offset = offset.map(Tensor::to_f64);
    Ok(with_tensor!(x, a => Element::wrap(ops::batch_norm(
        a.view(),
        mean.view(),
        variance.view(),
        scale.as_ref().map(|s| s.view()),
        offset.as_ref().map(|o| o.view()),
        config,
    )?)))
}
