//! Dtype-preserving activation functions.
//!
//! Elementwise activations over n-dimensional arrays of any [`Element`].
//!
//! # Supported Activations
//!
//! - **Logit**: `log(x / (1 - x))`, optionally clamped to `[eps, 1 - eps]`
//! - **Thresholded ReLU**: `x if x > threshold else 0`
//! - **ReLU6**: `min(max(x, 0), 6)`
//! - **LogSigmoid**: `-log(1 + exp(-x))`
//! - **SELU**: scaled exponential-linear unit
//!
//! # Design
//!
//! All functions have both in-place and out-of-place variants. The output
//! always has the input's shape and dtype. Logit, LogSigmoid and SELU run
//! their formula in `f64` (see [`crate::scalar_ops`]) and narrow once per
//! element; the ReLU family compares directly in the element type so no
//! value is ever widened.

use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD};

use super::{map_elements, map_elements_inplace};
use crate::scalar_ops::{logit_clamped_scalar, logit_scalar, logsigmoid_scalar, selu_scalar};
use crate::traits::Element;

// ============================================================================
// Logit: log(x / (1 - x))
// ============================================================================

/// Logit: `output = log(x / (1 - x))`.
///
/// Without `eps`, elements outside `[0, 1]` become NaN rather than raising.
/// With `eps`, elements are first clamped into `[eps, 1 - eps]`, which keeps
/// every non-NaN output finite for `eps > 0`.
#[inline]
pub fn logit<T: Element>(x: ArrayViewD<'_, T>, eps: Option<f64>) -> ArrayD<T> {
    match eps {
        None => map_elements(x, |v: T| T::from_f64(logit_scalar(v.to_f64()))),
        Some(eps) => map_elements(x, move |v: T| T::from_f64(logit_clamped_scalar(v.to_f64(), eps))),
    }
}

/// Logit in-place.
#[inline]
pub fn logit_inplace<T: Element>(x: ArrayViewMutD<'_, T>, eps: Option<f64>) {
    match eps {
        None => map_elements_inplace(x, |v: T| T::from_f64(logit_scalar(v.to_f64()))),
        Some(eps) => {
            map_elements_inplace(x, move |v: T| T::from_f64(logit_clamped_scalar(v.to_f64(), eps)))
        }
    }
}

// ============================================================================
// Thresholded ReLU: x if x > threshold else 0
// ============================================================================

/// Thresholded ReLU: `output = x if x > threshold else 0`.
///
/// A `threshold` of zero is the standard ReLU. NaN never passes the
/// comparison and maps to zero.
#[inline]
pub fn thresholded_relu<T: Element>(x: ArrayViewD<'_, T>, threshold: T) -> ArrayD<T> {
    map_elements(x, move |v: T| if v > threshold { v } else { T::ZERO })
}

/// Thresholded ReLU in-place.
#[inline]
pub fn thresholded_relu_inplace<T: Element>(x: ArrayViewMutD<'_, T>, threshold: T) {
    map_elements_inplace(x, move |v: T| if v > threshold { v } else { T::ZERO })
}

// ============================================================================
// ReLU6: min(max(x, 0), 6)
// ============================================================================

#[inline(always)]
fn relu6_elem<T: Element>(v: T, six: T) -> T {
    // NaN fails both comparisons and propagates.
    let v = if v < T::ZERO { T::ZERO } else { v };
    if v > six { six } else { v }
}

/// ReLU6: `output = min(max(x, 0), 6)`, both steps in the element type.
#[inline]
pub fn relu6<T: Element>(x: ArrayViewD<'_, T>) -> ArrayD<T> {
    let six = T::from_f64(6.0);
    map_elements(x, move |v: T| relu6_elem(v, six))
}

/// ReLU6 in-place.
#[inline]
pub fn relu6_inplace<T: Element>(x: ArrayViewMutD<'_, T>) {
    let six = T::from_f64(6.0);
    map_elements_inplace(x, move |v: T| relu6_elem(v, six))
}

// ============================================================================
// LogSigmoid: -log(1 + exp(-x))
// ============================================================================

/// LogSigmoid: `output = -log1p(exp(-x))` in its overflow-free form.
///
/// Bool input is rejected one level up, by
/// [`crate::kernel_dispatcher::logsigmoid`].
#[inline]
pub fn logsigmoid<T: Element>(x: ArrayViewD<'_, T>) -> ArrayD<T> {
    map_elements(x, |v: T| T::from_f64(logsigmoid_scalar(v.to_f64())))
}

/// LogSigmoid in-place.
#[inline]
pub fn logsigmoid_inplace<T: Element>(x: ArrayViewMutD<'_, T>) {
    map_elements_inplace(x, |v: T| T::from_f64(logsigmoid_scalar(v.to_f64())))
}

// ============================================================================
// SELU: scale * (x if x > 0 else alpha * expm1(x))
// ============================================================================

/// SELU activation using [`SELU_ALPHA`](crate::scalar_ops::SELU_ALPHA) and
/// [`SELU_SCALE`](crate::scalar_ops::SELU_SCALE).
#[inline]
pub fn selu<T: Element>(x: ArrayViewD<'_, T>) -> ArrayD<T> {
    map_elements(x, |v: T| T::from_f64(selu_scalar(v.to_f64())))
}

/// SELU in-place.
#[inline]
pub fn selu_inplace<T: Element>(x: ArrayViewMutD<'_, T>) {
    map_elements_inplace(x, |v: T| T::from_f64(selu_scalar(v.to_f64())))
}
