//! Scalar reference formulas, evaluated in `f64`.
//!
//! These serve as:
//! 1. The per-element math behind the typed kernels in [`crate::ops`].
//! 2. Golden references for correctness testing.
//!
//! Narrowing to the caller's dtype happens once, outside this module.

pub mod activations;
pub mod norms;

pub use activations::{
    logit_clamped_scalar, logit_scalar, logsigmoid_scalar, selu_scalar, SELU_ALPHA, SELU_SCALE,
};
pub use norms::{batch_norm_affine, welford_mean_var};
