//! ndact-kernels: dtype-preserving activation and normalization kernels.
//!
//! This crate provides elementwise activations and batch normalization over
//! n-dimensional `ndarray` arrays with:
//! - **Dtype Preservation**: output dtype equals input dtype (or the output
//!   buffer's dtype) for bool, int32, int64, float16, bfloat16, float32, float64
//! - **Wide Internal Precision**: sensitive formulas (`log1p`, `expm1`, `log`)
//!   run in `f64` and narrow once per element
//! - **Total Kernels**: out-of-domain `logit` inputs yield NaN, not errors
//! - **Output Buffers**: `_into` variants overwrite a caller-owned tensor and
//!   return it
//!
//! # Quick Start
//!
//! ```
//! use ndact_kernels::{selu, batch_norm, BatchNormConfig, Tensor};
//! use ndarray::{arr1, ArrayD, IxDyn};
//!
//! let x = Tensor::from(arr1(&[-1.0f32, 0.0, 2.0]).into_dyn());
//! let y = selu(&x).unwrap();
//! assert_eq!(y.dtype(), x.dtype());
//!
//! let x = Tensor::from(ArrayD::from_elem(IxDyn(&[2, 3, 4]), 1.0f64));
//! let stats = Tensor::from(arr1(&[0.0f64, 0.0, 0.0]).into_dyn());
//! let ones = Tensor::from(arr1(&[1.0f64, 1.0, 1.0]).into_dyn());
//! let y = batch_norm(&x, &stats, &ones, None, None, &BatchNormConfig::default()).unwrap();
//! assert_eq!(y.shape(), &[2, 3, 4]);
//! ```

pub mod error;
pub mod kernel_dispatcher;
pub mod kernel_types;
pub mod ops;
pub mod scalar_ops;
pub mod tensor;
pub mod traits;

pub use error::{KernelError, Result};
pub use kernel_types::{BatchNormConfig, DType, KernelKind, Scalar};
pub use tensor::Tensor;
pub use traits::Element;

// Dynamic-dtype kernel exports
pub use kernel_dispatcher::{
    // Logit
    logit,
    // Thresholded ReLU
    thresholded_relu, thresholded_relu_into,
    // ReLU6
    relu6, relu6_into,
    // LogSigmoid
    logsigmoid,
    // SELU
    selu, selu_into,
    // Batch Normalization
    batch_norm,
    // Output buffers
    write_into,
};

// Scalar reference exports
pub use scalar_ops::{SELU_ALPHA, SELU_SCALE};
