//! Dtypes, scalar operands and per-kernel configuration.

use std::fmt;

use crate::error::{KernelError, Result};

/// Element dtype of a [`Tensor`](crate::Tensor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Bool,
    I32,
    I64,
    F16,
    BF16,
    F32,
    F64,
}

impl DType {
    /// Float dtype an integer or bool array is promoted to by a float scalar.
    pub const DEFAULT_FLOAT: DType = DType::F32;
    /// Integer dtype a bool array is promoted to by an integer scalar.
    pub const DEFAULT_INT: DType = DType::I64;

    pub const fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::I32 => "int32",
            DType::I64 => "int64",
            DType::F16 => "float16",
            DType::BF16 => "bfloat16",
            DType::F32 => "float32",
            DType::F64 => "float64",
        }
    }

    pub const fn is_float(self) -> bool {
        matches!(self, DType::F16 | DType::BF16 | DType::F32 | DType::F64)
    }

    pub const fn size_in_bytes(self) -> usize {
        match self {
            DType::Bool => 1,
            DType::F16 | DType::BF16 => 2,
            DType::I32 | DType::F32 => 4,
            DType::I64 | DType::F64 => 8,
        }
    }

    /// Result dtype of an array of `self` combined with a scalar operand.
    ///
    /// Scalars are weakly typed: they never widen an array of their own kind.
    /// Only a kind change (bool -> int, int/bool -> float) moves the dtype,
    /// and then to the default dtype of the new kind.
    pub fn promote_with_scalar(self, scalar: Scalar) -> DType {
        match (self, scalar) {
            (dt, _) if dt.is_float() => dt,
            (_, Scalar::Float(_)) => DType::DEFAULT_FLOAT,
            (DType::Bool, Scalar::Int(_)) => DType::DEFAULT_INT,
            (dt, _) => dt,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single numeric operand such as a threshold or clip bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Scalar {
    #[inline(always)]
    pub fn to_f64(self) -> f64 {
        match self {
            Scalar::Bool(b) => if b { 1.0 } else { 0.0 },
            Scalar::Int(i) => i as f64,
            Scalar::Float(v) => v,
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Int(0)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self { Scalar::Bool(v) }
}
impl From<i32> for Scalar {
    fn from(v: i32) -> Self { Scalar::Int(v as i64) }
}
impl From<i64> for Scalar {
    fn from(v: i64) -> Self { Scalar::Int(v) }
}
impl From<f32> for Scalar {
    fn from(v: f32) -> Self { Scalar::Float(v as f64) }
}
impl From<f64> for Scalar {
    fn from(v: f64) -> Self { Scalar::Float(v) }
}

/// Kernel identity, used for dtype gating and output-buffer capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    Logit,
    ThresholdedRelu,
    Relu6,
    BatchNorm,
    LogSigmoid,
    Selu,
}

impl KernelKind {
    pub const ALL: [KernelKind; 6] = [
        KernelKind::Logit,
        KernelKind::ThresholdedRelu,
        KernelKind::Relu6,
        KernelKind::BatchNorm,
        KernelKind::LogSigmoid,
        KernelKind::Selu,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            KernelKind::Logit => "logit",
            KernelKind::ThresholdedRelu => "thresholded_relu",
            KernelKind::Relu6 => "relu6",
            KernelKind::BatchNorm => "batch_norm",
            KernelKind::LogSigmoid => "logsigmoid",
            KernelKind::Selu => "selu",
        }
    }

    /// Whether the kernel can write through a caller-supplied output buffer.
    pub const fn supports_out(self) -> bool {
        matches!(self, KernelKind::ThresholdedRelu | KernelKind::Relu6 | KernelKind::Selu)
    }

    /// Input dtypes the kernel rejects instead of coercing.
    pub const fn unsupported_dtypes(self) -> &'static [DType] {
        match self {
            KernelKind::LogSigmoid => &[DType::Bool],
            _ => &[],
        }
    }

    pub fn check_dtype(self, dtype: DType) -> Result<()> {
        if self.unsupported_dtypes().contains(&dtype) {
            return Err(KernelError::UnsupportedDtype { kernel: self.name(), dtype });
        }
        Ok(())
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for batch normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchNormConfig {
    /// Recompute mean/variance from the current batch instead of using the
    /// supplied running statistics.
    pub training: bool,
    /// Added to the variance before the square root.
    pub eps: f64,
}

impl Default for BatchNormConfig {
    fn default() -> Self {
        Self { training: false, eps: 1e-5 }
    }
}

impl BatchNormConfig {
    /// Use current-batch statistics.
    #[must_use]
    pub fn training(mut self) -> Self {
        self.training = true;
        self
    }

    #[must_use]
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }
}
