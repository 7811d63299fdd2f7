use thiserror::Error;

use crate::kernel_types::DType;

pub type Result<T> = std::result::Result<T, KernelError>;

/// Errors raised by the kernels.
///
/// Domain violations (e.g. `logit` outside `[0, 1]`) are not errors; they
/// produce NaN elements.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("{kernel}: unsupported dtype {dtype}")]
    UnsupportedDtype { kernel: &'static str, dtype: DType },

    #[error("{kernel}: no output-buffer variant")]
    NoOutputBuffer { kernel: &'static str },

    #[error("operands could not be broadcast together with shapes {lhs:?} and {rhs:?}")]
    Broadcast { lhs: Vec<usize>, rhs: Vec<usize> },

    #[error("shape error: {0}")]
    Shape(String),

    #[error("dtype mismatch: expected {expected}, found {found}")]
    DTypeMismatch { expected: DType, found: DType },

    #[error(transparent)]
    Layout(#[from] ndarray::ShapeError),
}

pub(crate) fn shape(msg: impl Into<String>) -> KernelError {
    KernelError::Shape(msg.into())
}
