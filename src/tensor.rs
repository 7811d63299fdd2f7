//! Dynamic-dtype array value and the broadcasting helpers shared by kernels.

use std::borrow::Cow;

use half::{bf16, f16};
use ndarray::{ArrayD, ArrayViewD, IxDyn};

use crate::error::{KernelError, Result};
use crate::kernel_types::DType;
use crate::traits::Element;

/// Runs `$body` with `$arr` bound to the typed array inside `$tensor`.
///
/// The body is expanded once per variant, so it may call generic functions
/// whose element type is inferred from `$arr`.
#[macro_export]
macro_rules! with_tensor {
    ($tensor:expr, $arr:ident => $body:expr) => {
        match $tensor {
            $crate::Tensor::Bool($arr) => $body,
            $crate::Tensor::I32($arr) => $body,
            $crate::Tensor::I64($arr) => $body,
            $crate::Tensor::F16($arr) => $body,
            $crate::Tensor::BF16($arr) => $body,
            $crate::Tensor::F32($arr) => $body,
            $crate::Tensor::F64($arr) => $body,
        }
    };
}

/// An owned n-dimensional array tagged with its element dtype.
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    Bool(ArrayD<bool>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    F16(ArrayD<f16>),
    BF16(ArrayD<bf16>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

impl Tensor {
    pub fn from_array<T: Element>(a: ArrayD<T>) -> Self {
        T::wrap(a)
    }

    /// Build from a flat row-major buffer.
    pub fn from_shape_vec<T: Element>(shape: &[usize], data: Vec<T>) -> Result<Self> {
        Ok(T::wrap(ArrayD::from_shape_vec(IxDyn(shape), data)?))
    }

    /// Zero-dimensional tensor holding `v`.
    pub fn scalar<T: Element>(v: T) -> Self {
        T::wrap(ArrayD::from_elem(IxDyn(&[]), v))
    }

    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        match dtype {
            DType::Bool => Tensor::Bool(ArrayD::from_elem(IxDyn(shape), false)),
            DType::I32 => Tensor::I32(ArrayD::zeros(IxDyn(shape))),
            DType::I64 => Tensor::I64(ArrayD::zeros(IxDyn(shape))),
            DType::F16 => Tensor::F16(ArrayD::from_elem(IxDyn(shape), f16::ZERO)),
            DType::BF16 => Tensor::BF16(ArrayD::from_elem(IxDyn(shape), bf16::ZERO)),
            DType::F32 => Tensor::F32(ArrayD::zeros(IxDyn(shape))),
            DType::F64 => Tensor::F64(ArrayD::zeros(IxDyn(shape))),
        }
    }

    pub fn dtype(&self) -> DType {
        match self {
            Tensor::Bool(_) => DType::Bool,
            Tensor::I32(_) => DType::I32,
            Tensor::I64(_) => DType::I64,
            Tensor::F16(_) => DType::F16,
            Tensor::BF16(_) => DType::BF16,
            Tensor::F32(_) => DType::F32,
            Tensor::F64(_) => DType::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_tensor!(self, a => a.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn len(&self) -> usize {
        with_tensor!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_array<T: Element>(&self) -> Option<&ArrayD<T>> {
        T::peek(self)
    }

    pub fn as_array_mut<T: Element>(&mut self) -> Option<&mut ArrayD<T>> {
        T::peek_mut(self)
    }

    /// Take the typed array out, failing if the dtype differs.
    pub fn into_array<T: Element>(mut self) -> Result<ArrayD<T>> {
        let found = self.dtype();
        T::peek_mut(&mut self)
            .map(std::mem::take)
            .ok_or(KernelError::DTypeMismatch { expected: T::DTYPE, found })
    }

    /// Element-wise cast to `U`, rounding through `f64`.
    ///
    /// `i64` magnitudes above 2^53 are rounded by that step; kernels that
    /// must stay exact on integers use [`Element::from_i64`] and
    /// [`Element::affine`] instead.
    pub fn cast_to<U: Element>(&self) -> ArrayD<U> {
        if let Some(a) = U::peek(self) {
            return a.clone();
        }
        with_tensor!(self, a => a.mapv(|v| U::from_f64(v.to_f64())))
    }

    pub fn cast(&self, dtype: DType) -> Tensor {
        self.cast_cow(dtype).into_owned()
    }

    /// Borrow when already `dtype`, otherwise cast into a new tensor.
    pub fn cast_cow(&self, dtype: DType) -> Cow<'_, Tensor> {
        if self.dtype() == dtype {
            return Cow::Borrowed(self);
        }
        Cow::Owned(match dtype {
            DType::Bool => Tensor::Bool(self.cast_to()),
            DType::I32 => Tensor::I32(self.cast_to()),
            DType::I64 => Tensor::I64(self.cast_to()),
            DType::F16 => Tensor::F16(self.cast_to()),
            DType::BF16 => Tensor::BF16(self.cast_to()),
            DType::F32 => Tensor::F32(self.cast_to()),
            DType::F64 => Tensor::F64(self.cast_to()),
        })
    }

    pub fn to_f64(&self) -> ArrayD<f64> {
        self.cast_to()
    }
}

impl<T: Element> From<ArrayD<T>> for Tensor {
    fn from(a: ArrayD<T>) -> Self {
        T::wrap(a)
    }
}

/// Result shape of broadcasting `lhs` against `rhs` (trailing-axis rule).
pub fn broadcast_shape(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>> {
    let nd = lhs.len().max(rhs.len());
    let mut out = vec![1usize; nd];
    for i in 0..nd {
        let a = if i < lhs.len() { lhs[lhs.len() - 1 - i] } else { 1 };
        let b = if i < rhs.len() { rhs[rhs.len() - 1 - i] } else { 1 };
        out[nd - 1 - i] = match (a, b) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => {
                return Err(KernelError::Broadcast { lhs: lhs.to_vec(), rhs: rhs.to_vec() });
            }
        };
    }
    Ok(out)
}

/// View `a` at `shape`, or report the pair as a broadcast error.
pub fn broadcast_to<'a, T>(a: &'a ArrayViewD<'_, T>, shape: &[usize]) -> Result<ArrayViewD<'a, T>> {
    a.broadcast(IxDyn(shape))
        .ok_or_else(|| KernelError::Broadcast { lhs: a.shape().to_vec(), rhs: shape.to_vec() })
}
