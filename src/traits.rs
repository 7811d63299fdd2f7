use std::fmt::Debug;
use half::{bf16, f16};
use ndarray::ArrayD;

use crate::kernel_types::{DType, Scalar};
use crate::tensor::Tensor;

/// Core element trait for the kernels.
///
/// Every element round-trips through `f64`, which is the internal working
/// precision of all numerically sensitive formulas. `from_f64` follows
/// array-cast semantics: floats round to nearest, integers truncate toward
/// zero and saturate (NaN becomes 0), and bools test `!= 0`.
///
/// Integer operands never take the `f64` path: `from_i64` and `affine`
/// stay exact for `i64` beyond 2^53.
pub trait Element: Debug + Clone + Copy + Send + Sync + Default + PartialOrd + 'static {
    const ZERO: Self;
    const DTYPE: DType;

    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;

    /// Integer conversion; saturates for `i32`, exact for `i64`.
    fn from_i64(v: i64) -> Self;

    /// Narrow a scalar operand to this element type.
    #[inline]
    fn from_scalar(s: Scalar) -> Self {
        match s {
            Scalar::Bool(b) => Self::from_i64(b as i64),
            Scalar::Int(i) => Self::from_i64(i),
            Scalar::Float(v) => Self::from_f64(v),
        }
    }

    /// `self * inv + bias`, rounding to `Self` after each operation.
    #[inline(always)]
    fn affine(self, inv: Self, bias: Self) -> Self {
        let prod = Self::from_f64(self.to_f64() * inv.to_f64());
        Self::from_f64(prod.to_f64() + bias.to_f64())
    }

    /// Move a typed array into the matching `Tensor` variant.
    fn wrap(a: ArrayD<Self>) -> Tensor;

    /// Borrow the typed array if `t` holds this element type.
    fn peek(t: &Tensor) -> Option<&ArrayD<Self>>;

    /// Mutable counterpart of [`Element::peek`].
    fn peek_mut(t: &mut Tensor) -> Option<&mut ArrayD<Self>>;
}

macro_rules! impl_element {
    (
        $ty:ty, $variant:ident, $zero:expr,
        |$v:ident| $from:expr,
        |$s:ident| $to:expr,
        |$n:ident| $from_int:expr
        $(, affine |$x:ident, $i:ident, $b:ident| $affine:expr)?
    ) => {
        impl Element for $ty {
            const ZERO: Self = $zero;
            const DTYPE: DType = DType::$variant;

            #[inline(always)]
            fn from_f64($v: f64) -> Self { $from }
            #[inline(always)]
            fn to_f64(self) -> f64 { let $s = self; $to }
            #[inline(always)]
            fn from_i64($n: i64) -> Self { $from_int }
            $(
                #[inline(always)]
                fn affine(self, $i: Self, $b: Self) -> Self { let $x = self; $affine }
            )?

            #[inline(always)]
            fn wrap(a: ArrayD<Self>) -> Tensor { Tensor::$variant(a) }
            #[inline(always)]
            fn peek(t: &Tensor) -> Option<&ArrayD<Self>> {
                match t { Tensor::$variant(a) => Some(a), _ => None }
            }
            #[inline(always)]
            fn peek_mut(t: &mut Tensor) -> Option<&mut ArrayD<Self>> {
                match t { Tensor::$variant(a) => Some(a), _ => None }
            }
        }
    };
}

impl_element!(bool, Bool, false, |v| v != 0.0, |s| if s { 1.0 } else { 0.0 }, |n| n != 0);
impl_element!(
    i32, I32, 0,
    |v| v as i32,
    |s| s as f64,
    |n| n.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
    affine |x, inv, bias| x.saturating_mul(inv).saturating_add(bias)
);
impl_element!(
    i64, I64, 0,
    |v| v as i64,
    |s| s as f64,
    |n| n,
    affine |x, inv, bias| x.saturating_mul(inv).saturating_add(bias)
);
impl_element!(f16, F16, f16::ZERO, |v| f16::from_f64(v), |s| s.to_f64(), |n| f16::from_f64(n as f64));
impl_element!(bf16, BF16, bf16::ZERO, |v| bf16::from_f64(v), |s| s.to_f64(), |n| bf16::from_f64(n as f64));
impl_element!(f32, F32, 0.0, |v| v as f32, |s| s as f64, |n| n as f32);
impl_element!(f64, F64, 0.0, |v| v, |s| s, |n| n as f64);
