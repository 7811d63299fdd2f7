//! Typed kernels over `ndarray` views.
//!
//! Every kernel has an out-of-place form returning a fresh `ArrayD<T>` and,
//! for the elementwise activations, an in-place form over `ArrayViewMutD<T>`.

pub mod activations;
pub mod batch_norm;

use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD};

use crate::traits::Element;

pub use activations::{
    logit, logit_inplace, logsigmoid, logsigmoid_inplace, relu6, relu6_inplace, selu,
    selu_inplace, thresholded_relu, thresholded_relu_inplace,
};
pub use batch_norm::{batch_norm, batch_norm_stats};

/// Element count above which maps go through rayon (feature `parallel`).
pub const PARALLEL_THRESHOLD: usize = 1 << 16;

#[inline]
pub(crate) fn map_elements<T, U, F>(x: ArrayViewD<'_, T>, f: F) -> ArrayD<U>
where
    T: Element,
    U: Element,
    F: Fn(T) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    if x.len() >= PARALLEL_THRESHOLD && rayon::current_num_threads() > 1 {
        return ndarray::Zip::from(&x).par_map_collect(|&v| f(v));
    }
    x.map(|&v| f(v))
}

#[inline]
pub(crate) fn map_elements_inplace<T, F>(mut x: ArrayViewMutD<'_, T>, f: F)
where
    T: Element,
    F: Fn(T) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    if x.len() >= PARALLEL_THRESHOLD && rayon::current_num_threads() > 1 {
        x.par_mapv_inplace(f);
        return;
    }
    x.mapv_inplace(f);
}
