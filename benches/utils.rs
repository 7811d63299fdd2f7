#![allow(dead_code)]

use ndarray::{ArrayD, IxDyn};
use rand::Rng;

/// Elementwise read + write bytes for `n` elements of `elem_bytes` each.
pub fn elementwise_rw_bytes(n: usize, elem_bytes: usize) -> u64 {
    2 * n as u64 * elem_bytes as u64
}

/// Random values in `[lo, hi)` shaped `shape`.
pub fn random_array(shape: &[usize], lo: f64, hi: f64) -> ArrayD<f64> {
    let mut rng = rand::thread_rng();
    let n: usize = shape.iter().product();
    let data = (0..n).map(|_| rng.gen_range(lo..hi)).collect();
    ArrayD::from_shape_vec(IxDyn(shape), data).expect("shape matches element count")
}

/// Random values in `[lo, hi)`, one per channel.
pub fn random_channels(c: usize, lo: f64, hi: f64) -> ArrayD<f64> {
    random_array(&[c], lo, hi)
}
