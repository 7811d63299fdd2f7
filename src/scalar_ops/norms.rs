//! Scalar normalization functions.

/// Batch-norm affine factoring for one channel.
///
/// ```text
/// inv  = 1 / sqrt(variance + eps)  [* scale]
/// bias = offset - mean * inv       (or -mean * inv without offset)
/// ```
///
/// so that `y = x * inv + bias`.
#[inline(always)]
pub fn batch_norm_affine(
    mean: f64,
    variance: f64,
    scale: Option<f64>,
    offset: Option<f64>,
    eps: f64,
) -> (f64, f64) {
    let mut inv = 1.0 / (variance + eps).sqrt();
    if let Some(scale) = scale {
        inv *= scale;
    }
    let bias = match offset {
        Some(offset) => offset - mean * inv,
        None => -(mean * inv),
    };
    (inv, bias)
}

/// Welford's online algorithm for computing mean and population variance.
///
/// Numerically stable single-pass algorithm. Returns `(0, 0)` for an empty
/// input.
#[inline(always)]
pub fn welford_mean_var<I>(data: I) -> (f64, f64)
where
    I: IntoIterator<Item = f64>,
{
    let mut mean = 0.0f64;
    let mut m2 = 0.0f64;
    let mut n = 0usize;

    for x in data {
        n += 1;
        let delta = x - mean;
        mean += delta / n as f64;
        let delta2 = x - mean;
        m2 += delta * delta2;
    }

    if n == 0 {
        return (0.0, 0.0);
    }
    (mean, m2 / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_welford_matches_two_pass() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let (mean, var) = welford_mean_var(data.iter().copied());
        assert!((mean - 5.0).abs() < EPS);
        assert!((var - 4.0).abs() < EPS);
    }

    #[test]
    fn test_welford_empty() {
        assert_eq!(welford_mean_var(std::iter::empty()), (0.0, 0.0));
    }

    #[test]
    fn test_affine_without_params_standardizes() {
        let (inv, bias) = batch_norm_affine(3.0, 4.0, None, None, 0.0);
        assert!((inv - 0.5).abs() < EPS);
        assert!((bias + 1.5).abs() < EPS);
        // (7 - 3) / 2 = 2
        assert!((7.0 * inv + bias - 2.0).abs() < EPS);
    }

    #[test]
    fn test_affine_with_scale_and_offset() {
        let (inv, bias) = batch_norm_affine(1.0, 0.0, Some(2.0), Some(10.0), 0.25);
        // inv = 2 / sqrt(0.25) = 4
        assert!((inv - 4.0).abs() < EPS);
        assert!((bias - 6.0).abs() < EPS);
    }

    #[test]
    fn test_eps_guards_zero_variance() {
        let (inv, bias) = batch_norm_affine(0.0, 0.0, None, None, 1e-5);
        assert!(inv.is_finite());
        assert!(bias.is_finite());
    }
}
