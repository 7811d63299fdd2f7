//! Scalar activation functions.

/// SELU `alpha`. Part of the kernel interface; do not truncate.
#[allow(clippy::excessive_precision)]
pub const SELU_ALPHA: f64 = 1.6732632423543772848170429916717;

/// SELU `scale`. Part of the kernel interface; do not truncate.
#[allow(clippy::excessive_precision)]
pub const SELU_SCALE: f64 = 1.0507009873554804934193349852946;

/// Logit: `log(v / (1 - v))`, NaN outside `[0, 1]`.
///
/// The boundaries themselves are left to the formula: `0 -> -inf`, `1 -> +inf`.
#[inline(always)]
pub fn logit_scalar(v: f64) -> f64 {
    if v > 1.0 || v < 0.0 {
        return f64::NAN;
    }
    (v / (1.0 - v)).ln()
}

/// Logit after clamping into `[eps, 1 - eps]`.
///
/// NaN passes through the clamp unchanged.
#[inline(always)]
pub fn logit_clamped_scalar(v: f64, eps: f64) -> f64 {
    let v = if v.is_nan() { v } else { v.max(eps).min(1.0 - eps) };
    (v / (1.0 - v)).ln()
}

/// Log-sigmoid: `-log(1 + exp(-v))` via `log1p`.
///
/// Negative inputs are rewritten as `v - log1p(exp(v))` so `exp` never
/// overflows.
#[inline(always)]
pub fn logsigmoid_scalar(v: f64) -> f64 {
    if v >= 0.0 {
        -(-v).exp().ln_1p()
    } else {
        v - v.exp().ln_1p()
    }
}

/// SELU: `scale * v` for `v > 0`, else `scale * alpha * expm1(v)`.
#[inline(always)]
pub fn selu_scalar(v: f64) -> f64 {
    if v > 0.0 {
        SELU_SCALE * v
    } else {
        SELU_SCALE * (SELU_ALPHA * v.exp_m1())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_selu_constants_precision() {
        assert_eq!(SELU_ALPHA.to_bits(), 1.6732632423543772_f64.to_bits());
        assert_eq!(SELU_SCALE.to_bits(), 1.0507009873554805_f64.to_bits());
    }

    #[test]
    fn test_logit_domain() {
        assert!(logit_scalar(-0.1).is_nan());
        assert!(logit_scalar(1.1).is_nan());
        assert!(logit_scalar(f64::NAN).is_nan());
        assert_eq!(logit_scalar(0.0), f64::NEG_INFINITY);
        assert_eq!(logit_scalar(1.0), f64::INFINITY);
        assert!(logit_scalar(0.5).abs() < EPS);
    }

    #[test]
    fn test_logit_clamped_is_finite() {
        for v in [-5.0, 0.0, 1e-300, 0.5, 1.0, 7.0, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(logit_clamped_scalar(v, 1e-6).is_finite(), "v = {v}");
        }
        assert!(logit_clamped_scalar(f64::NAN, 1e-6).is_nan());
        let hi = logit_clamped_scalar(2.0, 0.25);
        assert!((hi - 3.0_f64.ln()).abs() < EPS);
    }

    #[test]
    fn test_logsigmoid_numerical_stability() {
        assert!((logsigmoid_scalar(0.0) + 2.0_f64.ln()).abs() < EPS);
        // Large negative inputs approach the identity instead of -inf.
        assert!((logsigmoid_scalar(-1000.0) + 1000.0).abs() < EPS);
        assert!(logsigmoid_scalar(1000.0).abs() < EPS);
        assert!(logsigmoid_scalar(40.0) < 0.0);
        assert!(logsigmoid_scalar(f64::NAN).is_nan());
    }

    #[test]
    fn test_selu_branches() {
        assert_eq!(selu_scalar(0.0), 0.0);
        assert!((selu_scalar(2.0) - 2.0 * SELU_SCALE).abs() < EPS);
        let expected = SELU_SCALE * SELU_ALPHA * ((-1.0_f64).exp() - 1.0);
        assert!((selu_scalar(-1.0) - expected).abs() < EPS);
        // expm1 keeps full relative precision near zero.
        let tiny = -1e-12;
        let rel = (selu_scalar(tiny) - SELU_SCALE * SELU_ALPHA * tiny) / (SELU_SCALE * SELU_ALPHA * tiny);
        assert!(rel.abs() < 1e-9);
        assert!((selu_scalar(f64::NEG_INFINITY) + SELU_SCALE * SELU_ALPHA).abs() < EPS);
    }
}
