//! Statistical validation — fold-level OOS results to significance conclusions.
//!
//! Implements from first principles:
//! - ln(Gamma) via the Numerical-Recipes 6-coefficient Lanczos series
//! - Regularized incomplete beta via continued fraction
//! - Student's t two-sided p-value, complementary error function
//! - Consistency ratio and WFA efficiency
//!
//! Statistical caveat: a handful of fold-level pnl values rarely satisfies
//! the normality and independence assumptions behind the test. Treat the
//! p-value as a calibrated screening score, and always read it next to the
//! valid/failed fold counts the report carries.

use serde::{Deserialize, Serialize};

/// Sample-size threshold above which the normal approximation replaces the
/// t distribution.
pub const NORMAL_APPROX_MIN_N: usize = 30;

// ─── Math primitives ─────────────────────────────────────────────────

/// ln(Gamma(x)) for x > 0, 6-coefficient Lanczos series.
fn ln_gamma(x: f64) -> f64 {
    const COF: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.120_865_097_386_617_9e-2,
        -0.539_523_938_495_3e-5,
    ];

    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut ser = 1.000_000_000_190_015;
    let mut y = x;
    for c in COF {
        y += 1.0;
        ser += c / y;
    }
    -tmp + (2.506_628_274_631_000_5 * ser / x).ln()
}

/// Continued fraction for the incomplete beta function (modified Lentz).
fn beta_cf(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 200;
    const EPS: f64 = 1e-14;
    const TINY: f64 = 1e-30;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Regularized incomplete beta I_x(a, b).
pub fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_bt = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let bt = ln_bt.exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        bt * beta_cf(a, b, x) / a
    } else {
        1.0 - bt * beta_cf(b, a, 1.0 - x) / b
    }
}

/// Complementary error function, rational Chebyshev approximation
/// (fractional error < 1.2e-7 everywhere).
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let ans = t
        * (-z * z - 1.26551223
            + t * (1.00002368
                + t * (0.37409196
                    + t * (0.09678418
                        + t * (-0.18628806
                            + t * (0.27886807
                                + t * (-1.13520398
                                    + t * (1.48851587
                                        + t * (-0.82215223 + t * 0.17087277)))))))))
            .exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

/// Two-sided p-value for a t statistic with `df` degrees of freedom:
/// P(|T| >= |t|) = I_{df/(df+t²)}(df/2, 1/2).
pub fn t_two_sided_p(t: f64, df: f64) -> f64 {
    if df <= 0.0 {
        return f64::NAN;
    }
    incomplete_beta(df / 2.0, 0.5, df / (df + t * t))
}

/// Two-sided p-value under the standard normal: P(|Z| >= |z|).
pub fn normal_two_sided_p(z: f64) -> f64 {
    erfc(z.abs() / std::f64::consts::SQRT_2)
}

// ─── One-sample test ─────────────────────────────────────────────────

/// How the p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestMethod {
    /// Student's t distribution (n below `NORMAL_APPROX_MIN_N`).
    StudentT,
    /// Normal approximation (n at or above `NORMAL_APPROX_MIN_N`).
    NormalApprox,
    /// Fewer than 2 samples — p fixed at 1.0, no significance claim.
    Underpowered,
    /// Zero sample variance — sentinel t and p (see `two_sided_mean_test`).
    ZeroVariance,
}

/// Result of the two-sided one-sample mean test (H0: mean = 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanTest {
    pub n: usize,
    pub mean: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub method: TestMethod,
}

/// Two-sided one-sample test of whether the mean differs from zero.
///
/// - n < 2 → p = 1.0 (`Underpowered`): no claim is ever made from a
///   single observation.
/// - zero variance → documented sentinel: identical nonzero values give
///   t = ±∞ and p = 0.0; identical zeros give t = 0 and p = 1.0.
/// - otherwise t = mean / (std / √n); Student's t for small n, normal
///   approximation from `NORMAL_APPROX_MIN_N` up.
pub fn two_sided_mean_test(values: &[f64]) -> MeanTest {
    let n = values.len();
    if n < 2 {
        let mean = if n == 1 { values[0] } else { 0.0 };
        return MeanTest {
            n,
            mean,
            t_statistic: 0.0,
            p_value: 1.0,
            method: TestMethod::Underpowered,
        };
    }

    let n_f = n as f64;
    let mean = values.iter().sum::<f64>() / n_f;
    let variance = values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (n_f - 1.0);
    let std_err = (variance / n_f).sqrt();

    if std_err < 1e-15 {
        let (t, p) = if mean.abs() > 1e-15 {
            (mean.signum() * f64::INFINITY, 0.0)
        } else {
            (0.0, 1.0)
        };
        return MeanTest {
            n,
            mean,
            t_statistic: t,
            p_value: p,
            method: TestMethod::ZeroVariance,
        };
    }

    let t = mean / std_err;
    let (p, method) = if n >= NORMAL_APPROX_MIN_N {
        (normal_two_sided_p(t), TestMethod::NormalApprox)
    } else {
        (t_two_sided_p(t, n_f - 1.0), TestMethod::StudentT)
    };

    MeanTest {
        n,
        mean,
        t_statistic: t,
        p_value: p,
        method,
    }
}

// ─── WFA-level validation ────────────────────────────────────────────

/// Aggregate statistical conclusion over the valid folds of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WfaValidation {
    /// Number of valid folds the conclusion rests on.
    pub n_folds: usize,
    /// Fraction of valid folds with positive OOS pnl.
    pub consistency_ratio: f64,
    /// Σ OOS pnl / Σ IS pnl; 0.0 when the IS sum is non-positive
    /// (the ratio is undefined there, not an error).
    pub wfa_efficiency: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub test_method: TestMethod,
    /// Significance threshold the decision used.
    pub alpha: f64,
    /// The explicit decision: p_value < alpha. Never implied silently.
    pub significant: bool,
}

/// Validate per-fold IS/OOS pnl series at significance level `alpha`.
///
/// Both slices must be fold-aligned (only valid folds, same order).
pub fn validate_folds(is_pnls: &[f64], oos_pnls: &[f64], alpha: f64) -> WfaValidation {
    debug_assert_eq!(is_pnls.len(), oos_pnls.len());

    let n = oos_pnls.len();
    let consistency_ratio = if n == 0 {
        0.0
    } else {
        oos_pnls.iter().filter(|&&p| p > 0.0).count() as f64 / n as f64
    };

    let is_sum: f64 = is_pnls.iter().sum();
    let oos_sum: f64 = oos_pnls.iter().sum();
    let wfa_efficiency = if is_sum > 0.0 { oos_sum / is_sum } else { 0.0 };

    let test = two_sided_mean_test(oos_pnls);

    WfaValidation {
        n_folds: n,
        consistency_ratio,
        wfa_efficiency,
        t_statistic: test.t_statistic,
        p_value: test.p_value,
        test_method: test.method,
        alpha,
        significant: test.p_value < alpha,
    }
}
