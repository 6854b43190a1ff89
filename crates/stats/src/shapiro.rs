//! Shapiro-Wilk normality test.
//!
//! Coefficients and p-value follow Royston's approximation (Applied
//! Statistics algorithm AS R94, 1995), valid for 3 <= n <= 5000.

use cryptostat_core::{Error, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::warn;

const SMALL: f64 = 1e-19;

const G: [f64; 2] = [-2.273, 0.459];
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];

/// W statistic and p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapiroResult {
    /// W statistic in (0, 1].
    pub statistic: f64,
    /// p-value of the null hypothesis that the sample is normal.
    pub p_value: f64,
    /// Sample size.
    pub n: usize,
}

/// Evaluate c[0] + c[1] x + c[2] x^2 + ...
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &coef| acc * x + coef)
}

/// Antisymmetric coefficients a[0..n/2] for the lower half of the sample.
fn coefficients(n: usize, normal: &Normal) -> Vec<f64> {
    let half = n / 2;
    let mut a = vec![0.0; half];

    if n == 3 {
        a[0] = 0.5f64.sqrt();
        return a;
    }

    let an = n as f64;
    let an25 = an + 0.25;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / an25))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let (first_plain, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        a[1] = a2;
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };

    a[0] = a1;
    for i in first_plain..half {
        a[i] = -m[i] / fac;
    }
    a
}

/// Upper-tail p-value of W for sample size n.
fn p_value(w: f64, n: usize, normal: &Normal) -> f64 {
    if n == 3 {
        const PI6: f64 = 1.909_859_317_102_74;
        const STQR: f64 = 1.047_197_551_196_6;
        return (PI6 * (w.sqrt().asin() - STQR)).clamp(0.0, 1.0);
    }

    let an = n as f64;
    let mut w1 = (1.0 - w).ln();
    let (mean, sd) = if n <= 11 {
        let gamma = poly(&G, an);
        if w1 >= gamma {
            return 1e-99;
        }
        w1 = -(gamma - w1).ln();
        (poly(&C3, an), poly(&C4, an).exp())
    } else {
        let xx = an.ln();
        (poly(&C5, xx), poly(&C6, xx).exp())
    };

    (1.0 - normal.cdf((w1 - mean) / sd)).clamp(0.0, 1.0)
}

/// Test a sample for normality.
///
/// Needs at least 3 observations. A sample with zero range is reported as
/// W = 1, p = 1. The p-value approximation is calibrated for n <= 5000;
/// larger samples are computed as is and flagged by the caller.
pub fn shapiro_wilk(sample: &[f64]) -> Result<ShapiroResult> {
    let n = sample.len();
    if n < 3 {
        return Err(Error::insufficient_data(format!(
            "Shapiro-Wilk needs at least 3 observations, got {}",
            n
        )));
    }

    let mut x = sample.to_vec();
    x.sort_by(f64::total_cmp);

    let range = x[n - 1] - x[0];
    if range < SMALL {
        warn!(n, "Shapiro-Wilk input has zero range");
        return Ok(ShapiroResult {
            statistic: 1.0,
            p_value: 1.0,
            n,
        });
    }

    let normal = Normal::new(0.0, 1.0).map_err(|e| Error::other(e.to_string()))?;
    let a = coefficients(n, &normal);

    // Scale by range to keep sums well conditioned for large prices.
    let scaled: Vec<f64> = x.iter().map(|v| v / range).collect();
    let mean = scaled.iter().sum::<f64>() / n as f64;
    let ssx: f64 = scaled.iter().map(|v| (v - mean) * (v - mean)).sum();

    let half = n / 2;
    let mut linear = 0.0;
    let mut ssa = 0.0;
    for i in 0..half {
        linear += a[i] * (scaled[n - 1 - i] - scaled[i]);
        ssa += 2.0 * a[i] * a[i];
    }

    let w = (linear * linear) / (ssa * ssx);
    if !w.is_finite() {
        return Err(Error::insufficient_data(
            "Shapiro-Wilk is undefined for non-finite input",
        ));
    }
    let w = w.min(1.0);
    let p = p_value(w, n, &normal);

    Ok(ShapiroResult {
        statistic: w,
        p_value: p,
        n,
    })
}
