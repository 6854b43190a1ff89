//! Pearson product-moment correlation.
//!
//! The two-sided p-value uses the exact distribution of r under independence
//! of normal samples: p = I_{1-r^2}((n-2)/2, 1/2), which equals the Student t
//! test with n-2 degrees of freedom.

use cryptostat_core::{Error, Result};
use serde::{Deserialize, Serialize};
use statrs::function::beta::beta_reg;

/// Correlation coefficient and two-sided p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PearsonResult {
    /// Coefficient in [-1, 1].
    pub coefficient: f64,
    /// Two-sided p-value in [0, 1].
    pub p_value: f64,
    /// Number of paired observations.
    pub n: usize,
}

/// Correlate two paired samples.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<PearsonResult> {
    if x.len() != y.len() {
        return Err(Error::other(format!(
            "paired samples differ in length: {} vs {}",
            x.len(),
            y.len()
        )));
    }

    let n = x.len();
    if n < 2 {
        return Err(Error::insufficient_data(format!(
            "Pearson correlation needs at least 2 paired observations, got {}",
            n
        )));
    }

    let n_f = n as f64;
    let mean_x = x.iter().sum::<f64>() / n_f;
    let mean_y = y.iter().sum::<f64>() / n_f;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return Err(Error::insufficient_data(
            "Pearson correlation is undefined for a constant sample",
        ));
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    if !r.is_finite() {
        return Err(Error::insufficient_data(
            "Pearson correlation is undefined for non-finite input",
        ));
    }
    let r = r.clamp(-1.0, 1.0);

    let p_value = if n == 2 {
        1.0
    } else {
        let df = n_f - 2.0;
        let x = 1.0 - r * r;
        if x <= 0.0 {
            0.0
        } else {
            beta_reg(df / 2.0, 0.5, x.min(1.0)).clamp(0.0, 1.0)
        }
    };

    Ok(PearsonResult {
        coefficient: r,
        p_value,
        n,
    })
}
