// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics: values with uncertainties, error propagation and
//! NaN-aware statistics.


use serde::{Deserialize, Serialize};

/// A quantity and its 1σ uncertainty. Degenerate positions on the sky
/// produce NaN or infinite values; these are carried through rather than
/// treated as errors, and are filtered out when statistics are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub error: f64,
}

impl Measurement {
    pub fn new(value: f64, error: f64) -> Measurement {
        Measurement { value, error }
    }

    /// The uncertainty relative to the value. This is NaN or infinite if the
    /// value is zero.
    #[inline]
    pub fn relative_error(&self) -> f64 {
        self.error / self.value
    }

    /// Scale both the value and uncertainty by a factor.
    #[inline]
    pub fn scaled(self, factor: f64) -> Measurement {
        Measurement {
            value: self.value * factor,
            error: self.error * factor,
        }
    }

    /// Are both the value and the uncertainty finite?
    pub fn is_finite(&self) -> bool {
        self.value.is_finite() && self.error.is_finite()
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:e} ± {:e}", self.value, self.error)
    }
}

/// Add numbers in quadrature.
///
/// # Examples
///
/// `assert_abs_diff_eq!(quadrature(&[3.0, 4.0]), 5.0);`
#[inline]
pub fn quadrature(terms: &[f64]) -> f64 {
    terms.iter().map(|t| t * t).sum::<f64>().sqrt()
}

/// The uncertainty of `x^k` given the relative uncertainty of `x`; the
/// result is `|k * rel_err * value|`, where `value` is `x^k`.
#[inline]
pub fn power_law_error(k: f64, rel_err: f64, value: f64) -> f64 {
    (k * rel_err * value).abs()
}

/// The mean and (population) standard deviation of the finite values in a
/// slice. If there are no finite values, both results are NaN.
pub fn nan_mean_std(values: &[f64]) -> (f64, f64) {
    let mut count = 0_usize;
    let mut sum = 0.0;
    for v in values.iter().filter(|v| v.is_finite()) {
        count += 1;
        sum += v;
    }
    if count == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = sum / count as f64;
    let var = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / count as f64;
    (mean, var.sqrt())
}

/// Logarithmically-spaced values between `start` and `stop` (inclusive).
/// Both must be positive.
pub fn logspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => vec![],
        1 => vec![start],
        _ => {
            let (log_start, log_stop) = (start.log10(), stop.log10());
            let step = (log_stop - log_start) / (num - 1) as f64;
            (0..num)
                .map(|i| {
                    if i == num - 1 {
                        stop
                    } else {
                        10_f64.powf(log_start + step * i as f64)
                    }
                })
                .collect()
        }
    }
}
