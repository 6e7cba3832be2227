// src/data_analysis/change_point.rs

// Single change-point detection on per-flight mean voltage (Pettitt's rank test),
// plus a CUSUM trace for plotting.

use crate::constants::MIN_HISTORY_FLIGHTS;
use crate::error::{AnalysisError, Result};

/// Result of Pettitt's test.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangePoint {
    /// Last index of the "before" regime.
    pub index: usize,
    /// `K = max |U(t)|`.
    pub k_statistic: i64,
    /// `2 exp(-6K² / (n³ + n²))`, capped at 1.
    pub p_value: f64,
    pub u_series: Vec<i64>,
}

/// Per-regime aggregates either side of a change point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeStats {
    pub count: usize,
    /// Mean of the per-flight mean voltages.
    pub mean_volts: Option<f64>,
    /// Mean of the per-flight standard deviations.
    pub mean_noise: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeSplit {
    pub before: RegimeStats,
    pub after: RegimeStats,
}

impl RegimeSplit {
    /// Before minus after; positive means the voltage dropped.
    pub fn voltage_drop(&self) -> Option<f64> {
        Some(self.before.mean_volts? - self.after.mean_volts?)
    }

    /// Relative noise change in percent.
    pub fn noise_change_pct(&self) -> Option<f64> {
        let before = self.before.mean_noise?;
        let after = self.after.mean_noise?;
        if before == 0.0 {
            return None;
        }
        Some((after / before - 1.0) * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cusum {
    pub values: Vec<f64>,
    pub peak_index: usize,
}

fn sign(a: f64, b: f64) -> i64 {
    if a > b {
        1
    } else if a < b {
        -1
    } else {
        0
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Pettitt's test on `values` in chronological order.
///
/// `U(t) = Σ_{i≤t} Σ_{j>t} sign(x_i - x_j)` is built with the running update
/// `U(t) = U(t-1) + Σ_j sign(x_t - x_j)`. Ties for the maximum go to the earliest index.
/// A single flight has no second regime and is rejected.
pub fn pettitt(values: &[f64]) -> Result<ChangePoint> {
    let n = values.len();
    if n < MIN_HISTORY_FLIGHTS {
        return Err(AnalysisError::InsufficientData(format!(
            "change-point test needs at least {MIN_HISTORY_FLIGHTS} flights, got {n}"
        )));
    }

    let mut u_series = Vec::with_capacity(n);
    let mut running = 0i64;
    for &xt in values {
        running += values.iter().map(|&xj| sign(xt, xj)).sum::<i64>();
        u_series.push(running);
    }

    let mut index = 0;
    let mut k_statistic = 0i64;
    for (t, u) in u_series.iter().enumerate() {
        if u.abs() > k_statistic {
            k_statistic = u.abs();
            index = t;
        }
    }

    let n = n as f64;
    let k = k_statistic as f64;
    let p_value = (2.0 * (-6.0 * k * k / (n.powi(3) + n.powi(2))).exp()).min(1.0);

    Ok(ChangePoint {
        index,
        k_statistic,
        p_value,
        u_series,
    })
}

/// Splits per-flight means and standard deviations at `index` (inclusive before).
pub fn regime_split(means: &[f64], stds: &[f64], index: usize) -> RegimeSplit {
    let split = (index + 1).min(means.len());
    let split_std = split.min(stds.len());
    RegimeSplit {
        before: RegimeStats {
            count: split,
            mean_volts: mean(&means[..split]),
            mean_noise: mean(&stds[..split_std]),
        },
        after: RegimeStats {
            count: means.len() - split,
            mean_volts: mean(&means[split..]),
            mean_noise: mean(&stds[split_std..]),
        },
    }
}

/// Cumulative sum of deviations from the overall mean, and the index of its maximum.
pub fn cusum(values: &[f64]) -> Result<Cusum> {
    let overall = mean(values).ok_or_else(|| {
        AnalysisError::InsufficientData("CUSUM needs at least one flight".to_string())
    })?;
    let mut total = 0.0;
    let cumulative: Vec<f64> = values
        .iter()
        .map(|v| {
            total += v - overall;
            total
        })
        .collect();
    let mut peak_index = 0;
    for (i, &c) in cumulative.iter().enumerate() {
        if c > cumulative[peak_index] {
            peak_index = i;
        }
    }
    Ok(Cusum {
        values: cumulative,
        peak_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_u(values: &[f64]) -> Vec<i64> {
        let n = values.len();
        (0..n)
            .map(|t| {
                let mut u = 0;
                for i in 0..=t {
                    for j in t + 1..n {
                        u += sign(values[i], values[j]);
                    }
                }
                u
            })
            .collect()
    }

    fn step(high: usize, low: usize) -> Vec<f64> {
        let mut v = vec![28.0; high];
        v.extend(vec![26.0; low]);
        v
    }

    #[test]
    fn test_step_of_ten_flights() {
        let cp = pettitt(&step(5, 5)).unwrap();
        assert_eq!(cp.index, 4);
        assert_eq!(cp.k_statistic, 25);
        let expected = 2.0 * (-6.0 * 625.0 / 1100.0_f64).exp();
        assert!((cp.p_value - expected).abs() < 1e-12);
    }

    #[test]
    fn test_longer_step_is_significant() {
        let cp = pettitt(&step(10, 10)).unwrap();
        assert_eq!(cp.index, 9);
        assert_eq!(cp.k_statistic, 100);
        assert!(cp.p_value < 0.01);
    }

    #[test]
    fn test_running_update_matches_definition() {
        let values = [27.9, 28.3, 28.1, 28.1, 27.2, 27.5, 28.0, 27.1, 27.4, 27.4, 26.9];
        let cp = pettitt(&values).unwrap();
        assert_eq!(cp.u_series, naive_u(&values));
        assert_eq!(*cp.u_series.last().unwrap(), 0);
    }

    #[test]
    fn test_constant_series_has_no_change() {
        let cp = pettitt(&[28.0; 8]).unwrap();
        assert_eq!(cp.k_statistic, 0);
        assert_eq!(cp.index, 0);
        assert_eq!(cp.p_value, 1.0);
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(pettitt(&[]), Err(AnalysisError::InsufficientData(_))));
        assert!(cusum(&[]).is_err());
    }

    #[test]
    fn test_single_flight_fails() {
        assert!(matches!(pettitt(&[27.4]), Err(AnalysisError::InsufficientData(_))));
        let cp = pettitt(&[28.0, 26.0]).unwrap();
        assert_eq!(cp.index, 0);
        assert_eq!(cp.k_statistic, 1);
    }

    #[test]
    fn test_regime_split_inclusive_before() {
        let means = step(5, 5);
        let stds = [0.1, 0.1, 0.1, 0.1, 0.1, 0.3, 0.3, 0.3, 0.3, 0.3];
        let split = regime_split(&means, &stds, 4);
        assert_eq!(split.before.count, 5);
        assert_eq!(split.after.count, 5);
        assert_eq!(split.before.mean_volts, Some(28.0));
        assert_eq!(split.after.mean_volts, Some(26.0));
        assert_eq!(split.voltage_drop(), Some(2.0));
        assert!((split.noise_change_pct().unwrap() - 200.0).abs() < 1e-9);

        let tail = regime_split(&means, &stds, 9);
        assert_eq!(tail.after.count, 0);
        assert_eq!(tail.after.mean_volts, None);
    }

    #[test]
    fn test_cusum_peaks_at_step() {
        let c = cusum(&step(5, 5)).unwrap();
        assert_eq!(c.peak_index, 4);
        assert!((c.values[4] - 5.0).abs() < 1e-12);
        assert!(c.values[9].abs() < 1e-9);
    }
}
