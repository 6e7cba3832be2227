// src/data_analysis/pair_statistics.rs

use ndarray::{Array1, ArrayView1};
use ndarray_stats::QuantileExt;

use crate::constants::{
    DIFF_BAND_HIGH_PERCENTILE, DIFF_BAND_LOW_PERCENTILE, P_HIGHLY_SIGNIFICANT, P_SIGNIFICANT,
    P_VERY_SIGNIFICANT,
};
use crate::data_analysis::alignment::AlignedGrid;
use crate::data_analysis::distributions::student_t_two_sided_p;
use crate::error::{AnalysisError, Result};
use crate::source_names::difference_label;

/// Mean, spread and range of one aligned column.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSummary {
    pub label: String,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Summary of the `a - b` difference series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferenceSummary {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// 2.5th and 97.5th percentiles.
    pub band: (f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub r: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairedTTest {
    pub t: f64,
    pub p_value: f64,
}

/// How strongly a p-value rejects "no difference".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Significance {
    HighlySignificant,
    Significant,
    NotSignificant,
}

impl Significance {
    pub fn from_p(p: f64) -> Self {
        if p < P_HIGHLY_SIGNIFICANT {
            Significance::HighlySignificant
        } else if p < P_SIGNIFICANT {
            Significance::Significant
        } else {
            Significance::NotSignificant
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Significance::HighlySignificant => "Highly significant difference (p < 0.001)",
            Significance::Significant => "Statistically significant difference (p < 0.05)",
            Significance::NotSignificant => "No significant difference at alpha = 0.05",
        }
    }

    /// `***` below 0.001, `**` below 0.01, otherwise empty.
    pub fn stars(p: f64) -> &'static str {
        if p < P_HIGHLY_SIGNIFICANT {
            "***"
        } else if p < P_VERY_SIGNIFICANT {
            "**"
        } else {
            ""
        }
    }
}

/// Everything reported about one pair of aligned sources.
#[derive(Debug, Clone, PartialEq)]
pub struct PairStatistics {
    pub left: SourceSummary,
    pub right: SourceSummary,
    pub samples: usize,
    pub difference: Array1<f64>,
    pub diff: DifferenceSummary,
    /// `None` when either input is constant.
    pub correlation: Option<Correlation>,
    /// `None` when every difference is identical.
    pub t_test: Option<PairedTTest>,
}

impl PairStatistics {
    pub fn label(&self) -> String {
        difference_label(&self.left.label, &self.right.label)
    }
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r: f64,
}

/// Percentile by linear interpolation between ranks (rank = p * (n - 1)).
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let rank = (pct / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let fraction = rank - lower as f64;
    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

/// Mean, population std and range of one column.
pub fn summarize_source(label: &str, values: ArrayView1<f64>) -> Result<SourceSummary> {
    let mean = values
        .mean()
        .ok_or_else(|| AnalysisError::InsufficientData(format!("{label} has no samples")))?;
    Ok(SourceSummary {
        label: label.to_string(),
        mean,
        std: values.std(0.0),
        min: *values
            .min()
            .map_err(|e| AnalysisError::InsufficientData(format!("{label}: {e}")))?,
        max: *values
            .max()
            .map_err(|e| AnalysisError::InsufficientData(format!("{label}: {e}")))?,
    })
}

fn pearson(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Option<Correlation> {
    let n = a.len();
    let mean_a = a.mean()?;
    let mean_b = b.mean()?;
    let (mut sab, mut saa, mut sbb) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        sab += dx * dy;
        saa += dx * dx;
        sbb += dy * dy;
    }
    if saa == 0.0 || sbb == 0.0 {
        return None;
    }
    let r = (sab / (saa * sbb).sqrt()).clamp(-1.0, 1.0);
    let p_value = if n <= 2 {
        1.0
    } else if r.abs() >= 1.0 {
        0.0
    } else {
        let df = (n - 2) as f64;
        let t = r * (df / (1.0 - r * r)).sqrt();
        student_t_two_sided_p(t, df)
    };
    Some(Correlation { r, p_value })
}

fn paired_t_test(difference: ArrayView1<f64>) -> Option<PairedTTest> {
    let n = difference.len();
    if n < 2 {
        return None;
    }
    let mean = difference.mean()?;
    let sd = difference.std(1.0);
    if sd == 0.0 || !sd.is_finite() {
        return None;
    }
    let t = mean / (sd / (n as f64).sqrt());
    Some(PairedTTest {
        t,
        p_value: student_t_two_sided_p(t, (n - 1) as f64),
    })
}

/// Compares two aligned columns. The difference is `a - b`.
pub fn compute_pair_statistics(
    a: ArrayView1<f64>,
    b: ArrayView1<f64>,
    label_a: &str,
    label_b: &str,
) -> Result<PairStatistics> {
    if a.len() != b.len() {
        return Err(AnalysisError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.len() < 2 {
        return Err(AnalysisError::InsufficientData(format!(
            "{} aligned points for {}",
            a.len(),
            difference_label(label_a, label_b)
        )));
    }

    let difference = &a - &b;
    let diff_values = difference.to_vec();
    let diff_summary = summarize_source("difference", difference.view())?;
    let diff = DifferenceSummary {
        mean: diff_summary.mean,
        median: percentile(&diff_values, 50.0),
        std: diff_summary.std,
        min: diff_summary.min,
        max: diff_summary.max,
        band: (
            percentile(&diff_values, DIFF_BAND_LOW_PERCENTILE),
            percentile(&diff_values, DIFF_BAND_HIGH_PERCENTILE),
        ),
    };

    Ok(PairStatistics {
        left: summarize_source(label_a, a)?,
        right: summarize_source(label_b, b)?,
        samples: a.len(),
        correlation: pearson(a, b),
        t_test: paired_t_test(difference.view()),
        difference,
        diff,
    })
}

/// Every pair `(i, j)` with `i < j` of the grid's columns, in column order.
pub fn all_pairs(grid: &AlignedGrid) -> Result<Vec<PairStatistics>> {
    let mut pairs = Vec::new();
    for (i, left) in grid.columns.iter().enumerate() {
        for right in grid.columns.iter().skip(i + 1) {
            pairs.push(compute_pair_statistics(
                left.volts.view(),
                right.volts.view(),
                left.source.label(),
                right.source.label(),
            )?);
        }
    }
    Ok(pairs)
}

/// Per-source summaries and every pairwise comparison of one aligned grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridComparison {
    pub samples: usize,
    pub step_s: f64,
    /// Labelled with each source's legend name.
    pub sources: Vec<SourceSummary>,
    pub pairs: Vec<PairStatistics>,
}

impl GridComparison {
    pub fn duration_min(&self) -> f64 {
        self.samples as f64 * self.step_s / 60.0
    }
}

pub fn compare_grid(grid: &AlignedGrid) -> Result<GridComparison> {
    let sources = grid
        .columns
        .iter()
        .map(|c| summarize_source(c.source.legend(), c.volts.view()))
        .collect::<Result<Vec<_>>>()?;
    Ok(GridComparison {
        samples: grid.len(),
        step_s: grid.step_s,
        sources,
        pairs: all_pairs(grid)?,
    })
}

/// Least-squares fit of `y` on `x`; `None` when `x` is constant or lengths differ.
pub fn linear_fit(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Option<LinearFit> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mean_x = x.mean()?;
    let mean_y = y.mean()?;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        sxy += (xi - mean_x) * (yi - mean_y);
        sxx += (xi - mean_x) * (xi - mean_x);
        syy += (yi - mean_y) * (yi - mean_y);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    let r = if syy == 0.0 { 0.0 } else { sxy / (sxx * syy).sqrt() };
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
        r,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_analysis::alignment::AlignedColumn;
    use crate::source_names::VoltageSource;
    use ndarray::array;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_percentile_linear_rank() {
        let v = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert_eq!(percentile(&v, 50.0), 3.0);
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 100.0), 5.0);
        assert!(approx_eq(percentile(&v, 2.5), 1.1, 1e-12));
        assert!(approx_eq(percentile(&[1.0, 2.0, 3.0, 4.0], 50.0), 2.5, 1e-12));
    }

    #[test]
    fn test_basic_pair() {
        let a = array![28.0, 28.2, 28.4, 28.6, 28.8];
        let b = array![28.1, 28.4, 28.5, 28.9, 29.0];
        let stats = compute_pair_statistics(a.view(), b.view(), "G1000", "VDL48").unwrap();

        assert_eq!(stats.samples, 5);
        assert_eq!(stats.label(), "G1000 - VDL48");
        assert!(approx_eq(stats.left.mean, 28.4, 1e-12));
        assert!(approx_eq(stats.diff.mean, -0.18, 1e-12));
        assert!(approx_eq(stats.diff.median, -0.2, 1e-12));
        assert!(approx_eq(stats.diff.min, -0.3, 1e-12));
        assert!(approx_eq(stats.diff.max, -0.1, 1e-12));

        let corr = stats.correlation.unwrap();
        assert!(corr.r > 0.95);
        assert!(corr.p_value < 0.05);

        let t = stats.t_test.unwrap();
        assert!(t.t < 0.0);
        assert!(t.p_value < 0.01);
        assert_eq!(Significance::from_p(t.p_value), Significance::Significant);
    }

    #[test]
    fn test_swapping_sources_mirrors_results() {
        let a = array![27.9, 28.1, 28.3, 28.0, 27.8, 28.4, 28.2];
        let b = array![28.3, 28.2, 28.6, 28.5, 28.1, 28.7, 28.6];
        let ab = compute_pair_statistics(a.view(), b.view(), "A", "B").unwrap();
        let ba = compute_pair_statistics(b.view(), a.view(), "B", "A").unwrap();

        assert!(approx_eq(ab.diff.mean, -ba.diff.mean, 1e-12));
        let (r_ab, r_ba) = (ab.correlation.unwrap(), ba.correlation.unwrap());
        assert!(approx_eq(r_ab.r, r_ba.r, 1e-12));
        assert!(approx_eq(r_ab.p_value, r_ba.p_value, 1e-12));
        let (t_ab, t_ba) = (ab.t_test.unwrap(), ba.t_test.unwrap());
        assert!(approx_eq(t_ab.t, -t_ba.t, 1e-9));
        assert!(approx_eq(t_ab.p_value, t_ba.p_value, 1e-12));
    }

    #[test]
    fn test_constant_input_has_no_correlation() {
        let a = array![28.0, 28.0, 28.0, 28.0];
        let b = array![27.0, 27.5, 27.2, 27.9];
        let stats = compute_pair_statistics(a.view(), b.view(), "A", "B").unwrap();
        assert!(stats.correlation.is_none());
        assert!(stats.t_test.is_some());
    }

    #[test]
    fn test_constant_offset_has_no_t_statistic() {
        let exact = array![1.0, 2.0, 3.0];
        let shifted = array![0.0, 1.0, 2.0];
        let stats = compute_pair_statistics(exact.view(), shifted.view(), "A", "B").unwrap();
        assert!(stats.t_test.is_none());
        assert!(approx_eq(stats.correlation.unwrap().r, 1.0, 1e-12));
    }

    #[test]
    fn test_length_mismatch_and_short_input() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![1.0, 2.0];
        assert!(matches!(
            compute_pair_statistics(a.view(), b.view(), "A", "B"),
            Err(AnalysisError::LengthMismatch { left: 3, right: 2 })
        ));
        let one = array![1.0];
        assert!(matches!(
            compute_pair_statistics(one.view(), one.view(), "A", "B"),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_all_pairs_three_columns() {
        let grid = AlignedGrid {
            step_s: 2.0,
            offsets_s: array![0.0, 2.0, 4.0],
            columns: vec![
                AlignedColumn { source: VoltageSource::G1000, volts: array![28.0, 28.1, 28.2] },
                AlignedColumn { source: VoltageSource::Ecu, volts: array![28.1, 28.3, 28.2] },
                AlignedColumn { source: VoltageSource::Vdl48, volts: array![28.4, 28.4, 28.6] },
            ],
        };
        let pairs = all_pairs(&grid).unwrap();
        let labels: Vec<String> = pairs.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["G1000 - ECU", "G1000 - VDL48", "ECU - VDL48"]);

        let comparison = compare_grid(&grid).unwrap();
        assert_eq!(comparison.sources.len(), 3);
        assert_eq!(comparison.sources[1].label, "ECU ch808");
        assert_eq!(comparison.pairs.len(), 3);
        assert!((comparison.duration_min() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_significance_labels() {
        assert_eq!(Significance::from_p(0.0005), Significance::HighlySignificant);
        assert_eq!(Significance::from_p(0.02), Significance::Significant);
        assert_eq!(Significance::from_p(0.2), Significance::NotSignificant);
        assert_eq!(Significance::stars(0.0005), "***");
        assert_eq!(Significance::stars(0.005), "**");
        assert_eq!(Significance::stars(0.02), "");
    }

    #[test]
    fn test_linear_fit() {
        let x = array![1.0, 2.0, 3.0, 4.0];
        let y = array![3.0, 5.0, 7.0, 9.0];
        let fit = linear_fit(x.view(), y.view()).unwrap();
        assert!(approx_eq(fit.slope, 2.0, 1e-12));
        assert!(approx_eq(fit.intercept, 1.0, 1e-12));
        assert!(approx_eq(fit.r, 1.0, 1e-12));
        let flat = array![2.0, 2.0, 2.0, 2.0];
        assert!(linear_fit(flat.view(), y.view()).is_none());
    }
}
