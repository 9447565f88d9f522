//! Sample statistics backing the raincloud layers:
//! a gaussian kernel-density estimate for the half-violin and
//! quartile/whisker statistics for the boxplot.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("empty sample")]
    EmptySample,

    #[error("sample contains non-finite values")]
    NonFinite,

    #[error("sample is constant, density estimate is degenerate")]
    DegenerateSample,
}

fn validate(sample: &[f64]) -> Result<(), StatsError> {
    if sample.is_empty() {
        return Err(StatsError::EmptySample);
    }
    if sample.iter().any(|v| !v.is_finite()) {
        return Err(StatsError::NonFinite);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// GaussianKde – kernel-density estimate for the violin layer
// ---------------------------------------------------------------------------

/// Gaussian-kernel density estimate with bandwidth by Scott's rule
/// (`n^(-1/5) · σ`), evaluated on a uniform grid spanning the sample range.
#[derive(Debug, Clone)]
pub struct GaussianKde {
    sample: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    pub fn from_sample(sample: &[f64]) -> Result<Self, StatsError> {
        validate(sample)?;

        let n = sample.len() as f64;
        let mean = sample.iter().sum::<f64>() / n;
        let variance = sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        if std_dev == 0.0 {
            return Err(StatsError::DegenerateSample);
        }

        Ok(GaussianKde {
            sample: sample.to_vec(),
            bandwidth: std_dev * n.powf(-0.2),
        })
    }

    /// Density at a single point.
    pub fn density(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = 1.0 / ((2.0 * std::f64::consts::PI).sqrt() * h * self.sample.len() as f64);
        self.sample
            .iter()
            .map(|&xi| {
                let z = (x - xi) / h;
                (-0.5 * z * z).exp()
            })
            .sum::<f64>()
            * norm
    }

    /// Evaluate on a uniform grid of `points` positions over the sample
    /// range, returning `(position, density)` pairs.
    pub fn evaluate(&self, points: usize) -> Vec<(f64, f64)> {
        let min = self.sample.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self
            .sample
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let step = (max - min) / (points - 1) as f64;

        (0..points)
            .map(|i| {
                let x = min + step * i as f64;
                (x, self.density(x))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// BoxStats – quartiles and whiskers for the boxplot layer
// ---------------------------------------------------------------------------

/// Boxplot statistics: quartiles (linear-interpolation quantiles) and
/// whiskers at the most extreme data points within 1.5×IQR of the box.
/// Points beyond the whiskers are simply not drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

impl BoxStats {
    pub fn from_sample(sample: &[f64]) -> Result<Self, StatsError> {
        validate(sample)?;

        let mut sorted = sample.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;

        let lo_fence = q1 - 1.5 * iqr;
        let hi_fence = q3 + 1.5 * iqr;
        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|&v| v >= lo_fence)
            .unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= hi_fence)
            .unwrap_or(q3);

        Ok(BoxStats {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
        })
    }
}

/// Linear-interpolation quantile of an already-sorted sample.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quartiles_linear_interpolation() {
        let data: Vec<f64> = (1..=5).map(|x| x as f64).collect();
        let stats = BoxStats::from_sample(&data).unwrap();
        assert!((stats.q1 - 2.0).abs() < 1e-12);
        assert!((stats.median - 3.0).abs() < 1e-12);
        assert!((stats.q3 - 4.0).abs() < 1e-12);
    }

    #[test]
    fn whiskers_stop_at_data_within_fence() {
        // 100.0 sits beyond q3 + 1.5*IQR, so the upper whisker stays at 5.
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let stats = BoxStats::from_sample(&data).unwrap();
        assert_eq!(stats.upper_whisker, 5.0);
        assert_eq!(stats.lower_whisker, 1.0);
    }

    #[test]
    fn kde_integrates_to_roughly_one() {
        let data: Vec<f64> = (0..100).map(|i| (i as f64 * 0.37).sin() * 2.0 + 5.0).collect();
        let kde = GaussianKde::from_sample(&data).unwrap();

        // Trapezoid rule over a generous window around the sample.
        let (lo, hi) = (-2.0, 12.0);
        let steps = 2000;
        let dx = (hi - lo) / steps as f64;
        let integral: f64 = (0..steps)
            .map(|i| {
                let x = lo + dx * (i as f64 + 0.5);
                kde.density(x) * dx
            })
            .sum();
        assert!((integral - 1.0).abs() < 0.05, "integral = {integral}");
    }

    #[test]
    fn kde_grid_has_requested_points() {
        let data: Vec<f64> = (1..=50).map(|x| x as f64).collect();
        let kde = GaussianKde::from_sample(&data).unwrap();
        let grid = kde.evaluate(500);
        assert_eq!(grid.len(), 500);
        assert_eq!(grid[0].0, 1.0);
        assert!((grid[499].0 - 50.0).abs() < 1e-9);
        // Densities are positive over the support.
        assert!(grid.iter().all(|&(_, d)| d > 0.0));
    }

    #[test]
    fn degenerate_samples_rejected() {
        assert!(matches!(
            GaussianKde::from_sample(&[]),
            Err(StatsError::EmptySample)
        ));
        assert!(matches!(
            GaussianKde::from_sample(&[3.0, 3.0, 3.0]),
            Err(StatsError::DegenerateSample)
        ));
        assert!(matches!(
            GaussianKde::from_sample(&[1.0, f64::NAN]),
            Err(StatsError::NonFinite)
        ));
        assert!(matches!(
            BoxStats::from_sample(&[1.0, f64::INFINITY]),
            Err(StatsError::NonFinite)
        ));
    }
}
