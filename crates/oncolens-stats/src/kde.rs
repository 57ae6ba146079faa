//! Gaussian kernel density estimation
//!
//! Smooth density curves drawn over histograms. The bandwidth follows
//! Scott's rule, `h = σ · n^(-1/5)`.

use std::f64::consts::PI;

use crate::descriptive::DescriptiveStats;

/// A Gaussian kernel density estimate over a one-dimensional sample.
#[derive(Debug, Clone)]
pub struct GaussianKde {
    samples: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    /// Builds an estimator from the finite values of `values`.
    ///
    /// Returns `None` when fewer than two finite values exist or the sample has no spread,
    /// since no bandwidth can be derived.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oncolens_stats::kde::GaussianKde;
    /// let kde = GaussianKde::new([1.0, 2.0, 2.5, 3.0, 8.0]).unwrap();
    /// assert!(kde.density(2.5) > kde.density(20.0));
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let samples = values
            .into_iter()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();
        if samples.len() < 2 {
            return None;
        }
        let stats = DescriptiveStats::new(samples.iter().copied())?;
        if stats.std_dev <= 0.0 {
            return None;
        }
        let bandwidth = stats.std_dev * (samples.len() as f64).powf(-0.2);
        Some(Self { samples, bandwidth })
    }

    /// Kernel bandwidth.
    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Probability density at `x`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn density(&self, x: f64) -> f64 {
        let norm = 1.0 / ((2.0 * PI).sqrt() * self.bandwidth * self.samples.len() as f64);
        self.samples
            .iter()
            .map(|s| {
                let z = (x - s) / self.bandwidth;
                (-0.5 * z * z).exp()
            })
            .sum::<f64>()
            * norm
    }

    /// Evaluates the density on `points` evenly spaced points across `[start, end]`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn evaluate_grid(&self, start: f64, end: f64, points: usize) -> Vec<(f64, f64)> {
        if points < 2 {
            return vec![(start, self.density(start))];
        }
        let step = (end - start) / (points - 1) as f64;
        (0..points)
            .map(|i| {
                let x = start + i as f64 * step;
                (x, self.density(x))
            })
            .collect()
    }
}
